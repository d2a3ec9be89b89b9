//! HTTP middleware for the OIDC adapter.

pub mod method_guard;

pub use method_guard::require_get;
