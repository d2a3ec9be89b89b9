//! HTTP request handlers for the OIDC adapter.

pub mod health;
pub mod oidc;

pub use health::{health_check, not_found};
pub use oidc::{authorize, tokenize};
