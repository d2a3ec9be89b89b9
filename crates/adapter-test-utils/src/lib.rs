//! Test utilities for the OIDC adapter.
//!
//! - `server_harness` - Spawn a real adapter on a random local port
//! - `mock_provider` - Wiremock-backed identity provider (token + userinfo)

pub mod mock_provider;
pub mod server_harness;

pub use mock_provider::{form_field, FormField, MockIdentityProvider};
pub use server_harness::TestAdapterServer;
