//! OIDC Adapter Library
//!
//! Bridges an OpenID Connect identity provider to a meeting application
//! that accepts HMAC-signed JWTs:
//!
//! 1. `GET /oidc/auth` sends the browser to the provider consent page
//! 2. The provider redirects back to `GET /oidc/tokenize` with a code
//! 3. The code is exchanged for an access token and the user's identity
//! 4. A meeting token is minted and the browser is redirected into the room
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/oidc.rs -> identity.rs (provider calls)
//!                                   -> meeting_token.rs (signing)
//!                                   -> client_state, subject, presentation_hash, meeting_uri
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error type with HTTP status code mapping
//! - `signing_key` - Process-wide HMAC signing key
//! - `identity` - Provider endpoints, code exchange and userinfo
//! - `meeting_token` - Meeting token claims and minting
//! - `client_state` - Opaque client `state` parameter
//! - `subject` - Token subject resolution from the tenant path
//! - `presentation_hash` - Whitelisted display options for the URI fragment
//! - `meeting_uri` - Final redirect target
//! - `handlers`, `middleware`, `routes` - Axum HTTP surface

pub mod client_state;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod meeting_token;
pub mod meeting_uri;
pub mod middleware;
pub mod presentation_hash;
pub mod routes;
pub mod signing_key;
pub mod subject;
