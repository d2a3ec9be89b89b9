//! HTTP routes for the OIDC adapter.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::identity::{IdentityClient, ProviderEndpoints};
use crate::meeting_token::{Clock, SystemClock, TokenMinter};
use crate::middleware::require_get;
use crate::signing_key::SigningKey;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers.
///
/// Built once at startup. The signing key inside `minter` is never replaced
/// for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    /// Identity provider client.
    pub identity: IdentityClient,

    /// Meeting token minter (owns the shared signing key).
    pub minter: TokenMinter,

    /// Time source for token timestamps.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the state from configuration and an initialized signing key.
    pub fn new(config: &Config, signing_key: Arc<SigningKey>) -> Self {
        Self::with_clock(config, signing_key, Arc::new(SystemClock))
    }

    /// Same as [`AppState::new`] with an explicit clock.
    pub fn with_clock(config: &Config, signing_key: Arc<SigningKey>, clock: Arc<dyn Clock>) -> Self {
        let identity = IdentityClient::new(
            ProviderEndpoints::from_config(config),
            config.keycloak_client_id.clone(),
        );
        let minter = TokenMinter::new(
            signing_key,
            config.jwt_app_id.clone(),
            config.jwt_exp_second,
        );

        Self {
            identity,
            minter,
            clock,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/oidc/health` - Liveness probes
/// - `/oidc/auth` - Redirect to the identity provider consent page
/// - `/oidc/tokenize` - Redirect into the meeting with a signed token
/// - 404 for any other path, 405 for any non-GET method
/// - TraceLayer for request logging
pub fn build_routes(state: Arc<AppState>) -> Router {
    let oidc_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/oidc/health", get(handlers::health_check))
        .route("/oidc/auth", get(handlers::authorize))
        .route("/oidc/tokenize", get(handlers::tokenize))
        .fallback(handlers::not_found)
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. require_get - Reject non-GET before routing (innermost)
    // 2. TraceLayer - Log request details
    oidc_routes
        .layer(middleware::from_fn(require_get))
        .layer(TraceLayer::new_for_http())
}
