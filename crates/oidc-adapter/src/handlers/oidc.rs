//! OIDC flow handlers.
//!
//! - `GET /oidc/auth` - Redirect the browser to the identity provider
//! - `GET /oidc/tokenize` - Finish the code flow and redirect into the meeting
//!
//! Every failure is a bare `401 Unauthorized` (see [`AdapterError`]).
//!
//! # Security
//!
//! - The access token is held as a `SecretString` and never logged
//! - The authorization code is never logged
//! - The `state` round-trip is not integrity-protected; it only carries
//!   routing and display hints chosen by the client

use crate::client_state::ClientState;
use crate::errors::AdapterError;
use crate::meeting_uri;
use crate::presentation_hash;
use crate::routes::AppState;
use crate::subject::resolve_subject;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Query parameters of `/oidc/auth`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeParams {
    pub state: Option<String>,
}

/// Query parameters of `/oidc/tokenize`.
///
/// Extra parameters added by the provider (`session_state`, `iss`) are
/// ignored.
#[derive(Default, Deserialize)]
pub struct TokenizeParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

// ============================================================================
// Handler: GET /oidc/auth
// ============================================================================

/// Handler for GET /oidc/auth
///
/// # Response
///
/// - 302 Found: `Location` is the provider authorization URL, with the
///   tokenize callback for this host as `redirect_uri`
/// - 401 Unauthorized: `Host` header or `state` missing
#[instrument(skip_all, name = "adapter.oidc.authorize")]
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Option<Query<AuthorizeParams>>,
) -> Result<Response, AdapterError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();

    let host = request_host(&headers)?;
    let raw_state = require_param(params.state, "state")?;

    let target = state.identity.endpoints().authorization_url(host, &raw_state);

    debug!(
        target: "adapter.handlers.oidc",
        host = %host,
        "Redirecting to identity provider"
    );

    found(&target)
}

// ============================================================================
// Handler: GET /oidc/tokenize
// ============================================================================

/// Handler for GET /oidc/tokenize
///
/// Order of operations:
/// 1. Validate `Host`, `code` and `state`
/// 2. Parse the client state and require a room
/// 3. Exchange the code for an access token
/// 4. Fetch the user identity
/// 5. Resolve the subject and mint the meeting token
/// 6. Redirect to the meeting URI
///
/// The provider is only contacted once local validation has passed, and the
/// minter is only invoked once an identity with a `sub` has been obtained.
///
/// # Response
///
/// - 302 Found: `Location` is `https://{host}/{tenant}/{room}?jwt=...#...`
/// - 401 Unauthorized: any input, provider or signing failure
#[instrument(skip_all, name = "adapter.oidc.tokenize")]
pub async fn tokenize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Option<Query<TokenizeParams>>,
) -> Result<Response, AdapterError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();

    let host = request_host(&headers)?;
    let code = require_param(params.code, "code")?;
    let raw_state = require_param(params.state, "state")?;

    let client_state = ClientState::parse(&raw_state)?;
    let room = client_state
        .room()
        .ok_or_else(|| AdapterError::MissingInput("room".to_string()))?;

    let access_token = state
        .identity
        .exchange_code(host, &code, &raw_state)
        .await?;
    let identity = state.identity.fetch_identity(&access_token).await?;

    let subject = resolve_subject(host, client_state.tenant());
    let token = state
        .minter
        .mint(&subject, room, &identity, state.clock.now())?;

    let hash = presentation_hash::encode(&client_state);
    let target = meeting_uri::assemble(host, client_state.tenant(), room, &token, &hash);

    info!(
        target: "adapter.handlers.oidc",
        subject = %subject,
        room = %room,
        "Meeting token issued"
    );

    found(&target)
}

/// Non-empty `Host` header of the request.
fn request_host(headers: &HeaderMap) -> Result<&str, AdapterError> {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .ok_or_else(|| AdapterError::MissingInput("host".to_string()))
}

fn require_param(value: Option<String>, name: &str) -> Result<String, AdapterError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AdapterError::MissingInput(name.to_string()))
}

/// `302 Found` with the given `Location`.
fn found(location: &str) -> Result<Response, AdapterError> {
    let location = HeaderValue::from_str(location).map_err(|_| {
        AdapterError::MalformedState("redirect target is not a valid header value".to_string())
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
