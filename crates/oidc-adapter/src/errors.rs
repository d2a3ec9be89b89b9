//! OIDC adapter error types.
//!
//! Every failure inside the `auth` and `tokenize` flows is an `AdapterError`.
//! The `IntoResponse` impl logs the full detail server-side and answers with a
//! bare 401: the client never learns which step failed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure kinds of the authorize/tokenize flows.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A required header or query parameter is absent or empty.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The token endpoint did not yield an access token.
    #[error("Code exchange failed: {0}")]
    ExchangeFailed(String),

    /// The userinfo response carried no subject.
    #[error("Identity missing: {0}")]
    IdentityMissing(String),

    /// The `state` parameter is not a JSON object of the expected shape.
    #[error("Malformed state: {0}")]
    MalformedState(String),

    /// The meeting token could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl AdapterError {
    /// Short, stable name of the failure kind (used as a log field).
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::MissingInput(_) => "missing_input",
            AdapterError::ExchangeFailed(_) => "exchange_failed",
            AdapterError::IdentityMissing(_) => "identity_missing",
            AdapterError::MalformedState(_) => "malformed_state",
            AdapterError::Signing(_) => "signing",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Always 401 so the client cannot tell which step failed.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        tracing::warn!(
            target: "adapter.errors",
            kind = self.kind(),
            error = %self,
            "Request rejected"
        );

        self.status_code().into_response()
    }
}
