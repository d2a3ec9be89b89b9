//! GET-only guard.
//!
//! Every endpoint of the adapter is read-only. Non-GET requests are answered
//! with 405 before routing, so unknown paths get 405 rather than 404 too.

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Reject any method other than GET with 405 Method Not Allowed.
pub async fn require_get(req: Request, next: Next) -> Response {
    if req.method() != Method::GET {
        tracing::debug!(
            target: "adapter.middleware.method_guard",
            method = %req.method(),
            path = %req.uri().path(),
            "Rejected non-GET request"
        );
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    next.run(req).await
}
