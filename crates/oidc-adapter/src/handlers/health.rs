//! Liveness and fallback handlers.

use axum::http::StatusCode;
use tracing::instrument;

/// Liveness probe.
///
/// Returns `200 OK` with the plain-text body `healthy`. No dependency is
/// checked: the adapter holds no state beyond its signing key.
#[instrument(skip_all, name = "adapter.health.check")]
pub async fn health_check() -> &'static str {
    "healthy"
}

/// Fallback for unknown paths: empty `404 Not Found`.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_body() {
        assert_eq!(health_check().await, "healthy");
    }

    #[tokio::test]
    async fn test_not_found_status() {
        assert_eq!(not_found().await, StatusCode::NOT_FOUND);
    }
}
