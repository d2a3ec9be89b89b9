//! Health endpoint and routing integration tests.
//!
//! Tests `/health`, `/oidc/health`, unknown paths and the GET-only guard using
//! the `TestAdapterServer` harness.

use adapter_test_utils::{MockIdentityProvider, TestAdapterServer};

/// Test that both health endpoints return 200 with a plain-text body.
#[tokio::test]
async fn test_health_endpoints_return_healthy() -> Result<(), anyhow::Error> {
    let provider = MockIdentityProvider::start().await;
    let server = TestAdapterServer::spawn(&provider.uri()).await?;
    let client = reqwest::Client::new();

    for endpoint in ["/health", "/oidc/health"] {
        let response = client
            .get(format!("{}{}", server.url(), endpoint))
            .send()
            .await?;

        assert_eq!(response.status(), 200, "{endpoint}");
        assert_eq!(response.text().await?, "healthy");
    }

    Ok(())
}

/// Test that health checks never touch the identity provider.
#[tokio::test]
async fn test_health_does_not_call_provider() -> Result<(), anyhow::Error> {
    let provider = MockIdentityProvider::start().await;
    provider.expect_no_token_exchange().await;
    provider.expect_no_userinfo().await;
    let server = TestAdapterServer::spawn(&provider.uri()).await?;

    let response = reqwest::get(format!("{}/oidc/health", server.url())).await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

/// Test that non-existent routes return an empty 404.
#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let provider = MockIdentityProvider::start().await;
    let server = TestAdapterServer::spawn(&provider.uri()).await?;

    let response = reqwest::get(format!("{}/oidc/does-not-exist", server.url())).await?;

    assert_eq!(response.status(), 404);
    assert!(response.text().await?.is_empty());

    Ok(())
}

/// Test that every non-GET method is rejected with 405, known path or not.
#[tokio::test]
async fn test_non_get_methods_return_405() -> Result<(), anyhow::Error> {
    let provider = MockIdentityProvider::start().await;
    let server = TestAdapterServer::spawn(&provider.uri()).await?;
    let client = reqwest::Client::new();

    let requests = [
        client.post(format!("{}/health", server.url())),
        client.put(format!("{}/oidc/auth", server.url())),
        client.delete(format!("{}/oidc/tokenize", server.url())),
        client.patch(format!("{}/oidc/health", server.url())),
        client.post(format!("{}/not/a/route", server.url())),
    ];

    for request in requests {
        let response = request.send().await?;
        assert_eq!(response.status(), 405);
    }

    Ok(())
}
