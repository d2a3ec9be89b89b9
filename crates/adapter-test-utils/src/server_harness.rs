//! Test server harness for E2E testing
//!
//! Provides `TestAdapterServer` for spawning real adapter instances in tests.

use crate::mock_provider::{TEST_CLIENT_ID, TEST_REALM};
use oidc_adapter::config::Config;
use oidc_adapter::meeting_token::FixedClock;
use oidc_adapter::routes::{self, AppState};
use oidc_adapter::signing_key::SigningKey;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Browser-facing provider origin the test adapter redirects to.
pub const TEST_PUBLIC_ORIGIN: &str = "https://id.example.com";

/// Meeting application ID (`aud` and `iss` of minted tokens).
pub const TEST_APP_ID: &str = "meetapp";

/// Shared secret minted tokens are signed with (HS256).
pub const TEST_APP_SECRET: &str = "test-meeting-secret";

/// Token lifetime in seconds.
pub const TEST_TTL_SECONDS: i64 = 3600;

/// Instant the test adapter's clock is frozen at.
pub const TEST_NOW: i64 = 1_700_000_000;

/// Test harness for spawning the OIDC adapter in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() -> Result<()> {
///     let provider = MockIdentityProvider::start().await;
///     let server = TestAdapterServer::spawn(&provider.uri()).await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestAdapterServer {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestAdapterServer {
    /// Spawn a new adapter whose server-to-server provider calls go to
    /// `provider_uri`.
    ///
    /// The server binds to 127.0.0.1:0, signs with HS256 and uses a clock
    /// frozen at [`TEST_NOW`].
    pub async fn spawn(provider_uri: &str) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            ("KEYCLOAK_ORIGIN".to_string(), TEST_PUBLIC_ORIGIN.to_string()),
            ("KEYCLOAK_ORIGIN_INTERNAL".to_string(), provider_uri.to_string()),
            ("KEYCLOAK_REALM".to_string(), TEST_REALM.to_string()),
            ("KEYCLOAK_CLIENT_ID".to_string(), TEST_CLIENT_ID.to_string()),
            ("KEYCLOAK_MODE".to_string(), "query".to_string()),
            ("JWT_ALG".to_string(), "HS256".to_string()),
            ("JWT_HASH".to_string(), "SHA-256".to_string()),
            ("JWT_APP_ID".to_string(), TEST_APP_ID.to_string()),
            ("JWT_APP_SECRET".to_string(), TEST_APP_SECRET.to_string()),
            ("JWT_EXP_SECOND".to_string(), TEST_TTL_SECONDS.to_string()),
            ("HOSTNAME".to_string(), "127.0.0.1".to_string()),
            ("PORT".to_string(), "0".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let signing_key =
            SigningKey::initialize(&config.jwt_app_secret, &config.jwt_alg, &config.jwt_hash)
                .map_err(|e| anyhow::anyhow!("Failed to initialize signing key: {}", e))?;

        let state = Arc::new(AppState::with_clock(
            &config,
            Arc::new(signing_key),
            Arc::new(FixedClock(TEST_NOW)),
        ));

        let app = routes::build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// HTTP client that does not follow redirects, so tests can inspect the
    /// adapter's `Location` headers.
    pub fn client() -> Result<reqwest::Client, anyhow::Error> {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
    }
}

impl Drop for TestAdapterServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
