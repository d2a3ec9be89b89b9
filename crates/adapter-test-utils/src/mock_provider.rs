//! Mock identity provider for E2E testing.
//!
//! Wraps a wiremock `MockServer` that answers on the realm's token and
//! userinfo paths. Mounted mocks carry call-count expectations which are
//! verified when the provider is dropped.

use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Realm every test adapter is configured with.
pub const TEST_REALM: &str = "meet";

/// OIDC client ID every test adapter is configured with.
pub const TEST_CLIENT_ID: &str = "meet-adapter";

/// Matches a form-encoded request body containing `name=value`.
///
/// The body is decoded before comparing, so `value` is the plain text the
/// adapter sent, not its percent-encoded form.
#[derive(Debug, Clone)]
pub struct FormField {
    name: String,
    value: String,
}

/// Shorthand for [`FormField`].
pub fn form_field(name: impl Into<String>, value: impl Into<String>) -> FormField {
    FormField {
        name: name.into(),
        value: value.into(),
    }
}

impl Match for FormField {
    fn matches(&self, request: &Request) -> bool {
        url::form_urlencoded::parse(&request.body)
            .any(|(name, value)| name == self.name.as_str() && value == self.value.as_str())
    }
}

/// Wiremock-backed identity provider.
///
/// # Example
/// ```rust,ignore
/// let provider = MockIdentityProvider::start().await;
/// provider.mock_token_success("access-123", 1).await;
/// provider
///     .mock_userinfo("access-123", json!({"sub": "user-1"}), 1)
///     .await;
/// let server = TestAdapterServer::spawn(&provider.uri()).await?;
/// ```
pub struct MockIdentityProvider {
    server: MockServer,
}

impl MockIdentityProvider {
    /// Start a provider on a random local port.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URI, used as the adapter's internal provider origin.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Underlying wiremock server, for custom mocks.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn token_path() -> String {
        format!("/realms/{TEST_REALM}/protocol/openid-connect/token")
    }

    pub fn userinfo_path() -> String {
        format!("/realms/{TEST_REALM}/protocol/openid-connect/userinfo")
    }

    /// Token endpoint grants `access_token` for any authorization-code form.
    pub async fn mock_token_success(&self, access_token: &str, expected_calls: u64) {
        let body = serde_json::json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 300
        });

        self.mock_token_response(ResponseTemplate::new(200).set_body_json(body), expected_calls)
            .await;
    }

    /// Token endpoint answers with `response`.
    pub async fn mock_token_response(&self, response: ResponseTemplate, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(Self::token_path()))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(form_field("client_id", TEST_CLIENT_ID))
            .and(form_field("grant_type", "authorization_code"))
            .respond_with(response)
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Userinfo endpoint answers `body` to requests bearing `access_token`.
    pub async fn mock_userinfo(&self, access_token: &str, body: Value, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(Self::userinfo_path()))
            .and(header("authorization", format!("Bearer {access_token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Userinfo endpoint must not be called at all.
    pub async fn expect_no_userinfo(&self) {
        Mock::given(method("GET"))
            .and(path(Self::userinfo_path()))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Token endpoint must not be called at all.
    pub async fn expect_no_token_exchange(&self) {
        Mock::given(method("POST"))
            .and(path(Self::token_path()))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Decoded form bodies of every request received on the token endpoint.
    pub async fn token_requests(&self) -> Vec<Vec<(String, String)>> {
        let token_path = Self::token_path();

        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == token_path)
            .map(|request| {
                url::form_urlencoded::parse(&request.body)
                    .map(|(name, value)| (name.into_owned(), value.into_owned()))
                    .collect()
            })
            .collect()
    }
}

