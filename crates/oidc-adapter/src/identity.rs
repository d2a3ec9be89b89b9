//! Identity provider client.
//!
//! Performs the two server-to-server OIDC calls of the tokenize flow:
//! authorization code → access token, then access token → userinfo.
//!
//! # Security
//!
//! - The access token is held as a `SecretString` and never logged
//! - Provider response bodies are logged at trace level only
//! - Single attempt per call; no retries, no timeout override
//! - Every provider response is treated as untrusted input

use crate::config::Config;
use crate::errors::AdapterError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, instrument, trace, warn};

/// OIDC endpoints derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// Consent page, including every fixed query parameter except
    /// `redirect_uri`. Uses the browser-facing origin.
    pub auth_uri: String,

    /// Token endpoint (internal origin).
    pub token_uri: String,

    /// Userinfo endpoint (internal origin).
    pub userinfo_uri: String,
}

impl ProviderEndpoints {
    pub fn from_config(config: &Config) -> Self {
        let realm_path = format!("/realms/{}/protocol/openid-connect", config.keycloak_realm);

        let auth_uri = format!(
            "{}{}/auth?client_id={}&response_mode={}&response_type=code&scope=openid&prompt=consent",
            config.keycloak_origin,
            realm_path,
            urlencoding::encode(&config.keycloak_client_id),
            urlencoding::encode(&config.keycloak_mode),
        );

        Self {
            auth_uri,
            token_uri: format!("{}{}/token", config.keycloak_origin_internal, realm_path),
            userinfo_uri: format!("{}{}/userinfo", config.keycloak_origin_internal, realm_path),
        }
    }

    /// Consent page URL that sends the browser back to our tokenize endpoint.
    pub fn authorization_url(&self, host: &str, raw_state: &str) -> String {
        let redirect_uri = tokenize_redirect_uri(host, raw_state);
        format!(
            "{}&redirect_uri={}",
            self.auth_uri,
            urlencoding::encode(&redirect_uri)
        )
    }
}

/// The tokenize callback URI registered with the provider for `raw_state`.
///
/// The authorize redirect and the code exchange both build the URI here; the
/// provider rejects the exchange unless the two are byte-identical.
pub fn tokenize_redirect_uri(host: &str, raw_state: &str) -> String {
    format!(
        "https://{}/oidc/tokenize?state={}",
        host,
        urlencoding::encode(raw_state)
    )
}

/// Userinfo claims of an authenticated user.
///
/// Always carries a non-empty string `sub`.
#[derive(Clone, PartialEq)]
pub struct IdentityAssertion {
    claims: Map<String, Value>,
}

/// Claim values may hold personal data; only claim names are printed.
impl fmt::Debug for IdentityAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAssertion")
            .field("claims", &self.claims.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl IdentityAssertion {
    /// Build an assertion from a userinfo body.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::IdentityMissing` if the body is not an object
    /// or lacks a non-empty string `sub`.
    pub fn from_value(value: Value) -> Result<Self, AdapterError> {
        let Value::Object(claims) = value else {
            return Err(AdapterError::IdentityMissing(
                "userinfo response is not a JSON object".to_string(),
            ));
        };

        match claims.get("sub").and_then(Value::as_str) {
            Some(sub) if !sub.is_empty() => Ok(Self { claims }),
            _ => Err(AdapterError::IdentityMissing(
                "userinfo response has no subject".to_string(),
            )),
        }
    }

    pub fn sub(&self) -> &str {
        self.claim_str("sub").unwrap_or_default()
    }

    /// A string-valued claim, if present.
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }
}

/// HTTP client for the identity provider token and userinfo endpoints.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    endpoints: ProviderEndpoints,
    client_id: String,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// The underlying `reqwest::Client` keeps its default timeouts.
    pub fn new(endpoints: ProviderEndpoints, client_id: String) -> Self {
        Self {
            client: Client::new(),
            endpoints,
            client_id,
        }
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::ExchangeFailed` if the provider is unreachable,
    /// answers with something other than JSON, or the JSON carries no
    /// `access_token`.
    #[instrument(skip_all, name = "adapter.identity.exchange_code")]
    pub async fn exchange_code(
        &self,
        host: &str,
        code: &str,
        raw_state: &str,
    ) -> Result<SecretString, AdapterError> {
        let redirect_uri = tokenize_redirect_uri(host, raw_state);

        let form_body = [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .client
            .post(&self.endpoints.token_uri)
            .header("Accept", "application/json")
            .form(&form_body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "adapter.identity", error = %e, "Token request failed");
                AdapterError::ExchangeFailed(format!("token endpoint unreachable: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(target: "adapter.identity", error = %e, "Failed to read token response");
            AdapterError::ExchangeFailed(format!("unreadable token response: {e}"))
        })?;

        let access_token = serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(|json| json.get("access_token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(SecretString::from);

        match access_token {
            Some(token) => {
                debug!(target: "adapter.identity", status = %status, "Access token acquired");
                Ok(token)
            }
            None => {
                warn!(target: "adapter.identity", status = %status, "Token response has no access token");
                trace!(target: "adapter.identity", body = %body, "Token rejection response body");
                Err(AdapterError::ExchangeFailed(format!(
                    "no access token in response (status {status})"
                )))
            }
        }
    }

    /// Fetch the userinfo claims for an access token.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::IdentityMissing` if the provider is unreachable,
    /// answers with something other than a JSON object, or omits `sub`.
    #[instrument(skip_all, name = "adapter.identity.fetch_identity")]
    pub async fn fetch_identity(
        &self,
        access_token: &SecretString,
    ) -> Result<IdentityAssertion, AdapterError> {
        let response = self
            .client
            .get(&self.endpoints.userinfo_uri)
            .header("Accept", "application/json")
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                warn!(target: "adapter.identity", error = %e, "Userinfo request failed");
                AdapterError::IdentityMissing("userinfo endpoint unreachable".to_string())
            })?;

        let status = response.status();
        let value: Value = response.json().await.map_err(|e| {
            warn!(target: "adapter.identity", status = %status, error = %e, "Failed to parse userinfo response");
            AdapterError::IdentityMissing(format!("unparseable userinfo response (status {status})"))
        })?;

        let identity = IdentityAssertion::from_value(value).inspect_err(|_| {
            warn!(target: "adapter.identity", status = %status, "Userinfo response has no subject");
        })?;

        debug!(target: "adapter.identity", "Identity fetched");
        Ok(identity)
    }
}
