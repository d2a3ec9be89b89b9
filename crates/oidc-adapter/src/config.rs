//! OIDC adapter configuration.
//!
//! Configuration is loaded from environment variables. Every identity
//! provider, signing and listener setting is required; a missing value is a
//! fatal startup error. The shared secret is redacted in Debug output.

use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Longest accepted meeting token lifetime (one year).
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// OIDC adapter configuration.
#[derive(Clone)]
pub struct Config {
    /// Browser-facing identity provider origin (consent page).
    pub keycloak_origin: String,

    /// Identity provider origin for server-to-server calls. May differ from
    /// `keycloak_origin` when the adapter runs behind a proxy.
    pub keycloak_origin_internal: String,

    /// Identity provider realm.
    pub keycloak_realm: String,

    /// OIDC client ID registered for this adapter.
    pub keycloak_client_id: String,

    /// OIDC `response_mode` for the consent redirect.
    pub keycloak_mode: String,

    /// Meeting token signing algorithm (e.g. "HS256").
    pub jwt_alg: String,

    /// Hash backing the signing algorithm (e.g. "SHA-256").
    pub jwt_hash: String,

    /// Meeting application ID, used as token `aud` and `iss`.
    pub jwt_app_id: String,

    /// Shared secret the signing key is derived from.
    pub jwt_app_secret: SecretString,

    /// Meeting token lifetime in seconds.
    pub jwt_exp_second: i64,

    /// Listen host.
    pub hostname: String,

    /// Listen port.
    pub port: u16,

    /// Enables debug-level logging when no RUST_LOG filter is set.
    pub debug: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("keycloak_origin", &self.keycloak_origin)
            .field("keycloak_origin_internal", &self.keycloak_origin_internal)
            .field("keycloak_realm", &self.keycloak_realm)
            .field("keycloak_client_id", &self.keycloak_client_id)
            .field("keycloak_mode", &self.keycloak_mode)
            .field("jwt_alg", &self.jwt_alg)
            .field("jwt_hash", &self.jwt_hash)
            .field("jwt_app_id", &self.jwt_app_id)
            .field("jwt_app_secret", &"[REDACTED]")
            .field("jwt_exp_second", &self.jwt_exp_second)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token lifetime configuration: {0}")]
    InvalidTtl(String),

    #[error("Invalid port configuration: {0}")]
    InvalidPort(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let keycloak_origin = trim_origin(required(vars, "KEYCLOAK_ORIGIN")?);
        let keycloak_origin_internal = trim_origin(required(vars, "KEYCLOAK_ORIGIN_INTERNAL")?);
        let keycloak_realm = required(vars, "KEYCLOAK_REALM")?;
        let keycloak_client_id = required(vars, "KEYCLOAK_CLIENT_ID")?;
        let keycloak_mode = required(vars, "KEYCLOAK_MODE")?;

        let jwt_alg = required(vars, "JWT_ALG")?;
        let jwt_hash = required(vars, "JWT_HASH")?;
        let jwt_app_id = required(vars, "JWT_APP_ID")?;
        let jwt_app_secret = SecretString::from(required(vars, "JWT_APP_SECRET")?);

        let ttl_str = required(vars, "JWT_EXP_SECOND")?;
        let jwt_exp_second: i64 = ttl_str.parse().map_err(|e| {
            ConfigError::InvalidTtl(format!(
                "JWT_EXP_SECOND must be a valid integer, got '{}': {}",
                ttl_str, e
            ))
        })?;

        if jwt_exp_second <= 0 || jwt_exp_second > MAX_TTL_SECONDS {
            return Err(ConfigError::InvalidTtl(format!(
                "JWT_EXP_SECOND must be between 1 and {}, got {}",
                MAX_TTL_SECONDS, jwt_exp_second
            )));
        }

        let hostname = required(vars, "HOSTNAME")?;

        let port_str = required(vars, "PORT")?;
        let port: u16 = port_str.parse().map_err(|e| {
            ConfigError::InvalidPort(format!(
                "PORT must be an integer between 0 and 65535, got '{}': {}",
                port_str, e
            ))
        })?;

        let debug = vars
            .get("DEBUG")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            keycloak_origin,
            keycloak_origin_internal,
            keycloak_realm,
            keycloak_client_id,
            keycloak_mode,
            jwt_alg,
            jwt_hash,
            jwt_app_id,
            jwt_app_secret,
            jwt_exp_second,
            hostname,
            port,
            debug,
        })
    }
}

/// Empty values are treated the same as unset ones.
fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn trim_origin(origin: String) -> String {
    origin.trim_end_matches('/').to_string()
}
