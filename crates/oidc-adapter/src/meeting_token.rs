//! Meeting token minting.
//!
//! Builds the meeting application's claim set from the resolved subject, the
//! room and the user's identity, and signs it with the process-wide key.

use crate::errors::AdapterError;
use crate::identity::IdentityAssertion;
use crate::signing_key::SigningKey;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Source of the current time in Unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock frozen at a given instant (for tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Meeting token claims.
///
/// `context` embeds user details; it is redacted in Debug output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingClaims {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub room: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub context: Value,
}

impl fmt::Debug for MeetingClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeetingClaims")
            .field("aud", &self.aud)
            .field("iss", &self.iss)
            .field("sub", &self.sub)
            .field("room", &self.room)
            .field("iat", &self.iat)
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("context", &"[REDACTED]")
            .finish()
    }
}

/// Map userinfo claims to the meeting application's `context` object.
///
/// ```json
/// {"user": {"id": "<sub>", "name": "...", "email": "...", "avatar": "..."}}
/// ```
///
/// `name` falls back to `preferred_username`; absent claims are omitted.
pub fn identity_context(identity: &IdentityAssertion) -> Value {
    let mut user = Map::new();
    user.insert("id".to_string(), Value::from(identity.sub()));

    let name = identity
        .claim_str("name")
        .or_else(|| identity.claim_str("preferred_username"));
    let optional = [
        ("name", name),
        ("email", identity.claim_str("email")),
        ("avatar", identity.claim_str("picture")),
    ];

    for (field, value) in optional {
        if let Some(value) = value {
            user.insert(field.to_string(), Value::from(value));
        }
    }

    json!({ "user": user })
}

/// Mints signed meeting tokens.
#[derive(Clone)]
pub struct TokenMinter {
    key: Arc<SigningKey>,
    app_id: String,
    ttl_seconds: i64,
}

impl TokenMinter {
    pub fn new(key: Arc<SigningKey>, app_id: String, ttl_seconds: i64) -> Self {
        Self {
            key,
            app_id,
            ttl_seconds,
        }
    }

    /// Build the claim set for one request.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Signing` if `now + ttl` overflows.
    pub fn claims(
        &self,
        subject: &str,
        room: &str,
        identity: &IdentityAssertion,
        now: i64,
    ) -> Result<MeetingClaims, AdapterError> {
        let exp = now.checked_add(self.ttl_seconds).ok_or_else(|| {
            AdapterError::Signing(format!(
                "token expiry overflows (now {now}, ttl {})",
                self.ttl_seconds
            ))
        })?;

        Ok(MeetingClaims {
            aud: self.app_id.clone(),
            iss: self.app_id.clone(),
            sub: subject.to_string(),
            room: room.to_string(),
            iat: now,
            nbf: now,
            exp,
            context: identity_context(identity),
        })
    }

    /// Build and sign the meeting token.
    ///
    /// Deterministic for identical inputs and `now`.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Signing` if the expiry overflows or the claims
    /// cannot be signed.
    #[instrument(skip_all, name = "adapter.meeting_token.mint")]
    pub fn mint(
        &self,
        subject: &str,
        room: &str,
        identity: &IdentityAssertion,
        now: i64,
    ) -> Result<String, AdapterError> {
        let claims = self.claims(subject, room, identity, now)?;

        self.key
            .sign(&claims)
            .map_err(|e| AdapterError::Signing(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
    use secrecy::SecretString;

    const SECRET: &str = "meeting-shared-secret";
    const NOW: i64 = 1_700_000_000;

    fn minter() -> TokenMinter {
        let key = SigningKey::initialize(&SecretString::from(SECRET), "HS256", "SHA-256").unwrap();
        TokenMinter::new(Arc::new(key), "meetapp".to_string(), 3600)
    }

    fn identity(body: Value) -> IdentityAssertion {
        IdentityAssertion::from_value(body).unwrap()
    }

    fn decode_claims(token: &str) -> MeetingClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["meetapp"]);
        validation.set_issuer(&["meetapp"]);
        // NOW is in the past; expiry is checked explicitly instead
        validation.validate_exp = false;
        decode::<MeetingClaims>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn test_mint_claim_set() {
        let identity = identity(json!({"sub": "user-1", "name": "Ada"}));
        let token = minter().mint("acme", "standup", &identity, NOW).unwrap();

        let claims = decode_claims(&token);
        assert_eq!(claims.aud, "meetapp");
        assert_eq!(claims.iss, "meetapp");
        assert_eq!(claims.sub, "acme");
        assert_eq!(claims.room, "standup");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.nbf, NOW);
        assert_eq!(claims.exp, NOW + 3600);
        assert_eq!(
            claims.context,
            json!({"user": {"id": "user-1", "name": "Ada"}})
        );
    }

    #[test]
    fn test_mint_header() {
        let identity = identity(json!({"sub": "user-1"}));
        let token = minter().mint("acme", "standup", &identity, NOW).unwrap();

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.typ.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_mint_is_deterministic_for_fixed_clock() {
        let identity = identity(json!({"sub": "user-1", "email": "a@example.com"}));
        let minter = minter();

        let first = minter.mint("acme", "r", &identity, NOW).unwrap();
        let second = minter.mint("acme", "r", &identity, NOW).unwrap();
        let later = minter.mint("acme", "r", &identity, NOW + 1).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, later);
    }

    #[test]
    fn test_mint_rejects_overflowing_expiry() {
        let key = SigningKey::initialize(&SecretString::from(SECRET), "HS256", "SHA-256").unwrap();
        let minter = TokenMinter::new(Arc::new(key), "meetapp".to_string(), i64::MAX);
        let identity = identity(json!({"sub": "user-1"}));

        let result = minter.mint("acme", "standup", &identity, NOW);

        assert!(matches!(result, Err(AdapterError::Signing(_))));
    }

    #[test]
    fn test_identity_context_full() {
        let identity = identity(json!({
            "sub": "user-1",
            "name": "Ada Lovelace",
            "preferred_username": "ada",
            "email": "ada@example.com",
            "picture": "https://example.com/ada.png",
            "email_verified": true
        }));

        assert_eq!(
            identity_context(&identity),
            json!({"user": {
                "id": "user-1",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "avatar": "https://example.com/ada.png"
            }})
        );
    }

    #[test]
    fn test_identity_context_name_falls_back_to_username() {
        let identity = identity(json!({"sub": "user-1", "preferred_username": "ada"}));

        assert_eq!(
            identity_context(&identity),
            json!({"user": {"id": "user-1", "name": "ada"}})
        );
    }

    #[test]
    fn test_claims_debug_redacts_context() {
        let identity = identity(json!({"sub": "user-1", "email": "ada@example.com"}));
        let claims = minter().claims("acme", "r", &identity, NOW).unwrap();

        let debug_str = format!("{claims:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("ada@example.com"));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(42).now(), 42);
        assert!(SystemClock.now() > NOW);
    }
}
