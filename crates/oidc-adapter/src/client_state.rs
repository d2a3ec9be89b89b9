//! Client-supplied `state` payload.
//!
//! The browser passes a JSON object through both redirects. Only `tenant`
//! and `room` are interpreted here; every other key is kept, in its original
//! order, for the presentation hash.

use crate::errors::AdapterError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Decoded `state` parameter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientState {
    /// Multi-tenant path prefix (may contain several segments).
    #[serde(default)]
    pub tenant: Option<String>,

    /// Meeting room name.
    #[serde(default)]
    pub room: Option<String>,

    /// Every unrecognized key, in the order the client sent it.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientState {
    /// Parse the raw JSON `state` parameter.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::MalformedState` if the input is not a JSON
    /// object or `tenant`/`room` are present but not strings.
    pub fn parse(raw: &str) -> Result<Self, AdapterError> {
        serde_json::from_str(raw).map_err(|e| AdapterError::MalformedState(e.to_string()))
    }

    /// The room name, if present and non-empty.
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref().filter(|r| !r.is_empty())
    }

    /// The tenant path, if present and non-empty.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_fields() {
        let state = ClientState::parse(r#"{"tenant":"acme/team","room":"standup"}"#).unwrap();

        assert_eq!(state.tenant(), Some("acme/team"));
        assert_eq!(state.room(), Some("standup"));
        assert!(state.extra.is_empty());
    }

    #[test]
    fn test_parse_keeps_extra_keys_in_order() {
        let state = ClientState::parse(
            r#"{"z.last":1,"room":"r","config.b":true,"tenant":"t","config.a":"x"}"#,
        )
        .unwrap();

        let keys: Vec<&str> = state.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z.last", "config.b", "config.a"]);
    }

    #[test]
    fn test_parse_missing_fields_default_to_none() {
        let state = ClientState::parse("{}").unwrap();
        assert_eq!(state, ClientState::default());
        assert_eq!(state.room(), None);
        assert_eq!(state.tenant(), None);
    }

    #[test]
    fn test_empty_strings_are_treated_as_absent() {
        let state = ClientState::parse(r#"{"tenant":"","room":""}"#).unwrap();
        assert_eq!(state.room(), None);
        assert_eq!(state.tenant(), None);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = ClientState::parse("{not json");
        assert!(matches!(result, Err(AdapterError::MalformedState(_))));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        for raw in [r#""room""#, "[1,2]", "42", "null"] {
            let result = ClientState::parse(raw);
            assert!(
                matches!(result, Err(AdapterError::MalformedState(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_non_string_room() {
        let result = ClientState::parse(r#"{"room":123}"#);
        assert!(matches!(result, Err(AdapterError::MalformedState(_))));
    }
}
