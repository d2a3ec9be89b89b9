//! Presentation hash encoder.
//!
//! Builds the URI fragment that carries client-requested display options to
//! the meeting application. Only keys under a whitelisted prefix are
//! forwarded; everything else in the client state is dropped.

use crate::client_state::ClientState;
use tracing::debug;

/// Fixed marker every hash starts with.
pub const HASH_MARKER: &str = "adapter=true";

/// Key prefixes forwarded into the hash.
pub const ALLOWED_PREFIXES: &[&str] = &["config.", "interfaceConfig.", "iceServers."];

/// Encode the whitelisted options of `state` as a URI fragment.
///
/// Pairs follow the client's own key order. Each value is serialized as JSON
/// before percent-encoding, so `"bar"` becomes `%22bar%22`.
pub fn encode(state: &ClientState) -> String {
    let mut hash = String::from(HASH_MARKER);

    for (key, value) in &state.extra {
        if !is_allowed(key) {
            continue;
        }

        let json = value.to_string();
        hash.push('&');
        hash.push_str(&urlencoding::encode(key));
        hash.push('=');
        hash.push_str(&urlencoding::encode(&json));
    }

    hash
}

/// Encode straight from the raw `state` parameter.
///
/// Malformed state is recovered to the bare marker instead of failing.
pub fn encode_raw(raw_state: &str) -> String {
    match ClientState::parse(raw_state) {
        Ok(state) => encode(&state),
        Err(e) => {
            debug!(target: "adapter.presentation_hash", error = %e, "Unparseable state, using bare marker");
            HASH_MARKER.to_string()
        }
    }
}

fn is_allowed(key: &str) -> bool {
    ALLOWED_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unrelated_keys_dropped_and_values_json_encoded() {
        let hash = encode_raw(r#"{"config.foo":"bar","unrelated":"x"}"#);
        assert_eq!(hash, "adapter=true&config.foo=%22bar%22");
    }

    #[test]
    fn test_all_prefixes_forwarded_in_client_order() {
        let hash = encode_raw(
            r#"{"iceServers.replace":[1],"room":"r","interfaceConfig.SHOW":false,"config.startWithAudioMuted":true}"#,
        );
        assert_eq!(
            hash,
            "adapter=true\
             &iceServers.replace=%5B1%5D\
             &interfaceConfig.SHOW=false\
             &config.startWithAudioMuted=true"
        );
    }

    #[test]
    fn test_recognized_fields_never_forwarded() {
        let hash = encode_raw(r#"{"tenant":"acme","room":"standup"}"#);
        assert_eq!(hash, HASH_MARKER);
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        // "configX" and a bare "config" are not under the "config." prefix
        let hash = encode_raw(r#"{"config":"a","configX.b":"c","Config.d":"e"}"#);
        assert_eq!(hash, HASH_MARKER);
    }

    #[test]
    fn test_keys_and_nested_values_are_percent_encoded() {
        let hash = encode_raw(r#"{"config.sub ject":{"a":"b c"}}"#);
        assert_eq!(
            hash,
            "adapter=true&config.sub%20ject=%7B%22a%22%3A%22b%20c%22%7D"
        );
    }

    #[test]
    fn test_malformed_state_yields_bare_marker() {
        assert_eq!(encode_raw("not json"), HASH_MARKER);
        assert_eq!(encode_raw("[1,2,3]"), HASH_MARKER);
        assert_eq!(encode_raw(""), HASH_MARKER);
    }

    #[test]
    fn test_empty_state_yields_bare_marker() {
        assert_eq!(encode(&ClientState::default()), HASH_MARKER);
    }
}
