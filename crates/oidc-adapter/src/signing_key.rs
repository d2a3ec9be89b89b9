//! Meeting token signing key.
//!
//! The key is derived once at startup from the shared application secret and
//! the configured HMAC algorithm, then shared read-only (behind an `Arc`) by
//! every request for the lifetime of the process.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while deriving the signing key. All of them are fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Signing secret is empty")]
    EmptySecret,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Signing algorithm {algorithm} does not use hash {hash}")]
    AlgorithmMismatch { algorithm: String, hash: String },
}

/// Digest backing an HMAC signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Parse a hash name such as "SHA-256" (dash and case are optional).
    pub fn parse(name: &str) -> Result<Self, KeyError> {
        let normalized = name.trim().to_ascii_uppercase().replace('-', "");
        match normalized.as_str() {
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA384" => Ok(HashAlgorithm::Sha384),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            _ => Err(KeyError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    fn hmac_algorithm(self) -> Algorithm {
        match self {
            HashAlgorithm::Sha256 => Algorithm::HS256,
            HashAlgorithm::Sha384 => Algorithm::HS384,
            HashAlgorithm::Sha512 => Algorithm::HS512,
        }
    }
}

/// Symmetric key used to sign every meeting token.
pub struct SigningKey {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
}

/// Key material is never printed.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("encoding_key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl SigningKey {
    /// Derive the signing key from the shared secret.
    ///
    /// `algorithm` is the JWT `alg` name (only the HMAC family is supported)
    /// and `hash` must be the digest that algorithm is built on.
    ///
    /// # Errors
    ///
    /// - `KeyError::EmptySecret` if the secret is empty
    /// - `KeyError::UnsupportedAlgorithm` for a non-HMAC algorithm or unknown hash
    /// - `KeyError::AlgorithmMismatch` if the algorithm and hash disagree
    pub fn initialize(
        secret: &SecretString,
        algorithm: &str,
        hash: &str,
    ) -> Result<Self, KeyError> {
        if secret.expose_secret().is_empty() {
            return Err(KeyError::EmptySecret);
        }

        let hash_algorithm = HashAlgorithm::parse(hash)?;
        let parsed: Algorithm = algorithm
            .trim()
            .parse()
            .map_err(|_| KeyError::UnsupportedAlgorithm(algorithm.to_string()))?;

        if !matches!(parsed, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(KeyError::UnsupportedAlgorithm(algorithm.to_string()));
        }

        if parsed != hash_algorithm.hmac_algorithm() {
            return Err(KeyError::AlgorithmMismatch {
                algorithm: algorithm.to_string(),
                hash: hash.to_string(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            algorithm: parsed,
        })
    }

    /// The JWT `alg` this key signs with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign `claims` into a compact JWT with header `{typ: "JWT", alg}`.
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, jsonwebtoken::errors::Error> {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());

        encode(&header, claims, &self.encoding_key)
    }
}
