//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! Keys are fetched from the identity provider on first use, cached by key
//! id, and refreshed when the cache ages out or an unknown key id shows up
//! (key rotation).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::prelude::*;
use jsonwebtoken::{Algorithm, DecodingKey};
use parking_lot::RwLock;
use serde::Deserialize;

use crate::error::{AuthError, Result};
use crate::AuthConfig;

/// JWKS response from the identity provider.
#[derive(Debug, Deserialize)]
pub struct JwksResponse {
    /// The list of keys.
    pub keys: Vec<JwkKey>,
}

/// A single JWK (JSON Web Key).
#[derive(Debug, Deserialize)]
pub struct JwkKey {
    /// Key type (`RSA` or `OKP`).
    pub kty: String,
    /// Key ID.
    pub kid: Option<String>,
    /// Key use (e.g. "sig").
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    /// Algorithm (e.g. `RS256`).
    pub alg: Option<String>,
    /// RSA modulus (base64url encoded).
    pub n: Option<String>,
    /// RSA public exponent (base64url encoded).
    pub e: Option<String>,
    /// OKP curve (e.g. "Ed25519").
    pub crv: Option<String>,
    /// OKP public key (base64url encoded).
    pub x: Option<String>,
}

/// A decoding key together with the only algorithm it may verify.
#[derive(Clone)]
pub struct VerifyingKey {
    /// The key material.
    pub key: DecodingKey,
    /// Signature algorithm bound to this key.
    pub algorithm: Algorithm,
}

struct CachedKeys {
    keys: HashMap<String, VerifyingKey>,
    fetched_at: Instant,
}

impl Default for CachedKeys {
    fn default() -> Self {
        Self {
            keys: HashMap::new(),
            // Far past, so the first lookup fetches.
            fetched_at: Instant::now()
                .checked_sub(Duration::from_secs(3600))
                .unwrap_or_else(Instant::now),
        }
    }
}

/// JWKS key provider that fetches and caches keys.
pub struct JwksProvider {
    config: AuthConfig,
    client: reqwest::Client,
    cache: RwLock<CachedKeys>,
}

impl JwksProvider {
    /// Create a new JWKS provider with the given configuration.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            client,
            cache: RwLock::new(CachedKeys::default()),
        }
    }

    /// Get a verifying key by key ID, fetching the JWKS if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or the JWKS fetch fails.
    pub async fn get_key(&self, kid: &str) -> Result<VerifyingKey> {
        {
            let cache = self.cache.read();
            let refresh_interval = Duration::from_secs(self.config.jwks_refresh_seconds);
            if cache.fetched_at.elapsed() < refresh_interval {
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        self.refresh_keys().await?;

        let cache = self.cache.read();
        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    async fn refresh_keys(&self) -> Result<()> {
        let jwks_url = &self.config.jwks_url;
        tracing::debug!(url = %jwks_url, "Fetching JWKS");

        let response: JwksResponse = self
            .client
            .get(jwks_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?;

        let mut new_keys = HashMap::new();
        for key in response.keys {
            if let Some(kid) = &key.kid {
                if let Some(verifying_key) = Self::parse_key(&key)? {
                    new_keys.insert(kid.clone(), verifying_key);
                }
            }
        }

        tracing::debug!(count = new_keys.len(), "Cached JWKS keys");

        let mut cache = self.cache.write();
        cache.keys = new_keys;
        cache.fetched_at = Instant::now();

        Ok(())
    }

    /// Parse a JWK into a verifying key. Unsupported key types are skipped.
    fn parse_key(key: &JwkKey) -> Result<Option<VerifyingKey>> {
        match key.kty.as_str() {
            "RSA" => {
                let (Some(n), Some(e)) = (&key.n, &key.e) else {
                    return Err(AuthError::InvalidToken(
                        "RSA key missing n or e".to_string(),
                    ));
                };
                let decoding_key = DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| AuthError::InvalidToken(format!("invalid RSA key: {e}")))?;
                Ok(Some(VerifyingKey {
                    key: decoding_key,
                    algorithm: Algorithm::RS256,
                }))
            }
            "OKP" => {
                let crv = key.crv.as_deref().unwrap_or("");
                if crv != "Ed25519" {
                    tracing::warn!(crv = crv, "Unsupported OKP curve");
                    return Ok(None);
                }

                let x = key
                    .x
                    .as_ref()
                    .ok_or_else(|| AuthError::InvalidToken("missing x parameter".to_string()))?;
                let public_key = BASE64_URL_SAFE_NO_PAD
                    .decode(x)
                    .map_err(|e| AuthError::InvalidToken(format!("invalid base64: {e}")))?;

                Ok(Some(VerifyingKey {
                    key: DecodingKey::from_ed_der(&public_key),
                    algorithm: Algorithm::EdDSA,
                }))
            }
            other => {
                tracing::warn!(kty = other, "Unknown key type");
                Ok(None)
            }
        }
    }

    /// Force a refresh of the JWKS cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWKS fetch fails.
    pub async fn force_refresh(&self) -> Result<()> {
        self.refresh_keys().await
    }
}
