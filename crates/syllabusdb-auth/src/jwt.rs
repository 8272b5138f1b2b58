//! ID token validation and identity extraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, Validation};
use serde::Deserialize;

use syllabusdb_core::Uid;

use crate::error::{AuthError, Result};
use crate::jwks::JwksProvider;
use crate::AuthConfig;

/// The signed-in user, as asserted by a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User id (`sub` claim).
    pub uid: Uid,
    /// Email address, if the account has one.
    pub email: Option<String>,
    /// Whether the provider verified the email address.
    pub email_verified: bool,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Trait for validating ID tokens.
#[async_trait]
pub trait IdTokenValidator: Send + Sync {
    /// Validate a token and extract the identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, expired, or cannot be validated.
    async fn validate(&self, token: &str) -> Result<Identity>;
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    aud: Audience,
    exp: u64,
}

/// Audience claim that can be either a string or array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum Audience {
    Single(String),
    Multiple(Vec<String>),
    #[default]
    None,
}

impl Audience {
    fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(s) => s == value,
            Self::Multiple(v) => v.iter().any(|s| s == value),
            Self::None => false,
        }
    }
}

/// JWKS-based ID token validator.
///
/// Each key in the JWKS is bound to one algorithm (`RS256` for RSA keys,
/// `EdDSA` for Ed25519 keys). A token whose header names a different
/// algorithm than its key is rejected.
pub struct JwksValidator {
    config: AuthConfig,
    jwks: JwksProvider,
}

impl JwksValidator {
    /// Create a new JWKS-based validator.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let jwks = JwksProvider::new(config.clone());
        Self { config, jwks }
    }

    /// Get a reference to the JWKS provider for manual operations.
    #[must_use]
    pub const fn jwks(&self) -> &JwksProvider {
        &self.jwks
    }
}

#[async_trait]
impl IdTokenValidator for JwksValidator {
    async fn validate(&self, token: &str) -> Result<Identity> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::MissingClaim("kid".to_string()))?;

        let verifying = self.jwks.get_key(&kid).await?;

        let mut validation = Validation::new(verifying.algorithm);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        // Audience is checked below since it can be a string or an array.
        validation.validate_aud = false;
        validation.validate_exp = true;

        let token_data = decode::<RawClaims>(token, &verifying.key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = token_data.claims;

        if !claims.aud.contains(&self.config.audience) {
            return Err(AuthError::InvalidAudience);
        }

        let uid = Uid::new(claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let exp_secs = i64::try_from(claims.exp).unwrap_or(i64::MAX);
        let expires_at = DateTime::from_timestamp(exp_secs, 0)
            .ok_or_else(|| AuthError::InvalidToken("invalid exp timestamp".to_string()))?;

        Ok(Identity {
            uid,
            email: claims.email,
            email_verified: claims.email_verified,
            expires_at,
        })
    }
}

/// A mock ID token validator for testing and local development.
///
/// Accepts tokens of the form `test-token:<uid>` or
/// `test-token:<uid>:<email>`.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockIdTokenValidator;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl IdTokenValidator for MockIdTokenValidator {
    async fn validate(&self, token: &str) -> Result<Identity> {
        let rest = token.strip_prefix("test-token:").ok_or_else(|| {
            AuthError::InvalidToken("expected test-token:<uid>[:<email>]".to_string())
        })?;

        let (uid, email) = match rest.split_once(':') {
            Some((uid, email)) => (uid, Some(email.to_string())),
            None => (rest, None),
        };
        let uid = Uid::new(uid).map_err(|_| AuthError::InvalidUserId)?;

        Ok(Identity {
            uid,
            email_verified: email.is_some(),
            email,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        })
    }
}
