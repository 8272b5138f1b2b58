//! ID token validation and admin authorization for SyllabusDB.
//!
//! This crate answers two questions for every admin request:
//!
//! - who is calling: an ID token is verified against the identity
//!   provider's JWKS and turned into an [`Identity`]
//! - may they moderate: an [`AuthorizationPolicy`] decides from the identity
//!   alone, so the decision can be swapped without touching the provider
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐
//! │   Gateway        │────▶│   IdTokenValidator   │
//! │   (HTTP)         │     │   (trait)            │
//! └────────┬─────────┘     └──────────┬───────────┘
//!          │                          │
//!          │               ┌──────────▼───────────┐
//!          │               │  JwksValidator       │
//!          │               └──────────┬───────────┘
//!          │                          │
//!          │               ┌──────────▼───────────┐
//!          │               │  JwksProvider        │
//!          │               │  (key cache)         │
//!          │               └──────────┬───────────┘
//!          │                          │ HTTPS
//!          │               ┌──────────▼───────────┐
//!          │               │  Identity provider   │
//!          │               │  JWKS endpoint       │
//!          │               └──────────────────────┘
//!          │
//! ┌────────▼─────────┐
//! │ Authorization    │
//! │ Policy           │
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use syllabusdb_auth::{
//!     AdminEmailPolicy, AuthConfig, AuthorizationPolicy, IdTokenValidator, JwksValidator,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = JwksValidator::new(AuthConfig::firebase("syllabusdb"));
//! let policy = AdminEmailPolicy::new("admin@syllabusdb.com");
//!
//! let identity = validator.validate("eyJhbGciOiJSUzI1NiIsImtpZCI6...").await?;
//! if policy.is_authorized(&identity) {
//!     println!("admin {}", identity.uid);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod jwks;
pub mod jwt;
pub mod policy;

pub use error::{AuthError, Result};
pub use jwt::{IdTokenValidator, Identity, JwksValidator};
pub use policy::{AdminEmailPolicy, AuthorizationPolicy};

#[cfg(any(test, feature = "test-utils"))]
pub use jwt::MockIdTokenValidator;

/// Google's JWKS endpoint for Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Configuration for ID token validation.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// URL of the JWKS document holding the signing keys.
    pub jwks_url: String,
    /// Expected token issuer (`iss` claim).
    pub issuer: String,
    /// Expected token audience (`aud` claim).
    pub audience: String,
    /// How often to refresh the JWKS cache, in seconds.
    pub jwks_refresh_seconds: u64,
}

impl AuthConfig {
    /// Configuration for ID tokens issued by a Firebase project.
    #[must_use]
    pub fn firebase(project_id: &str) -> Self {
        Self {
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            issuer: format!("https://securetoken.google.com/{project_id}"),
            audience: project_id.to_string(),
            jwks_refresh_seconds: 300,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::firebase("syllabusdb")
    }
}
