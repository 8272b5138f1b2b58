//! The admin session gate.
//!
//! Every moderation operation takes an [`AdminSession`]. The only way to get
//! one is [`AdminGate::admit`], so holding a session proves the caller was
//! checked against the authorization policy before any data was touched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use syllabusdb_auth::{AuthorizationPolicy, Identity};

use crate::error::{ControlError, Result};

/// Proof that the caller passed the admin gate.
#[derive(Debug, Clone)]
pub struct AdminSession {
    identity: Identity,
    opened_at: DateTime<Utc>,
}

impl AdminSession {
    /// The admin's identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// When the gate admitted this session.
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

/// Checks identities against an injected authorization policy.
#[derive(Clone)]
pub struct AdminGate {
    policy: Arc<dyn AuthorizationPolicy>,
}

impl AdminGate {
    /// Create a gate enforcing `policy`.
    pub fn new(policy: impl AuthorizationPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Open an admin session for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Unauthorized` if there is no identity or the
    /// policy rejects it.
    pub fn admit(&self, identity: Option<Identity>) -> Result<AdminSession> {
        let Some(identity) = identity else {
            tracing::info!("Rejected admin access without identity");
            return Err(ControlError::Unauthorized);
        };

        if !self.policy.is_authorized(&identity) {
            tracing::info!(uid = %identity.uid, "Rejected admin access");
            return Err(ControlError::Unauthorized);
        }

        tracing::debug!(uid = %identity.uid, "Opened admin session");
        Ok(AdminSession {
            identity,
            opened_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate").finish_non_exhaustive()
    }
}
