//! Admin authorization policies.
//!
//! A policy decides from a verified [`Identity`] alone whether the caller may
//! moderate. Any `Fn(&Identity) -> bool` closure is a policy, which keeps
//! tests free of a real identity provider.

use crate::jwt::Identity;

/// Decides whether an identity may use the admin workflow.
pub trait AuthorizationPolicy: Send + Sync {
    /// Returns `true` if the identity is an admin.
    fn is_authorized(&self, identity: &Identity) -> bool;
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&Identity) -> bool + Send + Sync,
{
    fn is_authorized(&self, identity: &Identity) -> bool {
        self(identity)
    }
}

/// Allows exactly one configured email address.
///
/// The comparison is case-sensitive and exact: `Admin@x.com` does not match
/// `admin@x.com`.
#[derive(Debug, Clone)]
pub struct AdminEmailPolicy {
    admin_email: String,
}

impl AdminEmailPolicy {
    /// Create a policy for the given admin address.
    #[must_use]
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
        }
    }

    /// The configured admin address.
    #[must_use]
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }
}

impl AuthorizationPolicy for AdminEmailPolicy {
    fn is_authorized(&self, identity: &Identity) -> bool {
        identity.email.as_deref() == Some(self.admin_email.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use syllabusdb_core::Uid;

    fn identity(email: Option<&str>) -> Identity {
        Identity {
            uid: Uid::new("u1").unwrap(),
            email: email.map(str::to_string),
            email_verified: true,
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn admin_email_policy_matches_exactly() {
        let policy = AdminEmailPolicy::new("admin@syllabusdb.com");

        assert!(policy.is_authorized(&identity(Some("admin@syllabusdb.com"))));
        assert!(!policy.is_authorized(&identity(Some("Admin@syllabusdb.com"))));
        assert!(!policy.is_authorized(&identity(Some("random@example.com"))));
        assert!(!policy.is_authorized(&identity(None)));
    }

    #[test]
    fn closures_are_policies() {
        let allow_all = |_: &Identity| true;
        let deny_all = |_: &Identity| false;

        assert!(allow_all.is_authorized(&identity(None)));
        assert!(!deny_all.is_authorized(&identity(Some("admin@syllabusdb.com"))));
    }
}
