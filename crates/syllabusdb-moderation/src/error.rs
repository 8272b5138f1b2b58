//! Error types for the moderation workflow.
//!
//! A user declining a confirmation is not an error: it is reported as
//! [`Outcome::Aborted`](crate::Outcome::Aborted). Everything here is either a
//! rejected caller or a backend failure.

use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur in moderation operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// No identity, or an identity the authorization policy rejects.
    #[error("not authorized to moderate")]
    Unauthorized,

    /// The requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A multi-step write failed part way. Completed steps were compensated
    /// where possible.
    #[error("{saga} failed at step {step}: {source}")]
    SagaFailed {
        /// Name of the saga (e.g. `approve-syllabus`).
        saga: &'static str,
        /// Name of the step that failed.
        step: &'static str,
        /// The error that stopped the saga.
        source: Box<ControlError>,
        /// Completed steps whose compensation ran successfully, most recent first.
        rolled_back: Vec<&'static str>,
        /// Completed steps left applied: no compensation, or the compensation failed.
        unrepaired: Vec<&'static str>,
    },

    /// A notification or scan request could not be delivered.
    #[error("outbound request failed: {0}")]
    Outbound(String),

    /// Document store error.
    #[error("storage error: {0}")]
    Store(#[from] syllabusdb_store::StoreError),

    /// Blob store error.
    #[error("blob storage error: {0}")]
    Blob(#[from] syllabusdb_store::BlobError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 403,
            Self::NotFound(_) => 404,
            Self::Outbound(_) => 502,
            Self::SagaFailed { .. } | Self::Store(_) | Self::Blob(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error might be resolved by retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Outbound(_) | Self::Store(_) | Self::Blob(_) | Self::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(ControlError::Unauthorized.http_status_code(), 403);
        assert_eq!(
            ControlError::NotFound("colleges/x".into()).http_status_code(),
            404
        );
        let saga = ControlError::SagaFailed {
            saga: "approve-syllabus",
            step: "college-total",
            source: Box::new(ControlError::Internal("boom".into())),
            rolled_back: vec!["course-approval", "syllabus-approved"],
            unrepaired: vec![],
        };
        assert_eq!(saga.http_status_code(), 500);
        assert!(!saga.is_retriable());
    }

    #[test]
    fn saga_failure_message_names_step() {
        let saga = ControlError::SagaFailed {
            saga: "disapprove-syllabus",
            step: "delete-syllabus",
            source: Box::new(ControlError::Internal("boom".into())),
            rolled_back: vec!["delete-pdf"],
            unrepaired: vec![],
        };
        assert_eq!(
            saga.to_string(),
            "disapprove-syllabus failed at step delete-syllabus: internal error: boom"
        );
    }
}
