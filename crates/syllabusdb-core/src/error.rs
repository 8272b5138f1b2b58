//! Common error types for SyllabusDB.

use crate::ids::IdError;
use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while interpreting identifiers and document paths.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A path did not have the expected `collection/id/...` shape.
    #[error("invalid document path: {0}")]
    InvalidPath(String),

    /// A path segment was not a valid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
