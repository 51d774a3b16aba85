//! Error model for the staging and posting engine.

use thiserror::Error;

/// Result type used across the engine.
pub type DomainResult<T> = Result<T, DomainError>;

/// Engine-level error.
///
/// Keep this focused on deterministic business/domain failures. Storage
/// internals (IO, SQL) belong to the store collaborator; they surface here
/// only as `Conflict` or `Storage`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A posting was attempted on a closed transaction, or the pending
    /// postings failed the double-entry balance check at commit.
    #[error("posting error: {0}")]
    Posting(String),

    /// An operation was invoked after the transaction already reached a
    /// terminal state (double commit, rollback after commit).
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A supplied value violates a constraint (e.g. a movement destination
    /// of the wrong location kind).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The object is not in a state that permits the operation (e.g. a
    /// reference requested before the document has a sequence number).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Commit-time conflict: another transaction committed an overlapping
    /// set of staged objects first. The caller may retry against fresh state.
    #[error("concurrent modification: {0}")]
    Conflict(String),

    /// A staged object failed its validation hook.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested object was not found.
    #[error("not found")]
    NotFound,

    /// The storage collaborator failed to apply a committed batch.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn posting(msg: impl Into<String>) -> Self {
        Self::Posting(msg.into())
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
