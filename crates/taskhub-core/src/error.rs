//! Uniform error type for all core operations.

use taskhub_storage::StoreError;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Error taxonomy for core operations. Rejections never mutate state except
/// `PartialFailure`, which reports a half-applied two-entity write whose retry
/// is safe.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing or malformed input; rejected before touching the store.
    #[error("{0}")]
    Validation(String),
    /// Entity absent, or absent under owner scope for project operations,
    /// which deliberately fold "not owned" into this outcome.
    #[error("{0}")]
    NotFound(String),
    /// The entity exists but the principal lacks the required ownership or
    /// membership capability.
    #[error("{0}")]
    Forbidden(String),
    /// Duplicate pending request, already-assigned user, already-responded
    /// request, or exhausted identifier space.
    #[error("{0}")]
    Conflict(String),
    /// The first of two entity writes landed and the second failed. The
    /// operation is designed so retrying it is idempotent.
    #[error("{0}")]
    PartialFailure(String),
    /// Backend failure unrelated to the request itself.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        CoreError::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }

    pub fn partial_failure(msg: impl Into<String>) -> Self {
        CoreError::PartialFailure(msg.into())
    }
}

/// Map a store-level `NotFound` to a core `NotFound` with a caller-facing
/// message; everything else passes through as a backend error.
pub(crate) fn not_found_as(msg: &str) -> impl Fn(StoreError) -> CoreError + '_ {
    move |e| match e {
        StoreError::NotFound => CoreError::not_found(msg),
        other => other.into(),
    }
}
