//! Error type shared by both calling conventions.
//!
//! The adapters never inspect a failure. Whatever the resource reports is
//! carried unchanged to the caller, whichever convention the caller uses.

use std::sync::Arc;

use thiserror::Error;

/// A failed asynchronous operation.
///
/// `CoreError` is cheap to clone: a settled deferred value hands the same
/// failure to every observer, and clones of an `Operation` failure share the
/// underlying error.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// The resource reported a failure. Its content is opaque at this layer.
    #[error(transparent)]
    Operation(Arc<dyn std::error::Error + Send + Sync>),

    /// The resource cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The producer went away without settling the operation.
    #[error("operation dropped before it settled")]
    Dropped,
}

impl CoreError {
    /// Wrap a resource failure.
    pub fn operation<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CoreError::Operation(Arc::from(error.into()))
    }

    /// Returns true if both errors are the same failure.
    ///
    /// `Operation` failures compare by identity of the shared error, so two
    /// clones of one failure match while two failures with equal messages
    /// do not.
    pub fn same_failure(&self, other: &CoreError) -> bool {
        match (self, other) {
            (CoreError::Operation(a), CoreError::Operation(b)) => Arc::ptr_eq(a, b),
            (CoreError::Cancelled, CoreError::Cancelled) => true,
            (CoreError::Dropped, CoreError::Dropped) => true,
            _ => false,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::operation(e)
    }
}
