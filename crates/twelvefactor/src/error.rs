//! Scheduler error types.

use thiserror::Error;

/// Opaque error returned by a backend collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that can occur during scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("{process} process not found for app {app}")]
    ProcessNotFound { app: String, process: String },

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("malformed backend data: {0}")]
    MalformedBackendData(String),

    /// An error reported by a backend collaborator, carried as-is.
    #[error(transparent)]
    Collaborator(#[from] BoxError),
}

impl SchedulerError {
    /// Whether this error originated in a backend collaborator.
    pub fn is_collaborator(&self) -> bool {
        matches!(self, SchedulerError::Collaborator(_))
    }

    /// Borrow the collaborator's original error as its concrete type.
    pub fn collaborator_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            SchedulerError::Collaborator(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
