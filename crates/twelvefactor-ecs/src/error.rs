//! Errors raised by the in-memory backend.

use thiserror::Error;

use crate::memory::Operation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("app not found: {0}")]
    AppNotFound(String),

    #[error("service {service} already belongs to app {app}")]
    ServiceConflict { service: String, app: String },

    #[error("service {service}: desired count {requested} exceeds the limit of {max}")]
    TooManyTasks {
        service: String,
        requested: u32,
        max: u32,
    },

    #[error("injected failure in {0}")]
    Injected(Operation),
}
