//! Shared types used across twelvefactor crates.

use serde::{Deserialize, Serialize};

/// One running instance of a process, as observed on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Backend-local identifier of the instance.
    pub id: String,
    /// Lifecycle label reported verbatim by the backend (PENDING, RUNNING, ...).
    pub state: String,
}

impl Task {
    pub fn new(id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: state.into(),
        }
    }
}
