//! The scheduler contract implemented by every orchestration backend.

use async_trait::async_trait;

use crate::error::SchedulerResult;
use crate::manifest::Manifest;
use crate::types::Task;

/// Runs twelve-factor apps on an orchestration backend.
///
/// Implementations hold no per-app state of their own: every call resolves
/// the backend's current view of the app before acting. Collaborator
/// failures abort the call and are returned unchanged as
/// [`SchedulerError::Collaborator`](crate::SchedulerError::Collaborator).
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Converge the backend to the manifest's desired state.
    async fn up(&self, manifest: &Manifest) -> SchedulerResult<()>;

    /// Tear down everything running for an app.
    async fn remove(&self, app_id: &str) -> SchedulerResult<()>;

    /// Set the desired instance count of one process.
    async fn scale_process(&self, app_id: &str, process: &str, count: u32) -> SchedulerResult<()>;

    /// Every task currently known for the app, across all processes.
    ///
    /// Order is unspecified. An app with nothing running yields an empty vec.
    async fn tasks(&self, app_id: &str) -> SchedulerResult<Vec<Task>>;

    /// Replace running instances without changing desired state.
    async fn restart(&self, app_id: &str) -> SchedulerResult<()>;
}
