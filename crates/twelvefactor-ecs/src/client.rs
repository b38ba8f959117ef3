//! Collaborators the ECS scheduler drives.
//!
//! Both are injected into [`EcsScheduler`](crate::EcsScheduler) so tests and
//! alternative transports can substitute their own implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use twelvefactor::{BoxError, Manifest};

use crate::api::*;

/// Thin client for the ECS control API.
///
/// Retries, pagination, and auth are the implementation's concern.
#[async_trait]
pub trait EcsClient: Send + Sync {
    async fn update_service(
        &self,
        input: UpdateServiceInput,
    ) -> Result<UpdateServiceOutput, BoxError>;

    async fn list_tasks(&self, input: ListTasksInput) -> Result<ListTasksOutput, BoxError>;

    async fn describe_tasks(
        &self,
        input: DescribeTasksInput,
    ) -> Result<DescribeTasksOutput, BoxError>;
}

/// Converges an app's processes into ECS services.
///
/// Diffing, resource lifecycle, and service naming belong to the builder.
/// Callers must treat the returned service identifiers as opaque.
#[async_trait]
pub trait StackBuilder: Send + Sync {
    /// Create or update every service for the manifest's processes.
    async fn build(&self, manifest: &Manifest) -> Result<(), BoxError>;

    /// Delete every service belonging to the app.
    async fn remove(&self, app_id: &str) -> Result<(), BoxError>;

    /// Current process name → service identifier mapping for the app.
    async fn services(&self, app_id: &str) -> Result<HashMap<String, String>, BoxError>;

    /// Force a redeploy of the app's services without changing desired state.
    async fn restart(&self, app_id: &str) -> Result<(), BoxError>;
}
