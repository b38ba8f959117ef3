//! EcsScheduler: runs twelve-factor apps as ECS services.
//!
//! Each process of an app is realized as one ECS service. The scheduler:
//! - Hands whole manifests to the `StackBuilder` for convergence
//! - Resolves process → service through the builder on every call
//! - Scales services and observes their tasks through the `EcsClient`
//!
//! It keeps no state between calls beyond its configuration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info};

use twelvefactor::{Manifest, Scheduler, SchedulerError, SchedulerResult, Task};

use crate::api::*;
use crate::arn;
use crate::client::{EcsClient, StackBuilder};
use crate::config::EcsConfig;

/// [`Scheduler`] backed by ECS services in a single cluster.
pub struct EcsScheduler {
    /// Cluster every ECS call is scoped to.
    cluster: String,
    stack_builder: Arc<dyn StackBuilder>,
    ecs: Arc<dyn EcsClient>,
}

impl EcsScheduler {
    pub fn new(
        cluster: impl Into<String>,
        stack_builder: Arc<dyn StackBuilder>,
        ecs: Arc<dyn EcsClient>,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            stack_builder,
            ecs,
        }
    }

    pub fn from_config(
        config: &EcsConfig,
        stack_builder: Arc<dyn StackBuilder>,
        ecs: Arc<dyn EcsClient>,
    ) -> Self {
        Self::new(config.cluster.clone(), stack_builder, ecs)
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// List and describe the tasks of one service.
    async fn service_tasks(&self, process: &str, service: &str) -> SchedulerResult<Vec<Task>> {
        let listed = self
            .ecs
            .list_tasks(ListTasksInput {
                cluster: self.cluster.clone(),
                service_name: service.to_string(),
            })
            .await?;

        // ECS rejects a describe call with no task ARNs.
        if listed.task_arns.is_empty() {
            debug!(%process, %service, "no tasks listed");
            return Ok(Vec::new());
        }

        let described = self
            .ecs
            .describe_tasks(DescribeTasksInput {
                cluster: self.cluster.clone(),
                tasks: listed.task_arns.clone(),
            })
            .await?;

        if let Some(failure) = described.failures.first() {
            return Err(SchedulerError::MalformedBackendData(format!(
                "could not describe task {}: {}",
                failure.arn, failure.reason
            )));
        }

        let mut by_arn: HashMap<&str, &TaskDescription> = described
            .tasks
            .iter()
            .map(|t| (t.task_arn.as_str(), t))
            .collect();

        let tasks = listed
            .task_arns
            .iter()
            .map(|task_arn| {
                let description = by_arn.remove(task_arn.as_str()).ok_or_else(|| {
                    SchedulerError::MalformedBackendData(format!(
                        "no description returned for task {task_arn}"
                    ))
                })?;
                to_task(description)
            })
            .collect::<SchedulerResult<Vec<_>>>()?;

        debug!(%process, %service, count = tasks.len(), "described tasks");
        Ok(tasks)
    }
}

/// Map an ECS task description onto the domain [`Task`].
fn to_task(description: &TaskDescription) -> SchedulerResult<Task> {
    let id = arn::task_id(&description.task_arn)
        .map_err(|e| SchedulerError::MalformedBackendData(e.to_string()))?;
    Ok(Task {
        id,
        state: description.last_status.clone(),
    })
}

#[async_trait]
impl Scheduler for EcsScheduler {
    async fn up(&self, manifest: &Manifest) -> SchedulerResult<()> {
        manifest.check_unique_processes()?;
        debug!(
            app = %manifest.app.id,
            processes = manifest.processes.len(),
            "building stack"
        );
        self.stack_builder.build(manifest).await?;
        info!(app = %manifest.app.id, version = %manifest.app.version, "app up");
        Ok(())
    }

    async fn remove(&self, app_id: &str) -> SchedulerResult<()> {
        self.stack_builder.remove(app_id).await?;
        info!(app = %app_id, "app removed");
        Ok(())
    }

    async fn scale_process(&self, app_id: &str, process: &str, count: u32) -> SchedulerResult<()> {
        let services = self.stack_builder.services(app_id).await?;
        let service = services
            .get(process)
            .ok_or_else(|| SchedulerError::ProcessNotFound {
                app: app_id.to_string(),
                process: process.to_string(),
            })?;

        self.ecs
            .update_service(UpdateServiceInput {
                cluster: self.cluster.clone(),
                service: service.clone(),
                desired_count: count,
            })
            .await?;

        info!(app = %app_id, %process, %service, count, "process scaled");
        Ok(())
    }

    async fn tasks(&self, app_id: &str) -> SchedulerResult<Vec<Task>> {
        let services = self.stack_builder.services(app_id).await?;

        // Any single failure fails the whole listing; the other in-flight
        // lookups are dropped.
        let per_service = try_join_all(
            services
                .iter()
                .map(|(process, service)| self.service_tasks(process, service)),
        )
        .await?;

        let tasks: Vec<Task> = per_service.into_iter().flatten().collect();
        debug!(app = %app_id, services = services.len(), tasks = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    async fn restart(&self, app_id: &str) -> SchedulerResult<()> {
        self.stack_builder.restart(app_id).await?;
        info!(app = %app_id, "app restarted");
        Ok(())
    }
}
