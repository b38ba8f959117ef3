//! In-memory ECS backend.
//!
//! Implements both [`StackBuilder`] and [`EcsClient`] over a single
//! simulated cluster held in process memory. Services are named
//! `<app>--<process>` and every task reports `RUNNING` as soon as it exists.
//! Useful for local simulation and for exercising the scheduler end to end.
//!
//! Service names are unique across the cluster: a build whose names would
//! collide with another app's services is refused. Desired counts are capped
//! at [`MAX_TASKS_PER_SERVICE`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use twelvefactor::{BoxError, Manifest};

use crate::api::*;
use crate::client::{EcsClient, StackBuilder};
use crate::error::BackendError;

const TASK_RUNNING: &str = "RUNNING";

/// Largest desired count a simulated service accepts.
pub const MAX_TASKS_PER_SERVICE: u32 = 10_000;

/// Backend calls that can be made to fail with [`MemoryBackend::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Build,
    Remove,
    Services,
    Restart,
    UpdateService,
    ListTasks,
    DescribeTasks,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Build => "build",
            Operation::Remove => "remove",
            Operation::Services => "services",
            Operation::Restart => "restart",
            Operation::UpdateService => "update_service",
            Operation::ListTasks => "list_tasks",
            Operation::DescribeTasks => "describe_tasks",
        };
        f.write_str(name)
    }
}

/// One simulated ECS service.
#[derive(Debug, Clone)]
struct ServiceState {
    name: String,
    image: String,
    env: HashMap<String, String>,
    desired_count: u32,
    task_arns: Vec<String>,
}

/// In-memory stack builder and ECS client for one cluster.
pub struct MemoryBackend {
    cluster: String,
    region: String,
    account: String,
    /// app id → process name → service.
    apps: RwLock<HashMap<String, HashMap<String, ServiceState>>>,
    faults: Mutex<HashSet<Operation>>,
}

impl MemoryBackend {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            region: "us-east-1".to_string(),
            account: "000000000000".to_string(),
            apps: RwLock::new(HashMap::new()),
            faults: Mutex::new(HashSet::new()),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Make the next call of `op` fail with [`BackendError::Injected`].
    pub async fn fail_next(&self, op: Operation) {
        self.faults.lock().await.insert(op);
    }

    /// Desired count of a service, if it exists.
    pub async fn desired_count(&self, service: &str) -> Option<u32> {
        let apps = self.apps.read().await;
        find_service(&apps, service).map(|s| s.desired_count)
    }

    /// Image a service runs, if it exists.
    pub async fn service_image(&self, service: &str) -> Option<String> {
        let apps = self.apps.read().await;
        find_service(&apps, service).map(|s| s.image.clone())
    }

    /// Environment a service's tasks receive, if it exists.
    pub async fn service_env(&self, service: &str) -> Option<HashMap<String, String>> {
        let apps = self.apps.read().await;
        find_service(&apps, service).map(|s| s.env.clone())
    }

    async fn check_fault(&self, op: Operation) -> Result<(), BoxError> {
        if self.faults.lock().await.remove(&op) {
            debug!(%op, "injecting failure");
            return Err(Box::new(BackendError::Injected(op)));
        }
        Ok(())
    }

    fn check_cluster(&self, cluster: &str) -> Result<(), BoxError> {
        if cluster != self.cluster {
            return Err(Box::new(BackendError::ClusterNotFound(cluster.to_string())));
        }
        Ok(())
    }

    fn new_task_arn(&self) -> String {
        format!(
            "arn:aws:ecs:{}:{}:task/{}/{}",
            self.region,
            self.account,
            self.cluster,
            uuid::Uuid::new_v4()
        )
    }

    fn check_desired_count(service: &str, count: u32) -> Result<(), BoxError> {
        if count > MAX_TASKS_PER_SERVICE {
            return Err(Box::new(BackendError::TooManyTasks {
                service: service.to_string(),
                requested: count,
                max: MAX_TASKS_PER_SERVICE,
            }));
        }
        Ok(())
    }

    /// Start or stop tasks until the service matches its desired count.
    fn reconcile(&self, service: &mut ServiceState) {
        let desired = service.desired_count as usize;
        while service.task_arns.len() < desired {
            service.task_arns.push(self.new_task_arn());
        }
        service.task_arns.truncate(desired);
    }
}

fn service_name(app_id: &str, process: &str) -> String {
    format!("{app_id}--{process}")
}

/// App, other than `app_id`, that already owns a service called `name`.
fn service_owner<'a>(
    apps: &'a HashMap<String, HashMap<String, ServiceState>>,
    app_id: &str,
    name: &str,
) -> Option<&'a str> {
    apps.iter()
        .filter(|(app, _)| app.as_str() != app_id)
        .find(|(_, services)| services.values().any(|s| s.name == name))
        .map(|(app, _)| app.as_str())
}

fn find_service<'a>(
    apps: &'a HashMap<String, HashMap<String, ServiceState>>,
    name: &str,
) -> Option<&'a ServiceState> {
    apps.values()
        .flat_map(|services| services.values())
        .find(|s| s.name == name)
}

fn find_service_mut<'a>(
    apps: &'a mut HashMap<String, HashMap<String, ServiceState>>,
    name: &str,
) -> Option<&'a mut ServiceState> {
    apps.values_mut()
        .flat_map(|services| services.values_mut())
        .find(|s| s.name == name)
}

#[async_trait]
impl StackBuilder for MemoryBackend {
    async fn build(&self, manifest: &Manifest) -> Result<(), BoxError> {
        self.check_fault(Operation::Build).await?;

        let mut apps = self.apps.write().await;

        for process in &manifest.processes {
            let name = service_name(&manifest.app.id, &process.name);
            if let Some(owner) = service_owner(&apps, &manifest.app.id, &name) {
                return Err(Box::new(BackendError::ServiceConflict {
                    service: name,
                    app: owner.to_string(),
                }));
            }
            Self::check_desired_count(&name, process.quantity)?;
        }

        let services = apps.entry(manifest.app.id.clone()).or_default();

        services.retain(|process, _| manifest.process(process).is_some());

        for process in &manifest.processes {
            let service = services
                .entry(process.name.clone())
                .or_insert_with(|| ServiceState {
                    name: service_name(&manifest.app.id, &process.name),
                    image: String::new(),
                    env: HashMap::new(),
                    desired_count: 0,
                    task_arns: Vec::new(),
                });
            service.image = manifest.process_image(process).to_string();
            service.env = manifest.process_env(process);
            service.desired_count = process.quantity;
            self.reconcile(service);
        }

        debug!(app = %manifest.app.id, services = services.len(), "stack converged");
        Ok(())
    }

    async fn remove(&self, app_id: &str) -> Result<(), BoxError> {
        self.check_fault(Operation::Remove).await?;

        let removed = self.apps.write().await.remove(app_id);
        if removed.is_none() {
            return Err(Box::new(BackendError::AppNotFound(app_id.to_string())));
        }
        debug!(app = %app_id, "stack removed");
        Ok(())
    }

    async fn services(&self, app_id: &str) -> Result<HashMap<String, String>, BoxError> {
        self.check_fault(Operation::Services).await?;

        let apps = self.apps.read().await;
        Ok(apps
            .get(app_id)
            .map(|services| {
                services
                    .iter()
                    .map(|(process, s)| (process.clone(), s.name.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn restart(&self, app_id: &str) -> Result<(), BoxError> {
        self.check_fault(Operation::Restart).await?;

        let mut apps = self.apps.write().await;
        let services = apps
            .get_mut(app_id)
            .ok_or_else(|| BackendError::AppNotFound(app_id.to_string()))?;

        for service in services.values_mut() {
            service.task_arns.clear();
            self.reconcile(service);
        }
        debug!(app = %app_id, "tasks replaced");
        Ok(())
    }
}

#[async_trait]
impl EcsClient for MemoryBackend {
    async fn update_service(
        &self,
        input: UpdateServiceInput,
    ) -> Result<UpdateServiceOutput, BoxError> {
        self.check_fault(Operation::UpdateService).await?;
        self.check_cluster(&input.cluster)?;
        Self::check_desired_count(&input.service, input.desired_count)?;

        let mut apps = self.apps.write().await;
        let service = find_service_mut(&mut apps, &input.service)
            .ok_or_else(|| BackendError::ServiceNotFound(input.service.clone()))?;

        service.desired_count = input.desired_count;
        self.reconcile(service);

        Ok(UpdateServiceOutput {
            service: Some(Service {
                service_name: service.name.clone(),
                desired_count: service.desired_count,
                running_count: service.task_arns.len() as u32,
            }),
        })
    }

    async fn list_tasks(&self, input: ListTasksInput) -> Result<ListTasksOutput, BoxError> {
        self.check_fault(Operation::ListTasks).await?;
        self.check_cluster(&input.cluster)?;

        let apps = self.apps.read().await;
        let service = find_service(&apps, &input.service_name)
            .ok_or_else(|| BackendError::ServiceNotFound(input.service_name.clone()))?;

        Ok(ListTasksOutput {
            task_arns: service.task_arns.clone(),
        })
    }

    async fn describe_tasks(
        &self,
        input: DescribeTasksInput,
    ) -> Result<DescribeTasksOutput, BoxError> {
        self.check_fault(Operation::DescribeTasks).await?;
        self.check_cluster(&input.cluster)?;

        let apps = self.apps.read().await;
        let known: HashSet<&str> = apps
            .values()
            .flat_map(|services| services.values())
            .flat_map(|s| s.task_arns.iter().map(String::as_str))
            .collect();

        let mut output = DescribeTasksOutput::default();
        for arn in input.tasks {
            if known.contains(arn.as_str()) {
                output.tasks.push(TaskDescription {
                    task_arn: arn,
                    last_status: TASK_RUNNING.to_string(),
                    desired_status: Some(TASK_RUNNING.to_string()),
                });
            } else {
                output.failures.push(Failure {
                    arn,
                    reason: "MISSING".to_string(),
                });
            }
        }
        Ok(output)
    }
}
