//! End-to-end scheduler tests against the in-memory ECS backend.
//!
//! Drives the full `Scheduler` contract (up, scale, tasks, restart, remove)
//! through `EcsScheduler` with `MemoryBackend` serving as both the stack
//! builder and the ECS client.

use std::collections::HashSet;
use std::sync::{Arc, Once};

use twelvefactor::{App, Manifest, Process, Scheduler, SchedulerError};
use twelvefactor_ecs::memory::Operation;
use twelvefactor_ecs::{BackendError, EcsConfig, EcsScheduler, MemoryBackend};

// ── Tracing setup ────────────────────────────────────────────────

static TRACING_INIT: Once = Once::new();

/// Controlled by `RUST_LOG` (e.g. `RUST_LOG=twelvefactor_ecs=debug`).
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// ── Helpers ──────────────────────────────────────────────────────

fn setup(cluster: &str) -> (EcsScheduler, Arc<MemoryBackend>) {
    init_tracing();
    let backend = Arc::new(MemoryBackend::new(cluster));
    let scheduler =
        EcsScheduler::from_config(&EcsConfig::new(cluster), backend.clone(), backend.clone());
    (scheduler, backend)
}

fn acme(web: u32, worker: u32) -> Manifest {
    Manifest::from_toml_str(&format!(
        r#"
[app]
id = "acme"
name = "acme-inc"
version = "v7"
image = "remind101/acme-inc:v7"

[app.env]
PORT = "80"

[[processes]]
name = "web"
command = ["./bin/web"]
quantity = {web}

[processes.env]
PORT = "8080"

[[processes]]
name = "worker"
command = ["./bin/worker"]
quantity = {worker}
"#
    ))
    .unwrap()
}

fn task_ids(tasks: &[twelvefactor::Task]) -> HashSet<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

// ── Lifecycle ────────────────────────────────────────────────────

#[tokio::test]
async fn up_then_tasks_reports_every_instance() {
    let (scheduler, backend) = setup("local");

    scheduler.up(&acme(2, 1)).await.unwrap();

    let tasks = scheduler.tasks("acme").await.unwrap();
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|t| t.state == "RUNNING"));
    assert!(tasks.iter().all(|t| !t.id.contains('/')));
    assert_eq!(
        backend.service_env("acme--web").await.unwrap()["PORT"],
        "8080"
    );
}

#[tokio::test]
async fn scale_process_changes_task_count() {
    let (scheduler, backend) = setup("local");
    scheduler.up(&acme(1, 1)).await.unwrap();

    scheduler.scale_process("acme", "web", 4).await.unwrap();
    assert_eq!(backend.desired_count("acme--web").await, Some(4));
    assert_eq!(scheduler.tasks("acme").await.unwrap().len(), 5);

    scheduler.scale_process("acme", "worker", 0).await.unwrap();
    assert_eq!(scheduler.tasks("acme").await.unwrap().len(), 4);
}

#[tokio::test]
async fn scale_unknown_process_is_not_found() {
    let (scheduler, _) = setup("local");
    scheduler.up(&acme(1, 1)).await.unwrap();

    let err = scheduler.scale_process("acme", "clock", 1).await.unwrap_err();
    assert!(matches!(err, SchedulerError::ProcessNotFound { .. }));
}

#[tokio::test]
async fn redeploy_converges_to_new_quantities() {
    let (scheduler, _) = setup("local");
    scheduler.up(&acme(3, 2)).await.unwrap();
    scheduler.up(&acme(1, 0)).await.unwrap();

    assert_eq!(scheduler.tasks("acme").await.unwrap().len(), 1);
}

#[tokio::test]
async fn restart_replaces_tasks_in_place() {
    let (scheduler, _) = setup("local");
    scheduler.up(&acme(2, 1)).await.unwrap();
    let before = task_ids(&scheduler.tasks("acme").await.unwrap());

    scheduler.restart("acme").await.unwrap();

    let after = task_ids(&scheduler.tasks("acme").await.unwrap());
    assert_eq!(after.len(), 3);
    assert!(before.is_disjoint(&after));
}

#[tokio::test]
async fn remove_leaves_nothing_running() {
    let (scheduler, _) = setup("local");
    scheduler.up(&acme(2, 1)).await.unwrap();

    scheduler.remove("acme").await.unwrap();

    assert!(scheduler.tasks("acme").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_app_has_no_tasks() {
    let (scheduler, _) = setup("local");
    assert!(scheduler.tasks("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn apps_are_isolated() {
    let (scheduler, _) = setup("local");
    scheduler.up(&acme(2, 0)).await.unwrap();

    let mut other = acme(1, 0);
    other.app.id = "globex".to_string();
    scheduler.up(&other).await.unwrap();

    assert_eq!(scheduler.tasks("acme").await.unwrap().len(), 2);
    assert_eq!(scheduler.tasks("globex").await.unwrap().len(), 1);
}

// ── Error transparency ───────────────────────────────────────────

#[tokio::test]
async fn backend_errors_pass_through_unchanged() {
    let (scheduler, backend) = setup("local");
    scheduler.up(&acme(1, 1)).await.unwrap();

    backend.fail_next(Operation::DescribeTasks).await;
    let err = scheduler.tasks("acme").await.unwrap_err();
    assert_eq!(
        err.collaborator_ref::<BackendError>(),
        Some(&BackendError::Injected(Operation::DescribeTasks))
    );

    backend.fail_next(Operation::UpdateService).await;
    let err = scheduler.scale_process("acme", "web", 2).await.unwrap_err();
    assert_eq!(err.to_string(), "injected failure in update_service");
    assert_eq!(backend.desired_count("acme--web").await, Some(1));
}

#[tokio::test]
async fn remove_of_unknown_app_surfaces_builder_error() {
    let (scheduler, _) = setup("local");

    let err = scheduler.remove("ghost").await.unwrap_err();
    assert_eq!(
        err.collaborator_ref::<BackendError>(),
        Some(&BackendError::AppNotFound("ghost".to_string()))
    );
}

#[tokio::test]
async fn cluster_mismatch_is_reported_by_backend() {
    init_tracing();
    let backend = Arc::new(MemoryBackend::new("local"));
    let scheduler = EcsScheduler::new("production", backend.clone(), backend.clone());
    scheduler.up(&acme(1, 0)).await.unwrap();

    let err = scheduler.scale_process("acme", "web", 2).await.unwrap_err();
    assert_eq!(
        err.collaborator_ref::<BackendError>(),
        Some(&BackendError::ClusterNotFound("production".to_string()))
    );
}

#[tokio::test]
async fn duplicate_processes_never_reach_backend() {
    let (scheduler, backend) = setup("local");
    let manifest = Manifest::new(
        App {
            id: "acme".to_string(),
            image: "acme:v1".to_string(),
            ..App::default()
        },
        vec![
            Process {
                name: "web".to_string(),
                quantity: 1,
                ..Process::default()
            },
            Process {
                name: "web".to_string(),
                quantity: 2,
                ..Process::default()
            },
        ],
    );

    backend.fail_next(Operation::Build).await;
    let err = scheduler.up(&manifest).await.unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidManifest(_)));
    assert_eq!(backend.desired_count("acme--web").await, None);

    // The armed fault is still pending, so build was never called.
    let err = scheduler.up(&acme(1, 0)).await.unwrap_err();
    assert!(err.is_collaborator());
}

#[tokio::test]
async fn zero_value_manifest_reaches_backend() {
    let (scheduler, backend) = setup("local");
    let manifest = Manifest::new(App::default(), vec![]);

    backend.fail_next(Operation::Build).await;
    let err = scheduler.up(&manifest).await.unwrap_err();
    assert_eq!(
        err.collaborator_ref::<BackendError>(),
        Some(&BackendError::Injected(Operation::Build))
    );

    scheduler.up(&manifest).await.unwrap();
    assert!(scheduler.tasks("").await.unwrap().is_empty());
}

#[tokio::test]
async fn colliding_service_names_are_refused() {
    let (scheduler, _) = setup("local");
    let mut first = acme(1, 0);
    first.app.id = "a--b".to_string();
    first.processes.truncate(1);
    first.processes[0].name = "c".to_string();
    scheduler.up(&first).await.unwrap();

    let mut second = first.clone();
    second.app.id = "a".to_string();
    second.processes[0].name = "b--c".to_string();
    let err = scheduler.up(&second).await.unwrap_err();
    assert!(matches!(
        err.collaborator_ref::<BackendError>(),
        Some(BackendError::ServiceConflict { .. })
    ));

    scheduler.scale_process("a--b", "c", 2).await.unwrap();
    assert_eq!(scheduler.tasks("a--b").await.unwrap().len(), 2);
    assert!(scheduler.tasks("a").await.unwrap().is_empty());
}

// ── Concurrency ──────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_calls_across_apps() {
    let (scheduler, _) = setup("local");
    let scheduler: Arc<dyn Scheduler> = Arc::new(scheduler);

    let mut handles = Vec::new();
    for i in 0..8u32 {
        let scheduler = scheduler.clone();
        handles.push(tokio::spawn(async move {
            let mut manifest = acme(i % 3 + 1, 0);
            manifest.app.id = format!("app-{i}");
            scheduler.up(&manifest).await.unwrap();
            scheduler.tasks(&manifest.app.id).await.unwrap().len()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i % 3 + 1);
    }
}
