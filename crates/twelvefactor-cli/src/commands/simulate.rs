//! `tfx simulate`: deploy a manifest to an in-memory ECS cluster.
//!
//! Wires `EcsScheduler` to a `MemoryBackend`, runs `up`, then any requested
//! scaling and restart, and prints the resulting tasks.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;
use twelvefactor::{Scheduler, Task};
use twelvefactor_ecs::{EcsConfig, EcsScheduler, MemoryBackend};

use super::validate;

pub async fn simulate(
    manifest_path: &str,
    config_path: Option<&str>,
    scales: &[String],
    restart: bool,
    format: &str,
) -> Result<()> {
    let manifest = validate::load(Path::new(manifest_path))?;
    let config = match config_path {
        Some(path) => EcsConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to read config {path}"))?,
        None => EcsConfig::default(),
    };
    let app_id = manifest.app.id.as_str();

    let backend = Arc::new(MemoryBackend::new(config.cluster.clone()));
    let scheduler = EcsScheduler::from_config(&config, backend.clone(), backend);
    info!(cluster = %config.cluster, app = %app_id, "simulating deploy");

    scheduler.up(&manifest).await?;

    for scale in scales {
        let (process, count) = parse_scale(scale)?;
        scheduler.scale_process(app_id, process, count).await?;
    }

    if restart {
        scheduler.restart(app_id).await?;
    }

    let mut tasks = scheduler.tasks(app_id).await?;
    tasks.sort_by(|a, b| a.id.cmp(&b.id));

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&tasks)?),
        _ => print!("{}", render(app_id, &config.cluster, &tasks)),
    }

    Ok(())
}

/// Parse a `PROCESS=COUNT` scale request.
fn parse_scale(request: &str) -> Result<(&str, u32)> {
    let Some((process, count)) = request.split_once('=') else {
        bail!("invalid scale '{request}', expected PROCESS=COUNT");
    };
    if process.is_empty() {
        bail!("invalid scale '{request}', process name is empty");
    }
    let count = count
        .trim()
        .parse()
        .with_context(|| format!("invalid count in scale '{request}'"))?;
    Ok((process, count))
}

fn render(app_id: &str, cluster: &str, tasks: &[Task]) -> String {
    let mut out = format!("✓ {app_id}: {} task(s) in cluster {cluster}\n", tasks.len());
    for task in tasks {
        out.push_str(&format!("  {}  {}\n", task.id, task.state));
    }
    out
}
