//! App manifests: the desired state submitted on deploy.
//!
//! A manifest is usually written as TOML:
//!
//! ```toml
//! [app]
//! id = "acme-inc"
//! name = "acme-inc"
//! version = "v12"
//! image = "remind101/acme-inc:latest"
//!
//! [[processes]]
//! name = "web"
//! command = ["./bin/web"]
//! quantity = 2
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{SchedulerError, SchedulerResult};

/// Full desired-state description of an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub app: App,
    #[serde(default)]
    pub processes: Vec<Process>,
}

/// The deployed unit. Env and labels apply to every process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Default container image for processes without an override.
    pub image: String,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// A named role within an app.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Process {
    pub name: String,
    /// Image override; falls back to the app image.
    pub image: Option<String>,
    #[serde(default)]
    pub command: Vec<String>,
    /// Desired number of running instances.
    #[serde(default)]
    pub quantity: u32,
    /// Memory limit in bytes.
    pub memory: Option<u64>,
    pub cpu_shares: Option<u32>,
    /// Process count limit inside the container.
    pub nproc: Option<u64>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Manifest {
    pub fn new(app: App, processes: Vec<Process>) -> Self {
        Self { app, processes }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that no two processes share a name.
    ///
    /// This is the only shape a scheduler requires of a manifest; anything
    /// else is left for the backend to accept or refuse.
    pub fn check_unique_processes(&self) -> SchedulerResult<()> {
        let mut seen = HashSet::new();
        for process in &self.processes {
            if !seen.insert(process.name.as_str()) {
                return Err(SchedulerError::InvalidManifest(format!(
                    "duplicate process {} in app {}",
                    process.name, self.app.id
                )));
            }
        }
        Ok(())
    }

    /// Authoring checks: the app has an id, and process names are non-empty
    /// and unique.
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.app.id.is_empty() {
            return Err(SchedulerError::InvalidManifest(
                "app id must not be empty".to_string(),
            ));
        }

        if self.processes.iter().any(|p| p.name.is_empty()) {
            return Err(SchedulerError::InvalidManifest(format!(
                "app {} has a process with an empty name",
                self.app.id
            )));
        }

        self.check_unique_processes()
    }

    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// Image the process runs: its own override, else the app image.
    pub fn process_image<'a>(&'a self, process: &'a Process) -> &'a str {
        process.image.as_deref().unwrap_or(&self.app.image)
    }

    /// App env overlaid with the process env.
    pub fn process_env(&self, process: &Process) -> HashMap<String, String> {
        merge(&self.app.env, &process.env)
    }

    /// App labels overlaid with the process labels.
    pub fn process_labels(&self, process: &Process) -> HashMap<String, String> {
        merge(&self.app.labels, &process.labels)
    }
}

fn merge(
    base: &HashMap<String, String>,
    overlay: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = base.clone();
    merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
