//! ECS scheduler configuration.
//!
//! ```toml
//! cluster = "production"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cluster name ECS uses when none is given.
pub const DEFAULT_CLUSTER: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcsConfig {
    /// Cluster every ECS call is scoped to.
    #[serde(default = "default_cluster")]
    pub cluster: String,
}

fn default_cluster() -> String {
    DEFAULT_CLUSTER.to_string()
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            cluster: default_cluster(),
        }
    }
}

impl EcsConfig {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: EcsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cluster.trim().is_empty() {
            anyhow::bail!("cluster must not be empty");
        }
        Ok(())
    }
}
