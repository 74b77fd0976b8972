//! Analysis configuration.

use crate::clustering::ExtractionMode;
use crate::graph::DEFAULT_EXCLUDED_NAMESPACES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for one recovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Coupling threshold (CP) used by threshold extraction: descent stops
    /// where a merge's coupling drops below this value (0.0-1.0).
    #[serde(default = "default_coupling_threshold")]
    pub coupling_threshold: f64,

    /// Namespace prefixes whose units are dropped during normalization.
    #[serde(default = "default_excluded_namespaces")]
    pub excluded_namespaces: Vec<String>,

    /// How to cut the dendrogram into modules.
    #[serde(default)]
    pub mode: ExtractionMode,
}

fn default_coupling_threshold() -> f64 {
    0.02
}

fn default_excluded_namespaces() -> Vec<String> {
    DEFAULT_EXCLUDED_NAMESPACES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            coupling_threshold: default_coupling_threshold(),
            excluded_namespaces: default_excluded_namespaces(),
            mode: ExtractionMode::default(),
        }
    }
}

impl RecoveryConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse recovery config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.coupling_threshold) {
            anyhow::bail!(
                "coupling_threshold must be within 0.0-1.0, got {}",
                self.coupling_threshold
            );
        }
        Ok(())
    }
}
