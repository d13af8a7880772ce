//! Cluster configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::{ClusterError, ClusterResult};
use crate::observability::Severity;

/// Configuration of a local cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Number of coordinator/worker pairs (world size is twice this)
    #[serde(default = "default_coordinators")]
    pub coordinators: usize,

    /// Synthetic rows generated for each worker
    #[serde(default = "default_rows_per_worker")]
    pub rows_per_worker: usize,

    /// Company ids run `1..=max_company_id` on every worker
    #[serde(default = "default_max_company_id")]
    pub max_company_id: u32,

    /// First sale date of the synthetic data
    #[serde(default = "default_dataset_start")]
    pub dataset_start: NaiveDate,

    /// Last sale date of the synthetic data
    #[serde(default = "default_dataset_end")]
    pub dataset_end: NaiveDate,

    /// Seed of the synthetic data
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Lowest log severity written: trace, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Receive timeout in milliseconds. Absent means receives block forever.
    #[serde(default)]
    pub recv_timeout_ms: Option<u64>,
}

fn default_coordinators() -> usize {
    3
}
fn default_rows_per_worker() -> usize {
    1000
}
fn default_max_company_id() -> u32 {
    10
}
fn default_dataset_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}
fn default_dataset_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default()
}
fn default_seed() -> u64 {
    42
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            coordinators: default_coordinators(),
            rows_per_worker: default_rows_per_worker(),
            max_company_id: default_max_company_id(),
            dataset_start: default_dataset_start(),
            dataset_end: default_dataset_end(),
            seed: default_seed(),
            log_level: default_log_level(),
            recv_timeout_ms: None,
        }
    }
}

impl ClusterConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ClusterResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClusterConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration to a new file. Never overwrites.
    pub fn save_new(&self, path: &Path) -> ClusterResult<()> {
        if path.exists() {
            return Err(ClusterError::AlreadyExists(path.display().to_string()));
        }
        self.validate()?;
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ClusterResult<()> {
        if self.coordinators == 0 {
            return Err(ClusterError::Config("coordinators must be > 0".into()));
        }

        if self.max_company_id == 0 {
            return Err(ClusterError::Config("max_company_id must be > 0".into()));
        }

        if self.dataset_start > self.dataset_end {
            return Err(ClusterError::Config(format!(
                "dataset_start {} is after dataset_end {}",
                self.dataset_start, self.dataset_end
            )));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(ClusterError::Config(format!(
                "Invalid log_level: '{}'",
                self.log_level
            )));
        }

        if self.recv_timeout_ms == Some(0) {
            return Err(ClusterError::Config("recv_timeout_ms must be > 0".into()));
        }

        Ok(())
    }

    /// Number of processes: one coordinator and one worker per pair
    pub fn world_size(&self) -> usize {
        self.coordinators * 2
    }

    /// Configured log threshold
    pub fn log_threshold(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }

    /// Configured receive timeout
    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout_ms.map(Duration::from_millis)
    }
}
