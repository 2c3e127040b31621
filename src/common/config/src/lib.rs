//! Configuration management for Tessera.
//!
//! Provides session configuration for dataset construction: default
//! parallelism, the worker pool size, and file discovery rules.

use serde::{Deserialize, Serialize};

use common_error::TesseraResult;

/// Parallelism used when a caller does not request one.
pub const DEFAULT_PARALLELISM: usize = 200;

/// Global Tessera configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    /// Execution configuration.
    pub execution: ExecutionConfig,
    /// File discovery configuration.
    pub io: IoConfig,
}

impl TesseraConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> TesseraResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the default parallelism.
    pub fn with_default_parallelism(mut self, parallelism: usize) -> Self {
        self.execution.default_parallelism = parallelism;
        self
    }

    /// Set the number of worker threads.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.execution.num_workers = Some(num_workers);
        self
    }
}

/// Execution backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Target number of partitions when none is requested.
    pub default_parallelism: usize,
    /// Worker threads for the local runtime. `None` uses all cores.
    pub num_workers: Option<usize>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_parallelism: DEFAULT_PARALLELISM,
            num_workers: None,
        }
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// File name prefixes skipped when listing a directory.
    pub ignore_prefixes: Vec<String>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            ignore_prefixes: vec![".".to_string(), "_".to_string()],
        }
    }
}

impl IoConfig {
    /// Whether a file name is hidden from directory listings.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && file_name.starts_with(prefix.as_str()))
    }
}
