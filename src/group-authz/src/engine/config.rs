//! Engine configuration loading

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AuthzError, Result};

/// Group-membership engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Collect evaluation metrics
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Compiled patterns kept before the pattern cache is flushed
    #[serde(default = "default_pattern_cache_capacity")]
    pub pattern_cache_capacity: usize,

    /// Latency samples kept for percentile metrics
    #[serde(default = "default_max_latency_samples")]
    pub max_latency_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_metrics: default_true(),
            pattern_cache_capacity: default_pattern_cache_capacity(),
            max_latency_samples: default_max_latency_samples(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuthzError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_pattern_cache_capacity() -> usize { crate::pattern::DEFAULT_CACHE_CAPACITY }
fn default_max_latency_samples() -> usize { super::metrics::DEFAULT_MAX_SAMPLES }
