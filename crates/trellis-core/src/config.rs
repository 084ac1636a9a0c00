//! Reconciler configuration.

use crate::errors::ConfigError;
use crate::types::LIFECYCLE_NAME;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of clusters cleaned up concurrently during removal.
pub const DEFAULT_MAX_CONCURRENT_CLUSTERS: usize = 8;

/// Runtime configuration for the cascade reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Name the lifecycle handler reports under
    pub lifecycle_name: String,
    /// Width of the per-cluster fan-out during removal; 1 is sequential
    pub max_concurrent_clusters: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            lifecycle_name: LIFECYCLE_NAME.to_string(),
            max_concurrent_clusters: DEFAULT_MAX_CONCURRENT_CLUSTERS,
        }
    }
}

impl CascadeConfig {
    /// Configuration that visits clusters one at a time
    pub fn sequential() -> Self {
        Self {
            max_concurrent_clusters: 1,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            lifecycle = %config.lifecycle_name,
            max_concurrent_clusters = config.max_concurrent_clusters,
            "Loaded cascade config"
        );
        Ok(config)
    }

    /// Reject out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_clusters == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_clusters",
                message: "must be at least 1".to_string(),
            });
        }
        if self.lifecycle_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "lifecycle_name",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
