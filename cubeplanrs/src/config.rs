//! Planner configuration.
//!
//! TOML-based configuration with built-in defaults; every section is
//! optional in the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CubeplanError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub cube: CubeConfig,
    pub query: QueryConfig,
}

/// Cube design limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Ceiling on the admitted combination count of one aggregation group
    /// (default: 4096). Cubes may override it per descriptor.
    pub max_combination: u64,
}

/// Query planning limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Memory budget for rows carrying memory-hungry measures, in bytes
    /// (default: 3 GiB).
    pub mem_budget_bytes: u64,
    /// Safety margin multiplied into a pushed-down limit per ready
    /// segment (default: 1).
    pub push_down_limit_margin: usize,
    /// Hard cap on any pushed-down limit (default: 1_000_000).
    pub max_push_down_limit: usize,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            max_combination: 4096,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            mem_budget_bytes: 3 * 1024 * 1024 * 1024,
            push_down_limit_margin: 1,
            max_push_down_limit: 1_000_000,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CubeplanError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| CubeplanError::Config(format!("failed to parse config: {e}")))
    }
}
