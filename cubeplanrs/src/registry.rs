use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glob::glob;

use crate::config::PlannerConfig;
use crate::error::{CubeplanError, Result};
use crate::models::CubeModel;
use crate::validation::{validate_aggregation_groups, Severity};

/// In-memory registry of cube designs, keyed by cube name.
#[derive(Debug, Default, Clone)]
pub struct CubeRegistry {
    pub cubes: HashMap<String, CubeModel>,
}

impl CubeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(cubes: Vec<CubeModel>) -> Self {
        let mut registry = CubeRegistry::new();
        for cube in cubes {
            registry.cubes.insert(cube.name.clone(), cube);
        }
        registry
    }

    /// Load every cube descriptor (`*.yml`) under the given directory.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(CubeplanError::Validation(format!(
                "cube directory not found: {}",
                dir.display()
            )));
        }
        let mut registry = CubeRegistry::new();
        for entry in glob(&format!("{}/*.yml", dir.display()))
            .map_err(|e| CubeplanError::Other(e.into()))?
            .flatten()
        {
            let contents = fs::read_to_string(&entry)?;
            let cube: CubeModel = serde_yaml::from_str(&contents)?;
            tracing::debug!(cube = %cube.name, file = %entry.display(), "loaded cube descriptor");
            registry.cubes.insert(cube.name.clone(), cube);
        }
        Ok(registry)
    }

    pub fn get_cube(&self, name: &str) -> Option<&CubeModel> {
        self.cubes.get(name)
    }

    /// Validate every cube's aggregation groups. Warnings are logged;
    /// any error rejects the registry so a broken design never activates.
    pub fn validate_registry(&self, config: &PlannerConfig) -> Result<()> {
        let mut errors = Vec::new();
        for cube in self.cubes.values() {
            for message in validate_aggregation_groups(cube, config.cube.max_combination) {
                match message.severity {
                    Severity::Warn => {
                        tracing::warn!(cube = %cube.name, "{}", message.message);
                    }
                    Severity::Error => {
                        errors.push(format!("cube {}: {}", cube.name, message.message));
                    }
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CubeplanError::Validation(errors.join("; ")))
        }
    }
}
