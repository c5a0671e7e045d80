pub mod engine;
pub mod evolution;

pub use engine::EngineConfig;
pub use evolution::{EvolutionConfig, Param};

use crate::error::TunerError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TunerError> {
        self.evolution.validate()?;
        self.engine.validate()?;
        Ok(())
    }

    /// Load an override file on top of the embedded defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TunerError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TunerError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| TunerError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}
