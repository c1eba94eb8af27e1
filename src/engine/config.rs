use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::combat::{CombatRules, CombatStartPolicy};
use crate::error::ConfigError;
use crate::logging::TracingConfig;
use crate::progression::ProgressionRules;
use crate::spawn::SpawnConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seeds combat and spawn dice; `None` seeds from entropy
    pub rng_seed: Option<u64>,
    pub combat: CombatRules,
    pub progression: ProgressionRules,
    pub combat_start_policy: CombatStartPolicy,
    pub spawn: SpawnConfig,
    /// RON or JSON catalog replacing the built-in content
    pub catalog_path: Option<PathBuf>,
    pub logging: TracingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            combat: CombatRules::default(),
            progression: ProgressionRules::default(),
            combat_start_policy: CombatStartPolicy::Replace,
            spawn: SpawnConfig::default(),
            catalog_path: None,
            logging: TracingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combat.validate()?;
        self.spawn.validate()
    }

    /// The configured catalog file, or the built-in content
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };
        self.spawn.validate_against(&catalog)?;
        Ok(catalog)
    }
}
