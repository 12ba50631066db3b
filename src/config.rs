//! Engine configuration
//!
//! Weight bounds, weight step, bulk-exclusion keys and an optional RNG seed.
//! Loaded from YAML; every field has a default so an absent file is fine.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "prompt-switch.yaml";

/// Environment variable overriding the config path
pub const CONFIG_ENV_VAR: &str = "PROMPT_SWITCH_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_weight: f64,
    pub max_weight: f64,
    /// Step applied by a single weight increase/decrease
    pub weight_step: f64,
    /// Tag that exempts an entity from "deactivate all entities"
    pub deactivate_exempt_key: String,
    /// Tag that exempts an entity from "randomize all entities"
    pub random_exempt_key: String,
    /// Fixed seed for reproducible random pickup
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_weight: -1.0,
            max_weight: 2.0,
            weight_step: 0.10,
            deactivate_exempt_key: "a".to_string(),
            random_exempt_key: "r".to_string(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Weight bounds as used by the weight codec
    pub fn weight_bounds(&self) -> crate::buffer::WeightBounds {
        crate::buffer::WeightBounds {
            min: self.min_weight,
            max: self.max_weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_weight > self.max_weight {
            bail!(
                "min_weight {} exceeds max_weight {}",
                self.min_weight,
                self.max_weight
            );
        }
        if !(self.weight_step > 0.0) {
            bail!("weight_step must be positive, got {}", self.weight_step);
        }
        if self.deactivate_exempt_key.trim().is_empty() || self.random_exempt_key.trim().is_empty()
        {
            bail!("exemption keys must not be empty");
        }
        Ok(())
    }
}

pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Resolve the config path
    ///
    /// Path resolution order:
    /// 1. PROMPT_SWITCH_CONFIG environment variable (explicit override)
    /// 2. `prompt-switch.yaml` in the working directory
    /// 3. Built-in defaults
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::new(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::new(DEFAULT_CONFIG_FILE);
        }

        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load and validate the configuration.
    ///
    /// A path that does not exist yields defaults; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load(&self) -> Result<EngineConfig> {
        let Some(path) = &self.path else {
            return Ok(EngineConfig::default());
        };

        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(EngineConfig::default());
        }

        info!("Loading engine configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: EngineConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }
}
