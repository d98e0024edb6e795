//! Top-level Vantage configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{defaults, AllocatorConfig, EvaluatorConfig, StorageConfig, TargetingConfig};
use crate::errors::ConfigError;
use crate::models::ConfidenceLevel;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`VANTAGE_*`)
/// 2. Project config (`vantage.toml` in project root)
/// 3. User config (`~/.vantage/config.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VantageConfig {
    pub evaluator: EvaluatorConfig,
    pub allocator: AllocatorConfig,
    pub storage: StorageConfig,
    pub targeting: TargetingConfig,
}

impl VantageConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Project config
        let project_config_path = root.join("vantage.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Environment variables
        Self::apply_env_overrides(&mut config);

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &VantageConfig) -> Result<(), ConfigError> {
        if let Some(level) = config.evaluator.default_confidence_level {
            if ConfidenceLevel::try_from(level).is_err() {
                return Err(ConfigError::ValidationFailed {
                    field: "evaluator.default_confidence_level".to_string(),
                    message: "must be one of 90, 95, 99".to_string(),
                });
            }
        }
        if config.evaluator.min_visits_per_variant == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "evaluator.min_visits_per_variant".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.allocator.max_visitor_id_len == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "allocator.max_visitor_id_len".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(size) = config.storage.read_pool_size {
            if !(1..=defaults::MAX_READ_POOL_SIZE).contains(&size) {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.read_pool_size".to_string(),
                    message: format!("must be between 1 and {}", defaults::MAX_READ_POOL_SIZE),
                });
            }
        }
        if config.targeting.matcher_cache_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "targeting.matcher_cache_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.vantage/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".vantage").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut VantageConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: VantageConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut VantageConfig, other: &VantageConfig) {
        // Evaluator
        if other.evaluator.default_confidence_level.is_some() {
            base.evaluator.default_confidence_level = other.evaluator.default_confidence_level;
        }
        if other.evaluator.min_visits_per_variant.is_some() {
            base.evaluator.min_visits_per_variant = other.evaluator.min_visits_per_variant;
        }

        // Allocator
        if other.allocator.max_visitor_id_len.is_some() {
            base.allocator.max_visitor_id_len = other.allocator.max_visitor_id_len;
        }
        if other.allocator.seed.is_some() {
            base.allocator.seed = other.allocator.seed;
        }

        // Storage
        if other.storage.db_path.is_some() {
            base.storage.db_path = other.storage.db_path.clone();
        }
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }

        // Targeting
        if other.targeting.matcher_cache_capacity.is_some() {
            base.targeting.matcher_cache_capacity = other.targeting.matcher_cache_capacity;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `VANTAGE_EVALUATOR_MIN_VISITS`, `VANTAGE_STORAGE_DB_PATH`, etc.
    fn apply_env_overrides(config: &mut VantageConfig) {
        if let Ok(val) = std::env::var("VANTAGE_EVALUATOR_CONFIDENCE_LEVEL") {
            if let Ok(v) = val.parse::<u8>() {
                config.evaluator.default_confidence_level = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VANTAGE_EVALUATOR_MIN_VISITS") {
            if let Ok(v) = val.parse::<u64>() {
                config.evaluator.min_visits_per_variant = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VANTAGE_ALLOCATOR_MAX_VISITOR_ID_LEN") {
            if let Ok(v) = val.parse::<usize>() {
                config.allocator.max_visitor_id_len = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VANTAGE_ALLOCATOR_SEED") {
            if let Ok(v) = val.parse::<u64>() {
                config.allocator.seed = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VANTAGE_STORAGE_DB_PATH") {
            config.storage.db_path = Some(val);
        }
        if let Ok(val) = std::env::var("VANTAGE_STORAGE_READ_POOL_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.storage.read_pool_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VANTAGE_TARGETING_MATCHER_CACHE_CAPACITY") {
            if let Ok(v) = val.parse::<u64>() {
                config.targeting.matcher_cache_capacity = Some(v);
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
