//! Engine configuration
//!
//! Loaded from a TOML file; every field has a default so a partial (or
//! missing) file is fine.

use crate::error::{Result, ReviewError};
use crate::scheduler::sm2::{DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub database_path: PathBuf,
    pub ease_factor: EaseFactorConfig,
    pub level: LevelConfig,
    pub session: SessionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("review.sqlite3"),
            ease_factor: EaseFactorConfig::default(),
            level: LevelConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaseFactorConfig {
    pub default_ease: f64,
    pub min_ease: f64,
    pub max_interval_days: u32,
}

impl Default for EaseFactorConfig {
    fn default() -> Self {
        Self {
            default_ease: DEFAULT_EASE_FACTOR,
            min_ease: MIN_EASE_FACTOR,
            max_interval_days: 365,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub max_interval_days: u32,
    pub mastery_level: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            max_interval_days: 90,
            mastery_level: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub default_limit: usize,
    /// Write-back attempts per item before it is reported as unsynced
    pub persist_attempts: u32,
    /// Present incorrectly answered items again in a further round
    pub requeue_incorrect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            persist_attempts: 3,
            requeue_incorrect: true,
        }
    }
}

impl EngineConfig {
    /// Loads the config at `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ReviewError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ReviewError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ease = &self.ease_factor;
        if !ease.min_ease.is_finite() || ease.min_ease < MIN_EASE_FACTOR {
            return Err(ReviewError::Config(format!(
                "ease_factor.min_ease must be at least {}",
                MIN_EASE_FACTOR
            )));
        }
        if !ease.default_ease.is_finite() || ease.default_ease < ease.min_ease {
            return Err(ReviewError::Config(
                "ease_factor.default_ease must not be below min_ease".to_string(),
            ));
        }
        if ease.max_interval_days == 0 || self.level.max_interval_days == 0 {
            return Err(ReviewError::Config(
                "max_interval_days must be positive".to_string(),
            ));
        }
        if self.level.mastery_level == 0 {
            return Err(ReviewError::Config(
                "level.mastery_level must be positive".to_string(),
            ));
        }
        if self.session.persist_attempts == 0 {
            return Err(ReviewError::Config(
                "session.persist_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
