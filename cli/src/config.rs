//! `carefind.toml`: one file with a section per crate.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/carefind"
//!
//! [live]
//! fetch_delay_ms = 500
//! auto_refresh_minutes = 30
//!
//! [[scoring.availability_rules]]
//! id = "vacancy-available"
//! availability = "available"
//! phrases = ["空室あり"]
//! ```
//!
//! Every section is optional. An absent file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use carefind_contracts::error::{CarefindError, CarefindResult};
use carefind_live::LiveConfig;
use carefind_scoring::ScoringConfig;

/// Data directory used when neither the flag nor the config names one.
pub const DEFAULT_DATA_DIR: &str = ".carefind";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub live: LiveConfig,
}

impl AppConfig {
    pub fn from_toml_str(toml_str: &str) -> CarefindResult<Self> {
        let config: AppConfig = toml::from_str(toml_str).map_err(|e| CarefindError::ConfigError {
            reason: format!("failed to parse carefind TOML: {e}"),
        })?;
        config.live.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CarefindResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CarefindError::ConfigError {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load(path: Option<&Path>) -> CarefindResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// `--data-dir` wins over `[storage] data_dir`, which wins over the default.
    pub fn data_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.storage.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}
