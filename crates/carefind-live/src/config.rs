//! Timing and behaviour of the live-info collaborators and bulk runners.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use carefind_contracts::error::{CarefindError, CarefindResult};

/// Delays are in milliseconds, the auto-refresh interval in minutes.
///
/// ```toml
/// fetch_delay_ms = 2000
/// refresh_interval_ms = 1000
/// auto_refresh_minutes = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Simulated latency of one live-info fetch or website probe.
    pub fetch_delay_ms: u64,
    /// Pause between requests in `refresh_all`.
    pub refresh_interval_ms: u64,
    /// Pause between requests in `bulk_web_update`.
    pub bulk_update_interval_ms: u64,
    /// Pause between URLs in `process_urls`.
    pub url_interval_ms: u64,
    /// Simulated extraction latency is drawn from this range.
    pub extract_min_delay_ms: u64,
    pub extract_max_delay_ms: u64,
    pub auto_refresh_minutes: u64,
    /// Probability in [0, 1] that a simulated request fails.
    pub failure_rate: f64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: 2000,
            refresh_interval_ms: 1000,
            bulk_update_interval_ms: 1500,
            url_interval_ms: 1500,
            extract_min_delay_ms: 1000,
            extract_max_delay_ms: 3000,
            auto_refresh_minutes: 60,
            failure_rate: 0.0,
        }
    }
}

impl LiveConfig {
    pub fn from_toml_str(toml_str: &str) -> CarefindResult<Self> {
        let config: LiveConfig = toml::from_str(toml_str).map_err(|e| CarefindError::ConfigError {
            reason: format!("failed to parse live TOML: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CarefindResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CarefindError::ConfigError {
            reason: format!("failed to read live config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> CarefindResult<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(CarefindError::ConfigError {
                reason: format!("failure_rate must be within [0, 1], got {}", self.failure_rate),
            });
        }
        if self.extract_min_delay_ms > self.extract_max_delay_ms {
            return Err(CarefindError::ConfigError {
                reason: "extract_min_delay_ms exceeds extract_max_delay_ms".to_string(),
            });
        }
        if self.auto_refresh_minutes == 0 {
            return Err(CarefindError::ConfigError {
                reason: "auto_refresh_minutes must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// All delays zero: for tests and scripted runs.
    pub fn instant() -> Self {
        Self {
            fetch_delay_ms: 0,
            refresh_interval_ms: 0,
            bulk_update_interval_ms: 0,
            url_interval_ms: 0,
            extract_min_delay_ms: 0,
            extract_max_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn bulk_update_interval(&self) -> Duration {
        Duration::from_millis(self.bulk_update_interval_ms)
    }

    pub fn url_interval(&self) -> Duration {
        Duration::from_millis(self.url_interval_ms)
    }

    pub fn auto_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_minutes * 60)
    }
}
