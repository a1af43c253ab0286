/**
 * config.rs
 * Registry configuration (YAML)
 *
 * Format:
 * ```yaml
 * portRange:
 *   start: 8765
 *   end: 8864
 * retentionHours: 24
 * sweepIntervalSecs: 300
 * ```
 *
 * Environment overrides (applied on top of file or defaults):
 * - CKP_PORT_START
 * - CKP_PORT_END
 * - CKP_PORT_RETENTION_HOURS
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration as StdDuration;

use crate::errors::{PortError, Result};
use crate::port::{PortRange, PortRegistry, DEFAULT_RETENTION_HOURS};

pub const ENV_PORT_START: &str = "CKP_PORT_START";
pub const ENV_PORT_END: &str = "CKP_PORT_END";
pub const ENV_RETENTION_HOURS: &str = "CKP_PORT_RETENTION_HOURS";

/// Default interval between background cleanup passes
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Registry configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(default)]
    pub port_range: PortRange,
    #[serde(default = "default_retention_hours")]
    pub retention_hours: i64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_retention_hours() -> i64 {
    DEFAULT_RETENTION_HOURS
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            port_range: PortRange::default(),
            retention_hours: DEFAULT_RETENTION_HOURS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl RegistryConfig {
    /// Load config from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PortError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse config from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: RegistryConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config as YAML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply CKP_PORT_* environment overrides
    ///
    /// # Errors
    /// Returns `ConfigError` for unparsable values, and validation errors
    /// for the resulting config
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let start = read_env::<u16>(ENV_PORT_START)?.unwrap_or(self.port_range.start());
        let end = read_env::<u16>(ENV_PORT_END)?.unwrap_or(self.port_range.end());
        self.port_range = PortRange::new(start, end)?;
        if let Some(hours) = read_env::<i64>(ENV_RETENTION_HOURS)? {
            self.retention_hours = hours;
        }
        self.validate()
    }

    /// Check range bounds, retention and sweep interval
    pub fn validate(&self) -> Result<()> {
        if self.retention_hours < 0 {
            return Err(PortError::ConfigError(format!(
                "retentionHours must not be negative (got {})",
                self.retention_hours
            )));
        }
        if chrono::Duration::try_hours(self.retention_hours).is_none() {
            return Err(PortError::ConfigError(format!(
                "retentionHours is too large (got {})",
                self.retention_hours
            )));
        }
        if self.sweep_interval_secs == 0 {
            return Err(PortError::ConfigError(
                "sweepIntervalSecs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Retention window; out-of-range values saturate at the largest window
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.retention_hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn sweep_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.sweep_interval_secs)
    }

    /// Build a registry over the configured range
    pub fn build_registry(&self) -> Result<PortRegistry> {
        PortRegistry::new(self.port_range.start(), self.port_range.end())
    }
}

fn read_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PortError::ConfigError(format!("Invalid {}={:?}: {}", name, raw, e))),
        Err(_) => Ok(None),
    }
}
