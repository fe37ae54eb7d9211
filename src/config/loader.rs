//! Configuration loading functionality
//!
//! Sources are layered by priority:
//! 1. Default values (lowest priority)
//! 2. JSON configuration file
//! 3. `MIDCERT_*` environment variables
//! 4. Command line arguments (highest priority)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::common::{DetectError, Result};
use crate::config::defaults::ENV_PREFIX;
use crate::config::{ConfigOverrides, DetectorConfig, DetectionMode};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace", "off"];

impl ConfigOverrides {
    /// Load overrides from a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|e| DetectError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        serde_json::from_str(&content)
            .map_err(|e| DetectError::Config(format!("Failed to parse JSON config file {}: {}", path.display(), e)))
    }

    /// Load overrides from `MIDCERT_*` environment variables
    pub fn from_env() -> Result<Self> {
        let overrides = Self {
            target: env_var("TARGET"),
            mode: env_var("MODE").map(|s| s.parse()).transpose()?,
            output: None,
            ca_bundle: env_var("CA_BUNDLE").map(PathBuf::from),
            log_level: env_var("LOG_LEVEL"),
        };

        if overrides != Self::default() {
            debug!("Found configuration in {}* environment variables", ENV_PREFIX);
        }
        Ok(overrides)
    }
}

/// Value of the environment variable `name` under the application prefix
///
/// Unset and empty variables both read as `None`.
pub fn env_var(name: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, name))
        .ok()
        .filter(|value| !value.is_empty())
}

impl DetectorConfig {
    /// Build the run configuration
    ///
    /// Each layer wins over the one before it: the file, then `environment`,
    /// then `cli`.
    pub fn load(config_file: Option<&Path>, environment: ConfigOverrides, cli: ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();
        debug!("Starting with default configuration");

        if let Some(path) = config_file {
            config = config.merge(ConfigOverrides::from_file(path)?);
            debug!("Merged configuration from {}", path.display());
        }

        config = config.merge(environment).merge(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply every value present in `overrides`
    pub fn merge(self, overrides: ConfigOverrides) -> Self {
        Self {
            target: overrides.target.unwrap_or(self.target),
            mode: overrides.mode.unwrap_or(self.mode),
            output: overrides.output.or(self.output),
            ca_bundle: overrides.ca_bundle.or(self.ca_bundle),
            log_level: overrides.log_level.unwrap_or(self.log_level),
        }
    }

    /// Check the configuration before any network activity
    pub fn validate(&self) -> Result<()> {
        self.target()?;

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(DetectError::Config(format!(
                "Invalid log level: {}. Valid values are: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if let Some(output) = &self.output {
            if output.is_empty() {
                return Err(DetectError::Config("Output destination must not be empty".to_string()));
            }
        }

        if let Some(bundle) = &self.ca_bundle {
            if self.mode == DetectionMode::Heuristic {
                warn!("Reference bundle {} is ignored in heuristic mode", bundle.display());
            } else if !bundle.is_file() {
                return Err(DetectError::Config(format!(
                    "Reference bundle not found: {}",
                    bundle.display()
                )));
            }
        }

        Ok(())
    }
}
