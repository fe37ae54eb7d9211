//! Configuration module
//!
//! This module holds the run configuration. It is built once in `main` from
//! defaults, an optional JSON file, then environment and command line values,
//! and passed explicitly into the detector.

mod defaults;
mod loader;

pub use self::defaults::CA_BUNDLE_URL;
pub use self::loader::env_var;

use self::defaults::STDOUT_DESTINATION;

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::common::{DetectError, Result, Target};

/// Interception detection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionMode {
    /// Check every CA against the reference trust store
    Strict,
    /// Treat any CA certificate in the chain as suspicious
    Heuristic,
}

// Case-insensitive, like the command line
impl<'de> Deserialize<'de> for DetectionMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DetectionMode::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Default for DetectionMode {
    fn default() -> Self {
        defaults::mode()
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Heuristic => write!(f, "heuristic"),
        }
    }
}

impl FromStr for DetectionMode {
    type Err = DetectError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "heuristic" => Ok(Self::Heuristic),
            _ => Err(DetectError::Config(format!(
                "Invalid detection mode: {}. Valid values are: strict, heuristic",
                s
            ))),
        }
    }
}

/// Where exported certificates go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output (`-`)
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

impl OutputTarget {
    /// Interpret an `-o` argument
    pub fn parse(destination: &str) -> Self {
        if destination == STDOUT_DESTINATION {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(destination))
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Endpoint whose chain is captured (host:port or https URL)
    pub target: String,

    /// Detection policy
    pub mode: DetectionMode,

    /// Export destination; `None` disables export
    pub output: Option<String>,

    /// Local PEM bundle replacing the canonical download
    pub ca_bundle: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            target: defaults::target(),
            mode: defaults::mode(),
            output: None,
            ca_bundle: None,
            log_level: defaults::log_level(),
        }
    }
}

impl DetectorConfig {
    /// Parsed capture target
    pub fn target(&self) -> Result<Target> {
        self.target.parse()
    }

    /// Parsed export destination, if export was requested
    pub fn output_target(&self) -> Option<OutputTarget> {
        self.output.as_deref().map(OutputTarget::parse)
    }
}

/// Partial configuration from one source
///
/// Every field is optional; `None` leaves the lower-priority value in place.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub target: Option<String>,
    pub mode: Option<DetectionMode>,
    pub output: Option<String>,
    pub ca_bundle: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Log the effective configuration
pub fn log_config(config: &DetectorConfig) {
    use log::info;

    if !log::log_enabled!(log::Level::Info) {
        return;
    }

    info!("=== Configuration ===");
    info!("  Target: {}", config.target);
    info!("  Mode: {}", config.mode);
    match &config.ca_bundle {
        Some(path) => info!("  Reference bundle: {}", path.display()),
        None if config.mode == DetectionMode::Strict => info!("  Reference bundle: {}", CA_BUNDLE_URL),
        None => info!("  Reference bundle: not used"),
    }
    match config.output_target() {
        Some(output) => info!("  Export: {}", output),
        None => info!("  Export: disabled"),
    }
    info!("  Log level: {}", config.log_level);
}
