//! Default configuration values
//!
//! This module provides default values for configuration options.
//! It is the single source of truth for defaults across the application.

use super::DetectionMode;

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "MIDCERT_";

/// Canonical reference bundle: Mozilla's root program as published by curl
pub const CA_BUNDLE_URL: &str = "https://curl.se/ca/cacert.pem";

/// Default capture target as a string
const TARGET_STR: &str = "www.google.com:443";

/// Default log level as string
const LOG_LEVEL_STR: &str = "warn";

/// Export destination meaning standard output
pub const STDOUT_DESTINATION: &str = "-";

/// Default capture target
pub fn target() -> String {
    TARGET_STR.to_string()
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}

/// Default detection mode
pub fn mode() -> DetectionMode {
    DetectionMode::Strict
}
