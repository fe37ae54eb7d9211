//! Reference bundle sources
//!
//! The canonical bundle is downloaded over a normally validated HTTPS
//! connection. A local file can replace it for offline runs.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::common::{DetectError, Result};

/// Source of the PEM bytes a [`TrustStore`](super::TrustStore) is built from
#[cfg_attr(test, mockall::automock)]
pub trait BundleSource {
    /// Fetch the raw PEM bundle
    fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Bundle downloaded from a URL
#[derive(Debug, Clone)]
pub struct RemoteBundle {
    url: String,
}

impl RemoteBundle {
    /// Create a source for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl BundleSource for RemoteBundle {
    fn fetch(&self) -> Result<Vec<u8>> {
        info!("Downloading reference CA bundle from {}", self.url);

        // Default client: system roots, full certificate and hostname validation
        let response = reqwest::blocking::get(&self.url)
            .and_then(|response| response.error_for_status())
            .map_err(|e| DetectError::BundleFetch(format!("{}: {}", self.url, e)))?;

        let body = response
            .bytes()
            .map_err(|e| DetectError::BundleFetch(format!("{}: {}", self.url, e)))?;

        debug!("Downloaded {} bytes", body.len());
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Bundle read from a local PEM file
#[derive(Debug, Clone)]
pub struct FileBundle {
    path: PathBuf,
}

impl FileBundle {
    /// Create a source for the file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl BundleSource for FileBundle {
    fn fetch(&self) -> Result<Vec<u8>> {
        info!("Reading reference CA bundle from {}", self.path.display());
        fs::read(&self.path)
            .map_err(|e| DetectError::BundleFetch(format!("{}: {}", self.path.display(), e)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
