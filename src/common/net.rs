//! Network utility functions
//!
//! This module parses the capture target given on the command line or in the
//! configuration file.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use log::debug;

use super::error::{DetectError, Result};

/// Port used when a target URL carries no explicit port
pub const HTTPS_PORT: u16 = 443;

/// A `host:port` endpoint to capture a certificate chain from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    port: u16,
}

impl Target {
    /// Create a target from its parts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// Host name or IP literal (without brackets)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the host is an IP literal rather than a DNS name
    pub fn is_ip_literal(&self) -> bool {
        self.host.parse::<IpAddr>().is_ok()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Target {
    type Err = DetectError;

    /// Parse `host:port`, `[v6]:port` or an `https://host[:port][/path]` URL
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_target(s)
    }
}

/// Parse a capture target
///
/// A bare `host:port` must carry a port. URLs default to port 443 and any
/// path, query or fragment is ignored.
pub fn parse_target(addr: &str) -> Result<Target> {
    let addr = addr.trim();
    debug!("Parsing capture target: {}", addr);

    let (authority, default_port) = match addr.split_once("://") {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("https") => {
            let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            (&rest[..end], Some(HTTPS_PORT))
        }
        Some((scheme, _)) => {
            return Err(DetectError::Config(format!(
                "Unsupported target scheme '{}': only https is supported",
                scheme
            )));
        }
        None => (addr, None),
    };

    // Strip userinfo if a URL carried one
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let (host, port) = if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            DetectError::Config(format!("Unterminated IPv6 literal in target: {}", addr))
        })?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(port),
            None if tail.is_empty() => None,
            None => {
                return Err(DetectError::Config(format!("Invalid target: {}", addr)));
            }
        };
        (host, port)
    } else {
        match authority.rsplit_once(':') {
            Some((host, _)) if host.contains(':') => {
                return Err(DetectError::Config(format!(
                    "IPv6 targets must be bracketed, e.g. [::1]:443: {}",
                    addr
                )));
            }
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err(DetectError::Config(format!("Missing host in target: {}", addr)));
    }

    let port = match (port, default_port) {
        (Some(port), _) => port.parse::<u16>().map_err(|e| {
            DetectError::Config(format!("Invalid port '{}' in target {}: {}", port, addr, e))
        })?,
        (None, Some(default)) => default,
        (None, None) => {
            return Err(DetectError::Config(format!(
                "Target must be in host:port form: {}",
                addr
            )));
        }
    };

    Ok(Target::new(host, port))
}
