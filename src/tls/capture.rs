//! Certificate chain capture
//!
//! Performs a client handshake with peer verification disabled and records
//! the certificates the server sent. The connector built here is only used
//! for observation and is never reused for trusted traffic.

use std::net::TcpStream;

use log::{debug, info, warn};
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};

use crate::common::{DetectError, Result, Target};
use super::cert::Chain;

/// Source of the certificate chain presented by a TLS peer
#[cfg_attr(test, mockall::automock)]
pub trait ChainSource {
    /// Capture the chain `target` presents, leaf first
    fn capture(&self, target: &Target) -> Result<Chain>;
}

/// Captures chains with a real OpenSSL handshake
#[derive(Debug, Default, Clone)]
pub struct TlsChainCapture;

impl TlsChainCapture {
    /// Create a new chain capture
    pub fn new() -> Self {
        Self
    }

    /// Build a connector that accepts any certificate
    fn observing_connector() -> Result<SslConnector> {
        let mut builder = SslConnector::builder(SslMethod::tls_client())?;
        builder.set_verify(SslVerifyMode::NONE);
        Ok(builder.build())
    }
}

impl ChainSource for TlsChainCapture {
    fn capture(&self, target: &Target) -> Result<Chain> {
        let origin = target.to_string();
        let connection_error = |reason: String| DetectError::Connection {
            target: origin.clone(),
            reason,
        };

        debug!("Connecting to {}", origin);
        let stream = TcpStream::connect((target.host(), target.port()))
            .map_err(|e| connection_error(e.to_string()))?;

        let mut config = Self::observing_connector()?.configure()?;
        config.set_verify_hostname(false);
        config.set_use_server_name_indication(!target.is_ip_literal());

        let mut tls = config
            .connect(target.host(), stream)
            .map_err(|e| connection_error(e.to_string()))?;

        info!(
            "Handshake with {} complete ({})",
            origin,
            tls.ssl().version_str()
        );

        let presented = tls
            .ssl()
            .peer_cert_chain()
            .map(|stack| stack.iter().map(|cert| cert.to_owned()).collect::<Vec<_>>())
            .unwrap_or_default();
        debug!("Peer presented {} certificate(s)", presented.len());

        if let Err(e) = tls.shutdown() {
            // The chain is already captured; a failed close_notify changes nothing
            warn!("TLS shutdown with {} failed: {}", origin, e);
        }

        Chain::from_x509s(presented, &origin)
    }
}
