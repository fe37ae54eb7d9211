//! Error handling module
//!
//! This module defines the error types and result type aliases used in the application.
//! Every variant is fatal: the run aborts and nothing is exported.

use thiserror::Error;
use std::io;

/// midcert error type
#[derive(Error, Debug)]
pub enum DetectError {
    /// The reference CA bundle could not be downloaded or read
    #[error("Error downloading CA bundle: {0}")]
    BundleFetch(String),

    /// The reference CA bundle contained no usable certificate
    #[error("Error parsing CA bundle: {0}")]
    BundleParse(String),

    /// Resolution, connect or handshake failure against the capture target
    #[error("Error connecting to {target}: {reason}")]
    Connection {
        target: String,
        reason: String,
    },

    /// The handshake succeeded but the peer presented no certificates
    #[error("No certificates found in the chain presented by {0}")]
    EmptyChain(String),

    /// The export destination could not be created
    #[error("Error creating output file {path}: {source}")]
    OutputCreate {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Writing the exported certificates failed
    #[error("Error writing certificate: {0}")]
    OutputWrite(#[source] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// OpenSSL error
    #[error("OpenSSL error: {0}")]
    Ssl(#[from] openssl::error::ErrorStack),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `DetectError`.
pub type Result<T> = std::result::Result<T, DetectError>;
