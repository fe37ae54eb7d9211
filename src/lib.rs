//! midcert: TLS interception detector
//!
//! Connects to a reference HTTPS endpoint without verifying it, captures the
//! certificate chain the peer presents, and checks every CA certificate in it
//! against an independently sourced reference trust store. A CA the store
//! does not recognize points at a proxy or machine-in-the-middle re-signing
//! the connection.
//!
//! # Main Features
//!
//! - Reference store from Mozilla's CA bundle (or a local PEM file)
//! - Chain capture with verification scoped to observation only
//! - Strict (store-based) and heuristic (any-CA) detection modes
//! - Deterministic textual report
//! - PEM export of the certificates behind a suspected interception
//!
//! # Example
//!
//! ```no_run
//! use midcert::{Detector, Result};
//! use midcert::config::{DetectorConfig, CA_BUNDLE_URL};
//! use midcert::report::render_report;
//! use midcert::tls::TlsChainCapture;
//! use midcert::trust::RemoteBundle;
//!
//! fn main() -> Result<()> {
//!     let config = DetectorConfig::default();
//!
//!     let detector = Detector::new(
//!         &config,
//!         Box::new(RemoteBundle::new(CA_BUNDLE_URL)),
//!         Box::new(TlsChainCapture::new()),
//!     )?;
//!
//!     let outcome = detector.run()?;
//!     print!("{}", render_report(&outcome));
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod detector;
pub mod report;
pub mod tls;
pub mod trust;
pub mod verdict;

// Re-export commonly used structures and functions for convenience
pub use common::{DetectError, Result, Target};
pub use detector::Detector;
pub use verdict::{classify, CaStatus, Policy, RunOutcome};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
