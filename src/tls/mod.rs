//! TLS handling module
//!
//! This module captures certificate chains and handles certificate encoding.

mod capture;
mod cert;
pub mod pem;

#[cfg(test)]
pub(crate) mod testing;

pub use capture::{ChainSource, TlsChainCapture};
#[cfg(test)]
pub use capture::MockChainSource;
pub use cert::{Certificate, Chain, common_name, sha256_fingerprint};
