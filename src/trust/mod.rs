//! Reference trust store module
//!
//! This module loads the canonical CA bundle and answers membership queries.

mod bundle;
mod store;

pub use bundle::{BundleSource, FileBundle, RemoteBundle};
#[cfg(test)]
pub use bundle::MockBundleSource;
pub use store::TrustStore;
