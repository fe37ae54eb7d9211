//! Detection pipeline
//!
//! Loads the reference store (strict mode only), captures the chain and
//! classifies it. The store is always loaded before any connection to the
//! target is attempted.

use log::info;

use crate::common::{Result, Target};
use crate::config::{DetectionMode, DetectorConfig};
use crate::tls::ChainSource;
use crate::trust::{BundleSource, TrustStore};
use crate::verdict::{classify, Policy, RunOutcome};

/// One detection run
pub struct Detector {
    target: Target,
    mode: DetectionMode,
    bundle: Box<dyn BundleSource>,
    capture: Box<dyn ChainSource>,
}

impl Detector {
    /// Create a detector from an already validated configuration
    pub fn new(
        config: &DetectorConfig,
        bundle: Box<dyn BundleSource>,
        capture: Box<dyn ChainSource>,
    ) -> Result<Self> {
        Ok(Self {
            target: config.target()?,
            mode: config.mode,
            bundle,
            capture,
        })
    }

    /// Build the policy for the configured mode
    ///
    /// Strict mode fetches and parses the reference bundle; heuristic mode
    /// never touches it.
    pub fn load_policy(&self) -> Result<Policy> {
        match self.mode {
            DetectionMode::Strict => {
                info!("Loading reference bundle from {}", self.bundle.describe());
                let pem = self.bundle.fetch()?;
                Ok(Policy::Strict(TrustStore::from_pem(&pem)?))
            }
            DetectionMode::Heuristic => {
                info!("Heuristic mode: no reference store is consulted");
                Ok(Policy::Heuristic)
            }
        }
    }

    /// Run the whole pipeline
    pub fn run(&self) -> Result<RunOutcome> {
        let policy = self.load_policy()?;

        info!("Capturing certificate chain from {}", self.target);
        let chain = self.capture.capture(&self.target)?;

        Ok(classify(chain, &policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DetectError;
    use crate::tls::{Chain, MockChainSource};
    use crate::tls::pem::encode_certificate;
    use crate::tls::testing::{generate_ca, generate_leaf};
    use crate::trust::MockBundleSource;

    fn config(mode: DetectionMode) -> DetectorConfig {
        DetectorConfig {
            target: "127.0.0.1:8443".to_string(),
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_bundle_parse_error_aborts_before_handshake() {
        let mut bundle = MockBundleSource::new();
        bundle.expect_describe().return_const("mock bundle".to_string());
        bundle.expect_fetch().times(1).returning(|| Ok(b"not a bundle".to_vec()));

        let mut capture = MockChainSource::new();
        capture.expect_capture().never();

        let detector = Detector::new(&config(DetectionMode::Strict), Box::new(bundle), Box::new(capture)).unwrap();
        assert!(matches!(detector.run(), Err(DetectError::BundleParse(_))));
    }

    #[test]
    fn test_bundle_fetch_error_aborts_before_handshake() {
        let mut bundle = MockBundleSource::new();
        bundle.expect_describe().return_const("mock bundle".to_string());
        bundle
            .expect_fetch()
            .returning(|| Err(DetectError::BundleFetch("unreachable".to_string())));

        let mut capture = MockChainSource::new();
        capture.expect_capture().never();

        let detector = Detector::new(&config(DetectionMode::Strict), Box::new(bundle), Box::new(capture)).unwrap();
        assert!(matches!(detector.run(), Err(DetectError::BundleFetch(_))));
    }

    #[test]
    fn test_heuristic_mode_never_fetches() {
        let mut bundle = MockBundleSource::new();
        bundle.expect_fetch().never();

        let (ca, ca_key) = generate_ca("Some CA");
        let (leaf, _) = generate_leaf("localhost", &ca, &ca_key);
        let mut capture = MockChainSource::new();
        capture
            .expect_capture()
            .times(1)
            .returning(move |target| Chain::from_x509s(vec![leaf.clone(), ca.clone()], &target.to_string()));

        let detector = Detector::new(&config(DetectionMode::Heuristic), Box::new(bundle), Box::new(capture)).unwrap();
        let outcome = detector.run().unwrap();
        assert!(outcome.interception_suspected());
        assert_eq!(outcome.mode(), DetectionMode::Heuristic);
    }

    #[test]
    fn test_strict_run_against_reference_store() {
        let (ca_x, ca_x_key) = generate_ca("CA X");
        let (ca_y, _) = generate_ca("CA Y");
        let (leaf, _) = generate_leaf("localhost", &ca_x, &ca_x_key);
        let pem = encode_certificate(&ca_y.to_der().unwrap()).into_bytes();

        let mut bundle = MockBundleSource::new();
        bundle.expect_describe().return_const("mock bundle".to_string());
        bundle.expect_fetch().returning(move || Ok(pem.clone()));

        let mut capture = MockChainSource::new();
        capture
            .expect_capture()
            .withf(|target| target.port() == 8443)
            .returning(move |target| Chain::from_x509s(vec![leaf.clone(), ca_x.clone()], &target.to_string()));

        let detector = Detector::new(&config(DetectionMode::Strict), Box::new(bundle), Box::new(capture)).unwrap();
        let outcome = detector.run().unwrap();
        assert!(outcome.interception_suspected());
        assert_eq!(outcome.unknown_count(), 1);
        assert_eq!(outcome.unknown_cas().next().unwrap().subject_cn(), "CA X");
    }

    #[test]
    fn test_empty_chain_propagates() {
        let mut capture = MockChainSource::new();
        capture
            .expect_capture()
            .returning(|target| Err(DetectError::EmptyChain(target.to_string())));

        let detector = Detector::new(
            &config(DetectionMode::Heuristic),
            Box::new(MockBundleSource::new()),
            Box::new(capture),
        )
        .unwrap();
        assert!(matches!(detector.run(), Err(DetectError::EmptyChain(_))));
    }
}
