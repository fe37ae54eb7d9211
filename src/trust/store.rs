//! Reference trust store
//!
//! Provides [`TrustStore`], an immutable pool of reference certificates that
//! answers one question: was this certificate issued by (or is it) a pool
//! member? Only a single hop is checked. No path is built and neither
//! validity periods nor extension policy are evaluated.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, info};
use openssl::x509::{X509, X509Ref, X509VerifyResult};

use crate::common::{DetectError, Result};
use crate::tls::pem::{decode_certificates, PemBlock};
use crate::tls::{Certificate, sha256_fingerprint};

/// A set of reference CA certificates
pub struct TrustStore {
    /// DER-encoded subject name to the pool members carrying it
    by_subject: HashMap<Vec<u8>, Vec<X509>>,
    /// SHA-256 fingerprints of every pool member
    fingerprints: HashSet<String>,
    count: usize,
}

impl fmt::Debug for TrustStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustStore")
            .field("count", &self.count)
            .finish()
    }
}

impl TrustStore {
    /// Build a trust store from a PEM bundle
    ///
    /// Blocks that fail to decode or parse are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::BundleParse`] if no certificate could be loaded.
    pub fn from_pem(pem_data: &[u8]) -> Result<Self> {
        let mut store = Self {
            by_subject: HashMap::new(),
            fingerprints: HashSet::new(),
            count: 0,
        };
        let mut skipped = 0usize;

        for block in decode_certificates(pem_data) {
            let der = match block {
                PemBlock::Der(der) => der,
                PemBlock::Malformed(ordinal) => {
                    debug!("Skipping malformed bundle block {}", ordinal);
                    skipped += 1;
                    continue;
                }
            };

            match store.add_der(&der) {
                Ok(()) => {}
                Err(e) => {
                    debug!("Skipping unparseable bundle certificate: {}", e);
                    skipped += 1;
                }
            }
        }

        if store.is_empty() {
            return Err(DetectError::BundleParse(format!(
                "no certificates could be parsed from {} bytes of PEM data",
                pem_data.len()
            )));
        }

        info!(
            "Loaded {} reference certificates ({} skipped)",
            store.count, skipped
        );
        Ok(store)
    }

    fn add_der(&mut self, der: &[u8]) -> Result<()> {
        let x509 = X509::from_der(der)?;
        let subject = x509.subject_name().to_der()?;
        let fingerprint = sha256_fingerprint(&x509)?;

        self.fingerprints.insert(fingerprint);
        self.by_subject.entry(subject).or_default().push(x509);
        self.count += 1;
        Ok(())
    }

    /// Whether `cert` is recognized by the pool
    ///
    /// True if `cert` is itself a pool member, or if a pool member whose
    /// subject matches `cert`'s issuer produced `cert`'s signature.
    pub fn recognizes(&self, cert: &Certificate) -> bool {
        if self.fingerprints.contains(cert.fingerprint()) {
            debug!("{} is a reference store member", cert.subject_cn());
            return true;
        }

        self.find_issuer(cert.x509()).is_some()
    }

    /// Pool member that issued and signed `cert`, if any
    fn find_issuer(&self, cert: &X509Ref) -> Option<&X509> {
        let issuer = cert.issuer_name().to_der().ok()?;

        self.by_subject.get(&issuer)?.iter().find(|candidate| {
            if candidate.issued(cert) != X509VerifyResult::OK {
                return false;
            }
            candidate
                .public_key()
                .and_then(|key| cert.verify(&key))
                .unwrap_or(false)
        })
    }

    /// Number of certificates in the store
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
