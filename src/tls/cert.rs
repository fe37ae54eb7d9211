//! Certificate chain model
//!
//! This module provides the immutable view of the certificates a peer
//! presented during the handshake.

use std::fmt;

use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::x509::{X509, X509NameRef, X509Ref};

use crate::common::{DetectError, Result};

/// One X.509 certificate as observed in a chain
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
    der: Vec<u8>,
    subject_cn: String,
    issuer_cn: String,
    not_before: String,
    not_after: String,
    fingerprint: String,
    index: usize,
}

impl Certificate {
    /// Capture a certificate at position `index` of its chain
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate cannot be re-encoded or digested.
    pub fn from_x509(x509: X509, index: usize) -> Result<Self> {
        let der = x509.to_der()?;
        let fingerprint = sha256_fingerprint(&x509)?;

        Ok(Self {
            subject_cn: common_name(x509.subject_name()),
            issuer_cn: common_name(x509.issuer_name()),
            not_before: x509.not_before().to_string(),
            not_after: x509.not_after().to_string(),
            fingerprint,
            der,
            x509,
            index,
        })
    }

    /// Raw DER bytes exactly as received
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Parsed OpenSSL certificate
    pub fn x509(&self) -> &X509Ref {
        &self.x509
    }

    /// Subject common name, empty if absent or unreadable
    pub fn subject_cn(&self) -> &str {
        &self.subject_cn
    }

    /// Issuer common name, empty if absent or unreadable
    pub fn issuer_cn(&self) -> &str {
        &self.issuer_cn
    }

    /// Start of the validity window
    pub fn not_before(&self) -> &str {
        &self.not_before
    }

    /// End of the validity window
    pub fn not_after(&self) -> &str {
        &self.not_after
    }

    /// Colon-separated SHA-256 fingerprint of the DER encoding
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Zero-based position in the chain; 0 is the leaf
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether this is the end-entity certificate
    pub fn is_leaf(&self) -> bool {
        self.index == 0
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("index", &self.index)
            .field("subject_cn", &self.subject_cn)
            .field("issuer_cn", &self.issuer_cn)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.der == other.der
    }
}

impl Eq for Certificate {}

/// Ordered certificate chain as sent by the peer
///
/// Index 0 is always the leaf. A chain is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    certs: Vec<Certificate>,
}

impl Chain {
    /// Build a chain from certificates in transmission order
    ///
    /// `origin` names the peer and is only used in the error message.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::EmptyChain`] if `certs` is empty.
    pub fn from_x509s<I>(certs: I, origin: &str) -> Result<Self>
    where
        I: IntoIterator<Item = X509>,
    {
        let certs = certs
            .into_iter()
            .enumerate()
            .map(|(index, x509)| Certificate::from_x509(x509, index))
            .collect::<Result<Vec<_>>>()?;

        if certs.is_empty() {
            return Err(DetectError::EmptyChain(origin.to_string()));
        }

        Ok(Self { certs })
    }

    /// The end-entity certificate
    pub fn leaf(&self) -> &Certificate {
        &self.certs[0]
    }

    /// Certificates at index 1 and above
    pub fn cas(&self) -> &[Certificate] {
        &self.certs[1..]
    }

    /// Certificate at `index`, if present
    pub fn get(&self, index: usize) -> Option<&Certificate> {
        self.certs.get(index)
    }

    /// Number of certificates, always at least one
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Always false; kept for the `len`/`is_empty` convention
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Iterate in chain order
    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certs.iter()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// First common name entry of `name`, or an empty string
pub fn common_name(name: &X509NameRef) -> String {
    name.entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|cn| cn.to_string())
        .unwrap_or_default()
}

/// SHA-256 fingerprint of a certificate as lowercase colon-separated hex
pub fn sha256_fingerprint(cert: &X509Ref) -> Result<String> {
    let fingerprint = cert.digest(MessageDigest::sha256())?;

    Ok(fingerprint.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<String>>()
        .join(":"))
}
