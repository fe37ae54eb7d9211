//! Chain classification and interception verdict
//!
//! The leaf is never checked. Every CA certificate gets a [`CaStatus`] in
//! chain order, and the operating [`Policy`] decides whether the chain looks
//! intercepted.

use std::fmt;

use log::{debug, warn};

use crate::config::DetectionMode;
use crate::tls::{Certificate, Chain};
use crate::trust::TrustStore;

/// Operating policy together with the data it needs
#[derive(Debug)]
pub enum Policy {
    /// Every CA must be recognized by the reference store
    Strict(TrustStore),
    /// No store is consulted; any CA in the chain is suspicious
    Heuristic,
}

impl Policy {
    /// The mode this policy implements
    pub fn mode(&self) -> DetectionMode {
        match self {
            Self::Strict(_) => DetectionMode::Strict,
            Self::Heuristic => DetectionMode::Heuristic,
        }
    }
}

/// Verification result of one CA certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaStatus {
    /// Recognized by the reference store
    Trusted,
    /// Not recognized by the reference store
    Untrusted,
    /// Not checked, no reference store under the heuristic policy
    Unchecked,
}

impl CaStatus {
    /// Whether the certificate counts as an unknown CA
    pub fn is_unknown(self) -> bool {
        !matches!(self, Self::Trusted)
    }
}

impl fmt::Display for CaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trusted => write!(f, "trusted"),
            Self::Untrusted => write!(f, "untrusted"),
            Self::Unchecked => write!(f, "unchecked"),
        }
    }
}

/// Result of classifying one captured chain
///
/// Built once by [`classify`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    chain: Chain,
    mode: DetectionMode,
    /// One entry per CA certificate, `statuses[i]` belongs to chain index `i + 1`
    statuses: Vec<CaStatus>,
    /// Chain indices of unknown CAs, ascending
    unknown: Vec<usize>,
    interception_suspected: bool,
}

impl RunOutcome {
    /// The captured chain
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Mode the verdict was derived under
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Status of the certificate at `index`; `None` for the leaf
    pub fn status(&self, index: usize) -> Option<CaStatus> {
        index.checked_sub(1).and_then(|i| self.statuses.get(i).copied())
    }

    /// Unknown CA certificates in chain order
    pub fn unknown_cas(&self) -> impl Iterator<Item = &Certificate> + '_ {
        self.unknown.iter().filter_map(move |&index| self.chain.get(index))
    }

    /// Number of unknown CA certificates
    pub fn unknown_count(&self) -> usize {
        self.unknown.len()
    }

    /// Whether the chain looks intercepted
    pub fn interception_suspected(&self) -> bool {
        self.interception_suspected
    }

    /// Certificates worth exporting when interception is suspected
    ///
    /// The unknown CAs under the strict policy, the whole chain under the
    /// heuristic one. Empty when nothing is suspected.
    pub fn export_selection(&self) -> Vec<&Certificate> {
        if !self.interception_suspected {
            return Vec::new();
        }

        match self.mode {
            DetectionMode::Strict => self.unknown_cas().collect(),
            DetectionMode::Heuristic => self.chain.iter().collect(),
        }
    }
}

/// Classify every CA certificate of `chain` and derive the verdict
pub fn classify(chain: Chain, policy: &Policy) -> RunOutcome {
    let statuses: Vec<CaStatus> = chain
        .cas()
        .iter()
        .map(|cert| {
            let status = match policy {
                Policy::Strict(store) if store.recognizes(cert) => CaStatus::Trusted,
                Policy::Strict(_) => CaStatus::Untrusted,
                Policy::Heuristic => CaStatus::Unchecked,
            };
            debug!(
                "Certificate {} ({}): {}",
                cert.index() + 1,
                cert.subject_cn(),
                status
            );
            status
        })
        .collect();

    let unknown: Vec<usize> = statuses
        .iter()
        .enumerate()
        .filter(|(_, status)| status.is_unknown())
        .map(|(i, _)| i + 1)
        .collect();

    let interception_suspected = match policy {
        Policy::Strict(_) => !unknown.is_empty(),
        Policy::Heuristic => chain.len() > 1,
    };

    if interception_suspected {
        warn!("{} unknown CA certificate(s) in the presented chain", unknown.len());
    }

    RunOutcome {
        mode: policy.mode(),
        chain,
        statuses,
        unknown,
        interception_suspected,
    }
}
