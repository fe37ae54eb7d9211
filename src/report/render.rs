//! Textual report of a run

use std::fmt::Write;

use crate::config::DetectionMode;
use crate::tls::Certificate;
use crate::verdict::{CaStatus, RunOutcome};

/// Render the report for `outcome`
///
/// The output depends only on `outcome`.
pub fn render_report(outcome: &RunOutcome) -> String {
    let mut out = String::from("Certificate chain:\n");

    for cert in outcome.chain() {
        render_certificate(&mut out, cert, outcome.status(cert.index()));
    }

    out.push('\n');
    out.push_str(&summary_line(outcome));
    out.push('\n');
    out
}

fn render_certificate(out: &mut String, cert: &Certificate, status: Option<CaStatus>) {
    // Writing into a String cannot fail
    let _ = writeln!(out, "\nCertificate {}:", cert.index() + 1);
    let _ = writeln!(out, "  Subject: {}", cert.subject_cn());
    let _ = writeln!(out, "  Issuer:  {}", cert.issuer_cn());
    let _ = writeln!(out, "  Valid:   {} to {}", cert.not_before(), cert.not_after());
    let _ = writeln!(out, "  SHA-256: {}", cert.fingerprint());

    let tag = match status {
        None => "Leaf certificate (not checked against trust store)",
        Some(CaStatus::Trusted) => "CA certificate found in trust store",
        Some(CaStatus::Untrusted) => "CA certificate not found in trust store",
        Some(CaStatus::Unchecked) => "CA certificate not checked (heuristic mode)",
    };
    let _ = writeln!(out, "  {}", tag);
}

/// The one-line verdict
pub fn summary_line(outcome: &RunOutcome) -> String {
    let count = outcome.unknown_count();
    let plural = if count == 1 { "" } else { "s" };
    let verdict = if outcome.interception_suspected() {
        "interception suspected"
    } else {
        "no interception detected"
    };
    let suffix = match outcome.mode() {
        DetectionMode::Strict => "",
        DetectionMode::Heuristic => " (heuristic mode)",
    };

    format!("Verdict: {}, {} unknown CA{} in chain{}", verdict, count, plural, suffix)
}
