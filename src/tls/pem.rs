//! PEM encoding and decoding of certificates
//!
//! Encoding emits the body as a single base64 line. Decoding accepts both
//! single-line and 64-column bodies.

use log::debug;
use openssl::base64;
use x509_parser::pem::Pem;

/// Opening marker of a certificate block
pub const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";

/// Closing marker of a certificate block
pub const PEM_END: &str = "-----END CERTIFICATE-----";

const PEM_LABEL: &str = "CERTIFICATE";

const PEM_BEGIN_PREFIX: &[u8] = b"-----BEGIN ";

/// Encode DER bytes as one PEM certificate block, trailing newline included
pub fn encode_certificate(der: &[u8]) -> String {
    let body = base64::encode_block(der);
    let mut pem = String::with_capacity(PEM_BEGIN.len() + body.len() + PEM_END.len() + 3);
    pem.push_str(PEM_BEGIN);
    pem.push('\n');
    pem.push_str(&body);
    pem.push('\n');
    pem.push_str(PEM_END);
    pem.push('\n');
    pem
}

/// One certificate block found in a PEM blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PemBlock {
    /// The body decoded to these DER bytes
    Der(Vec<u8>),
    /// The block was truncated or its body was not valid base64; carries the
    /// block's ordinal
    Malformed(usize),
}

/// Split a PEM blob into certificate blocks
///
/// Text outside blocks is ignored, as are blocks with other labels. Each
/// block is read on its own, so a truncated or corrupt block never swallows
/// the one after it.
pub fn decode_certificates(data: &[u8]) -> Vec<PemBlock> {
    let mut blocks = Vec::new();

    for (ordinal, segment) in begin_segments(data).enumerate() {
        match Pem::iter_from_buffer(segment).next() {
            Some(Ok(pem)) if pem.label == PEM_LABEL => {
                if pem.contents.is_empty() {
                    blocks.push(PemBlock::Malformed(ordinal));
                } else {
                    blocks.push(PemBlock::Der(pem.contents));
                }
            }
            Some(Ok(pem)) => debug!("Ignoring PEM block {} labelled {}", ordinal, pem.label),
            Some(Err(e)) => {
                debug!("PEM block {} is malformed: {}", ordinal, e);
                blocks.push(PemBlock::Malformed(ordinal));
            }
            None => {}
        }
    }

    blocks
}

// Slices of `data` that each start at a `-----BEGIN ` line and run up to the
// next one
fn begin_segments(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut starts: Vec<usize> = Vec::new();
    let mut offset = 0;
    for line in data.split_inclusive(|&b| b == b'\n') {
        if line.starts_with(PEM_BEGIN_PREFIX) {
            starts.push(offset);
        }
        offset += line.len();
    }

    let ends: Vec<usize> = starts.iter().skip(1).copied().chain([data.len()]).collect();
    starts.into_iter().zip(ends).map(move |(start, end)| &data[start..end])
}
