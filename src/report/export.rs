//! PEM export of suspicious certificates
//!
//! Nothing is opened or written unless a destination was requested and
//! interception is suspected.

use std::fs::File;
use std::io::{self, Write};

use log::debug;

use crate::common::{DetectError, Result};
use crate::config::OutputTarget;
use crate::tls::Certificate;
use crate::tls::pem::encode_certificate;
use crate::verdict::RunOutcome;

/// Write certificates as concatenated PEM blocks
pub fn write_pem<'a, W, I>(out: &mut W, certs: I) -> io::Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a Certificate>,
{
    let mut written = 0;
    for cert in certs {
        out.write_all(encode_certificate(cert.der()).as_bytes())?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Export the certificates selected by `outcome`
///
/// `stdout` receives the PEM text when the destination is `-`. Returns the
/// number of certificates written, or `None` when export did not trigger.
///
/// # Errors
///
/// [`DetectError::OutputCreate`] if the file cannot be created,
/// [`DetectError::OutputWrite`] if writing fails. Partial writes are not
/// rolled back.
pub fn export_certificates<W: Write + ?Sized>(
    outcome: &RunOutcome,
    destination: Option<&OutputTarget>,
    stdout: &mut W,
) -> Result<Option<usize>> {
    let Some(destination) = destination else {
        debug!("No export destination requested");
        return Ok(None);
    };

    if !outcome.interception_suspected() {
        debug!("Nothing suspicious, skipping export to {}", destination);
        return Ok(None);
    }

    let selection = outcome.export_selection();

    let written = match destination {
        OutputTarget::Stdout => write_pem(stdout, selection),
        OutputTarget::File(path) => {
            let mut file = File::create(path).map_err(|source| DetectError::OutputCreate {
                path: path.display().to_string(),
                source,
            })?;
            write_pem(&mut file, selection)
        }
    }
    .map_err(DetectError::OutputWrite)?;

    Ok(Some(written))
}
