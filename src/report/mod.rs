//! Report module
//!
//! Renders the human-readable report and exports suspicious certificates.

mod export;
mod render;

pub use export::{export_certificates, write_pem};
pub use render::{render_report, summary_line};
