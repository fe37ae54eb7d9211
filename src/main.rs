//! midcert command line tool
//!
//! Prints the certificate chain a reference endpoint presents and whether it
//! looks intercepted. Exits 0 whatever the verdict, 1 on any failure.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, info};

use midcert::{Detector, Result, VERSION, APP_NAME};
use midcert::common::{init_logger, DetectError};
use midcert::config::{env_var, log_config, ConfigOverrides, DetectionMode, DetectorConfig, OutputTarget, CA_BUNDLE_URL};
use midcert::report::{export_certificates, render_report};
use midcert::tls::TlsChainCapture;
use midcert::trust::{BundleSource, FileBundle, RemoteBundle};

/// Detect TLS interception by checking the presented CA chain against Mozilla's trust store
///
/// Every option except --output can also be set through a MIDCERT_ environment
/// variable (MIDCERT_TARGET, MIDCERT_MODE, MIDCERT_CA_BUNDLE, MIDCERT_CONFIG_FILE,
/// MIDCERT_LOG_LEVEL).
#[derive(Parser, Debug)]
#[clap(name = "midcert", version = VERSION, about)]
struct Args {
    /// Output file for the unknown CA certificates (use - for stdout)
    #[clap(short, long)]
    output: Option<String>,

    /// Endpoint to capture the chain from (host:port or https URL)
    #[clap(short, long, alias = "url")]
    target: Option<String>,

    /// Detection mode (strict, heuristic)
    /// - strict: every CA must be in the reference trust store
    /// - heuristic: any CA certificate in the chain is suspicious
    #[clap(short, long)]
    mode: Option<String>,

    /// Local PEM bundle to use instead of downloading the reference bundle
    #[clap(long)]
    ca_bundle: Option<PathBuf>,

    /// Load configuration from a JSON file
    #[clap(long)]
    config_file: Option<PathBuf>,

    /// Log level
    #[clap(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> Result<ConfigOverrides> {
        Ok(ConfigOverrides {
            target: self.target.clone(),
            mode: self.mode.as_deref().map(str::parse::<DetectionMode>).transpose()?,
            output: self.output.clone(),
            ca_bundle: self.ca_bundle.clone(),
            log_level: self.log_level.clone(),
        })
    }

    fn config_file(&self) -> Option<PathBuf> {
        self.config_file
            .clone()
            .or_else(|| env_var("CONFIG_FILE").map(PathBuf::from))
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = DetectorConfig::load(
        args.config_file().as_deref(),
        ConfigOverrides::from_env()?,
        args.overrides()?,
    )?;

    init_logger(&config.log_level);
    info!("Starting {} v{}", APP_NAME, VERSION);
    log_config(&config);

    let bundle: Box<dyn BundleSource> = match &config.ca_bundle {
        Some(path) => Box::new(FileBundle::new(path)),
        None => Box::new(RemoteBundle::new(CA_BUNDLE_URL)),
    };
    let detector = Detector::new(&config, bundle, Box::new(TlsChainCapture::new()))?;

    let outcome = detector.run()?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    stdout
        .write_all(render_report(&outcome).as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(DetectError::OutputWrite)?;

    let destination = config.output_target();
    let Some(count) = export_certificates(&outcome, destination.as_ref(), &mut stdout)? else {
        debug!("No certificates exported");
        return Ok(());
    };

    let what = match config.mode {
        DetectionMode::Strict => "unknown CA",
        DetectionMode::Heuristic => "chain",
    };
    let saved = format!(
        "Saved {} {} certificate{} to {}",
        count,
        what,
        if count == 1 { "" } else { "s" },
        destination.as_ref().map(|d| d.to_string()).unwrap_or_default()
    );

    // Keep stdout pure PEM after the report when exporting there
    match destination {
        Some(OutputTarget::File(_)) => writeln!(stdout, "\n{}", saved).map_err(DetectError::OutputWrite)?,
        _ => eprintln!("{}", saved),
    }

    Ok(())
}
