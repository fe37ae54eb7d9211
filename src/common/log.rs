//! Logging helpers
//!
//! Logs go to stderr so that stdout only carries the report and exported PEM.

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Parameters
///
/// * `level` - Log level filter (error, warn, info, debug, trace)
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second initialization (tests) is not an error worth reporting
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .try_init();
}
