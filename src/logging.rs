//! Tracing setup
//!
//! Logs go to stderr so stdout carries only command output.

use std::io::IsTerminal;

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
#[error("tracing initialization error: {0}")]
pub struct LoggingError(String);

/// Picks the default filter from the verbosity flags
///
/// `--verbose` wins over `--quiet`; neither gives `warn`.
pub fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Installs the global subscriber
///
/// `RUST_LOG`, when set, takes precedence over the flag-derived level.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool, quiet: bool) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| LoggingError(e.to_string()))
}
