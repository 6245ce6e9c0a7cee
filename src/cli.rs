//! Command-line interface parsing for Pitwall
//!
//! This module defines the clap argument model, validation of free-form filter
//! arguments, and the process exit codes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::AppConfig;
use crate::remind::DEFAULT_THRESHOLD_MINUTES;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A filter argument was empty or only whitespace
    #[error("Invalid {0}: value must not be empty")]
    EmptyFilter(&'static str),
}

/// Process exit codes
///
/// | Code | Meaning                                        |
/// |------|------------------------------------------------|
/// | 0    | Result printed, or reminder triggered          |
/// | 1    | Nothing found, or no reminder needed           |
/// | 2    | Error (API unreachable with no cache, bad data) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    NoResult = 1,
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Pitwall - Formula 1 session schedules in your terminal
#[derive(Parser, Debug)]
#[command(name = "pitwall")]
#[command(about = "Formula 1 session schedules, reminders and an offline cache")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory for cached API responses
    #[arg(long, global = true, env = "PITWALL_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// OpenF1 API base URL
    #[arg(long, global = true, env = "PITWALL_BASE_URL", value_name = "URL", hide = true)]
    pub base_url: Option<String>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the latest (current or upcoming) session and its status
    #[command(alias = "latest")]
    Next,

    /// Look up a single session by country, type and year
    #[command(alias = "get_session")]
    Get {
        /// Country hosting the event, e.g. "Belgium"
        #[arg(long, default_value = "Belgium", value_parser = parse_country_arg)]
        country: String,

        /// Session type, e.g. Sprint, Race, "Practice 1"
        #[arg(long = "type", default_value = "Sprint")]
        session_type: String,

        /// Championship year
        #[arg(long, default_value_t = 2023)]
        year: i32,
    },

    /// Show every session of a race weekend grouped by day
    Weekend {
        /// Country hosting the event, e.g. "Belgium"
        #[arg(long, default_value = "Belgium", value_parser = parse_country_arg)]
        country: String,

        /// Championship year
        #[arg(long, default_value_t = 2023)]
        year: i32,
    },

    /// Exit 0 when the next session starts within the threshold
    Remind {
        /// Reminder window in minutes
        #[arg(long, default_value_t = DEFAULT_THRESHOLD_MINUTES)]
        minutes: u32,

        /// Suppress output when no reminder is due
        #[arg(long)]
        quiet: bool,
    },

    /// Inspect or clear the local cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// List cached entries with their age, staleness and size
    Info,
    /// Remove every cached entry
    Clear,
}

/// Parses a country filter, rejecting empty values
///
/// Surrounding whitespace is trimmed so `" Belgium "` and `"Belgium"` share a
/// cache entry.
pub fn parse_country_arg(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyFilter("country"));
    }
    Ok(trimmed.to_string())
}

impl Cli {
    /// Builds the runtime configuration from the parsed flags
    pub fn app_config(&self) -> AppConfig {
        AppConfig::default()
            .with_cache_dir(self.cache_dir.clone())
            .with_base_url(self.base_url.clone())
    }

    /// Whether the command asked for silence when there is nothing to report
    pub fn is_quiet(&self) -> bool {
        matches!(self.command, Command::Remind { quiet: true, .. })
    }
}
