//! CLI command implementations for lanewar.

pub(crate) mod catalog;
pub(crate) mod connect;
pub(crate) mod script;
pub(crate) mod serve;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use tracing_subscriber::EnvFilter;

/// Output format for the `script` and `catalog` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output, one object per line.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<lanewar::CatalogError> for CliError {
    fn from(e: lanewar::CatalogError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<lanewar::ConfigError> for CliError {
    fn from(e: lanewar::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<lanewar::ServerError> for CliError {
    fn from(e: lanewar::ServerError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<lanewar::game::LobbyError> for CliError {
    fn from(e: lanewar::game::LobbyError) -> Self {
        Self::new(e.to_string())
    }
}

/// Install the `tracing` subscriber. `--log-level` wins over `RUST_LOG`.
pub(crate) fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
