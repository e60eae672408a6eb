//! CLI command implementations for War Advisor.

pub(crate) mod advise;
pub(crate) mod batch;
pub(crate) mod options;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;
use war_advisor::{AdvisorError, ConfigError, Dataset};

/// Output format shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
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

impl From<AdvisorError> for CliError {
    fn from(e: AdvisorError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

/// Load the dataset, naming the directory on failure.
pub(crate) fn load_dataset(dir: &Path) -> Result<Dataset, CliError> {
    Dataset::load(dir).map_err(|e| {
        CliError::new(format!("Failed to load data from {}: {e}", dir.display()))
    })
}
