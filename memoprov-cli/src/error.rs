//! CLI error type.

use memoprov::ConfigError;
use thiserror::Error;

/// Errors reported by `memoprov` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or saving configuration failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The log filter directive could not be parsed or installed.
    #[error("Invalid log filter: {0}")]
    Logging(String),

    /// Command-line arguments are inconsistent.
    #[error("{0}")]
    InvalidArgs(String),

    /// A demo worker thread panicked.
    #[error("Worker thread panicked")]
    WorkerPanic,
}
