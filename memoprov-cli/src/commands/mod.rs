//! CLI subcommands.

pub mod config;
pub mod demo;
pub mod strategies;

use std::path::PathBuf;

use memoprov::{config_file_path, ConfigError, MemoConfig};

use crate::error::CliError;

/// Configuration shared by all subcommands.
#[derive(Debug, Clone)]
pub struct Context {
    /// File the configuration was read from, or would be written to.
    pub config_path: PathBuf,
    /// Loaded configuration, or defaults when the file does not exist.
    pub config: MemoConfig,
}

impl Context {
    /// Resolve the config path and load it.
    ///
    /// A missing file yields defaults; a file that exists but is invalid is
    /// an error.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, CliError> {
        let config_path = match explicit {
            Some(path) => path,
            None => config_file_path().ok_or(ConfigError::NoConfigDir)?,
        };

        let config = if config_path.exists() {
            MemoConfig::load(&config_path)?
        } else {
            MemoConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }
}
