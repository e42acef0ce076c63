//! INI configuration for memoization defaults.
//!
//! Applications that choose a strategy at runtime (and the `memoprov` CLI)
//! read it from a small INI file:
//!
//! ```ini
//! [memo]
//! strategy = locked
//!
//! [logging]
//! filter = info
//! ```
//!
//! Missing sections or keys fall back to [`MemoConfig::default`]. The default
//! file lives at `<config dir>/memoprov/config.ini`, see [`config_file_path`].

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::{debug, warn};

use crate::memo::Strategy;

/// Section holding memoization settings.
pub const SECTION_MEMO: &str = "memo";

/// Key naming the default strategy.
pub const KEY_STRATEGY: &str = "strategy";

/// Section holding logging settings.
pub const SECTION_LOGGING: &str = "logging";

/// Key holding the `tracing` filter directive.
pub const KEY_FILTER: &str = "filter";

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid INI.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A key holds an unusable value.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// No platform configuration directory is available.
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

impl From<ini::Error> for ConfigError {
    fn from(e: ini::Error) -> Self {
        match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        }
    }
}

/// Memoization defaults loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoConfig {
    /// Strategy used when the caller does not pick one.
    pub strategy: Strategy,

    /// `tracing` filter directive, e.g. `info` or `memoprov=trace`.
    pub log_filter: String,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl MemoConfig {
    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid INI, or holds an
    /// unknown strategy or an empty log filter.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path)?;
        debug!(path = %path.display(), "loaded memo config");
        Self::from_ini(&ini)
    }

    /// Load configuration from the default location.
    ///
    /// Returns defaults when no file exists. A file that exists but cannot be
    /// loaded is reported with a warning and replaced by defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = ini
            .section(Some(SECTION_MEMO))
            .and_then(|section| section.get(KEY_STRATEGY))
        {
            config.strategy = value.parse().map_err(|e: crate::memo::ParseStrategyError| {
                ConfigError::InvalidValue {
                    key: format!("{}.{}", SECTION_MEMO, KEY_STRATEGY),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = ini
            .section(Some(SECTION_LOGGING))
            .and_then(|section| section.get(KEY_FILTER))
        {
            let value = value.trim();
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: format!("{}.{}", SECTION_LOGGING, KEY_FILTER),
                    reason: "filter must not be empty".to_string(),
                });
            }
            config.log_filter = value.to_string();
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION_MEMO))
            .set(KEY_STRATEGY, self.strategy.name());
        ini.with_section(Some(SECTION_LOGGING))
            .set(KEY_FILTER, self.log_filter.as_str());
        ini
    }

    /// Render the configuration as INI text.
    pub fn to_ini_string(&self) -> Result<String, ConfigError> {
        let mut buffer = Vec::new();
        self.to_ini().write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        debug!(path = %path.display(), "saved memo config");
        Ok(())
    }
}

/// Default configuration file location, if the platform has a config dir.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("memoprov").join("config.ini"))
}
