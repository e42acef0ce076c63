//! Logging setup.
//!
//! The filter directive is taken from `--log`, then `RUST_LOG`, then the
//! `[logging] filter` config key.

use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Pick the filter directive by precedence.
fn select_directive(cli: Option<&str>, env: Option<String>, config: &str) -> String {
    cli.map(str::to_string)
        .or_else(|| env.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| config.to_string())
}

/// Install the global fmt subscriber, writing to stderr.
pub fn init(cli_filter: Option<&str>, config_filter: &str) -> Result<(), CliError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = select_directive(cli_filter, env, config_filter);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| CliError::Logging(format!("'{}': {}", directive, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_filter_wins() {
        let directive = select_directive(Some("trace"), Some("info".to_string()), "warn");
        assert_eq!(directive, "trace");
    }

    #[test]
    fn test_env_before_config() {
        let directive = select_directive(None, Some("memoprov=debug".to_string()), "warn");
        assert_eq!(directive, "memoprov=debug");
    }

    #[test]
    fn test_config_fallback() {
        assert_eq!(select_directive(None, None, "warn"), "warn");
        assert_eq!(select_directive(None, Some("  ".to_string()), "info"), "info");
    }
}
