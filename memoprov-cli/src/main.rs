//! memoprov CLI - Command-line interface
//!
//! Lists memoization strategies, runs a small workload under a chosen
//! strategy, and manages the `config.ini` shared with the library.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::demo::DemoArgs;
use commands::Context;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "memoprov")]
#[command(version, about = "Typed providers with pluggable memoization", long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/memoprov/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `memoprov=trace`
    #[arg(long, global = true, value_name = "FILTER")]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the available memoization strategies
    Strategies,

    /// Run a counting provider under a memoization strategy
    Demo(DemoArgs),

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::load(cli.config)?;
    logging::init(cli.log.as_deref(), &ctx.config.log_filter)?;

    match cli.command {
        Commands::Strategies => commands::strategies::run(ctx.config.strategy),
        Commands::Demo(args) => commands::demo::run(args, &ctx.config),
        Commands::Config { command } => commands::config::run(command, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use memoprov::Strategy;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_demo_args() {
        let cli = Cli::try_parse_from([
            "memoprov", "demo", "--strategy", "thread-local", "--threads", "2", "--keys", "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Demo(args) => {
                assert_eq!(args.strategy, Some(Strategy::PerThread));
                assert_eq!(args.threads, 2);
                assert_eq!(args.calls, 1000);
                assert_eq!(args.keys, 5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "memoprov",
            "config",
            "set-strategy",
            "locked",
            "--config",
            "/tmp/memoprov.ini",
            "--log",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/memoprov.ini")));
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::SetStrategy {
                    strategy: Strategy::Locked
                }
            }
        ));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(Cli::try_parse_from(["memoprov", "demo", "--strategy", "lru"]).is_err());
    }
}
