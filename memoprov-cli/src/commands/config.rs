//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, and `config set-strategy`.

use clap::Subcommand;
use memoprov::Strategy;

use super::Context;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration as INI
    Show,

    /// Set the default memoization strategy
    SetStrategy {
        /// Strategy name (no-lock, locked, per-thread, per-thread-locked)
        strategy: Strategy,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, ctx: Context) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            if !ctx.config_path.exists() {
                println!("# {} not found, showing defaults", ctx.config_path.display());
            }
            print!("{}", ctx.config.to_ini_string()?);
            Ok(())
        }
        ConfigCommands::SetStrategy { strategy } => set_strategy(ctx, strategy),
    }
}

fn set_strategy(ctx: Context, strategy: Strategy) -> Result<(), CliError> {
    let mut config = ctx.config;
    config.strategy = strategy;
    config.save(&ctx.config_path)?;

    println!("Set memo.strategy = {}", strategy);
    Ok(())
}
