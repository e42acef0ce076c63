//! `memoprov strategies`: list the available memoization strategies.

use memoprov::Strategy;

use crate::error::CliError;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Print one row per strategy.
pub fn run(default: Strategy) -> Result<(), CliError> {
    println!(
        "{:<20} {:<12} {:<8} {:<8} DESCRIPTION",
        "STRATEGY", "THREAD-SAFE", "BLOCKS", "SHARED"
    );

    for strategy in Strategy::ALL {
        let marker = if strategy == default { "*" } else { " " };
        println!(
            "{}{:<19} {:<12} {:<8} {:<8} {}",
            marker,
            strategy.name(),
            yes_no(strategy.is_thread_safe()),
            yes_no(strategy.may_block()),
            yes_no(strategy.shares_cache()),
            strategy.description()
        );
    }

    println!();
    println!("* configured default");
    Ok(())
}
