//! `memoprov demo`: drive a counting provider under a chosen strategy.
//!
//! Each worker issues `calls` lookups cycling over `keys` distinct keys. The
//! report shows how many times the underlying provider actually ran, which
//! makes the strategies' guarantees visible:
//!
//! - `no-lock` and `locked` compute each key once in total
//! - `per-thread` and `per-thread-locked` compute each key once per thread

use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use memoprov::{
    Locked, MemoConfig, MemoStats, Memoize, NoLock, PerThread, PerThreadLocked, Provider,
    StoreFor, Strategy,
};
use tracing::info;

use crate::error::CliError;

/// Arguments for `memoprov demo`.
#[derive(Debug, Clone, Args)]
pub struct DemoArgs {
    /// Memoization strategy (defaults to the configured one)
    #[arg(long, short)]
    pub strategy: Option<Strategy>,

    /// Number of worker threads
    #[arg(long, short, default_value_t = 4)]
    pub threads: usize,

    /// Lookups issued by each worker
    #[arg(long, short, default_value_t = 1000)]
    pub calls: usize,

    /// Number of distinct keys
    #[arg(long, short, default_value_t = 16)]
    pub keys: u64,
}

/// Squares its input and counts how often it was asked to.
#[derive(Debug, Default)]
struct CountingSquare {
    computations: AtomicU64,
}

impl Provider for CountingSquare {
    type Params = (u64,);
    type Output = u64;
    type Error = Infallible;

    fn produce(&self, (n,): (u64,)) -> Result<u64, Infallible> {
        self.computations.fetch_add(1, Ordering::Relaxed);
        Ok(n.wrapping_mul(n))
    }
}

/// Outcome of one demo run.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub strategy: Strategy,
    pub threads: usize,
    pub calls: usize,
    pub keys: u64,
    /// Times the underlying provider ran.
    pub computations: u64,
    pub stats: MemoStats,
    /// Lookups that returned a wrong value.
    pub mismatches: u64,
    pub elapsed: Duration,
}

impl fmt::Display for DemoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy:     {}", self.strategy)?;
        writeln!(
            f,
            "Workload:     {} thread(s) x {} call(s) over {} key(s)",
            self.threads, self.calls, self.keys
        )?;
        writeln!(f, "Computations: {}", self.computations)?;
        writeln!(f, "Lookups:      {}", self.stats)?;
        writeln!(f, "Mismatches:   {}", self.mismatches)?;
        write!(f, "Elapsed:      {:.2?}", self.elapsed)
    }
}

/// Run the demo and print its report.
pub fn run(args: DemoArgs, config: &MemoConfig) -> Result<(), CliError> {
    let report = execute(&args, config.strategy)?;
    println!("{}", report);
    Ok(())
}

/// Run the demo workload, falling back to `default` when no strategy is given.
pub fn execute(args: &DemoArgs, default: Strategy) -> Result<DemoReport, CliError> {
    let strategy = args.strategy.unwrap_or(default);
    validate(args, strategy)?;

    info!(
        strategy = %strategy,
        threads = args.threads,
        calls = args.calls,
        keys = args.keys,
        "starting demo"
    );

    match strategy {
        Strategy::NoLock => Ok(run_single::<NoLock>(args)),
        Strategy::Locked => run_scoped::<Locked>(args),
        Strategy::PerThread => run_scoped::<PerThread>(args),
        Strategy::PerThreadLocked => run_scoped::<PerThreadLocked>(args),
    }
}

fn validate(args: &DemoArgs, strategy: Strategy) -> Result<(), CliError> {
    if args.threads == 0 {
        return Err(CliError::InvalidArgs("--threads must be at least 1".to_string()));
    }
    if args.keys == 0 {
        return Err(CliError::InvalidArgs("--keys must be at least 1".to_string()));
    }
    if !strategy.is_thread_safe() && args.threads != 1 {
        return Err(CliError::InvalidArgs(format!(
            "strategy '{}' cannot be shared between threads; use --threads 1",
            strategy
        )));
    }
    Ok(())
}

/// Issue one worker's lookups, returning how many came back wrong.
fn drive<P>(provider: &P, worker: usize, args: &DemoArgs) -> u64
where
    P: Provider<Params = (u64,), Output = u64, Error = Infallible>,
{
    let offset = worker as u64;
    let mut mismatches = 0;

    for call in 0..args.calls {
        let key = (offset + call as u64) % args.keys;
        match provider.invoke((key,)) {
            Ok(value) if value == key.wrapping_mul(key) => {}
            Ok(_) => mismatches += 1,
            Err(never) => match never {},
        }
    }
    mismatches
}

fn report<S: StoreFor<(u64,), u64>>(
    args: &DemoArgs,
    memo: &Memoize<CountingSquare, S>,
    mismatches: u64,
    elapsed: Duration,
) -> DemoReport {
    DemoReport {
        strategy: memo.strategy(),
        threads: args.threads,
        calls: args.calls,
        keys: args.keys,
        computations: memo.base().computations.load(Ordering::Relaxed),
        stats: memo.stats(),
        mismatches,
        elapsed,
    }
}

fn run_single<S: StoreFor<(u64,), u64>>(args: &DemoArgs) -> DemoReport {
    let memo: Memoize<CountingSquare, S> = Memoize::new(CountingSquare::default());
    let start = Instant::now();

    let mismatches = (0..args.threads).map(|worker| drive(&memo, worker, args)).sum();

    report(args, &memo, mismatches, start.elapsed())
}

fn run_scoped<S>(args: &DemoArgs) -> Result<DemoReport, CliError>
where
    S: StoreFor<(u64,), u64>,
    Memoize<CountingSquare, S>: Sync,
{
    let memo: Memoize<CountingSquare, S> = Memoize::new(CountingSquare::default());
    let start = Instant::now();

    let mismatches = thread::scope(|scope| {
        let handles: Vec<_> = (0..args.threads)
            .map(|worker| {
                let memo = &memo;
                scope.spawn(move || drive(memo, worker, args))
            })
            .collect();

        handles.into_iter().try_fold(0u64, |total, handle| {
            handle
                .join()
                .map(|count| total + count)
                .map_err(|_| CliError::WorkerPanic)
        })
    })?;

    Ok(report(args, &memo, mismatches, start.elapsed()))
}
