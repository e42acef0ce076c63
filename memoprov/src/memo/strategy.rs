//! Memoization strategies.
//!
//! Each strategy is available in two forms:
//!
//! - a marker type ([`NoLock`], [`Locked`], [`PerThread`], [`PerThreadLocked`])
//!   selecting the cache store at compile time, and
//! - a [`Strategy`] value naming it at runtime (configuration, logging, CLI).
//!
//! | Strategy | Locking | Guarantee |
//! |---|---|---|
//! | `no-lock` | none | single-threaded only (`!Sync`) |
//! | `locked` | one mutex over lookup, compute and insert | at most one computation per key |
//! | `per-thread` | none, one cache per thread | at most one computation per key per thread |
//! | `per-thread-locked` | uncontended per-thread reentrant mutex | same as `per-thread` |

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use thiserror::Error;

use super::store::{CacheStore, CellStore, LockedStore, PerThreadLockedStore, PerThreadStore};

/// Runtime name of a memoization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// No synchronization; the decorator cannot be shared between threads.
    NoLock,
    /// One mutex guarding the whole lookup-or-compute-and-insert sequence.
    #[default]
    Locked,
    /// Independent cache per thread, no cross-thread synchronization.
    PerThread,
    /// Independent cache per thread, each guarded by its own mutex.
    PerThreadLocked,
}

impl Strategy {
    /// All strategies, in documentation order.
    pub const ALL: [Strategy; 4] = [
        Strategy::NoLock,
        Strategy::Locked,
        Strategy::PerThread,
        Strategy::PerThreadLocked,
    ];

    /// Canonical configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::NoLock => "no-lock",
            Strategy::Locked => "locked",
            Strategy::PerThread => "per-thread",
            Strategy::PerThreadLocked => "per-thread-locked",
        }
    }

    /// One-line description suitable for CLI listings.
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::NoLock => "no synchronization; single-threaded callers only",
            Strategy::Locked => "shared cache behind one mutex; at most one computation per key",
            Strategy::PerThread => "one cache per thread; may compute a key once per thread",
            Strategy::PerThreadLocked => "one cache per thread behind a reentrant lock; never contended",
        }
    }

    /// Whether a decorator using this strategy may be shared across threads.
    pub fn is_thread_safe(&self) -> bool {
        !matches!(self, Strategy::NoLock)
    }

    /// Whether a call may block waiting for another caller.
    ///
    /// Only `Locked` can block on another thread. `PerThreadLocked` takes a
    /// lock, but no other thread ever holds it.
    pub fn may_block(&self) -> bool {
        matches!(self, Strategy::Locked)
    }

    /// Whether all threads observe one shared cache.
    pub fn shares_cache(&self) -> bool {
        matches!(self, Strategy::NoLock | Strategy::Locked)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a strategy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown memoization strategy '{input}' (expected one of: no-lock, locked, per-thread, per-thread-locked)")]
pub struct ParseStrategyError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "no-lock" | "nolock" | "none" | "unsynchronized" => Ok(Strategy::NoLock),
            "locked" | "mutex" | "lock" => Ok(Strategy::Locked),
            "per-thread" | "thread-local" | "threadlocal" => Ok(Strategy::PerThread),
            "per-thread-locked" | "thread-local-locked" | "thread-local-mutex" => {
                Ok(Strategy::PerThreadLocked)
            }
            _ => Err(ParseStrategyError {
                input: s.to_string(),
            }),
        }
    }
}

/// Compile-time name of a memoization strategy.
///
/// Implemented by the four marker types.
pub trait MemoStrategy {
    /// Runtime name of this strategy.
    const KIND: Strategy;
}

/// Cache store a strategy keeps for keys `K` and values `V`.
///
/// `NoLock` and `Locked` accept any key and value types, including borrowed
/// ones such as `&'a T` handles. The per-thread strategies park their maps in
/// thread-local storage that can outlive the decorator, so they require
/// `'static` keys and values.
pub trait StoreFor<K, V>: MemoStrategy {
    /// Cache store used by this strategy.
    type Store: CacheStore<K, V>;
}

/// No synchronization. See [`Strategy::NoLock`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

/// Single mutex over the whole cache. See [`Strategy::Locked`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Locked;

/// Thread-confined cache. See [`Strategy::PerThread`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PerThread;

/// Thread-confined cache with a per-thread reentrant lock. See [`Strategy::PerThreadLocked`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PerThreadLocked;

impl MemoStrategy for NoLock {
    const KIND: Strategy = Strategy::NoLock;
}

impl MemoStrategy for Locked {
    const KIND: Strategy = Strategy::Locked;
}

impl MemoStrategy for PerThread {
    const KIND: Strategy = Strategy::PerThread;
}

impl MemoStrategy for PerThreadLocked {
    const KIND: Strategy = Strategy::PerThreadLocked;
}

impl<K: Eq + Hash, V: Clone> StoreFor<K, V> for NoLock {
    type Store = CellStore<K, V>;
}

impl<K: Eq + Hash, V: Clone> StoreFor<K, V> for Locked {
    type Store = LockedStore<K, V>;
}

impl<K: Eq + Hash + 'static, V: Clone + 'static> StoreFor<K, V> for PerThread {
    type Store = PerThreadStore<K, V>;
}

impl<K: Eq + Hash + 'static, V: Clone + 'static> StoreFor<K, V> for PerThreadLocked {
    type Store = PerThreadLockedStore<K, V>;
}
