//! Memoizing decorators
//!
//! [`Memoize`] wraps a base [`Provider`] and caches its result per distinct
//! parameter tuple. What is cached (the base provider's output) is kept
//! separate from how concurrent access is serialized (the strategy `S`), so
//! any provider can be memoized under any strategy without changes.
//!
//! # Contract
//!
//! On `produce(params)`:
//!
//! - **hit**: the cached value is returned, the base provider is not called
//! - **miss**: the base provider's `produce` runs, its value is stored under
//!   `params` and returned
//! - **failure**: the base provider's error is returned unchanged and nothing
//!   is stored, so a later call with the same `params` computes again
//!
//! Entries are never updated or evicted; they live as long as the decorator.
//! Reference-flavor outputs (`&'a T` or `Arc<T>`) are cached as the handle
//! itself, so every hit shares the same underlying state. Borrowed handles
//! and keys work with [`NoLock`] and [`Locked`]; the per-thread strategies
//! need `'static` types, so use `Arc<T>` there.
//!
//! # Strategies
//!
//! See [`strategy`] for the four disciplines. Type aliases name the common
//! compositions: [`NoLockMemo`], [`LockedMemo`], [`PerThreadMemo`],
//! [`PerThreadLockedMemo`], and [`CallableSingleton`] for a memoized function.

mod singleton;
pub mod store;
pub mod strategy;
mod thread_slots;

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::provider::Provider;

pub use singleton::{
    callable_singleton, infallible_singleton, CallableSingleton, InfallibleCallableSingleton,
};
pub use store::{CacheStore, Lookup};
pub use strategy::{
    Locked, MemoStrategy, NoLock, ParseStrategyError, PerThread, PerThreadLocked, StoreFor,
    Strategy,
};

/// Memoizing decorator using the single-threaded [`NoLock`] strategy.
pub type NoLockMemo<B> = Memoize<B, NoLock>;

/// Memoizing decorator using the mutex-guarded [`Locked`] strategy.
pub type LockedMemo<B> = Memoize<B, Locked>;

/// Memoizing decorator using the thread-confined [`PerThread`] strategy.
///
/// Each thread's cache is dropped with the decorator when the dropping
/// thread owns it. Caches held by other threads are released the next time
/// those threads touch any per-thread cache, or when they exit.
pub type PerThreadMemo<B> = Memoize<B, PerThread>;

/// Memoizing decorator using the [`PerThreadLocked`] strategy.
pub type PerThreadLockedMemo<B> = Memoize<B, PerThreadLocked>;

/// Point-in-time copy of a decorator's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Calls answered from the cache.
    pub hits: u64,
    /// Calls that computed and stored a value.
    pub misses: u64,
    /// Calls whose computation failed.
    pub failures: u64,
}

impl MemoStats {
    /// Total number of calls.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses + self.failures
    }

    /// Fraction of calls answered from the cache, `0.0` when idle.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}

impl fmt::Display for MemoStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits, {} misses, {} failures ({:.1}% hit rate)",
            self.hits,
            self.misses,
            self.failures,
            self.hit_rate() * 100.0
        )
    }
}

/// Memoizing decorator over a base provider.
///
/// `S` selects the concurrency discipline at compile time. The decorator is
/// `Sync` exactly when its strategy permits sharing, so sharing a
/// [`NoLock`] decorator across threads is rejected by the compiler:
///
/// ```compile_fail
/// use memoprov::{InfallibleCallable, NoLock, ProviderExt};
///
/// fn assert_sync<T: Sync>(_: &T) {}
///
/// let memo = InfallibleCallable::<_, (u8,)>::new(|n: u8| n).memoize::<NoLock>();
/// assert_sync(&memo);
/// ```
///
/// A base provider may call back into the decorator wrapping it (recursive
/// memoization) under every strategy except [`Locked`], whose nested call
/// waits on the held lock forever.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use memoprov::{InfallibleCallable, LockedMemo, Memoize, Provider};
///
/// let calls = AtomicUsize::new(0);
/// let slow_square = InfallibleCallable::<_, (u64,)>::new(|n: u64| {
///     calls.fetch_add(1, Ordering::SeqCst);
///     n * n
/// });
///
/// let memo: LockedMemo<_> = Memoize::new(slow_square);
/// assert_eq!(memo.invoke((9,)), Ok(81));
/// assert_eq!(memo.invoke((9,)), Ok(81));
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub struct Memoize<B, S>
where
    B: Provider,
    B::Params: Eq + Hash + Clone,
    B::Output: Clone,
    S: StoreFor<B::Params, B::Output>,
{
    base: B,
    store: <S as StoreFor<B::Params, B::Output>>::Store,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
    _strategy: PhantomData<S>,
}

impl<B, S> Memoize<B, S>
where
    B: Provider,
    B::Params: Eq + Hash + Clone,
    B::Output: Clone,
    S: StoreFor<B::Params, B::Output>,
{
    /// Wrap `base` with an empty cache.
    pub fn new(base: B) -> Self {
        debug!(strategy = %S::KIND, "memoizing provider created");
        Self {
            base,
            store: Default::default(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            _strategy: PhantomData,
        }
    }

    /// Get the wrapped provider.
    pub fn base(&self) -> &B {
        &self.base
    }

    /// Discard the cache and return the wrapped provider.
    pub fn into_inner(self) -> B {
        self.base
    }

    /// The strategy this decorator was built with.
    pub fn strategy(&self) -> Strategy {
        S::KIND
    }

    /// Snapshot of the hit/miss/failure counters, across all threads.
    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Return the cached value for `params` without computing it.
    ///
    /// For per-thread strategies only the calling thread's cache is consulted.
    pub fn peek(&self, params: &B::Params) -> Option<B::Output> {
        self.store.get(params)
    }

    /// Whether a value for `params` is cached (for the calling thread).
    pub fn is_cached(&self, params: &B::Params) -> bool {
        self.peek(params).is_some()
    }

    /// Number of cached entries visible to the calling thread.
    pub fn cached_len(&self) -> usize {
        self.store.len()
    }
}

impl<B, S> Provider for Memoize<B, S>
where
    B: Provider,
    B::Params: Eq + Hash + Clone,
    B::Output: Clone,
    S: StoreFor<B::Params, B::Output>,
{
    type Params = B::Params;
    type Output = B::Output;
    type Error = B::Error;

    fn produce(&self, params: B::Params) -> Result<B::Output, B::Error> {
        let lookup = self
            .store
            .get_or_try_insert_with(params, |key| self.base.produce(key.clone()));

        match lookup {
            Ok(Lookup::Hit(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(strategy = %S::KIND, hit = true, "memo lookup");
                Ok(value)
            }
            Ok(Lookup::Miss(value)) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(strategy = %S::KIND, hit = false, "memo lookup");
                Ok(value)
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }
}

impl<B, S> fmt::Debug for Memoize<B, S>
where
    B: Provider + fmt::Debug,
    B::Params: Eq + Hash + Clone,
    B::Output: Clone,
    S: StoreFor<B::Params, B::Output>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoize")
            .field("base", &self.base)
            .field("strategy", &S::KIND)
            .field("stats", &self.stats())
            .finish()
    }
}
