//! Cache stores backing the memoizing decorator.
//!
//! A store maps parameter tuples to computed results and decides how
//! concurrent access is serialized. All stores share one contract:
//!
//! - entries are written once, on the first successful computation for a key
//! - a failed computation leaves no entry behind
//! - a panicking computation leaves no entry behind and releases any lock
//!
//! | Store | Used by | Lock held during compute |
//! |---|---|---|
//! | [`CellStore`] | [`NoLock`](super::NoLock) | no |
//! | [`LockedStore`] | [`Locked`](super::Locked) | yes |
//! | [`PerThreadStore`] | [`PerThread`](super::PerThread) | no |
//! | [`PerThreadLockedStore`] | [`PerThreadLocked`](super::PerThreadLocked) | yes, reentrant |
//!
//! Every store except [`LockedStore`] allows the base provider to call back
//! into the same decorator (recursive memoization); the map borrow is
//! released while computing and the first value stored for a key wins.
//! [`LockedStore`] deadlocks on such re-entrant calls.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::{Mutex, ReentrantMutex};

use super::thread_slots::ThreadSlot;

/// Outcome of a store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// The value was already cached.
    Hit(V),
    /// The value was computed and inserted by this call.
    Miss(V),
}

impl<V> Lookup<V> {
    /// Whether the value came from the cache.
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Extract the value.
    pub fn into_value(self) -> V {
        match self {
            Lookup::Hit(value) | Lookup::Miss(value) => value,
        }
    }
}

/// Write-once map from keys to computed values.
pub trait CacheStore<K, V>: Default {
    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the error from `compute` unchanged. Nothing is stored for
    /// `key` in that case.
    fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>;

    /// Return the cached value for `key` without computing it.
    fn get(&self, key: &K) -> Option<V>;

    /// Number of entries visible to the calling thread.
    fn len(&self) -> usize;

    /// Whether no entries are visible to the calling thread.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unsynchronized store. `!Sync`, so it cannot be shared across threads.
pub struct CellStore<K, V> {
    entries: RefCell<HashMap<K, V>>,
}

impl<K, V> Default for CellStore<K, V> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<K, V> fmt::Debug for CellStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellStore")
            .field("entries", &self.entries.try_borrow().map(|e| e.len()).ok())
            .finish()
    }
}

impl<K: Eq + Hash, V: Clone> CacheStore<K, V> for CellStore<K, V> {
    fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        lookup_or_compute(&self.entries, key, compute)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Store guarded by one mutex held across lookup, compute and insert.
///
/// Guarantees at most one computation per key, at the cost of serializing
/// computations for different keys.
pub struct LockedStore<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for LockedStore<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> fmt::Debug for LockedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedStore")
            .field("entries", &self.entries.try_lock().map(|e| e.len()))
            .finish()
    }
}

impl<K: Eq + Hash, V: Clone> CacheStore<K, V> for LockedStore<K, V> {
    fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        lookup_or_compute_locked(&self.entries, key, compute)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Thread-confined store: one independent map per accessing thread.
pub struct PerThreadStore<K, V> {
    slot: ThreadSlot<RefCell<HashMap<K, V>>>,
}

impl<K: 'static, V: 'static> Default for PerThreadStore<K, V> {
    fn default() -> Self {
        Self {
            slot: ThreadSlot::new(),
        }
    }
}

impl<K, V> fmt::Debug for PerThreadStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerThreadStore").finish_non_exhaustive()
    }
}

impl<K: Eq + Hash + 'static, V: Clone + 'static> CacheStore<K, V> for PerThreadStore<K, V> {
    fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let entries = self.slot.get_or_create();
        lookup_or_compute(&entries, key, compute)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.slot
            .get()
            .and_then(|entries| entries.borrow().get(key).cloned())
    }

    fn len(&self) -> usize {
        self.slot.get().map_or(0, |entries| entries.borrow().len())
    }
}

/// Thread-confined store with a per-thread reentrant lock held across compute.
///
/// Only the owning thread ever takes each lock, so it is never contended.
/// The lock is reentrant and the map borrow is released while computing, so
/// recursive providers behave exactly as under [`PerThreadStore`].
pub struct PerThreadLockedStore<K, V> {
    slot: ThreadSlot<ReentrantMutex<RefCell<HashMap<K, V>>>>,
}

impl<K: 'static, V: 'static> Default for PerThreadLockedStore<K, V> {
    fn default() -> Self {
        Self {
            slot: ThreadSlot::new(),
        }
    }
}

impl<K, V> fmt::Debug for PerThreadLockedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerThreadLockedStore").finish_non_exhaustive()
    }
}

impl<K: Eq + Hash + 'static, V: Clone + 'static> CacheStore<K, V>
    for PerThreadLockedStore<K, V>
{
    fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let entries = self.slot.get_or_create();
        let guard = entries.lock();
        lookup_or_compute(&guard, key, compute)
    }

    fn get(&self, key: &K) -> Option<V> {
        let entries = self.slot.get()?;
        let guard = entries.lock();
        let value = guard.borrow().get(key).cloned();
        value
    }

    fn len(&self) -> usize {
        self.slot.get().map_or(0, |entries| {
            let guard = entries.lock();
            let len = guard.borrow().len();
            len
        })
    }
}

/// Lookup-or-compute without holding a borrow across `compute`.
///
/// If `compute` re-entered and filled `key` first, the earlier value wins.
fn lookup_or_compute<K, V, E, F>(
    entries: &RefCell<HashMap<K, V>>,
    key: K,
    compute: F,
) -> Result<Lookup<V>, E>
where
    K: Eq + Hash,
    V: Clone,
    F: FnOnce(&K) -> Result<V, E>,
{
    if let Some(value) = entries.borrow().get(&key) {
        return Ok(Lookup::Hit(value.clone()));
    }

    let value = compute(&key)?;
    let stored = entries.borrow_mut().entry(key).or_insert(value).clone();
    Ok(Lookup::Miss(stored))
}

/// Lookup-or-compute with the lock held for the whole sequence.
fn lookup_or_compute_locked<K, V, E, F>(
    entries: &Mutex<HashMap<K, V>>,
    key: K,
    compute: F,
) -> Result<Lookup<V>, E>
where
    K: Eq + Hash,
    V: Clone,
    F: FnOnce(&K) -> Result<V, E>,
{
    let mut entries = entries.lock();
    if let Some(value) = entries.get(&key) {
        return Ok(Lookup::Hit(value.clone()));
    }

    let value = compute(&key)?;
    entries.insert(key, value.clone());
    Ok(Lookup::Miss(value))
}
