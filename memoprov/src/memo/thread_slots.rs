//! Per-instance, per-thread storage.
//!
//! A [`ThreadSlot`] gives every thread its own lazily created `T`, scoped to
//! one owning object. Values live in the accessing thread's thread-local
//! registry and never cross threads, so `T` needs neither `Send` nor `Sync`.
//!
//! # Lifetime
//!
//! Dropping a slot releases the dropping thread's value immediately. Values
//! created on other threads are released the next time that thread accesses
//! any slot, or when it exits. A global drop counter makes that check cheap:
//! a thread only scans its registry when some slot was dropped since its
//! last scan.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

/// Number of slots dropped so far, across all threads.
static DROPPED_SLOTS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

#[derive(Default)]
struct Registry {
    entries: HashMap<u64, SlotEntry>,
    /// Value of `DROPPED_SLOTS` at this thread's last scan.
    seen_drops: u64,
}

impl Registry {
    /// Remove entries whose slot was dropped, if any slot was dropped since
    /// the last scan. The caller drops the result outside the registry borrow.
    fn take_stale(&mut self) -> Vec<SlotEntry> {
        let dropped = DROPPED_SLOTS.load(Ordering::Acquire);
        if dropped == self.seen_drops {
            return Vec::new();
        }
        self.seen_drops = dropped;

        let dead: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.alive.load(Ordering::Acquire))
            .map(|(id, _)| *id)
            .collect();

        dead.into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }
}

struct SlotEntry {
    /// Cleared when the owning slot is dropped.
    alive: Arc<AtomicBool>,
    value: Rc<dyn Any>,
}

/// Handle to one thread-confined value per accessing thread.
pub(crate) struct ThreadSlot<T> {
    id: u64,
    alive: Arc<AtomicBool>,
    _value: PhantomData<fn() -> T>,
}

/// Run `f` on this thread's registry after pruning stale entries.
///
/// Pruned values are dropped after the borrow ends, since cached values may
/// themselves own slots.
fn with_registry<R>(f: impl FnOnce(&mut HashMap<u64, SlotEntry>) -> R) -> R {
    let (result, stale) = REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let stale = registry.take_stale();
        (f(&mut registry.entries), stale)
    });
    drop(stale);
    result
}

impl<T: Default + 'static> ThreadSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed),
            alive: Arc::new(AtomicBool::new(true)),
            _value: PhantomData,
        }
    }

    /// Get the calling thread's value, creating it on first access.
    pub(crate) fn get_or_create(&self) -> Rc<T> {
        with_registry(|entries| {
            if let Some(value) = entries
                .get(&self.id)
                .and_then(|entry| Rc::clone(&entry.value).downcast::<T>().ok())
            {
                return value;
            }

            let value = Rc::new(T::default());
            entries.insert(
                self.id,
                SlotEntry {
                    alive: Arc::clone(&self.alive),
                    value: Rc::clone(&value) as Rc<dyn Any>,
                },
            );
            value
        })
    }

    /// Get the calling thread's value without creating it.
    pub(crate) fn get(&self) -> Option<Rc<T>> {
        with_registry(|entries| {
            entries
                .get(&self.id)
                .and_then(|entry| Rc::clone(&entry.value).downcast::<T>().ok())
        })
    }
}

impl<T> Drop for ThreadSlot<T> {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
        DROPPED_SLOTS.fetch_add(1, Ordering::Release);

        // try_with: the registry may already be gone during thread teardown.
        let removed = REGISTRY.try_with(|registry| {
            registry
                .try_borrow_mut()
                .ok()
                .and_then(|mut registry| registry.entries.remove(&self.id))
        });
        drop(removed);
    }
}

#[cfg(test)]
fn local_slot_count() -> usize {
    REGISTRY.with(|registry| registry.borrow().entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_value_created_once_per_thread() {
        thread::spawn(|| {
            let slot = ThreadSlot::<RefCell<Vec<u32>>>::new();
            assert!(slot.get().is_none());

            slot.get_or_create().borrow_mut().push(1);
            slot.get_or_create().borrow_mut().push(2);

            assert_eq!(*slot.get().unwrap().borrow(), vec![1, 2]);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_threads_get_independent_values() {
        let slot = Arc::new(ThreadSlot::<RefCell<Vec<u32>>>::new());
        slot.get_or_create().borrow_mut().push(1);

        let remote = Arc::clone(&slot);
        let seen = thread::spawn(move || {
            let value = remote.get_or_create();
            let len = value.borrow().len();
            value.borrow_mut().push(99);
            len
        })
        .join()
        .unwrap();

        assert_eq!(seen, 0);
        assert_eq!(*slot.get().unwrap().borrow(), vec![1]);
    }

    #[test]
    fn test_slots_are_isolated_per_owner() {
        thread::spawn(|| {
            let first = ThreadSlot::<RefCell<u32>>::new();
            let second = ThreadSlot::<RefCell<u32>>::new();

            *first.get_or_create().borrow_mut() = 5;
            assert_eq!(*second.get_or_create().borrow(), 0);
            assert_eq!(local_slot_count(), 2);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_drop_releases_current_thread_value() {
        thread::spawn(|| {
            let slot = ThreadSlot::<RefCell<u32>>::new();
            slot.get_or_create();
            assert_eq!(local_slot_count(), 1);

            drop(slot);
            assert_eq!(local_slot_count(), 0);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_stale_values_pruned_on_other_threads() {
        let first = Arc::new(ThreadSlot::<RefCell<u32>>::new());
        let second = Arc::new(ThreadSlot::<RefCell<u32>>::new());
        let (ready_tx, ready_rx) = mpsc::channel();
        let (dropped_tx, dropped_rx) = mpsc::channel::<()>();

        let worker = {
            let first = Arc::clone(&first);
            let second = Arc::clone(&second);
            thread::spawn(move || {
                first.get_or_create();
                drop(first);
                assert_eq!(local_slot_count(), 1);
                ready_tx.send(()).unwrap();

                dropped_rx.recv().unwrap();
                second.get_or_create();
                local_slot_count()
            })
        };

        ready_rx.recv().unwrap();
        drop(first);
        dropped_tx.send(()).unwrap();

        assert_eq!(worker.join().unwrap(), 1);
    }

    #[test]
    fn test_stale_values_pruned_by_read_only_access() {
        let dropped = Arc::new(ThreadSlot::<RefCell<Vec<u8>>>::new());
        let kept = Arc::new(ThreadSlot::<RefCell<u8>>::new());
        let (ready_tx, ready_rx) = mpsc::channel();
        let (dropped_tx, dropped_rx) = mpsc::channel::<()>();

        let worker = {
            let dropped = Arc::clone(&dropped);
            let kept = Arc::clone(&kept);
            thread::spawn(move || {
                dropped.get_or_create().borrow_mut().resize(1 << 16, 0);
                kept.get_or_create();
                drop(dropped);
                assert_eq!(local_slot_count(), 2);
                ready_tx.send(()).unwrap();

                dropped_rx.recv().unwrap();
                assert!(kept.get().is_some());
                local_slot_count()
            })
        };

        ready_rx.recv().unwrap();
        drop(dropped);
        dropped_tx.send(()).unwrap();

        assert_eq!(worker.join().unwrap(), 1);
    }
}
