//! Memoized function compositions.
//!
//! A callable singleton is a [`Memoize`] decorator over a function adapter.
//! It adds no behavior of its own; it saves the caller one composition step.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use memoprov::{infallible_singleton, InfallibleCallableSingleton, Locked, Provider};
//!
//! let loads = AtomicUsize::new(0);
//! let greeting: InfallibleCallableSingleton<_, (String, u32), Locked> =
//!     infallible_singleton(|name: String, visits: u32| {
//!         loads.fetch_add(1, Ordering::SeqCst);
//!         format!("hello {} (visit {})", name, visits)
//!     });
//!
//! let key = ("ada".to_string(), 2);
//! assert_eq!(greeting.invoke(key.clone()).unwrap(), "hello ada (visit 2)");
//! assert_eq!(greeting.invoke(key).unwrap(), "hello ada (visit 2)");
//! assert_eq!(loads.load(Ordering::SeqCst), 1);
//! ```

use std::hash::Hash;

use super::strategy::StoreFor;
use super::Memoize;
use crate::provider::{Callable, InfallibleCallable, ParamsFn};

/// A fallible function memoized under strategy `S`.
pub type CallableSingleton<F, P, S> = Memoize<Callable<F, P>, S>;

/// An infallible function memoized under strategy `S`.
pub type InfallibleCallableSingleton<F, P, S> = Memoize<InfallibleCallable<F, P>, S>;

/// Memoize a function returning `Result<R, E>`.
///
/// Failed calls are not cached.
pub fn callable_singleton<S, F, P, R, E>(func: F) -> CallableSingleton<F, P, S>
where
    S: StoreFor<P, R>,
    F: ParamsFn<P, Output = Result<R, E>>,
    P: Eq + Hash + Clone,
    R: Clone,
{
    Memoize::new(Callable::new(func))
}

/// Memoize a function that cannot fail.
pub fn infallible_singleton<S, F, P>(func: F) -> InfallibleCallableSingleton<F, P, S>
where
    S: StoreFor<P, <F as ParamsFn<P>>::Output>,
    F: ParamsFn<P>,
    P: Eq + Hash + Clone,
    <F as ParamsFn<P>>::Output: Clone,
{
    Memoize::new(InfallibleCallable::new(func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::{Locked, NoLock, PerThread};
    use crate::provider::Provider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_callable_singleton_memoizes() {
        let calls = AtomicUsize::new(0);
        let parse: CallableSingleton<_, (String,), Locked> = callable_singleton(|s: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            s.parse::<i64>().map_err(|e| e.to_string())
        });

        assert_eq!(parse.invoke(("12".to_string(),)), Ok(12));
        assert_eq!(parse.invoke(("12".to_string(),)), Ok(12));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callable_singleton_retries_failures() {
        let calls = AtomicUsize::new(0);
        let parse: CallableSingleton<_, (String,), NoLock> = callable_singleton(|s: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            s.parse::<i64>().map_err(|e| e.to_string())
        });

        assert!(parse.invoke(("nope".to_string(),)).is_err());
        assert!(parse.invoke(("nope".to_string(),)).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_infallible_singleton_distinct_keys() {
        let calls = AtomicUsize::new(0);
        let double: InfallibleCallableSingleton<_, (u16,), PerThread> =
            infallible_singleton(|n: u16| {
                calls.fetch_add(1, Ordering::SeqCst);
                u32::from(n) * 2
            });

        assert_eq!(double.invoke((1,)), Ok(2));
        assert_eq!(double.invoke((2,)), Ok(4));
        assert_eq!(double.invoke((1,)), Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(double.cached_len(), 2);
    }
}
