//! memoprov - Typed providers with pluggable memoization
//!
//! A [`Provider`] produces a result from a fixed, statically typed parameter
//! tuple. Base providers wrap plain functions ([`Callable`]) or constant values
//! ([`FixedObject`]); a [`Memoize`] decorator layers a per-parameter cache on
//! top of any base provider using one of four concurrency strategies.
//!
//! # Architecture
//!
//! ```text
//! caller ──► Memoize<B, S> ──miss──► B: Provider ──► fn / value
//!               │
//!               └── S::Store  (NoLock | Locked | PerThread | PerThreadLocked)
//! ```
//!
//! Parameter defaults are handled separately by [`params::merge`], which fills
//! the absent fields of a partial override from a fully specified record.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use memoprov::{Callable, Locked, Provider, ProviderExt};
//!
//! let add = Callable::<_, (i32, i32)>::new(|a: i32, b: i32| Ok::<_, Infallible>(a + b));
//! let cached = add.memoize::<Locked>();
//!
//! assert_eq!(cached.invoke((2, 5)), Ok(7));
//! assert_eq!(cached.invoke((2, 5)), Ok(7));
//! assert_eq!(cached.stats().hits, 1);
//! ```

pub mod config;
pub mod memo;
pub mod params;
pub mod provider;

pub use config::{config_file_path, ConfigError, MemoConfig};
pub use memo::{
    callable_singleton, infallible_singleton, CacheStore, CallableSingleton,
    InfallibleCallableSingleton, Locked, LockedMemo, Lookup, MemoStats, MemoStrategy, Memoize,
    NoLock, NoLockMemo, ParseStrategyError, PerThread, PerThreadLocked, PerThreadLockedMemo,
    PerThreadMemo, StoreFor, Strategy,
};
pub use params::{merge, WithDefaults};
pub use provider::{Callable, FixedObject, InfallibleCallable, ParamsFn, Provider, ProviderExt};
