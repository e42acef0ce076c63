//! Provider abstraction
//!
//! A provider is a factory invoked with a fixed parameter tuple. Concrete
//! variants implement only [`Provider::produce`]; callers go through
//! [`Provider::invoke`] or [`Provider::invoke_with`].
//!
//! # Available Providers
//!
//! - [`Callable`]: forwards parameters to a fallible function
//! - [`InfallibleCallable`]: forwards parameters to a plain function
//! - [`FixedObject`]: zero-parameter provider returning a constant
//!
//! Memoizing decorators live in [`crate::memo`] and are themselves providers.
//!
//! # Value and Reference Flavors
//!
//! The flavor is carried by the `Output` type alone. A provider returning `T`
//! hands out owned values; one returning `Arc<T>` or `&'a T` hands out handles
//! to state whose lifetime is independent of the call. Both flavors can be
//! memoized; borrowed handles and keys under `NoLock` or `Locked` only, since
//! the per-thread strategies need `'static` types.

mod callable;
mod fixed;
mod types;

pub use callable::{Callable, InfallibleCallable, ParamsFn};
pub use fixed::FixedObject;
pub use types::{Provider, ProviderExt};
