//! Constant provider.

use std::convert::Infallible;
use std::sync::Arc;

use super::types::Provider;

/// Zero-parameter provider returning a value fixed at construction.
///
/// Represents an already constructed dependency. Each invocation returns a
/// clone of the stored value, so the flavor follows `T`:
///
/// - `FixedObject<T>` hands out copies (value flavor)
/// - `FixedObject<Arc<T>>` and `FixedObject<&'a T>` hand out handles to the
///   same underlying state (reference flavor)
///
/// ```
/// use std::sync::Arc;
/// use memoprov::{FixedObject, Provider};
///
/// let config = FixedObject::shared(vec!["primary", "fallback"]);
/// let a = config.invoke(()).unwrap();
/// let b = config.invoke(()).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedObject<T> {
    value: T,
}

impl<T> FixedObject<T> {
    /// Create a provider that always returns `value`.
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Get the stored value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Consume the provider and return the stored value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> FixedObject<Arc<T>> {
    /// Create a reference-flavor provider sharing one allocation of `value`.
    pub fn shared(value: T) -> Self {
        Self::new(Arc::new(value))
    }
}

impl<T: Clone> Provider for FixedObject<T> {
    type Params = ();
    type Output = T;
    type Error = Infallible;

    fn produce(&self, _params: ()) -> Result<T, Infallible> {
        Ok(self.value.clone())
    }
}
