//! Core provider trait.

use std::sync::Arc;

use crate::memo::{Memoize, StoreFor};

/// A typed factory producing `Output` from a positional `Params` tuple.
///
/// Only [`produce`](Provider::produce) must be implemented. The provider
/// itself adds no error handling: whatever `produce` returns is what the
/// caller sees.
///
/// # Dyn Compatibility
///
/// The trait can be used as `Arc<dyn Provider<Params = P, Output = R, Error = E>>`.
/// [`invoke_with`](Provider::invoke_with) is unavailable on trait objects since
/// it is generic over the source record.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use memoprov::Provider;
///
/// struct Greeter;
///
/// impl Provider for Greeter {
///     type Params = (String,);
///     type Output = String;
///     type Error = Infallible;
///
///     fn produce(&self, (name,): (String,)) -> Result<String, Infallible> {
///         Ok(format!("hello {}", name))
///     }
/// }
///
/// assert_eq!(Greeter.invoke(("ada".to_string(),)).unwrap(), "hello ada");
/// ```
pub trait Provider {
    /// Positional parameter tuple identifying one invocation.
    type Params;

    /// Produced result; an owned value or a shared handle.
    type Output;

    /// Failure raised by `produce`.
    type Error;

    /// Compute the result for `params`.
    fn produce(&self, params: Self::Params) -> Result<Self::Output, Self::Error>;

    /// Invoke the provider with a positional parameter tuple.
    fn invoke(&self, params: Self::Params) -> Result<Self::Output, Self::Error> {
        self.produce(params)
    }

    /// Invoke the provider with a record exposing the same ordered field set.
    ///
    /// Equivalent to unpacking the record's fields in order and calling
    /// [`invoke`](Provider::invoke).
    fn invoke_with<S>(&self, record: S) -> Result<Self::Output, Self::Error>
    where
        S: Into<Self::Params>,
        Self: Sized,
    {
        self.invoke(record.into())
    }
}

impl<P: Provider + ?Sized> Provider for &P {
    type Params = P::Params;
    type Output = P::Output;
    type Error = P::Error;

    fn produce(&self, params: Self::Params) -> Result<Self::Output, Self::Error> {
        (**self).produce(params)
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    type Params = P::Params;
    type Output = P::Output;
    type Error = P::Error;

    fn produce(&self, params: Self::Params) -> Result<Self::Output, Self::Error> {
        (**self).produce(params)
    }
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    type Params = P::Params;
    type Output = P::Output;
    type Error = P::Error;

    fn produce(&self, params: Self::Params) -> Result<Self::Output, Self::Error> {
        (**self).produce(params)
    }
}

/// Composition helpers available on every sized provider.
pub trait ProviderExt: Provider + Sized {
    /// Wrap this provider in a memoizing decorator using strategy `S`.
    ///
    /// ```
    /// use std::convert::Infallible;
    /// use memoprov::{InfallibleCallable, PerThread, Provider, ProviderExt};
    ///
    /// let square = InfallibleCallable::<_, (u64,)>::new(|n: u64| n * n).memoize::<PerThread>();
    /// let result: Result<u64, Infallible> = square.invoke((12,));
    /// assert_eq!(result, Ok(144));
    /// ```
    fn memoize<S>(self) -> Memoize<Self, S>
    where
        S: StoreFor<Self::Params, Self::Output>,
        Self::Params: Eq + std::hash::Hash + Clone,
        Self::Output: Clone,
    {
        Memoize::new(self)
    }
}

impl<P: Provider> ProviderExt for P {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// Provider summing its two parameters.
    struct Adder;

    impl Provider for Adder {
        type Params = (i32, i32);
        type Output = i32;
        type Error = Infallible;

        fn produce(&self, (a, b): (i32, i32)) -> Result<i32, Infallible> {
            Ok(a + b)
        }
    }

    /// Provider rejecting negative input.
    struct NonNegative;

    impl Provider for NonNegative {
        type Params = (i64,);
        type Output = u64;
        type Error = String;

        fn produce(&self, (n,): (i64,)) -> Result<u64, String> {
            u64::try_from(n).map_err(|_| format!("negative input: {}", n))
        }
    }

    struct Pair {
        left: i32,
        right: i32,
    }

    impl From<Pair> for (i32, i32) {
        fn from(pair: Pair) -> Self {
            (pair.left, pair.right)
        }
    }

    #[test]
    fn test_invoke_delegates_to_produce() {
        assert_eq!(Adder.invoke((2, 5)), Ok(7));
    }

    #[test]
    fn test_invoke_with_unpacks_record() {
        let pair = Pair { left: 2, right: 5 };
        assert_eq!(Adder.invoke_with(pair), Ok(7));
    }

    #[test]
    fn test_invoke_with_matches_manual_unpacking() {
        let manual = Adder.invoke((10, -4));
        let record = Adder.invoke_with(Pair {
            left: 10,
            right: -4,
        });
        assert_eq!(manual, record);
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        assert_eq!(NonNegative.invoke((4,)), Ok(4));
        assert_eq!(
            NonNegative.invoke((-3,)),
            Err("negative input: -3".to_string())
        );
    }

    #[test]
    fn test_reference_and_smart_pointer_providers() {
        let by_ref = &Adder;
        assert_eq!(by_ref.invoke((1, 1)), Ok(2));

        let boxed: Box<dyn Provider<Params = (i32, i32), Output = i32, Error = Infallible>> =
            Box::new(Adder);
        assert_eq!(boxed.invoke((3, 4)), Ok(7));

        let shared: Arc<dyn Provider<Params = (i32, i32), Output = i32, Error = Infallible>> =
            Arc::new(Adder);
        assert_eq!(shared.invoke((5, 6)), Ok(11));
    }
}
