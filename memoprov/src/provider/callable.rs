//! Function adapters.
//!
//! [`Callable`] and [`InfallibleCallable`] turn an ordinary function or
//! closure into a [`Provider`]. The parameter tuple is spread into positional
//! arguments, so a closure `|a: i32, b: i32| ...` serves a provider whose
//! `Params` is `(i32, i32)`.
//!
//! The parameter type cannot be recovered from a closure type, so it is
//! usually named at construction: `Callable::<_, (i32, i32)>::new(f)`.

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use super::types::Provider;

/// A function callable with a positional parameter tuple.
///
/// Implemented for every `Fn` of arity 0 through 8, with `P` being the tuple
/// of its argument types.
pub trait ParamsFn<P> {
    /// Return type of the function.
    type Output;

    /// Call the function with the tuple spread into arguments.
    fn call_with(&self, params: P) -> Self::Output;
}

macro_rules! impl_params_fn {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg),*> ParamsFn<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn call_with(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self)($($arg),*)
            }
        }
    };
}

impl_params_fn!();
impl_params_fn!(A);
impl_params_fn!(A, B);
impl_params_fn!(A, B, C);
impl_params_fn!(A, B, C, D);
impl_params_fn!(A, B, C, D, E);
impl_params_fn!(A, B, C, D, E, F);
impl_params_fn!(A, B, C, D, E, F, G);
impl_params_fn!(A, B, C, D, E, F, G, H);

/// Provider forwarding to a function returning `Result<R, E>`.
///
/// No caching: every invocation calls the function.
///
/// ```
/// use memoprov::{Callable, Provider};
///
/// let parse = Callable::<_, (&str,)>::new(|s: &str| s.parse::<u32>());
/// assert_eq!(parse.invoke(("42",)), Ok(42));
/// assert!(parse.invoke(("x",)).is_err());
/// ```
pub struct Callable<F, P> {
    func: F,
    _params: PhantomData<fn(P)>,
}

impl<F, P> Callable<F, P> {
    /// Wrap `func` as a provider.
    pub fn new(func: F) -> Self {
        Self {
            func,
            _params: PhantomData,
        }
    }

    /// Get the wrapped function.
    pub fn func(&self) -> &F {
        &self.func
    }
}

impl<F: Clone, P> Clone for Callable<F, P> {
    fn clone(&self) -> Self {
        Self::new(self.func.clone())
    }
}

impl<F, P> fmt::Debug for Callable<F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("params", &std::any::type_name::<P>())
            .finish_non_exhaustive()
    }
}

impl<F, P, R, E> Provider for Callable<F, P>
where
    F: ParamsFn<P, Output = Result<R, E>>,
{
    type Params = P;
    type Output = R;
    type Error = E;

    fn produce(&self, params: P) -> Result<R, E> {
        self.func.call_with(params)
    }
}

/// Provider forwarding to a function that cannot fail.
///
/// The function's return value is the provider output; the error type is
/// [`Infallible`].
///
/// ```
/// use memoprov::{InfallibleCallable, Provider};
///
/// let add = InfallibleCallable::<_, (i32, i32)>::new(|a: i32, b: i32| a + b);
/// assert_eq!(add.invoke((2, 5)), Ok(7));
/// ```
pub struct InfallibleCallable<F, P> {
    func: F,
    _params: PhantomData<fn(P)>,
}

impl<F, P> InfallibleCallable<F, P> {
    /// Wrap `func` as a provider.
    pub fn new(func: F) -> Self {
        Self {
            func,
            _params: PhantomData,
        }
    }

    /// Get the wrapped function.
    pub fn func(&self) -> &F {
        &self.func
    }
}

impl<F: Clone, P> Clone for InfallibleCallable<F, P> {
    fn clone(&self) -> Self {
        Self::new(self.func.clone())
    }
}

impl<F, P> fmt::Debug for InfallibleCallable<F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfallibleCallable")
            .field("params", &std::any::type_name::<P>())
            .finish_non_exhaustive()
    }
}

impl<F, P> Provider for InfallibleCallable<F, P>
where
    F: ParamsFn<P>,
{
    type Params = P;
    type Output = <F as ParamsFn<P>>::Output;
    type Error = Infallible;

    fn produce(&self, params: P) -> Result<Self::Output, Infallible> {
        Ok(self.func.call_with(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callable_forwards_arguments() {
        let add = InfallibleCallable::<_, (i32, i32)>::new(|a: i32, b: i32| a + b);
        assert_eq!(add.invoke((2, 5)), Ok(7));
    }

    #[test]
    fn test_callable_calls_function_every_time() {
        let calls = AtomicUsize::new(0);
        let add = InfallibleCallable::<_, (i32, i32)>::new(|a: i32, b: i32| {
            calls.fetch_add(1, Ordering::SeqCst);
            a + b
        });

        assert_eq!(add.invoke((2, 5)), Ok(7));
        assert_eq!(add.invoke((2, 5)), Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fallible_callable_propagates_error() {
        let checked = Callable::<_, (u8, u8)>::new(|a: u8, b: u8| a.checked_add(b).ok_or("overflow"));

        assert_eq!(checked.invoke((200, 50)), Ok(250));
        assert_eq!(checked.invoke((200, 100)), Err("overflow"));
    }

    #[test]
    fn test_zero_arity_callable() {
        let answer = InfallibleCallable::<_, ()>::new(|| 42);
        assert_eq!(answer.invoke(()), Ok(42));
    }

    #[test]
    fn test_high_arity_callable() {
        let sum = InfallibleCallable::<_, (u8, u16, u32, u64, i8, i16, i32, i64)>::new(
            |a: u8, b: u16, c: u32, d: u64, e: i8, f: i16, g: i32, h: i64| {
                a as i64 + b as i64 + c as i64 + d as i64 + e as i64 + f as i64 + g as i64 + h
            },
        );
        assert_eq!(sum.invoke((1, 2, 3, 4, 5, 6, 7, 8)), Ok(36));
    }

    #[test]
    fn test_reference_flavor_forwards_handle() {
        let shared = Arc::new(vec![1, 2, 3]);
        let handle = Arc::clone(&shared);
        let provider = InfallibleCallable::<_, ()>::new(move || Arc::clone(&handle));

        let returned = provider.invoke(()).unwrap();
        assert!(Arc::ptr_eq(&returned, &shared));
    }

    #[test]
    fn test_named_function_as_callable() {
        fn describe(name: &str, level: u8) -> String {
            format!("{}:{}", name, level)
        }

        let provider = InfallibleCallable::<_, (&str, u8)>::new(describe);
        assert_eq!(provider.invoke(("level", 16)), Ok("level:16".to_string()));
    }

    #[test]
    fn test_debug_output_names_params() {
        let add = InfallibleCallable::<_, (i32, i32)>::new(|a: i32, b: i32| a + b);
        let debug = format!("{:?}", add);
        assert!(debug.contains("InfallibleCallable"));
        assert!(debug.contains("i32"));
    }
}
