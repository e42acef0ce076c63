//! Declarative generation of Regular/WithDefaults record pairs.

/// Define a parameter record and its partial-override counterpart.
///
/// ```
/// use memoprov::define_params;
/// use memoprov::params::merge;
///
/// define_params! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Retry / RetryOverrides {
///         pub attempts: u8,
///         pub backoff: &'static str,
///     }
/// }
///
/// let defaults = Retry { attempts: 3, backoff: "linear" };
/// let merged = merge(RetryOverrides::default().attempts(5), defaults);
/// assert_eq!(merged, Retry { attempts: 5, backoff: "linear" });
///
/// // Regular records convert to the positional tuple accepted by providers.
/// let positional: (u8, &str) = merged.into();
/// assert_eq!(positional, (5, "linear"));
/// ```
///
/// The first struct is the Regular shape and receives the attributes written
/// on it. The second holds the same fields wrapped in `Option` and always
/// derives `Debug`, `Clone`, `Default` and `PartialEq`, so every field type
/// must implement those three non-default traits. Each field gets a
/// same-named chained setter on the override struct.
#[macro_export]
macro_rules! define_params {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident / $overrides:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        #[doc = concat!("Partial overrides for [`", stringify!($name), "`]; absent fields fall back to the defaults.")]
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $overrides {
            $(
                $field_vis $field: ::core::option::Option<$ty>,
            )*
        }

        impl $overrides {
            $(
                #[doc = concat!("Override `", stringify!($field), "`.")]
                #[must_use]
                $field_vis fn $field(mut self, value: $ty) -> Self {
                    self.$field = ::core::option::Option::Some(value);
                    self
                }
            )*
        }

        impl $crate::params::WithDefaults for $overrides {
            type Regular = $name;

            fn merge(self, fallback: $name) -> $name {
                $name {
                    $(
                        $field: match self.$field {
                            ::core::option::Option::Some(value) => value,
                            ::core::option::Option::None => fallback.$field,
                        },
                    )*
                }
            }
        }

        impl ::core::convert::From<$name> for ($($ty,)*) {
            fn from(record: $name) -> Self {
                ($(record.$field,)*)
            }
        }

        impl ::core::convert::From<($($ty,)*)> for $name {
            fn from(tuple: ($($ty,)*)) -> Self {
                let ($($field,)*) = tuple;
                $name { $($field,)* }
            }
        }
    };
}
