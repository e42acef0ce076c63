//! Parameter records and the defaults merge.
//!
//! Every logical parameter list has two shapes:
//!
//! - **Regular**: every field carries a concrete value. Used as the complete
//!   default set and, once converted to a tuple, as the cache key.
//! - **WithDefaults**: every field is optional. Represents a caller-supplied
//!   partial override.
//!
//! The two shapes are tied together by [`WithDefaults::Regular`], so a merge
//! between records of different field sets does not type-check.
//!
//! Records can be hand-written, generated with [`define_params!`](crate::define_params),
//! or expressed as plain tuples: `(Option<A>, Option<B>)` is the
//! WithDefaults shape of `(A, B)`.
//!
//! ```
//! use memoprov::params::merge;
//!
//! let defaults = (3, 2.1);
//! let overrides = (Some(2), None);
//! assert_eq!(merge(overrides, defaults), (2, 2.1));
//! ```

mod macros;

/// A partially specified parameter record.
///
/// Implementors enumerate the same ordered field set as [`Self::Regular`],
/// with each field optionally absent.
pub trait WithDefaults {
    /// The fully specified record with the same field set.
    type Regular;

    /// Fill every absent field from `fallback`.
    ///
    /// Present fields win; absent fields take the fallback's value. Fields
    /// are independent of each other.
    fn merge(self, fallback: Self::Regular) -> Self::Regular;
}

/// Combine a partial override with a complete set of defaults.
///
/// For each field in declaration order, the result takes `main`'s value when
/// present and `fallback`'s value otherwise. Pure and uncached.
pub fn merge<O: WithDefaults>(main: O, fallback: O::Regular) -> O::Regular {
    main.merge(fallback)
}

impl WithDefaults for () {
    type Regular = ();

    fn merge(self, _fallback: ()) {}
}

macro_rules! impl_tuple_defaults {
    ($($name:ident $idx:tt),+) => {
        impl<$($name),+> WithDefaults for ($(Option<$name>,)+) {
            type Regular = ($($name,)+);

            fn merge(self, fallback: Self::Regular) -> Self::Regular {
                ($(
                    match self.$idx {
                        Some(value) => value,
                        None => fallback.$idx,
                    },
                )+)
            }
        }
    };
}

impl_tuple_defaults!(A 0);
impl_tuple_defaults!(A 0, B 1);
impl_tuple_defaults!(A 0, B 1, C 2);
impl_tuple_defaults!(A 0, B 1, C 2, D 3);
impl_tuple_defaults!(A 0, B 1, C 2, D 3, E 4);
impl_tuple_defaults!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_tuple_defaults!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_tuple_defaults!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_params! {
        /// Test record.
        #[derive(Debug, Clone, PartialEq)]
        pub struct Point / PointOverrides {
            pub x: i32,
            pub y: f64,
        }
    }

    #[test]
    fn test_merge_takes_present_fields() {
        let defaults = Point { x: 3, y: 2.1 };
        let overrides = PointOverrides {
            x: Some(2),
            y: None,
        };

        assert_eq!(merge(overrides, defaults), Point { x: 2, y: 2.1 });
    }

    #[test]
    fn test_merge_all_absent_returns_fallback() {
        let defaults = Point { x: 3, y: 2.1 };
        assert_eq!(merge(PointOverrides::default(), defaults.clone()), defaults);
    }

    #[test]
    fn test_merge_all_present_ignores_fallback() {
        let overrides = PointOverrides::default().x(-1).y(0.5);
        assert_eq!(
            merge(overrides, Point { x: 3, y: 2.1 }),
            Point { x: -1, y: 0.5 }
        );
    }

    #[test]
    fn test_merge_is_repeatable() {
        let overrides = PointOverrides::default().y(9.0);
        let first = merge(overrides.clone(), Point { x: 1, y: 1.0 });
        let second = merge(overrides, Point { x: 1, y: 1.0 });
        assert_eq!(first, second);
    }

    #[test]
    fn test_tuple_merge() {
        assert_eq!(merge((Some(2), None::<f64>), (3, 2.1)), (2, 2.1));
        assert_eq!(merge((None::<&str>,), ("fallback",)), ("fallback",));
        assert_eq!(
            merge(
                (None, Some('b'), None, Some(4u8)),
                (1, 'a', String::from("c"), 0u8)
            ),
            (1, 'b', String::from("c"), 4u8)
        );
    }

    #[test]
    fn test_unit_merge() {
        merge((), ());
    }

    #[test]
    fn test_regular_converts_to_tuple() {
        let tuple: (i32, f64) = Point { x: 7, y: 0.25 }.into();
        assert_eq!(tuple, (7, 0.25));

        let point = Point::from((1, 2.0));
        assert_eq!(point, Point { x: 1, y: 2.0 });
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_merge_field_by_field(
                dx in any::<i32>(),
                dy in -1.0e6..1.0e6_f64,
                ox in proptest::option::of(any::<i32>()),
                oy in proptest::option::of(-1.0e6..1.0e6_f64),
            ) {
                let merged = merge(
                    PointOverrides { x: ox, y: oy },
                    Point { x: dx, y: dy },
                );

                prop_assert_eq!(merged.x, ox.unwrap_or(dx));
                prop_assert_eq!(merged.y, oy.unwrap_or(dy));
            }

            #[test]
            fn test_tuple_and_struct_merge_agree(
                dx in any::<i32>(),
                dy in -1.0e6..1.0e6_f64,
                ox in proptest::option::of(any::<i32>()),
                oy in proptest::option::of(-1.0e6..1.0e6_f64),
            ) {
                let from_struct: (i32, f64) =
                    merge(PointOverrides { x: ox, y: oy }, Point { x: dx, y: dy }).into();
                let from_tuple = merge((ox, oy), (dx, dy));

                prop_assert_eq!(from_struct, from_tuple);
            }
        }
    }
}
