/// An additive amount that can be lazily applied to a range of keys.
///
/// [`AvlTree::add_extra`](crate::AvlTree::add_extra) records deltas on a handful
/// of nodes instead of touching every affected element, and the tree later
/// moves them around while rebalancing. Those moves need an identity, a way to
/// combine two deltas, and a way to take one back out again.
///
/// Integer implementations wrap on overflow: compensation terms may leave the
/// representable range transiently even when every observable extra fits.
/// `()` is provided for trees whose values are opaque payloads with no
/// additive structure.
///
/// # Examples
///
/// ```
/// use lazy_avl::Delta;
///
/// assert_eq!(5i32.combine(-3), 2);
/// assert_eq!(5i32.difference(7), -2);
/// assert_eq!(4i64.negate(), -4);
/// assert_eq!(<u8 as Delta>::ZERO, 0);
/// ```
pub trait Delta: Copy {
    /// The delta that changes nothing.
    const ZERO: Self;

    /// Returns `self + other`.
    #[must_use]
    fn combine(self, other: Self) -> Self;

    /// Returns `self - other`.
    #[must_use]
    fn difference(self, other: Self) -> Self;

    /// Returns `-self`.
    #[must_use]
    fn negate(self) -> Self {
        Self::ZERO.difference(self)
    }
}

macro_rules! wrapping_delta {
    ($($t:ty),* $(,)?) => {
        $(
            impl Delta for $t {
                const ZERO: Self = 0;

                #[inline]
                fn combine(self, other: Self) -> Self {
                    self.wrapping_add(other)
                }

                #[inline]
                fn difference(self, other: Self) -> Self {
                    self.wrapping_sub(other)
                }
            }
        )*
    };
}

wrapping_delta!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_delta {
    ($($t:ty),* $(,)?) => {
        $(
            impl Delta for $t {
                const ZERO: Self = 0.0;

                #[inline]
                fn combine(self, other: Self) -> Self {
                    self + other
                }

                #[inline]
                fn difference(self, other: Self) -> Self {
                    self - other
                }
            }
        )*
    };
}

float_delta!(f32, f64);

impl Delta for () {
    const ZERO: Self = ();

    #[inline]
    fn combine(self, (): Self) -> Self {}

    #[inline]
    fn difference(self, (): Self) -> Self {}
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unit_delta_is_trivial() {
        let () = ().combine(());
        let () = ().negate();
        let () = <() as Delta>::ZERO.difference(());
    }

    #[test]
    fn float_delta() {
        assert!((1.5f64.combine(2.0) - 3.5).abs() < f64::EPSILON);
        assert!((1.5f32.negate() + 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn unsigned_delta_wraps() {
        let shift = 3u32.negate();
        assert_eq!(10u32.combine(shift), 7);
    }

    proptest! {
        #[test]
        fn difference_undoes_combine(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(a.combine(b).difference(b), a);
            prop_assert_eq!(a.combine(b.negate()), a.difference(b));
        }
    }
}
