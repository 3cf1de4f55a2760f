use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use soa_error::{SoaResult, soa_bail};
use static_assertions::{assert_eq_align, assert_eq_size};

/// An unsigned integer stored in exactly `N` little-endian bytes, `1 <= N <= 8`.
///
/// The type exists to shrink a column's footprint when its values are known to fit in fewer than
/// eight bytes. It has an alignment of 1, so a column of `PackedUInt<3>` occupies exactly three
/// bytes per row.
///
/// Construction from a native integer keeps the low `8 * N` bits and silently discards the rest.
/// Use [`PackedUInt::try_new`] to reject values that do not fit instead.
///
/// Values compare and add by their decoded numeric value, promoted to `u64`, regardless of width:
/// `PackedUInt::<3>::new(5) == PackedUInt::<7>::new(5)`. Comparisons against signed native
/// integers use the signed value, so every packed value is greater than any negative integer.
/// Addition does not wrap at the packed width; it yields a `u64`. Overflowing `u64` follows the
/// rules of native `u64` addition: it panics in debug builds and wraps in release builds.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct PackedUInt<const N: usize>([u8; N]);

assert_eq_size!(PackedUInt<3>, [u8; 3]);
assert_eq_size!(PackedUInt<7>, [u8; 7]);
assert_eq_align!(PackedUInt<5>, u8);

impl<const N: usize> PackedUInt<N> {
    /// The width of the value in bytes.
    pub const WIDTH: usize = {
        assert!(N > 0, "PackedUInt must be at least 1 byte wide");
        assert!(N <= 8, "PackedUInt must be at most 8 bytes wide");
        N
    };

    /// The largest value representable in `N` bytes.
    pub const MAX: u64 = if Self::WIDTH == 8 {
        u64::MAX
    } else {
        (1u64 << (8 * Self::WIDTH)) - 1
    };

    /// Pack the low `8 * N` bits of `value`.
    #[inline]
    pub const fn new(value: u64) -> Self {
        let width = Self::WIDTH;
        let le = value.to_le_bytes();
        let mut bytes = [0u8; N];
        let mut i = 0;
        while i < width {
            bytes[i] = le[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Pack `value`, failing if it does not fit into `N` bytes.
    pub fn try_new(value: u64) -> SoaResult<Self> {
        if value > Self::MAX {
            soa_bail!(TruncationOverflow: value, N);
        }
        Ok(Self::new(value))
    }

    /// Decode the value. The high `8 - N` bytes of the result are zero.
    #[inline]
    pub const fn get(&self) -> u64 {
        let width = Self::WIDTH;
        let mut le = [0u8; 8];
        let mut i = 0;
        while i < width {
            le[i] = self.0[i];
            i += 1;
        }
        u64::from_le_bytes(le)
    }

    /// Re-pack the value into a different width, truncating if the target is narrower.
    #[inline]
    pub const fn repack<const M: usize>(self) -> PackedUInt<M> {
        PackedUInt::<M>::new(self.get())
    }

    /// Construct a value from its raw little-endian bytes.
    #[inline]
    pub const fn from_le_bytes(bytes: [u8; N]) -> Self {
        let _ = Self::WIDTH;
        Self(bytes)
    }

    /// The raw little-endian bytes of the value.
    #[inline]
    pub const fn to_le_bytes(self) -> [u8; N] {
        self.0
    }
}

impl<const N: usize> Default for PackedUInt<N> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<const N: usize> Display for PackedUInt<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.get(), f)
    }
}

impl<const N: usize> Debug for PackedUInt<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.get(), f)
    }
}

impl<const N: usize> Hash for PackedUInt<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}

impl<const N: usize> From<PackedUInt<N>> for u64 {
    #[inline]
    fn from(value: PackedUInt<N>) -> Self {
        value.get()
    }
}

impl<const N: usize, const M: usize> PartialEq<PackedUInt<M>> for PackedUInt<N> {
    #[inline]
    fn eq(&self, other: &PackedUInt<M>) -> bool {
        self.get() == other.get()
    }
}

impl<const N: usize> Eq for PackedUInt<N> {}

impl<const N: usize, const M: usize> PartialOrd<PackedUInt<M>> for PackedUInt<N> {
    #[inline]
    fn partial_cmp(&self, other: &PackedUInt<M>) -> Option<Ordering> {
        Some(self.get().cmp(&other.get()))
    }
}

impl<const N: usize> Ord for PackedUInt<N> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

macro_rules! unsigned_interop {
    ($($T:ty),+) => {
        $(
            impl<const N: usize> From<$T> for PackedUInt<N> {
                /// Packs the low `8 * N` bits of the value.
                #[inline]
                fn from(value: $T) -> Self {
                    Self::new(value as u64)
                }
            }

            impl<const N: usize> PartialEq<$T> for PackedUInt<N> {
                #[inline]
                fn eq(&self, other: &$T) -> bool {
                    self.get() == *other as u64
                }
            }

            impl<const N: usize> PartialEq<PackedUInt<N>> for $T {
                #[inline]
                fn eq(&self, other: &PackedUInt<N>) -> bool {
                    *self as u64 == other.get()
                }
            }

            impl<const N: usize> PartialOrd<$T> for PackedUInt<N> {
                #[inline]
                fn partial_cmp(&self, other: &$T) -> Option<Ordering> {
                    Some(self.get().cmp(&(*other as u64)))
                }
            }

            impl<const N: usize> PartialOrd<PackedUInt<N>> for $T {
                #[inline]
                fn partial_cmp(&self, other: &PackedUInt<N>) -> Option<Ordering> {
                    Some((*self as u64).cmp(&other.get()))
                }
            }
        )+
    };
}

unsigned_interop!(u8, u16, u32, u64, usize);

macro_rules! signed_interop {
    ($($T:ty),+) => {
        $(
            impl<const N: usize> PartialEq<$T> for PackedUInt<N> {
                #[inline]
                fn eq(&self, other: &$T) -> bool {
                    u64::try_from(*other).is_ok_and(|other| self.get() == other)
                }
            }

            impl<const N: usize> PartialEq<PackedUInt<N>> for $T {
                #[inline]
                fn eq(&self, other: &PackedUInt<N>) -> bool {
                    other == self
                }
            }

            impl<const N: usize> PartialOrd<$T> for PackedUInt<N> {
                #[inline]
                fn partial_cmp(&self, other: &$T) -> Option<Ordering> {
                    Some(match u64::try_from(*other) {
                        Ok(other) => self.get().cmp(&other),
                        Err(_) => Ordering::Greater,
                    })
                }
            }

            impl<const N: usize> PartialOrd<PackedUInt<N>> for $T {
                #[inline]
                fn partial_cmp(&self, other: &PackedUInt<N>) -> Option<Ordering> {
                    other.partial_cmp(self).map(Ordering::reverse)
                }
            }
        )+
    };
}

signed_interop!(i8, i16, i32, i64, isize);

impl<const N: usize, const M: usize> Add<PackedUInt<M>> for PackedUInt<N> {
    type Output = u64;

    #[inline]
    fn add(self, rhs: PackedUInt<M>) -> u64 {
        self.get() + rhs.get()
    }
}

impl<const N: usize> Add<u64> for PackedUInt<N> {
    type Output = u64;

    #[inline]
    fn add(self, rhs: u64) -> u64 {
        self.get() + rhs
    }
}

impl<const N: usize> Add<PackedUInt<N>> for u64 {
    type Output = u64;

    #[inline]
    fn add(self, rhs: PackedUInt<N>) -> u64 {
        self + rhs.get()
    }
}

impl<const N: usize> AddAssign<PackedUInt<N>> for u64 {
    #[inline]
    fn add_assign(&mut self, rhs: PackedUInt<N>) {
        *self += rhs.get();
    }
}

impl<const N: usize> AddAssign<&PackedUInt<N>> for u64 {
    #[inline]
    fn add_assign(&mut self, rhs: &PackedUInt<N>) {
        *self += rhs.get();
    }
}

impl<const N: usize> Sum<PackedUInt<N>> for u64 {
    fn sum<I: Iterator<Item = PackedUInt<N>>>(iter: I) -> Self {
        iter.map(|v| v.get()).sum()
    }
}

impl<'a, const N: usize> Sum<&'a PackedUInt<N>> for u64 {
    fn sum<I: Iterator<Item = &'a PackedUInt<N>>>(iter: I) -> Self {
        iter.map(|v| v.get()).sum()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use rstest::rstest;

    use crate::PackedUInt;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(0xFF)]
    #[case(0x1234_5678)]
    #[case(u64::MAX)]
    fn truncation_law(#[case] value: u64) {
        assert_eq!(PackedUInt::<1>::new(value).get(), value % (1 << 8));
        assert_eq!(PackedUInt::<2>::new(value).get(), value % (1 << 16));
        assert_eq!(PackedUInt::<3>::new(value).get(), value % (1 << 24));
        assert_eq!(PackedUInt::<5>::new(value).get(), value % (1 << 40));
        assert_eq!(PackedUInt::<7>::new(value).get(), value % (1 << 56));
        assert_eq!(PackedUInt::<8>::new(value).get(), value);
    }

    #[test]
    fn in_range_values_are_exact() {
        assert_eq!(PackedUInt::<3>::new(0xAB_CDEF).get(), 0xAB_CDEF);
        assert_eq!(PackedUInt::<6>::new(PackedUInt::<6>::MAX).get(), (1 << 48) - 1);
    }

    #[test]
    fn max_values() {
        assert_eq!(PackedUInt::<1>::MAX, 255);
        assert_eq!(PackedUInt::<4>::MAX, u64::from(u32::MAX));
        assert_eq!(PackedUInt::<8>::MAX, u64::MAX);
    }

    #[test]
    fn checked_construction() {
        assert_eq!(PackedUInt::<2>::try_new(65_535).unwrap().get(), 65_535);
        let err = PackedUInt::<2>::try_new(65_536).unwrap_err();
        assert!(err.to_string().starts_with("value 65536 does not fit in 2 bytes"));
    }

    #[test]
    fn little_endian_layout() {
        let packed = PackedUInt::<3>::new(0x0102_0304);
        assert_eq!(packed.to_le_bytes(), [0x04, 0x03, 0x02]);
        assert_eq!(PackedUInt::<3>::from_le_bytes([0x04, 0x03, 0x02]).get(), 0x02_0304);
    }

    #[test]
    fn compares_by_value_across_widths() {
        let narrow = PackedUInt::<3>::new(300);
        let wide = PackedUInt::<7>::new(300);
        assert_eq!(narrow, wide);
        assert!(PackedUInt::<1>::new(200) < PackedUInt::<5>::new(300));
        assert!(PackedUInt::<6>::new(1 << 40) > PackedUInt::<2>::new(u64::from(u16::MAX)));
    }

    #[test]
    fn compares_with_native_integers() {
        let packed = PackedUInt::<3>::new(42);
        assert_eq!(packed, 42u8);
        assert_eq!(42u64, packed);
        assert!(packed < 43usize);
        assert!(41u32 < packed);
        assert_eq!(packed, 42i32);
        assert!(packed > -1i64);
        assert!(-1i8 < packed);
        assert_ne!(packed, -42i16);
    }

    #[test]
    fn addition_does_not_wrap_at_width() {
        let a = PackedUInt::<1>::new(200);
        let b = PackedUInt::<1>::new(100);
        assert_eq!(a + b, 300);
        assert_eq!(a + 56u64, 256);
        assert_eq!(1u64 + b, 101);

        let mut total = 0u64;
        total += a;
        total += &b;
        assert_eq!(total, 300);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "attempt to add with overflow")]
    fn addition_overflowing_u64_panics_in_debug() {
        let _ = PackedUInt::<8>::new(u64::MAX) + PackedUInt::<8>::new(1);
    }

    #[test]
    fn sum_values() {
        let values = [PackedUInt::<5>::new(1), PackedUInt::new(2), PackedUInt::new(3)];
        assert_eq!(values.iter().sum::<u64>(), 6);
        assert_eq!(values.into_iter().sum::<u64>(), 6);
    }

    #[test]
    fn repack_truncates() {
        let wide = PackedUInt::<4>::new(0x1_0203);
        assert_eq!(wide.repack::<2>().get(), 0x0203);
        assert_eq!(wide.repack::<8>().get(), 0x1_0203);
    }

    #[test]
    fn hash_matches_equality() {
        let set: HashSet<PackedUInt<3>> = [PackedUInt::new(1), PackedUInt::new(1 + (1 << 24))]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_decoded_value() {
        assert_eq!(PackedUInt::<6>::new(123_456).to_string(), "123456");
        assert_eq!(format!("{:?}", PackedUInt::<2>::new(7)), "7");
    }
}
