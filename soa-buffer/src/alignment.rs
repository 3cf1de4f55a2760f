use std::fmt::Display;
use std::ops::Deref;

use soa_error::{SoaResult, soa_bail};

/// The alignment of a buffer or of a column's element type.
///
/// This type is a wrapper around `usize` that ensures the alignment is a power of 2 and fits into
/// a `u16`.
#[derive(Clone, Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alignment(usize);

impl Alignment {
    /// Create a new alignment.
    ///
    /// ## Panics
    ///
    /// Panics if `align` is not a power of 2, or is greater than `u16::MAX`.
    #[inline]
    pub const fn new(align: usize) -> Self {
        assert!(align > 0, "Alignment must be greater than 0");
        assert!(align <= u16::MAX as usize, "Alignment must fit into u16");
        assert!(align.is_power_of_two(), "Alignment must be a power of 2");
        Self(align)
    }

    /// Create a new alignment, returning an error instead of panicking on invalid input.
    pub fn try_new(align: usize) -> SoaResult<Self> {
        if align == 0 || align > u16::MAX as usize || !align.is_power_of_two() {
            soa_bail!("Alignment {align} must be a power of 2 no greater than {}", u16::MAX);
        }
        Ok(Self(align))
    }

    /// Create an alignment from the alignment of a type `T`.
    ///
    /// ## Example
    ///
    /// ```
    /// use soa_buffer::Alignment;
    ///
    /// assert_eq!(Alignment::new(4), Alignment::of::<i32>());
    /// assert_eq!(Alignment::new(8), Alignment::of::<i64>());
    /// assert_eq!(Alignment::new(1), Alignment::of::<[u8; 3]>());
    /// ```
    #[inline]
    pub const fn of<T>() -> Self {
        Self::new(align_of::<T>())
    }

    /// Check if this alignment is a "larger" than another alignment.
    ///
    /// ## Example
    ///
    /// ```
    /// use soa_buffer::Alignment;
    ///
    /// let a = Alignment::new(4);
    /// let b = Alignment::new(2);
    /// assert!(a.is_aligned_to(b));
    /// assert!(!b.is_aligned_to(a));
    /// ```
    #[inline]
    pub fn is_aligned_to(&self, other: Alignment) -> bool {
        // Since we know alignments are powers of 2, we can compare them by checking if the number
        // of trailing zeros in the binary representation of the alignment is greater or equal.
        self.0.trailing_zeros() >= other.0.trailing_zeros()
    }

    /// Whether `offset` is a multiple of this alignment.
    #[inline]
    pub fn divides(&self, offset: usize) -> bool {
        offset & (self.0 - 1) == 0
    }

    /// Round `offset` up to the next multiple of this alignment, returning `None` on overflow.
    ///
    /// ## Example
    ///
    /// ```
    /// use soa_buffer::Alignment;
    ///
    /// let a = Alignment::new(8);
    /// assert_eq!(a.round_up(0), Some(0));
    /// assert_eq!(a.round_up(13), Some(16));
    /// assert_eq!(a.round_up(16), Some(16));
    /// assert_eq!(a.round_up(usize::MAX), None);
    /// ```
    #[inline]
    pub fn round_up(&self, offset: usize) -> Option<usize> {
        offset
            .checked_add(self.0 - 1)
            .map(|padded| padded & !(self.0 - 1))
    }

    /// The larger of two alignments.
    #[inline]
    pub fn max(self, other: Alignment) -> Alignment {
        if self.is_aligned_to(other) {
            self
        } else {
            other
        }
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Alignment {
    type Target = usize;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Alignment> for usize {
    #[inline]
    fn from(value: Alignment) -> Self {
        value.0
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;

    #[test]
    #[should_panic]
    fn alignment_zero() {
        Alignment::new(0);
    }

    #[test]
    #[should_panic]
    fn alignment_overflow() {
        Alignment::new(u16::MAX as usize + 1);
    }

    #[test]
    #[should_panic]
    fn alignment_not_power_of_two() {
        Alignment::new(3);
    }

    #[test]
    fn try_new_rejects_invalid() {
        assert!(Alignment::try_new(0).is_err());
        assert!(Alignment::try_new(48).is_err());
        assert_eq!(Alignment::try_new(64).unwrap(), Alignment::new(64));
    }

    #[rstest]
    #[case(1, 0, 0)]
    #[case(1, 7, 7)]
    #[case(4, 1, 4)]
    #[case(4, 8, 8)]
    #[case(64, 65, 128)]
    fn round_up(#[case] align: usize, #[case] offset: usize, #[case] expected: usize) {
        let alignment = Alignment::new(align);
        assert_eq!(alignment.round_up(offset), Some(expected));
        assert!(alignment.divides(expected));
    }

    #[test]
    fn max_alignment() {
        assert_eq!(Alignment::new(8).max(Alignment::new(64)), Alignment::new(64));
        assert_eq!(Alignment::new(64).max(Alignment::new(8)), Alignment::new(64));
    }
}
