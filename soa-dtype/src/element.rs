use std::fmt::Debug;

use crate::PackedUInt;

/// A type that can be stored in a column.
///
/// Column values are plain data: they are copied in and out of the store bit for bit, moved
/// between allocations on resize and projection, and new rows start out with every byte set to
/// zero.
///
/// # Safety
///
/// Implementors must guarantee that a value whose bytes are all zero is a valid value of the
/// type. For composite types this all-zero value is the type's zero row, e.g. a `#[repr(C)]`
/// struct of integers and `bool`s whose fields are all `0` / `false`.
///
/// The alignment of an implementor may be at most 32 KiB (`#[repr(align(32768))]`). Building a
/// [`ColumnDescriptor`](crate::ColumnDescriptor) for a more strictly aligned type is rejected at
/// compile time.
pub unsafe trait ColumnElement: Copy + Debug + Send + Sync + 'static {
    /// The value whose bytes are all zero.
    #[inline]
    fn zeroed() -> Self {
        // SAFETY: the all-zero bit pattern is valid by the trait's contract.
        unsafe { std::mem::zeroed() }
    }
}

macro_rules! column_element {
    ($($T:ty),+ $(,)?) => {
        $(
            // SAFETY: zero is a valid value for every primitive numeric type, `false`, `'\0'` and `()`.
            unsafe impl ColumnElement for $T {}
        )+
    };
}

column_element!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, ()
);

// SAFETY: an array of all-zero elements is all-zero.
unsafe impl<T: ColumnElement, const N: usize> ColumnElement for [T; N] {}

// SAFETY: a packed integer is a plain byte array; all-zero decodes to 0.
unsafe impl<const N: usize> ColumnElement for PackedUInt<N> {}

#[cfg(test)]
mod test {
    use crate::{ColumnElement, PackedUInt};

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Flagged {
        value: u64,
        flag: bool,
    }

    unsafe impl ColumnElement for Flagged {}

    #[test]
    fn zeroed_values() {
        assert_eq!(u64::zeroed(), 0);
        assert!(!bool::zeroed());
        assert_eq!(<[u8; 3]>::zeroed(), [0, 0, 0]);
        assert_eq!(PackedUInt::<5>::zeroed().get(), 0);
        assert_eq!(
            Flagged::zeroed(),
            Flagged {
                value: 0,
                flag: false
            }
        );
    }
}
