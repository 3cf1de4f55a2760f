use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};

use itertools::Itertools;
use soa_dtype::{ColumnDescriptor, ColumnElement};

mod sealed {
    pub trait Sealed {}
}

/// An ordered set of column element types, implemented for tuples of 1 to 12
/// [`ColumnElement`]s.
///
/// A value of the tuple type is one row of those columns. The associated types describe the
/// zipped forms of a row: one raw pointer, one shared reference or one mutable reference per
/// column.
///
/// The raw pointer operations are the only place where column addresses are derived. Every
/// pointer move is scaled by its own column's element size.
pub trait Columns: sealed::Sealed + Copy + Debug + Send + Sync + 'static {
    /// The number of columns.
    const WIDTH: usize;

    /// One raw pointer per column.
    type Ptrs: Copy;
    /// One shared reference per column.
    type Refs<'a>: Copy;
    /// One mutable reference per column.
    type Muts<'a>;

    /// The descriptor of every column, in order.
    fn descriptors() -> Vec<ColumnDescriptor>;

    /// The row whose fields are all zero.
    fn zeroed() -> Self;

    /// Build the column pointers from the base address of each column.
    ///
    /// `base` is called once per column with the column's position.
    fn ptrs_with(base: impl FnMut(usize) -> *mut u8) -> Self::Ptrs;

    /// Move every pointer forward by `rows` elements of its own column.
    fn wrapping_add(ptrs: Self::Ptrs, rows: usize) -> Self::Ptrs;

    /// Move every pointer backward by `rows` elements of its own column.
    fn wrapping_sub(ptrs: Self::Ptrs, rows: usize) -> Self::Ptrs;

    /// The address of the first column's pointer.
    fn addr(ptrs: Self::Ptrs) -> usize;

    /// The distance in rows between two sets of pointers, measured on the first column.
    ///
    /// Always zero when the first column is zero-sized.
    fn offset_from(ptrs: Self::Ptrs, origin: Self::Ptrs) -> isize;

    /// Borrow each column's element.
    ///
    /// # Safety
    ///
    /// Every pointer must be valid for reads of its element type for `'a`, and no element may be
    /// mutated while the references are alive.
    unsafe fn refs<'a>(ptrs: Self::Ptrs) -> Self::Refs<'a>;

    /// Mutably borrow each column's element.
    ///
    /// # Safety
    ///
    /// Every pointer must be valid for reads and writes of its element type for `'a`, the
    /// pointers must be pairwise distinct, and no other reference to the elements may exist while
    /// the references are alive.
    unsafe fn muts<'a>(ptrs: Self::Ptrs) -> Self::Muts<'a>;

    /// Copy the row out of the columns.
    ///
    /// # Safety
    ///
    /// Every pointer must be valid for reads of its element type.
    unsafe fn read(ptrs: Self::Ptrs) -> Self;

    /// Write the row into the columns.
    ///
    /// # Safety
    ///
    /// Every pointer must be valid for writes of its element type.
    unsafe fn write(ptrs: Self::Ptrs, row: Self);

    /// Exchange two rows field by field.
    ///
    /// # Safety
    ///
    /// Every pointer of both rows must be valid for reads and writes of its element type. The two
    /// rows may be the same row.
    unsafe fn swap(a: Self::Ptrs, b: Self::Ptrs);

    /// Format `len` elements of the column at `column` as a comma-separated list.
    ///
    /// # Safety
    ///
    /// The pointer of that column must be valid for reads of `len` elements.
    unsafe fn fmt_column(
        ptrs: Self::Ptrs,
        len: usize,
        column: usize,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result;

    /// Borrow each field of a row value.
    fn as_refs(row: &Self) -> Self::Refs<'_>;

    /// Mutably borrow each field of a row value.
    fn as_muts(row: &mut Self) -> Self::Muts<'_>;

    /// Copy each referenced field into a row value.
    fn copy_refs(refs: Self::Refs<'_>) -> Self;
}

/// Lexicographic comparison of rows, available when every column type is [`PartialOrd`].
///
/// Rows are compared column by column, in column order, stopping at the first column that
/// differs.
pub trait RowOrd: Columns {
    /// Compare two rows given as per-column references.
    fn partial_cmp_refs(a: Self::Refs<'_>, b: Self::Refs<'_>) -> Option<Ordering>;

    /// Whether two rows given as per-column references are equal field by field.
    fn eq_refs(a: Self::Refs<'_>, b: Self::Refs<'_>) -> bool;
}

#[inline(always)]
fn pointee_size<T>(_: *mut T) -> usize {
    size_of::<T>()
}

#[allow(clippy::use_debug)]
fn fmt_values<T: Debug>(values: &[T], f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
        f,
        "{}",
        values
            .iter()
            .format_with(", ", |v, f| f(&format_args!("{v:?}")))
    )
}

macro_rules! impl_columns {
    ($width:literal; $($T:ident $idx:tt),+) => {
        impl<$($T: ColumnElement),+> sealed::Sealed for ($($T,)+) {}

        impl<$($T: ColumnElement),+> Columns for ($($T,)+) {
            const WIDTH: usize = $width;

            type Ptrs = ($(*mut $T,)+);
            type Refs<'a> = ($(&'a $T,)+);
            type Muts<'a> = ($(&'a mut $T,)+);

            fn descriptors() -> Vec<ColumnDescriptor> {
                vec![$(ColumnDescriptor::of::<$T>()),+]
            }

            #[inline]
            fn zeroed() -> Self {
                ($(<$T as ColumnElement>::zeroed(),)+)
            }

            #[inline]
            fn ptrs_with(mut base: impl FnMut(usize) -> *mut u8) -> Self::Ptrs {
                ($(base($idx).cast::<$T>(),)+)
            }

            #[inline(always)]
            fn wrapping_add(ptrs: Self::Ptrs, rows: usize) -> Self::Ptrs {
                ($(ptrs.$idx.wrapping_add(rows),)+)
            }

            #[inline(always)]
            fn wrapping_sub(ptrs: Self::Ptrs, rows: usize) -> Self::Ptrs {
                ($(ptrs.$idx.wrapping_sub(rows),)+)
            }

            #[inline(always)]
            fn addr(ptrs: Self::Ptrs) -> usize {
                ptrs.0.addr()
            }

            #[inline]
            fn offset_from(ptrs: Self::Ptrs, origin: Self::Ptrs) -> isize {
                let size = pointee_size(ptrs.0);
                if size == 0 {
                    return 0;
                }
                #[allow(clippy::cast_possible_wrap)]
                let bytes = ptrs.0.addr().wrapping_sub(origin.0.addr()) as isize;
                #[allow(clippy::cast_possible_wrap)]
                let size = size as isize;
                bytes / size
            }

            #[inline(always)]
            unsafe fn refs<'a>(ptrs: Self::Ptrs) -> Self::Refs<'a> {
                // SAFETY: guaranteed by the caller.
                unsafe { ($(&*ptrs.$idx,)+) }
            }

            #[inline(always)]
            unsafe fn muts<'a>(ptrs: Self::Ptrs) -> Self::Muts<'a> {
                // SAFETY: guaranteed by the caller.
                unsafe { ($(&mut *ptrs.$idx,)+) }
            }

            #[inline(always)]
            unsafe fn read(ptrs: Self::Ptrs) -> Self {
                // SAFETY: guaranteed by the caller.
                unsafe { ($(ptrs.$idx.read(),)+) }
            }

            #[inline(always)]
            unsafe fn write(ptrs: Self::Ptrs, row: Self) {
                // SAFETY: guaranteed by the caller.
                unsafe { $(ptrs.$idx.write(row.$idx);)+ }
            }

            #[inline(always)]
            unsafe fn swap(a: Self::Ptrs, b: Self::Ptrs) {
                // SAFETY: guaranteed by the caller, `ptr::swap` allows `a == b`.
                unsafe { $(std::ptr::swap(a.$idx, b.$idx);)+ }
            }

            unsafe fn fmt_column(
                ptrs: Self::Ptrs,
                len: usize,
                column: usize,
                f: &mut Formatter<'_>,
            ) -> std::fmt::Result {
                match column {
                    // SAFETY: guaranteed by the caller.
                    $($idx => fmt_values(unsafe { std::slice::from_raw_parts(ptrs.$idx, len) }, f),)+
                    _ => Ok(()),
                }
            }

            #[inline(always)]
            fn as_refs(row: &Self) -> Self::Refs<'_> {
                ($(&row.$idx,)+)
            }

            #[inline(always)]
            fn as_muts(row: &mut Self) -> Self::Muts<'_> {
                ($(&mut row.$idx,)+)
            }

            #[inline(always)]
            fn copy_refs(refs: Self::Refs<'_>) -> Self {
                ($(*refs.$idx,)+)
            }
        }

        impl<$($T: ColumnElement + PartialOrd),+> RowOrd for ($($T,)+) {
            #[inline]
            fn partial_cmp_refs(a: Self::Refs<'_>, b: Self::Refs<'_>) -> Option<Ordering> {
                a.partial_cmp(&b)
            }

            #[inline]
            fn eq_refs(a: Self::Refs<'_>, b: Self::Refs<'_>) -> bool {
                a == b
            }
        }
    };
}

impl_columns!(1; A 0);
impl_columns!(2; A 0, B 1);
impl_columns!(3; A 0, B 1, C 2);
impl_columns!(4; A 0, B 1, C 2, D 3);
impl_columns!(5; A 0, B 1, C 2, D 3, E 4);
impl_columns!(6; A 0, B 1, C 2, D 3, E 4, F 5);
impl_columns!(7; A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_columns!(8; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_columns!(9; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_columns!(10; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_columns!(11; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_columns!(12; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use soa_dtype::PackedUInt;

    use crate::{Columns, RowOrd};

    #[test]
    fn descriptors_in_order() {
        let sizes = <(u8, PackedUInt<3>, f64)>::descriptors()
            .iter()
            .map(|d| d.size())
            .collect::<Vec<_>>();
        assert_eq!(sizes, vec![1, 3, 8]);
        assert_eq!(<(u8, PackedUInt<3>, f64)>::WIDTH, 3);
    }

    #[test]
    fn pointers_advance_per_column() {
        let mut a = [0u8; 4];
        let mut b = [0u64; 4];
        let bases = [a.as_mut_ptr(), b.as_mut_ptr().cast::<u8>()];
        let origin = <(u8, u64)>::ptrs_with(|i| bases[i]);
        let moved = <(u8, u64)>::wrapping_add(origin, 3);

        assert_eq!(moved.0.addr() - origin.0.addr(), 3);
        assert_eq!(moved.1.addr() - origin.1.addr(), 24);
        assert_eq!(<(u8, u64)>::offset_from(moved, origin), 3);
        assert_eq!(<(u8, u64)>::offset_from(origin, moved), -3);
        assert_eq!(<(u8, u64)>::wrapping_sub(moved, 3), origin);
    }

    #[test]
    fn zero_sized_first_column() {
        let mut a = [(); 4];
        let mut b = [0u32; 4];
        let bases = [a.as_mut_ptr().cast::<u8>(), b.as_mut_ptr().cast::<u8>()];
        let origin = <((), u32)>::ptrs_with(|i| bases[i]);
        let moved = <((), u32)>::wrapping_add(origin, 2);
        assert_eq!(<((), u32)>::offset_from(moved, origin), 0);
    }

    #[test]
    fn read_write_swap() {
        let mut a = [1u16, 2];
        let mut b = [10i32, 20];
        let bases = [a.as_mut_ptr().cast::<u8>(), b.as_mut_ptr().cast::<u8>()];
        let first = <(u16, i32)>::ptrs_with(|i| bases[i]);
        let second = <(u16, i32)>::wrapping_add(first, 1);

        unsafe {
            <(u16, i32)>::swap(first, second);
            assert_eq!(<(u16, i32)>::read(first), (2, 20));
            <(u16, i32)>::write(second, (7, -7));
            assert_eq!(<(u16, i32)>::read(second), (7, -7));
        }
        assert_eq!(a, [2, 7]);
        assert_eq!(b, [20, -7]);
    }

    #[test]
    fn lexicographic_refs() {
        let a = (1u8, 5u32);
        let b = (1u8, 7u32);
        let c = (2u8, 0u32);
        type Row = (u8, u32);
        assert_eq!(
            Row::partial_cmp_refs(Row::as_refs(&a), Row::as_refs(&b)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Row::partial_cmp_refs(Row::as_refs(&c), Row::as_refs(&b)),
            Some(Ordering::Greater)
        );
        assert!(Row::eq_refs(Row::as_refs(&a), Row::as_refs(&(1, 5))));
    }

    #[test]
    fn zeroed_row() {
        assert_eq!(<(u8, bool, PackedUInt<5>)>::zeroed().2.get(), 0);
        assert_eq!(<(u8, bool, i64)>::zeroed(), (0, false, 0));
    }
}
