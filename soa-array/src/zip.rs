use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::RangeBounds;

use soa_error::{SoaResult, soa_bail};

use crate::range::{check_index, checked_range};
use crate::{Columns, RowCursor, RowMut, RowOrd};

/// A shared, zipped view over `len` rows of the columns `C`.
///
/// The view does not own the columns. It is a set of column pointers that move in lockstep, with
/// bounds checks against `len` on every checked accessor.
pub struct ColumnsRef<'a, C: Columns> {
    ptrs: C::Ptrs,
    len: usize,
    _marker: PhantomData<&'a C>,
}

/// A mutable, zipped view over `len` rows of the columns `C`.
///
/// A mutable view never selects the same column twice, so each of its rows can be borrowed as one
/// mutable reference per column.
pub struct ColumnsMut<'a, C: Columns> {
    ptrs: C::Ptrs,
    len: usize,
    _marker: PhantomData<&'a mut C>,
}

// SAFETY: the views are borrows of `Send + Sync` column elements.
unsafe impl<C: Columns> Send for ColumnsRef<'_, C> {}
// SAFETY: as above.
unsafe impl<C: Columns> Sync for ColumnsRef<'_, C> {}
// SAFETY: a mutable view is an exclusive borrow of its rows.
unsafe impl<C: Columns> Send for ColumnsMut<'_, C> {}
// SAFETY: shared access to a mutable view only reads.
unsafe impl<C: Columns> Sync for ColumnsMut<'_, C> {}

impl<C: Columns> Clone for ColumnsRef<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Columns> Copy for ColumnsRef<'_, C> {}

impl<'a, C: Columns> ColumnsRef<'a, C> {
    /// # Safety
    ///
    /// Each pointer must address `len` initialized elements of its column, readable for `'a`.
    pub(crate) unsafe fn new(ptrs: C::Ptrs, len: usize) -> Self {
        Self {
            ptrs,
            len,
            _marker: PhantomData,
        }
    }

    /// The number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// References to each column's element at row `index`.
    pub fn get(&self, index: usize) -> SoaResult<C::Refs<'a>> {
        check_index(index, self.len)?;
        // SAFETY: checked above.
        Ok(unsafe { self.get_unchecked(index) })
    }

    /// References to each column's element at row `index`, without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> C::Refs<'a> {
        // SAFETY: the caller guarantees `index` is in bounds.
        unsafe { C::refs(C::wrapping_add(self.ptrs, index)) }
    }

    /// A copy of row `index`.
    pub fn read(&self, index: usize) -> SoaResult<C> {
        self.get(index).map(C::copy_refs)
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> RowIter<'a, C> {
        RowIter {
            ptrs: self.ptrs,
            front: 0,
            back: self.len,
            _marker: PhantomData,
        }
    }

    /// Compare rows `a` and `b` lexicographically, column by column.
    pub fn compare_rows(&self, a: usize, b: usize) -> SoaResult<Option<Ordering>>
    where
        C: RowOrd,
    {
        Ok(C::partial_cmp_refs(self.get(a)?, self.get(b)?))
    }

    /// A displayable dump with one line per column and comma-separated values.
    pub fn display_columns(&self) -> DisplayColumns<'a, C> {
        DisplayColumns { columns: *self }
    }
}

impl<'a, C: Columns> IntoIterator for ColumnsRef<'a, C> {
    type Item = C::Refs<'a>;
    type IntoIter = RowIter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, C: Columns> ColumnsMut<'a, C> {
    /// # Safety
    ///
    /// Each pointer must address `len` initialized elements of its column, readable and writable
    /// for `'a` and not accessed through any other path. The columns must be pairwise distinct.
    pub(crate) unsafe fn new(ptrs: C::Ptrs, len: usize) -> Self {
        Self {
            ptrs,
            len,
            _marker: PhantomData,
        }
    }

    /// The number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A shared view over the same rows.
    #[inline]
    pub fn as_view(&self) -> ColumnsRef<'_, C> {
        // SAFETY: the shared view borrows `self`, so no writes happen while it is alive.
        unsafe { ColumnsRef::new(self.ptrs, self.len) }
    }

    /// A shorter-lived mutable view over the same rows.
    #[inline]
    pub fn reborrow(&mut self) -> ColumnsMut<'_, C> {
        // SAFETY: the new view borrows `self` exclusively.
        unsafe { ColumnsMut::new(self.ptrs, self.len) }
    }

    /// References to each column's element at row `index`.
    pub fn get(&self, index: usize) -> SoaResult<C::Refs<'_>> {
        self.as_view().get(index)
    }

    /// A write-through proxy for row `index`.
    pub fn get_mut(&mut self, index: usize) -> SoaResult<RowMut<'_, C>> {
        check_index(index, self.len)?;
        // SAFETY: checked above, and the proxy borrows `self` exclusively.
        Ok(unsafe { RowMut::new(C::wrapping_add(self.ptrs, index)) })
    }

    /// A copy of row `index`.
    pub fn read(&self, index: usize) -> SoaResult<C> {
        self.as_view().read(index)
    }

    /// Overwrite row `index` with `values`.
    pub fn set(&mut self, index: usize, values: C) -> SoaResult<()> {
        check_index(index, self.len)?;
        // SAFETY: checked above.
        unsafe { C::write(C::wrapping_add(self.ptrs, index), values) };
        Ok(())
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> RowIter<'_, C> {
        self.as_view().iter()
    }

    /// Iterate over write-through proxies of the rows.
    pub fn iter_mut(&mut self) -> RowIterMut<'_, C> {
        RowIterMut {
            ptrs: self.ptrs,
            front: 0,
            back: self.len,
            _marker: PhantomData,
        }
    }

    /// Compare rows `a` and `b` lexicographically, column by column.
    pub fn compare_rows(&self, a: usize, b: usize) -> SoaResult<Option<Ordering>>
    where
        C: RowOrd,
    {
        self.as_view().compare_rows(a, b)
    }

    /// Exchange rows `a` and `b` in every column of the view.
    pub fn swap_rows(&mut self, a: usize, b: usize) -> SoaResult<()> {
        check_index(a, self.len)?;
        check_index(b, self.len)?;
        // SAFETY: both rows are in bounds.
        unsafe { self.swap_unchecked(a, b) };
        Ok(())
    }

    /// # Safety
    ///
    /// `a` and `b` must be less than `len`.
    #[inline]
    pub(crate) unsafe fn swap_unchecked(&mut self, a: usize, b: usize) {
        // SAFETY: guaranteed by the caller.
        unsafe { C::swap(C::wrapping_add(self.ptrs, a), C::wrapping_add(self.ptrs, b)) }
    }

    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub(crate) unsafe fn refs_unchecked(&self, index: usize) -> C::Refs<'_> {
        // SAFETY: guaranteed by the caller.
        unsafe { C::refs(C::wrapping_add(self.ptrs, index)) }
    }

    /// Call `f` once per row of `range` with a mutable reference to each column's element.
    pub fn map_range(
        &mut self,
        range: impl RangeBounds<usize>,
        mut f: impl FnMut(C::Muts<'_>),
    ) -> SoaResult<()> {
        for index in checked_range(range, self.len)? {
            // SAFETY: the range was checked, and each row is borrowed for one call only.
            f(unsafe { C::muts(C::wrapping_add(self.ptrs, index)) });
        }
        Ok(())
    }

    /// Like [`ColumnsMut::map_range`], passing the row index as the first argument.
    pub fn map_range_with_index(
        &mut self,
        range: impl RangeBounds<usize>,
        mut f: impl FnMut(usize, C::Muts<'_>),
    ) -> SoaResult<()> {
        for index in checked_range(range, self.len)? {
            // SAFETY: as above.
            f(index, unsafe { C::muts(C::wrapping_add(self.ptrs, index)) });
        }
        Ok(())
    }

    /// Sort the rows in place by lexicographic order of the view's columns.
    ///
    /// Rows whose comparison is undefined, e.g. because of a `NaN`, are treated as equal. The sort
    /// is not stable.
    pub fn sort_rows(&mut self)
    where
        C: RowOrd,
    {
        self.sort_rows_by(|a, b| C::partial_cmp_refs(a, b).unwrap_or(Ordering::Equal));
    }

    /// Sort the rows in place with a comparator over per-column references.
    ///
    /// The sort is not stable.
    pub fn sort_rows_by(&mut self, mut compare: impl FnMut(C::Refs<'_>, C::Refs<'_>) -> Ordering) {
        self.heapsort(|a, b| compare(a, b) == Ordering::Less);
    }

    /// Split the view into the rows `[0, mid)` and `[mid, len)`.
    ///
    /// The two halves are disjoint and may be processed on different threads.
    pub fn split_at_mut(self, mid: usize) -> SoaResult<(ColumnsMut<'a, C>, ColumnsMut<'a, C>)> {
        if mid > self.len {
            soa_bail!(OutOfBounds: mid, 0, self.len);
        }
        // SAFETY: the halves cover disjoint rows of the original exclusive borrow.
        unsafe {
            Ok((
                ColumnsMut::new(self.ptrs, mid),
                ColumnsMut::new(C::wrapping_add(self.ptrs, mid), self.len - mid),
            ))
        }
    }

    /// A cursor at the view's first row.
    pub fn cursor(&mut self) -> RowCursor<'_, C> {
        // SAFETY: the cursor borrows `self` exclusively, and dereferencing it is unsafe.
        unsafe { RowCursor::from_raw_parts(self.ptrs) }
    }

    /// A displayable dump with one line per column and comma-separated values.
    pub fn display_columns(&self) -> DisplayColumns<'_, C> {
        self.as_view().display_columns()
    }
}

impl<C: Columns> Debug for ColumnsRef<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnsRef")
            .field("width", &C::WIDTH)
            .field("len", &self.len)
            .finish()
    }
}

impl<C: Columns> Debug for ColumnsMut<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnsMut")
            .field("width", &C::WIDTH)
            .field("len", &self.len)
            .finish()
    }
}

/// An iterator over the rows of a zipped view, yielding one reference per column.
pub struct RowIter<'a, C: Columns> {
    ptrs: C::Ptrs,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a C>,
}

impl<'a, C: Columns> Iterator for RowIter<'a, C> {
    type Item = C::Refs<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: `front < back <= len` of the view the iterator was created from.
        let row = unsafe { C::refs(C::wrapping_add(self.ptrs, self.front)) };
        self.front += 1;
        Some(row)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<C: Columns> DoubleEndedIterator for RowIter<'_, C> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: as for `next`.
        Some(unsafe { C::refs(C::wrapping_add(self.ptrs, self.back)) })
    }
}

impl<C: Columns> ExactSizeIterator for RowIter<'_, C> {}
impl<C: Columns> FusedIterator for RowIter<'_, C> {}

/// An iterator over write-through proxies of the rows of a mutable zipped view.
pub struct RowIterMut<'a, C: Columns> {
    ptrs: C::Ptrs,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut C>,
}

impl<'a, C: Columns> Iterator for RowIterMut<'a, C> {
    type Item = RowMut<'a, C>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: `front < back <= len`, and each row is yielded at most once.
        let row = unsafe { RowMut::new(C::wrapping_add(self.ptrs, self.front)) };
        self.front += 1;
        Some(row)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<C: Columns> DoubleEndedIterator for RowIterMut<'_, C> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: as for `next`.
        Some(unsafe { RowMut::new(C::wrapping_add(self.ptrs, self.back)) })
    }
}

impl<C: Columns> ExactSizeIterator for RowIterMut<'_, C> {}
impl<C: Columns> FusedIterator for RowIterMut<'_, C> {}

/// Prints each column of a view on its own line, values separated by commas.
///
/// Not a stable format.
pub struct DisplayColumns<'a, C: Columns> {
    columns: ColumnsRef<'a, C>,
}

impl<C: Columns> Display for DisplayColumns<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for column in 0..C::WIDTH {
            write!(f, "{column}: ")?;
            // SAFETY: every column of the view holds `len` readable elements.
            unsafe { C::fmt_column(self.columns.ptrs, self.columns.len, column, f)? };
            writeln!(f)?;
        }
        Ok(())
    }
}
