use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::{Columns, RowOrd};

/// A non-owning cursor over parallel columns: one raw pointer per column, all moved in lockstep.
///
/// Moving the cursor is always safe and never dereferences. Every move of `n` rows advances each
/// column pointer by `n` elements of that column's own type, so a `(u8, u64)` cursor moves its
/// first pointer by `n` bytes and its second by `8 * n` bytes.
///
/// Reading or writing through the cursor is `unsafe`: the cursor does not know how many rows its
/// columns hold, and it is `Copy`, so two copies may hand out proxies for the same row. Cursors
/// compare and hash by the address of their first column.
pub struct RowCursor<'a, C: Columns> {
    ptrs: C::Ptrs,
    _marker: PhantomData<&'a mut C>,
}

impl<C: Columns> Clone for RowCursor<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Columns> Copy for RowCursor<'_, C> {}

impl<'a, C: Columns> RowCursor<'a, C> {
    /// A cursor over the columns starting at `ptrs`.
    ///
    /// # Safety
    ///
    /// For as long as the cursor or any proxy obtained from it is dereferenced, every pointer must
    /// address memory valid for reads and writes of its column type for `'a`. The pointers must
    /// be pairwise distinct unless the corresponding column type is zero-sized.
    #[inline]
    pub unsafe fn from_raw_parts(ptrs: C::Ptrs) -> Self {
        Self {
            ptrs,
            _marker: PhantomData,
        }
    }

    /// A cursor at the row of `row`, borrowing it for the cursor's lifetime.
    #[inline]
    pub fn from_row(row: &'a mut RowMut<'_, C>) -> Self {
        Self {
            ptrs: row.ptrs,
            _marker: PhantomData,
        }
    }

    /// The raw column pointers.
    #[inline]
    pub fn as_ptrs(&self) -> C::Ptrs {
        self.ptrs
    }

    /// Move forward by `rows`.
    #[inline]
    pub fn advance(&mut self, rows: usize) {
        self.ptrs = C::wrapping_add(self.ptrs, rows);
    }

    /// Move backward by `rows`.
    #[inline]
    pub fn retreat(&mut self, rows: usize) {
        self.ptrs = C::wrapping_sub(self.ptrs, rows);
    }

    /// Move forward by one row.
    #[inline]
    pub fn increment(&mut self) {
        self.advance(1);
    }

    /// Move backward by one row.
    #[inline]
    pub fn decrement(&mut self) {
        self.retreat(1);
    }

    /// The proxy of the row under the cursor.
    ///
    /// # Safety
    ///
    /// The cursor must point at a row of its columns, and no other live proxy or reference may
    /// access that row while the returned proxy is used.
    #[inline]
    pub unsafe fn row(&self) -> RowMut<'a, C> {
        // SAFETY: guaranteed by the caller.
        unsafe { RowMut::new(self.ptrs) }
    }

    /// The proxy of the row `rows` after the cursor.
    ///
    /// # Safety
    ///
    /// As for [`RowCursor::row`], for the row `rows` after the cursor.
    #[inline]
    pub unsafe fn row_at(&self, rows: usize) -> RowMut<'a, C> {
        // SAFETY: guaranteed by the caller.
        unsafe { RowMut::new(C::wrapping_add(self.ptrs, rows)) }
    }

    /// The number of rows from `origin` to this cursor, measured on the first column.
    ///
    /// Zero when the first column is zero-sized.
    #[inline]
    pub fn offset_from(&self, origin: &Self) -> isize {
        C::offset_from(self.ptrs, origin.ptrs)
    }
}

impl<C: Columns> Add<usize> for RowCursor<'_, C> {
    type Output = Self;

    #[inline]
    fn add(mut self, rows: usize) -> Self {
        self.advance(rows);
        self
    }
}

impl<C: Columns> Sub<usize> for RowCursor<'_, C> {
    type Output = Self;

    #[inline]
    fn sub(mut self, rows: usize) -> Self {
        self.retreat(rows);
        self
    }
}

impl<C: Columns> AddAssign<usize> for RowCursor<'_, C> {
    #[inline]
    fn add_assign(&mut self, rows: usize) {
        self.advance(rows);
    }
}

impl<C: Columns> SubAssign<usize> for RowCursor<'_, C> {
    #[inline]
    fn sub_assign(&mut self, rows: usize) {
        self.retreat(rows);
    }
}

impl<C: Columns> PartialEq for RowCursor<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        C::addr(self.ptrs) == C::addr(other.ptrs)
    }
}

impl<C: Columns> Eq for RowCursor<'_, C> {}

impl<C: Columns> PartialOrd for RowCursor<'_, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Columns> Ord for RowCursor<'_, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        C::addr(self.ptrs).cmp(&C::addr(other.ptrs))
    }
}

impl<C: Columns> Hash for RowCursor<'_, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        C::addr(self.ptrs).hash(state);
    }
}

impl<C: Columns> Debug for RowCursor<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowCursor")
            .field("width", &C::WIDTH)
            .field("addr", &format_args!("{:#x}", C::addr(self.ptrs)))
            .finish()
    }
}

/// A write-through proxy for one row of parallel columns.
///
/// The proxy exclusively borrows one element of each column. Reading it copies the values out,
/// writing it assigns every column, and two proxies can exchange their rows field by field with
/// [`swap`].
pub struct RowMut<'a, C: Columns> {
    ptrs: C::Ptrs,
    _marker: PhantomData<&'a mut C>,
}

// SAFETY: a proxy is an exclusive borrow of `Send + Sync` elements.
unsafe impl<C: Columns> Send for RowMut<'_, C> {}
// SAFETY: shared access to a proxy only reads.
unsafe impl<C: Columns> Sync for RowMut<'_, C> {}

impl<'a, C: Columns> RowMut<'a, C> {
    /// # Safety
    ///
    /// Every pointer must be valid for reads and writes of its column type for `'a`, and the
    /// elements must not be accessed through any other path while the proxy is alive.
    #[inline]
    pub(crate) unsafe fn new(ptrs: C::Ptrs) -> Self {
        Self {
            ptrs,
            _marker: PhantomData,
        }
    }

    /// A copy of the row's values.
    #[inline]
    pub fn get(&self) -> C {
        // SAFETY: the proxy's pointers are valid for reads.
        unsafe { C::read(self.ptrs) }
    }

    /// Overwrite every column of the row.
    #[inline]
    pub fn set(&mut self, values: C) {
        // SAFETY: the proxy's pointers are valid for writes.
        unsafe { C::write(self.ptrs, values) }
    }

    /// Reset every column of the row to its zero value.
    #[inline]
    pub fn zero(&mut self) {
        self.set(C::zeroed());
    }

    /// Move `values` into the row, leaving zero values behind in `values`.
    #[inline]
    pub fn take_from(&mut self, values: &mut C) {
        self.set(std::mem::replace(values, C::zeroed()));
    }

    /// References to each column's element.
    #[inline]
    pub fn fields(&self) -> C::Refs<'_> {
        // SAFETY: borrowed from `self`, so no writes happen while the references are alive.
        unsafe { C::refs(self.ptrs) }
    }

    /// Mutable references to each column's element.
    #[inline]
    pub fn fields_mut(&mut self) -> C::Muts<'_> {
        // SAFETY: borrowed exclusively from `self`.
        unsafe { C::muts(self.ptrs) }
    }

    /// Convert the proxy into mutable references that live as long as the original borrow.
    #[inline]
    pub fn into_fields(self) -> C::Muts<'a> {
        // SAFETY: the proxy is consumed.
        unsafe { C::muts(self.ptrs) }
    }

    /// Exchange this row with `other`, field by field.
    #[inline]
    pub fn swap_with(&mut self, other: &mut RowMut<'_, C>) {
        // SAFETY: both proxies are valid for reads and writes.
        unsafe { C::swap(self.ptrs, other.ptrs) }
    }

    /// A cursor at this row.
    #[inline]
    pub fn cursor(&mut self) -> RowCursor<'_, C> {
        RowCursor::from_row(self)
    }
}

/// Exchange the rows of `a` and `b`, field by field.
#[inline]
pub fn swap<C: Columns>(a: &mut RowMut<'_, C>, b: &mut RowMut<'_, C>) {
    a.swap_with(b);
}

impl<C: Columns> Debug for RowMut<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RowMut").field(&self.get()).finish()
    }
}

impl<C: RowOrd> PartialEq<RowMut<'_, C>> for RowMut<'_, C> {
    fn eq(&self, other: &RowMut<'_, C>) -> bool {
        C::eq_refs(self.fields(), other.fields())
    }
}

impl<C: RowOrd> PartialOrd<RowMut<'_, C>> for RowMut<'_, C> {
    fn partial_cmp(&self, other: &RowMut<'_, C>) -> Option<Ordering> {
        C::partial_cmp_refs(self.fields(), other.fields())
    }
}

impl<C: RowOrd> PartialEq<C> for RowMut<'_, C> {
    fn eq(&self, other: &C) -> bool {
        C::eq_refs(self.fields(), C::as_refs(other))
    }
}

impl<C: RowOrd> PartialOrd<C> for RowMut<'_, C> {
    fn partial_cmp(&self, other: &C) -> Option<Ordering> {
        C::partial_cmp_refs(self.fields(), C::as_refs(other))
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod test {
    use std::cmp::Ordering;

    use soa_dtype::PackedUInt;

    use crate::{ColumnStore, Columns, OwnedColumns, RowCursor, swap};

    #[test]
    fn lockstep_moves() {
        let mut store = ColumnStore::<(u8, u64, PackedUInt<3>)>::try_new(8).unwrap();
        let start = store.cursor();
        let mut cursor = start;

        cursor.advance(5);
        assert_eq!(cursor.offset_from(&start), 5);
        let (a, b, c) = cursor.as_ptrs();
        let (a0, b0, c0) = start.as_ptrs();
        assert_eq!(a.addr() - a0.addr(), 5);
        assert_eq!(b.addr() - b0.addr(), 40);
        assert_eq!(c.addr() - c0.addr(), 15);

        cursor.decrement();
        cursor.retreat(2);
        cursor.increment();
        assert_eq!(cursor.offset_from(&start), 3);
        assert_eq!(start.offset_from(&cursor), -3);
        assert_eq!(cursor - 3, start);
        assert_eq!(start + 3, cursor);
        assert!(start < cursor);

        let mut end = start;
        end += 8;
        end -= 1;
        assert_eq!(end.offset_from(&start), 7);
    }

    #[test]
    fn write_through_cursor() {
        let mut store = ColumnStore::<(i32, i16, bool, i64)>::try_new(4).unwrap();
        let mut cursor = store.cursor();
        for i in 0..4 {
            unsafe { cursor.row() }.set((i, i as i16 * 2, i % 2 == 1, i64::from(i) * 3));
            cursor.increment();
        }
        let start = cursor - 4;
        assert_eq!(unsafe { start.row_at(2) }.get(), (2, 4, false, 6));
        assert_eq!(store.read(3).unwrap(), (3, 6, true, 9));
    }

    #[test]
    fn cursor_over_selected_columns() {
        let mut store = ColumnStore::<(u8, u16, u32)>::try_new(3).unwrap();
        let cursor = store.cursor_for::<(u32, u8)>(&[2, 0]).unwrap();
        unsafe { cursor.row_at(1) }.set((7, 1));
        assert_eq!(store.read(1).unwrap(), (1, 0, 7));
        assert!(store.cursor_for::<(u8, u8)>(&[0, 0]).is_err());
    }

    #[test]
    fn proxies_swap_and_compare() {
        let mut owned =
            OwnedColumns::<(u8, u32)>::try_from_rows(&[(1, 100), (2, 50), (1, 100)]).unwrap();
        let cursor = owned.cursor();
        let (mut first, mut second, third) =
            unsafe { (cursor.row(), cursor.row_at(1), cursor.row_at(2)) };

        assert!(first < second);
        assert_eq!(first, third);
        assert_eq!(first, (1, 100));
        assert_eq!(first.partial_cmp(&(1, 99)), Some(Ordering::Greater));

        swap(&mut first, &mut second);
        assert_eq!(first.get(), (2, 50));
        assert_eq!(second.get(), (1, 100));
        assert_eq!(third.get(), (1, 100));

        first.swap_with(&mut second);
        assert_eq!(first.get(), (1, 100));
    }

    #[test]
    fn cursor_from_row() {
        let mut store = ColumnStore::<(u16, u16)>::try_new(4).unwrap();
        let mut row = store.get_mut(2).unwrap();
        let cursor = RowCursor::from_row(&mut row);
        let (a, _) = unsafe { cursor.row() }.into_fields();
        *a = 9;
        assert_eq!(store.read(2).unwrap(), (9, 0));
    }

    #[test]
    fn zero_and_take_from() {
        type Row = (u8, i64, PackedUInt<3>);
        let mut store = ColumnStore::<Row>::try_new(3).unwrap();
        store.set(1, (4, -5, PackedUInt::new(6))).unwrap();

        let mut cursor = store.cursor();
        cursor.increment();
        unsafe { cursor.row() }.zero();

        let mut incoming: Row = (7, -8, PackedUInt::new(9));
        unsafe { cursor.row_at(1) }.take_from(&mut incoming);
        let zero: Row = (0, 0, PackedUInt::new(0));
        assert_eq!(incoming, zero);
        assert_eq!(incoming, <Row as Columns>::zeroed());

        assert_eq!(store.read(1).unwrap(), zero);
        assert_eq!(store.read(2).unwrap(), (7, -8, PackedUInt::<3>::new(9)));
    }

    #[test]
    fn proxy_fields() {
        let mut store = ColumnStore::<(u8, f32)>::try_new(2).unwrap();
        let mut row = store.get_mut(0).unwrap();
        row.set((3, 0.25));
        assert_eq!(row.fields(), (&3, &0.25));
        *row.fields_mut().1 = 4.0;
        assert_eq!(format!("{row:?}"), "RowMut((3, 4.0))");
    }
}
