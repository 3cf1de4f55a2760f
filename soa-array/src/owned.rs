use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use soa_buffer::AlignedBytes;
use soa_error::{SoaResult, soa_err};

use crate::{Columns, ColumnsMut, ColumnsRef, RowCursor};

/// Parallel columns that each own a separate allocation.
///
/// Where a [`ColumnStore`](crate::ColumnStore) packs every column into one allocation,
/// `OwnedColumns` allocates each column on its own, aligned to its element type. All of the
/// allocations are released together when the value is dropped.
pub struct OwnedColumns<C: Columns> {
    buffers: Vec<AlignedBytes>,
    len: usize,
    _columns: PhantomData<C>,
}

impl<C: Columns> OwnedColumns<C> {
    /// Allocate `len` zeroed rows.
    pub fn try_new(len: usize) -> SoaResult<Self> {
        let buffers = C::descriptors()
            .iter()
            .map(|desc| {
                let nbytes = len.checked_mul(desc.size()).ok_or_else(
                    || soa_err!(Allocation: "{len} elements of {} overflow usize", desc.type_name()),
                )?;
                AlignedBytes::try_zeroed(nbytes, desc.alignment())
            })
            .collect::<SoaResult<Vec<_>>>()?;

        Ok(Self {
            buffers,
            len,
            _columns: PhantomData,
        })
    }

    /// Allocate one row per element of `rows` and copy them in.
    pub fn try_from_rows(rows: &[C]) -> SoaResult<Self> {
        let mut owned = Self::try_new(rows.len())?;
        let mut columns = owned.columns_mut();
        for (index, row) in rows.iter().enumerate() {
            columns.set(index, *row)?;
        }
        Ok(owned)
    }

    /// The number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A zipped view over the columns.
    pub fn columns(&self) -> ColumnsRef<'_, C> {
        let ptrs = C::ptrs_with(|i| self.buffers[i].as_ptr().cast_mut());
        // SAFETY: each buffer holds `len` zeroed or written elements of its column.
        unsafe { ColumnsRef::new(ptrs, self.len) }
    }

    /// A mutable zipped view over the columns.
    pub fn columns_mut(&mut self) -> ColumnsMut<'_, C> {
        let ptrs = C::ptrs_with(|i| self.buffers[i].as_mut_ptr());
        // SAFETY: as above, and every column is a distinct allocation.
        unsafe { ColumnsMut::new(ptrs, self.len) }
    }

    /// A cursor at the first row.
    pub fn cursor(&mut self) -> RowCursor<'_, C> {
        let ptrs = C::ptrs_with(|i| self.buffers[i].as_mut_ptr());
        // SAFETY: the cursor borrows `self` exclusively, and dereferencing it is unsafe.
        unsafe { RowCursor::from_raw_parts(ptrs) }
    }
}

impl<C: Columns> Debug for OwnedColumns<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedColumns")
            .field("len", &self.len)
            .field("buffers", &self.buffers)
            .finish()
    }
}
