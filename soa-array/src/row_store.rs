use std::fmt::{Debug, Formatter};
use std::ops::RangeBounds;

use soa_buffer::TruncatedDebug;
use soa_error::{SoaResult, soa_err};

use crate::Columns;
use crate::range::{check_index, checked_range};

/// A fixed-capacity array-of-structures store of the rows `S`.
///
/// The row-major counterpart of [`ColumnStore`](crate::ColumnStore), with the same contract:
/// rows start out zeroed, accessors are bounds checked, ranged maps hand out one mutable reference
/// per field, and resizing produces a new store.
pub struct RowStore<S: Columns> {
    rows: Vec<S>,
}

impl<S: Columns> RowStore<S> {
    /// Allocate a store of `capacity` zeroed rows.
    pub fn try_new(capacity: usize) -> SoaResult<Self> {
        let mut rows = Vec::new();
        rows.try_reserve_exact(capacity).map_err(|e| {
            soa_err!(Allocation: "{capacity} rows of {} bytes: {e}", size_of::<S>())
        })?;
        rows.resize(capacity, S::zeroed());

        log::debug!(
            "Allocated row store of {capacity} rows, {} bytes per row",
            size_of::<S>()
        );
        Ok(Self { rows })
    }

    /// The number of bytes a store of `capacity` rows would allocate.
    pub fn size_bytes(capacity: usize) -> SoaResult<usize> {
        capacity
            .checked_mul(size_of::<S>())
            .ok_or_else(|| soa_err!(Allocation: "layout of {capacity} rows overflows usize"))
    }

    /// The number of rows.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    /// Set every row to zero.
    pub fn zero(&mut self) {
        self.rows.fill(S::zeroed());
    }

    /// References to each field of row `index`.
    pub fn get(&self, index: usize) -> SoaResult<S::Refs<'_>> {
        check_index(index, self.capacity())?;
        Ok(S::as_refs(&self.rows[index]))
    }

    /// Mutable references to each field of row `index`.
    pub fn get_mut(&mut self, index: usize) -> SoaResult<S::Muts<'_>> {
        check_index(index, self.capacity())?;
        Ok(S::as_muts(&mut self.rows[index]))
    }

    /// A copy of row `index`.
    pub fn read(&self, index: usize) -> SoaResult<S> {
        check_index(index, self.capacity())?;
        Ok(self.rows[index])
    }

    /// Overwrite row `index`.
    pub fn set(&mut self, index: usize, values: S) -> SoaResult<()> {
        check_index(index, self.capacity())?;
        self.rows[index] = values;
        Ok(())
    }

    /// The rows as a slice.
    #[inline]
    pub fn rows(&self) -> &[S] {
        &self.rows
    }

    /// Call `f` once per row of `range` with a mutable reference to each field.
    pub fn map_range(
        &mut self,
        range: impl RangeBounds<usize>,
        mut f: impl FnMut(S::Muts<'_>),
    ) -> SoaResult<()> {
        let range = checked_range(range, self.capacity())?;
        self.rows[range].iter_mut().for_each(|row| f(S::as_muts(row)));
        Ok(())
    }

    /// Like [`RowStore::map_range`], passing the row index as the first argument.
    pub fn map_range_with_index(
        &mut self,
        range: impl RangeBounds<usize>,
        mut f: impl FnMut(usize, S::Muts<'_>),
    ) -> SoaResult<()> {
        let range = checked_range(range, self.capacity())?;
        let start = range.start;
        self.rows[range]
            .iter_mut()
            .enumerate()
            .for_each(|(i, row)| f(start + i, S::as_muts(row)));
        Ok(())
    }

    /// A new store of `new_capacity` rows holding a copy of the first
    /// `min(capacity, new_capacity)` rows of this store. The remaining rows are zero.
    pub fn resize(&self, new_capacity: usize) -> SoaResult<Self> {
        let mut resized = Self::try_new(new_capacity)?;
        let rows = self.capacity().min(new_capacity);
        resized.rows[..rows].copy_from_slice(&self.rows[..rows]);
        Ok(resized)
    }
}

impl<S: Columns> Debug for RowStore<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStore")
            .field("capacity", &self.capacity())
            .field("rows", &TruncatedDebug(&self.rows))
            .finish()
    }
}
