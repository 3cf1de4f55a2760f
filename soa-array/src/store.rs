use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ops::RangeBounds;

use humansize::{DECIMAL, format_size};
use soa_buffer::AlignedBytes;
use soa_dtype::ColumnElement;
use soa_error::{ContextExt, SoaResult, soa_bail, soa_err};

use crate::range::check_index;
use crate::{Columns, ColumnsMut, ColumnsRef, Layout, LayoutOptions, RowCursor, RowMut, Schema};

/// A fixed-capacity structure-of-arrays store of the columns `S`.
///
/// `S` is a tuple of column element types, e.g. `(u8, u16, u32, u64)`. Every column is a
/// contiguous array of `capacity` elements, and all columns live in one zero-initialized
/// allocation whose layout is planned once, on construction.
///
/// Resizing and projection produce a new store with its own allocation; the source store is left
/// untouched. The allocation is released when the store is dropped.
pub struct ColumnStore<S: Columns> {
    schema: Schema,
    layout: Layout,
    options: LayoutOptions,
    buffer: AlignedBytes,
    _columns: PhantomData<S>,
}

impl<S: Columns> ColumnStore<S> {
    /// Allocate a store of `capacity` zeroed rows with the default [`LayoutOptions`].
    pub fn try_new(capacity: usize) -> SoaResult<Self> {
        Self::try_new_with_options(capacity, LayoutOptions::default())
    }

    /// Allocate a store of `capacity` zeroed rows.
    ///
    /// Fails with an allocation error if the planned size overflows or cannot be allocated.
    pub fn try_new_with_options(capacity: usize, options: LayoutOptions) -> SoaResult<Self> {
        let schema = Schema::of::<S>();
        let layout = Layout::for_schema(&schema, capacity, &options)?;
        let buffer = AlignedBytes::try_zeroed(layout.total_size(), layout.alignment())
            .with_context(|| format!("column store of {capacity} rows"))?;

        log::debug!(
            "Allocated column store of {capacity} rows over {} columns: {} aligned to {}",
            schema.len(),
            format_size(layout.total_size(), DECIMAL),
            layout.alignment()
        );

        Ok(Self {
            schema,
            layout,
            options,
            buffer,
            _columns: PhantomData,
        })
    }

    /// The number of bytes a store of `capacity` rows would allocate with the default options.
    pub fn size_bytes(capacity: usize) -> SoaResult<usize> {
        Self::size_bytes_with_options(capacity, &LayoutOptions::default())
    }

    /// The number of bytes a store of `capacity` rows would allocate, without allocating.
    pub fn size_bytes_with_options(capacity: usize, options: &LayoutOptions) -> SoaResult<usize> {
        Layout::for_schema(&Schema::of::<S>(), capacity, options).map(|l| l.total_size())
    }

    /// The number of rows.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    /// The column descriptors of the store.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The planned layout of the store's buffer.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The options the store was created with.
    #[inline]
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// The size of the store's buffer in bytes.
    #[inline]
    pub fn nbytes(&self) -> usize {
        self.buffer.len()
    }

    /// Set every byte of every column to zero.
    pub fn zero(&mut self) {
        self.buffer.zero();
    }

    /// References to every column's element at row `index`.
    pub fn get(&self, index: usize) -> SoaResult<S::Refs<'_>> {
        self.columns().get(index)
    }

    /// References to every column's element at row `index`, without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than the store's capacity.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> S::Refs<'_> {
        // SAFETY: the caller guarantees `index` is in bounds.
        unsafe { self.columns().get_unchecked(index) }
    }

    /// A write-through proxy for row `index`.
    pub fn get_mut(&mut self, index: usize) -> SoaResult<RowMut<'_, S>> {
        check_index(index, self.capacity())?;
        let ptrs = S::wrapping_add(self.ptrs_mut(), index);
        // SAFETY: `index` is in bounds and the proxy borrows the store exclusively.
        Ok(unsafe { RowMut::new(ptrs) })
    }

    /// A copy of the values of row `index`.
    pub fn read(&self, index: usize) -> SoaResult<S> {
        self.columns().read(index)
    }

    /// Overwrite row `index` with `values`.
    pub fn set(&mut self, index: usize, values: S) -> SoaResult<()> {
        self.columns_mut().set(index, values)
    }

    /// References to the elements of the selected `columns` at row `index`.
    ///
    /// `C` names the element types of the selected columns, in selection order.
    pub fn get_columns<C: Columns>(
        &self,
        index: usize,
        columns: &[usize],
    ) -> SoaResult<C::Refs<'_>> {
        self.select::<C>(columns)?.get(index)
    }

    /// Overwrite the selected `columns` of row `index`, leaving the other columns unchanged.
    pub fn set_columns<C: Columns>(
        &mut self,
        index: usize,
        columns: &[usize],
        values: C,
    ) -> SoaResult<()> {
        self.select_mut::<C>(columns)?.set(index, values)
    }

    /// The whole of column `column` as a slice of `T`.
    pub fn column<T: ColumnElement>(&self, column: usize) -> SoaResult<&[T]> {
        let offset = self.typed_offset::<T>(column)?;
        let ptr = self.buffer.as_ptr().wrapping_add(offset).cast::<T>();
        // SAFETY: the column holds `capacity` initialized elements of `T` starting at `offset`.
        Ok(unsafe { std::slice::from_raw_parts(ptr, self.capacity()) })
    }

    /// The whole of column `column` as a mutable slice of `T`.
    pub fn column_mut<T: ColumnElement>(&mut self, column: usize) -> SoaResult<&mut [T]> {
        let offset = self.typed_offset::<T>(column)?;
        let capacity = self.capacity();
        let ptr = self.buffer.as_mut_ptr().wrapping_add(offset).cast::<T>();
        // SAFETY: as above, and the slice borrows the store exclusively.
        Ok(unsafe { std::slice::from_raw_parts_mut(ptr, capacity) })
    }

    /// A zipped view over every column.
    pub fn columns(&self) -> ColumnsRef<'_, S> {
        let base = self.buffer.as_ptr().cast_mut();
        let offsets = self.layout.offsets();
        let ptrs = S::ptrs_with(|i| base.wrapping_add(offsets[i]));
        // SAFETY: the pointers address `capacity` rows of `S` and the view borrows the store.
        unsafe { ColumnsRef::new(ptrs, self.capacity()) }
    }

    /// A mutable zipped view over every column.
    pub fn columns_mut(&mut self) -> ColumnsMut<'_, S> {
        let ptrs = self.ptrs_mut();
        // SAFETY: the pointers address `capacity` rows of `S`, every column is distinct and the
        // view borrows the store exclusively.
        unsafe { ColumnsMut::new(ptrs, self.capacity()) }
    }

    /// A zipped view over the selected `columns`, whose element types are `C` in order.
    ///
    /// A column may be selected more than once.
    pub fn select<C: Columns>(&self, columns: &[usize]) -> SoaResult<ColumnsRef<'_, C>> {
        self.schema.check_selection::<C>(columns)?;
        let base = self.buffer.as_ptr().cast_mut();
        let offsets = self.layout.offsets();
        let ptrs = C::ptrs_with(|i| base.wrapping_add(offsets[columns[i]]));
        // SAFETY: the selection was checked against the schema.
        Ok(unsafe { ColumnsRef::new(ptrs, self.capacity()) })
    }

    /// A mutable zipped view over the selected `columns`, whose element types are `C` in order.
    ///
    /// Fails if a column is selected more than once.
    pub fn select_mut<C: Columns>(&mut self, columns: &[usize]) -> SoaResult<ColumnsMut<'_, C>> {
        let ptrs = self.selected_ptrs_mut::<C>(columns)?;
        // SAFETY: the selection was checked against the schema and contains no duplicates.
        Ok(unsafe { ColumnsMut::new(ptrs, self.capacity()) })
    }

    /// Call `f` once per row of `range` with a mutable reference to each selected column's
    /// element.
    ///
    /// Pass `..` to visit every row. Fails if the range does not lie within the store.
    pub fn map_range<C: Columns>(
        &mut self,
        columns: &[usize],
        range: impl RangeBounds<usize>,
        f: impl FnMut(C::Muts<'_>),
    ) -> SoaResult<()> {
        self.select_mut::<C>(columns)?.map_range(range, f)
    }

    /// Like [`ColumnStore::map_range`], passing the row index as the first argument.
    pub fn map_range_with_index<C: Columns>(
        &mut self,
        columns: &[usize],
        range: impl RangeBounds<usize>,
        f: impl FnMut(usize, C::Muts<'_>),
    ) -> SoaResult<()> {
        self.select_mut::<C>(columns)?
            .map_range_with_index(range, f)
    }

    /// A new store of `new_capacity` rows holding a copy of the first
    /// `min(capacity, new_capacity)` rows of this store. The remaining rows are zero.
    pub fn resize(&self, new_capacity: usize) -> SoaResult<Self> {
        let mut resized = Self::try_new_with_options(new_capacity, self.options)?;
        let rows = self.capacity().min(new_capacity);

        for (column, desc) in self.schema.iter().enumerate() {
            let len = rows * desc.size();
            let src = self.layout.offsets()[column];
            let dst = resized.layout.offsets()[column];
            resized.buffer[dst..dst + len].copy_from_slice(&self.buffer[src..src + len]);
        }

        log::debug!(
            "Resized column store from {} to {new_capacity} rows, copied {rows} rows",
            self.capacity()
        );
        Ok(resized)
    }

    /// A new store holding deep copies of the selected `columns`, in selection order.
    ///
    /// `P` names the element types of the selected columns. A column may be selected more than
    /// once, and every row of the source store is copied.
    pub fn project<P: Columns>(&self, columns: &[usize]) -> SoaResult<ColumnStore<P>> {
        self.schema.check_selection::<P>(columns)?;
        let mut projected = ColumnStore::<P>::try_new_with_options(self.capacity(), self.options)?;

        for (dst_column, &src_column) in columns.iter().enumerate() {
            let len = self.capacity() * self.schema[src_column].size();
            let src = self.layout.offsets()[src_column];
            let dst = projected.layout.offsets()[dst_column];
            projected.buffer[dst..dst + len].copy_from_slice(&self.buffer[src..src + len]);
        }

        log::debug!(
            "Projected columns {columns:?} of a {}-column store into {}",
            self.schema.len(),
            format_size(projected.nbytes(), DECIMAL)
        );
        Ok(projected)
    }

    /// A cursor at row 0 over every column.
    pub fn cursor(&mut self) -> RowCursor<'_, S> {
        let ptrs = self.ptrs_mut();
        // SAFETY: the cursor borrows the store exclusively, and dereferencing it is unsafe.
        unsafe { RowCursor::from_raw_parts(ptrs) }
    }

    /// A cursor at row 0 over the selected `columns`.
    ///
    /// Fails if a column is selected more than once.
    pub fn cursor_for<C: Columns>(&mut self, columns: &[usize]) -> SoaResult<RowCursor<'_, C>> {
        let ptrs = self.selected_ptrs_mut::<C>(columns)?;
        // SAFETY: as for `cursor`.
        Ok(unsafe { RowCursor::from_raw_parts(ptrs) })
    }

    fn ptrs_mut(&mut self) -> S::Ptrs {
        let base = self.buffer.as_mut_ptr();
        let offsets = self.layout.offsets();
        S::ptrs_with(|i| base.wrapping_add(offsets[i]))
    }

    fn selected_ptrs_mut<C: Columns>(&mut self, columns: &[usize]) -> SoaResult<C::Ptrs> {
        self.schema.check_selection::<C>(columns)?;
        Schema::check_unique(columns)?;
        let base = self.buffer.as_mut_ptr();
        let offsets = self.layout.offsets();
        Ok(C::ptrs_with(|i| base.wrapping_add(offsets[columns[i]])))
    }

    fn typed_offset<T: ColumnElement>(&self, column: usize) -> SoaResult<usize> {
        let Some(desc) = self.schema.column(column) else {
            soa_bail!(OutOfBounds: column, 0, self.schema.len());
        };
        if !desc.is::<T>() {
            return Err(
                soa_err!(MismatchedTypes: std::any::type_name::<T>(), desc.type_name())
                    .with_context(format!("column {column}")),
            );
        }
        Ok(self.layout.offsets()[column])
    }
}

impl<S: Columns> Debug for ColumnStore<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnStore")
            .field("capacity", &self.capacity())
            .field("schema", &self.schema)
            .field("offsets", &self.layout.offsets())
            .field("buffer", &self.buffer)
            .finish()
    }
}
