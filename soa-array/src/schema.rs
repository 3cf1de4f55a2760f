use std::fmt::{Display, Formatter};
use std::ops::Index;

use itertools::Itertools;
use soa_buffer::Alignment;
use soa_dtype::ColumnDescriptor;
use soa_error::{SoaResult, soa_bail, soa_err};

use crate::Columns;

/// The ordered column descriptors of a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
}

impl Schema {
    /// The schema of the columns `C`.
    pub fn of<C: Columns>() -> Self {
        Self {
            columns: C::descriptors(),
        }
    }

    /// The number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The descriptor of column `column`, if it exists.
    #[inline]
    pub fn column(&self, column: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(column)
    }

    /// Iterate over the column descriptors in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    /// The number of bytes one row occupies across all columns, excluding padding.
    pub fn row_size(&self) -> usize {
        self.columns.iter().map(|c| c.size()).sum()
    }

    /// The largest column alignment, or 1 for an empty schema.
    pub fn max_alignment(&self) -> Alignment {
        self.columns
            .iter()
            .map(|c| c.alignment())
            .fold(Alignment::new(1), Alignment::max)
    }

    /// Check that `columns` selects columns of exactly the types `C`, in order.
    ///
    /// Fails with an out-of-bounds error for an unknown column, and with a type mismatch if a
    /// selected column does not hold the corresponding element type of `C`.
    pub fn check_selection<C: Columns>(&self, columns: &[usize]) -> SoaResult<()> {
        if columns.len() != C::WIDTH {
            soa_bail!(
                "Selected {} columns for a view of {} columns",
                columns.len(),
                C::WIDTH
            );
        }

        for (&column, expected) in columns.iter().zip_eq(C::descriptors()) {
            let actual = self
                .column(column)
                .ok_or_else(|| soa_err!(OutOfBounds: column, 0, self.len()))?;
            if actual.type_id() != expected.type_id() {
                return Err(
                    soa_err!(MismatchedTypes: expected.type_name(), actual.type_name())
                        .with_context(format!("column {column}")),
                );
            }
        }
        Ok(())
    }

    /// Check that `columns` selects no column more than once.
    pub fn check_unique(columns: &[usize]) -> SoaResult<()> {
        if let Some(column) = columns.iter().duplicates().next() {
            soa_bail!("Column {column} selected more than once for mutable access");
        }
        Ok(())
    }
}

impl Index<usize> for Schema {
    type Output = ColumnDescriptor;

    fn index(&self, index: usize) -> &Self::Output {
        &self.columns[index]
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} columns, {} bytes per row, max alignment {}",
            self.len(),
            self.row_size(),
            self.max_alignment()
        )?;
        for (i, column) in self.columns.iter().enumerate() {
            writeln!(f, "  {i}: {column}")?;
        }
        Ok(())
    }
}
