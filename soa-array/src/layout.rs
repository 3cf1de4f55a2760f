use soa_buffer::Alignment;
use soa_error::{SoaResult, soa_err};

use crate::Schema;

/// Options controlling how a store's buffer is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    block_alignment: Alignment,
}

impl LayoutOptions {
    /// The default block alignment, one cache line.
    pub const DEFAULT_BLOCK_ALIGNMENT: Alignment = Alignment::new(64);

    /// Set the alignment of the buffer as a whole.
    ///
    /// The total size of a store is rounded up to a multiple of this alignment, and the buffer's
    /// start address is aligned to the larger of it and the largest column alignment.
    pub fn with_block_alignment(mut self, block_alignment: Alignment) -> Self {
        self.block_alignment = block_alignment;
        self
    }

    /// The alignment of the buffer as a whole.
    pub fn block_alignment(&self) -> Alignment {
        self.block_alignment
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            block_alignment: Self::DEFAULT_BLOCK_ALIGNMENT,
        }
    }
}

/// The planned byte layout of a store: where each column starts within the buffer, and how large
/// and how aligned the buffer must be.
///
/// For columns `0..k` with element sizes `size[i]` and alignments `align[i]`, and a capacity of
/// `capacity` rows:
///
/// * `offsets[0] == 0`
/// * `offsets[i] == round_up(offsets[i - 1] + capacity * size[i - 1], align[i])`
/// * `total_size == round_up(offsets[k - 1] + capacity * size[k - 1], block_alignment)`
///
/// so every column is aligned for its element type, columns never overlap, and a capacity of zero
/// needs no bytes at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    offsets: Vec<usize>,
    total_size: usize,
    alignment: Alignment,
    capacity: usize,
}

impl Layout {
    /// Plan the layout of `capacity` rows of the given `(size, alignment)` columns.
    ///
    /// Fails with an allocation error if the planned size overflows `usize`.
    pub fn plan(
        columns: impl IntoIterator<Item = (usize, Alignment)>,
        capacity: usize,
        options: &LayoutOptions,
    ) -> SoaResult<Self> {
        let overflow = || soa_err!(Allocation: "layout of {capacity} rows overflows usize");

        let block_alignment = options.block_alignment();
        let mut alignment = block_alignment;
        let mut offsets = Vec::new();
        let mut end = 0usize;

        for (size, column_alignment) in columns {
            let offset = column_alignment.round_up(end).ok_or_else(overflow)?;
            end = capacity
                .checked_mul(size)
                .and_then(|len| offset.checked_add(len))
                .ok_or_else(overflow)?;
            offsets.push(offset);
            alignment = alignment.max(column_alignment);
        }

        let total_size = block_alignment.round_up(end).ok_or_else(overflow)?;

        log::trace!(
            "Planned {} columns of {capacity} rows: offsets {offsets:?}, {total_size} bytes aligned to {alignment}",
            offsets.len()
        );

        Ok(Self {
            offsets,
            total_size,
            alignment,
            capacity,
        })
    }

    /// Plan the layout of `capacity` rows of `schema`.
    pub fn for_schema(
        schema: &Schema,
        capacity: usize,
        options: &LayoutOptions,
    ) -> SoaResult<Self> {
        Self::plan(
            schema.iter().map(|c| (c.size(), c.alignment())),
            capacity,
            options,
        )
    }

    /// The byte offset of each column from the start of the buffer.
    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The byte offset of column `column` from the start of the buffer.
    #[inline]
    pub fn offset(&self, column: usize) -> Option<usize> {
        self.offsets.get(column).copied()
    }

    /// The total size of the buffer in bytes.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// The alignment of the buffer's start address.
    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// The number of rows the layout holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;
    use soa_buffer::Alignment;
    use soa_error::SoaError;

    use crate::{Layout, LayoutOptions};

    fn columns(sizes: &[(usize, usize)]) -> Vec<(usize, Alignment)> {
        sizes.iter()
            .map(|(size, align)| (*size, Alignment::new(*align)))
            .collect()
    }

    #[test]
    fn mixed_alignments() {
        let layout = Layout::plan(
            columns(&[(1, 1), (2, 2), (4, 4), (8, 8)]),
            10,
            &LayoutOptions::default(),
        )
        .unwrap();
        assert_eq!(layout.offsets(), &[0, 10, 32, 72]);
        assert_eq!(layout.total_size(), 192);
        assert_eq!(layout.alignment(), Alignment::new(64));
    }

    #[test]
    fn packed_columns_are_contiguous() {
        let layout = Layout::plan(
            columns(&[(3, 1), (5, 1), (6, 1), (7, 1)]),
            3,
            &LayoutOptions::default().with_block_alignment(Alignment::new(1)),
        )
        .unwrap();
        assert_eq!(layout.offsets(), &[0, 9, 24, 42]);
        assert_eq!(layout.total_size(), 63);
        assert_eq!(layout.alignment(), Alignment::new(1));
    }

    #[test]
    fn column_alignment_above_block() {
        let layout = Layout::plan(
            columns(&[(1, 1), (16, 16)]),
            3,
            &LayoutOptions::default().with_block_alignment(Alignment::new(8)),
        )
        .unwrap();
        assert_eq!(layout.offsets(), &[0, 16]);
        assert_eq!(layout.total_size(), 64);
        assert_eq!(layout.alignment(), Alignment::new(16));
    }

    #[rstest]
    #[case(&[(1, 1), (2, 2), (4, 4), (8, 8)])]
    #[case(&[(8, 8), (1, 1), (8, 8), (2, 2)])]
    #[case(&[(3, 1), (5, 1), (6, 1), (7, 1)])]
    #[case(&[(4, 4), (16, 16), (1, 1)])]
    #[case(&[(0, 1), (4, 4)])]
    fn layout_is_valid(
        #[case] sizes: &[(usize, usize)],
        #[values(0, 1, 3, 10, 1000)] capacity: usize,
        #[values(1, 8, 64)] block: usize,
    ) {
        let cols = columns(sizes);
        let options = LayoutOptions::default().with_block_alignment(Alignment::new(block));
        let layout = Layout::plan(cols.iter().copied(), capacity, &options).unwrap();

        assert_eq!(layout.offsets()[0], 0);
        for (i, (size, align)) in cols.iter().enumerate() {
            let offset = layout.offsets()[i];
            assert!(align.divides(offset));
            assert!(layout.alignment().is_aligned_to(*align));
            assert!(offset + capacity * size <= layout.total_size());
            if i > 0 {
                assert!(layout.offsets()[i - 1] + capacity * cols[i - 1].0 <= offset);
            }
        }
        assert!(Alignment::new(block).divides(layout.total_size()));
        if capacity == 0 {
            assert_eq!(layout.total_size(), 0);
        }
    }

    #[test]
    fn overflow_is_an_allocation_error() {
        let err = Layout::plan(
            columns(&[(8, 8), (8, 8)]),
            usize::MAX / 8,
            &LayoutOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SoaError::Allocation(..)));
    }
}
