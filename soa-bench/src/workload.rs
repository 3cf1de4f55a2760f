use std::fmt::Display;

use soa::dtype::{ColumnElement, PackedUInt};
use soa::{ColumnStore, RowStore};

use crate::StoreLayout;

/// A column element the bench can fill from a row index and sum as `u64`.
pub trait AsU64: ColumnElement {
    /// The row index truncated to the width of the element.
    fn truncated(index: u64) -> Self;

    fn as_u64(self) -> u64;
}

macro_rules! native_as_u64 {
    ($($T:ty),*) => {
        $(
            impl AsU64 for $T {
                #[allow(clippy::cast_possible_truncation)]
                #[inline]
                fn truncated(index: u64) -> Self {
                    index as $T
                }

                #[inline]
                fn as_u64(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

native_as_u64!(u8, u16, u32, u64);

impl<const N: usize> AsU64 for PackedUInt<N> {
    #[inline]
    fn truncated(index: u64) -> Self {
        PackedUInt::new(index)
    }

    #[inline]
    fn as_u64(self) -> u64 {
        self.get()
    }
}

/// The sums timed against each layout.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Workload {
    /// One column on its own.
    Column(usize),
    /// Columns 0 and 1 together.
    LeadingPair,
    /// Columns 2 and 3 together.
    TrailingPair,
    AllColumns,
}

impl Workload {
    pub const ALL: [Workload; 7] = [
        Workload::Column(0),
        Workload::Column(1),
        Workload::Column(2),
        Workload::Column(3),
        Workload::LeadingPair,
        Workload::TrailingPair,
        Workload::AllColumns,
    ];
}

impl Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Workload::Column(c) => write!(f, "sum-column-{c}"),
            Workload::LeadingPair => write!(f, "sum-columns-0-1"),
            Workload::TrailingPair => write!(f, "sum-columns-2-3"),
            Workload::AllColumns => write!(f, "sum-all-columns"),
        }
    }
}

/// A store of four integer columns the bench sums over.
pub trait SumColumns {
    /// Write the row index, truncated to each column's width, into every column.
    fn fill(&mut self) -> anyhow::Result<()>;

    fn sum(&self, workload: Workload) -> anyhow::Result<u64>;
}

impl<A, B, C, D> SumColumns for ColumnStore<(A, B, C, D)>
where
    A: AsU64,
    B: AsU64,
    C: AsU64,
    D: AsU64,
{
    fn fill(&mut self) -> anyhow::Result<()> {
        self.map_range_with_index::<(A, B, C, D)>(
            &[0, 1, 2, 3],
            ..,
            |i, (a, b, c, d): (&mut A, &mut B, &mut C, &mut D)| {
                let i = i as u64;
                *a = A::truncated(i);
                *b = B::truncated(i);
                *c = C::truncated(i);
                *d = D::truncated(i);
            },
        )?;
        Ok(())
    }

    fn sum(&self, workload: Workload) -> anyhow::Result<u64> {
        let sum = match workload {
            Workload::Column(0) => sum_slice(self.column::<A>(0)?),
            Workload::Column(1) => sum_slice(self.column::<B>(1)?),
            Workload::Column(2) => sum_slice(self.column::<C>(2)?),
            Workload::Column(3) => sum_slice(self.column::<D>(3)?),
            Workload::Column(c) => anyhow::bail!("no column {c} in a store of 4 columns"),
            Workload::LeadingPair => self
                .select::<(A, B)>(&[0, 1])?
                .iter()
                .map(|(a, b): (&A, &B)| a.as_u64() + b.as_u64())
                .sum(),
            Workload::TrailingPair => self
                .select::<(C, D)>(&[2, 3])?
                .iter()
                .map(|(c, d): (&C, &D)| c.as_u64() + d.as_u64())
                .sum(),
            Workload::AllColumns => self
                .columns()
                .iter()
                .map(|(a, b, c, d): (&A, &B, &C, &D)| {
                    a.as_u64() + b.as_u64() + c.as_u64() + d.as_u64()
                })
                .sum(),
        };
        Ok(sum)
    }
}

impl<A, B, C, D> SumColumns for RowStore<(A, B, C, D)>
where
    A: AsU64,
    B: AsU64,
    C: AsU64,
    D: AsU64,
{
    fn fill(&mut self) -> anyhow::Result<()> {
        self.map_range_with_index(.., |i, (a, b, c, d): (&mut A, &mut B, &mut C, &mut D)| {
            let i = i as u64;
            *a = A::truncated(i);
            *b = B::truncated(i);
            *c = C::truncated(i);
            *d = D::truncated(i);
        })?;
        Ok(())
    }

    fn sum(&self, workload: Workload) -> anyhow::Result<u64> {
        let rows = self.rows().iter();
        let sum = match workload {
            Workload::Column(0) => rows.map(|r| r.0.as_u64()).sum(),
            Workload::Column(1) => rows.map(|r| r.1.as_u64()).sum(),
            Workload::Column(2) => rows.map(|r| r.2.as_u64()).sum(),
            Workload::Column(3) => rows.map(|r| r.3.as_u64()).sum(),
            Workload::Column(c) => anyhow::bail!("no column {c} in a store of 4 columns"),
            Workload::LeadingPair => rows.map(|r| r.0.as_u64() + r.1.as_u64()).sum(),
            Workload::TrailingPair => rows.map(|r| r.2.as_u64() + r.3.as_u64()).sum(),
            Workload::AllColumns => rows
                .map(|r| r.0.as_u64() + r.1.as_u64() + r.2.as_u64() + r.3.as_u64())
                .sum(),
        };
        Ok(sum)
    }
}

fn sum_slice<T: AsU64>(values: &[T]) -> u64 {
    values.iter().map(|v| v.as_u64()).sum()
}

pub type NativeRow = (u8, u16, u32, u64);
pub type PackedRow = (PackedUInt<1>, PackedUInt<2>, PackedUInt<4>, PackedUInt<8>);
pub type PackedOddRow = (PackedUInt<3>, PackedUInt<5>, PackedUInt<6>, PackedUInt<7>);

/// Allocate and fill a store of `rows` rows in the given layout.
pub fn filled_store(layout: StoreLayout, rows: usize) -> anyhow::Result<Box<dyn SumColumns>> {
    let mut store: Box<dyn SumColumns> = match layout {
        StoreLayout::Columns => Box::new(ColumnStore::<NativeRow>::try_new(rows)?),
        StoreLayout::Packed => Box::new(ColumnStore::<PackedRow>::try_new(rows)?),
        StoreLayout::Rows => Box::new(RowStore::<NativeRow>::try_new(rows)?),
        StoreLayout::PackedOdd => Box::new(ColumnStore::<PackedOddRow>::try_new(rows)?),
    };
    store.fill()?;
    Ok(store)
}

/// The number of bytes a store of `rows` rows occupies in the given layout.
pub fn store_size(layout: StoreLayout, rows: usize) -> anyhow::Result<usize> {
    Ok(match layout {
        StoreLayout::Columns => ColumnStore::<NativeRow>::size_bytes(rows)?,
        StoreLayout::Packed => ColumnStore::<PackedRow>::size_bytes(rows)?,
        StoreLayout::Rows => RowStore::<NativeRow>::size_bytes(rows)?,
        StoreLayout::PackedOdd => ColumnStore::<PackedOddRow>::size_bytes(rows)?,
    })
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use crate::StoreLayout;
    use crate::workload::{Workload, filled_store, store_size};

    #[rstest]
    #[case(StoreLayout::Packed)]
    #[case(StoreLayout::Rows)]
    fn layouts_agree_with_native_columns(#[case] layout: StoreLayout) {
        let native = filled_store(StoreLayout::Columns, 1000).unwrap();
        let other = filled_store(layout, 1000).unwrap();
        for workload in Workload::ALL {
            assert_eq!(
                native.sum(workload).unwrap(),
                other.sum(workload).unwrap(),
                "{workload}"
            );
        }
    }

    #[test]
    fn sums_of_row_indices() {
        // 0 + 1 + ... + 99 per column, below every column's width
        let store = filled_store(StoreLayout::PackedOdd, 100).unwrap();
        assert_eq!(store.sum(Workload::Column(2)).unwrap(), 4950);
        assert_eq!(store.sum(Workload::LeadingPair).unwrap(), 9900);
        assert_eq!(store.sum(Workload::AllColumns).unwrap(), 4 * 4950);
        assert!(store.sum(Workload::Column(4)).is_err());

        // u8 wraps every 256 rows
        let store = filled_store(StoreLayout::Columns, 512).unwrap();
        assert_eq!(store.sum(Workload::Column(0)).unwrap(), 2 * 255 * 128);
        assert_eq!(store.sum(Workload::Column(1)).unwrap(), 511 * 256);
    }

    #[test]
    fn sizes() {
        assert_eq!(store_size(StoreLayout::Columns, 10).unwrap(), 192);
        assert_eq!(store_size(StoreLayout::Rows, 10).unwrap(), 160);
        assert_eq!(store_size(StoreLayout::PackedOdd, 0).unwrap(), 0);
    }
}
