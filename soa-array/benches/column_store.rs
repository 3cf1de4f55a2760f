#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use divan::Bencher;
use soa_array::{ColumnStore, RowStore};
use soa_dtype::PackedUInt;
use soa_error::SoaUnwrap;

fn main() {
    divan::main();
}

const ROWS: &[usize] = &[1_000, 100_000, 1_000_000];

type Native = (u8, u16, u32, u64);
type Packed = (PackedUInt<3>, PackedUInt<5>, PackedUInt<6>, PackedUInt<7>);

fn native(rows: usize) -> ColumnStore<Native> {
    let mut store = ColumnStore::try_new(rows).unwrap();
    store
        .map_range_with_index::<Native>(
            &[0, 1, 2, 3],
            ..,
            |i, (a, b, c, d): (&mut u8, &mut u16, &mut u32, &mut u64)| {
                *a = i as u8;
                *b = i as u16;
                *c = i as u32;
                *d = i as u64;
            },
        )
        .soa_unwrap();
    store
}

#[divan::bench(args = ROWS)]
fn try_new(bencher: Bencher, rows: usize) {
    bencher.bench(|| ColumnStore::<Native>::try_new(rows).unwrap());
}

#[divan::bench(args = ROWS)]
fn sum_single_column(bencher: Bencher, rows: usize) {
    let store = native(rows);
    bencher.bench(|| {
        store
            .column::<u32>(2)
            .unwrap()
            .iter()
            .map(|v| u64::from(*v))
            .sum::<u64>()
    });
}

#[divan::bench(args = ROWS)]
fn sum_column_pair(bencher: Bencher, rows: usize) {
    let store = native(rows);
    bencher.bench(|| {
        store
            .select::<(u8, u16)>(&[0, 1])
            .unwrap()
            .iter()
            .map(|(a, b)| u64::from(*a) + u64::from(*b))
            .sum::<u64>()
    });
}

#[divan::bench(args = ROWS)]
fn sum_all_columns(bencher: Bencher, rows: usize) {
    let store = native(rows);
    bencher.bench(|| {
        store
            .columns()
            .iter()
            .map(|(a, b, c, d)| u64::from(*a) + u64::from(*b) + u64::from(*c) + *d)
            .sum::<u64>()
    });
}

#[divan::bench(args = ROWS)]
fn sum_all_rows(bencher: Bencher, rows: usize) {
    let mut store = RowStore::<Native>::try_new(rows).unwrap();
    store
        .map_range_with_index(
            ..,
            |i, (a, b, c, d): (&mut u8, &mut u16, &mut u32, &mut u64)| {
                *a = i as u8;
                *b = i as u16;
                *c = i as u32;
                *d = i as u64;
            },
        )
        .unwrap();
    bencher.bench(|| {
        store
            .rows()
            .iter()
            .map(|(a, b, c, d)| u64::from(*a) + u64::from(*b) + u64::from(*c) + *d)
            .sum::<u64>()
    });
}

#[divan::bench(args = ROWS)]
fn sum_packed_columns(bencher: Bencher, rows: usize) {
    let mut store = ColumnStore::<Packed>::try_new(rows).unwrap();
    store
        .columns_mut()
        .map_range_with_index(
            ..,
            |i,
             (a, b, c, d): (
                &mut PackedUInt<3>,
                &mut PackedUInt<5>,
                &mut PackedUInt<6>,
                &mut PackedUInt<7>,
            )| {
                *a = PackedUInt::from(i);
                *b = PackedUInt::from(i);
                *c = PackedUInt::from(i);
                *d = PackedUInt::from(i);
            },
        )
        .unwrap();
    bencher.bench(|| {
        store
            .columns()
            .iter()
            .map(|(a, b, c, d)| *a + *b + *c + *d)
            .sum::<u64>()
    });
}

#[divan::bench(args = ROWS)]
fn resize_double(bencher: Bencher, rows: usize) {
    let store = native(rows);
    bencher.bench(|| store.resize(rows * 2).unwrap());
}

#[divan::bench(args = ROWS)]
fn project_two_columns(bencher: Bencher, rows: usize) {
    let store = native(rows);
    bencher.bench(|| store.project::<(u64, u8)>(&[3, 0]).unwrap());
}
