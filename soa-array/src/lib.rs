//! A structure-of-arrays column store.
//!
//! A [`ColumnStore`] keeps one contiguous array per column inside a single aligned allocation.
//! The set of columns is the store's type parameter, a tuple of [`ColumnElement`] types such as
//! `(u8, u16, u32, u64)`, and is fixed for the lifetime of the store. The byte offset of every
//! column is computed once by the [`Layout`] planner.
//!
//! Rows are never materialized as a combined object. Accessors hand out one reference per column,
//! and batch operations work on zipped views over a subset of columns ([`ColumnsRef`],
//! [`ColumnsMut`]) or on a raw [`RowCursor`] that advances every column pointer in lockstep.
//!
//! ```
//! use soa_array::ColumnStore;
//!
//! let mut store = ColumnStore::<(u8, u16, u32, u64)>::try_new(10).unwrap();
//! store.set(3, (1, 2, 3, 4)).unwrap();
//!
//! let store = store.resize(20).unwrap();
//! assert_eq!(store.read(3).unwrap(), (1, 2, 3, 4));
//! assert_eq!(store.read(15).unwrap(), (0, 0, 0, 0));
//! ```
//!
//! [`ColumnElement`]: soa_dtype::ColumnElement

pub use columns::*;
pub use cursor::*;
pub use layout::*;
pub use owned::*;
pub use row_store::*;
pub use schema::*;
pub use store::*;
pub use zip::*;

mod columns;
mod cursor;
mod layout;
mod owned;
mod range;
mod row_store;
mod schema;
mod sort;
mod store;
mod zip;
