#![deny(missing_docs)]

//! Column element types for the structure-of-arrays column store.
//!
//! This crate defines which types may be stored in a column ([`ColumnElement`]), the per-column
//! descriptor used to plan a store's layout ([`ColumnDescriptor`]), and [`PackedUInt`], an
//! unsigned integer stored in fewer than eight bytes to shrink a column's footprint.

pub use descriptor::*;
pub use element::*;
pub use packed::*;

mod descriptor;
mod element;
mod packed;
