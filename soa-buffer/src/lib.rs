#![deny(missing_docs)]

//! Aligned byte allocations for the column store.
//!
//! A column store keeps every column inside one allocation. The allocation is aligned to at least
//! the largest column alignment so that each column's base address, computed as a byte offset from
//! the start of the allocation, is correctly aligned for its element type.
//!
//! # Ownership
//! An [`AlignedBytes`] exclusively owns its allocation and releases it exactly once, when it is
//! dropped. Allocations are never shared between two live owners.

pub use aligned::*;
pub use alignment::*;
pub use debug::*;

mod aligned;
mod alignment;
mod debug;
