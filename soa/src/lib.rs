//! Structure-of-arrays column store.
//!
//! Re-exports the column store, views and cursors at the top level, and each supporting crate as
//! a module.

pub use soa_array::*;
pub use {soa_buffer as buffer, soa_dtype as dtype, soa_error as error};
