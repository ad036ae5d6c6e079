//! Indexing: basic slicing, boolean/integer fancy indexing, and take/put,
//! grounded on `ndarray`'s `impl_methods.rs` slicing machinery and `si.rs`
//! slice-spec types, generalised to runtime rank and an explicit
//! dtype-tagged index argument.

mod fancy;
mod slice;
mod take_put;

pub use fancy::{advanced_index, boolean_mask, index_with_boolean_array, index_with_int_array};
pub use slice::{multi_slice, slice, SliceRule};
pub use take_put::{put, take, Mode};
