//! Shape tools: stride computation, shape-broadcast resolution, and
//! item-count, grounded on `ndarray`'s `dimension/mod.rs` and
//! `dimension/broadcast.rs`.

mod broadcast;
mod strides;

pub use broadcast::{broadcast_shapes, broadcast_strides};
pub use strides::{calc_strides, is_c_contiguous, nitems};

/// Maximum supported number of dimensions.
pub const MAX_NDIM: usize = 32;

/// Maximum number of arrays a single broadcasting multi-iterator can track.
pub const MAX_MULTIITER: usize = 32;
