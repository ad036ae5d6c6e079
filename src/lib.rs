//! `ndcore` is a strided, multidimensional, runtime-typed numeric array
//! core: a reference-counted [`Node`](node::Node) descriptor over a shared
//! byte buffer, dispatched at runtime over an eleven-member
//! [`DType`](dtype::DType) registry instead of a compile-time element type.
//!
//! - [`Node`](node::Node): the owning/viewing array descriptor — shape,
//!   strides, dtype, and a reference-counted base chain for views.
//! - [`NArray`](narray::NArray): a lightweight, non-reference-counted
//!   descriptor used for index/mask operands.
//! - [`iterators`]: single-array (`NIter`), broadcasting multi-array
//!   (`NMultiIter`), and sliding-window (`NWindowIter`) strided iteration.
//! - [`shape`] / [`shape_ops`]: broadcasting, stride computation, and the
//!   view-or-mutate-in-place shape transformations (reshape, transpose,
//!   squeeze, ...).
//! - [`indexing`]: basic slicing, boolean/integer fancy indexing, and
//!   take/put.
//! - [`convert`]: the dtype x dtype conversion matrix.
//! - [`math`]: elementwise arithmetic, comparison, logical and bitwise
//!   kernels.
//! - [`reductions`] / [`cumulative`]: axis reductions (`sum`, `argmax`,
//!   `all`, ...) and single-axis scans (`cumsum`, `diff`, `gradient`, ...).
//! - [`error`]: the crate's `Result`-based error type, plus a thread-local
//!   last-error channel for callers that prefer to poll rather than
//!   propagate.
//!
//! Every numeric kernel is written once, generic over
//! [`elem::NumElem`]/[`elem::FloatElem`], and instantiated per dtype at the
//! dispatch boundary described in [`dispatch`] — there is no per-dtype
//! code generation and no virtual dispatch through function-pointer
//! tables.

mod buffer;
pub mod convert;
pub mod cumulative;
pub mod dispatch;
pub mod dtype;
pub mod elem;
pub mod error;
mod flags;
pub mod indexing;
pub mod iterators;
pub mod math;
pub mod narray;
pub mod node;
pub mod reductions;
pub mod shape;
pub mod shape_ops;

pub use dtype::DType;
pub use error::{ErrorKind, NError, NResult};
pub use narray::NArray;
pub use node::Node;
