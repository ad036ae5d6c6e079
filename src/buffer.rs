//! Flat byte buffer allocation, the byte-oriented analogue of `ndarray`'s
//! `data_repr::OwnedRepr` (a `Vec`-backed store with non-unique ownership
//! semantics). Since dtype is resolved at runtime here rather than at
//! compile time, the buffer itself is untyped bytes; typed access happens
//! at the iterator/kernel boundary (`src/elem.rs`, `src/iterators`).

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted flat byte buffer shared between a `Node` and every
/// view derived from it.
pub type SharedBuffer = Rc<RefCell<Vec<u8>>>;

/// Allocate a zero-filled buffer of `len` bytes.
pub fn alloc_zeroed(len: usize) -> SharedBuffer
{
    Rc::new(RefCell::new(vec![0u8; len]))
}

/// Wrap an existing byte vector (taking ownership, no copy).
pub fn from_vec(v: Vec<u8>) -> SharedBuffer
{
    Rc::new(RefCell::new(v))
}
