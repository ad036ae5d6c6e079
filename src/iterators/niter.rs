//! `NIter`: a single-array strided element iterator, the runtime-shape
//! analogue of `ndarray`'s `Baseiter` odometer.

use rawpointer::PointerExt;

use crate::node::Node;

/// Walks every element of a node in row-major logical order, yielding a raw
/// pointer to each element's bytes. Works uniformly whether the node is
/// C-contiguous or arbitrarily strided; `is_contiguous()` is exposed so
/// callers can opt into a `memcpy`-style fast path instead.
pub struct NIter
{
    ptr: *mut u8,
    shape: Vec<usize>,
    strides: Vec<isize>,
    contiguous: bool,
    itemsize: usize,
    index: Option<Vec<usize>>,
}

impl NIter
{
    pub fn new(node: &Node) -> NIter
    {
        let shape = node.shape();
        let strides = node.strides();
        let contiguous = node.is_contiguous();
        let itemsize = node.dtype().size();
        let ptr = node.data_mut_ptr();
        let index = if shape.iter().any(|&d| d == 0) { None } else { Some(vec![0usize; shape.len()]) };
        NIter { ptr, shape, strides, contiguous, itemsize, index }
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool
    {
        self.contiguous
    }

    #[inline]
    pub fn itemsize(&self) -> usize
    {
        self.itemsize
    }

    /// Total element count this iterator will yield, unaffected by how far
    /// it has already advanced.
    pub fn len(&self) -> usize
    {
        self.shape.iter().product()
    }

    #[inline]
    pub fn not_done(&self) -> bool
    {
        self.index.is_some()
    }

    /// Pointer to the current element. Panics if the iterator is exhausted.
    pub fn item(&self) -> *mut u8
    {
        let idx = self.index.as_ref().expect("NIter::item called after exhaustion");
        let mut ptr = self.ptr;
        for (axis, &ix) in idx.iter().enumerate() {
            unsafe { ptr = ptr.stride_offset(self.strides[axis], ix) };
        }
        ptr
    }

    /// Rewind to the first element.
    pub fn reset(&mut self)
    {
        self.index = if self.shape.iter().any(|&d| d == 0) { None } else { Some(vec![0usize; self.shape.len()]) };
    }

    fn advance(&mut self)
    {
        let Some(idx) = self.index.as_mut() else { return };
        if idx.is_empty() {
            // 0-d scalar: exactly one element.
            self.index = None;
            return;
        }
        for axis in (0..idx.len()).rev() {
            idx[axis] += 1;
            if idx[axis] < self.shape[axis] {
                return;
            }
            idx[axis] = 0;
            if axis == 0 {
                self.index = None;
                return;
            }
        }
    }
}

impl Iterator for NIter
{
    type Item = *mut u8;

    fn next(&mut self) -> Option<*mut u8>
    {
        if !self.not_done() {
            return None;
        }
        let item = self.item();
        self.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        let n = self.len();
        (n, Some(n))
    }
}
