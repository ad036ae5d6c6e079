//! `NMultiIter`: a broadcasting multi-array iterator, the runtime-shape
//! analogue of `ndarray`'s `Zip`.

use rawpointer::PointerExt;

use crate::error::{value_err, NResult};
use crate::node::Node;
use crate::shape::{self, MAX_MULTIITER};

/// Walks up to [`MAX_MULTIITER`] arrays in lock-step over their common
/// broadcast shape, yielding one raw pointer per array per step. Inputs
/// narrower than the broadcast shape are traversed with zero strides on the
/// broadcast axes, so the same element is revisited as many times as the
/// output requires.
pub struct NMultiIter
{
    shape: Vec<usize>,
    ptrs: Vec<*mut u8>,
    strides: Vec<Vec<isize>>,
    index: Option<Vec<usize>>,
}

impl NMultiIter
{
    pub fn new(nodes: &[&Node]) -> NResult<NMultiIter>
    {
        crate::error::with_error_channel(|| {
            if nodes.len() > MAX_MULTIITER {
                return Err(value_err!("cannot iterate {} arrays at once, limit is {}", nodes.len(), MAX_MULTIITER));
            }
            let shapes: Vec<Vec<usize>> = nodes.iter().map(|n| n.shape()).collect();
            let shape_refs: Vec<&[usize]> = shapes.iter().map(|s| s.as_slice()).collect();
            let out_shape = shape::broadcast_shapes(&shape_refs)?;

            let mut ptrs = Vec::with_capacity(nodes.len());
            let mut strides = Vec::with_capacity(nodes.len());
            for node in nodes {
                ptrs.push(node.data_mut_ptr());
                strides.push(shape::broadcast_strides(&node.shape(), &node.strides(), &out_shape));
            }
            let index = if out_shape.iter().any(|&d| d == 0) { None } else { Some(vec![0usize; out_shape.len()]) };
            Ok(NMultiIter { shape: out_shape, ptrs, strides, index })
        })
    }

    pub fn shape(&self) -> &[usize]
    {
        &self.shape
    }

    pub fn narity(&self) -> usize
    {
        self.ptrs.len()
    }

    #[inline]
    pub fn not_done(&self) -> bool
    {
        self.index.is_some()
    }

    /// Pointers to the current element in each input, in the order the
    /// nodes were given to [`NMultiIter::new`].
    pub fn items(&self) -> Vec<*mut u8>
    {
        let idx = self.index.as_ref().expect("NMultiIter::items called after exhaustion");
        self.ptrs
            .iter()
            .zip(self.strides.iter())
            .map(|(&ptr, strides)| {
                let mut ptr = ptr;
                for (axis, &ix) in idx.iter().enumerate() {
                    unsafe { ptr = ptr.stride_offset(strides[axis], ix) };
                }
                ptr
            })
            .collect()
    }

    pub fn reset(&mut self)
    {
        self.index = if self.shape.iter().any(|&d| d == 0) { None } else { Some(vec![0usize; self.shape.len()]) };
    }

    fn advance(&mut self)
    {
        let Some(idx) = self.index.as_mut() else { return };
        if idx.is_empty() {
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

impl Iterator for NMultiIter
{
    type Item = Vec<*mut u8>;

    fn next(&mut self) -> Option<Vec<*mut u8>>
    {
        if !self.not_done() {
            return None;
        }
        let items = self.items();
        self.advance();
        Some(items)
    }
}
