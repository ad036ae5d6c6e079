//! `NWindowIter`: a sliding-window view iterator along one axis, grounded on
//! `ndarray`'s `iterators/windows.rs` (`ArrayBase::windows`), generalised
//! with an explicit stride and dilation between windows.

use crate::error::{value_err, NResult};
use crate::node::Node;

/// Produces a sequence of views into `base`, each a window of length
/// `window` along `axis`, advancing by `stride` elements between
/// consecutive windows and sampling every `dilation`-th element within a
/// window (dilation 1 = contiguous window).
pub struct NWindowIter
{
    base: Node,
    axis: usize,
    window: usize,
    stride: usize,
    dilation: usize,
    num_windows: usize,
    pos: usize,
}

impl NWindowIter
{
    pub fn new(node: &Node, axis: usize, window: usize, stride: usize, dilation: usize) -> NResult<NWindowIter>
    {
        crate::error::with_error_channel(|| {
            if axis >= node.ndim() {
                return Err(value_err!("axis {} out of range for {}-d array", axis, node.ndim()));
            }
            if window == 0 || stride == 0 || dilation == 0 {
                return Err(value_err!("window, stride and dilation must all be positive"));
            }
            let extent = node.shape()[axis];
            let span = (window - 1)
                .checked_mul(dilation)
                .and_then(|v| v.checked_add(1))
                .ok_or_else(|| value_err!("window span overflow"))?;
            if span > extent {
                return Err(value_err!("window span {} exceeds axis {} extent {}", span, axis, extent));
            }
            let num_windows = (extent - span) / stride + 1;
            Ok(NWindowIter { base: node.clone(), axis, window, stride, dilation, num_windows, pos: 0 })
        })
    }

    pub fn len(&self) -> usize
    {
        self.num_windows - self.pos
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }
}

impl Iterator for NWindowIter
{
    type Item = Node;

    fn next(&mut self) -> Option<Node>
    {
        if self.pos >= self.num_windows {
            return None;
        }
        let mut shape = self.base.shape();
        let mut strides = self.base.strides();
        let axis_stride = strides[self.axis];
        let start = self.pos * self.stride;
        let offset = self.base.offset() + start as isize * axis_stride;
        shape[self.axis] = self.window;
        strides[self.axis] = axis_stride * self.dilation as isize;
        self.pos += 1;
        Some(Node::view_from_parts(&self.base, shape, strides, offset, self.base.dtype()))
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        let n = self.len();
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests
{
    use crate::dtype::DType;
    use crate::node::Node;

    use super::NWindowIter;

    #[test]
    fn counts_overlapping_windows()
    {
        let n = Node::new_empty(&[10], DType::Int32).unwrap();
        let w = NWindowIter::new(&n, 0, 3, 1, 1).unwrap();
        assert_eq!(w.count(), 8);
    }

    #[test]
    fn strided_windows_cover_fewer_positions()
    {
        let n = Node::new_empty(&[10], DType::Int32).unwrap();
        let w = NWindowIter::new(&n, 0, 3, 3, 1).unwrap();
        assert_eq!(w.count(), 3);
    }

    #[test]
    fn rejects_window_wider_than_axis()
    {
        let n = Node::new_empty(&[2], DType::Int32).unwrap();
        assert!(NWindowIter::new(&n, 0, 3, 1, 1).is_err());
    }
}
