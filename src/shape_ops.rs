//! Shape-reinterpreting operations, grounded on `ndarray`'s
//! `impl_methods.rs` (`reshape`, `into_shape`, `swap_axes`, `permuted_axes`,
//! `insert_axis`) — here made runtime-dtype and runtime-rank.
//!
//! Every operation here follows one uniform rule: when the node's
//! `ref_count()` is `1` and no other handle can observe the change, the
//! node's own shape/strides are rewritten in place
//! ([`Node::set_shape_strides`]); otherwise a new view is returned that
//! shares the same buffer and keeps the original node alive as its `base`.

use crate::dtype::DType;
use crate::error::{value_err, NResult};
use crate::node::Node;
use crate::shape;

/// Whether a shape-op on `node` may mutate it in place instead of
/// allocating a view: only when `node` is the sole live handle to its
/// descriptor.
fn can_mutate_in_place(node: &Node) -> bool
{
    node.ref_count() == 1
}

/// Reinterpret `node`'s flat element sequence (in its current iteration
/// order) as `new_shape`. Requires `node` to be contiguous; non-contiguous
/// inputs need an explicit `copy` first, matching `ndarray::reshape`'s
/// behaviour of erroring rather than silently copying.
pub fn reshape(node: &Node, new_shape: &[usize]) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        if !node.is_contiguous() {
            return Err(value_err!("reshape requires a contiguous array; call copy() first"));
        }
        if shape::nitems(new_shape) != node.nitems() {
            return Err(value_err!(
                "cannot reshape array of size {} into shape {:?}",
                node.nitems(),
                new_shape
            ));
        }
        let strides = shape::calc_strides(new_shape, node.dtype().size());
        if can_mutate_in_place(node) {
            node.set_shape_strides(new_shape.to_vec(), strides, true);
            Ok(node.clone())
        } else {
            Ok(Node::view_from_parts(node, new_shape.to_vec(), strides, node.offset(), node.dtype()))
        }
    })
}

/// Flatten to 1-D, always returning a freshly-owned contiguous copy (the
/// "flatten" convention of always copying, as distinct from `ravel`).
pub fn flatten(node: &Node) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let contiguous = crate::convert::to_contiguous_bytes(node)?;
        Ok(Node::from_owned_bytes(contiguous, &[node.nitems()], node.dtype()))
    })
}

/// Flatten to 1-D, reusing the existing buffer when `node` is already
/// contiguous (falls back to `flatten`'s copying behaviour otherwise).
pub fn ravel(node: &Node) -> NResult<Node>
{
    if node.is_contiguous() {
        reshape(node, &[node.nitems()])
    } else {
        flatten(node)
    }
}

/// Remove all axes of extent 1 from `node`'s shape (or only `axis`, if
/// given — erroring if that axis does not have extent 1).
pub fn squeeze(node: &Node, axis: Option<usize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let shape = node.shape();
        let strides = node.strides();
        let mut new_shape = Vec::with_capacity(shape.len());
        let mut new_strides = Vec::with_capacity(shape.len());
        match axis {
            Some(ax) => {
                if ax >= shape.len() {
                    return Err(value_err!("axis {} out of range for {}-d array", ax, shape.len()));
                }
                if shape[ax] != 1 {
                    return Err(value_err!("cannot squeeze axis {} with extent {}", ax, shape[ax]));
                }
                for i in 0..shape.len() {
                    if i != ax {
                        new_shape.push(shape[i]);
                        new_strides.push(strides[i]);
                    }
                }
            }
            None => {
                for i in 0..shape.len() {
                    if shape[i] != 1 {
                        new_shape.push(shape[i]);
                        new_strides.push(strides[i]);
                    }
                }
            }
        }
        Ok(Node::view_from_parts(node, new_shape, new_strides, node.offset(), node.dtype()))
    })
}

/// Insert a new axis of extent 1 before position `axis` (`0..=ndim`).
pub fn expand_dims(node: &Node, axis: usize) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let mut shape = node.shape();
        let mut strides = node.strides();
        if axis > shape.len() {
            return Err(value_err!("axis {} out of range for insertion into {}-d array", axis, shape.len()));
        }
        // The new axis has extent 1, so any stride is never read through it;
        // conventionally it takes the stride of the axis it displaces (or the
        // itemsize, at the end), matching `ndarray::insert_axis`.
        let new_stride = if axis < strides.len() { strides[axis] } else { node.dtype().size() as isize };
        shape.insert(axis, 1);
        strides.insert(axis, new_stride);
        Ok(Node::view_from_parts(node, shape, strides, node.offset(), node.dtype()))
    })
}

/// Reorder every axis of `node` according to `permutation`, a list of the
/// source axis index for each destination position.
pub fn permute_dims(node: &Node, permutation: &[usize]) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let shape = node.shape();
        if permutation.len() != shape.len() {
            return Err(value_err!("permutation length {} does not match ndim {}", permutation.len(), shape.len()));
        }
        let mut seen = vec![false; shape.len()];
        for &ax in permutation {
            if ax >= shape.len() || seen[ax] {
                return Err(value_err!("invalid permutation {:?} for {}-d array", permutation, shape.len()));
            }
            seen[ax] = true;
        }
        let strides = node.strides();
        let new_shape: Vec<usize> = permutation.iter().map(|&ax| shape[ax]).collect();
        let new_strides: Vec<isize> = permutation.iter().map(|&ax| strides[ax]).collect();
        Ok(Node::view_from_parts(node, new_shape, new_strides, node.offset(), node.dtype()))
    })
}

/// Full axis reversal (the no-argument case of `transpose`/`.T`).
pub fn transpose(node: &Node) -> NResult<Node>
{
    let rev: Vec<usize> = (0..node.ndim()).rev().collect();
    permute_dims(node, &rev)
}

/// Swap the last two axes only, leaving batch axes untouched; requires at
/// least 2 dimensions.
pub fn matrix_transpose(node: &Node) -> NResult<Node>
{
    if node.ndim() < 2 {
        return Err(value_err!("matrix_transpose requires at least 2 dimensions, got {}", node.ndim()));
    }
    swapaxes(node, node.ndim() - 2, node.ndim() - 1)
}

/// Swap two arbitrary axes.
pub fn swapaxes(node: &Node, a: usize, b: usize) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let ndim = node.ndim();
        if a >= ndim || b >= ndim {
            return Err(value_err!("axis out of range for {}-d array: {} / {}", ndim, a, b));
        }
        let mut perm: Vec<usize> = (0..ndim).collect();
        perm.swap(a, b);
        permute_dims(node, &perm)
    })
}

/// Move the axis at `source` to position `destination`, shifting the axes
/// in between (NumPy's `moveaxis`).
pub fn moveaxis(node: &Node, source: usize, destination: usize) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let ndim = node.ndim();
        if source >= ndim || destination >= ndim {
            return Err(value_err!("axis out of range for {}-d array: {} / {}", ndim, source, destination));
        }
        let mut order: Vec<usize> = (0..ndim).filter(|&ax| ax != source).collect();
        order.insert(destination, source);
        permute_dims(node, &order)
    })
}

/// Move the axis at `axis` to position `start` (legacy NumPy `rollaxis`
/// convention, where the moved axis lands *before* the named `start`
/// position rather than replacing it).
pub fn rollaxis(node: &Node, axis: usize, start: usize) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let ndim = node.ndim();
        if axis >= ndim {
            return Err(value_err!("axis {} out of range for {}-d array", axis, ndim));
        }
        if start > ndim {
            return Err(value_err!("start {} out of range for {}-d array", start, ndim));
        }
        let dest = if axis < start { start - 1 } else { start };
        moveaxis(node, axis, dest)
    })
}

/// Resize `node`'s buffer in place to `new_shape`, zero-filling newly
/// exposed elements and discarding any past the new extent. Always
/// reallocates (the result is contiguous, owning, and independent of
/// `node`'s previous buffer), matching `ndarray`'s non-view-preserving
/// `resize` semantics rather than NumPy's in-place `ndarray.resize`.
pub fn resize(node: &Node, new_shape: &[usize]) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let new_nbytes = shape::nitems(new_shape) * node.dtype().size();
        let mut bytes = vec![0u8; new_nbytes];
        let old_bytes = crate::convert::to_contiguous_bytes(node)?;
        let n = old_bytes.len().min(bytes.len());
        bytes[..n].copy_from_slice(&old_bytes[..n]);
        Ok(Node::from_owned_bytes(bytes, new_shape, node.dtype()))
    })
}

/// Broadcast `node` to `target_shape`, returning a zero-stride view on the
/// broadcast axes. Errors if `node`'s shape is not broadcast-compatible
/// with `target_shape`.
pub fn broadcast_to(node: &Node, target_shape: &[usize]) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let node_shape = node.shape();
        let resolved = shape::broadcast_shapes(&[node_shape.as_slice(), target_shape])?;
        if resolved != target_shape {
            return Err(value_err!("cannot broadcast shape {:?} to {:?}", node.shape(), target_shape));
        }
        let strides = shape::broadcast_strides(&node.shape(), &node.strides(), target_shape);
        Ok(Node::view_from_parts(node, target_shape.to_vec(), strides, node.offset(), node.dtype()))
    })
}
