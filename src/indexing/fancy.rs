//! Fancy (advanced) indexing: boolean masks and integer-array gathers,
//! grounded on the same `NIter`/strided-access pattern as basic slicing but
//! always materialising a fresh, owning, contiguous result — the selected
//! elements are not expressible as a single stride pattern in general, so
//! advanced indexing never returns a view.

use crate::dtype::DType;
use crate::error::{index_err, type_err, value_err, NResult};
use crate::iterators::NIter;
use crate::narray::NArray;
use crate::node::Node;
use crate::shape;

/// Select every element of `node` where the identically-shaped boolean
/// `mask` is `true`, flattened to 1-D in row-major order.
pub fn boolean_mask(node: &Node, mask: &NArray) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        if mask.dtype() != DType::Bool {
            return Err(type_err!("boolean_mask requires a bool mask, got {}", mask.dtype()));
        }
        if mask.shape() != node.shape().as_slice() {
            return Err(value_err!("mask shape {:?} does not match array shape {:?}", mask.shape(), node.shape()));
        }
        let itemsize = node.dtype().size();
        let mut out = Vec::new();
        let mut keep = mask.as_bool_iter();
        for ptr in NIter::new(node) {
            if keep.next().unwrap() {
                unsafe {
                    out.extend_from_slice(std::slice::from_raw_parts(ptr as *const u8, itemsize));
                }
            }
        }
        let n = out.len() / itemsize;
        Ok(Node::from_owned_bytes(out, &[n], node.dtype()))
    })
}

/// Gather along `axis` using the `int64` values in `indices` (of arbitrary
/// shape); the result's shape is `node`'s shape with `axis` replaced by
/// `indices.shape()`. Negative indices count from the end of the axis.
pub fn index_with_int_array(node: &Node, axis: usize, indices: &NArray) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        if axis >= node.ndim() {
            return Err(value_err!("axis {} out of range for {}-d array", axis, node.ndim()));
        }
        if indices.dtype() != DType::Int64 {
            return Err(type_err!("index_with_int_array requires int64 indices, got {}", indices.dtype()));
        }

        let shape = node.shape();
        let strides = node.strides();
        let extent = shape[axis] as i64;

        let mut norm = Vec::with_capacity(indices.size());
        for v in indices.as_i64_iter() {
            let p = if v < 0 { v + extent } else { v };
            if p < 0 || p >= extent {
                return Err(index_err!("index {} out of bounds for axis {} with extent {}", v, axis, extent));
            }
            norm.push(p as isize);
        }

        let before = &shape[..axis];
        let after = &shape[axis + 1..];
        let before_strides = &strides[..axis];
        let after_strides = &strides[axis + 1..];
        let axis_stride = strides[axis];

        let mut out_shape: Vec<usize> = before.to_vec();
        out_shape.extend_from_slice(indices.shape());
        out_shape.extend_from_slice(after);

        let itemsize = node.dtype().size();
        let mut out = vec![0u8; shape::nitems(&out_shape) * itemsize];
        let mut out_pos = 0usize;

        for before_idx in each_index(before) {
            let base_before: isize = before_idx.iter().zip(before_strides).map(|(&i, &s)| i as isize * s).sum();
            for &ix in &norm {
                let base_mid = base_before + ix * axis_stride;
                for after_idx in each_index(after) {
                    let off =
                        base_mid + after_idx.iter().zip(after_strides).map(|(&i, &s)| i as isize * s).sum::<isize>();
                    unsafe {
                        let src = node.data_ptr().offset(off);
                        std::ptr::copy_nonoverlapping(src, out.as_mut_ptr().add(out_pos), itemsize);
                    }
                    out_pos += itemsize;
                }
            }
        }
        Ok(Node::from_owned_bytes(out, &out_shape, node.dtype()))
    })
}

/// Gather along `axis`, keeping only the positions where the 1-D `mask`
/// (whose length must equal the axis's extent) is `true`.
pub fn index_with_boolean_array(node: &Node, axis: usize, mask: &NArray) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        if axis >= node.ndim() {
            return Err(value_err!("axis {} out of range for {}-d array", axis, node.ndim()));
        }
        if mask.dtype() != DType::Bool {
            return Err(type_err!("index_with_boolean_array requires a bool mask, got {}", mask.dtype()));
        }
        if mask.ndim() != 1 || mask.shape()[0] != node.shape()[axis] {
            return Err(value_err!("mask length must equal axis {} extent {}", axis, node.shape()[axis]));
        }
        let kept: Vec<i64> = mask.as_bool_iter().enumerate().filter(|(_, b)| *b).map(|(i, _)| i as i64).collect();
        let kept_len = kept.len();
        let kept_arr = NArray::from_i64_slice(&kept, &[kept_len])?;
        index_with_int_array(node, axis, &kept_arr)
    })
}

/// Combined ("basic + advanced") integer-array indexing over the leading
/// `index_arrays.len()` axes: every index array must share the identical
/// shape (no numpy-style mutual broadcasting among them), and each position
/// in that shared shape selects one element along its axis; the result is
/// that shape followed by whatever axes remain untouched.
pub fn advanced_index(node: &Node, index_arrays: &[&NArray]) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let k = index_arrays.len();
        if k == 0 || k > node.ndim() {
            return Err(value_err!("advanced_index needs 1..={} index arrays, got {}", node.ndim(), k));
        }
        for ia in index_arrays {
            if ia.dtype() != DType::Int64 {
                return Err(type_err!("advanced_index requires int64 index arrays, got {}", ia.dtype()));
            }
        }
        let idx_shape = index_arrays[0].shape().to_vec();
        for ia in index_arrays.iter().skip(1) {
            if ia.shape() != idx_shape.as_slice() {
                return Err(value_err!(
                    "advanced_index requires every index array to share the same shape, got {:?} and {:?}",
                    idx_shape,
                    ia.shape()
                ));
            }
        }

        let shape = node.shape();
        let strides = node.strides();

        let mut bvals: Vec<Vec<isize>> = Vec::with_capacity(k);
        for (axis, ia) in index_arrays.iter().enumerate() {
            let extent = shape[axis] as i64;
            let mut vals = Vec::with_capacity(shape::nitems(&idx_shape));
            for raw in ia.as_i64_iter() {
                let p = if raw < 0 { raw + extent } else { raw };
                if p < 0 || p >= extent {
                    return Err(index_err!("index {} out of bounds for axis {} with extent {}", raw, axis, extent));
                }
                vals.push(p as isize);
            }
            bvals.push(vals);
        }

        let after = &shape[k..];
        let after_strides = &strides[k..];
        let mut out_shape = idx_shape.clone();
        out_shape.extend_from_slice(after);

        let itemsize = node.dtype().size();
        let mut out = vec![0u8; shape::nitems(&out_shape) * itemsize];
        let mut out_pos = 0usize;
        let n_idx = shape::nitems(&idx_shape);

        for pos in 0..n_idx {
            let mut base: isize = 0;
            for axis in 0..k {
                base += bvals[axis][pos] * strides[axis];
            }
            for after_idx in each_index(after) {
                let off = base + after_idx.iter().zip(after_strides).map(|(&i, &s)| i as isize * s).sum::<isize>();
                unsafe {
                    let src = node.data_ptr().offset(off);
                    std::ptr::copy_nonoverlapping(src, out.as_mut_ptr().add(out_pos), itemsize);
                }
                out_pos += itemsize;
            }
        }
        Ok(Node::from_owned_bytes(out, &out_shape, node.dtype()))
    })
}

/// Every coordinate vector of a (possibly empty) shape, in row-major order.
fn each_index(shape: &[usize]) -> Vec<Vec<usize>>
{
    if shape.is_empty() {
        return vec![vec![]];
    }
    let total: usize = shape.iter().product();
    if total == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(total);
    let mut idx = vec![0usize; shape.len()];
    loop {
        out.push(idx.clone());
        let mut axis = shape.len() - 1;
        loop {
            idx[axis] += 1;
            if idx[axis] < shape[axis] {
                break;
            }
            idx[axis] = 0;
            if axis == 0 {
                return out;
            }
            axis -= 1;
        }
    }
}

#[cfg(test)]
mod tests
{
    use crate::node::Node;

    use super::*;

    #[test]
    fn boolean_mask_selects_true_positions()
    {
        let bytes: Vec<u8> = [1i32, 2, 3, 4].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[4], DType::Int32).unwrap();
        let mask = NArray::from_bool_slice(&[true, false, true, false], &[4]).unwrap();
        let out = boolean_mask(&n, &mask).unwrap();
        assert_eq!(out.shape(), vec![2]);
    }

    #[test]
    fn gather_along_axis_reindexes()
    {
        let bytes: Vec<u8> = [1i32, 2, 3, 4, 5, 6].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[2, 3], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[2, 0], &[2]).unwrap();
        let out = index_with_int_array(&n, 1, &idx).unwrap();
        assert_eq!(out.shape(), vec![2, 2]);
    }

    #[test]
    fn negative_index_in_gather_counts_from_end()
    {
        let bytes: Vec<u8> = [1i32, 2, 3].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[3], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[-1], &[1]).unwrap();
        let out = index_with_int_array(&n, 0, &idx).unwrap();
        unsafe {
            assert_eq!(*(out.data_ptr() as *const i32), 3);
        }
    }

    #[test]
    fn advanced_index_requires_every_index_array_to_share_one_shape()
    {
        let bytes: Vec<u8> = [1i32, 2, 3, 4, 5, 6].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[2, 3], DType::Int32).unwrap();
        let rows = NArray::from_i64_slice(&[0, 1], &[2]).unwrap();
        let cols = NArray::from_i64_slice(&[0, 1, 2], &[3]).unwrap();
        assert!(advanced_index(&n, &[&rows, &cols]).is_err());
    }
}
