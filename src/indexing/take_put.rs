//! `take`/`put`: axis-based gather and flat-index scatter with
//! configurable out-of-range handling, grounded on NumPy's
//! `ndarray.take`/`ndarray.put` and their `raise`/`wrap`/`clip`
//! out-of-range modes.

use crate::dtype::DType;
use crate::error::{index_err, type_err, value_err, NResult};
use crate::narray::NArray;
use crate::node::Node;

use super::fancy::index_with_int_array;

/// How `take`/`put` handle an index outside `[0, len)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode
{
    /// Raise an `Index` error.
    Error,
    /// Wrap modulo the axis length (Python-style negative indices are
    /// resolved first, then any remaining out-of-range value wraps).
    Wrap,
    /// Clamp to the nearest valid index.
    Clip,
}

fn resolve(mode: Mode, raw: i64, len: i64, context: &str) -> NResult<usize>
{
    if len == 0 {
        return Err(value_err!("{}: cannot index into an axis of length 0", context));
    }
    let mut v = raw;
    if v < 0 {
        v += len;
    }
    if v >= 0 && v < len {
        return Ok(v as usize);
    }
    match mode {
        Mode::Error => Err(index_err!("{}: index {} out of bounds for length {}", context, raw, len)),
        Mode::Wrap => Ok(raw.rem_euclid(len) as usize),
        Mode::Clip => Ok(if v < 0 { 0 } else { (len - 1) as usize }),
    }
}

/// Gather along `axis` using `indices` (of arbitrary shape), applying
/// `mode`'s out-of-bounds policy to each index before gathering. Otherwise
/// identical to [`index_with_int_array`]: the result's shape is `node`'s
/// shape with `axis` replaced by `indices.shape()`.
pub fn take(node: &Node, indices: &NArray, axis: usize, mode: Mode) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        if axis >= node.ndim() {
            return Err(value_err!("axis {} out of range for {}-d array", axis, node.ndim()));
        }
        if indices.dtype() != DType::Int64 {
            return Err(type_err!("take requires int64 indices, got {}", indices.dtype()));
        }
        let extent = node.shape()[axis] as i64;
        let mut resolved = Vec::with_capacity(indices.size());
        for raw in indices.as_i64_iter() {
            resolved.push(resolve(mode, raw, extent, "take")? as i64);
        }
        let resolved = NArray::from_i64_slice(&resolved, indices.shape())?;
        index_with_int_array(node, axis, &resolved)
    })
}

/// Scatter `values` (broadcast if it has fewer elements than `indices`)
/// into `node`'s flattened element sequence at the positions named by
/// `indices`, mutating `node` in place. `node` must be contiguous and
/// writable.
pub fn put(node: &Node, indices: &NArray, values: &NArray, mode: Mode) -> NResult<()>
{
    crate::error::with_error_channel(|| {
        if !node.is_writable() {
            return Err(value_err!("put: array is not writable"));
        }
        if !node.is_contiguous() {
            return Err(value_err!("put requires a contiguous destination; call copy() first"));
        }
        if indices.dtype() != DType::Int64 {
            return Err(type_err!("put requires int64 indices, got {}", indices.dtype()));
        }
        if values.dtype() != node.dtype() {
            return Err(type_err!(
                "put: values dtype {} does not match array dtype {}",
                values.dtype(),
                node.dtype()
            ));
        }
        let nvalues = values.size();
        if nvalues == 0 {
            return Err(value_err!("put: values must be non-empty"));
        }

        let len = node.nitems() as i64;
        let itemsize = node.dtype().size();
        let values_bytes = values.data();

        unsafe {
            let base = node.data_mut_ptr();
            for (slot, raw) in indices.as_i64_iter().enumerate() {
                let pos = resolve(mode, raw, len, "put")?;
                let value_slot = slot % nvalues;
                let src = &values_bytes[value_slot * itemsize..(value_slot + 1) * itemsize];
                let dst = base.add(pos * itemsize);
                std::ptr::copy_nonoverlapping(src.as_ptr(), dst, itemsize);
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn take_gathers_along_the_given_axis()
    {
        let bytes: Vec<u8> = [1i32, 2, 3, 4].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[4], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[3, 0], &[2]).unwrap();
        let out = take(&n, &idx, 0, Mode::Error).unwrap();
        unsafe {
            let ptr = out.data_ptr() as *const i32;
            assert_eq!(*ptr, 4);
            assert_eq!(*ptr.add(1), 1);
        }
    }

    #[test]
    fn take_wrap_mode_wraps_out_of_range()
    {
        let bytes: Vec<u8> = [10i32, 20, 30].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[3], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[3], &[1]).unwrap();
        let out = take(&n, &idx, 0, Mode::Wrap).unwrap();
        unsafe {
            assert_eq!(*(out.data_ptr() as *const i32), 10);
        }
    }

    #[test]
    fn take_clip_mode_clamps_out_of_range()
    {
        let bytes: Vec<u8> = [10i32, 20, 30].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[3], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[99], &[1]).unwrap();
        let out = take(&n, &idx, 0, Mode::Clip).unwrap();
        unsafe {
            assert_eq!(*(out.data_ptr() as *const i32), 30);
        }
    }

    #[test]
    fn take_error_mode_rejects_out_of_range()
    {
        let n = Node::new_empty(&[3], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[5], &[1]).unwrap();
        assert!(take(&n, &idx, 0, Mode::Error).is_err());
    }

    #[test]
    fn take_along_a_non_zero_axis_of_a_2d_array_leaves_other_axes_untouched()
    {
        let bytes: Vec<u8> = [1i32, 2, 3, 4, 5, 6].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[2, 3], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[2, 0], &[2]).unwrap();
        let out = take(&n, &idx, 1, Mode::Error).unwrap();
        assert_eq!(out.shape(), vec![2, 2]);
        unsafe {
            let ptr = out.data_ptr() as *const i32;
            assert_eq!(*ptr, 3);
            assert_eq!(*ptr.add(1), 1);
            assert_eq!(*ptr.add(2), 6);
            assert_eq!(*ptr.add(3), 4);
        }
    }

    #[test]
    fn take_with_every_axis_index_in_order_is_the_identity()
    {
        // take(x, [0..n-1], axis=k) == x
        let bytes: Vec<u8> = [1i32, 2, 3, 4, 5, 6].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let n = Node::new(&bytes, &[2, 3], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[0, 1, 2], &[3]).unwrap();
        let out = take(&n, &idx, 1, Mode::Error).unwrap();
        assert_eq!(out.shape(), n.shape());
        unsafe {
            for i in 0..6 {
                assert_eq!(*(out.data_ptr().add(i * 4) as *const i32), *(n.data_ptr().add(i * 4) as *const i32));
            }
        }
    }

    #[test]
    fn put_scatters_and_broadcasts_single_value()
    {
        let n = Node::new_empty(&[4], DType::Int32).unwrap();
        let idx = NArray::from_i64_slice(&[0, 2], &[2]).unwrap();
        let values = NArray::new(99i32.to_ne_bytes().to_vec(), &[1], DType::Int32).unwrap();
        put(&n, &idx, &values, Mode::Error).unwrap();
        unsafe {
            let ptr = n.data_ptr() as *const i32;
            assert_eq!(*ptr, 99);
            assert_eq!(*ptr.add(2), 99);
        }
    }
}
