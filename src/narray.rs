//! NArray: a lightweight, non-refcounted array descriptor for ephemeral
//! index/mask inputs.
//!
//! Unlike [`crate::node::Node`], `NArray` owns its three buffers
//! (`data`/`shape`/`strides`) independently and does not participate in
//! refcounting or base-chain tracking; it exists purely so integer-index
//! and boolean-mask arguments to the indexing operations don't pay for
//! `Node` overhead.

use crate::dtype::DType;
use crate::error::{value_err, NResult};
use crate::node::Node;
use crate::shape;

/// A lean, non-owning-by-default array descriptor used for index and mask
/// arguments.
pub struct NArray
{
    data: Vec<u8>,
    shape: Vec<usize>,
    strides: Vec<isize>,
    dtype: DType,
    owns_data: bool,
    owns_shape: bool,
    owns_strides: bool,
}

impl NArray
{
    /// `narray_new`: build from raw bytes, computing C-contiguous strides.
    pub fn new(data: Vec<u8>, shape: &[usize], dtype: DType) -> NResult<NArray>
    {
        crate::error::with_error_channel(|| {
            let nitems = shape::nitems(shape);
            if data.len() != nitems * dtype.size() {
                return Err(value_err!(
                    "narray data length {} does not match shape/dtype byte length {}",
                    data.len(),
                    nitems * dtype.size()
                ));
            }
            let strides = shape::calc_strides(shape, dtype.size());
            Ok(NArray {
                data,
                shape: shape.to_vec(),
                strides,
                dtype,
                owns_data: true,
                owns_shape: true,
                owns_strides: true,
            })
        })
    }

    /// `narray_new_empty`: zero-filled, C-contiguous.
    pub fn new_empty(shape: &[usize], dtype: DType) -> NResult<NArray>
    {
        crate::error::with_error_channel(|| {
            let nitems = shape::nitems(shape);
            NArray::new(vec![0u8; nitems * dtype.size()], shape, dtype)
        })
    }

    /// `narray_from_node`: copy a `Node`'s contents into a fresh `NArray`.
    pub fn from_node(node: &Node) -> NResult<NArray>
    {
        crate::error::with_error_channel(|| {
            let contiguous = crate::convert::to_contiguous_bytes(node)?;
            NArray::new(contiguous, &node.shape(), node.dtype())
        })
    }

    /// `narray_from_int_array`: build an `int64` NArray from a flat slice of
    /// indices with the given shape.
    pub fn from_i64_slice(values: &[i64], shape: &[usize]) -> NResult<NArray>
    {
        crate::error::with_error_channel(|| {
            if values.len() != shape::nitems(shape) {
                return Err(value_err!("index slice length does not match shape"));
            }
            let mut data = Vec::with_capacity(values.len() * 8);
            for &v in values {
                data.extend_from_slice(&v.to_ne_bytes());
            }
            NArray::new(data, shape, DType::Int64)
        })
    }

    /// `narray_from_bool_array`: build a `bool` NArray from a flat slice of
    /// booleans with the given shape.
    pub fn from_bool_slice(values: &[bool], shape: &[usize]) -> NResult<NArray>
    {
        crate::error::with_error_channel(|| {
            if values.len() != shape::nitems(shape) {
                return Err(value_err!("mask slice length does not match shape"));
            }
            let data: Vec<u8> = values.iter().map(|&b| b as u8).collect();
            NArray::new(data, shape, DType::Bool)
        })
    }

    #[inline]
    pub fn dtype(&self) -> DType
    {
        self.dtype
    }

    #[inline]
    pub fn ndim(&self) -> usize
    {
        self.shape.len()
    }

    #[inline]
    pub fn shape(&self) -> &[usize]
    {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize]
    {
        &self.strides
    }

    #[inline]
    pub fn size(&self) -> usize
    {
        shape::nitems(&self.shape)
    }

    #[inline]
    pub fn owns_data(&self) -> bool
    {
        self.owns_data
    }

    #[inline]
    pub fn owns_shape(&self) -> bool
    {
        self.owns_shape
    }

    #[inline]
    pub fn owns_strides(&self) -> bool
    {
        self.owns_strides
    }

    pub(crate) fn data(&self) -> &[u8]
    {
        &self.data
    }

    /// `narray_is_contiguous`.
    pub fn is_contiguous(&self) -> bool
    {
        shape::is_c_contiguous(&self.shape, &self.strides, self.dtype.size())
    }

    /// `narray_get_item`: fetch the raw bytes of the element at `index`
    /// (one coordinate per axis).
    pub fn get_item(&self, index: &[usize]) -> NResult<&[u8]>
    {
        crate::error::with_error_channel(|| {
            if index.len() != self.shape.len() {
                return Err(value_err!("index has {} entries, expected {}", index.len(), self.shape.len()));
            }
            let mut byte_offset: isize = 0;
            for (i, (&ix, &extent)) in index.iter().zip(self.shape.iter()).enumerate() {
                if ix >= extent {
                    return Err(crate::error::index_err!(
                        "axis {} index {} out of bounds for extent {}",
                        i,
                        ix,
                        extent
                    ));
                }
                byte_offset += ix as isize * self.strides[i];
            }
            let start = byte_offset as usize;
            Ok(&self.data[start..start + self.dtype.size()])
        })
    }

    /// `narray_copy`: a deep copy with freshly-owned buffers.
    pub fn copy(&self) -> NArray
    {
        NArray {
            data: self.data.clone(),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            dtype: self.dtype,
            owns_data: true,
            owns_shape: true,
            owns_strides: true,
        }
    }

    /// `narray_to_node`: materialise this NArray as an owning `Node`.
    pub fn to_node(&self) -> NResult<Node>
    {
        crate::error::with_error_channel(|| Node::new(&self.data, &self.shape, self.dtype))
    }

    /// Interpret this NArray as a flat (already validated) sequence of
    /// `int64` indices; used by the indexing/take/put operations.
    pub(crate) fn as_i64_iter(&self) -> impl Iterator<Item = i64> + '_
    {
        self.data.chunks_exact(8).map(|c| i64::from_ne_bytes(c.try_into().unwrap()))
    }

    /// Interpret this NArray as a flat sequence of booleans (non-zero byte
    /// = true); used by boolean mask indexing.
    pub(crate) fn as_bool_iter(&self) -> impl Iterator<Item = bool> + '_
    {
        self.data.iter().map(|&b| b != 0)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn from_i64_slice_round_trips()
    {
        let na = NArray::from_i64_slice(&[1, -1, 7], &[3]).unwrap();
        assert_eq!(na.dtype(), DType::Int64);
        let vals: Vec<i64> = na.as_i64_iter().collect();
        assert_eq!(vals, vec![1, -1, 7]);
    }

    #[test]
    fn from_bool_slice_round_trips()
    {
        let na = NArray::from_bool_slice(&[true, false, true], &[3]).unwrap();
        let vals: Vec<bool> = na.as_bool_iter().collect();
        assert_eq!(vals, vec![true, false, true]);
    }

    #[test]
    fn get_item_checks_bounds()
    {
        let na = NArray::new_empty(&[2, 2], DType::Int32).unwrap();
        assert!(na.get_item(&[0, 0]).is_ok());
        assert!(na.get_item(&[2, 0]).is_err());
    }
}
