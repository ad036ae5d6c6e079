//! Dtype conversion: the per-element cast matrix between any two of the
//! eleven primitive dtypes, plus the same-dtype strided copy used by
//! `Node::copy` and `NArray::from_node`.
//!
//! Casting dispatches through [`crate::elem::NumElem`] exactly like the
//! math/reduce/cumulative kernels: pick the two concrete storage types with
//! one `match (DType, DType)` at the boundary, then run a monomorphic loop.
//! `Bool` casts are the one irregular case — writing *into* a bool buffer
//! truncates via `x != 0` rather than via `NumElem::from_*`: any nonzero
//! value becomes `true`.

use crate::dtype::DType;
use crate::elem::NumElem;
use crate::error::NResult;
use crate::iterators::{NIter, NMultiIter};
use crate::node::Node;

/// Copy `src`'s elements into `dst` byte-for-byte. Both must already share
/// shape and dtype; callers enforce that.
pub(crate) fn convert_same_dtype(dst: &Node, src: &Node) -> NResult<()>
{
    let itemsize = src.dtype().size();
    if src.is_contiguous() && dst.is_contiguous() {
        let len = src.nitems() * itemsize;
        unsafe {
            std::ptr::copy_nonoverlapping(src.data_ptr(), dst.data_mut_ptr(), len);
        }
        return Ok(());
    }
    let pair = NMultiIter::new(&[dst, src])?;
    for ptrs in pair {
        unsafe {
            std::ptr::copy_nonoverlapping(ptrs[1] as *const u8, ptrs[0], itemsize);
        }
    }
    Ok(())
}

/// Flatten `node` into a freshly owned, C-contiguous byte vector regardless
/// of its current strides. Used where a flat byte slice is convenient (e.g.
/// building an [`crate::narray::NArray`]).
pub fn to_contiguous_bytes(node: &Node) -> NResult<Vec<u8>>
{
    crate::error::with_error_channel(|| {
        let itemsize = node.dtype().size();
        let nbytes = node.nitems() * itemsize;
        let mut out = vec![0u8; nbytes];
        if node.is_contiguous() {
            unsafe {
                std::ptr::copy_nonoverlapping(node.data_ptr(), out.as_mut_ptr(), nbytes);
            }
            return Ok(out);
        }
        let mut pos = 0usize;
        for ptr in NIter::new(node) {
            unsafe {
                std::ptr::copy_nonoverlapping(ptr as *const u8, out.as_mut_ptr().add(pos), itemsize);
            }
            pos += itemsize;
        }
        Ok(out)
    })
}

/// Cast every element of `src` to `dst`'s dtype, writing into `dst` (which
/// must already have `src`'s shape). Source and destination dtypes may
/// differ arbitrarily among the 11 primitive kinds.
pub fn cast_into(dst: &Node, src: &Node) -> NResult<()>
{
    crate::error::with_error_channel(|| {
        if dst.dtype() == src.dtype() {
            return convert_same_dtype(dst, src);
        }
        // Integer-to-integer casts pivot through `i64` (exact: i64 is wide
        // enough to hold the bit pattern of every other integer dtype under
        // sign/zero extension, so two sequential truncations reproduce a
        // direct `as` cast) rather than through `f64`, which would silently
        // lose precision for `int64`/`uint64` magnitudes beyond 2^53. Any
        // cast touching a float dtype still pivots through `f64`, matching
        // "the target-language primitive cast" semantics the spec calls for.
        let float_involved = src.dtype().is_float() || dst.dtype().is_float();
        macro_rules! cast_loop {
            ($from:ty, $to:ty, $bool_out:expr) => {{
                let pair = NMultiIter::new(&[dst, src])?;
                for ptrs in pair {
                    unsafe {
                        let s = std::ptr::read_unaligned(ptrs[1] as *const $from);
                        let out: $to = if $bool_out {
                            (!s.is_zero()) as u8 as $to
                        } else if float_involved {
                            <$to as NumElem>::from_f64(s.to_f64())
                        } else {
                            <$to as NumElem>::from_i64(s.to_i64())
                        };
                        std::ptr::write_unaligned(ptrs[0] as *mut $to, out);
                    }
                }
            }};
        }
        macro_rules! from_src {
            ($from:ty) => {
                match dst.dtype() {
                    DType::Bool => cast_loop!($from, u8, true),
                    DType::Int8 => cast_loop!($from, i8, false),
                    DType::UInt8 => cast_loop!($from, u8, false),
                    DType::Int16 => cast_loop!($from, i16, false),
                    DType::UInt16 => cast_loop!($from, u16, false),
                    DType::Int32 => cast_loop!($from, i32, false),
                    DType::UInt32 => cast_loop!($from, u32, false),
                    DType::Int64 => cast_loop!($from, i64, false),
                    DType::UInt64 => cast_loop!($from, u64, false),
                    DType::Float32 => cast_loop!($from, f32, false),
                    DType::Float64 => cast_loop!($from, f64, false),
                }
            };
        }
        match src.dtype() {
            DType::Bool | DType::UInt8 => from_src!(u8),
            DType::Int8 => from_src!(i8),
            DType::Int16 => from_src!(i16),
            DType::UInt16 => from_src!(u16),
            DType::Int32 => from_src!(i32),
            DType::UInt32 => from_src!(u32),
            DType::Int64 => from_src!(i64),
            DType::UInt64 => from_src!(u64),
            DType::Float32 => from_src!(f32),
            DType::Float64 => from_src!(f64),
        }
        Ok(())
    })
}

/// Cast `src` into a brand-new, owning, contiguous node of dtype `to`.
pub fn cast(src: &Node, to: DType) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let out = Node::new_empty(&src.shape(), to)?;
        cast_into(&out, src)?;
        Ok(out)
    })
}
