//! Cumulative, single-axis scans: `cumsum`/`cumprod`/`cummin`/`cummax`,
//! `diff`, `gradient`, and their NaN-ignoring variants.
//!
//! Every op here fixes every axis coordinate except `axis` and walks that
//! one axis in order, generalised to a single [`each_lane`] driver shared
//! by every op in this module.

use rawpointer::PointerExt;

use crate::dtype::DType;
use crate::elem::{with_numeric_type, NumElem};
use crate::error::{type_err, value_err, NResult};
use crate::node::Node;

fn normalize_axis(ndim: usize, axis: Option<isize>) -> NResult<usize>
{
    if ndim == 0 {
        return Err(value_err!("cumulative ops require at least one axis; got a 0-d array"));
    }
    let axis = axis.unwrap_or(ndim as isize - 1);
    let norm = if axis < 0 { axis + ndim as isize } else { axis };
    if norm < 0 || norm as usize >= ndim {
        return Err(value_err!("axis {} out of bounds for {}-d array", axis, ndim));
    }
    Ok(norm as usize)
}

/// Call `f(coords)` once per combination of coordinates over every axis of
/// `shape` except `axis` (row-major), with `coords[axis]` left at `0` for
/// the caller to vary. Visits nothing if any non-`axis` extent is zero.
fn each_lane(shape: &[usize], axis: usize, mut f: impl FnMut(&mut [usize]))
{
    let ndim = shape.len();
    if (0..ndim).any(|d| d != axis && shape[d] == 0) {
        return;
    }
    let mut coords = vec![0usize; ndim];
    loop {
        f(&mut coords);
        if ndim <= 1 {
            return;
        }
        let mut d = ndim;
        loop {
            if d == 0 {
                return;
            }
            d -= 1;
            if d == axis {
                continue;
            }
            coords[d] += 1;
            if coords[d] < shape[d] {
                break;
            }
            coords[d] = 0;
            if d == 0 {
                return;
            }
        }
    }
}

unsafe fn offset_ptr(base: *const u8, coords: &[usize], strides: &[isize]) -> *const u8
{
    let mut ptr = base;
    for (axis, &c) in coords.iter().enumerate() {
        ptr = ptr.stride_offset(strides[axis], c);
    }
    ptr
}

fn linear_index(coords: &[usize], shape: &[usize]) -> usize
{
    let mut idx = 0usize;
    let mut mult = 1usize;
    for d in (0..shape.len()).rev() {
        idx += coords[d] * mult;
        mult *= shape[d];
    }
    idx
}

unsafe fn read<T: Copy>(ptr: *const u8) -> T
{
    std::ptr::read_unaligned(ptr as *const T)
}

unsafe fn write<T: Copy>(ptr: *mut u8, v: T)
{
    std::ptr::write_unaligned(ptr as *mut T, v)
}

/// `cumsum`: running sum along `axis` (default the last axis); output
/// dtype is the input dtype unchanged — unlike `sum`, cumulative ops do
/// not widen. A NaN element is written through as-is at its own position,
/// but does not perturb the running accumulator used for later positions
/// (e.g. `cumsum([1.0, NaN, 2.0, 3.0])` is `[1.0, NaN, 3.0, 6.0]`).
pub fn cumsum(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| scan(node, axis, ScanOp::Sum, false))
}

/// `cumprod`: running product along `axis`.
pub fn cumprod(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| scan(node, axis, ScanOp::Prod, false))
}

/// `cummin`: running minimum along `axis`.
pub fn cummin(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| scan(node, axis, ScanOp::Min, false))
}

/// `cummax`: running maximum along `axis`.
pub fn cummax(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| scan(node, axis, ScanOp::Max, false))
}

/// `nancumsum`: as `cumsum`, but a NaN position is itself written as the
/// carried-forward accumulator rather than the NaN value — kept in line
/// with this crate's `nanmin`/`nanmax` "skip" convention rather than
/// treating NaN as the identity element.
pub fn nancumsum(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nancumsum")?;
        scan(node, axis, ScanOp::Sum, true)
    })
}

/// `nancumprod`: as `cumprod`, carrying the pre-NaN accumulator forward.
pub fn nancumprod(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nancumprod")?;
        scan(node, axis, ScanOp::Prod, true)
    })
}

/// `nancummin`: as `cummin`, carrying the pre-NaN accumulator forward.
pub fn nancummin(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nancummin")?;
        scan(node, axis, ScanOp::Min, true)
    })
}

/// `nancummax`: as `cummax`, carrying the pre-NaN accumulator forward.
pub fn nancummax(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nancummax")?;
        scan(node, axis, ScanOp::Max, true)
    })
}

fn require_float(node: &Node, op: &str) -> NResult<()>
{
    if node.dtype().is_float() {
        Ok(())
    } else {
        Err(type_err!("{} is only defined for float inputs, got {}", op, node.dtype()))
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum ScanOp
{
    Sum,
    Prod,
    Min,
    Max,
}

fn scan(node: &Node, axis: Option<isize>, op: ScanOp, ignore_nan: bool) -> NResult<Node>
{
    let axis = normalize_axis(node.ndim(), axis)?;
    let shape = node.shape();
    let strides = node.strides();
    let dtype = node.dtype();
    let out = Node::new_empty(&shape, dtype)?;
    if shape[axis] == 0 {
        return Ok(out);
    }
    let axis_len = shape[axis];

    with_numeric_type!(dtype, T => {
        let src_base = node.data_ptr();
        let dst_base = out.data_mut_ptr();
        let elem_size = std::mem::size_of::<T>();

        each_lane(&shape, axis, |coords| {
            let mut acc = T::zero();
            let mut started = false;
            for i in 0..axis_len {
                coords[axis] = i;
                let dst_idx = linear_index(coords, &shape);
                let v: T = unsafe { read(offset_ptr(src_base, coords, &strides)) };
                // A NaN element never contributes to the running accumulator
                // (for either variant); the two variants differ only in
                // what gets *written* at the NaN position itself —
                // nan-ignoring writes the carried-forward accumulator,
                // the regular scan writes the NaN through.
                let write_val = if v.is_nan() {
                    if ignore_nan {
                        acc
                    } else {
                        v
                    }
                } else if !started {
                    acc = v;
                    started = true;
                    acc
                } else {
                    acc = match op {
                        ScanOp::Sum => acc.add(v),
                        ScanOp::Prod => acc.mul(v),
                        ScanOp::Min => if v < acc { v } else { acc },
                        ScanOp::Max => if v > acc { v } else { acc },
                    };
                    acc
                };
                unsafe { write(dst_base.add(dst_idx * elem_size), write_val) };
            }
            coords[axis] = 0;
        });
    });
    Ok(out)
}

/// `diff`: first discrete difference along `axis` (default the last axis);
/// the output's `axis` extent is one less than the input's. Requires
/// `shape[axis] > 1`. Output dtype `int64` for integer/bool input,
/// `float64` for float input (see [`DType::diff_out_dtype`]).
pub fn diff(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let axis = normalize_axis(node.ndim(), axis)?;
        let shape = node.shape();
        if shape[axis] <= 1 {
            return Err(value_err!("diff requires axis {} to have length > 1, got {}", axis, shape[axis]));
        }
        let strides = node.strides();
        let out_dtype = node.dtype().diff_out_dtype();
        let mut out_shape = shape.clone();
        out_shape[axis] -= 1;
        let out = Node::new_empty(&out_shape, out_dtype)?;
        let out_axis_len = out_shape[axis];

        with_numeric_type!(node.dtype(), In => {
            with_numeric_type!(out_dtype, Out => {
                let src_base = node.data_ptr();
                let dst_base = out.data_mut_ptr();
                let out_elem = std::mem::size_of::<Out>();

                each_lane(&out_shape, axis, |coords| {
                    for i in 0..out_axis_len {
                        coords[axis] = i;
                        let dst_idx = linear_index(coords, &out_shape);
                        unsafe {
                            let a: In = read(offset_ptr(src_base, coords, &strides));
                            coords[axis] = i + 1;
                            let b: In = read(offset_ptr(src_base, coords, &strides));
                            coords[axis] = i;
                            let d: Out = cast_diff(b, a);
                            write(dst_base.add(dst_idx * out_elem), d);
                        }
                    }
                    coords[axis] = 0;
                });
            });
        });
        Ok(out)
    })
}

fn cast_diff<In: NumElem, Out: NumElem>(b: In, a: In) -> Out
{
    if !In::is_float() && !Out::is_float() {
        Out::from_i64(b.to_i64() - a.to_i64())
    } else {
        Out::from_f64(b.to_f64() - a.to_f64())
    }
}

/// `gradient`: a central-difference numerical gradient along `axis`
/// (default the last axis) with unit spacing: forward difference at the
/// first position, backward difference at the last, central difference
/// (halved) in the interior. Output is always `float64`, matching
/// `cumulative.c`'s `DEFINE_GRADIENT_ALL` instantiation for every input
/// dtype. Requires `shape[axis] >= 2`.
pub fn gradient(node: &Node, axis: Option<isize>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let axis = normalize_axis(node.ndim(), axis)?;
        let shape = node.shape();
        if shape[axis] < 2 {
            return Err(value_err!("gradient requires axis {} to have length >= 2, got {}", axis, shape[axis]));
        }
        let strides = node.strides();
        let out = Node::new_empty(&shape, DType::Float64)?;
        let axis_len = shape[axis];

        with_numeric_type!(node.dtype(), T => {
            let src_base = node.data_ptr();
            let dst_base = out.data_mut_ptr();

            each_lane(&shape, axis, |coords| {
                for i in 0..axis_len {
                    let value = unsafe {
                        if i == 0 {
                            coords[axis] = 0;
                            let v0: T = read(offset_ptr(src_base, coords, &strides));
                            coords[axis] = 1;
                            let v1: T = read(offset_ptr(src_base, coords, &strides));
                            v1.to_f64() - v0.to_f64()
                        } else if i == axis_len - 1 {
                            coords[axis] = i - 1;
                            let v0: T = read(offset_ptr(src_base, coords, &strides));
                            coords[axis] = i;
                            let v1: T = read(offset_ptr(src_base, coords, &strides));
                            v1.to_f64() - v0.to_f64()
                        } else {
                            coords[axis] = i - 1;
                            let v0: T = read(offset_ptr(src_base, coords, &strides));
                            coords[axis] = i + 1;
                            let v2: T = read(offset_ptr(src_base, coords, &strides));
                            (v2.to_f64() - v0.to_f64()) / 2.0
                        }
                    };
                    coords[axis] = i;
                    let dst_idx = linear_index(coords, &shape);
                    unsafe { write::<f64>(dst_base.add(dst_idx * 8), value) };
                }
                coords[axis] = 0;
            });
        });
        Ok(out)
    })
}
