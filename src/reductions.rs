//! Axis reductions: `sum`/`prod`/`min`/`max`/`mean`/`var`/`std`,
//! `argmin`/`argmax`, `all`/`any`, `count_nonzero`, and their NaN-ignoring
//! variants — generalised from per-(in,out) dtype generated kernels to one
//! generic body per op, dispatched over [`crate::elem::NumElem`] the way
//! [`crate::math`] dispatches elementwise kernels.
//!
//! Every kernel shares one coordinate-walking driver ([`walk_reduce`]) that
//! maps each input element's coordinates to (a) its strided source offset
//! and (b) the linear index of the output cell it contributes to, by
//! dropping the reduced axes in input-order.

use rawpointer::PointerExt;

use crate::dtype::DType;
use crate::elem::{with_numeric_type, NumElem};
use crate::error::{type_err, value_err, NResult};
use crate::node::Node;

/// Resolve a caller-supplied axis list (possibly negative, possibly empty
/// meaning "reduce everything") against `ndim`, deduplicated and sorted
/// ascending. An empty or absent axis list means full reduction.
fn normalize_axes(ndim: usize, axes: Option<&[isize]>) -> NResult<Vec<usize>>
{
    let axes = match axes {
        None => return Ok((0..ndim).collect()),
        Some(a) if a.is_empty() => return Ok((0..ndim).collect()),
        Some(a) => a,
    };
    let mut seen = vec![false; ndim];
    let mut out = Vec::with_capacity(axes.len());
    for &ax in axes {
        let norm = if ax < 0 { ax + ndim as isize } else { ax };
        if norm < 0 || norm as usize >= ndim {
            return Err(value_err!("reduce axis {} out of bounds for {}-d array", ax, ndim));
        }
        let norm = norm as usize;
        if !seen[norm] {
            seen[norm] = true;
            out.push(norm);
        }
    }
    out.sort_unstable();
    Ok(out)
}

/// The output shape of a reduction: `shape` with every axis in `reduced`
/// dropped, in original order.
fn output_shape(shape: &[usize], reduced: &[usize]) -> Vec<usize>
{
    shape.iter().enumerate().filter(|(axis, _)| !reduced.contains(axis)).map(|(_, &d)| d).collect()
}

/// Map `coords` (one entry per input axis) to the linear index of the
/// output cell it belongs to, given which axes are reduced. Walks from the
/// last axis backward: kept axes contribute their coordinate times the
/// running multiplier, most significant axis last.
fn coords_to_out_idx(coords: &[usize], out_shape: &[usize], is_reduced: &[bool]) -> usize
{
    let mut out_idx = 0usize;
    let mut mult = 1usize;
    let mut o = out_shape.len();
    for d in (0..coords.len()).rev() {
        if !is_reduced[d] {
            o -= 1;
            out_idx += coords[d] * mult;
            mult *= out_shape[o];
        }
    }
    out_idx
}

/// The row-major-encoded "local index" of `coords` restricted to
/// `reduced_axes` only, in the order the axes are listed — the fused
/// argmin/argmax tie-break index, a row-major encoding of the
/// reduced-axis coordinates alone.
fn local_index(coords: &[usize], shape: &[usize], reduced_axes: &[usize]) -> i64
{
    let mut idx = 0i64;
    let mut mult = 1i64;
    for &axis in reduced_axes.iter().rev() {
        idx += coords[axis] as i64 * mult;
        mult *= shape[axis] as i64;
    }
    idx
}

/// Walk every coordinate of `node`'s shape in row-major order, calling `f`
/// with the element's raw source pointer and the linear index of the
/// output cell it maps to. Visits nothing if any axis is empty.
fn walk_reduce(node: &Node, is_reduced: &[bool], out_shape: &[usize], mut f: impl FnMut(&[usize], *const u8, usize))
{
    let shape = node.shape();
    let strides = node.strides();
    if shape.iter().any(|&d| d == 0) {
        return;
    }
    let ndim = shape.len();
    let base = node.data_ptr();
    let mut coords = vec![0usize; ndim];
    loop {
        let mut ptr = base;
        for d in 0..ndim {
            unsafe { ptr = ptr.stride_offset(strides[d], coords[d]) };
        }
        let out_idx = coords_to_out_idx(&coords, out_shape, is_reduced);
        f(&coords, ptr, out_idx);
        if ndim == 0 {
            return;
        }
        let mut axis = ndim - 1;
        loop {
            coords[axis] += 1;
            if coords[axis] < shape[axis] {
                break;
            }
            coords[axis] = 0;
            if axis == 0 {
                return;
            }
            axis -= 1;
        }
    }
}

fn is_reduced_mask(ndim: usize, reduced: &[usize]) -> Vec<bool>
{
    let mut mask = vec![false; ndim];
    for &ax in reduced {
        mask[ax] = true;
    }
    mask
}

unsafe fn read<T: Copy>(ptr: *const u8) -> T
{
    std::ptr::read_unaligned(ptr as *const T)
}

unsafe fn write<T: Copy>(ptr: *mut u8, v: T)
{
    std::ptr::write_unaligned(ptr as *mut T, v)
}

/// Shared setup for every reduction below: resolve axes, compute the output
/// shape, and allocate an output node of `out_dtype`.
fn setup(node: &Node, axes: Option<&[isize]>, out_dtype: DType) -> NResult<(Vec<usize>, Node)>
{
    let reduced = normalize_axes(node.ndim(), axes)?;
    let out_shape = output_shape(&node.shape(), &reduced);
    let out = Node::new_empty(&out_shape, out_dtype)?;
    Ok((reduced, out))
}

/// `sum`: accumulate with `+`; output dtype widens to the 64-bit
/// accumulator appropriate to the input's kind.
pub fn sum(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| accumulate_sum_prod(node, axes, false, false))
}

/// `prod`: accumulate with `*`; same output dtype rule as `sum`.
pub fn prod(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| accumulate_sum_prod(node, axes, true, false))
}

/// `nansum`: as `sum`, skipping NaN elements; an all-NaN cell sums to `0`.
/// Float inputs only.
pub fn nansum(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nansum")?;
        accumulate_sum_prod(node, axes, false, true)
    })
}

/// `nanprod`: as `prod`, skipping NaN elements; an all-NaN cell is `1`.
pub fn nanprod(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nanprod")?;
        accumulate_sum_prod(node, axes, true, true)
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

fn accumulate_sum_prod(node: &Node, axes: Option<&[isize]>, is_prod: bool, ignore_nan: bool) -> NResult<Node>
{
    let out_dtype = node.dtype().sum_prod_out_dtype();
    let (reduced, out) = setup(node, axes, out_dtype)?;
    let is_reduced = is_reduced_mask(node.ndim(), &reduced);
    let out_shape = out.shape();

    with_numeric_type!(node.dtype(), In => {
        with_numeric_type!(out_dtype, Out => {
            let n_out = out.nitems().max(1);
            let init: Out = if is_prod { NumElem::one() } else { NumElem::zero() };
            let mut acc = vec![init; n_out];
            walk_reduce(node, &is_reduced, &out_shape, |_coords, ptr, oi| unsafe {
                let v: In = read(ptr);
                if ignore_nan && v.is_nan() {
                    return;
                }
                let cast: Out = cast_via_f64::<In, Out>(v);
                acc[oi] = if is_prod { acc[oi].mul(cast) } else { acc[oi].add(cast) };
            });
            for (i, v) in acc.into_iter().enumerate() {
                unsafe { write(out.data_mut_ptr().add(i * std::mem::size_of::<Out>()), v) };
            }
        });
    });
    Ok(out)
}

/// Cast `v: In` to `Out` using the float round-trip for non-64-bit-integer
/// pairs, or an exact same-width bit-preserving cast when both `In` and
/// `Out` are 64-bit integers (so `u64` sums stay exact instead of losing
/// precision through `f64`).
fn cast_via_f64<In: NumElem, Out: NumElem>(v: In) -> Out
{
    if !In::is_float() && !Out::is_float() {
        Out::from_i64(v.to_i64())
    } else {
        Out::from_f64(v.to_f64())
    }
}

/// `min`: output dtype equals the input dtype; each output cell starts
/// uninitialised and is set on its first contributing element.
pub fn min(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| extremum(node, axes, false, false))
}

/// `max`: as `min`, keeping the larger value.
pub fn max(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| extremum(node, axes, true, false))
}

/// `nanmin`: as `min`, skipping NaN; an all-NaN cell is NaN. Float only.
pub fn nanmin(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nanmin")?;
        extremum(node, axes, false, true)
    })
}

/// `nanmax`: as `max`, skipping NaN; an all-NaN cell is NaN. Float only.
pub fn nanmax(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nanmax")?;
        extremum(node, axes, true, true)
    })
}

fn extremum(node: &Node, axes: Option<&[isize]>, want_max: bool, ignore_nan: bool) -> NResult<Node>
{
    if node.nitems() == 0 {
        return Err(value_err!("cannot reduce an empty array with no identity element"));
    }
    let (reduced, out) = setup(node, axes, node.dtype())?;
    let is_reduced = is_reduced_mask(node.ndim(), &reduced);
    let out_shape = out.shape();

    with_numeric_type!(node.dtype(), T => {
        let n_out = out.nitems().max(1);
        let mut acc = vec![T::zero(); n_out];
        let mut seen = vec![false; n_out];
        let mut any_nan = vec![false; n_out];
        walk_reduce(node, &is_reduced, &out_shape, |_coords, ptr, oi| unsafe {
            let v: T = read(ptr);
            if ignore_nan && v.is_nan() {
                return;
            }
            if v.is_nan() {
                any_nan[oi] = true;
            }
            if !seen[oi] {
                acc[oi] = v;
                seen[oi] = true;
            } else if (want_max && v > acc[oi]) || (!want_max && v < acc[oi]) {
                acc[oi] = v;
            }
        });
        for i in 0..n_out {
            let v = if !seen[i] { <T as NumElem>::from_f64(f64::NAN) } else if any_nan[i] && !ignore_nan { <T as NumElem>::from_f64(f64::NAN) } else { acc[i] };
            unsafe { write(out.data_mut_ptr().add(i * std::mem::size_of::<T>()), v) };
        }
    });
    Ok(out)
}

/// `mean`: `sum / count`; output always `float64`. An empty reduction
/// yields NaN.
pub fn mean(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| moments(node, axes, false, false))
}

/// `nanmean`: as `mean`, skipping NaN elements. Float only.
pub fn nanmean(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nanmean")?;
        moments(node, axes, false, true)
    })
}

/// `var`: `sumsq/count - (sum/count)^2`; output always `float64`.
pub fn var(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| moments(node, axes, true, false))
}

/// `nanvar`: as `var`, skipping NaN elements. Float only.
pub fn nanvar(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nanvar")?;
        moments(node, axes, true, true)
    })
}

/// `std`: `sqrt(var)`; output always `float64`.
pub fn std(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let v = moments(node, axes, true, false)?;
        sqrt_in_place(v)
    })
}

/// `nanstd`: `sqrt(nanvar)`. Float only.
pub fn nanstd(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_float(node, "nanstd")?;
        let v = moments(node, axes, true, true)?;
        sqrt_in_place(v)
    })
}

fn sqrt_in_place(node: Node) -> NResult<Node>
{
    for i in 0..node.nitems() {
        unsafe {
            let ptr = node.data_mut_ptr().add(i * 8) as *mut f64;
            *ptr = (*ptr).sqrt();
        }
    }
    Ok(node)
}

/// Shared sum/sumsq/count accumulation for `mean`/`var` and their NaN
/// variants; `want_var` selects `var = sumsq/count - mean^2` over plain
/// `mean = sum/count`.
fn moments(node: &Node, axes: Option<&[isize]>, want_var: bool, ignore_nan: bool) -> NResult<Node>
{
    let (reduced, out) = setup(node, axes, DType::Float64)?;
    let is_reduced = is_reduced_mask(node.ndim(), &reduced);
    let out_shape = out.shape();

    with_numeric_type!(node.dtype(), T => {
        let n_out = out.nitems().max(1);
        let mut sum = vec![0f64; n_out];
        let mut sumsq = vec![0f64; n_out];
        let mut count = vec![0u64; n_out];
        walk_reduce(node, &is_reduced, &out_shape, |_coords, ptr, oi| unsafe {
            let v: T = read(ptr);
            if ignore_nan && v.is_nan() {
                return;
            }
            let f = v.to_f64();
            sum[oi] += f;
            sumsq[oi] += f * f;
            count[oi] += 1;
        });
        for i in 0..n_out {
            let value = if count[i] == 0 {
                f64::NAN
            } else {
                let mean = sum[i] / count[i] as f64;
                if want_var {
                    sumsq[i] / count[i] as f64 - mean * mean
                } else {
                    mean
                }
            };
            unsafe { write::<f64>(out.data_mut_ptr().add(i * 8), value) };
        }
    });
    Ok(out)
}

/// `argmin`: the row-major-first index (within the reduced axes) attaining
/// the minimum; output dtype `int64`.
pub fn argmin(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| arg_extremum(node, axes, false))
}

/// `argmax`: as `argmin`, attaining the maximum.
pub fn argmax(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| arg_extremum(node, axes, true))
}

fn arg_extremum(node: &Node, axes: Option<&[isize]>, want_max: bool) -> NResult<Node>
{
    if node.nitems() == 0 {
        return Err(value_err!("cannot compute argmin/argmax of an empty array"));
    }
    let reduced = normalize_axes(node.ndim(), axes)?;
    let out_shape = output_shape(&node.shape(), &reduced);
    let out = Node::new_empty(&out_shape, DType::Int64)?;
    let is_reduced = is_reduced_mask(node.ndim(), &reduced);
    let shape = node.shape();

    with_numeric_type!(node.dtype(), T => {
        let n_out = out.nitems().max(1);
        let mut best_val = vec![T::zero(); n_out];
        let mut best_idx = vec![0i64; n_out];
        let mut seen = vec![false; n_out];
        walk_reduce(node, &is_reduced, &out_shape, |coords, ptr, oi| unsafe {
            let v: T = read(ptr);
            let idx = local_index(coords, &shape, &reduced);
            if !seen[oi] {
                best_val[oi] = v;
                best_idx[oi] = idx;
                seen[oi] = true;
            } else if (want_max && v > best_val[oi]) || (!want_max && v < best_val[oi]) {
                best_val[oi] = v;
                best_idx[oi] = idx;
            }
        });
        for (i, idx) in best_idx.into_iter().enumerate() {
            unsafe { write::<i64>(out.data_mut_ptr().add(i * 8), idx) };
        }
    });
    Ok(out)
}

/// `all`: short-circuits each output cell to `false` as soon as one
/// contributing element is zero. Output dtype `bool`.
pub fn all(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| bool_reduce(node, axes, true))
}

/// `any`: short-circuits each output cell to `true` as soon as one
/// contributing element is nonzero. Output dtype `bool`.
pub fn any(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| bool_reduce(node, axes, false))
}

fn bool_reduce(node: &Node, axes: Option<&[isize]>, is_all: bool) -> NResult<Node>
{
    let (reduced, out) = setup(node, axes, DType::Bool)?;
    let is_reduced = is_reduced_mask(node.ndim(), &reduced);
    let out_shape = out.shape();
    let init = is_all;
    let short_target = !is_all;

    with_numeric_type!(node.dtype(), T => {
        let n_out = out.nitems().max(1);
        let mut acc = vec![init; n_out];
        let mut done = vec![false; n_out];
        walk_reduce(node, &is_reduced, &out_shape, |_coords, ptr, oi| unsafe {
            if done[oi] {
                return;
            }
            let v: T = read(ptr);
            let val = !v.is_zero();
            acc[oi] = if short_target { acc[oi] || val } else { acc[oi] && val };
            if acc[oi] == short_target {
                done[oi] = true;
            }
        });
        for (i, v) in acc.into_iter().enumerate() {
            unsafe { write::<u8>(out.data_mut_ptr().add(i), v as u8) };
        }
    });
    Ok(out)
}

/// `count_nonzero`: per-output-cell count of elements where `value != 0`;
/// output dtype `int64`.
pub fn count_nonzero(node: &Node, axes: Option<&[isize]>) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let (reduced, out) = setup(node, axes, DType::Int64)?;
        let is_reduced = is_reduced_mask(node.ndim(), &reduced);
        let out_shape = out.shape();

        with_numeric_type!(node.dtype(), T => {
            let n_out = out.nitems().max(1);
            let mut counts = vec![0i64; n_out];
            walk_reduce(node, &is_reduced, &out_shape, |_coords, ptr, oi| unsafe {
                let v: T = read(ptr);
                if !v.is_zero() {
                    counts[oi] += 1;
                }
            });
            for (i, c) in counts.into_iter().enumerate() {
                unsafe { write::<i64>(out.data_mut_ptr().add(i * 8), c) };
            }
        });
        Ok(out)
    })
}
