//! Right-aligned shape broadcasting, grounded on `ndarray`'s
//! `dimension::broadcast::broadcast_shape` (same right-aligned algorithm,
//! generalized here from two fixed-rank `Dimension`s to `N` dynamically
//! shaped inputs).

use crate::error::{value_err, NResult};

/// Resolve the common broadcast shape of `shapes`, right-aligned.
///
/// For each axis position (counting from the last axis), every input that
/// has an extent there must either be `1` or equal to the common value; `1`
/// is always broadcastable. Fails with `Value` when shapes are not
/// broadcast-compatible.
pub fn broadcast_shapes(shapes: &[&[usize]]) -> NResult<Vec<usize>>
{
    let out_ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; out_ndim];

    for shape in shapes {
        let offset = out_ndim - shape.len();
        for (i, &extent) in shape.iter().enumerate() {
            let out_i = &mut out[offset + i];
            if *out_i == extent || extent == 1 {
                // keep out_i (broadcast extent 1 against it, or equal)
            } else if *out_i == 1 {
                *out_i = extent;
            } else {
                return Err(value_err!(
                    "shapes not broadcastable: {:?} against resolved {:?}",
                    shape, out
                ));
            }
        }
    }
    Ok(out)
}

/// Compute the per-axis broadcast strides of an input with `shape`/`strides`
/// against the resolved `out_shape`: zero stride on a broadcast axis (input
/// extent `1` where the output extent differs), the original stride
/// otherwise.
pub fn broadcast_strides(shape: &[usize], strides: &[isize], out_shape: &[usize]) -> Vec<isize>
{
    let offset = out_shape.len() - shape.len();
    let mut out = vec![0isize; out_shape.len()];
    for (i, (&extent, &stride)) in shape.iter().zip(strides.iter()).enumerate() {
        out[offset + i] = if extent == 1 && out_shape[offset + i] != 1 { 0 } else { stride };
    }
    out
}
