//! Basic slicing: a per-axis list of [`SliceRule`]s resolved against a
//! node's shape/strides into a new view, the runtime-rank generalisation of
//! `ndarray`'s `s![]`-built `SliceInfo`.

use crate::error::{value_err, NResult};
use crate::node::Node;

/// One axis (or axis-inserting/consuming) term of a slicing expression.
#[derive(Clone, Copy, Debug)]
pub enum SliceRule
{
    /// A single integer index; the axis it names is dropped from the
    /// result (negative indices count from the end).
    Index(isize),
    /// A Python-style `start:stop:step` range (each bound optional,
    /// negative indices count from the end, `step` may be negative but
    /// never zero).
    Range { start: Option<isize>, stop: Option<isize>, step: isize },
    /// Insert a new axis of extent 1 at this position.
    NewAxis,
    /// Fill with as many full-range axes as needed to cover the node's
    /// remaining rank; at most one per call.
    Ellipsis,
}

impl SliceRule
{
    /// A full, unstepped range over an entire axis (`[:]`).
    pub fn full() -> SliceRule
    {
        SliceRule::Range { start: None, stop: None, step: 1 }
    }
}

/// Apply a single-axis rule (equivalent to `multi_slice` with every other
/// axis left as `SliceRule::full()`).
pub fn slice(node: &Node, axis: usize, rule: SliceRule) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let mut rules = vec![SliceRule::full(); node.ndim()];
        if axis >= rules.len() {
            return Err(value_err!("axis {} out of range for {}-d array", axis, node.ndim()));
        }
        rules[axis] = rule;
        multi_slice(node, &rules)
    })
}

/// Apply every rule in `rules` simultaneously, in order, to `node`'s axes.
/// `SliceRule::Ellipsis` may appear at most once and expands to as many
/// `SliceRule::full()` entries as needed so that every *source* axis
/// (`Index`/`Range` terms, plus the axes implied by the ellipsis) is
/// accounted for; axes past the end of `rules` are implicitly full ranges.
pub fn multi_slice(node: &Node, rules: &[SliceRule]) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let ndim = node.ndim();
        let ellipsis_count = rules.iter().filter(|r| matches!(r, SliceRule::Ellipsis)).count();
        if ellipsis_count > 1 {
            return Err(value_err!("an indexing expression may contain at most one Ellipsis"));
        }
        let consuming = rules.iter().filter(|r| matches!(r, SliceRule::Index(_) | SliceRule::Range { .. })).count();
        if consuming > ndim {
            return Err(value_err!("too many indices for {}-d array: {} given", ndim, consuming));
        }
        let fill = ndim - consuming;

        let mut expanded: Vec<SliceRule> = Vec::with_capacity(rules.len() + fill);
        for &rule in rules {
            if matches!(rule, SliceRule::Ellipsis) {
                for _ in 0..fill {
                    expanded.push(SliceRule::full());
                }
            } else {
                expanded.push(rule);
            }
        }
        if ellipsis_count == 0 {
            for _ in 0..fill {
                expanded.push(SliceRule::full());
            }
        }

        let shape = node.shape();
        let strides = node.strides();
        let mut out_shape = Vec::with_capacity(expanded.len());
        let mut out_strides = Vec::with_capacity(expanded.len());
        let mut offset = node.offset();
        let mut src_axis = 0usize;

        for rule in expanded {
            match rule {
                SliceRule::NewAxis => {
                    out_shape.push(1);
                    out_strides.push(node.dtype().size() as isize);
                }
                SliceRule::Index(idx) => {
                    let extent = shape[src_axis];
                    let pos = normalize_index(idx, extent)?;
                    offset += pos as isize * strides[src_axis];
                    src_axis += 1;
                }
                SliceRule::Range { start, stop, step } => {
                    if step == 0 {
                        return Err(value_err!("slice step cannot be zero"));
                    }
                    let extent = shape[src_axis];
                    let (start, stop) = adjust_indices(extent as isize, start, stop, step);
                    let len = slice_len(start, stop, step);
                    offset += start * strides[src_axis];
                    out_shape.push(len);
                    out_strides.push(strides[src_axis] * step);
                    src_axis += 1;
                }
                SliceRule::Ellipsis => unreachable!("expanded away above"),
            }
        }

        Ok(Node::view_from_parts(node, out_shape, out_strides, offset, node.dtype()))
    })
}

fn normalize_index(idx: isize, extent: usize) -> NResult<usize>
{
    let extent_i = extent as isize;
    let pos = if idx < 0 { idx + extent_i } else { idx };
    if pos < 0 || pos >= extent_i {
        return Err(value_err!("index {} out of bounds for axis of extent {}", idx, extent));
    }
    Ok(pos as usize)
}

/// CPython's `PySlice_AdjustIndices`: resolve `start`/`stop` (each possibly
/// negative or absent) against `length` and a nonzero `step`.
fn adjust_indices(length: isize, start: Option<isize>, stop: Option<isize>, step: isize) -> (isize, isize)
{
    let clamp_lower = |v: isize| -> isize {
        if v < 0 {
            let v = v + length;
            if v < 0 { if step < 0 { -1 } else { 0 } } else { v }
        } else if v >= length {
            if step < 0 { length - 1 } else { length }
        } else {
            v
        }
    };
    let start = match start {
        None => {
            if step < 0 {
                length - 1
            } else {
                0
            }
        }
        Some(s) => clamp_lower(s),
    };
    let stop = match stop {
        None => {
            if step < 0 {
                -1
            } else {
                length
            }
        }
        Some(e) => clamp_lower(e),
    };
    (start, stop)
}

fn slice_len(start: isize, stop: isize, step: isize) -> usize
{
    if step > 0 {
        if stop <= start { 0 } else { ((stop - start + step - 1) / step) as usize }
    } else {
        if stop >= start { 0 } else { ((start - stop + (-step) - 1) / (-step)) as usize }
    }
}

#[cfg(test)]
mod tests
{
    use crate::dtype::DType;
    use crate::node::Node;

    use super::*;

    #[test]
    fn basic_range_drops_nothing_unstepped()
    {
        let n = Node::new_empty(&[5], DType::Int32).unwrap();
        let s = slice(&n, 0, SliceRule::full()).unwrap();
        assert_eq!(s.shape(), vec![5]);
    }

    #[test]
    fn negative_step_reverses()
    {
        let n = Node::new_empty(&[5], DType::Int32).unwrap();
        let s = slice(&n, 0, SliceRule::Range { start: None, stop: None, step: -1 }).unwrap();
        assert_eq!(s.shape(), vec![5]);
        assert_eq!(s.strides()[0], -(n.strides()[0]));
    }

    #[test]
    fn index_drops_axis()
    {
        let n = Node::new_empty(&[2, 3], DType::Int32).unwrap();
        let mut rules = vec![SliceRule::full(); 2];
        rules[0] = SliceRule::Index(1);
        let s = multi_slice(&n, &rules).unwrap();
        assert_eq!(s.shape(), vec![3]);
    }

    #[test]
    fn ellipsis_expands_to_remaining_axes()
    {
        let n = Node::new_empty(&[2, 3, 4], DType::Int32).unwrap();
        let rules = vec![SliceRule::Index(0), SliceRule::Ellipsis];
        let s = multi_slice(&n, &rules).unwrap();
        assert_eq!(s.shape(), vec![3, 4]);
    }

    #[test]
    fn newaxis_inserts_unit_dimension()
    {
        let n = Node::new_empty(&[3], DType::Int32).unwrap();
        let rules = vec![SliceRule::NewAxis, SliceRule::full()];
        let s = multi_slice(&n, &rules).unwrap();
        assert_eq!(s.shape(), vec![1, 3]);
    }

    #[test]
    fn out_of_bounds_index_errors()
    {
        let n = Node::new_empty(&[3], DType::Int32).unwrap();
        assert!(slice(&n, 0, SliceRule::Index(5)).is_err());
    }

    #[test]
    fn stepped_range_matches_python_slice_len()
    {
        let n = Node::new_empty(&[10], DType::Int32).unwrap();
        let s = slice(&n, 0, SliceRule::Range { start: Some(1), stop: Some(9), step: 2 }).unwrap();
        assert_eq!(s.shape(), vec![4]);
    }
}
