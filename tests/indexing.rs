use ndcore::convert::to_contiguous_bytes;
use ndcore::dtype::DType;
use ndcore::indexing::{self, Mode, SliceRule};
use ndcore::narray::NArray;
use ndcore::node::Node;

fn i32_node(values: &[i32], shape: &[usize]) -> Node
{
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    Node::new(&bytes, shape, DType::Int32).unwrap()
}

fn as_i32s(n: &Node) -> Vec<i32>
{
    to_contiguous_bytes(n).unwrap().chunks_exact(4).map(|c| i32::from_ne_bytes(c.try_into().unwrap())).collect()
}

#[test]
fn strided_slice_of_a_2x3_array_yields_a_2x2_view()
{
    // [[1,2,3],[4,5,6]], slice{1,3,1} on axis 1 -> [[2,3],[5,6]]
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let out = indexing::slice(&n, 1, SliceRule::Range { start: Some(1), stop: Some(3), step: 1 }).unwrap();
    assert_eq!(out.shape(), vec![2, 2]);
    assert_eq!(as_i32s(&out), vec![2, 3, 5, 6]);
}

#[test]
fn slice_of_a_slice_over_the_full_range_is_idempotent()
{
    let n = i32_node(&[1, 2, 3, 4, 5], &[5]);
    let once = indexing::slice(&n, 0, SliceRule::full()).unwrap();
    let twice = indexing::slice(&once, 0, SliceRule::full()).unwrap();
    assert_eq!(as_i32s(&once), as_i32s(&twice));
    assert_eq!(as_i32s(&twice), vec![1, 2, 3, 4, 5]);
}

#[test]
fn multi_slice_drops_an_axis_on_integer_index_and_keeps_a_trailing_axis_full()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let out = indexing::multi_slice(&n, &[SliceRule::Index(1)]).unwrap();
    assert_eq!(out.shape(), vec![3]);
    assert_eq!(as_i32s(&out), vec![4, 5, 6]);
}

#[test]
fn boolean_mask_of_a_2x3_array_selects_flattened_true_positions()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let mask = NArray::from_bool_slice(&[true, false, true, false, true, false], &[2, 3]).unwrap();
    let out = indexing::boolean_mask(&n, &mask).unwrap();
    assert_eq!(out.shape(), vec![3]);
    assert_eq!(as_i32s(&out), vec![1, 3, 5]);
}

#[test]
fn take_with_wrap_clip_and_error_modes_matches_the_documented_scenario()
{
    let n = i32_node(&[10, 20, 30, 40, 50], &[5]);

    let wrap_idx = NArray::from_i64_slice(&[-1, 7], &[2]).unwrap();
    let wrapped = indexing::take(&n, &wrap_idx, 0, Mode::Wrap).unwrap();
    assert_eq!(as_i32s(&wrapped), vec![50, 30]);

    let clip_idx = NArray::from_i64_slice(&[-1, 7], &[2]).unwrap();
    let clipped = indexing::take(&n, &clip_idx, 0, Mode::Clip).unwrap();
    assert_eq!(as_i32s(&clipped), vec![50, 50]);

    let error_idx = NArray::from_i64_slice(&[7], &[1]).unwrap();
    assert!(indexing::take(&n, &error_idx, 0, Mode::Error).is_err());
}

#[test]
fn take_with_every_valid_index_in_order_is_the_identity()
{
    let n = i32_node(&[1, 2, 3, 4], &[4]);
    let idx = NArray::from_i64_slice(&[0, 1, 2, 3], &[4]).unwrap();
    let out = indexing::take(&n, &idx, 0, Mode::Error).unwrap();
    assert_eq!(as_i32s(&out), as_i32s(&n));
}

#[test]
fn take_along_any_axis_with_the_full_index_range_reproduces_the_input()
{
    // take(x, [0..n-1], axis=k) == x, for a non-trailing axis of a 2-D array.
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let idx = NArray::from_i64_slice(&[0, 1], &[2]).unwrap();
    let out = indexing::take(&n, &idx, 0, Mode::Error).unwrap();
    assert_eq!(out.shape(), n.shape());
    assert_eq!(as_i32s(&out), as_i32s(&n));
}

#[test]
fn take_gathers_along_a_non_trailing_axis_of_a_2d_array()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let idx = NArray::from_i64_slice(&[1, 0], &[2]).unwrap();
    let out = indexing::take(&n, &idx, 1, Mode::Error).unwrap();
    assert_eq!(out.shape(), vec![2, 2]);
    assert_eq!(as_i32s(&out), vec![2, 1, 5, 4]);
}

#[test]
fn put_scatters_values_at_the_given_flat_positions()
{
    let n = Node::new_empty(&[4], DType::Int32).unwrap();
    let idx = NArray::from_i64_slice(&[1, 3], &[2]).unwrap();
    let values = NArray::from_node(&i32_node(&[7, 9], &[2])).unwrap();
    indexing::put(&n, &idx, &values, Mode::Error).unwrap();
    assert_eq!(as_i32s(&n), vec![0, 7, 0, 9]);
}

#[test]
fn index_with_int_array_gathers_along_an_axis_with_arbitrary_index_shape()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let idx = NArray::from_i64_slice(&[2, 0, 1], &[3]).unwrap();
    let out = indexing::index_with_int_array(&n, 1, &idx).unwrap();
    assert_eq!(out.shape(), vec![2, 3]);
    assert_eq!(as_i32s(&out), vec![3, 1, 2, 6, 4, 5]);
}

#[test]
fn advanced_index_combines_one_index_array_per_leading_axis()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let rows = NArray::from_i64_slice(&[0, 1], &[2]).unwrap();
    let cols = NArray::from_i64_slice(&[2, 0], &[2]).unwrap();
    let out = indexing::advanced_index(&n, &[&rows, &cols]).unwrap();
    assert_eq!(out.shape(), vec![2]);
    assert_eq!(as_i32s(&out), vec![3, 4]);
}
