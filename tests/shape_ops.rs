use ndcore::convert::to_contiguous_bytes;
use ndcore::dtype::DType;
use ndcore::node::Node;
use ndcore::shape_ops;

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
fn reshape_preserves_row_major_element_order()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let out = shape_ops::reshape(&n, &[3, 2]).unwrap();
    assert_eq!(out.shape(), vec![3, 2]);
    assert_eq!(as_i32s(&out), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn reshape_mutates_in_place_when_the_node_is_uniquely_owned()
{
    let n = i32_node(&[1, 2, 3, 4], &[4]);
    assert_eq!(n.ref_count(), 1);
    let out = shape_ops::reshape(&n, &[2, 2]).unwrap();
    assert_eq!(out.shape(), vec![2, 2]);
}

#[test]
fn transpose_reverses_axis_order_without_copying_data()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let t = shape_ops::transpose(&n).unwrap();
    assert_eq!(t.shape(), vec![3, 2]);
    assert_eq!(as_i32s(&t), vec![1, 4, 2, 5, 3, 6]);
}

#[test]
fn squeeze_with_no_axis_drops_every_extent_one_axis()
{
    let n = i32_node(&[1, 2, 3], &[1, 3, 1]);
    let out = shape_ops::squeeze(&n, None).unwrap();
    assert_eq!(out.shape(), vec![3]);
}

#[test]
fn squeeze_rejects_an_axis_with_extent_greater_than_one()
{
    let n = i32_node(&[1, 2, 3], &[3]);
    assert!(shape_ops::squeeze(&n, Some(0)).is_err());
}

#[test]
fn expand_dims_inserts_an_extent_one_axis()
{
    let n = i32_node(&[1, 2, 3], &[3]);
    let out = shape_ops::expand_dims(&n, 0).unwrap();
    assert_eq!(out.shape(), vec![1, 3]);
    let out2 = shape_ops::expand_dims(&n, 1).unwrap();
    assert_eq!(out2.shape(), vec![3, 1]);
}

#[test]
fn swapaxes_exchanges_the_named_axes()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let out = shape_ops::swapaxes(&n, 0, 1).unwrap();
    assert_eq!(out.shape(), vec![3, 2]);
    assert_eq!(as_i32s(&out), as_i32s(&shape_ops::transpose(&n).unwrap()));
}

#[test]
fn broadcast_to_zeros_the_stride_on_expanded_axes()
{
    let row = i32_node(&[1, 2, 3], &[3]);
    let out = shape_ops::broadcast_to(&row, &[2, 3]).unwrap();
    assert_eq!(out.shape(), vec![2, 3]);
    assert_eq!(as_i32s(&out), vec![1, 2, 3, 1, 2, 3]);
}

#[test]
fn broadcast_to_rejects_an_incompatible_target_shape()
{
    let row = i32_node(&[1, 2, 3], &[3]);
    assert!(shape_ops::broadcast_to(&row, &[2, 4]).is_err());
}

#[test]
fn moveaxis_relocates_a_single_axis()
{
    let n = Node::new_empty(&[2, 3, 4], DType::Int32).unwrap();
    let out = shape_ops::moveaxis(&n, 0, 2).unwrap();
    assert_eq!(out.shape(), vec![3, 4, 2]);
}
