use ndcore::convert::to_contiguous_bytes;
use ndcore::cumulative;
use ndcore::dtype::DType;
use ndcore::node::Node;
use ndcore::shape_ops;

fn i32_node(values: &[i32], shape: &[usize]) -> Node
{
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    Node::new(&bytes, shape, DType::Int32).unwrap()
}

fn f64_node(values: &[f64], shape: &[usize]) -> Node
{
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    Node::new(&bytes, shape, DType::Float64).unwrap()
}

fn as_i32s(n: &Node) -> Vec<i32>
{
    to_contiguous_bytes(n).unwrap().chunks_exact(4).map(|c| i32::from_ne_bytes(c.try_into().unwrap())).collect()
}

fn as_f64s(n: &Node) -> Vec<f64>
{
    to_contiguous_bytes(n).unwrap().chunks_exact(8).map(|c| f64::from_ne_bytes(c.try_into().unwrap())).collect()
}

fn as_i64s(n: &Node) -> Vec<i64>
{
    to_contiguous_bytes(n).unwrap().chunks_exact(8).map(|c| i64::from_ne_bytes(c.try_into().unwrap())).collect()
}

#[test]
fn cumsum_defaults_to_the_last_axis()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let out = cumulative::cumsum(&n, None).unwrap();
    assert_eq!(out.shape(), vec![2, 3]);
    assert_eq!(as_i32s(&out), vec![1, 3, 6, 4, 9, 15]);
}

#[test]
fn cumsum_along_axis_zero_runs_down_each_column_independently()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let out = cumulative::cumsum(&n, Some(0)).unwrap();
    assert_eq!(as_i32s(&out), vec![1, 2, 3, 5, 7, 9]);
}

#[test]
fn cumsum_on_a_transposed_view_matches_manual_column_walk()
{
    let n = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let t = shape_ops::transpose(&n).unwrap();
    assert_eq!(t.shape(), vec![3, 2]);
    let out = cumulative::cumsum(&t, Some(1)).unwrap();
    assert_eq!(as_i32s(&out), vec![1, 5, 2, 7, 3, 9]);
}

#[test]
fn diff_reduces_the_chosen_axis_by_one()
{
    let n = i32_node(&[1, 3, 6, 10], &[4]);
    let out = cumulative::diff(&n, None).unwrap();
    assert_eq!(out.shape(), vec![3]);
    assert_eq!(out.dtype(), DType::Int64);
    assert_eq!(as_i64s(&out), vec![2, 3, 4]);
}

#[test]
fn diff_rejects_an_axis_of_length_one()
{
    let n = i32_node(&[7], &[1]);
    assert!(cumulative::diff(&n, None).is_err());
}

#[test]
fn gradient_is_centered_in_the_interior_and_one_sided_at_the_edges()
{
    let n = f64_node(&[1.0, 2.0, 4.0, 7.0], &[4]);
    let out = cumulative::gradient(&n, None).unwrap();
    let g = as_f64s(&out);
    assert!((g[0] - 1.0).abs() < 1e-9);
    assert!((g[1] - 1.5).abs() < 1e-9);
    assert!((g[2] - 2.5).abs() < 1e-9);
    assert!((g[3] - 3.0).abs() < 1e-9);
}

#[test]
fn cumsum_writes_a_nan_through_without_propagating_it_to_later_positions()
{
    let n = f64_node(&[1.0, f64::NAN, 2.0, 3.0], &[4]);
    let out = cumulative::cumsum(&n, None).unwrap();
    let v = as_f64s(&out);
    assert_eq!(v[0], 1.0);
    assert!(v[1].is_nan());
    assert_eq!(v[2], 3.0);
    assert_eq!(v[3], 6.0);
}

#[test]
fn nancumsum_carries_the_last_real_accumulator_through_a_nan()
{
    let bytes: Vec<u8> = [1.0f64, f64::NAN, 3.0].iter().flat_map(|v| v.to_ne_bytes()).collect();
    let n = Node::new(&bytes, &[3], DType::Float64).unwrap();
    let out = cumulative::nancumsum(&n, None).unwrap();
    let v = as_f64s(&out);
    assert!((v[0] - 1.0).abs() < 1e-9);
    assert!((v[1] - 1.0).abs() < 1e-9);
    assert!((v[2] - 4.0).abs() < 1e-9);
}

#[test]
fn nancumsum_rejects_non_float_input()
{
    let n = i32_node(&[1, 2, 3], &[3]);
    assert!(cumulative::nancumsum(&n, None).is_err());
}
