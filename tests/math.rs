use ndcore::convert::to_contiguous_bytes;
use ndcore::dtype::DType;
use ndcore::math;
use ndcore::node::Node;

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

fn as_bools(n: &Node) -> Vec<bool>
{
    to_contiguous_bytes(n).unwrap().iter().map(|&b| b != 0).collect()
}

#[test]
fn add_broadcasts_a_row_against_a_matrix()
{
    let a = i32_node(&[1, 2, 3, 4, 5, 6], &[2, 3]);
    let row = i32_node(&[10, 20, 30], &[3]);
    let out = math::add(&a, &row).unwrap();
    assert_eq!(out.shape(), vec![2, 3]);
    assert_eq!(as_i32s(&out), vec![11, 22, 33, 14, 25, 36]);
}

#[test]
fn add_of_int32_and_float64_promotes_to_float64()
{
    let a = i32_node(&[1, 2, 3], &[3]);
    let b = f64_node(&[0.5, 0.5, 0.5], &[3]);
    let out = math::add(&a, &b).unwrap();
    assert_eq!(out.dtype(), DType::Float64);
    assert_eq!(as_f64s(&out), vec![1.5, 2.5, 3.5]);
}

#[test]
fn floor_div_rounds_toward_negative_infinity()
{
    let a = i32_node(&[-7, 7, -7, 7], &[4]);
    let b = i32_node(&[2, 2, -2, -2], &[4]);
    let out = math::floor_div(&a, &b).unwrap();
    assert_eq!(as_i32s(&out), vec![-4, 3, 3, -4]);
}

#[test]
fn div_by_zero_on_an_integer_dtype_is_an_error()
{
    let a = i32_node(&[1], &[1]);
    let zero = i32_node(&[0], &[1]);
    assert!(math::div(&a, &zero).is_err());
}

#[test]
fn div_by_zero_on_a_float_dtype_yields_infinity_not_an_error()
{
    let a = f64_node(&[1.0], &[1]);
    let zero = f64_node(&[0.0], &[1]);
    let out = math::div(&a, &zero).unwrap();
    assert!(as_f64s(&out)[0].is_infinite());
}

#[test]
fn comparisons_always_produce_bool()
{
    let a = i32_node(&[1, 2, 3], &[3]);
    let b = i32_node(&[3, 2, 1], &[3]);
    let out = math::lt(&a, &b).unwrap();
    assert_eq!(out.dtype(), DType::Bool);
    assert_eq!(as_bools(&out), vec![true, false, false]);
}

#[test]
fn bitwise_xor_rejects_float_operands()
{
    let a = f64_node(&[1.0], &[1]);
    let b = f64_node(&[2.0], &[1]);
    assert!(math::bitwise_xor(&a, &b).is_err());
}

#[test]
fn sqrt_widens_integer_input_to_float64()
{
    let a = i32_node(&[4, 9, 16], &[3]);
    let out = math::sqrt(&a).unwrap();
    assert_eq!(out.dtype(), DType::Float64);
    assert_eq!(as_f64s(&out), vec![2.0, 3.0, 4.0]);
}

#[test]
fn neg_and_abs_round_trip_on_signed_integers()
{
    let a = i32_node(&[-3, 4, 0], &[3]);
    let negated = math::neg(&a).unwrap();
    assert_eq!(as_i32s(&negated), vec![3, -4, 0]);
    let absolute = math::abs(&a).unwrap();
    assert_eq!(as_i32s(&absolute), vec![3, 4, 0]);
}
