//! Elementwise arithmetic, comparison, logical and bitwise operations,
//! grounded on `ndarray`'s `Zip`-driven `azip!`/`Zip::apply` elementwise
//! machinery, generalised from compile-time element types to runtime dtype
//! dispatch.
//!
//! Every op: (1) promotes its operand dtypes per [`DType::promote`], (2)
//! casts operands that don't already match the promoted dtype, (3)
//! broadcasts shapes, (4) runs one monomorphic loop over
//! [`NMultiIter`] at the resolved storage type.

use crate::convert;
use crate::dispatch::{DtypeTag, NFunc};
use crate::dtype::DType;
use crate::elem::{with_float_type, with_integer_type, with_numeric_type, FloatElem, NumElem};
use crate::error::{type_err, value_err, NResult};
use crate::iterators::NMultiIter;
use crate::node::Node;
use crate::shape;

fn broadcast_shape_of(a: &Node, b: &Node) -> NResult<Vec<usize>>
{
    let a_shape = a.shape();
    let b_shape = b.shape();
    shape::broadcast_shapes(&[a_shape.as_slice(), b_shape.as_slice()])
}

fn cast_if_needed(node: &Node, to: DType) -> NResult<Node>
{
    if node.dtype() == to { Ok(node.clone()) } else { convert::cast(node, to) }
}

macro_rules! arith_binary_op {
    ($fn_name:ident, $method:ident) => {
        pub fn $fn_name(a: &Node, b: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let promoted = DType::promote(a.dtype(), b.dtype());
                let out_shape = broadcast_shape_of(a, b)?;
                let a_cast = cast_if_needed(a, promoted)?;
                let b_cast = cast_if_needed(b, promoted)?;
                let out = Node::new_empty(&out_shape, promoted)?;
                with_numeric_type!(promoted, T => {
                    for ptrs in NMultiIter::new(&[&out, &a_cast, &b_cast])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let bv = std::ptr::read_unaligned(ptrs[2] as *const T);
                            let r: T = NumElem::$method(av, bv);
                            std::ptr::write_unaligned(ptrs[0] as *mut T, r);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

arith_binary_op!(add, add);
arith_binary_op!(sub, sub);
arith_binary_op!(mul, mul);
arith_binary_op!(pow, pow);

/// Shared implementation for `div`/`floor_div`/`mod`: integer dtypes raise
/// `ZeroDivision` eagerly on a zero divisor (Rust's native integer division
/// panics, so this crate checks first); float dtypes never raise, relying
/// on IEEE-754 `inf`/`NaN` semantics.
macro_rules! arith_binary_checked_op {
    ($fn_name:ident, $method:ident) => {
        pub fn $fn_name(a: &Node, b: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let promoted = DType::promote(a.dtype(), b.dtype());
                let out_shape = broadcast_shape_of(a, b)?;
                let a_cast = cast_if_needed(a, promoted)?;
                let b_cast = cast_if_needed(b, promoted)?;
                let out = Node::new_empty(&out_shape, promoted)?;
                with_numeric_type!(promoted, T => {
                    for ptrs in NMultiIter::new(&[&out, &a_cast, &b_cast])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let bv = std::ptr::read_unaligned(ptrs[2] as *const T);
                            if !<T as NumElem>::is_float() && bv.is_zero() {
                                return Err(crate::error::NError::new(
                                    crate::error::ErrorKind::ZeroDivision,
                                    format!("{}: division by zero", stringify!($fn_name)),
                                ));
                            }
                            let r: T = NumElem::$method(av, bv);
                            std::ptr::write_unaligned(ptrs[0] as *mut T, r);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

arith_binary_checked_op!(div, div);
arith_binary_checked_op!(floor_div, floor_div);
arith_binary_checked_op!(rem, rem_euclid_like);

macro_rules! compare_op {
    ($fn_name:ident, $cmp:expr) => {
        pub fn $fn_name(a: &Node, b: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let promoted = DType::promote(a.dtype(), b.dtype());
                let out_shape = broadcast_shape_of(a, b)?;
                let a_cast = cast_if_needed(a, promoted)?;
                let b_cast = cast_if_needed(b, promoted)?;
                let out = Node::new_empty(&out_shape, DType::Bool)?;
                with_numeric_type!(promoted, T => {
                    for ptrs in NMultiIter::new(&[&out, &a_cast, &b_cast])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let bv = std::ptr::read_unaligned(ptrs[2] as *const T);
                            let cmp: fn(T, T) -> bool = $cmp;
                            std::ptr::write_unaligned(ptrs[0], cmp(av, bv) as u8);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

compare_op!(eq, |a, b| a == b);
compare_op!(ne, |a, b| a != b);
compare_op!(lt, |a, b| a < b);
compare_op!(le, |a, b| a <= b);
compare_op!(gt, |a, b| a > b);
compare_op!(ge, |a, b| a >= b);

macro_rules! logical_binary_op {
    ($fn_name:ident, $combine:expr) => {
        pub fn $fn_name(a: &Node, b: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let promoted = DType::promote(a.dtype(), b.dtype());
                let out_shape = broadcast_shape_of(a, b)?;
                let a_cast = cast_if_needed(a, promoted)?;
                let b_cast = cast_if_needed(b, promoted)?;
                let out = Node::new_empty(&out_shape, DType::Bool)?;
                with_numeric_type!(promoted, T => {
                    for ptrs in NMultiIter::new(&[&out, &a_cast, &b_cast])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let bv = std::ptr::read_unaligned(ptrs[2] as *const T);
                            let combine: fn(bool, bool) -> bool = $combine;
                            let r = combine(!av.is_zero(), !bv.is_zero());
                            std::ptr::write_unaligned(ptrs[0], r as u8);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

logical_binary_op!(logical_and, |a, b| a && b);
logical_binary_op!(logical_or, |a, b| a || b);
logical_binary_op!(logical_xor, |a, b| a != b);

pub fn logical_not(a: &Node) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        let out = Node::new_empty(&a.shape(), DType::Bool)?;
        with_numeric_type!(a.dtype(), T => {
            for ptrs in NMultiIter::new(&[&out, a])? {
                unsafe {
                    let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                    std::ptr::write_unaligned(ptrs[0], av.is_zero() as u8);
                }
            }
        });
        Ok(out)
    })
}

/// Require that `dtype` is `bool` or an integer kind, as bitwise ops and
/// shifts do: undefined for float operands.
fn require_bitwise_dtype(dtype: DType) -> NResult<()>
{
    if dtype.is_integer() || dtype.is_bool() {
        Ok(())
    } else {
        Err(type_err!("bitwise operations require an integer or bool dtype, got {}", dtype))
    }
}

macro_rules! bitwise_binary_op {
    ($fn_name:ident, $op:tt) => {
        pub fn $fn_name(a: &Node, b: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let promoted = DType::promote(a.dtype(), b.dtype());
                require_bitwise_dtype(promoted)?;
                let out_shape = broadcast_shape_of(a, b)?;
                let a_cast = cast_if_needed(a, promoted)?;
                let b_cast = cast_if_needed(b, promoted)?;
                let out = Node::new_empty(&out_shape, promoted)?;
                with_integer_type!(promoted, T => {
                    for ptrs in NMultiIter::new(&[&out, &a_cast, &b_cast])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let bv = std::ptr::read_unaligned(ptrs[2] as *const T);
                            std::ptr::write_unaligned(ptrs[0] as *mut T, av $op bv);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

bitwise_binary_op!(bitwise_and, &);
bitwise_binary_op!(bitwise_or, |);
bitwise_binary_op!(bitwise_xor, ^);

pub fn bitwise_not(a: &Node) -> NResult<Node>
{
    crate::error::with_error_channel(|| {
        require_bitwise_dtype(a.dtype())?;
        let out = Node::new_empty(&a.shape(), a.dtype())?;
        with_integer_type!(a.dtype(), T => {
            for ptrs in NMultiIter::new(&[&out, a])? {
                unsafe {
                    let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                    std::ptr::write_unaligned(ptrs[0] as *mut T, !av);
                }
            }
        });
        Ok(out)
    })
}

macro_rules! shift_op {
    ($fn_name:ident, $op:tt) => {
        pub fn $fn_name(a: &Node, b: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let promoted = DType::promote(a.dtype(), b.dtype());
                require_bitwise_dtype(promoted)?;
                let out_shape = broadcast_shape_of(a, b)?;
                let a_cast = cast_if_needed(a, promoted)?;
                let b_cast = cast_if_needed(b, promoted)?;
                let out = Node::new_empty(&out_shape, promoted)?;
                with_integer_type!(promoted, T => {
                    for ptrs in NMultiIter::new(&[&out, &a_cast, &b_cast])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let bv = std::ptr::read_unaligned(ptrs[2] as *const T);
                            let shift = bv.to_i64() as u32 % (std::mem::size_of::<T>() as u32 * 8);
                            std::ptr::write_unaligned(ptrs[0] as *mut T, av $op shift);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

shift_op!(left_shift, <<);
shift_op!(right_shift, >>);

macro_rules! unary_op {
    ($fn_name:ident, $method:ident) => {
        pub fn $fn_name(a: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let out = Node::new_empty(&a.shape(), a.dtype())?;
                with_numeric_type!(a.dtype(), T => {
                    for ptrs in NMultiIter::new(&[&out, a])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let r: T = NumElem::$method(av);
                            std::ptr::write_unaligned(ptrs[0] as *mut T, r);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

unary_op!(neg, neg);
unary_op!(abs, abs);
unary_op!(sign, sign);

/// Unary op whose output dtype is always float ([`DtypeTag::Float`]):
/// integer inputs widen to `float64`.
macro_rules! float_unary_op {
    ($fn_name:ident, $method:ident) => {
        pub fn $fn_name(a: &Node) -> NResult<Node>
        {
            crate::error::with_error_channel(|| {
                let func = NFunc::unary(stringify!($fn_name), DtypeTag::Float);
                let out_dtype = func.resolve_dtype(a.dtype());
                let a_cast = cast_if_needed(a, out_dtype)?;
                let out = Node::new_empty(&a.shape(), out_dtype)?;
                with_float_type!(out_dtype, T => {
                    for ptrs in NMultiIter::new(&[&out, &a_cast])? {
                        unsafe {
                            let av = std::ptr::read_unaligned(ptrs[1] as *const T);
                            let r: T = <T as FloatElem>::$method(av);
                            std::ptr::write_unaligned(ptrs[0] as *mut T, r);
                        }
                    }
                });
                Ok(out)
            })
        }
    };
}

float_unary_op!(sqrt, sqrt_);
float_unary_op!(exp, exp_);
float_unary_op!(log, log_);
float_unary_op!(sin, sin_);
float_unary_op!(cos, cos_);
float_unary_op!(tan, tan_);
float_unary_op!(asin, asin_);
float_unary_op!(acos, acos_);
float_unary_op!(atan, atan_);
float_unary_op!(floor, floor_);
float_unary_op!(ceil, ceil_);
float_unary_op!(round, round_);

#[cfg(test)]
mod tests
{
    use super::*;

    fn scalar(v: i32) -> Node
    {
        Node::new(&v.to_ne_bytes(), &[], DType::Int32).unwrap()
    }

    fn scalar_f64(v: f64) -> Node
    {
        Node::new(&v.to_ne_bytes(), &[], DType::Float64).unwrap()
    }

    #[test]
    fn add_promotes_mixed_dtypes()
    {
        let a = scalar(2);
        let b = scalar_f64(3.5);
        let out = add(&a, &b).unwrap();
        assert_eq!(out.dtype(), DType::Float64);
        unsafe {
            assert_eq!(*(out.data_ptr() as *const f64), 5.5);
        }
    }

    #[test]
    fn div_by_zero_int_raises_zero_division()
    {
        let a = scalar(1);
        let b = scalar(0);
        let err = div(&a, &b).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ZeroDivision);
    }

    #[test]
    fn float_div_by_zero_yields_infinity()
    {
        let a = scalar_f64(1.0);
        let b = scalar_f64(0.0);
        let out = div(&a, &b).unwrap();
        unsafe {
            assert!((*(out.data_ptr() as *const f64)).is_infinite());
        }
    }

    #[test]
    fn comparisons_broadcast_and_yield_bool()
    {
        let a = Node::new_empty(&[3], DType::Int32).unwrap();
        let b = scalar(0);
        let out = lt(&a, &b).unwrap();
        assert_eq!(out.dtype(), DType::Bool);
        assert_eq!(out.shape(), vec![3]);
    }

    #[test]
    fn bitwise_rejects_float_operands()
    {
        let a = scalar_f64(1.0);
        let b = scalar_f64(2.0);
        assert!(bitwise_and(&a, &b).is_err());
    }

    #[test]
    fn sqrt_widens_integer_to_float64()
    {
        let a = scalar(4);
        let out = sqrt(&a).unwrap();
        assert_eq!(out.dtype(), DType::Float64);
        unsafe {
            assert_eq!(*(out.data_ptr() as *const f64), 2.0);
        }
    }
}
