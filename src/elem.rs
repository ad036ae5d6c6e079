//! Per-dtype monomorphic kernel support.
//!
//! Rather than a per-dtype table of function pointers, dispatch goes through
//! a trait with one implementor per primitive storage type. [`NumElem`] is
//! that trait: every numeric kernel in the crate (convert, math, reduce,
//! cumulative) is written once, generically over `T: NumElem`, then
//! instantiated by a small `match DType { ... }` at the dispatch boundary
//! (see [`crate::dispatch`]).
//!
//! `DType::Bool` and `DType::UInt8` share the storage type `u8`; they differ
//! only in the *cast* semantics applied when a value is written into a
//! bool-typed buffer (truncation vs. `x != 0`), which lives in
//! [`crate::convert`].

/// A primitive storage type backing one or more [`crate::dtype::DType`]
/// values.
pub trait NumElem: Copy + PartialOrd + PartialEq + 'static + std::fmt::Debug
{
    fn zero() -> Self;
    fn one() -> Self;
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    /// Precondition: `rhs` is not zero — callers check the zero-division
    /// policy for integer dtypes before calling.
    fn div(self, rhs: Self) -> Self;
    fn rem_euclid_like(self, rhs: Self) -> Self;
    fn floor_div(self, rhs: Self) -> Self;
    fn pow(self, rhs: Self) -> Self;
    fn neg(self) -> Self;
    fn abs(self) -> Self;
    fn sign(self) -> Self;
    fn is_zero(self) -> bool
    {
        self == Self::zero()
    }
    fn is_nan(self) -> bool
    {
        false
    }
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
    fn to_i64(self) -> i64;
    fn from_i64(v: i64) -> Self;
    fn is_float() -> bool
    {
        false
    }
}

macro_rules! impl_num_elem_int {
    ($t:ty) => {
        impl NumElem for $t
        {
            fn zero() -> Self
            {
                <$t as num_traits::Zero>::zero()
            }
            fn one() -> Self
            {
                <$t as num_traits::One>::one()
            }
            fn add(self, rhs: Self) -> Self
            {
                self.wrapping_add(rhs)
            }
            fn sub(self, rhs: Self) -> Self
            {
                self.wrapping_sub(rhs)
            }
            fn mul(self, rhs: Self) -> Self
            {
                self.wrapping_mul(rhs)
            }
            fn div(self, rhs: Self) -> Self
            {
                self.wrapping_div(rhs)
            }
            fn rem_euclid_like(self, rhs: Self) -> Self
            {
                self.wrapping_rem(rhs)
            }
            fn floor_div(self, rhs: Self) -> Self
            {
                // division by -1 is the only case num_integer::Integer::div_floor
                // can overflow on (MIN / -1); everywhere else it's exact.
                if rhs == -1 {
                    self.wrapping_neg()
                } else {
                    num_integer::Integer::div_floor(&self, &rhs)
                }
            }
            fn pow(self, rhs: Self) -> Self
            {
                if rhs < 0 {
                    0
                } else {
                    self.wrapping_pow(rhs as u32)
                }
            }
            fn neg(self) -> Self
            {
                self.wrapping_neg()
            }
            fn abs(self) -> Self
            {
                self.wrapping_abs()
            }
            fn sign(self) -> Self
            {
                match self.partial_cmp(&0).unwrap() {
                    std::cmp::Ordering::Less => -1 as Self,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                }
            }
            fn to_f64(self) -> f64
            {
                self as f64
            }
            fn from_f64(v: f64) -> Self
            {
                if v.is_nan() { 0 } else { v as Self }
            }
            fn to_i64(self) -> i64
            {
                self as i64
            }
            fn from_i64(v: i64) -> Self
            {
                v as Self
            }
        }
    };
}

macro_rules! impl_num_elem_uint {
    ($t:ty) => {
        impl NumElem for $t
        {
            fn zero() -> Self
            {
                <$t as num_traits::Zero>::zero()
            }
            fn one() -> Self
            {
                <$t as num_traits::One>::one()
            }
            fn add(self, rhs: Self) -> Self
            {
                self.wrapping_add(rhs)
            }
            fn sub(self, rhs: Self) -> Self
            {
                self.wrapping_sub(rhs)
            }
            fn mul(self, rhs: Self) -> Self
            {
                self.wrapping_mul(rhs)
            }
            fn div(self, rhs: Self) -> Self
            {
                self.wrapping_div(rhs)
            }
            fn rem_euclid_like(self, rhs: Self) -> Self
            {
                self.wrapping_rem(rhs)
            }
            fn floor_div(self, rhs: Self) -> Self
            {
                num_integer::Integer::div_floor(&self, &rhs)
            }
            fn pow(self, rhs: Self) -> Self
            {
                self.wrapping_pow(rhs as u32)
            }
            fn neg(self) -> Self
            {
                self.wrapping_neg()
            }
            fn abs(self) -> Self
            {
                self
            }
            fn sign(self) -> Self
            {
                if self == 0 { 0 } else { 1 }
            }
            fn to_f64(self) -> f64
            {
                self as f64
            }
            fn from_f64(v: f64) -> Self
            {
                if v.is_nan() || v < 0.0 { 0 } else { v as Self }
            }
            fn to_i64(self) -> i64
            {
                self as i64
            }
            fn from_i64(v: i64) -> Self
            {
                if v < 0 { (v as i128).rem_euclid(1i128 << (std::mem::size_of::<Self>() * 8)) as Self } else { v as Self }
            }
        }
    };
}

macro_rules! impl_num_elem_float {
    ($t:ty) => {
        impl NumElem for $t
        {
            fn zero() -> Self
            {
                <$t as num_traits::Zero>::zero()
            }
            fn one() -> Self
            {
                <$t as num_traits::One>::one()
            }
            fn add(self, rhs: Self) -> Self
            {
                self + rhs
            }
            fn sub(self, rhs: Self) -> Self
            {
                self - rhs
            }
            fn mul(self, rhs: Self) -> Self
            {
                self * rhs
            }
            fn div(self, rhs: Self) -> Self
            {
                self / rhs
            }
            fn rem_euclid_like(self, rhs: Self) -> Self
            {
                self % rhs
            }
            fn floor_div(self, rhs: Self) -> Self
            {
                (self / rhs).floor()
            }
            fn pow(self, rhs: Self) -> Self
            {
                self.powf(rhs)
            }
            fn neg(self) -> Self
            {
                -self
            }
            fn abs(self) -> Self
            {
                self.abs()
            }
            fn sign(self) -> Self
            {
                if self.is_nan() {
                    <$t>::NAN
                } else if self > 0.0 {
                    1.0
                } else if self < 0.0 {
                    -1.0
                } else {
                    self
                }
            }
            fn is_nan(self) -> bool
            {
                <$t>::is_nan(self)
            }
            fn to_f64(self) -> f64
            {
                self as f64
            }
            fn from_f64(v: f64) -> Self
            {
                v as Self
            }
            fn to_i64(self) -> i64
            {
                if self.is_nan() { 0 } else { self as i64 }
            }
            fn from_i64(v: i64) -> Self
            {
                v as Self
            }
            fn is_float() -> bool
            {
                true
            }
        }
    };
}

impl_num_elem_int!(i8);
impl_num_elem_uint!(u8);
impl_num_elem_int!(i16);
impl_num_elem_uint!(u16);
impl_num_elem_int!(i32);
impl_num_elem_uint!(u32);
impl_num_elem_int!(i64);
impl_num_elem_uint!(u64);
impl_num_elem_float!(f32);
impl_num_elem_float!(f64);

/// Transcendental / rounding ops, only ever instantiated for `f32`/`f64`
/// since the elementwise dispatcher promotes every other input dtype to
/// float before calling these kernels.
pub trait FloatElem: NumElem
{
    fn sqrt_(self) -> Self;
    fn exp_(self) -> Self;
    fn log_(self) -> Self;
    fn sin_(self) -> Self;
    fn cos_(self) -> Self;
    fn tan_(self) -> Self;
    fn asin_(self) -> Self;
    fn acos_(self) -> Self;
    fn atan_(self) -> Self;
    fn floor_(self) -> Self;
    fn ceil_(self) -> Self;
    fn round_(self) -> Self;
    fn sqrt_acc(self) -> f64;
}

macro_rules! impl_float_elem {
    ($t:ty) => {
        impl FloatElem for $t
        {
            fn sqrt_(self) -> Self
            {
                num_traits::Float::sqrt(self)
            }
            fn exp_(self) -> Self
            {
                num_traits::Float::exp(self)
            }
            fn log_(self) -> Self
            {
                num_traits::Float::ln(self)
            }
            fn sin_(self) -> Self
            {
                num_traits::Float::sin(self)
            }
            fn cos_(self) -> Self
            {
                num_traits::Float::cos(self)
            }
            fn tan_(self) -> Self
            {
                num_traits::Float::tan(self)
            }
            fn asin_(self) -> Self
            {
                num_traits::Float::asin(self)
            }
            fn acos_(self) -> Self
            {
                num_traits::Float::acos(self)
            }
            fn atan_(self) -> Self
            {
                num_traits::Float::atan(self)
            }
            fn floor_(self) -> Self
            {
                num_traits::Float::floor(self)
            }
            fn ceil_(self) -> Self
            {
                num_traits::Float::ceil(self)
            }
            fn round_(self) -> Self
            {
                num_traits::Float::round(self)
            }
            fn sqrt_acc(self) -> f64
            {
                num_traits::Float::sqrt(self as f64)
            }
        }
    };
}

impl_float_elem!(f32);
impl_float_elem!(f64);

/// Dispatch on `dtype`, binding a type alias `$T` to the concrete storage
/// type for the duration of `$body`. `Bool` and `UInt8` share `u8` storage.
/// Shared by every kernel family (math, reduce, cumulative) that dispatches
/// on a single input dtype.
macro_rules! with_numeric_type {
    ($dtype:expr, $t:ident => $body:block) => {
        match $dtype {
            crate::dtype::DType::Bool | crate::dtype::DType::UInt8 => {
                type $t = u8;
                $body
            }
            crate::dtype::DType::Int8 => {
                type $t = i8;
                $body
            }
            crate::dtype::DType::Int16 => {
                type $t = i16;
                $body
            }
            crate::dtype::DType::UInt16 => {
                type $t = u16;
                $body
            }
            crate::dtype::DType::Int32 => {
                type $t = i32;
                $body
            }
            crate::dtype::DType::UInt32 => {
                type $t = u32;
                $body
            }
            crate::dtype::DType::Int64 => {
                type $t = i64;
                $body
            }
            crate::dtype::DType::UInt64 => {
                type $t = u64;
                $body
            }
            crate::dtype::DType::Float32 => {
                type $t = f32;
                $body
            }
            crate::dtype::DType::Float64 => {
                type $t = f64;
                $body
            }
        }
    };
}
pub(crate) use with_numeric_type;

/// As [`with_numeric_type`], but only ever `f32`/`f64` — for kernels whose
/// resolved dtype is guaranteed float.
macro_rules! with_float_type {
    ($dtype:expr, $t:ident => $body:block) => {
        match $dtype {
            crate::dtype::DType::Float32 => {
                type $t = f32;
                $body
            }
            crate::dtype::DType::Float64 => {
                type $t = f64;
                $body
            }
            other => return Err(crate::error::value_err!("expected a float dtype, got {}", other)),
        }
    };
}
pub(crate) use with_float_type;

/// As [`with_numeric_type`], but restricted to the integer/bool storage
/// types — used by bitwise ops and shifts, which are not type-correct for
/// `f32`/`f64`.
macro_rules! with_integer_type {
    ($dtype:expr, $t:ident => $body:block) => {
        match $dtype {
            crate::dtype::DType::Bool | crate::dtype::DType::UInt8 => {
                type $t = u8;
                $body
            }
            crate::dtype::DType::Int8 => {
                type $t = i8;
                $body
            }
            crate::dtype::DType::Int16 => {
                type $t = i16;
                $body
            }
            crate::dtype::DType::UInt16 => {
                type $t = u16;
                $body
            }
            crate::dtype::DType::Int32 => {
                type $t = i32;
                $body
            }
            crate::dtype::DType::UInt32 => {
                type $t = u32;
                $body
            }
            crate::dtype::DType::Int64 => {
                type $t = i64;
                $body
            }
            crate::dtype::DType::UInt64 => {
                type $t = u64;
                $body
            }
            other => return Err(crate::error::type_err!("expected an integer or bool dtype, got {}", other)),
        }
    };
}
pub(crate) use with_integer_type;
