//! The dtype registry: the closed enumeration of primitive numeric kinds,
//! their sizes, and the promotion rules used by elementwise and reduction
//! kernels.

use std::fmt;

/// A primitive numeric dtype.
///
/// This is a closed enumeration: there is no user extension point, matching
/// the "dtype x dtype" conversion matrix and per-dtype kernel tables used
/// throughout the crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum DType
{
    Bool = 0,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

/// Number of primitive dtypes; used to size the N x N conversion table.
pub const NUM_DTYPES: usize = 11;

/// The coarse signedness/float classification of a dtype, used by the
/// promotion rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind
{
    Bool,
    Signed,
    Unsigned,
    Float,
}

impl DType
{
    /// All dtypes, in enum-discriminant order; doubles as the row/column
    /// order of the conversion matrix.
    pub const ALL: [DType; NUM_DTYPES] = [
        DType::Bool,
        DType::Int8,
        DType::UInt8,
        DType::Int16,
        DType::UInt16,
        DType::Int32,
        DType::UInt32,
        DType::Int64,
        DType::UInt64,
        DType::Float32,
        DType::Float64,
    ];

    /// Byte size of one element of this dtype.
    #[inline]
    pub const fn size(self) -> usize
    {
        match self {
            DType::Bool | DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64 | DType::UInt64 | DType::Float64 => 8,
        }
    }

    /// The coarse kind (bool / signed / unsigned / float).
    #[inline]
    pub const fn kind(self) -> Kind
    {
        match self {
            DType::Bool => Kind::Bool,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64 => Kind::Signed,
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64 => Kind::Unsigned,
            DType::Float32 | DType::Float64 => Kind::Float,
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool
    {
        matches!(self.kind(), Kind::Float)
    }

    #[inline]
    pub const fn is_signed_int(self) -> bool
    {
        matches!(self.kind(), Kind::Signed)
    }

    #[inline]
    pub const fn is_unsigned_int(self) -> bool
    {
        matches!(self.kind(), Kind::Unsigned)
    }

    #[inline]
    pub const fn is_integer(self) -> bool
    {
        matches!(self.kind(), Kind::Signed | Kind::Unsigned)
    }

    #[inline]
    pub const fn is_bool(self) -> bool
    {
        matches!(self, DType::Bool)
    }

    /// Diagnostic name, not semantic.
    pub const fn as_string(self) -> &'static str
    {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::UInt8 => "uint8",
            DType::Int16 => "int16",
            DType::UInt16 => "uint16",
            DType::Int32 => "int32",
            DType::UInt32 => "uint32",
            DType::Int64 => "int64",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Row/column index of this dtype in the N x N conversion matrix.
    #[inline]
    pub const fn index(self) -> usize
    {
        self as usize
    }

    /// Bit width, used by the promotion rules below.
    #[inline]
    const fn bits(self) -> u32
    {
        self.size() as u32 * 8
    }

    /// Promote two dtypes following these rules:
    ///
    /// - Same kind-class: promote to the wider width.
    /// - Signed x unsigned of the same width: promote to the next wider
    ///   signed type, saturating at `int64`; `uint64 x int64` promotes to
    ///   `float64`.
    /// - Integer x float: promote to the float, widened to `float64` if the
    ///   float operand is `float32` and the integer operand is >= 32 bits.
    /// - `bool` behaves as the narrowest signed-compatible integer for the
    ///   purposes of this table (it never survives promotion against any
    ///   wider kind).
    pub fn promote(a: DType, b: DType) -> DType
    {
        if a == b {
            return a;
        }

        match (a.kind(), b.kind()) {
            (Kind::Float, Kind::Float) => {
                if a.bits() >= b.bits() { a } else { b }
            }
            (Kind::Float, _) | (_, Kind::Float) => {
                let (float, int) = if a.is_float() { (a, b) } else { (b, a) };
                if float.bits() < 64 && int.bits() >= 32 {
                    DType::Float64
                } else {
                    float
                }
            }
            (Kind::Bool, Kind::Bool) => DType::Bool,
            (Kind::Bool, other) | (other, Kind::Bool) => {
                let _ = other;
                // bool promotes as if it were the narrowest signed int
                let wider = if a.kind() == Kind::Bool { b } else { a };
                wider
            }
            (Kind::Signed, Kind::Signed) => {
                if a.bits() >= b.bits() { a } else { b }
            }
            (Kind::Unsigned, Kind::Unsigned) => {
                if a.bits() >= b.bits() { a } else { b }
            }
            (Kind::Signed, Kind::Unsigned) | (Kind::Unsigned, Kind::Signed) => {
                let (signed, unsigned) = if a.is_signed_int() { (a, b) } else { (b, a) };
                if signed == DType::Int64 && unsigned == DType::UInt64 {
                    DType::Float64
                } else {
                    let width = signed.bits().max(unsigned.bits() * 2).max(16);
                    widen_signed(width)
                }
            }
        }
    }

    /// Reduction output dtype for `sum`/`prod`: `int64` for signed-or-bool
    /// inputs, `uint64` for unsigned, `float64` for float.
    pub fn sum_prod_out_dtype(self) -> DType
    {
        match self.kind() {
            Kind::Bool | Kind::Signed => DType::Int64,
            Kind::Unsigned => DType::UInt64,
            Kind::Float => DType::Float64,
        }
    }

    /// Reduction output dtype for `diff`: `int64` for any integer/bool
    /// input, `float64` for float.
    pub fn diff_out_dtype(self) -> DType
    {
        if self.is_float() { DType::Float64 } else { DType::Int64 }
    }
}

fn widen_signed(min_bits: u32) -> DType
{
    if min_bits <= 16 {
        DType::Int16
    } else if min_bits <= 32 {
        DType::Int32
    } else {
        DType::Int64
    }
}

impl fmt::Display for DType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_string())
    }
}
