//! Dtype dispatch policy: every elementwise, reduction and cumulative
//! function carries a [`DtypeTag`] describing how its *output* dtype
//! should be chosen once its inputs' promoted dtype is known — most ops
//! just keep the promoted dtype, but comparisons always produce `bool`,
//! transcendental ops always produce a float, and `sum`/`prod`-family
//! reductions widen to a 64-bit accumulator.

use crate::dtype::DType;

/// How an [`NFunc`] resolves its output dtype from its promoted input
/// dtype.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DtypeTag
{
    /// Output dtype is exactly the promoted input dtype (most arithmetic).
    None,
    /// Output dtype is always a float (transcendental ops); integer inputs
    /// widen to `float64`, `float32` inputs stay `float32`.
    Float,
    /// Output dtype is always `bool` (comparisons, logical ops).
    Bool,
    /// Output dtype widens to the 64-bit accumulator appropriate for the
    /// input's kind (`sum`/`prod`-family reductions).
    WideAccumulator,
}

/// A function descriptor: just enough metadata for the dispatcher to
/// resolve an output dtype before selecting the monomorphic kernel.
#[derive(Copy, Clone, Debug)]
pub struct NFunc
{
    pub name: &'static str,
    pub tag: DtypeTag,
    /// Minimum/maximum operand count this op accepts (inclusive), used to
    /// validate an [`NFuncArgs`] before dispatch.
    pub arity: (usize, usize),
}

impl NFunc
{
    pub const fn unary(name: &'static str, tag: DtypeTag) -> NFunc
    {
        NFunc { name, tag, arity: (1, 1) }
    }

    pub const fn binary(name: &'static str, tag: DtypeTag) -> NFunc
    {
        NFunc { name, tag, arity: (2, 2) }
    }

    /// Resolve the dtype a kernel for this op should run at, given the
    /// already-promoted dtype of its operands.
    pub fn resolve_dtype(&self, promoted: DType) -> DType
    {
        match self.tag {
            DtypeTag::None => promoted,
            DtypeTag::Bool => DType::Bool,
            DtypeTag::Float => {
                if promoted.is_float() {
                    promoted
                } else {
                    DType::Float64
                }
            }
            DtypeTag::WideAccumulator => promoted.sum_prod_out_dtype(),
        }
    }
}

/// The operand/output bundle an [`NFunc`] is invoked with; `out` is `None`
/// when the caller wants a freshly allocated result rather than writing
/// into an existing node.
pub struct NFuncArgs<'a>
{
    pub inputs: &'a [&'a crate::node::Node],
    pub out: Option<&'a crate::node::Node>,
}

impl<'a> NFuncArgs<'a>
{
    pub fn new(inputs: &'a [&'a crate::node::Node]) -> NFuncArgs<'a>
    {
        NFuncArgs { inputs, out: None }
    }

    pub fn with_out(mut self, out: &'a crate::node::Node) -> NFuncArgs<'a>
    {
        self.out = Some(out);
        self
    }

    /// The inputs' dtypes promoted pairwise, left to right.
    pub fn promoted_dtype(&self) -> DType
    {
        self.inputs.iter().map(|n| n.dtype()).reduce(DType::promote).unwrap_or(DType::Float64)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::node::Node;

    #[test]
    fn none_tag_keeps_promoted_dtype()
    {
        let f = NFunc::binary("add", DtypeTag::None);
        assert_eq!(f.resolve_dtype(DType::Int32), DType::Int32);
    }

    #[test]
    fn bool_tag_always_yields_bool()
    {
        let f = NFunc::binary("less", DtypeTag::Bool);
        assert_eq!(f.resolve_dtype(DType::Float64), DType::Bool);
    }

    #[test]
    fn float_tag_widens_integers_to_float64()
    {
        let f = NFunc::unary("sqrt", DtypeTag::Float);
        assert_eq!(f.resolve_dtype(DType::Int32), DType::Float64);
        assert_eq!(f.resolve_dtype(DType::Int8), DType::Float64);
        assert_eq!(f.resolve_dtype(DType::Int16), DType::Float64);
        assert_eq!(f.resolve_dtype(DType::Bool), DType::Float64);
        assert_eq!(f.resolve_dtype(DType::Float32), DType::Float32);
    }

    #[test]
    fn args_promote_across_all_inputs()
    {
        let a = Node::new_empty(&[2], DType::Int8).unwrap();
        let b = Node::new_empty(&[2], DType::Float32).unwrap();
        let args = NFuncArgs::new(&[&a, &b]);
        assert_eq!(args.promoted_dtype(), DType::Float32);
    }
}
