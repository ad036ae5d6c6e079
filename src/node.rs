//! Node: the owning, reference-counted array descriptor.
//!
//! `Node` is a cheap-to-clone handle (an `Rc<RefCell<NodeInner>>>`); cloning
//! it is exactly another live reference to the same node, and `ref_count()`
//! reports `Rc::strong_count`. A *view* is a distinct `NodeInner` (its own
//! shape, strides, flags, ref_count) that holds a clone of its parent
//! `Node` in `base`, which is exactly how it keeps the parent alive: there
//! is no separate "weak" mechanism because a view unconditionally extends
//! its base's lifetime by holding a strong reference.
//!
//! There is no explicit free function in this API — dropping the last
//! strong reference releases the buffer through ordinary `Drop`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::buffer::{self, SharedBuffer};
use crate::dtype::DType;
use crate::error::{value_err, NResult};
use crate::flags::NodeFlags;
use crate::shape::{self, MAX_NDIM};

struct NodeInner
{
    buffer: SharedBuffer,
    /// Byte offset of this node's first element within `buffer`.
    offset: isize,
    dtype: DType,
    shape: Vec<usize>,
    /// Byte strides, one per axis.
    strides: Vec<isize>,
    base: Option<Node>,
    flags: NodeFlags,
    name: String,
}

/// An owning, reference-counted strided array descriptor.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeInner>>);

impl Node
{
    fn from_inner(inner: NodeInner) -> Self
    {
        Node(Rc::new(RefCell::new(inner)))
    }

    fn inner(&self) -> Ref<'_, NodeInner>
    {
        self.0.borrow()
    }

    fn inner_mut(&self) -> RefMut<'_, NodeInner>
    {
        self.0.borrow_mut()
    }

    /// Allocate a new, owning, zero-initialised, C-contiguous node.
    /// `node_new_empty`.
    pub fn new_empty(shape: &[usize], dtype: DType) -> NResult<Node>
    {
        crate::error::with_error_channel(|| {
            validate_shape(shape)?;
            let nbytes = checked_nbytes(shape, dtype)?;
            let strides = shape::calc_strides(shape, dtype.size());
            let buf = buffer::alloc_zeroed(nbytes);
            let mut flags = NodeFlags::empty();
            flags.insert(NodeFlags::OWN_DATA | NodeFlags::CONTIGUOUS | NodeFlags::C_ORDER | NodeFlags::WRITABLE);
            Ok(Node::from_inner(NodeInner {
                buffer: buf,
                offset: 0,
                dtype,
                shape: shape.to_vec(),
                strides,
                base: None,
                flags,
                name: String::new(),
            }))
        })
    }

    /// Build a new, owning, C-contiguous node by copying `data` (raw bytes,
    /// row-major for `shape`/`dtype`). `node_new` with `copy = true`; since
    /// this type is always-owning there is no borrowing variant (see
    /// DESIGN.md).
    pub fn new(data: &[u8], shape: &[usize], dtype: DType) -> NResult<Node>
    {
        crate::error::with_error_channel(|| {
            let node = Node::new_empty(shape, dtype)?;
            let nbytes = checked_nbytes(shape, dtype)?;
            if data.len() != nbytes {
                return Err(value_err!(
                    "data length {} does not match shape/dtype byte length {}",
                    data.len(),
                    nbytes
                ));
            }
            node.inner().buffer.borrow_mut()[..nbytes].copy_from_slice(data);
            Ok(node)
        })
    }

    /// `node_new_scalar`: a 0-D node holding a single element's bytes.
    pub fn new_scalar(value: &[u8], dtype: DType) -> NResult<Node>
    {
        Node::new(value, &[], dtype)
    }

    /// `node_new_child`: a non-owning view on `parent` with the given
    /// shape/strides/byte offset. Increments `parent`'s refcount for as
    /// long as the returned view lives.
    pub fn new_child(parent: &Node, shape: &[usize], strides: &[isize], offset: isize) -> NResult<Node>
    {
        crate::error::with_error_channel(|| {
            validate_shape(shape)?;
            if shape.len() != strides.len() {
                return Err(value_err!("shape and strides must have equal length"));
            }
            let parent_inner = parent.inner();
            let mut flags = NodeFlags::empty();
            flags.set(NodeFlags::WRITABLE, parent_inner.flags.contains(NodeFlags::WRITABLE));
            let is_contig = shape::is_c_contiguous(shape, strides, parent_inner.dtype.size());
            flags.set(NodeFlags::CONTIGUOUS, is_contig);
            flags.set(NodeFlags::STRIDED, !is_contig);
            flags.set(NodeFlags::C_ORDER, is_contig);
            let buffer = Rc::clone(&parent_inner.buffer);
            let dtype = parent_inner.dtype;
            drop(parent_inner);
            Ok(Node::from_inner(NodeInner {
                buffer,
                offset,
                dtype,
                shape: shape.to_vec(),
                strides: strides.to_vec(),
                base: Some(parent.clone()),
                flags,
                name: String::new(),
            }))
        })
    }

    /// `node_copy`: copy `src` into `dst`, or allocate a fresh node matching
    /// `src`'s shape/dtype when `dst` is `None`.
    pub fn copy(dst: Option<&Node>, src: &Node) -> NResult<Node>
    {
        crate::error::with_error_channel(|| match dst {
            None => {
                let out = Node::new_empty(&src.shape(), src.dtype())?;
                copy_into(&out, src)?;
                Ok(out)
            }
            Some(dst) => {
                if !Node::same_shape(dst, src) {
                    return Err(value_err!(
                        "copy: shape mismatch, dst={:?} src={:?}",
                        dst.shape(),
                        src.shape()
                    ));
                }
                if dst.dtype() != src.dtype() {
                    return Err(value_err!(
                        "copy: dtype mismatch, dst={} src={}",
                        dst.dtype(),
                        src.dtype()
                    ));
                }
                copy_into(dst, src)?;
                Ok(dst.clone())
            }
        })
    }

    #[inline]
    pub fn dtype(&self) -> DType
    {
        self.inner().dtype
    }

    #[inline]
    pub fn ndim(&self) -> usize
    {
        self.inner().shape.len()
    }

    #[inline]
    pub fn shape(&self) -> Vec<usize>
    {
        self.inner().shape.clone()
    }

    #[inline]
    pub fn strides(&self) -> Vec<isize>
    {
        self.inner().strides.clone()
    }

    pub fn name(&self) -> String
    {
        self.inner().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>)
    {
        self.inner_mut().name = name.into();
    }

    /// `node_nitems`.
    #[inline]
    pub fn nitems(&self) -> usize
    {
        shape::nitems(&self.inner().shape)
    }

    /// `node_is_contiguous`.
    #[inline]
    pub fn is_contiguous(&self) -> bool
    {
        self.inner().flags.contains(NodeFlags::CONTIGUOUS)
    }

    #[inline]
    pub fn is_writable(&self) -> bool
    {
        self.inner().flags.contains(NodeFlags::WRITABLE)
    }

    #[inline]
    pub fn owns_data(&self) -> bool
    {
        self.inner().flags.contains(NodeFlags::OWN_DATA)
    }

    /// Number of live `Node` handles referring to this exact node. A
    /// view's ref_count is independent of its base's; creating a view
    /// increments the *base*'s count, not this one's.
    pub fn ref_count(&self) -> usize
    {
        Rc::strong_count(&self.0)
    }

    pub fn base(&self) -> Option<Node>
    {
        self.inner().base.clone()
    }

    /// `node_same_shape`: equal `ndim` and equal extents per axis.
    pub fn same_shape(a: &Node, b: &Node) -> bool
    {
        a.inner().shape == b.inner().shape
    }

    /// Scalar predicate: accepts both `ndim == 0` and `ndim == 1, shape ==
    /// [1]` as scalar.
    pub fn is_scalar(&self) -> bool
    {
        let shape = &self.inner().shape;
        shape.is_empty() || (shape.len() == 1 && shape[0] == 1)
    }

    /// Raw pointer to this node's first element. Safety: valid for
    /// `nitems() * dtype().size()` bytes worth of strided access as
    /// described by `shape()`/`strides()`, for as long as `self` (and
    /// transitively its `base` chain) is alive.
    pub(crate) fn data_ptr(&self) -> *const u8
    {
        let inner = self.inner();
        let base = inner.buffer.borrow();
        unsafe { base.as_ptr().offset(inner.offset) }
    }

    pub(crate) fn data_mut_ptr(&self) -> *mut u8
    {
        let inner = self.inner();
        let mut base = inner.buffer.borrow_mut();
        unsafe { base.as_mut_ptr().offset(inner.offset) }
    }

    /// Replace this node's shape/strides in place; only legal when
    /// `ref_count() == 1`.
    pub(crate) fn set_shape_strides(&self, shape: Vec<usize>, strides: Vec<isize>, contiguous: bool)
    {
        let mut inner = self.inner_mut();
        inner.shape = shape;
        inner.strides = strides;
        inner.flags.set(NodeFlags::CONTIGUOUS, contiguous);
        inner.flags.set(NodeFlags::STRIDED, !contiguous);
        inner.flags.set(NodeFlags::C_ORDER, contiguous);
    }

    pub(crate) fn offset(&self) -> isize
    {
        self.inner().offset
    }

    pub(crate) fn shared_buffer(&self) -> SharedBuffer
    {
        Rc::clone(&self.inner().buffer)
    }

    /// Construct a fresh owning node directly from parts; used by shape ops
    /// and kernels that build a brand-new contiguous result.
    pub(crate) fn from_owned_bytes(bytes: Vec<u8>, shape: &[usize], dtype: DType) -> Node
    {
        let strides = shape::calc_strides(shape, dtype.size());
        let mut flags = NodeFlags::empty();
        flags.insert(NodeFlags::OWN_DATA | NodeFlags::CONTIGUOUS | NodeFlags::C_ORDER | NodeFlags::WRITABLE);
        Node::from_inner(NodeInner {
            buffer: buffer::from_vec(bytes),
            offset: 0,
            dtype,
            shape: shape.to_vec(),
            strides,
            base: None,
            flags,
            name: String::new(),
        })
    }

    /// Construct a view directly from parts, bypassing validation; used by
    /// shape ops that have already established the strides are valid.
    pub(crate) fn view_from_parts(
        parent: &Node, shape: Vec<usize>, strides: Vec<isize>, offset: isize, dtype: DType,
    ) -> Node
    {
        let is_contig = shape::is_c_contiguous(&shape, &strides, dtype.size());
        let mut flags = NodeFlags::empty();
        flags.set(NodeFlags::WRITABLE, parent.is_writable());
        flags.set(NodeFlags::CONTIGUOUS, is_contig);
        flags.set(NodeFlags::STRIDED, !is_contig);
        flags.set(NodeFlags::C_ORDER, is_contig);
        Node::from_inner(NodeInner {
            buffer: parent.shared_buffer(),
            offset,
            dtype,
            shape,
            strides,
            base: Some(parent.clone()),
            flags,
            name: String::new(),
        })
    }
}

fn validate_shape(shape: &[usize]) -> NResult<()>
{
    if shape.len() > MAX_NDIM {
        return Err(value_err!("ndim {} exceeds MAX_NDIM {}", shape.len(), MAX_NDIM));
    }
    Ok(())
}

fn checked_nbytes(shape: &[usize], dtype: DType) -> NResult<usize>
{
    let n = shape::nitems(shape);
    n.checked_mul(dtype.size()).ok_or_else(|| value_err!("shape/dtype byte length overflow"))
}

fn copy_into(dst: &Node, src: &Node) -> NResult<()>
{
    crate::convert::convert_same_dtype(dst, src)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn new_empty_is_contiguous_and_owning()
    {
        let n = Node::new_empty(&[2, 3], DType::Int32).unwrap();
        assert!(n.is_contiguous());
        assert!(n.owns_data());
        assert_eq!(n.nitems(), 6);
        assert_eq!(n.strides(), vec![12, 4]);
    }

    #[test]
    fn new_scalar_is_0d()
    {
        let bytes = 42i32.to_ne_bytes();
        let n = Node::new_scalar(&bytes, DType::Int32).unwrap();
        assert_eq!(n.ndim(), 0);
        assert_eq!(n.nitems(), 1);
        assert!(n.is_scalar());
    }

    #[test]
    fn child_view_keeps_parent_alive_and_bumps_its_refcount()
    {
        let parent = Node::new_empty(&[4], DType::Int32).unwrap();
        assert_eq!(parent.ref_count(), 1);
        let view = Node::new_child(&parent, &[2], &[4], 4).unwrap();
        assert_eq!(parent.ref_count(), 2);
        assert_eq!(view.ref_count(), 1);
        drop(view);
        assert_eq!(parent.ref_count(), 1);
    }

    #[test]
    fn same_shape()
    {
        let a = Node::new_empty(&[2, 3], DType::Float32).unwrap();
        let b = Node::new_empty(&[2, 3], DType::Int8).unwrap();
        let c = Node::new_empty(&[3, 2], DType::Float32).unwrap();
        assert!(Node::same_shape(&a, &b));
        assert!(!Node::same_shape(&a, &c));
    }

    #[test]
    fn copy_rejects_shape_mismatch()
    {
        let src = Node::new_empty(&[2, 3], DType::Int32).unwrap();
        let dst = Node::new_empty(&[3, 2], DType::Int32).unwrap();
        assert!(Node::copy(Some(&dst), &src).is_err());
    }
}
