//! Node Handles
//!
//! `Node<T>` is a typed, copyable handle to a node inside a graph. Dependency
//! lists are written as a single handle or a tuple of handles; the computation
//! then receives the matching `Arc` values in the same shape.

use crate::error::GraphError;
use crate::graph::NodeValues;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Untyped identity of a node: the owning graph and its insertion index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) graph: u64,
    pub(crate) index: usize,
}

impl NodeId {
    /// Insertion index of the node within its graph
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} (graph {})", self.index, self.graph)
    }
}

/// Typed handle to a node producing a `T`
pub struct Node<T> {
    id: NodeId,
    _value: PhantomData<fn() -> T>,
}

impl<T> Node<T> {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            _value: PhantomData,
        }
    }

    /// Untyped identity of this node
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Node<T> {}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// A set of nodes a computation depends on
///
/// Implemented for `()`, a single `Node<T>`, and tuples of up to six nodes.
pub trait Dependencies {
    /// Values handed to the computation, one `Arc` per dependency
    type Values;

    /// Identities of the dependencies, in declaration order
    fn ids(&self) -> Vec<NodeId>;

    /// Read the dependency values produced in the current evaluation
    fn fetch(&self, values: &NodeValues<'_>) -> Result<Self::Values, GraphError>;
}

impl Dependencies for () {
    type Values = ();

    fn ids(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn fetch(&self, _values: &NodeValues<'_>) -> Result<Self::Values, GraphError> {
        Ok(())
    }
}

impl<A: Send + Sync + 'static> Dependencies for Node<A> {
    type Values = Arc<A>;

    fn ids(&self) -> Vec<NodeId> {
        vec![self.id]
    }

    fn fetch(&self, values: &NodeValues<'_>) -> Result<Self::Values, GraphError> {
        values.get(*self)
    }
}

macro_rules! impl_dependencies {
    ($($name:ident: $ty:ident),+) => {
        impl<$($ty: Send + Sync + 'static),+> Dependencies for ($(Node<$ty>,)+) {
            type Values = ($(Arc<$ty>,)+);

            fn ids(&self) -> Vec<NodeId> {
                let ($($name,)+) = self;
                vec![$($name.id()),+]
            }

            fn fetch(&self, values: &NodeValues<'_>) -> Result<Self::Values, GraphError> {
                let ($($name,)+) = self;
                Ok(($(values.get(*$name)?,)+))
            }
        }
    };
}

impl_dependencies!(a: A);
impl_dependencies!(a: A, b: B);
impl_dependencies!(a: A, b: B, c: C);
impl_dependencies!(a: A, b: B, c: C, d: D);
impl_dependencies!(a: A, b: B, c: C, d: D, e: E);
impl_dependencies!(a: A, b: B, c: C, d: D, e: E, f: F);
