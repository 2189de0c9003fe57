//! Graph map types
//!
//! Defines the arena and side-table types used by [`Graph`](super::Graph).

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::node::Node;
use crate::proto::TensorProto;

/// Stable node identity within one graph
///
/// Allocated monotonically, never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node arena: NodeId → Node (iteration order is graph order)
pub type NodeArena = IndexMap<NodeId, Node>;

/// Type alias for initializer map: name → TensorProto (order preserved)
pub type InitializerMap = IndexMap<String, TensorProto>;

/// Consumers of one tensor
/// SmallVec optimized for common case of 1-4 consumers
pub type ConsumerList = SmallVec<[NodeId; 4]>;
