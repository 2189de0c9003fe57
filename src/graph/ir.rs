//! Graph structure and read accessors

use indexmap::IndexMap;

use crate::opset::{canonical_domain, OpSetId};
use crate::proto::{GraphProto, OperatorSetIdProto, TensorProto};

use super::maps::{ConsumerList, InitializerMap, NodeArena, NodeId};
use super::node::Node;

/// In-memory graph the converter mutates
///
/// Owns its nodes, initializers and the per-domain opset imports. The
/// remaining `GraphProto` fields (name, inputs, outputs, value_info, ...)
/// are carried through unchanged in `interface`.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Maps node id → node (preserves graph order)
    pub(crate) nodes: NodeArena,

    /// Next id to hand out
    pub(crate) next_id: u32,

    /// Maps initializer name → TensorProto
    pub(crate) initializers: InitializerMap,

    /// Opset imports as declared, at most one per canonical domain
    pub(crate) opset_imports: Vec<OperatorSetIdProto>,

    /// Graph fields other than nodes and initializers
    pub(crate) interface: GraphProto,
}

impl Graph {
    /// Create an empty graph with the given opset imports
    pub fn new(opset_versions: &[OpSetId]) -> Self {
        Self {
            nodes: IndexMap::new(),
            next_id: 0,
            initializers: IndexMap::new(),
            opset_imports: opset_versions.iter().map(OpSetId::to_proto).collect(),
            interface: GraphProto::default(),
        }
    }

    // ========================================================================
    // Node accessors
    // ========================================================================

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by id
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Check if a node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over all nodes in order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Snapshot of node ids in graph order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Find the first node with the given name
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|n| n.name() == name)
            .map(Node::id)
    }

    /// Find nodes by op type
    pub fn find_nodes_by_op(&self, op_type: &str) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.op_type() == op_type)
            .map(Node::id)
            .collect()
    }

    // ========================================================================
    // Graph traversal
    // ========================================================================

    /// Get the node producing a tensor
    pub fn producer(&self, tensor_name: &str) -> Option<NodeId> {
        if tensor_name.is_empty() {
            return None;
        }
        self.nodes
            .values()
            .find(|n| n.outputs().iter().any(|o| o == tensor_name))
            .map(Node::id)
    }

    /// Get the nodes consuming a tensor, in graph order
    pub fn consumers(&self, tensor_name: &str) -> ConsumerList {
        if tensor_name.is_empty() {
            return ConsumerList::new();
        }
        self.nodes
            .values()
            .filter(|n| n.inputs().iter().any(|i| i == tensor_name))
            .map(Node::id)
            .collect()
    }

    /// Check if a tensor is a graph input
    pub fn is_graph_input(&self, name: &str) -> bool {
        self.interface.input.iter().any(|vi| vi.name == name)
    }

    /// Check if a tensor is a graph output
    pub fn is_graph_output(&self, name: &str) -> bool {
        self.interface.output.iter().any(|vi| vi.name == name)
    }

    // ========================================================================
    // Initializer accessors
    // ========================================================================

    /// Get initializer by name
    pub fn initializer(&self, name: &str) -> Option<&TensorProto> {
        self.initializers.get(name)
    }

    /// Check if a tensor is an initializer
    pub fn is_initializer(&self, name: &str) -> bool {
        self.initializers.contains_key(name)
    }

    /// Iterate over initializers in order
    pub fn initializers(&self) -> impl Iterator<Item = &TensorProto> {
        self.initializers.values()
    }

    // ========================================================================
    // Opset imports
    // ========================================================================

    /// Declared opset versions, domains canonicalized
    pub fn opset_versions(&self) -> Vec<OpSetId> {
        self.opset_imports.iter().map(OpSetId::from).collect()
    }

    /// Declared version for `domain`
    pub fn opset_version(&self, domain: &str) -> Option<i64> {
        let domain = canonical_domain(domain);
        self.opset_imports
            .iter()
            .find(|op| canonical_domain(&op.domain) == domain)
            .map(|op| op.version)
    }

    /// Set the declared version of a domain, adding an import when absent
    ///
    /// The declared spelling of an existing domain entry is kept.
    pub fn set_opset_version(&mut self, domain: &str, version: i64) {
        let domain = canonical_domain(domain);
        match self
            .opset_imports
            .iter_mut()
            .find(|op| canonical_domain(&op.domain) == domain)
        {
            Some(entry) => entry.version = version,
            None => self.opset_imports.push(OperatorSetIdProto {
                domain: domain.to_string(),
                version,
            }),
        }
    }

    /// Graph name
    pub fn name(&self) -> &str {
        &self.interface.name
    }
}
