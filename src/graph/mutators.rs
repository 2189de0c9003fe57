//! Graph mutation operations
//!
//! Methods for modifying the graph structure: adding, removing, and replacing
//! nodes, and managing initializers. Every inserted node receives a fresh
//! [`NodeId`]; ids of removed nodes are never handed out again.

use crate::proto::{NodeProto, TensorProto};

use super::ir::Graph;
use super::maps::NodeId;
use super::node::Node;

impl Graph {
    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // ========================================================================
    // Node mutation
    // ========================================================================

    /// Append a node at the end of the graph
    pub fn push_node(&mut self, node: NodeProto) -> NodeId {
        let id = self.allocate_id();
        self.nodes.insert(id, Node::new(id, node));
        id
    }

    /// Insert a node directly before `anchor`
    ///
    /// Returns `None` if `anchor` is not in the graph.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeProto) -> Option<NodeId> {
        let index = self.nodes.get_index_of(&anchor)?;
        let id = self.allocate_id();
        self.nodes.shift_insert(index, id, Node::new(id, node));
        Some(id)
    }

    /// Insert a node directly after `anchor`
    ///
    /// Returns `None` if `anchor` is not in the graph.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeProto) -> Option<NodeId> {
        let index = self.nodes.get_index_of(&anchor)?;
        let id = self.allocate_id();
        self.nodes.shift_insert(index + 1, id, Node::new(id, node));
        Some(id)
    }

    /// Remove a node, preserving the order of the remaining nodes
    ///
    /// Does NOT rewire consumers of the removed outputs.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeProto> {
        self.nodes.shift_remove(&id).map(Node::into_proto)
    }

    /// Replace a node with a new one at the same position
    ///
    /// The replacement gets a fresh id; the old id stops resolving.
    /// Returns the new id and the removed node.
    pub fn replace_node(&mut self, id: NodeId, node: NodeProto) -> Option<(NodeId, NodeProto)> {
        let index = self.nodes.get_index_of(&id)?;
        let new_id = self.allocate_id();
        self.nodes.shift_insert(index, new_id, Node::new(new_id, node));
        let old = self.nodes.shift_remove(&id)?;
        Some((new_id, old.into_proto()))
    }

    /// Rename every use of tensor `from` as a node input to `to`
    ///
    /// Returns the number of inputs rewritten.
    pub fn rename_input_uses(&mut self, from: &str, to: &str) -> usize {
        let mut count = 0;
        for node in self.nodes.values_mut() {
            for input in node.inputs_mut().iter_mut() {
                if input == from {
                    *input = to.to_string();
                    count += 1;
                }
            }
        }
        count
    }

    // ========================================================================
    // Initializer mutation
    // ========================================================================

    /// Add or update an initializer
    pub fn set_initializer(&mut self, tensor: TensorProto) {
        let name = tensor.name.clone();
        self.initializers.insert(name, tensor);
    }

    /// Remove an initializer, preserving the order of the others
    pub fn remove_initializer(&mut self, name: &str) -> Option<TensorProto> {
        self.initializers.shift_remove(name)
    }

    // ========================================================================
    // Naming helpers
    // ========================================================================

    /// Tensor name based on `base` that no node, initializer, graph
    /// input/output or value_info entry uses
    pub fn unique_tensor_name(&self, base: &str) -> String {
        let taken = |name: &str| {
            self.is_initializer(name)
                || self.is_graph_input(name)
                || self.is_graph_output(name)
                || self.interface.value_info.iter().any(|vi| vi.name == name)
                || self.nodes.values().any(|n| {
                    n.inputs().iter().any(|i| i == name) || n.outputs().iter().any(|o| o == name)
                })
        };

        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{}_{}", base, i))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opset::OpSetId;
    use crate::proto::extensions::{make_node, make_value_info};

    fn make_test_graph() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new(&[OpSetId::onnx(13)]);
        let conv = graph.push_node(make_node("Conv", &["X", "W"], &["conv_out"], "conv_0"));
        let relu = graph.push_node(make_node("Relu", &["conv_out"], &["Y"], "relu_0"));
        (graph, conv, relu)
    }

    fn op_order(graph: &Graph) -> Vec<String> {
        graph.nodes().map(|n| n.op_type().to_string()).collect()
    }

    #[test]
    fn test_insert_before_after() {
        let (mut graph, conv, relu) = make_test_graph();

        graph.insert_before(relu, make_node("Identity", &["conv_out"], &["id"], "id_0"));
        graph.insert_after(conv, make_node("Sigmoid", &["conv_out"], &["s"], "sig_0"));

        assert_eq!(op_order(&graph), vec!["Conv", "Sigmoid", "Identity", "Relu"]);
    }

    #[test]
    fn test_remove_node_never_reuses_id() {
        let (mut graph, _, relu) = make_test_graph();

        let removed = graph.remove_node(relu).unwrap();
        assert_eq!(removed.op_type, "Relu");
        assert!(!graph.contains(relu));

        let new_id = graph.push_node(make_node("Relu", &["conv_out"], &["Y"], "relu_0"));
        assert_ne!(new_id, relu);
        assert!(graph.node(relu).is_none());
    }

    #[test]
    fn test_replace_node() {
        let (mut graph, conv, relu) = make_test_graph();

        let (new_id, old) = graph
            .replace_node(relu, make_node("LeakyRelu", &["conv_out"], &["Y"], "relu_0"))
            .unwrap();

        assert_eq!(old.op_type, "Relu");
        assert!(!graph.contains(relu));
        assert_eq!(graph.node(new_id).unwrap().op_type(), "LeakyRelu");
        assert_eq!(graph.node_ids(), vec![conv, new_id]);
    }

    #[test]
    fn test_missing_anchor() {
        let (mut graph, _, relu) = make_test_graph();
        graph.remove_node(relu);

        assert!(graph.insert_after(relu, make_node("Relu", &[], &[], "")).is_none());
        assert!(graph.replace_node(relu, make_node("Relu", &[], &[], "")).is_none());
    }

    #[test]
    fn test_initializers_and_names() {
        let (mut graph, _, _) = make_test_graph();

        graph.set_initializer(TensorProto::new_int64_vector("conv_out_axes", vec![0]));
        assert!(graph.is_initializer("conv_out_axes"));
        assert_eq!(graph.unique_tensor_name("conv_out_axes"), "conv_out_axes_1");
        assert_eq!(graph.unique_tensor_name("fresh"), "fresh");

        assert!(graph.remove_initializer("conv_out_axes").is_some());
        assert!(!graph.is_initializer("conv_out_axes"));
    }

    #[test]
    fn test_unique_name_avoids_value_info_and_outputs() {
        let (mut graph, _, _) = make_test_graph();
        graph.interface.value_info.push(make_value_info("relu_0_axes"));
        graph.interface.output.push(make_value_info("conv_0_axes"));

        assert_eq!(graph.unique_tensor_name("relu_0_axes"), "relu_0_axes_1");
        assert_eq!(graph.unique_tensor_name("conv_0_axes"), "conv_0_axes_1");
    }

    #[test]
    fn test_rename_input_uses() {
        let (mut graph, _, relu) = make_test_graph();

        assert_eq!(graph.rename_input_uses("conv_out", "other"), 1);
        assert_eq!(graph.node(relu).unwrap().inputs()[0], "other");
    }
}
