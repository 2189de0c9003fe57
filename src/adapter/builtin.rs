//! Built-in adapters
//!
//! Reusable adapter shapes for the changes that recur across the default
//! domain changelog, and the table that instantiates them for concrete
//! operators.

use std::sync::Arc;

use super::Adapter;
use crate::error::ConvertResult;
use crate::graph::{Graph, NodeId};
use crate::opset::OpSetId;
use crate::proto::{AttributeProto, TensorProto};

/// Steps `(op, to)` where `to - 1 -> to` only widens accepted types or
/// attribute ranges, so a node valid before the step stays valid after it
const COMPATIBLE_UPGRADES: &[(&str, i64)] = &[
    // Negative axes, optional Gemm C
    ("Concat", 11),
    ("Conv", 11),
    ("Flatten", 11),
    ("Gather", 11),
    ("Gemm", 11),
    ("Softmax", 11),
    ("Split", 11),
    ("Squeeze", 11),
    ("Unsqueeze", 11),
    ("Constant", 12),
    ("MaxPool", 12),
    // bfloat16
    ("Abs", 13),
    ("Add", 13),
    ("Cast", 13),
    ("Concat", 13),
    ("Constant", 13),
    ("Div", 13),
    ("Flatten", 13),
    ("Gather", 13),
    ("Gemm", 13),
    ("Identity", 13),
    ("MatMul", 13),
    ("Mul", 13),
    ("Relu", 13),
    ("Reshape", 13),
    ("Shape", 13),
    ("Sigmoid", 13),
    ("Sub", 13),
    ("Tanh", 13),
    ("Transpose", 13),
    // Integer and sequence types
    ("Add", 14),
    ("Div", 14),
    ("Identity", 14),
    ("Mul", 14),
    ("Relu", 14),
    ("Sub", 14),
    ("Shape", 15),
    ("Identity", 16),
];

/// Adapters the default registry carries
pub fn builtin_adapters() -> Vec<Arc<dyn Adapter>> {
    let mut adapters: Vec<Arc<dyn Adapter>> = COMPATIBLE_UPGRADES
        .iter()
        .map(|&(op, to)| {
            Arc::new(CompatibleAdapter::new(op, OpSetId::onnx(to - 1), OpSetId::onnx(to)))
                as Arc<dyn Adapter>
        })
        .collect();

    // `axes` / `split` became an INT64 input at opset 13
    for (op, attribute) in [("Squeeze", "axes"), ("Unsqueeze", "axes"), ("Split", "split")] {
        adapters.push(Arc::new(AttributeToInput::new(
            op,
            attribute,
            1,
            OpSetId::onnx(12),
            OpSetId::onnx(13),
        )));
        adapters.push(Arc::new(InputToAttribute::new(
            op,
            attribute,
            1,
            OpSetId::onnx(13),
            OpSetId::onnx(12),
        )));
    }

    adapters.push(Arc::new(AddAttributeDefault::new(
        "Reshape",
        "allowzero",
        0,
        OpSetId::onnx(13),
        OpSetId::onnx(14),
    )));
    adapters.push(Arc::new(DropAttributeDefault::new(
        "Reshape",
        "allowzero",
        0,
        OpSetId::onnx(14),
        OpSetId::onnx(13),
    )));

    adapters
}

/// Name used as prefix for tensors an adapter creates for `node`
fn tensor_prefix(graph: &Graph, node: NodeId) -> String {
    match graph.node(node) {
        Some(n) if !n.name().is_empty() => n.name().to_string(),
        Some(n) => n
            .outputs()
            .first()
            .cloned()
            .unwrap_or_else(|| format!("node{}", node.index())),
        None => format!("node{}", node.index()),
    }
}

// ============================================================================
// CompatibleAdapter
// ============================================================================

/// Adapter for steps that leave the node unchanged
#[derive(Debug, Clone)]
pub struct CompatibleAdapter {
    name: String,
    from: OpSetId,
    to: OpSetId,
}

impl CompatibleAdapter {
    /// Create a no-op adapter for `name` stepping `from -> to`
    pub fn new(name: impl Into<String>, from: OpSetId, to: OpSetId) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }
}

impl Adapter for CompatibleAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial_version(&self) -> &OpSetId {
        &self.from
    }

    fn target_version(&self) -> &OpSetId {
        &self.to
    }

    fn adapt(&self, graph: &mut Graph, node: NodeId) -> ConvertResult<()> {
        if !graph.contains(node) {
            return Err(self.failure(graph, node, "node is not in the graph"));
        }
        Ok(())
    }
}

// ============================================================================
// AttributeToInput
// ============================================================================

/// Moves an `ints` attribute into a constant INT64 input
///
/// The values become a new initializer named after the node; missing
/// optional inputs before `input_index` are filled with `""`. A node
/// without the attribute is left unchanged.
#[derive(Debug, Clone)]
pub struct AttributeToInput {
    name: String,
    attribute: String,
    input_index: usize,
    from: OpSetId,
    to: OpSetId,
}

impl AttributeToInput {
    /// Create the adapter
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        input_index: usize,
        from: OpSetId,
        to: OpSetId,
    ) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            input_index,
            from,
            to,
        }
    }
}

impl Adapter for AttributeToInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial_version(&self) -> &OpSetId {
        &self.from
    }

    fn target_version(&self) -> &OpSetId {
        &self.to
    }

    fn adapt(&self, graph: &mut Graph, node: NodeId) -> ConvertResult<()> {
        let Some(current) = graph.node(node) else {
            return Err(self.failure(graph, node, "node is not in the graph"));
        };
        let Some(attr) = current.attribute(&self.attribute) else {
            return Ok(());
        };
        let values = attr.ints.clone();
        if current
            .inputs()
            .get(self.input_index)
            .is_some_and(|input| !input.is_empty())
        {
            return Err(self.failure(
                graph,
                node,
                format!("input {} is already connected", self.input_index),
            ));
        }

        let tensor_name =
            graph.unique_tensor_name(&format!("{}_{}", tensor_prefix(graph, node), self.attribute));
        graph.set_initializer(TensorProto::new_int64_vector(&tensor_name, values));

        if let Some(n) = graph.node_mut(node) {
            n.remove_attribute(&self.attribute);
            let inputs = n.inputs_mut();
            if inputs.len() <= self.input_index {
                inputs.resize(self.input_index + 1, String::new());
            }
            inputs[self.input_index] = tensor_name;
        }
        Ok(())
    }
}

// ============================================================================
// InputToAttribute
// ============================================================================

/// Folds a constant INT64 input back into an `ints` attribute
///
/// The input must be an initializer. It is disconnected (trailing empty
/// inputs are dropped) and the initializer removed once nothing else
/// references it. A node without the input is left unchanged.
#[derive(Debug, Clone)]
pub struct InputToAttribute {
    name: String,
    attribute: String,
    input_index: usize,
    from: OpSetId,
    to: OpSetId,
}

impl InputToAttribute {
    /// Create the adapter
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        input_index: usize,
        from: OpSetId,
        to: OpSetId,
    ) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            input_index,
            from,
            to,
        }
    }
}

impl Adapter for InputToAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial_version(&self) -> &OpSetId {
        &self.from
    }

    fn target_version(&self) -> &OpSetId {
        &self.to
    }

    fn adapt(&self, graph: &mut Graph, node: NodeId) -> ConvertResult<()> {
        let Some(current) = graph.node(node) else {
            return Err(self.failure(graph, node, "node is not in the graph"));
        };
        let tensor_name = match current.inputs().get(self.input_index) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => return Ok(()),
        };

        let values = match graph.initializer(&tensor_name) {
            Some(tensor) => tensor.int64_values().ok_or_else(|| {
                self.failure(
                    graph,
                    node,
                    format!("'{}' is not an INT64 tensor", tensor_name),
                )
            })?,
            None => {
                return Err(self.failure(
                    graph,
                    node,
                    format!("'{}' is not a constant initializer", tensor_name),
                ))
            }
        };

        if let Some(n) = graph.node_mut(node) {
            n.set_attribute(AttributeProto::new_ints(&self.attribute, values));
            let inputs = n.inputs_mut();
            inputs[self.input_index].clear();
            while inputs.last().is_some_and(|input| input.is_empty()) {
                inputs.pop();
            }
        }

        if graph.consumers(&tensor_name).is_empty()
            && !graph.is_graph_input(&tensor_name)
            && !graph.is_graph_output(&tensor_name)
        {
            graph.remove_initializer(&tensor_name);
        }
        Ok(())
    }
}

// ============================================================================
// AddAttributeDefault / DropAttributeDefault
// ============================================================================

/// Writes the default of an attribute introduced at the target version
#[derive(Debug, Clone)]
pub struct AddAttributeDefault {
    name: String,
    attribute: String,
    default: i64,
    from: OpSetId,
    to: OpSetId,
}

impl AddAttributeDefault {
    /// Create the adapter
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        default: i64,
        from: OpSetId,
        to: OpSetId,
    ) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            default,
            from,
            to,
        }
    }
}

impl Adapter for AddAttributeDefault {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial_version(&self) -> &OpSetId {
        &self.from
    }

    fn target_version(&self) -> &OpSetId {
        &self.to
    }

    fn adapt(&self, graph: &mut Graph, node: NodeId) -> ConvertResult<()> {
        if !graph.contains(node) {
            return Err(self.failure(graph, node, "node is not in the graph"));
        }
        if let Some(n) = graph.node_mut(node) {
            if n.attribute(&self.attribute).is_none() {
                n.set_attribute(AttributeProto::new_int(&self.attribute, self.default));
            }
        }
        Ok(())
    }
}

/// Removes an attribute the target version does not know
///
/// Fails unless the attribute is absent or holds its default, since any
/// other value has no equivalent at the target version.
#[derive(Debug, Clone)]
pub struct DropAttributeDefault {
    name: String,
    attribute: String,
    default: i64,
    from: OpSetId,
    to: OpSetId,
}

impl DropAttributeDefault {
    /// Create the adapter
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        default: i64,
        from: OpSetId,
        to: OpSetId,
    ) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            default,
            from,
            to,
        }
    }
}

impl Adapter for DropAttributeDefault {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial_version(&self) -> &OpSetId {
        &self.from
    }

    fn target_version(&self) -> &OpSetId {
        &self.to
    }

    fn adapt(&self, graph: &mut Graph, node: NodeId) -> ConvertResult<()> {
        let value = match graph.node(node) {
            Some(n) => n.attribute(&self.attribute).map(|a| a.i),
            None => return Err(self.failure(graph, node, "node is not in the graph")),
        };
        match value {
            None => Ok(()),
            Some(v) if v == self.default => {
                if let Some(n) = graph.node_mut(node) {
                    n.remove_attribute(&self.attribute);
                }
                Ok(())
            }
            Some(v) => Err(self.failure(
                graph,
                node,
                format!(
                    "{}={} cannot be expressed before opset {}",
                    self.attribute,
                    v,
                    self.from.version()
                ),
            )),
        }
    }
}
