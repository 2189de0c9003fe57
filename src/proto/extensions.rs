//! Extension methods for ONNX protobuf types
//!
//! Provides convenient helper methods for working with ONNX protobuf types.

use super::onnx::*;
use crate::opset::is_default_domain;

// ============================================================================
// ModelProto extensions
// ============================================================================

impl ModelProto {
    /// Get the opset version declared for the default domain (`""` or `"ai.onnx"`)
    pub fn get_opset_version(&self) -> Option<i64> {
        self.opset_import
            .iter()
            .find(|op| is_default_domain(&op.domain))
            .map(|op| op.version)
    }

    /// Check if the model has a graph
    pub fn has_graph(&self) -> bool {
        self.graph.is_some()
    }
}

// ============================================================================
// NodeProto extensions
// ============================================================================

impl NodeProto {
    /// Get attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeProto> {
        self.attribute.iter().find(|attr| attr.name == name)
    }

    /// Get integer attribute value with default
    pub fn get_attribute_int(&self, name: &str, default: i64) -> i64 {
        self.get_attribute(name).map(|a| a.i).unwrap_or(default)
    }

    /// Get repeated int attribute
    pub fn get_attribute_ints(&self, name: &str) -> Option<&[i64]> {
        self.get_attribute(name).map(|a| a.ints.as_slice())
    }

    /// Check if this node has a specific op type
    pub fn is_op_type(&self, op_type: &str) -> bool {
        self.op_type == op_type
    }
}

// ============================================================================
// TensorProto extensions
// ============================================================================

impl TensorProto {
    /// Create a 1-D INT64 tensor
    pub fn new_int64_vector(name: &str, values: Vec<i64>) -> Self {
        Self {
            name: name.to_string(),
            dims: vec![values.len() as i64],
            data_type: tensor_proto::DataType::Int64 as i32,
            int64_data: values,
            ..Default::default()
        }
    }

    /// Read INT64 elements from either `int64_data` or little-endian `raw_data`
    ///
    /// Returns `None` for tensors of any other element type.
    pub fn int64_values(&self) -> Option<Vec<i64>> {
        if self.data_type != tensor_proto::DataType::Int64 as i32 {
            return None;
        }
        if !self.raw_data.is_empty() {
            if self.raw_data.len() % 8 != 0 {
                return None;
            }
            return Some(
                self.raw_data
                    .chunks_exact(8)
                    .map(|c| {
                        let mut buf = [0u8; 8];
                        buf.copy_from_slice(c);
                        i64::from_le_bytes(buf)
                    })
                    .collect(),
            );
        }
        Some(self.int64_data.clone())
    }
}

// ============================================================================
// AttributeProto extensions
// ============================================================================

impl AttributeProto {
    /// Create a new integer attribute
    pub fn new_int(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            i: value,
            r#type: attribute_proto::AttributeType::Int as i32,
            ..Default::default()
        }
    }

    /// Create a new ints attribute
    pub fn new_ints(name: &str, values: Vec<i64>) -> Self {
        Self {
            name: name.to_string(),
            ints: values,
            r#type: attribute_proto::AttributeType::Ints as i32,
            ..Default::default()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Create a new NodeProto in the default domain
pub fn make_node(op_type: &str, inputs: &[&str], outputs: &[&str], name: &str) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        name: name.to_string(),
        ..Default::default()
    }
}

/// Create a named ValueInfoProto without type information
pub fn make_value_info(name: &str) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        ..Default::default()
    }
}

/// Create a model around `nodes` importing the default domain at `opset_version`
///
/// Graph inputs are the node inputs that no node produces and that are not
/// initializers; graph outputs are the outputs of the last node.
pub fn make_model(nodes: Vec<NodeProto>, initializers: Vec<TensorProto>, opset_version: i64) -> ModelProto {
    let produced: Vec<&str> = nodes
        .iter()
        .flat_map(|n| n.output.iter().map(String::as_str))
        .collect();
    let mut inputs: Vec<ValueInfoProto> = Vec::new();
    for name in nodes.iter().flat_map(|n| n.input.iter()) {
        let known = name.is_empty()
            || produced.contains(&name.as_str())
            || initializers.iter().any(|t| &t.name == name)
            || inputs.iter().any(|vi| &vi.name == name);
        if !known {
            inputs.push(make_value_info(name));
        }
    }
    let outputs = nodes
        .last()
        .map(|n| n.output.iter().map(|o| make_value_info(o)).collect())
        .unwrap_or_default();

    ModelProto {
        ir_version: 8,
        producer_name: "onnx-version-converter".to_string(),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: opset_version,
        }],
        graph: Some(GraphProto {
            name: "graph".to_string(),
            node: nodes,
            initializer: initializers,
            input: inputs,
            output: outputs,
            ..Default::default()
        }),
        ..Default::default()
    }
}
