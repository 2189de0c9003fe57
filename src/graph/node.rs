//! Graph node

use crate::opset::canonical_domain;
use crate::proto::{AttributeProto, NodeProto};

use super::maps::NodeId;

/// One operator invocation owned by a [`Graph`](super::Graph)
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    proto: NodeProto,
}

impl Node {
    pub(crate) fn new(id: NodeId, proto: NodeProto) -> Self {
        Self { id, proto }
    }

    /// Stable id of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node name (may be empty)
    pub fn name(&self) -> &str {
        &self.proto.name
    }

    /// Name for diagnostics: the node name, or its id when unnamed
    pub fn display_name(&self) -> String {
        if self.proto.name.is_empty() {
            self.id.to_string()
        } else {
            self.proto.name.clone()
        }
    }

    /// Operator type
    pub fn op_type(&self) -> &str {
        &self.proto.op_type
    }

    /// Domain with the default domain canonicalized to `""`
    pub fn domain(&self) -> &str {
        canonical_domain(&self.proto.domain)
    }

    /// Input tensor names
    pub fn inputs(&self) -> &[String] {
        &self.proto.input
    }

    /// Mutable input tensor names
    pub fn inputs_mut(&mut self) -> &mut Vec<String> {
        &mut self.proto.input
    }

    /// Output tensor names
    pub fn outputs(&self) -> &[String] {
        &self.proto.output
    }

    /// Mutable output tensor names
    pub fn outputs_mut(&mut self) -> &mut Vec<String> {
        &mut self.proto.output
    }

    /// All attributes in declaration order
    pub fn attributes(&self) -> &[AttributeProto] {
        &self.proto.attribute
    }

    /// Attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeProto> {
        self.proto.get_attribute(name)
    }

    /// Insert an attribute, replacing one with the same name in place
    pub fn set_attribute(&mut self, attr: AttributeProto) {
        match self.proto.attribute.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.proto.attribute.push(attr),
        }
    }

    /// Remove an attribute by name
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeProto> {
        let idx = self.proto.attribute.iter().position(|a| a.name == name)?;
        Some(self.proto.attribute.remove(idx))
    }

    /// Underlying protobuf node
    pub fn as_proto(&self) -> &NodeProto {
        &self.proto
    }

    /// Consume into the protobuf node
    pub fn into_proto(self) -> NodeProto {
        self.proto
    }
}
