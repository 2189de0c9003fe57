//! Operator adapters
//!
//! An adapter rewrites one node so that it stays valid across exactly one
//! opset version boundary, e.g. `Squeeze` from opset 12 to 13. Longer
//! conversions are composed by the converter one step at a time.
//!
//! - [`Adapter`]: the single-step rewrite interface
//! - [`AdapterRegistry`]: structured `(op, domain, from, to)` → adapter lookup
//! - [`builtin`]: adapters for common default-domain changes
//!
//! # Example
//!
//! ```ignore
//! use onnx_version_converter::adapter::{AdapterRegistry, CompatibleAdapter};
//! use onnx_version_converter::opset::OpSetId;
//!
//! let mut registry = AdapterRegistry::new();
//! registry.register_adapter(CompatibleAdapter::new("Relu", OpSetId::onnx(13), OpSetId::onnx(14)), "")?;
//! ```

pub mod builtin;
pub mod registry;

pub use builtin::{
    AddAttributeDefault, AttributeToInput, CompatibleAdapter, DropAttributeDefault,
    InputToAttribute,
};
pub use registry::{AdapterKey, AdapterRegistry};

use crate::error::ConvertError;
use crate::error::ConvertResult;
use crate::graph::{Graph, NodeId};
use crate::opset::OpSetId;

/// Single-step rewrite of one operator between two adjacent opset versions
///
/// Implementations must leave the node (or the node(s) replacing it) valid
/// under [`target_version`](Adapter::target_version). They must not depend on
/// the order in which the converter visits other nodes; anything needed from
/// sibling nodes has to be read before mutating the graph.
pub trait Adapter: Send + Sync {
    /// Operator type this adapter handles
    fn name(&self) -> &str;

    /// Opset version the node is valid under before adaptation
    fn initial_version(&self) -> &OpSetId;

    /// Opset version the node is valid under after adaptation
    fn target_version(&self) -> &OpSetId;

    /// Rewrite `node` in `graph`
    fn adapt(&self, graph: &mut Graph, node: NodeId) -> ConvertResult<()>;

    /// Build an [`ConvertError::AdapterFailed`] for `node`
    fn failure(&self, graph: &Graph, node: NodeId, reason: impl Into<String>) -> ConvertError
    where
        Self: Sized,
    {
        ConvertError::AdapterFailed {
            op_type: self.name().to_string(),
            node: graph
                .node(node)
                .map(|n| n.display_name())
                .unwrap_or_else(|| node.to_string()),
            from: self.initial_version().version(),
            to: self.target_version().version(),
            reason: reason.into(),
        }
    }
}
