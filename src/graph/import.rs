//! Conversion between `ModelProto` and [`Graph`]

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::error::{ConvertError, ConvertResult};
use crate::opset::canonical_domain;
use crate::proto::{GraphProto, ModelProto};

use super::ir::Graph;

/// Oldest IR version that carries opset imports
pub const MIN_IR_VERSION: i64 = 3;

impl Graph {
    /// Import the graph of a model
    ///
    /// Fails with [`ConvertError::UnparsableModel`] when the model has no
    /// graph, predates opset imports, declares a domain twice, or contains a
    /// node without an operator type.
    pub fn import(model: &ModelProto) -> ConvertResult<Self> {
        if model.ir_version < MIN_IR_VERSION {
            return Err(ConvertError::UnparsableModel(format!(
                "IR version {} is too old (opset imports need IR version {} or later)",
                model.ir_version, MIN_IR_VERSION
            )));
        }

        let proto = model
            .graph
            .as_ref()
            .ok_or_else(|| ConvertError::UnparsableModel("Model does not contain a graph".to_string()))?;

        let mut seen_domains = FxHashSet::default();
        for opset in &model.opset_import {
            if !seen_domains.insert(canonical_domain(&opset.domain)) {
                return Err(ConvertError::UnparsableModel(format!(
                    "Opset domain '{}' is imported more than once",
                    opset.domain
                )));
            }
        }

        if let Some((idx, _)) = proto
            .node
            .iter()
            .enumerate()
            .find(|(_, n)| n.op_type.is_empty())
        {
            return Err(ConvertError::UnparsableModel(format!(
                "Node {} has empty op_type",
                idx
            )));
        }

        let interface = GraphProto {
            node: Vec::new(),
            initializer: Vec::new(),
            ..proto.clone()
        };

        let mut graph = Graph {
            nodes: IndexMap::with_capacity(proto.node.len()),
            next_id: 0,
            initializers: proto
                .initializer
                .iter()
                .map(|t| (t.name.clone(), t.clone()))
                .collect(),
            opset_imports: model.opset_import.clone(),
            interface,
        };

        for node in &proto.node {
            graph.push_node(node.clone());
        }

        Ok(graph)
    }

    /// Export into a model, taking every non-graph field from `template`
    ///
    /// The opset imports of the result are the graph's current imports.
    pub fn export(&self, template: &ModelProto) -> ModelProto {
        let graph = GraphProto {
            node: self.nodes.values().map(|n| n.as_proto().clone()).collect(),
            initializer: self.initializers.values().cloned().collect(),
            ..self.interface.clone()
        };

        ModelProto {
            opset_import: self.opset_imports.clone(),
            graph: Some(graph),
            ..template.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_model, make_node};
    use crate::proto::{OperatorSetIdProto, TensorProto};

    fn make_test_model() -> ModelProto {
        make_model(
            vec![
                make_node("Conv", &["X", "W"], &["conv_out"], "conv_0"),
                make_node("Relu", &["conv_out"], &["Y"], "relu_0"),
            ],
            vec![TensorProto::new_int64_vector("W", vec![1, 2])],
            11,
        )
    }

    #[test]
    fn test_import_export_preserves_model() {
        let model = make_test_model();
        let graph = Graph::import(&model).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.opset_version(""), Some(11));
        assert_eq!(graph.export(&model), model);
    }

    #[test]
    fn test_missing_graph() {
        let model = ModelProto {
            ir_version: 8,
            ..Default::default()
        };
        let err = Graph::import(&model).unwrap_err();
        assert!(matches!(err, ConvertError::UnparsableModel(_)));
    }

    #[test]
    fn test_ir_version_too_old() {
        let mut model = make_test_model();
        model.ir_version = 2;
        let err = Graph::import(&model).unwrap_err();
        assert!(err.to_string().contains("IR version 2"));
    }

    #[test]
    fn test_duplicate_default_domain() {
        let mut model = make_test_model();
        model.opset_import.push(OperatorSetIdProto {
            domain: "ai.onnx".to_string(),
            version: 13,
        });
        assert!(Graph::import(&model).is_err());
    }

    #[test]
    fn test_empty_op_type() {
        let mut model = make_test_model();
        model.graph.as_mut().unwrap().node[1].op_type.clear();
        let err = Graph::import(&model).unwrap_err();
        assert!(err.to_string().contains("Node 1"));
    }

    #[test]
    fn test_export_reflects_mutation() {
        let model = make_test_model();
        let mut graph = Graph::import(&model).unwrap();

        let relu = graph.find_node("relu_0").unwrap();
        graph.remove_node(relu);
        graph.set_opset_version("", 12);

        let out = graph.export(&model);
        assert_eq!(out.graph.as_ref().unwrap().node.len(), 1);
        assert_eq!(out.get_opset_version(), Some(12));
        assert_eq!(out.producer_name, model.producer_name);
    }
}
