//! ONNX model reader
//!
//! Load ONNX models from files or bytes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use prost::Message;

use crate::error::{ConvertError, ConvertResult};
use crate::opset::OpSetId;
use crate::proto::ModelProto;

/// Load an ONNX model from a file path
///
/// # Example
///
/// ```ignore
/// use onnx_version_converter::io::load_model;
///
/// let model = load_model("model.onnx")?;
/// println!("Model IR version: {}", model.ir_version);
/// ```
pub fn load_model<P: AsRef<Path>>(path: P) -> ConvertResult<ModelProto> {
    let file = File::open(path.as_ref())?;

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    load_model_from_bytes(&buffer)
}

/// Load an ONNX model from bytes
///
/// Undecodable input is reported as [`ConvertError::UnparsableModel`].
pub fn load_model_from_bytes(bytes: &[u8]) -> ConvertResult<ModelProto> {
    ModelProto::decode(bytes)
        .map_err(|e| ConvertError::UnparsableModel(format!("Failed to decode ONNX model: {}", e)))
}

/// Opset-related summary of a model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// IR version
    pub ir_version: i64,
    /// Producer name
    pub producer_name: String,
    /// Opset imports, domains canonicalized
    pub opsets: Vec<OpSetId>,
    /// Number of nodes
    pub node_count: usize,
    /// Distinct operator types, sorted
    pub op_types: Vec<String>,
}

impl ModelInfo {
    /// Extract the summary from a model
    pub fn from_model(model: &ModelProto) -> Self {
        let graph = model.graph.as_ref();

        let mut op_types: Vec<String> = graph
            .map(|g| g.node.iter().map(|n| n.op_type.clone()).collect())
            .unwrap_or_default();
        op_types.sort();
        op_types.dedup();

        Self {
            ir_version: model.ir_version,
            producer_name: model.producer_name.clone(),
            opsets: model.opset_import.iter().map(OpSetId::from).collect(),
            node_count: graph.map(|g| g.node.len()).unwrap_or(0),
            op_types,
        }
    }

    /// Declared default-domain version
    pub fn default_opset(&self) -> Option<i64> {
        self.opsets
            .iter()
            .find(|op| op.is_default_domain())
            .map(OpSetId::version)
    }
}

/// Load a model and summarize it
pub fn get_model_info<P: AsRef<Path>>(path: P) -> ConvertResult<ModelInfo> {
    let model = load_model(path)?;
    Ok(ModelInfo::from_model(&model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_model, make_node};

    fn create_test_model() -> ModelProto {
        let mut model = make_model(
            vec![
                make_node("Relu", &["X"], &["A"], "relu_0"),
                make_node("Squeeze", &["A"], &["B"], "squeeze_0"),
                make_node("Relu", &["B"], &["Y"], "relu_1"),
            ],
            vec![],
            12,
        );
        model.opset_import[0].domain = "ai.onnx".to_string();
        model
    }

    #[test]
    fn test_load_from_bytes() {
        let model = create_test_model();
        let bytes = model.encode_to_vec();

        let loaded = load_model_from_bytes(&bytes).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_model_info() {
        let info = ModelInfo::from_model(&create_test_model());

        assert_eq!(info.ir_version, 8);
        assert_eq!(info.node_count, 3);
        assert_eq!(info.op_types, vec!["Relu", "Squeeze"]);
        assert_eq!(info.opsets, vec![OpSetId::onnx(12)]);
        assert_eq!(info.default_opset(), Some(12));
    }

    #[test]
    fn test_load_invalid_bytes() {
        let err = load_model_from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_model("/nonexistent/model.onnx").unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
