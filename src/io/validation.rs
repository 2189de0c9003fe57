//! Structural model validation
//!
//! Checks the properties a converted model must keep: a graph whose node
//! inputs all resolve, unique node outputs, and one opset import per domain
//! with a version inside the known range.

use rustc_hash::FxHashSet;

use crate::error::{ConvertError, ConvertResult};
use crate::opset::{canonical_domain, VersionRangeTable};
use crate::proto::{GraphProto, ModelProto};

/// Validation result with detailed issues
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the model is valid
    pub is_valid: bool,
    /// Critical issues
    pub errors: Vec<String>,
    /// Non-critical issues
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.is_valid = false;
    }

    /// Add a warning
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Merge with another result
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Validate a model against the built-in version ranges
pub fn validate_model(model: &ModelProto) -> ValidationResult {
    validate_model_with_ranges(model, &VersionRangeTable::builtin())
}

/// Validate a model, checking opset imports against `ranges`
///
/// Domains missing from `ranges` only produce a warning.
pub fn validate_model_with_ranges(model: &ModelProto, ranges: &VersionRangeTable) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if model.ir_version < 3 {
        result.add_error(format!(
            "IR version {} predates opset imports",
            model.ir_version
        ));
    }

    if model.opset_import.is_empty() {
        result.add_warning("No opset imports specified");
    }

    let mut seen = FxHashSet::default();
    for opset in &model.opset_import {
        let domain = canonical_domain(&opset.domain);
        if !seen.insert(domain) {
            result.add_error(format!("Opset domain '{}' is imported more than once", opset.domain));
            continue;
        }
        match ranges.range(domain) {
            Some((min, max)) if opset.version < min || opset.version > max => {
                result.add_error(format!(
                    "Opset version {} of domain '{}' is outside {}..={}",
                    opset.version, opset.domain, min, max
                ));
            }
            Some(_) => {}
            None => result.add_warning(format!("Unknown opset domain '{}'", opset.domain)),
        }
    }

    match &model.graph {
        Some(graph) => result.merge(validate_graph(graph)),
        None => result.add_error("Model does not contain a graph"),
    }

    result
}

/// Validate graph connectivity
pub fn validate_graph(graph: &GraphProto) -> ValidationResult {
    let mut result = ValidationResult::valid();

    let mut known_tensors: FxHashSet<&str> = FxHashSet::default();

    for input in &graph.input {
        if input.name.is_empty() {
            result.add_error("Graph input has empty name");
        } else {
            known_tensors.insert(&input.name);
        }
    }

    for init in &graph.initializer {
        if init.name.is_empty() {
            result.add_warning("Initializer has empty name");
        } else {
            known_tensors.insert(&init.name);
        }
    }

    let mut node_outputs: FxHashSet<&str> = FxHashSet::default();

    for (idx, node) in graph.node.iter().enumerate() {
        if node.op_type.is_empty() {
            result.add_error(format!("Node {} has empty op_type", idx));
        }

        // Inputs must be graph inputs, initializers or produced earlier
        for input in &node.input {
            if !input.is_empty() && !known_tensors.contains(input.as_str()) {
                result.add_error(format!(
                    "Node '{}' ({}): input '{}' not found",
                    node.name, node.op_type, input
                ));
            }
        }

        for output in node.output.iter().filter(|o| !o.is_empty()) {
            if !node_outputs.insert(output) {
                result.add_error(format!(
                    "Duplicate output '{}' in node '{}'",
                    output, node.name
                ));
            }
            known_tensors.insert(output);
        }
    }

    for output in &graph.output {
        if output.name.is_empty() {
            result.add_error("Graph output has empty name");
        } else if !known_tensors.contains(output.name.as_str()) {
            result.add_error(format!(
                "Graph output '{}' not produced by any node",
                output.name
            ));
        }
    }

    result
}

/// Validate and turn the collected errors into [`ConvertError::ValidationFailed`]
pub fn check_model(model: &ModelProto) -> ConvertResult<()> {
    let result = validate_model(model);
    if result.is_valid {
        Ok(())
    } else {
        Err(ConvertError::ValidationFailed(result.errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_model, make_node};
    use crate::proto::OperatorSetIdProto;

    fn make_valid_model() -> ModelProto {
        make_model(vec![make_node("Relu", &["X"], &["Y"], "relu_0")], vec![], 13)
    }

    #[test]
    fn test_validate_valid_model() {
        let result = validate_model(&make_valid_model());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(check_model(&make_valid_model()).is_ok());
    }

    #[test]
    fn test_validate_missing_graph() {
        let model = ModelProto {
            ir_version: 8,
            ..Default::default()
        };

        let result = validate_model(&model);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("graph")));
    }

    #[test]
    fn test_validate_dangling_input() {
        let mut model = make_valid_model();
        model.graph.as_mut().unwrap().node[0].input[0] = "missing".to_string();

        let err = check_model(&model).unwrap_err();
        assert!(matches!(err, ConvertError::ValidationFailed(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validate_duplicate_output() {
        let mut model = make_valid_model();
        let graph = model.graph.as_mut().unwrap();
        graph.node.push(make_node("Relu", &["X"], &["Y"], "relu_1"));

        let result = validate_graph(graph);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("Duplicate")));
    }

    #[test]
    fn test_validate_opset_imports() {
        let mut model = make_valid_model();
        model.opset_import[0].version = 30;
        assert!(!validate_model(&model).is_valid);

        let mut model = make_valid_model();
        model.opset_import.push(OperatorSetIdProto {
            domain: "ai.onnx".to_string(),
            version: 13,
        });
        assert!(!validate_model(&model).is_valid);

        let mut model = make_valid_model();
        model.opset_import.push(OperatorSetIdProto {
            domain: "custom.ml".to_string(),
            version: 1,
        });
        let result = validate_model(&model);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_custom_ranges() {
        let ranges = VersionRangeTable::new().with_range("", 7, 12);
        let result = validate_model_with_ranges(&make_valid_model(), &ranges);
        assert!(!result.is_valid);
    }
}
