//! Built-in schema history
//!
//! Definition history (`since_version` values) of commonly used operators,
//! matching the ONNX 1.16 operator changelog. Operators missing here are
//! treated as unknown and left untouched by the converter.

use super::{OpSchema, SchemaSource};
use crate::opset::{DEFAULT_DOMAIN, ONNX_ML_DOMAIN};

/// (operator, domain, since_versions)
const HISTORY: &[(&str, &str, &[i64])] = &[
    ("Abs", DEFAULT_DOMAIN, &[1, 6, 13]),
    ("Add", DEFAULT_DOMAIN, &[1, 6, 7, 13, 14]),
    ("BatchNormalization", DEFAULT_DOMAIN, &[1, 6, 7, 9, 14, 15]),
    ("Cast", DEFAULT_DOMAIN, &[1, 6, 9, 13, 19, 21]),
    ("Concat", DEFAULT_DOMAIN, &[1, 4, 11, 13]),
    ("Constant", DEFAULT_DOMAIN, &[1, 9, 11, 12, 13, 19, 21]),
    ("Conv", DEFAULT_DOMAIN, &[1, 11]),
    ("Div", DEFAULT_DOMAIN, &[1, 6, 7, 13, 14]),
    ("Flatten", DEFAULT_DOMAIN, &[1, 9, 11, 13, 21]),
    ("Gather", DEFAULT_DOMAIN, &[1, 11, 13]),
    ("Gemm", DEFAULT_DOMAIN, &[1, 6, 7, 9, 11, 13]),
    ("GlobalAveragePool", DEFAULT_DOMAIN, &[1]),
    ("Identity", DEFAULT_DOMAIN, &[1, 13, 14, 16, 19, 21]),
    ("LayerNormalization", DEFAULT_DOMAIN, &[17]),
    ("MatMul", DEFAULT_DOMAIN, &[1, 9, 13]),
    ("MaxPool", DEFAULT_DOMAIN, &[1, 8, 10, 11, 12]),
    ("Mul", DEFAULT_DOMAIN, &[1, 6, 7, 13, 14]),
    ("Relu", DEFAULT_DOMAIN, &[1, 6, 13, 14]),
    ("Reshape", DEFAULT_DOMAIN, &[1, 5, 13, 14, 19, 21]),
    ("Shape", DEFAULT_DOMAIN, &[1, 13, 15, 19, 21]),
    ("Sigmoid", DEFAULT_DOMAIN, &[1, 6, 13]),
    ("Softmax", DEFAULT_DOMAIN, &[1, 11, 13]),
    ("Split", DEFAULT_DOMAIN, &[1, 2, 11, 13, 18]),
    ("Squeeze", DEFAULT_DOMAIN, &[1, 11, 13, 21]),
    ("Sub", DEFAULT_DOMAIN, &[1, 6, 7, 13, 14]),
    ("Tanh", DEFAULT_DOMAIN, &[1, 6, 13]),
    ("Transpose", DEFAULT_DOMAIN, &[1, 13, 21]),
    ("Unsqueeze", DEFAULT_DOMAIN, &[1, 11, 13, 21]),
    ("LabelEncoder", ONNX_ML_DOMAIN, &[1, 2, 4]),
];

/// Schema source backed by the built-in history table
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSchemas;

impl SchemaSource for BuiltinSchemas {
    fn all_schemas_with_history(&self) -> Vec<OpSchema> {
        HISTORY
            .iter()
            .flat_map(|(name, domain, versions)| {
                versions
                    .iter()
                    .map(move |&since| OpSchema::new(*name, domain, since))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaIndex;

    #[test]
    fn test_history_sorted_and_unique() {
        for (name, _, versions) in HISTORY {
            assert!(
                versions.windows(2).all(|w| w[0] < w[1]),
                "history of {} must be strictly increasing",
                name
            );
        }
    }

    #[test]
    fn test_builtin_index() {
        let index = SchemaIndex::from_source(&BuiltinSchemas);

        assert_eq!(index.resolve("Squeeze", "", 12).unwrap().since_version(), 11);
        assert_eq!(index.resolve("Relu", "ai.onnx", 21).unwrap().since_version(), 14);
        assert!(index.resolve("LayerNormalization", "", 16).is_none());
        assert!(index.has_operator("LabelEncoder", "ai.onnx.ml"));
    }
}
