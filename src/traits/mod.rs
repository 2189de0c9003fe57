//! Core traits for onnx-version-converter
//!
//! Defines the model-level transformation interface.

use crate::error::ConvertResult;
use crate::proto::ModelProto;

/// Transformer trait for model transformations
///
/// Implemented by [`OpsetConversion`](crate::convert::OpsetConversion), so a
/// conversion can be composed with other model passes.
///
/// # Example
///
/// ```ignore
/// struct MyTransformer;
///
/// impl Transformer for MyTransformer {
///     fn transform(&self, model: ModelProto) -> ConvertResult<ModelProto> {
///         Ok(model)
///     }
/// }
/// ```
pub trait Transformer {
    /// Transform the given model
    fn transform(&self, model: ModelProto) -> ConvertResult<ModelProto>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BumpIrVersion;

    impl Transformer for BumpIrVersion {
        fn transform(&self, mut model: ModelProto) -> ConvertResult<ModelProto> {
            model.ir_version += 1;
            Ok(model)
        }
    }

    #[test]
    fn test_transformer_as_trait_object() {
        let passes: Vec<Box<dyn Transformer>> =
            vec![Box::new(BumpIrVersion), Box::new(BumpIrVersion)];

        let mut model = ModelProto::default();
        for pass in &passes {
            model = pass.transform(model).unwrap();
        }
        assert_eq!(model.ir_version, 2);
    }
}
