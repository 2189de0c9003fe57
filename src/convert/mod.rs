//! Opset version conversion
//!
//! Converts a model between two versions of the default ONNX operator set,
//! one version step at a time:
//!
//! 1. import the model into a private [`Graph`](crate::graph::Graph) copy
//! 2. reject non-default domains and out-of-range targets
//! 3. tag every node with its governing schema ([`resolve_current_schemas`])
//! 4. for each step, adapt every node whose operator is (re)defined at
//!    either end of the step, then advance the declared version
//! 5. export the copy
//!
//! The input model is never modified; a failed conversion leaves the caller
//! with exactly what it passed in.
//!
//! # Example
//!
//! ```ignore
//! use onnx_version_converter::convert::VersionConverter;
//! use onnx_version_converter::opset::OpSetId;
//!
//! let converter = VersionConverter::with_builtin();
//! let upgraded = converter.convert(&model, &OpSetId::onnx(12), &OpSetId::onnx(13))?;
//! ```

pub mod engine;
pub mod plan;
pub mod report;
pub mod resolver;

pub use engine::{OpsetConversion, VersionConverter};
pub use plan::{requires_adapter, ConversionPlan, PlannedStep};
pub use report::{AdaptedNode, ConversionReport, StepReport};
pub use resolver::{resolve_current_schemas, resolve_node, CurrentOpSchemaMap};

/// Conversion options
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Check adapter coverage for the initial nodes before running any adapter
    pub preflight: bool,
    /// Validate the exported model structurally
    pub validate_output: bool,
    /// Overwrite the declared default-domain version with the requested initial version
    pub sync_declared_version: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            preflight: true,
            validate_output: false,
            sync_declared_version: true,
        }
    }
}

impl ConvertConfig {
    /// Set preflight checking
    pub fn with_preflight(mut self, enabled: bool) -> Self {
        self.preflight = enabled;
        self
    }

    /// Set output validation
    pub fn with_validate_output(mut self, enabled: bool) -> Self {
        self.validate_output = enabled;
        self
    }

    /// Set declared-version synchronization
    pub fn with_sync_declared_version(mut self, enabled: bool) -> Self {
        self.sync_declared_version = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConvertConfig::default()
            .with_preflight(false)
            .with_validate_output(true);

        assert!(!config.preflight);
        assert!(config.validate_output);
        assert!(config.sync_declared_version);
    }
}
