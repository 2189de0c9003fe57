//! ONNX I/O module
//!
//! Loading, saving and validating models, plus file-to-file conversion.
//!
//! # Example
//!
//! ```ignore
//! use onnx_version_converter::io::convert_file;
//! use onnx_version_converter::opset::OpSetId;
//!
//! let report = convert_file(
//!     "model_opset12.onnx",
//!     "model_opset13.onnx",
//!     &OpSetId::onnx(12),
//!     &OpSetId::onnx(13),
//!     &Default::default(),
//! )?;
//! println!("{}", report);
//! ```

pub mod reader;
pub mod validation;
pub mod writer;

pub use reader::{get_model_info, load_model, load_model_from_bytes, ModelInfo};
pub use validation::{
    check_model, validate_graph, validate_model, validate_model_with_ranges, ValidationResult,
};
pub use writer::{model_size, model_to_bytes, save_model};

use std::path::Path;

use tracing::debug;

use crate::convert::{ConversionReport, ConvertConfig, VersionConverter};
use crate::error::ConvertResult;
use crate::opset::{get_opset_version, OpSetId};

/// Convert an ONNX file and save the result to another file
///
/// Uses the built-in schemas and adapters. Nothing is written when the
/// conversion fails.
pub fn convert_file<P1: AsRef<Path>, P2: AsRef<Path>>(
    input: P1,
    output: P2,
    initial: &OpSetId,
    target: &OpSetId,
    config: &ConvertConfig,
) -> ConvertResult<ConversionReport> {
    let model = load_model(input.as_ref())?;
    debug!(path = %input.as_ref().display(), size = model_size(&model), "loaded model");

    let converter = VersionConverter::with_builtin().with_config(config.clone());
    let (converted, report) = converter.convert_with_report(&model, initial, target)?;

    save_model(&converted, output)?;
    Ok(report)
}

/// Convert an ONNX file to `target_version`, starting from its declared version
pub fn convert_file_to<P1: AsRef<Path>, P2: AsRef<Path>>(
    input: P1,
    output: P2,
    target_version: i64,
) -> ConvertResult<ConversionReport> {
    let model = load_model(input.as_ref())?;
    let initial = OpSetId::onnx(get_opset_version(&model));

    let converter = VersionConverter::with_builtin();
    let (converted, report) =
        converter.convert_with_report(&model, &initial, &OpSetId::onnx(target_version))?;

    save_model(&converted, output)?;
    Ok(report)
}
