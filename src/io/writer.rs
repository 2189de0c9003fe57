//! ONNX model writer
//!
//! Save ONNX models to files or bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use prost::Message;

use crate::error::ConvertResult;
use crate::proto::ModelProto;

/// Save an ONNX model to a file
///
/// # Example
///
/// ```ignore
/// use onnx_version_converter::io::save_model;
///
/// save_model(&model, "converted.onnx")?;
/// ```
pub fn save_model<P: AsRef<Path>>(model: &ModelProto, path: P) -> ConvertResult<()> {
    let file = File::create(path.as_ref())?;

    let mut writer = BufWriter::new(file);
    writer.write_all(&model.encode_to_vec())?;
    writer.flush()?;

    Ok(())
}

/// Encode an ONNX model to bytes
pub fn model_to_bytes(model: &ModelProto) -> Vec<u8> {
    model.encode_to_vec()
}

/// Size of the encoded model in bytes
pub fn model_size(model: &ModelProto) -> usize {
    model.encoded_len()
}
