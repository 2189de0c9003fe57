//! ONNX Protocol Buffer types
//!
//! This module declares the ONNX protobuf messages with `prost` derives.
//! Additional extension methods are provided in the `extensions` submodule.

/// ONNX protobuf types
#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod onnx;

// Re-export commonly used types at module level
pub use onnx::{
    AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto,
    TensorShapeProto, TypeProto, ValueInfoProto,
};

// Re-export submodules for nested types
pub use onnx::attribute_proto;
pub use onnx::tensor_proto;

/// Extension methods for ONNX protobuf types
pub mod extensions;
