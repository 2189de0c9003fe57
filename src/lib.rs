//! # ONNX Version Converter
//!
//! Migrates ONNX models between versions of the default operator set.
//!
//! A conversion walks the opset one version at a time. At every step each
//! node whose operator is (re)defined at that boundary is rewritten by a
//! single-step adapter; a missing adapter aborts the whole conversion and
//! the caller keeps its input model.
//!
//! ## Features
//!
//! - **Schema Index**: `name → domain → version` history lookup
//! - **Adapter Registry**: structured `(op, domain, from, to)` adapter keys
//! - **Conversion Engine**: stepwise migration with per-run schema tracking
//! - **Graph IR**: arena-backed graph with stable node ids
//!
//! ## Example
//!
//! ```ignore
//! use onnx_version_converter::prelude::*;
//!
//! let model = load_model("model.onnx")?;
//! let converter = VersionConverter::with_builtin();
//! let converted = converter.convert(&model, &OpSetId::onnx(12), &OpSetId::onnx(13))?;
//! save_model(&converted, "model_opset13.onnx")?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod adapter;
pub mod convert;
pub mod error;
pub mod graph;
pub mod io;
pub mod opset;
pub mod proto;
pub mod schema;
pub mod traits;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use onnx_version_converter::prelude::*`
pub mod prelude {
    pub use crate::adapter::{Adapter, AdapterKey, AdapterRegistry, CompatibleAdapter};
    pub use crate::convert::{ConversionReport, ConvertConfig, OpsetConversion, VersionConverter};
    pub use crate::error::{ConvertError, ConvertResult};
    pub use crate::graph::{Graph, Node, NodeId};
    pub use crate::io::{convert_file, load_model, save_model};
    pub use crate::opset::{get_opset_version, OpSetId, VersionRangeTable};
    pub use crate::proto::onnx::*;
    pub use crate::schema::{OpSchema, SchemaIndex, SchemaSource};
    pub use crate::traits::Transformer;
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use convert::VersionConverter;
pub use error::{ConvertError, ConvertResult};
pub use opset::OpSetId;
pub use traits::Transformer;

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
