//! Error types for onnx-version-converter
//!
//! Every way a conversion can be refused is an explicit variant here.
//! None of them is fatal to the host: the caller keeps its input model
//! and decides what to do with the reported detail.

use thiserror::Error;

/// Main error type for opset conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The model could not be imported into the in-memory graph
    #[error("Unable to parse input model: {0}")]
    UnparsableModel(String),

    /// Initial or target domain is not the default ONNX domain
    #[error(
        "Only default domain opsets ('' or 'ai.onnx') can be converted, \
         got initial domain '{initial}' and target domain '{target}'"
    )]
    UnsupportedDomain {
        /// Requested initial domain
        initial: String,
        /// Requested target domain
        target: String,
    },

    /// Target version lies outside the supported range of its domain
    #[error("Invalid target version {version} for domain '{domain}', expected {min}..={max}")]
    TargetVersionOutOfRange {
        /// Domain whose range was queried
        domain: String,
        /// Requested target version
        version: i64,
        /// Minimum supported
        min: i64,
        /// Maximum supported
        max: i64,
    },

    /// Initial version lies outside the supported range of its domain
    #[error("Invalid initial version {version} for domain '{domain}', expected {min}..={max}")]
    InitialVersionOutOfRange {
        /// Domain whose range was queried
        domain: String,
        /// Requested initial version
        version: i64,
        /// Minimum supported
        min: i64,
        /// Maximum supported
        max: i64,
    },

    /// An operator changes at a crossed version boundary and no adapter covers the step
    #[error("No adapter registered for {op_type} (domain '{domain}') from opset {from} to {to}")]
    MissingAdapter {
        /// Operator type
        op_type: String,
        /// Operator domain (canonical form)
        domain: String,
        /// Version the step starts from
        from: i64,
        /// Version the step leads to
        to: i64,
    },

    /// An adapter could not be registered
    #[error("Invalid adapter: {0}")]
    InvalidAdapter(String),

    /// An adapter was found but failed to rewrite a node
    #[error("Adapter for {op_type} failed on node '{node}' ({from} -> {to}): {reason}")]
    AdapterFailed {
        /// Operator type
        op_type: String,
        /// Node name (or id when unnamed)
        node: String,
        /// Version the step starts from
        from: i64,
        /// Version the step leads to
        to: i64,
        /// Adapter supplied reason
        reason: String,
    },

    /// Converted model failed structural validation
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decode error
    #[error("Protobuf decode error: {0}")]
    ProtoDecode(#[from] prost::DecodeError),
}

impl ConvertError {
    /// Whether the error was caused by the input model rather than the request
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ConvertError::UnparsableModel(_) | ConvertError::ProtoDecode(_)
        )
    }

    /// Whether the error means the requested conversion cannot be performed
    /// with the current registry and ranges
    pub fn is_unsupported_conversion(&self) -> bool {
        matches!(
            self,
            ConvertError::UnsupportedDomain { .. }
                | ConvertError::InitialVersionOutOfRange { .. }
                | ConvertError::TargetVersionOutOfRange { .. }
                | ConvertError::MissingAdapter { .. }
                | ConvertError::AdapterFailed { .. }
        )
    }
}

/// Result type alias for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::MissingAdapter {
            op_type: "Squeeze".to_string(),
            domain: String::new(),
            from: 12,
            to: 13,
        };
        let msg = err.to_string();
        assert!(msg.contains("Squeeze"));
        assert!(msg.contains("12"));
        assert!(msg.contains("13"));
    }

    #[test]
    fn test_out_of_range_display() {
        let err = ConvertError::TargetVersionOutOfRange {
            domain: String::new(),
            version: 99,
            min: 1,
            max: 21,
        };
        assert!(err.to_string().contains("99"));
        assert!(err.to_string().contains("1..=21"));
    }

    #[test]
    fn test_error_classes() {
        assert!(ConvertError::UnparsableModel("x".into()).is_malformed_input());
        let domain = ConvertError::UnsupportedDomain {
            initial: String::new(),
            target: "custom.ml".to_string(),
        };
        assert!(domain.is_unsupported_conversion());
        assert!(!domain.is_malformed_input());
    }
}
