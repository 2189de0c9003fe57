//! ONNX operator set identities
//!
//! An operator set is identified by a `(domain, version)` pair. The default
//! ONNX domain has two spellings, `""` and `"ai.onnx"`; [`OpSetId`] stores the
//! empty form so that ids compare equal regardless of how they were written.
//!
//! [`VersionRangeTable`] answers which versions of a domain are known at all,
//! which the converter checks before accepting a target version.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::proto::{ModelProto, OperatorSetIdProto};

/// ONNX domain identifier (alias of the empty default domain)
pub const ONNX_DOMAIN: &str = "ai.onnx";

/// Canonical spelling of the default domain
pub const DEFAULT_DOMAIN: &str = "";

/// ONNX-ML domain
pub const ONNX_ML_DOMAIN: &str = "ai.onnx.ml";

/// Check whether `domain` names the default ONNX domain
pub fn is_default_domain(domain: &str) -> bool {
    domain.is_empty() || domain == ONNX_DOMAIN
}

/// Map both spellings of the default domain to `""`, leave others untouched
pub fn canonical_domain(domain: &str) -> &str {
    if is_default_domain(domain) {
        DEFAULT_DOMAIN
    } else {
        domain
    }
}

/// Operator set version within one domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpSetId {
    domain: String,
    version: i64,
}

impl OpSetId {
    /// Create an id, normalizing the default domain
    pub fn new(domain: impl AsRef<str>, version: i64) -> Self {
        Self {
            domain: canonical_domain(domain.as_ref()).to_string(),
            version,
        }
    }

    /// Id in the default ONNX domain
    pub fn onnx(version: i64) -> Self {
        Self::new(DEFAULT_DOMAIN, version)
    }

    /// Canonical domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Version number
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Whether this id lives in the default domain
    pub fn is_default_domain(&self) -> bool {
        self.domain.is_empty()
    }

    /// Same domain, different version
    pub fn with_version(&self, version: i64) -> Self {
        Self {
            domain: self.domain.clone(),
            version,
        }
    }

    /// Protobuf form
    pub fn to_proto(&self) -> OperatorSetIdProto {
        OperatorSetIdProto {
            domain: self.domain.clone(),
            version: self.version,
        }
    }
}

impl From<&OperatorSetIdProto> for OpSetId {
    fn from(proto: &OperatorSetIdProto) -> Self {
        Self::new(&proto.domain, proto.version)
    }
}

impl fmt::Display for OpSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain.is_empty() {
            write!(f, "{}/{}", ONNX_DOMAIN, self.version)
        } else {
            write!(f, "{}/{}", self.domain, self.version)
        }
    }
}

/// Supported version range per domain: `domain → (min, max)`
#[derive(Debug, Clone, Default)]
pub struct VersionRangeTable {
    ranges: FxHashMap<String, (i64, i64)>,
}

impl VersionRangeTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranges of the operator sets shipped with ONNX 1.16
    pub fn builtin() -> Self {
        Self::new()
            .with_range(DEFAULT_DOMAIN, 1, 21)
            .with_range(ONNX_ML_DOMAIN, 1, 4)
            .with_range("ai.onnx.training", 1, 1)
            .with_range("ai.onnx.preview.training", 1, 1)
    }

    /// Add or replace a domain range
    pub fn with_range(mut self, domain: &str, min: i64, max: i64) -> Self {
        self.set_range(domain, min, max);
        self
    }

    /// Add or replace a domain range in place
    pub fn set_range(&mut self, domain: &str, min: i64, max: i64) {
        self.ranges
            .insert(canonical_domain(domain).to_string(), (min, max));
    }

    /// Range of `domain`, if known
    pub fn range(&self, domain: &str) -> Option<(i64, i64)> {
        self.ranges.get(canonical_domain(domain)).copied()
    }

    /// Whether `version` lies inside the range of `domain`
    pub fn contains(&self, domain: &str, version: i64) -> bool {
        self.range(domain)
            .map(|(min, max)| version >= min && version <= max)
            .unwrap_or(false)
    }
}

/// Get the default-domain opset version of a model
///
/// Models without a default-domain import are treated as opset 1.
pub fn get_opset_version(model: &ModelProto) -> i64 {
    model.get_opset_version().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domain_normalization() {
        assert_eq!(OpSetId::new("ai.onnx", 13), OpSetId::new("", 13));
        assert_eq!(OpSetId::new("ai.onnx", 13).domain(), "");
        assert_ne!(OpSetId::new("ai.onnx.ml", 3), OpSetId::onnx(3));
        assert!(!OpSetId::new("custom.ml", 1).is_default_domain());
    }

    #[test]
    fn test_display() {
        assert_eq!(OpSetId::onnx(17).to_string(), "ai.onnx/17");
        assert_eq!(OpSetId::new("custom.ml", 2).to_string(), "custom.ml/2");
    }

    #[test]
    fn test_builtin_ranges() {
        let table = VersionRangeTable::builtin();
        assert_eq!(table.range(""), Some((1, 21)));
        assert_eq!(table.range("ai.onnx"), Some((1, 21)));
        assert!(table.contains("", 13));
        assert!(!table.contains("", 0));
        assert!(!table.contains("", 22));
        assert!(table.range("custom.ml").is_none());
    }

    #[test]
    fn test_get_opset_version_missing_import() {
        let model = ModelProto::default();
        assert_eq!(get_opset_version(&model), 1);
    }
}
