//! Operator schema history
//!
//! The converter does not know what an operator's inputs or attributes are;
//! it only needs to know *when* each operator was (re)defined. An [`OpSchema`]
//! carries exactly that: `(name, domain, since_version)`.
//!
//! - [`SchemaSource`]: the collaborator that supplies every historical schema
//! - [`SchemaIndex`]: `name → domain → version → schema` lookup built once
//! - [`BuiltinSchemas`]: definition history of common default-domain operators

pub mod builtin;
pub mod index;

pub use builtin::BuiltinSchemas;
pub use index::SchemaIndex;

use crate::opset::canonical_domain;

/// One version of an operator definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpSchema {
    name: String,
    domain: String,
    since_version: i64,
}

impl OpSchema {
    /// Create a schema, normalizing the default domain
    pub fn new(name: impl Into<String>, domain: &str, since_version: i64) -> Self {
        Self {
            name: name.into(),
            domain: canonical_domain(domain).to_string(),
            since_version,
        }
    }

    /// Operator type
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Opset version that introduced this definition
    pub fn since_version(&self) -> i64 {
        self.since_version
    }
}

/// Supplier of the full historical schema set
pub trait SchemaSource {
    /// Every version of every known operator, in any order
    fn all_schemas_with_history(&self) -> Vec<OpSchema>;
}

impl SchemaSource for Vec<OpSchema> {
    fn all_schemas_with_history(&self) -> Vec<OpSchema> {
        self.clone()
    }
}
