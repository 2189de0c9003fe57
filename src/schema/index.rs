//! Schema index
//!
//! Groups schemas by operator name and domain, ordered by `since_version`.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::{OpSchema, SchemaSource};
use crate::opset::canonical_domain;

/// Versions of one operator within one domain: since_version → schema
pub type VersionMap = BTreeMap<i64, OpSchema>;

/// Read-only `name → domain → version → schema` index
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    schemas: FxHashMap<String, FxHashMap<String, VersionMap>>,
}

impl SchemaIndex {
    /// Build the index from any collection of schemas
    ///
    /// A later schema with the same `(name, domain, since_version)` replaces an earlier one.
    pub fn from_schemas<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = OpSchema>,
    {
        let mut map: FxHashMap<String, FxHashMap<String, VersionMap>> = FxHashMap::default();

        for schema in schemas {
            map.entry(schema.name().to_string())
                .or_default()
                .entry(schema.domain().to_string())
                .or_default()
                .insert(schema.since_version(), schema);
        }

        Self { schemas: map }
    }

    /// Build the index from a schema source
    pub fn from_source<S: SchemaSource + ?Sized>(source: &S) -> Self {
        Self::from_schemas(source.all_schemas_with_history())
    }

    /// All versions of `(name, domain)`
    pub fn versions(&self, name: &str, domain: &str) -> Option<&VersionMap> {
        self.schemas
            .get(name)
            .and_then(|domains| domains.get(canonical_domain(domain)))
    }

    /// Whether the operator has any schema in `domain`
    pub fn has_operator(&self, name: &str, domain: &str) -> bool {
        self.versions(name, domain).is_some()
    }

    /// Highest schema of `(name, domain)` with `since_version <= version`
    pub fn resolve(&self, name: &str, domain: &str, version: i64) -> Option<&OpSchema> {
        self.versions(name, domain)
            .and_then(|versions| versions.range(..=version).next_back())
            .map(|(_, schema)| schema)
    }

    /// Whether `(name, domain)` has a schema introduced exactly at `version`
    pub fn is_defined_at(&self, name: &str, domain: &str, version: i64) -> bool {
        self.versions(name, domain)
            .map(|versions| versions.contains_key(&version))
            .unwrap_or(false)
    }

    /// Operators with at least one schema in `domain`, with their versions
    pub fn operators<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = (&'a str, &'a VersionMap)> + 'a {
        let domain = canonical_domain(domain);
        self.schemas
            .iter()
            .filter_map(move |(name, domains)| domains.get(domain).map(|v| (name.as_str(), v)))
    }

    /// Number of distinct operator names
    pub fn operator_count(&self) -> usize {
        self.schemas.len()
    }

    /// Total number of schemas
    pub fn len(&self) -> usize {
        self.schemas
            .values()
            .flat_map(|domains| domains.values())
            .map(|versions| versions.len())
            .sum()
    }

    /// Check if the index holds no schema
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
