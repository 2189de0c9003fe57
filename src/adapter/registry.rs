//! Adapter registry
//!
//! Adapters are keyed by a structured [`AdapterKey`]; lookup is exact; there
//! is no nearest-version fallback.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use super::builtin::{builtin_adapters, CompatibleAdapter};
use super::Adapter;
use crate::error::{ConvertError, ConvertResult};
use crate::graph::Node;
use crate::opset::{canonical_domain, OpSetId};
use crate::schema::SchemaIndex;

/// Identity of a single-step adapter
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdapterKey {
    /// Operator type
    pub op_type: String,
    /// Canonical operator domain
    pub domain: String,
    /// Version the step starts from
    pub from: i64,
    /// Version the step leads to
    pub to: i64,
}

impl AdapterKey {
    /// Create a key, normalizing the default domain
    pub fn new(op_type: impl Into<String>, domain: &str, from: i64, to: i64) -> Self {
        Self {
            op_type: op_type.into(),
            domain: canonical_domain(domain).to_string(),
            from,
            to,
        }
    }

    /// Key an adapter under `domain`
    pub fn for_adapter(adapter: &dyn Adapter, domain: &str) -> Self {
        Self::new(
            adapter.name(),
            domain,
            adapter.initial_version().version(),
            adapter.target_version().version(),
        )
    }

    /// Error reported when this key has no adapter
    pub fn missing(&self) -> ConvertError {
        ConvertError::MissingAdapter {
            op_type: self.op_type.clone(),
            domain: self.domain.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

impl fmt::Display for AdapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let domain = if self.domain.is_empty() {
            "ai.onnx"
        } else {
            &self.domain
        };
        write!(f, "{}::{} {}->{}", domain, self.op_type, self.from, self.to)
    }
}

/// Map of registered adapters
///
/// Registration happens during setup; after that the registry is only read
/// and may be shared across conversions of different graphs.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: FxHashMap<AdapterKey, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in default-domain adapters
    ///
    /// Steps that do not redefine an operator still need an adapter when they
    /// touch one of its definition versions; see
    /// [`register_passthrough`](Self::register_passthrough) for those.
    pub fn with_builtin_adapters() -> Self {
        let mut registry = Self::new();
        for adapter in builtin_adapters() {
            // Built-in adapters are single-step in the default domain by construction.
            if let Err(err) = registry.register(adapter, "") {
                warn!(error = %err, "skipping built-in adapter");
            }
        }
        registry
    }

    /// Register `adapter` for operators of `domain`
    ///
    /// Re-registering an existing key replaces the previous adapter (last
    /// write wins); the replaced adapter is returned.
    ///
    /// Fails with [`ConvertError::InvalidAdapter`] when the adapter has no
    /// name, spans more or less than one version, or declares versions in a
    /// domain other than `domain`.
    pub fn register(
        &mut self,
        adapter: Arc<dyn Adapter>,
        domain: &str,
    ) -> ConvertResult<Option<Arc<dyn Adapter>>> {
        let initial = adapter.initial_version();
        let target = adapter.target_version();

        if adapter.name().is_empty() {
            return Err(ConvertError::InvalidAdapter(
                "adapter has an empty operator name".to_string(),
            ));
        }
        if (target.version() - initial.version()).abs() != 1 {
            return Err(ConvertError::InvalidAdapter(format!(
                "adapter for {} spans {} -> {}, adapters must step exactly one version",
                adapter.name(),
                initial,
                target
            )));
        }
        let domain = canonical_domain(domain);
        if initial.domain() != domain || target.domain() != domain {
            return Err(ConvertError::InvalidAdapter(format!(
                "adapter for {} declares {} -> {} but is registered for domain '{}'",
                adapter.name(),
                initial,
                target,
                domain
            )));
        }

        let key = AdapterKey::for_adapter(adapter.as_ref(), domain);
        let replaced = self.adapters.insert(key.clone(), adapter);
        if replaced.is_some() {
            warn!(adapter = %key, "replacing previously registered adapter");
        }
        Ok(replaced)
    }

    /// Register an owned adapter
    pub fn register_adapter<A: Adapter + 'static>(
        &mut self,
        adapter: A,
        domain: &str,
    ) -> ConvertResult<Option<Arc<dyn Adapter>>> {
        self.register(Arc::new(adapter), domain)
    }

    /// Register no-op adapters for steps that touch a definition version of
    /// an operator without redefining it
    ///
    /// For every default-domain operator of `index` and every definition
    /// version `v`, the steps `v -> v+1` and `v+1 -> v` are covered by a
    /// [`CompatibleAdapter`] unless `v+1` is itself a definition version.
    /// Keys that already have an adapter are left alone. Returns the number
    /// of adapters added.
    pub fn register_passthrough(&mut self, index: &SchemaIndex) -> usize {
        let mut added = 0;

        for (name, versions) in index.operators("") {
            for &since in versions.keys() {
                if versions.contains_key(&(since + 1)) {
                    continue;
                }
                for (from, to) in [(since, since + 1), (since + 1, since)] {
                    let key = AdapterKey::new(name, "", from, to);
                    if self.adapters.contains_key(&key) {
                        continue;
                    }
                    let adapter =
                        CompatibleAdapter::new(name, OpSetId::onnx(from), OpSetId::onnx(to));
                    self.adapters.insert(key, Arc::new(adapter));
                    added += 1;
                }
            }
        }

        added
    }

    /// Adapter for `node` stepping exactly `from -> to`
    pub fn lookup(&self, node: &Node, from: &OpSetId, to: &OpSetId) -> Option<&Arc<dyn Adapter>> {
        if from.domain() != to.domain() {
            return None;
        }
        let key = AdapterKey::new(node.op_type(), node.domain(), from.version(), to.version());
        self.adapters.get(&key)
    }

    /// Adapter registered under `key`
    pub fn get(&self, key: &AdapterKey) -> Option<&Arc<dyn Adapter>> {
        self.adapters.get(key)
    }

    /// Check if `key` has an adapter
    pub fn contains(&self, key: &AdapterKey) -> bool {
        self.adapters.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&AdapterKey> {
        let mut keys: Vec<_> = self.adapters.keys().collect();
        keys.sort();
        keys
    }

    /// Number of registered adapters
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Check if no adapter is registered
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::proto::extensions::make_node;
    use crate::schema::OpSchema;

    fn foo_node(graph: &mut Graph, domain: &str) -> crate::graph::NodeId {
        let mut proto = make_node("Foo", &["X"], &["Y"], "foo_0");
        proto.domain = domain.to_string();
        graph.push_node(proto)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = AdapterRegistry::new();
        let replaced = registry
            .register_adapter(
                CompatibleAdapter::new("Foo", OpSetId::onnx(1), OpSetId::onnx(2)),
                "ai.onnx",
            )
            .unwrap();
        assert!(replaced.is_none());

        let mut graph = Graph::new(&[OpSetId::onnx(1)]);
        let id = foo_node(&mut graph, "");
        let node = graph.node(id).unwrap();

        assert!(registry
            .lookup(node, &OpSetId::onnx(1), &OpSetId::onnx(2))
            .is_some());
        assert!(registry
            .lookup(node, &OpSetId::new("ai.onnx", 1), &OpSetId::new("ai.onnx", 2))
            .is_some());
        // Exact match only
        assert!(registry
            .lookup(node, &OpSetId::onnx(2), &OpSetId::onnx(3))
            .is_none());
        assert!(registry
            .lookup(node, &OpSetId::onnx(2), &OpSetId::onnx(1))
            .is_none());
    }

    #[test]
    fn test_lookup_respects_node_domain() {
        let mut registry = AdapterRegistry::new();
        registry
            .register_adapter(
                CompatibleAdapter::new("Foo", OpSetId::onnx(1), OpSetId::onnx(2)),
                "",
            )
            .unwrap();

        let mut graph = Graph::new(&[OpSetId::onnx(1)]);
        let id = foo_node(&mut graph, "custom.ml");
        let node = graph.node(id).unwrap();

        assert!(registry
            .lookup(node, &OpSetId::onnx(1), &OpSetId::onnx(2))
            .is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = AdapterRegistry::new();
        let key = AdapterKey::new("Foo", "", 1, 2);

        registry
            .register_adapter(
                CompatibleAdapter::new("Foo", OpSetId::onnx(1), OpSetId::onnx(2)),
                "",
            )
            .unwrap();
        let replaced = registry
            .register_adapter(
                CompatibleAdapter::new("Foo", OpSetId::onnx(1), OpSetId::onnx(2)),
                "",
            )
            .unwrap();

        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&key));
    }

    #[test]
    fn test_reject_multi_step_adapter() {
        let mut registry = AdapterRegistry::new();
        let result = registry.register_adapter(
            CompatibleAdapter::new("Foo", OpSetId::onnx(1), OpSetId::onnx(3)),
            "",
        );
        assert!(matches!(result, Err(ConvertError::InvalidAdapter(_))));

        let result = registry.register_adapter(
            CompatibleAdapter::new("Foo", OpSetId::onnx(4), OpSetId::onnx(4)),
            "",
        );
        assert!(matches!(result, Err(ConvertError::InvalidAdapter(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reject_domain_mismatch() {
        let mut registry = AdapterRegistry::new();
        let err = registry
            .register_adapter(
                CompatibleAdapter::new("Foo", OpSetId::onnx(1), OpSetId::onnx(2)),
                "custom.ml",
            )
            .err()
            .unwrap();
        assert!(matches!(err, ConvertError::InvalidAdapter(_)));
        assert!(err.to_string().contains("custom.ml"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_passthrough() {
        let index = SchemaIndex::from_schemas(vec![
            OpSchema::new("Foo", "", 1),
            OpSchema::new("Foo", "", 3),
            OpSchema::new("Foo", "", 4),
            OpSchema::new("Bar", "custom.ml", 1),
        ]);
        let mut registry = AdapterRegistry::new();
        registry
            .register_adapter(
                CompatibleAdapter::new("Foo", OpSetId::onnx(2), OpSetId::onnx(1)),
                "",
            )
            .unwrap();

        // 1->2 added, 2->1 already present; 3->4 is a redefinition; 4<->5 added
        let added = registry.register_passthrough(&index);
        assert_eq!(added, 3);
        assert!(registry.contains(&AdapterKey::new("Foo", "", 1, 2)));
        assert!(!registry.contains(&AdapterKey::new("Foo", "", 3, 4)));
        assert!(registry.contains(&AdapterKey::new("Foo", "", 5, 4)));
        assert!(!registry.contains(&AdapterKey::new("Bar", "custom.ml", 1, 2)));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = AdapterRegistry::with_builtin_adapters();
        assert!(registry.contains(&AdapterKey::new("Squeeze", "", 12, 13)));
        assert!(registry.contains(&AdapterKey::new("Squeeze", "", 13, 12)));
        assert!(registry.contains(&AdapterKey::new("Reshape", "ai.onnx", 13, 14)));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(
            AdapterKey::new("Squeeze", "ai.onnx", 12, 13).to_string(),
            "ai.onnx::Squeeze 12->13"
        );
    }
}
