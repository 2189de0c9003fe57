//! Current-version resolution
//!
//! Tags every node with the schema that governs it at a given opset version.
//! The resulting map belongs to one conversion run and is threaded through
//! it explicitly.

use rustc_hash::FxHashMap;

use crate::graph::{Graph, Node, NodeId};
use crate::opset::OpSetId;
use crate::schema::{OpSchema, SchemaIndex};

/// Schema governing a node under `opset`, if the node belongs to its domain
pub fn resolve_node<'a>(index: &'a SchemaIndex, node: &Node, opset: &OpSetId) -> Option<&'a OpSchema> {
    if node.domain() != opset.domain() {
        return None;
    }
    index.resolve(node.op_type(), node.domain(), opset.version())
}

/// Per-run `NodeId → schema` table
///
/// `None` marks a node that has no schema in the converted domain; such a
/// node is never adapted. Nodes absent from the map were inserted after the
/// last refresh.
#[derive(Debug, Clone, Default)]
pub struct CurrentOpSchemaMap<'a> {
    schemas: FxHashMap<NodeId, Option<&'a OpSchema>>,
}

impl<'a> CurrentOpSchemaMap<'a> {
    /// Schema governing `id`, `None` if unresolved or unknown
    pub fn schema(&self, id: NodeId) -> Option<&'a OpSchema> {
        self.schemas.get(&id).copied().flatten()
    }

    /// Whether `id` was seen by the resolver (resolved or not)
    pub fn contains(&self, id: NodeId) -> bool {
        self.schemas.contains_key(&id)
    }

    /// Record the schema governing `id`
    pub fn set(&mut self, id: NodeId, schema: Option<&'a OpSchema>) {
        self.schemas.insert(id, schema);
    }

    /// Forget `id`
    pub fn remove(&mut self, id: NodeId) -> Option<Option<&'a OpSchema>> {
        self.schemas.remove(&id)
    }

    /// Drop entries of removed nodes and resolve nodes inserted since the
    /// last refresh under `opset`
    ///
    /// Returns the number of newly resolved nodes.
    pub fn refresh(&mut self, graph: &Graph, index: &'a SchemaIndex, opset: &OpSetId) -> usize {
        self.schemas.retain(|id, _| graph.contains(*id));

        let mut added = 0;
        for node in graph.nodes() {
            if !self.schemas.contains_key(&node.id()) {
                self.schemas
                    .insert(node.id(), resolve_node(index, node, opset));
                added += 1;
            }
        }
        added
    }

    /// Number of tracked nodes
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if no node is tracked
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Number of nodes with a governing schema
    pub fn resolved_count(&self) -> usize {
        self.schemas.values().filter(|s| s.is_some()).count()
    }
}

/// Resolve the governing schema of every node of `graph` under `initial`
pub fn resolve_current_schemas<'a>(
    graph: &Graph,
    index: &'a SchemaIndex,
    initial: &OpSetId,
) -> CurrentOpSchemaMap<'a> {
    let mut map = CurrentOpSchemaMap {
        schemas: FxHashMap::with_capacity_and_hasher(graph.node_count(), Default::default()),
    };
    map.refresh(graph, index, initial);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;

    fn make_index() -> SchemaIndex {
        SchemaIndex::from_schemas(vec![
            OpSchema::new("Squeeze", "", 1),
            OpSchema::new("Squeeze", "", 11),
            OpSchema::new("Squeeze", "", 13),
            OpSchema::new("Relu", "", 6),
        ])
    }

    #[test]
    fn test_resolve_highest_not_above_initial() {
        let index = make_index();
        let mut graph = Graph::new(&[OpSetId::onnx(12)]);
        let squeeze = graph.push_node(make_node("Squeeze", &["X"], &["A"], "s"));
        let relu = graph.push_node(make_node("Relu", &["A"], &["Y"], "r"));

        let map = resolve_current_schemas(&graph, &index, &OpSetId::onnx(12));

        assert_eq!(map.schema(squeeze).unwrap().since_version(), 11);
        assert_eq!(map.schema(relu).unwrap().since_version(), 6);
        assert_eq!(map.resolved_count(), 2);
    }

    #[test]
    fn test_unknown_and_foreign_nodes_unresolved() {
        let index = make_index();
        let mut graph = Graph::new(&[OpSetId::onnx(12)]);
        let unknown = graph.push_node(make_node("Conv", &["X"], &["A"], "c"));
        let mut foreign = make_node("Squeeze", &["A"], &["Y"], "s");
        foreign.domain = "custom.ml".to_string();
        let foreign = graph.push_node(foreign);
        let early = graph.push_node(make_node("Relu", &["A"], &["Z"], "r"));

        let map = resolve_current_schemas(&graph, &index, &OpSetId::onnx(5));

        assert!(map.contains(unknown));
        assert!(map.schema(unknown).is_none());
        assert!(map.schema(foreign).is_none());
        // Relu first defined at 6
        assert!(map.schema(early).is_none());
        assert_eq!(map.resolved_count(), 0);
    }

    #[test]
    fn test_refresh_tracks_graph_changes() {
        let index = make_index();
        let mut graph = Graph::new(&[OpSetId::onnx(12)]);
        let squeeze = graph.push_node(make_node("Squeeze", &["X"], &["A"], "s"));
        let mut map = resolve_current_schemas(&graph, &index, &OpSetId::onnx(12));

        let (replacement, _) = graph
            .replace_node(squeeze, make_node("Squeeze", &["X"], &["A"], "s"))
            .unwrap();
        assert!(!map.contains(replacement));

        let added = map.refresh(&graph, &index, &OpSetId::onnx(13));
        assert_eq!(added, 1);
        assert!(!map.contains(squeeze));
        assert_eq!(map.schema(replacement).unwrap().since_version(), 13);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_maps_are_independent_per_run() {
        let index = make_index();
        let mut graph = Graph::new(&[OpSetId::onnx(12)]);
        let squeeze = graph.push_node(make_node("Squeeze", &["X"], &["A"], "s"));

        let mut first = resolve_current_schemas(&graph, &index, &OpSetId::onnx(12));
        let second = resolve_current_schemas(&graph, &index, &OpSetId::onnx(13));
        first.set(squeeze, None);

        assert!(first.schema(squeeze).is_none());
        assert_eq!(second.schema(squeeze).unwrap().since_version(), 13);
    }
}
