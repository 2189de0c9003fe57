//! Dry-run planning
//!
//! Walks the same steps a conversion would, without running any adapter,
//! and reports which adapters the graph's nodes need and which are missing.

use crate::adapter::{AdapterKey, AdapterRegistry};
use crate::graph::{Graph, Node, NodeId};
use crate::opset::OpSetId;
use crate::schema::SchemaIndex;

use super::resolver::resolve_current_schemas;

/// Whether `node` changes across the step `curr -> next`
///
/// True when the operator has a definition introduced exactly at either
/// end of the step.
pub fn requires_adapter(index: &SchemaIndex, node: &Node, curr: i64, next: i64) -> bool {
    index.is_defined_at(node.op_type(), node.domain(), curr)
        || index.is_defined_at(node.op_type(), node.domain(), next)
}

/// Adapters needed for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    /// Version before the step
    pub from: i64,
    /// Version after the step
    pub to: i64,
    /// Nodes that need an adapter, with the adapter key
    pub required: Vec<(NodeId, AdapterKey)>,
}

/// Step-by-step adapter requirements of a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    /// Requested initial version
    pub initial: OpSetId,
    /// Requested target version
    pub target: OpSetId,
    /// Steps in visit order
    pub steps: Vec<PlannedStep>,
    /// Required keys with no registered adapter, in first-needed order
    pub missing: Vec<AdapterKey>,
}

impl ConversionPlan {
    /// Plan the conversion of the current nodes of `graph`
    ///
    /// Nodes are assumed to keep their operator type across steps, so
    /// adapters that insert or retype nodes can make the real conversion
    /// need more than planned.
    pub fn build(
        graph: &Graph,
        schemas: &SchemaIndex,
        adapters: &AdapterRegistry,
        initial: &OpSetId,
        target: &OpSetId,
    ) -> Self {
        let current = resolve_current_schemas(graph, schemas, initial);
        let step = if target.version() > initial.version() { 1 } else { -1 };

        let mut plan = Self {
            initial: initial.clone(),
            target: target.clone(),
            steps: Vec::new(),
            missing: Vec::new(),
        };

        let mut curr = initial.version();
        while curr != target.version() {
            let next = curr + step;
            let mut planned = PlannedStep {
                from: curr,
                to: next,
                required: Vec::new(),
            };

            for node in graph.nodes() {
                if current.schema(node.id()).is_none() {
                    continue;
                }
                if !requires_adapter(schemas, node, curr, next) {
                    continue;
                }
                let key = AdapterKey::new(node.op_type(), node.domain(), curr, next);
                if !adapters.contains(&key) && !plan.missing.contains(&key) {
                    plan.missing.push(key.clone());
                }
                planned.required.push((node.id(), key));
            }

            plan.steps.push(planned);
            curr = next;
        }

        plan
    }

    /// Whether every required adapter is registered
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Whether initial and target version are equal
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total number of planned adapter applications
    pub fn required_count(&self) -> usize {
        self.steps.iter().map(|s| s.required.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::CompatibleAdapter;
    use crate::proto::extensions::make_node;
    use crate::schema::OpSchema;

    fn foo_index() -> SchemaIndex {
        SchemaIndex::from_schemas(vec![OpSchema::new("Foo", "", 1), OpSchema::new("Foo", "", 3)])
    }

    fn foo_graph() -> (Graph, NodeId) {
        let mut graph = Graph::new(&[OpSetId::onnx(1)]);
        let id = graph.push_node(make_node("Foo", &["X"], &["Y"], "foo_0"));
        graph.push_node(make_node("Bar", &["Y"], &["Z"], "bar_0"));
        (graph, id)
    }

    #[test]
    fn test_requires_adapter_at_either_end() {
        let index = foo_index();
        let (graph, id) = foo_graph();
        let node = graph.node(id).unwrap();

        assert!(requires_adapter(&index, node, 1, 2));
        assert!(requires_adapter(&index, node, 2, 3));
        assert!(requires_adapter(&index, node, 3, 4));
        assert!(!requires_adapter(&index, node, 4, 5));
        assert!(requires_adapter(&index, node, 2, 1));
    }

    #[test]
    fn test_plan_reports_missing() {
        let index = foo_index();
        let (graph, id) = foo_graph();
        let mut adapters = AdapterRegistry::new();
        adapters
            .register_adapter(
                CompatibleAdapter::new("Foo", OpSetId::onnx(1), OpSetId::onnx(2)),
                "",
            )
            .unwrap();

        let plan = ConversionPlan::build(
            &graph,
            &index,
            &adapters,
            &OpSetId::onnx(1),
            &OpSetId::onnx(5),
        );

        assert_eq!(plan.steps.len(), 4);
        assert_eq!(plan.steps[0].required, vec![(id, AdapterKey::new("Foo", "", 1, 2))]);
        assert!(plan.steps[3].required.is_empty());
        assert_eq!(plan.required_count(), 3);
        assert_eq!(
            plan.missing,
            vec![
                AdapterKey::new("Foo", "", 2, 3),
                AdapterKey::new("Foo", "", 3, 4)
            ]
        );
        assert!(!plan.is_complete());
    }

    #[test]
    fn test_noop_plan() {
        let index = foo_index();
        let (graph, _) = foo_graph();

        let plan = ConversionPlan::build(
            &graph,
            &index,
            &AdapterRegistry::new(),
            &OpSetId::onnx(3),
            &OpSetId::onnx(3),
        );
        assert!(plan.is_noop());
        assert!(plan.is_complete());
    }
}
