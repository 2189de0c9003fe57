//! Conversion engine

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::plan::{requires_adapter, ConversionPlan};
use super::report::{ConversionReport, StepReport};
use super::resolver::{resolve_current_schemas, resolve_node};
use super::ConvertConfig;
use crate::adapter::{Adapter, AdapterKey, AdapterRegistry};
use crate::error::{ConvertError, ConvertResult};
use crate::graph::Graph;
use crate::io::check_model;
use crate::opset::{get_opset_version, OpSetId, VersionRangeTable};
use crate::proto::ModelProto;
use crate::schema::{BuiltinSchemas, SchemaIndex};
use crate::traits::Transformer;

/// Stepwise opset converter
///
/// Holds the read-only schema index, adapter registry and version ranges.
/// Register adapters before converting; after that a converter can be
/// shared between threads converting different models.
#[derive(Debug, Clone)]
pub struct VersionConverter {
    schemas: SchemaIndex,
    adapters: AdapterRegistry,
    ranges: VersionRangeTable,
    config: ConvertConfig,
}

impl VersionConverter {
    /// Create a converter over the given schemas and adapters
    pub fn new(schemas: SchemaIndex, adapters: AdapterRegistry) -> Self {
        Self {
            schemas,
            adapters,
            ranges: VersionRangeTable::builtin(),
            config: ConvertConfig::default(),
        }
    }

    /// Converter over the built-in schema history and adapters
    ///
    /// Steps that touch a definition version without redefining the
    /// operator get a no-op adapter.
    pub fn with_builtin() -> Self {
        let schemas = SchemaIndex::from_source(&BuiltinSchemas);
        let mut adapters = AdapterRegistry::with_builtin_adapters();
        adapters.register_passthrough(&schemas);
        Self::new(schemas, adapters)
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the domain version ranges
    pub fn with_version_ranges(mut self, ranges: VersionRangeTable) -> Self {
        self.ranges = ranges;
        self
    }

    /// Register an adapter for operators of `domain`
    pub fn register_adapter<A: Adapter + 'static>(
        &mut self,
        adapter: A,
        domain: &str,
    ) -> ConvertResult<Option<Arc<dyn Adapter>>> {
        self.adapters.register_adapter(adapter, domain)
    }

    /// Schema index
    pub fn schemas(&self) -> &SchemaIndex {
        &self.schemas
    }

    /// Adapter registry
    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// Current configuration
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Convert `model` from `initial` to `target`
    pub fn convert(
        &self,
        model: &ModelProto,
        initial: &OpSetId,
        target: &OpSetId,
    ) -> ConvertResult<ModelProto> {
        self.convert_with_report(model, initial, target)
            .map(|(converted, _)| converted)
    }

    /// Convert `model` to `target_version` from its declared default-domain version
    pub fn convert_to(&self, model: &ModelProto, target_version: i64) -> ConvertResult<ModelProto> {
        let initial = OpSetId::onnx(get_opset_version(model));
        self.convert(model, &initial, &OpSetId::onnx(target_version))
    }

    /// Convert, falling back to a copy of the input on any error
    ///
    /// The error is logged and dropped.
    pub fn convert_or_original(
        &self,
        model: &ModelProto,
        initial: &OpSetId,
        target: &OpSetId,
    ) -> ModelProto {
        match self.convert(model, initial, target) {
            Ok(converted) => converted,
            Err(err) => {
                warn!(error = %err, %initial, %target, "opset conversion failed, returning input model");
                model.clone()
            }
        }
    }

    /// Convert `model` and report every visited step
    pub fn convert_with_report(
        &self,
        model: &ModelProto,
        initial: &OpSetId,
        target: &OpSetId,
    ) -> ConvertResult<(ModelProto, ConversionReport)> {
        let mut graph = Graph::import(model)?;
        self.check_request(initial, target)?;

        if let Some(declared) = graph.opset_version(initial.domain()) {
            if declared != initial.version() {
                warn!(
                    declared,
                    requested = initial.version(),
                    "declared opset version differs from requested initial version"
                );
                if self.config.sync_declared_version {
                    graph.set_opset_version(initial.domain(), initial.version());
                }
            }
        }

        if self.config.preflight {
            let plan = ConversionPlan::build(&graph, &self.schemas, &self.adapters, initial, target);
            if let Some(key) = plan.missing.first() {
                return Err(key.missing());
            }
        }

        let report = self.run(&mut graph, initial, target)?;
        graph.set_opset_version(target.domain(), target.version());

        let converted = graph.export(model);
        if self.config.validate_output {
            check_model(&converted)?;
        }

        info!(
            %initial,
            %target,
            steps = report.steps.len(),
            adapted = report.adapted_nodes,
            "opset conversion finished"
        );
        Ok((converted, report))
    }

    /// Plan a conversion of `graph` without running adapters
    pub fn plan(
        &self,
        graph: &Graph,
        initial: &OpSetId,
        target: &OpSetId,
    ) -> ConvertResult<ConversionPlan> {
        self.check_request(initial, target)?;
        Ok(ConversionPlan::build(
            graph,
            &self.schemas,
            &self.adapters,
            initial,
            target,
        ))
    }

    /// Reject foreign domains and versions outside the supported range
    fn check_request(&self, initial: &OpSetId, target: &OpSetId) -> ConvertResult<()> {
        if !initial.is_default_domain() || !target.is_default_domain() {
            return Err(ConvertError::UnsupportedDomain {
                initial: initial.domain().to_string(),
                target: target.domain().to_string(),
            });
        }

        let Some((min, max)) = self.ranges.range(target.domain()) else {
            return Err(ConvertError::UnsupportedDomain {
                initial: initial.domain().to_string(),
                target: target.domain().to_string(),
            });
        };
        if initial.version() < min || initial.version() > max {
            return Err(ConvertError::InitialVersionOutOfRange {
                domain: initial.domain().to_string(),
                version: initial.version(),
                min,
                max,
            });
        }
        if target.version() < min || target.version() > max {
            return Err(ConvertError::TargetVersionOutOfRange {
                domain: target.domain().to_string(),
                version: target.version(),
                min,
                max,
            });
        }
        Ok(())
    }

    /// Step `graph` from `initial` to `target`
    fn run(
        &self,
        graph: &mut Graph,
        initial: &OpSetId,
        target: &OpSetId,
    ) -> ConvertResult<ConversionReport> {
        let mut current = resolve_current_schemas(graph, &self.schemas, initial);
        let step = if target.version() > initial.version() { 1 } else { -1 };
        let mut report = ConversionReport::new(initial.clone(), target.clone());

        let mut curr = initial.version();
        while curr != target.version() {
            let next = curr + step;
            let from = initial.with_version(curr);
            let to = initial.with_version(next);

            let inserted = current.refresh(graph, &self.schemas, &from);
            debug!(from = curr, to = next, inserted, "conversion round");

            let mut step_report = StepReport::new(curr, next);
            for id in graph.node_ids() {
                // Removed by an earlier adapter in this round
                let Some(node) = graph.node(id) else {
                    continue;
                };
                if current.schema(id).is_none() {
                    continue;
                }
                if !requires_adapter(&self.schemas, node, curr, next) {
                    continue;
                }

                let adapter = self.adapters.lookup(node, &from, &to).ok_or_else(|| {
                    AdapterKey::new(node.op_type(), node.domain(), curr, next).missing()
                })?;
                let op_type = node.op_type().to_string();
                let name = node.display_name();

                trace!(node = %name, %op_type, from = curr, to = next, "applying adapter");
                adapter.adapt(graph, id)?;

                match graph.node(id) {
                    Some(node) => current.set(id, resolve_node(&self.schemas, node, &to)),
                    None => {
                        current.remove(id);
                    }
                }
                step_report.record(name, op_type);
            }

            graph.set_opset_version(initial.domain(), next);
            report.push_step(step_report);
            curr = next;
        }

        Ok(report)
    }
}

impl Default for VersionConverter {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// A converter bound to one `(initial, target)` pair
#[derive(Debug, Clone)]
pub struct OpsetConversion<'a> {
    converter: &'a VersionConverter,
    initial: OpSetId,
    target: OpSetId,
}

impl<'a> OpsetConversion<'a> {
    /// Bind `converter` to `initial -> target`
    pub fn new(converter: &'a VersionConverter, initial: OpSetId, target: OpSetId) -> Self {
        Self {
            converter,
            initial,
            target,
        }
    }
}

impl Transformer for OpsetConversion<'_> {
    fn transform(&self, model: ModelProto) -> ConvertResult<ModelProto> {
        self.converter.convert(&model, &self.initial, &self.target)
    }
}
