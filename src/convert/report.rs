//! Conversion statistics

use std::fmt;

use crate::opset::OpSetId;

/// A node an adapter was applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptedNode {
    /// Node name, or its id when unnamed
    pub node: String,
    /// Operator type at the time of adaptation
    pub op_type: String,
}

/// One version step of a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Version before the step
    pub from: i64,
    /// Version after the step
    pub to: i64,
    /// Nodes adapted during the step, in visit order
    pub adapted: Vec<AdaptedNode>,
}

impl StepReport {
    /// Create an empty step
    pub fn new(from: i64, to: i64) -> Self {
        Self {
            from,
            to,
            adapted: Vec::new(),
        }
    }

    /// Record an adapted node
    pub fn record(&mut self, node: impl Into<String>, op_type: impl Into<String>) {
        self.adapted.push(AdaptedNode {
            node: node.into(),
            op_type: op_type.into(),
        });
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Requested initial version
    pub initial: OpSetId,
    /// Requested target version
    pub target: OpSetId,
    /// Visited steps, in order
    pub steps: Vec<StepReport>,
    /// Total number of adapter applications
    pub adapted_nodes: usize,
}

impl ConversionReport {
    /// Create an empty report
    pub fn new(initial: OpSetId, target: OpSetId) -> Self {
        Self {
            initial,
            target,
            steps: Vec::new(),
            adapted_nodes: 0,
        }
    }

    /// Append a finished step
    pub fn push_step(&mut self, step: StepReport) {
        self.adapted_nodes += step.adapted.len();
        self.steps.push(step);
    }

    /// Whether initial and target version were equal
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every version the graph was interpreted under, in order
    pub fn visited_versions(&self) -> Vec<i64> {
        let mut versions = vec![self.initial.version()];
        versions.extend(self.steps.iter().map(|s| s.to));
        versions
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {} steps, {} nodes adapted",
            self.initial,
            self.target,
            self.steps.len(),
            self.adapted_nodes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accumulates() {
        let mut report = ConversionReport::new(OpSetId::onnx(12), OpSetId::onnx(14));
        assert!(report.is_noop());

        let mut step = StepReport::new(12, 13);
        step.record("squeeze_0", "Squeeze");
        step.record("#4", "Relu");
        report.push_step(step);
        report.push_step(StepReport::new(13, 14));

        assert!(!report.is_noop());
        assert_eq!(report.adapted_nodes, 2);
        assert_eq!(report.visited_versions(), vec![12, 13, 14]);
        assert_eq!(
            report.to_string(),
            "ai.onnx/12 -> ai.onnx/14: 2 steps, 2 nodes adapted"
        );
    }
}
