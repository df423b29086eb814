// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-graph validation.
//!
//! The validator never mutates the model and keeps no cache: run it again
//! after every structural change.

use crate::endpoint::EndpointId;
use crate::graph::GraphModel;
use crate::node::{NodeId, SOURCE};
use crate::traversal::{self, Traversal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Blocks generation
    Error,
    /// Reported only
    Warning,
}

/// What a diagnostic is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A directed cycle, listed from the re-entered node back to itself
    CycleDetected {
        /// Node ids along the cycle
        path: Vec<NodeId>,
    },
    /// A required endpoint has no connection
    MissingRequiredConnection,
    /// A node has no connection at all
    OrphanNode,
}

impl DiagnosticCode {
    /// Stable code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => "CYCLE_DETECTED",
            Self::MissingRequiredConnection => "MISSING_REQUIRED_CONNECTION",
            Self::OrphanNode => "ORPHAN_NODE",
        }
    }
}

/// A validation error or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Node concerned, if any
    pub node_id: Option<NodeId>,
    /// Endpoint concerned, if any
    pub endpoint_id: Option<EndpointId>,
    /// Human readable message
    pub message: String,
    /// Machine readable code
    pub code: DiagnosticCode,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{level}:{}] {}", self.code.as_str(), self.message)
    }
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Errors, in report order
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Warnings, in report order
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Errors first, then warnings
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Whether any error was found
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether nothing at all was reported
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Split into owned errors and warnings
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings)
    }
}

/// Graph validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Node types allowed to stand alone without an orphan warning
    pub root_types: Vec<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            root_types: vec![SOURCE.to_string()],
        }
    }
}

impl Validator {
    /// Create a validator with custom root types
    pub fn with_root_types(root_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            root_types: root_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Run every check over the graph
    pub fn validate(&self, graph: &GraphModel) -> ValidationReport {
        self.validate_walk(graph, &traversal::depth_first(graph))
    }

    /// Run every check, reusing a depth-first walk of the same graph
    pub fn validate_walk(&self, graph: &GraphModel, walk: &Traversal) -> ValidationReport {
        let mut report = ValidationReport::default();

        check_cycles(walk, &mut report.errors);
        check_required_endpoints(graph, &mut report.errors);
        self.check_orphans(graph, &mut report.warnings);

        tracing::debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validated graph"
        );
        report
    }

    fn check_orphans(&self, graph: &GraphModel, warnings: &mut Vec<Diagnostic>) {
        for node in graph.nodes() {
            if node.is_connected() || self.root_types.iter().any(|t| t == node.node_type()) {
                continue;
            }
            warnings.push(Diagnostic {
                severity: Severity::Warning,
                node_id: Some(node.id().clone()),
                endpoint_id: None,
                message: format!("Node '{}' ({}) is not connected", node.id(), node.label),
                code: DiagnosticCode::OrphanNode,
            });
        }
    }
}

fn check_cycles(walk: &Traversal, errors: &mut Vec<Diagnostic>) {
    for path in walk.cycles.iter().cloned() {
        let rendered = path.iter().map(NodeId::as_str).collect::<Vec<_>>().join(" -> ");
        errors.push(Diagnostic {
            severity: Severity::Error,
            node_id: path.first().cloned(),
            endpoint_id: None,
            message: format!("Graph contains a cycle: {rendered}"),
            code: DiagnosticCode::CycleDetected { path },
        });
    }
}

fn check_required_endpoints(graph: &GraphModel, errors: &mut Vec<Diagnostic>) {
    for node in graph.nodes() {
        for endpoint in node.endpoints() {
            if !endpoint.required || endpoint.is_connected() {
                continue;
            }
            errors.push(Diagnostic {
                severity: Severity::Error,
                node_id: Some(node.id().clone()),
                endpoint_id: Some(endpoint.id.clone()),
                message: format!(
                    "Required endpoint '{}' on node '{}' is not connected",
                    endpoint.label,
                    node.id()
                ),
                code: DiagnosticCode::MissingRequiredConnection,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Capacity, Endpoint};
    use crate::node::{GraphNode, FILTER, PRESENTATION};
    use crate::scope;

    fn relay(id: &str) -> GraphNode {
        GraphNode::new(id, FILTER, id)
            .with_endpoint(
                Endpoint::input("in", "In", scope::NUMBER)
                    .with_max_connections(Capacity::Unbounded),
            )
            .with_endpoint(Endpoint::output("out", "Out", scope::NUMBER))
    }

    fn wire(graph: &mut GraphModel, from: &str, to: &str) {
        graph
            .connect(&from.into(), &"out".into(), &to.into(), &"in".into())
            .unwrap();
    }

    #[test]
    fn test_no_edges_no_required_is_error_free() {
        let mut graph = GraphModel::new();
        graph.add_node(relay("a")).unwrap();
        graph.add_node(GraphNode::new("s", SOURCE, "s")).unwrap();

        let report = Validator::default().validate(&graph);
        assert!(!report.has_errors());
        // Only the non-root node is flagged
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(report.warnings()[0].code, DiagnosticCode::OrphanNode);
        assert_eq!(report.warnings()[0].node_id, Some("a".into()));
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = GraphModel::new();
        for id in ["a", "b", "c"] {
            graph.add_node(relay(id)).unwrap();
        }
        wire(&mut graph, "a", "b");
        wire(&mut graph, "b", "c");
        wire(&mut graph, "c", "a");

        let report = Validator::default().validate(&graph);
        let cycles: Vec<_> = report
            .errors()
            .iter()
            .filter_map(|d| match &d.code {
                DiagnosticCode::CycleDetected { path } => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(cycles, vec![vec!["a".into(), "b".into(), "c".into(), NodeId::from("a")]]);
    }

    #[test]
    fn test_missing_required_connection() {
        let mut graph = GraphModel::new();
        graph
            .add_node(
                GraphNode::new("chart", PRESENTATION, "Chart")
                    .with_endpoint(Endpoint::input("x", "X", scope::NUMBER).required())
                    .with_endpoint(Endpoint::input("y", "Y", scope::NUMBER)),
            )
            .unwrap();

        let report = Validator::default().validate(&graph);
        assert_eq!(report.errors().len(), 1);
        let error = &report.errors()[0];
        assert_eq!(error.code, DiagnosticCode::MissingRequiredConnection);
        assert_eq!(error.endpoint_id, Some("x".into()));
        assert_eq!(error.severity, Severity::Error);
    }

    #[test]
    fn test_errors_before_warnings() {
        let mut graph = GraphModel::new();
        graph.add_node(relay("lonely")).unwrap();
        graph
            .add_node(
                GraphNode::new("chart", PRESENTATION, "Chart")
                    .with_endpoint(Endpoint::input("x", "X", scope::NUMBER).required()),
            )
            .unwrap();

        let report = Validator::default().validate(&graph);
        let severities: Vec<_> = report.iter().map(|d| d.severity).collect();
        assert_eq!(
            severities,
            [Severity::Error, Severity::Warning, Severity::Warning]
        );
    }

    #[test]
    fn test_custom_root_types() {
        let mut graph = GraphModel::new();
        graph.add_node(relay("a")).unwrap();
        let report = Validator::with_root_types([FILTER]).validate(&graph);
        assert!(report.is_clean());
    }
}
