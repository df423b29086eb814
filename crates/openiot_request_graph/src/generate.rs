// SPDX-License-Identifier: MIT OR Apache-2.0
//! Specification generation.
//!
//! A validated graph is turned into one declarative statement per node, in
//! topological order. Given the same model state the output is identical,
//! down to the rendered bytes.

use crate::endpoint::EndpointId;
use crate::graph::GraphModel;
use crate::node::{NodeId, PropertyValue};
use crate::traversal::{self, Adjacency};
use crate::validation::{Diagnostic, ValidationReport, Validator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Generation aborted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// The graph has validation errors; all of them are listed in order
    #[error("Validation failed with {} error(s)", errors.len())]
    ValidationFailed {
        /// Every error of the failed validation pass
        errors: Vec<Diagnostic>,
    },
}

/// Reference from an output endpoint to the endpoint it feeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRef {
    /// Output endpoint on the statement's node
    pub from_endpoint: EndpointId,
    /// Destination node
    pub target_node: NodeId,
    /// Destination input endpoint
    pub target_endpoint: EndpointId,
    /// User data of the output endpoint (e.g. the measured property URI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

/// Declarative description of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Node ID
    pub node_id: NodeId,
    /// Node type tag
    pub node_type: String,
    /// Display name
    pub label: String,
    /// Properties, in node insertion order
    pub properties: IndexMap<String, PropertyValue>,
    /// Outbound edges, by endpoint then edge insertion order
    pub outputs: Vec<OutboundRef>,
}

/// Generated description of a validated graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Application name
    pub name: String,
    /// Application description
    #[serde(default)]
    pub description: String,
    /// One statement per node, upstream nodes first
    pub statements: Vec<Statement>,
    /// Warnings from the validation pass that preceded generation
    #[serde(default)]
    pub warnings: Vec<Diagnostic>,
}

impl Specification {
    /// Find the statement of a node
    pub fn statement(&self, node_id: &NodeId) -> Option<&Statement> {
        self.statements.iter().find(|s| s.node_id == *node_id)
    }

    /// Position of a node's statement
    pub fn position(&self, node_id: &NodeId) -> Option<usize> {
        self.statements.iter().position(|s| s.node_id == *node_id)
    }

    /// Render as declarative text
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render as pretty RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default().struct_names(true))
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "application {:?}", self.name)?;
        if !self.description.is_empty() {
            writeln!(f, "description {:?}", self.description)?;
        }

        for statement in &self.statements {
            let mut body = String::new();
            for (name, value) in &statement.properties {
                writeln!(body, "    set {name} = {value};")?;
            }
            for out in &statement.outputs {
                write!(
                    body,
                    "    {} -> {}.{}",
                    out.from_endpoint, out.target_node, out.target_endpoint
                )?;
                if let Some(data) = &out.user_data {
                    write!(body, " <{data}>")?;
                }
                body.push_str(";\n");
            }

            writeln!(f)?;
            writeln!(
                f,
                "node {} : {} {:?} {{",
                statement.node_id, statement.node_type, statement.label
            )?;
            f.write_str(&body)?;
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

/// Turns validated graphs into specifications
#[derive(Debug, Clone, Default)]
pub struct Generator {
    validator: Validator,
    name: String,
    description: String,
}

impl Generator {
    /// Create a generator using the given validator
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// Set the application name and description stamped on the output
    pub fn with_application(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.name = name.into();
        self.description = description.into();
        self
    }

    /// Validate the graph and generate its specification
    pub fn generate(&self, graph: &GraphModel) -> Result<Specification, GenerateError> {
        self.generate_with_report(graph).1
    }

    /// Validate and generate from a single walk of the graph, also returning
    /// the validation report
    pub fn generate_with_report(
        &self,
        graph: &GraphModel,
    ) -> (ValidationReport, Result<Specification, GenerateError>) {
        let adjacency = Adjacency::build(graph);
        let walk = traversal::depth_first_with(graph, &adjacency);
        let report = self.validator.validate_walk(graph, &walk);
        if report.has_errors() {
            tracing::warn!(
                errors = report.errors().len(),
                "Generation aborted by validation errors"
            );
            let errors = report.errors().to_vec();
            return (report, Err(GenerateError::ValidationFailed { errors }));
        }

        let statements: Vec<Statement> = walk
            .postorder
            .iter()
            .rev()
            .filter_map(|id| Some((graph.node_index(id)?, graph.node(id)?)))
            .map(|(index, node)| Statement {
                node_id: node.id().clone(),
                node_type: node.node_type().to_string(),
                label: node.label.clone(),
                properties: node.properties.clone(),
                outputs: adjacency
                    .outgoing(index)
                    .iter()
                    .map(|edge| OutboundRef {
                        from_endpoint: edge.source_endpoint.clone(),
                        target_node: edge.target_node.clone(),
                        target_endpoint: edge.target_endpoint.clone(),
                        user_data: node
                            .endpoint(&edge.source_endpoint)
                            .and_then(|e| e.user_data.clone()),
                    })
                    .collect(),
            })
            .collect();

        let warnings = report.warnings().to_vec();
        tracing::info!(
            statements = statements.len(),
            warnings = warnings.len(),
            "Generated specification"
        );
        let spec = Specification {
            name: self.name.clone(),
            description: self.description.clone(),
            statements,
            warnings,
        };
        (report, Ok(spec))
    }
}

/// Generate with the default validator
pub fn generate(graph: &GraphModel) -> Result<Specification, GenerateError> {
    Generator::default().generate(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use crate::node::{GraphNode, PRESENTATION, SOURCE};
    use crate::scope;
    use crate::validation::DiagnosticCode;

    fn pipeline() -> GraphModel {
        let mut graph = GraphModel::new();
        graph
            .add_node(
                GraphNode::new("b", PRESENTATION, "Chart")
                    .with_property("TITLE", "Temperature")
                    .with_endpoint(Endpoint::input("in", "Value", scope::NUMBER).required()),
            )
            .unwrap();
        graph
            .add_node(
                GraphNode::new("a", SOURCE, "Thermometer")
                    .with_property("LAT", 1.0)
                    .with_property("LON", 2.0)
                    .with_endpoint(
                        Endpoint::output("out", "Temp", "sensor_Double")
                            .with_user_data("ex:Temperature"),
                    ),
            )
            .unwrap();
        graph
            .connect(&"a".into(), &"out".into(), &"b".into(), &"in".into())
            .unwrap();
        graph
    }

    #[test]
    fn test_upstream_first() {
        let spec = generate(&pipeline()).unwrap();
        assert_eq!(spec.statements.len(), 2);
        assert!(spec.position(&"a".into()) < spec.position(&"b".into()));

        let a = spec.statement(&"a".into()).unwrap();
        assert_eq!(a.outputs.len(), 1);
        assert_eq!(a.outputs[0].target_node, NodeId::from("b"));
        assert_eq!(a.outputs[0].user_data.as_deref(), Some("ex:Temperature"));
    }

    #[test]
    fn test_render() {
        let spec = Generator::default()
            .with_application("Weather", "")
            .generate(&pipeline())
            .unwrap();
        let expected = "application \"Weather\"\n\
            \n\
            node a : SOURCE \"Thermometer\" {\n\
            \x20   set LAT = 1.0;\n\
            \x20   set LON = 2.0;\n\
            \x20   out -> b.in <ex:Temperature>;\n\
            }\n\
            \n\
            node b : PRESENTATION \"Chart\" {\n    set TITLE = \"Temperature\";\n}\n";
        assert_eq!(spec.render(), expected);
    }

    #[test]
    fn test_deterministic() {
        let graph = pipeline();
        let first = generate(&graph).unwrap();
        let second = generate(&graph).unwrap();
        assert_eq!(first.render(), second.render());
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_validation_failure_lists_all_errors() {
        let mut graph = GraphModel::new();
        for id in ["x", "y"] {
            graph
                .add_node(
                    GraphNode::new(id, PRESENTATION, id)
                        .with_endpoint(Endpoint::input("in", "In", scope::NUMBER).required()),
                )
                .unwrap();
        }
        let err = generate(&graph).unwrap_err();
        let GenerateError::ValidationFailed { errors } = err;
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code == DiagnosticCode::MissingRequiredConnection));
    }

    #[test]
    fn test_warnings_do_not_block() {
        let mut graph = pipeline();
        graph.add_node(GraphNode::new("idle", "FILTER", "Idle")).unwrap();
        let spec = generate(&graph).unwrap();
        assert_eq!(spec.statements.len(), 3);
        assert_eq!(spec.warnings.len(), 1);
    }

    #[test]
    fn test_report_comes_from_the_same_pass() {
        let mut graph = pipeline();
        graph.add_node(GraphNode::new("idle", "FILTER", "Idle")).unwrap();
        let (report, result) = Generator::default().generate_with_report(&graph);
        assert_eq!(report, Validator::default().validate(&graph));
        assert_eq!(result.unwrap().warnings, report.warnings());

        graph
            .add_node(GraphNode::new("g", PRESENTATION, "Gauge").with_endpoint(
                Endpoint::input("in", "In", scope::NUMBER).required(),
            ))
            .unwrap();
        let (report, result) = Generator::default().generate_with_report(&graph);
        let GenerateError::ValidationFailed { errors } = result.unwrap_err();
        assert_eq!(errors, report.errors());
    }
}
