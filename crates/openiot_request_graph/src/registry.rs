// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node templates available in the designer palette.
//!
//! Templates are registered explicitly at startup; each carries a plain
//! constructor function that builds a fresh node for a given id.

use crate::node::{GraphNode, NodeId, SOURCE};
use indexmap::IndexMap;

/// Builds a node instance for the given id
pub type NodeConstructor = fn(NodeId) -> GraphNode;

/// A node type the operator can drop into the workspace
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    /// Unique template identifier
    pub id: String,
    /// Node type tag of the produced nodes
    pub node_type: String,
    /// Display name
    pub label: String,
    /// Description
    pub description: String,
    /// Constructor
    pub build: NodeConstructor,
}

impl NodeTemplate {
    /// Instantiate with a given id
    pub fn instantiate(&self, id: NodeId) -> GraphNode {
        (self.build)(id)
    }
}

/// Registry of available node templates
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    /// Registered templates by ID
    templates: IndexMap<String, NodeTemplate>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any template with the same ID
    pub fn register(&mut self, template: NodeTemplate) {
        tracing::debug!(
            template = %template.id,
            node_type = %template.node_type,
            "Registered node template"
        );
        self.templates.insert(template.id.clone(), template);
    }

    /// Get a template by ID
    pub fn get(&self, id: &str) -> Option<&NodeTemplate> {
        self.templates.get(id)
    }

    /// All templates, in registration order
    pub fn templates(&self) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.values()
    }

    /// Templates producing a given node type
    pub fn templates_of_type<'a>(
        &'a self,
        node_type: &'a str,
    ) -> impl Iterator<Item = &'a NodeTemplate> {
        self.templates.values().filter(move |t| t.node_type == node_type)
    }

    /// Templates grouped by node type: `SOURCE` first, then by type name
    pub fn grouped_by_type(&self) -> IndexMap<String, Vec<&NodeTemplate>> {
        let mut groups: IndexMap<String, Vec<&NodeTemplate>> = IndexMap::new();
        for template in self.templates.values() {
            groups.entry(template.node_type.clone()).or_default().push(template);
        }
        groups.sort_by(|a, _, b, _| (a != SOURCE, a).cmp(&(b != SOURCE, b)));
        groups
    }

    /// Create a node from a template ID with a fresh random id
    pub fn create_node(&self, template_id: &str) -> Option<GraphNode> {
        self.create_node_with_id(template_id, NodeId::generate())
    }

    /// Create a node from a template ID with a caller-chosen id
    pub fn create_node_with_id(&self, template_id: &str, id: NodeId) -> Option<GraphNode> {
        self.get(template_id).map(|t| t.instantiate(id))
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no template is registered
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FILTER, PRESENTATION};

    fn filter(id: NodeId) -> GraphNode {
        GraphNode::new(id, FILTER, "Filter")
    }

    fn chart(id: NodeId) -> GraphNode {
        GraphNode::new(id, PRESENTATION, "Chart")
    }

    fn source(id: NodeId) -> GraphNode {
        GraphNode::new(id, SOURCE, "Source")
    }

    fn template(id: &str, node_type: &str, build: NodeConstructor) -> NodeTemplate {
        NodeTemplate {
            id: id.to_string(),
            node_type: node_type.to_string(),
            label: id.to_string(),
            description: String::new(),
            build,
        }
    }

    #[test]
    fn test_grouping_puts_sources_first() {
        let mut registry = NodeRegistry::new();
        registry.register(template("chart", PRESENTATION, chart));
        registry.register(template("filter", FILTER, filter));
        registry.register(template("source", SOURCE, source));

        let groups: Vec<_> = registry.grouped_by_type().keys().cloned().collect();
        assert_eq!(groups, [SOURCE, FILTER, PRESENTATION]);
    }

    #[test]
    fn test_create_node() {
        let mut registry = NodeRegistry::new();
        registry.register(template("filter", FILTER, filter));

        let node = registry.create_node_with_id("filter", "f1".into()).unwrap();
        assert_eq!(node.id(), &NodeId::from("f1"));
        assert_eq!(node.node_type(), FILTER);

        let a = registry.create_node("filter").unwrap();
        let b = registry.create_node("filter").unwrap();
        assert_ne!(a.id(), b.id());
        assert!(registry.create_node("missing").is_none());
    }
}
