// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph model containing nodes and edges.
//!
//! Connection legality is checked per edge when it is created. The model
//! never requires the whole graph to be valid; that is the job of
//! [`crate::validation::Validator`].

use crate::edge::Edge;
use crate::endpoint::{Endpoint, EndpointDirection, EndpointId};
use crate::error::{GraphError, Reference};
use crate::node::{GraphNode, NodeId, PropertyValue};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

/// The mutable application graph of one editing session
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    /// Nodes, in insertion order
    nodes: IndexMap<NodeId, GraphNode>,
    /// Edges, in insertion order
    edges: IndexSet<Edge>,
    /// Whether an edge may connect two endpoints of the same node
    allow_self_loops: bool,
}

impl GraphModel {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty graph that accepts self-loops
    pub fn with_self_loops() -> Self {
        Self {
            allow_self_loops: true,
            ..Self::default()
        }
    }

    /// Whether self-loops are accepted
    pub fn allows_self_loops(&self) -> bool {
        self.allow_self_loops
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, mut node: GraphNode) -> Result<NodeId, GraphError> {
        let id = node.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(Reference::Node(id)));
        }

        // Deserialized nodes bypass `GraphNode::add_endpoint`
        let mut seen = HashSet::with_capacity(node.endpoints().len());
        if let Some(dup) = node.endpoints().iter().find(|e| !seen.insert(&e.id)) {
            return Err(GraphError::DuplicateId(Reference::endpoint(&id, &dup.id)));
        }

        // A fresh node carries no edges in this model
        node.reset_connections();
        tracing::debug!(node = %id, node_type = node.node_type(), "Added node");
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Remove a node together with every edge touching it
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<GraphNode, GraphError> {
        if !self.nodes.contains_key(node_id) {
            return Err(GraphError::NotFound(Reference::Node(node_id.clone())));
        }

        let touching: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| e.involves_node(node_id))
            .cloned()
            .collect();
        for edge in &touching {
            self.release(edge);
            self.edges.shift_remove(edge);
        }

        let node = self
            .nodes
            .shift_remove(node_id)
            .ok_or_else(|| GraphError::NotFound(Reference::Node(node_id.clone())))?;
        tracing::debug!(node = %node_id, edges = touching.len(), "Removed node");
        Ok(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&GraphNode> {
        self.nodes.get(node_id)
    }

    /// Change the display label of a node
    pub fn set_label(
        &mut self,
        node_id: &NodeId,
        label: impl Into<String>,
    ) -> Result<(), GraphError> {
        self.node_entry(node_id)?.label = label.into();
        Ok(())
    }

    /// Mutable properties of a node
    pub fn properties_mut(
        &mut self,
        node_id: &NodeId,
    ) -> Result<&mut IndexMap<String, PropertyValue>, GraphError> {
        Ok(&mut self.node_entry(node_id)?.properties)
    }

    /// Append an endpoint to a node already in the graph.
    ///
    /// The endpoint starts unconnected whatever counter it carried.
    pub fn add_endpoint(
        &mut self,
        node_id: &NodeId,
        mut endpoint: Endpoint,
    ) -> Result<(), GraphError> {
        endpoint.reset_connections();
        self.node_entry(node_id)?.add_endpoint(endpoint)
    }

    // Node ids, types and endpoint sets stay under the model's control, so
    // the node itself is never handed out mutably.
    fn node_entry(&mut self, node_id: &NodeId) -> Result<&mut GraphNode, GraphError> {
        self.nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NotFound(Reference::Node(node_id.clone())))
    }

    /// Get all nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Get all node IDs, in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Position of a node in insertion order
    pub fn node_index(&self, node_id: &NodeId) -> Option<usize> {
        self.nodes.get_index_of(node_id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve an endpoint
    pub fn endpoint(
        &self,
        node_id: &NodeId,
        endpoint_id: &EndpointId,
    ) -> Result<&Endpoint, GraphError> {
        self.nodes
            .get(node_id)
            .ok_or_else(|| GraphError::NotFound(Reference::Node(node_id.clone())))?
            .find_endpoint(endpoint_id)
    }

    /// Connect an output endpoint to an input endpoint
    pub fn connect(
        &mut self,
        source_node: &NodeId,
        source_endpoint: &EndpointId,
        target_node: &NodeId,
        target_endpoint: &EndpointId,
    ) -> Result<Edge, GraphError> {
        let result = self.try_connect(source_node, source_endpoint, target_node, target_endpoint);
        match &result {
            Ok(edge) => tracing::debug!(%edge, "Connected"),
            Err(e) => tracing::warn!(
                "Rejected connection {source_node}.{source_endpoint} -> \
                 {target_node}.{target_endpoint}: {e}"
            ),
        }
        result
    }

    fn try_connect(
        &mut self,
        source_node: &NodeId,
        source_endpoint: &EndpointId,
        target_node: &NodeId,
        target_endpoint: &EndpointId,
    ) -> Result<Edge, GraphError> {
        let source = self.endpoint(source_node, source_endpoint)?;
        let target = self.endpoint(target_node, target_endpoint)?;

        if source_node == target_node && !self.allow_self_loops {
            return Err(GraphError::SelfLoop(source_node.clone()));
        }

        if source.direction != EndpointDirection::Output
            || target.direction != EndpointDirection::Input
        {
            return Err(GraphError::DirectionMismatch {
                source_ref: Reference::endpoint(source_node, source_endpoint),
                target_ref: Reference::endpoint(target_node, target_endpoint),
            });
        }

        if !source.can_connect_to(target) {
            return Err(GraphError::ScopeMismatch {
                source_scope: source.scope.clone(),
                target_scope: target.scope.clone(),
            });
        }

        let edge = Edge::new(
            source_node.clone(),
            source_endpoint.clone(),
            target_node.clone(),
            target_endpoint.clone(),
        );
        if self.edges.contains(&edge) {
            return Err(GraphError::DuplicateEdge(edge));
        }

        for (endpoint, node_id, endpoint_id) in [
            (source, source_node, source_endpoint),
            (target, target_node, target_endpoint),
        ] {
            if !endpoint.has_capacity() {
                return Err(GraphError::CapacityExceeded {
                    endpoint: Reference::endpoint(node_id, endpoint_id),
                    max: endpoint.max_connections,
                });
            }
        }

        // Either both counters move or neither does
        self.attach(source_node, source_endpoint)?;
        if let Err(e) = self.attach(target_node, target_endpoint) {
            self.detach(source_node, source_endpoint);
            return Err(e);
        }

        self.edges.insert(edge.clone());
        Ok(edge)
    }

    /// Remove an edge
    pub fn disconnect(&mut self, edge: &Edge) -> Result<(), GraphError> {
        if !self.edges.shift_remove(edge) {
            return Err(GraphError::NotFound(Reference::Edge(edge.clone())));
        }
        self.release(edge);
        tracing::debug!(%edge, "Disconnected");
        Ok(())
    }

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        tracing::debug!("Cleared graph");
    }

    /// Check if an edge exists
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Get all edges, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges leaving a specific endpoint, in insertion order
    pub fn edges_from<'a>(
        &'a self,
        node_id: &'a NodeId,
        endpoint_id: &'a EndpointId,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.starts_at(node_id, endpoint_id))
    }

    /// Edges arriving at a specific endpoint, in insertion order
    pub fn edges_to<'a>(
        &'a self,
        node_id: &'a NodeId,
        endpoint_id: &'a EndpointId,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.ends_at(node_id, endpoint_id))
    }

    /// Outgoing edges of a node, ordered by endpoint then edge insertion.
    ///
    /// Scans every edge; whole-graph passes use
    /// [`crate::traversal::Adjacency`] instead.
    pub fn outgoing(&self, node_id: &NodeId) -> Vec<&Edge> {
        let mut out = Vec::new();
        if let Some(node) = self.nodes.get(node_id) {
            for ep in node.endpoints_in(EndpointDirection::Output) {
                out.extend(self.edges.iter().filter(|e| e.starts_at(node_id, &ep.id)));
            }
        }
        out
    }

    /// Incoming edges of a node, ordered by endpoint then edge insertion
    pub fn incoming(&self, node_id: &NodeId) -> Vec<&Edge> {
        let mut out = Vec::new();
        if let Some(node) = self.nodes.get(node_id) {
            for ep in node.endpoints_in(EndpointDirection::Input) {
                out.extend(self.edges.iter().filter(|e| e.ends_at(node_id, &ep.id)));
            }
        }
        out
    }

    fn attach(&mut self, node_id: &NodeId, endpoint_id: &EndpointId) -> Result<(), GraphError> {
        let endpoint = self.endpoint_mut(node_id, endpoint_id)?;
        let max = endpoint.max_connections;
        endpoint.attach().map(|_| ()).map_err(|_| GraphError::CapacityExceeded {
            endpoint: Reference::endpoint(node_id, endpoint_id),
            max,
        })
    }

    fn detach(&mut self, node_id: &NodeId, endpoint_id: &EndpointId) {
        if let Ok(endpoint) = self.endpoint_mut(node_id, endpoint_id) {
            if let Err(e) = endpoint.detach() {
                tracing::warn!("Connection counter out of sync: {e}");
            }
        }
    }

    fn release(&mut self, edge: &Edge) {
        self.detach(&edge.source_node, &edge.source_endpoint);
        self.detach(&edge.target_node, &edge.target_endpoint);
    }

    fn endpoint_mut(
        &mut self,
        node_id: &NodeId,
        endpoint_id: &EndpointId,
    ) -> Result<&mut Endpoint, GraphError> {
        self.node_entry(node_id)?
            .endpoint_mut(endpoint_id)
            .ok_or_else(|| GraphError::NotFound(Reference::endpoint(node_id, endpoint_id)))
    }
}
