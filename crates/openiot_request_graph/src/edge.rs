// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph.

use crate::endpoint::EndpointId;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed connection from an output endpoint to an input endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node ID
    pub source_node: NodeId,
    /// Source (output) endpoint ID
    pub source_endpoint: EndpointId,
    /// Target node ID
    pub target_node: NodeId,
    /// Target (input) endpoint ID
    pub target_endpoint: EndpointId,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        source_node: impl Into<NodeId>,
        source_endpoint: impl Into<EndpointId>,
        target_node: impl Into<NodeId>,
        target_endpoint: impl Into<EndpointId>,
    ) -> Self {
        Self {
            source_node: source_node.into(),
            source_endpoint: source_endpoint.into(),
            target_node: target_node.into(),
            target_endpoint: target_endpoint.into(),
        }
    }

    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        self.source_node == *node_id || self.target_node == *node_id
    }

    /// Check if this edge starts at a specific endpoint
    pub fn starts_at(&self, node_id: &NodeId, endpoint_id: &EndpointId) -> bool {
        self.source_node == *node_id && self.source_endpoint == *endpoint_id
    }

    /// Check if this edge ends at a specific endpoint
    pub fn ends_at(&self, node_id: &NodeId, endpoint_id: &EndpointId) -> bool {
        self.target_node == *node_id && self.target_endpoint == *endpoint_id
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source_node, self.source_endpoint, self.target_node, self.target_endpoint
        )
    }
}
