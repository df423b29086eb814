// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors returned by graph model operations.

use crate::edge::Edge;
use crate::endpoint::{Capacity, EndpointId};
use crate::node::NodeId;
use std::fmt;

/// What a [`GraphError`] refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// A node
    Node(NodeId),
    /// An endpoint on a node
    Endpoint {
        /// Owning node
        node: NodeId,
        /// Endpoint on that node
        endpoint: EndpointId,
    },
    /// An edge
    Edge(Edge),
}

impl Reference {
    /// Reference an endpoint
    pub fn endpoint(node: &NodeId, endpoint: &EndpointId) -> Self {
        Self::Endpoint {
            node: node.clone(),
            endpoint: endpoint.clone(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node '{id}'"),
            Self::Endpoint { node, endpoint } => write!(f, "endpoint '{node}.{endpoint}'"),
            Self::Edge(edge) => write!(f, "edge '{edge}'"),
        }
    }
}

/// Error from a structural edit of the graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Referenced node, endpoint or edge is absent
    #[error("Not found: {0}")]
    NotFound(Reference),

    /// Node or endpoint id already in use
    #[error("Duplicate id: {0}")]
    DuplicateId(Reference),

    /// Edge is not Output to Input
    #[error("Direction mismatch: {source_ref} must be an output and {target_ref} an input")]
    DirectionMismatch {
        /// Proposed source
        source_ref: Reference,
        /// Proposed target
        target_ref: Reference,
    },

    /// Endpoint scopes are not compatible
    #[error("Scope mismatch: '{source_scope}' cannot feed '{target_scope}'")]
    ScopeMismatch {
        /// Scope of the output endpoint
        source_scope: String,
        /// Scope of the input endpoint
        target_scope: String,
    },

    /// Endpoint already carries its maximum number of connections
    #[error("Capacity exceeded on {endpoint} (max {max})")]
    CapacityExceeded {
        /// Saturated endpoint
        endpoint: Reference,
        /// Its limit
        max: Capacity,
    },

    /// Edge would connect a node to itself
    #[error("Self-loop not allowed on node '{0}'")]
    SelfLoop(NodeId),

    /// The same endpoints are already wired
    #[error("Edge already exists: {0}")]
    DuplicateEdge(Edge),
}
