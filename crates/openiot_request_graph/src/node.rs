// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph model.

use crate::endpoint::{Endpoint, EndpointDirection, EndpointId};
use crate::error::{GraphError, Reference};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Node type of sensor sources
pub const SOURCE: &str = "SOURCE";
/// Node type of filters
pub const FILTER: &str = "FILTER";
/// Node type of comparators
pub const COMPARATOR: &str = "COMPARATOR";
/// Node type of aggregators
pub const AGGREGATOR: &str = "AGGREGATOR";
/// Node type of presentation sinks
pub const PRESENTATION: &str = "PRESENTATION";

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new random node ID
    pub fn generate() -> Self {
        Self(format!("node_{}", Uuid::new_v4().simple()))
    }

    /// Borrow the raw string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Value stored in a node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Text(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique instance ID
    id: NodeId,
    /// Node type tag, fixed at creation
    #[serde(rename = "type")]
    node_type: String,
    /// Display name
    pub label: String,
    /// Configurable properties, in insertion order
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
    /// Endpoints, in insertion order
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

impl GraphNode {
    /// Create a node without endpoints
    pub fn new(
        id: impl Into<NodeId>,
        node_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            label: label.into(),
            properties: IndexMap::new(),
            endpoints: Vec::new(),
        }
    }

    /// Add an endpoint, builder style.
    ///
    /// A duplicate endpoint id is ignored; use [`GraphNode::add_endpoint`]
    /// when the caller needs to know.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        let _ = self.add_endpoint(endpoint);
        self
    }

    /// Set a property, builder style
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Unique instance ID
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Copy of this node under a new id, with no connections recorded
    pub fn duplicate(&self, id: NodeId) -> Self {
        let mut node = self.clone();
        node.id = id;
        node.reset_connections();
        node
    }

    /// Node type tag
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Append an endpoint, keeping insertion order
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), GraphError> {
        if self.endpoints.iter().any(|e| e.id == endpoint.id) {
            return Err(GraphError::DuplicateId(Reference::endpoint(&self.id, &endpoint.id)));
        }
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Find an endpoint by ID
    pub fn find_endpoint(&self, endpoint_id: &EndpointId) -> Result<&Endpoint, GraphError> {
        self.endpoint(endpoint_id)
            .ok_or_else(|| GraphError::NotFound(Reference::endpoint(&self.id, endpoint_id)))
    }

    /// Get an endpoint by ID
    pub fn endpoint(&self, endpoint_id: &EndpointId) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == *endpoint_id)
    }

    pub(crate) fn endpoint_mut(&mut self, endpoint_id: &EndpointId) -> Option<&mut Endpoint> {
        self.endpoints.iter_mut().find(|e| e.id == *endpoint_id)
    }

    /// Get an endpoint by position
    pub fn endpoint_at(&self, index: usize) -> Option<&Endpoint> {
        self.endpoints.get(index)
    }

    /// All endpoints, in insertion order
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Endpoints of one direction, in insertion order
    pub fn endpoints_in(&self, direction: EndpointDirection) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().filter(move |e| e.direction == direction)
    }

    /// Whether any endpoint carries a connection
    pub fn is_connected(&self) -> bool {
        self.endpoints.iter().any(Endpoint::is_connected)
    }

    pub(crate) fn reset_connections(&mut self) {
        self.endpoints.iter_mut().for_each(Endpoint::reset_connections);
    }
}
