// SPDX-License-Identifier: MIT OR Apache-2.0
//! Endpoint definitions: typed connection points on a node.

use crate::scope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an endpoint, unique within its node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub String);

impl EndpointId {
    /// Create an endpoint ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EndpointId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Endpoint direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointDirection {
    /// Receives data from an upstream node
    Input,
    /// Feeds data to downstream nodes
    Output,
}

impl EndpointDirection {
    /// The opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// Connector shape drawn by the designer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectorType {
    /// Round connector
    #[default]
    Dot,
    /// Square connector
    Rectangle,
}

/// Side of the node the endpoint is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorType {
    /// Left edge
    Left,
    /// Right edge
    Right,
    /// Top edge
    Top,
    /// Bottom edge
    Bottom,
}

impl AnchorType {
    /// Conventional anchor for a direction
    pub fn for_direction(direction: EndpointDirection) -> Self {
        match direction {
            EndpointDirection::Input => Self::Left,
            EndpointDirection::Output => Self::Right,
        }
    }
}

/// Maximum number of connections an endpoint accepts.
///
/// Serialized as a signed integer where `-1` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Capacity {
    /// Any number of connections
    Unbounded,
    /// At most this many connections
    Limited(usize),
}

impl Capacity {
    /// Whether `count` connections fit
    pub fn admits(self, count: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(max) => count <= max,
        }
    }
}

/// Connection limit that is neither `-1` nor a non-negative count
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid connection limit {0}: expected -1 (unbounded) or a non-negative count")]
pub struct InvalidCapacity(pub i64);

impl TryFrom<i64> for Capacity {
    type Error = InvalidCapacity;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Unbounded),
            _ => usize::try_from(value)
                .map(Self::Limited)
                .map_err(|_| InvalidCapacity(value)),
        }
    }
}

impl From<Capacity> for i64 {
    fn from(capacity: Capacity) -> Self {
        match capacity {
            Capacity::Unbounded => -1,
            Capacity::Limited(max) => i64::try_from(max).unwrap_or(i64::MAX),
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Limited(max) => write!(f, "{max}"),
        }
    }
}

/// Connection slots left on an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// No limit
    Unbounded,
    /// This many more connections fit
    Slots(usize),
}

/// An endpoint cannot take (or give back) a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Endpoint {endpoint} capacity exceeded (max {max}, current {current})")]
pub struct CapacityExceeded {
    /// Endpoint that refused the change
    pub endpoint: EndpointId,
    /// Its capacity
    pub max: Capacity,
    /// Its connection count at the time of the refusal
    pub current: usize,
}

/// A typed connection point on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint ID, unique within the owning node
    pub id: EndpointId,
    /// Display label
    pub label: String,
    /// Direction
    pub direction: EndpointDirection,
    /// Connector shape
    #[serde(default)]
    pub connector_type: ConnectorType,
    /// Anchor side
    pub anchor: AnchorType,
    /// Connection limit
    pub max_connections: Capacity,
    /// Whether validation requires at least one connection
    #[serde(default)]
    pub required: bool,
    /// Compatibility scope
    pub scope: String,
    /// Opaque payload carried into the generated specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Live connection count, rebuilt whenever a model is loaded
    #[serde(skip)]
    connections: usize,
}

impl Endpoint {
    /// Create a new endpoint with the conventional anchor and connector
    pub fn new(
        id: impl Into<EndpointId>,
        label: impl Into<String>,
        direction: EndpointDirection,
        scope: impl Into<String>,
    ) -> Self {
        let (connector_type, max_connections) = match direction {
            EndpointDirection::Input => (ConnectorType::Dot, Capacity::Limited(1)),
            EndpointDirection::Output => (ConnectorType::Rectangle, Capacity::Unbounded),
        };
        Self {
            id: id.into(),
            label: label.into(),
            direction,
            connector_type,
            anchor: AnchorType::for_direction(direction),
            max_connections,
            required: false,
            scope: scope.into(),
            user_data: None,
            connections: 0,
        }
    }

    /// Create a new input endpoint (single connection by default)
    pub fn input(
        id: impl Into<EndpointId>,
        label: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::new(id, label, EndpointDirection::Input, scope)
    }

    /// Create a new output endpoint (unbounded by default)
    pub fn output(
        id: impl Into<EndpointId>,
        label: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::new(id, label, EndpointDirection::Output, scope)
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the connection limit
    pub fn with_max_connections(mut self, max: Capacity) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the anchor side
    pub fn with_anchor(mut self, anchor: AnchorType) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the connector shape
    pub fn with_connector(mut self, connector_type: ConnectorType) -> Self {
        self.connector_type = connector_type;
        self
    }

    /// Attach user data
    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    /// Check if a connection to another endpoint is valid.
    ///
    /// Directions must be opposite and scopes compatible. Capacity is not
    /// considered here.
    pub fn can_connect_to(&self, other: &Endpoint) -> bool {
        self.direction != other.direction && scope::compatible(&self.scope, &other.scope)
    }

    /// Current number of connections
    pub fn connection_count(&self) -> usize {
        self.connections
    }

    /// Whether at least one connection is attached
    pub fn is_connected(&self) -> bool {
        self.connections > 0
    }

    /// Slots left before the endpoint is saturated
    pub fn remaining_capacity(&self) -> Remaining {
        match self.max_connections {
            Capacity::Unbounded => Remaining::Unbounded,
            Capacity::Limited(max) => Remaining::Slots(max.saturating_sub(self.connections)),
        }
    }

    /// Whether one more connection would fit
    pub fn has_capacity(&self) -> bool {
        self.max_connections.admits(self.connections + 1)
    }

    /// Record a new connection
    pub fn attach(&mut self) -> Result<usize, CapacityExceeded> {
        if !self.has_capacity() {
            return Err(self.capacity_error());
        }
        self.connections += 1;
        Ok(self.connections)
    }

    /// Release a connection
    pub fn detach(&mut self) -> Result<usize, CapacityExceeded> {
        let Some(next) = self.connections.checked_sub(1) else {
            return Err(self.capacity_error());
        };
        self.connections = next;
        Ok(self.connections)
    }

    pub(crate) fn reset_connections(&mut self) {
        self.connections = 0;
    }

    fn capacity_error(&self) -> CapacityExceeded {
        CapacityExceeded {
            endpoint: self.id.clone(),
            max: self.max_connections,
            current: self.connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_must_differ() {
        let a = Endpoint::output("out", "Out", scope::NUMBER);
        let b = Endpoint::input("in", "In", scope::NUMBER);
        let c = Endpoint::output("out2", "Out", scope::NUMBER);
        assert!(a.can_connect_to(&b));
        assert!(b.can_connect_to(&a));
        assert!(!a.can_connect_to(&c));
    }

    #[test]
    fn test_scope_checked() {
        let a = Endpoint::output("out", "Out", "sensor_Float");
        let b = Endpoint::input("in", "In", scope::GEO_LAT);
        assert!(!a.can_connect_to(&b));
    }

    #[test]
    fn test_capacity_limits() {
        let mut ep = Endpoint::input("in", "In", scope::NUMBER);
        assert_eq!(ep.remaining_capacity(), Remaining::Slots(1));
        assert_eq!(ep.attach(), Ok(1));
        assert_eq!(ep.remaining_capacity(), Remaining::Slots(0));

        let err = ep.attach().unwrap_err();
        assert_eq!(err.current, 1);
        assert_eq!(ep.connection_count(), 1);

        assert_eq!(ep.detach(), Ok(0));
        assert!(ep.detach().is_err());
        assert_eq!(ep.connection_count(), 0);
    }

    #[test]
    fn test_unbounded() {
        let mut ep = Endpoint::output("out", "Out", scope::NUMBER);
        for _ in 0..16 {
            ep.attach().unwrap();
        }
        assert_eq!(ep.remaining_capacity(), Remaining::Unbounded);
        assert_eq!(ep.connection_count(), 16);
    }

    #[test]
    fn test_capacity_wire_form() {
        assert_eq!(Capacity::try_from(-1), Ok(Capacity::Unbounded));
        assert_eq!(Capacity::try_from(3), Ok(Capacity::Limited(3)));
        assert_eq!(Capacity::try_from(-7), Err(InvalidCapacity(-7)));
        assert_eq!(i64::from(Capacity::Unbounded), -1);

        let ep = Endpoint::output("out", "Out", scope::NUMBER);
        let json = serde_json::to_string(&ep).unwrap();
        assert!(json.contains("\"max_connections\":-1"));
        let back: Endpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_connections, Capacity::Unbounded);
    }

    #[test]
    fn test_negative_limit_rejected_on_load() {
        let json = r#"{ "id": "in", "label": "In", "direction": "Input", "anchor": "Left",
                        "max_connections": -7, "scope": "Number" }"#;
        let err = serde_json::from_str::<Endpoint>(json).unwrap_err();
        assert!(err.to_string().contains("-7"), "{err}");
    }
}
