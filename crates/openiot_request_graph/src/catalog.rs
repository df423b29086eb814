// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sensor catalog: builds `SOURCE` nodes from sensor-type descriptors.
//!
//! The catalog provider is never called back; descriptors are only used to
//! construct nodes before they enter a graph.

use crate::endpoint::{AnchorType, Capacity, ConnectorType, Endpoint};
use crate::node::{GraphNode, NodeId, SOURCE};
use crate::scope;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Endpoint id of the filter input every source node carries first
pub const FILTER_INPUT: &str = "SEL_FILTER_IN";
/// Endpoint id of the latitude output
pub const LAT_OUTPUT: &str = "LAT";
/// Endpoint id of the longitude output
pub const LON_OUTPUT: &str = "LON";

/// Error loading a sensor catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// File could not be read
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid catalog
    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Measurement unit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Unit {
    /// Unit name (e.g. `celsius`)
    #[serde(default)]
    pub name: Option<String>,
    /// Value type name (e.g. `xsd:double`)
    #[serde(default, rename = "type")]
    pub value_type: String,
}

/// Something a sensor type measures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementCapability {
    /// Measured property URI
    #[serde(rename = "type")]
    pub type_uri: String,
    /// Units, the first one is used
    #[serde(default)]
    pub units: Vec<Unit>,
}

/// A sensor type offered by the catalog provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorType {
    /// Sensor type name
    pub name: String,
    /// Measurement capabilities
    #[serde(default)]
    pub capabilities: Vec<MeasurementCapability>,
}

/// All sensor types available to the session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorCatalog {
    /// Sensor types, in provider order
    #[serde(default)]
    pub sensor_types: Vec<SensorType>,
}

impl SensorCatalog {
    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!("Loaded {} sensor types from {:?}", catalog.sensor_types.len(), path);
        Ok(catalog)
    }
}

/// Location restriction copied onto every source node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationFilter {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Radius
    pub radius: f64,
}

/// Map a unit value type onto an endpoint scope
pub fn unit_scope(value_type: &str) -> &'static str {
    let lower = value_type.to_lowercase();
    [
        ("int", scope::INTEGER),
        ("long", scope::LONG),
        ("float", scope::FLOAT),
        ("double", scope::DOUBLE),
        ("decimal", scope::NUMBER),
        ("date", scope::DATE),
    ]
    .into_iter()
    .find(|(needle, _)| lower.contains(needle))
    .map_or(scope::NUMBER, |(_, scope)| scope)
}

fn capability_label(capability: &MeasurementCapability, unit: &Unit) -> String {
    let mut label = match capability.type_uri.split_once('#') {
        Some((_, fragment)) => fragment.to_string(),
        None => capability.type_uri.clone(),
    };
    if let Some(name) = unit.name.as_deref().filter(|n| !n.is_empty() && *n != "null") {
        label.push_str(&format!(" ({name})"));
    }
    label
}

/// Build the source node of one sensor type
pub fn source_node(sensor_type: &SensorType, filter: &LocationFilter, id: NodeId) -> GraphNode {
    let mut node = GraphNode::new(id, SOURCE, sensor_type.name.clone())
        .with_property("LAT", filter.lat)
        .with_property("LON", filter.lon)
        .with_property("RADIUS", filter.radius)
        .with_endpoint(
            Endpoint::input(FILTER_INPUT, FILTER_INPUT, scope::SENSOR)
                .with_anchor(AnchorType::Left)
                .with_connector(ConnectorType::Dot)
                .with_max_connections(Capacity::Limited(1)),
        );

    for capability in &sensor_type.capabilities {
        let Some(unit) = capability.units.first() else {
            continue;
        };
        let endpoint = Endpoint::output(
            capability.type_uri.clone(),
            capability_label(capability, unit),
            format!("{}{}", scope::SENSOR_SCOPE_PREFIX, unit_scope(&unit.value_type)),
        )
        .with_user_data(capability.type_uri.clone());
        if let Err(e) = node.add_endpoint(endpoint) {
            tracing::warn!("Skipping capability of sensor type '{}': {e}", sensor_type.name);
        }
    }

    for (id, geo_scope, user_data) in [
        (LAT_OUTPUT, scope::GEO_LAT, "geo:lat"),
        (LON_OUTPUT, scope::GEO_LON, "geo:lon"),
    ] {
        let endpoint = Endpoint::output(id, id, geo_scope).with_user_data(user_data);
        if let Err(e) = node.add_endpoint(endpoint) {
            tracing::warn!("Sensor type '{}' has no {id} output: {e}", sensor_type.name);
        }
    }
    node
}

/// Build one source node per sensor type, in catalog order
pub fn source_nodes(catalog: &SensorCatalog, filter: &LocationFilter) -> Vec<GraphNode> {
    catalog
        .sensor_types
        .iter()
        .map(|sensor_type| source_node(sensor_type, filter, NodeId::generate()))
        .collect()
}
