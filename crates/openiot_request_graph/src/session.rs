// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-session application design state.
//!
//! One [`DesignSession`] belongs to one editing session and is mutated by
//! one caller at a time. Independent sessions share nothing mutable.

use crate::catalog::{self, LocationFilter, SensorCatalog};
use crate::document::GraphDocument;
use crate::error::GraphError;
use crate::generate::{GenerateError, Generator, Specification};
use crate::graph::GraphModel;
use crate::node::{GraphNode, NodeId, SOURCE};
use crate::registry::NodeRegistry;
use crate::validation::{ValidationReport, Validator};
use indexmap::IndexMap;

/// Error from a session-level operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No palette entry with that key
    #[error("Unknown palette entry: {0}")]
    UnknownPaletteEntry(String),

    /// The graph refused the edit
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One entry of the designer palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem {
    /// Key passed to [`DesignSession::add_from_palette`]
    pub key: String,
    /// Node type tag
    pub node_type: String,
    /// Display name
    pub label: String,
    /// Description
    pub description: String,
}

/// Application design state of one editing session
#[derive(Debug, Clone)]
pub struct DesignSession {
    registry: NodeRegistry,
    validator: Validator,
    graph: GraphModel,
    /// Application name
    pub name: String,
    /// Application description
    pub description: String,
    location_filter: LocationFilter,
    available_sensors: Vec<GraphNode>,
    report: ValidationReport,
    specification: Option<Specification>,
}

impl DesignSession {
    /// Create a session over an empty workspace
    pub fn new(registry: NodeRegistry, validator: Validator) -> Self {
        Self {
            registry,
            validator,
            graph: GraphModel::new(),
            name: String::new(),
            description: String::new(),
            location_filter: LocationFilter::default(),
            available_sensors: Vec::new(),
            report: ValidationReport::default(),
            specification: None,
        }
    }

    /// Replace the workspace graph with an empty one that accepts self-loops
    pub fn allow_self_loops(mut self) -> Self {
        self.graph = GraphModel::with_self_loops();
        self
    }

    /// Workspace graph
    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    /// Mutable workspace graph
    pub fn graph_mut(&mut self) -> &mut GraphModel {
        &mut self.graph
    }

    /// Available templates and sensor sources, grouped by node type with
    /// `SOURCE` first
    pub fn palette(&self) -> IndexMap<String, Vec<PaletteItem>> {
        let mut palette: IndexMap<String, Vec<PaletteItem>> = IndexMap::new();
        palette.insert(SOURCE.to_string(), Vec::new());

        for node in &self.available_sensors {
            palette.entry(SOURCE.to_string()).or_default().push(PaletteItem {
                key: node.id().to_string(),
                node_type: SOURCE.to_string(),
                label: node.label.clone(),
                description: format!("{} measurement(s)", node.endpoints().len().saturating_sub(3)),
            });
        }

        for (node_type, templates) in self.registry.grouped_by_type() {
            let items = palette.entry(node_type).or_default();
            items.extend(templates.into_iter().map(|t| PaletteItem {
                key: t.id.clone(),
                node_type: t.node_type.clone(),
                label: t.label.clone(),
                description: t.description.clone(),
            }));
        }
        palette
    }

    /// Instantiate a palette entry in the workspace under a fresh id
    pub fn add_from_palette(&mut self, key: &str) -> Result<NodeId, SessionError> {
        self.add_from_palette_with_id(key, NodeId::generate())
    }

    /// Instantiate a palette entry in the workspace under a given id
    pub fn add_from_palette_with_id(
        &mut self,
        key: &str,
        id: NodeId,
    ) -> Result<NodeId, SessionError> {
        let node = match self.available_sensors.iter().find(|n| n.id().as_str() == key) {
            Some(sensor) => sensor.duplicate(id),
            None => self
                .registry
                .create_node_with_id(key, id)
                .ok_or_else(|| SessionError::UnknownPaletteEntry(key.to_string()))?,
        };
        Ok(self.graph.add_node(node)?)
    }

    /// Current location filter
    pub fn location_filter(&self) -> LocationFilter {
        self.location_filter
    }

    /// Set the location filter used for the next sensor update
    pub fn set_location_filter(&mut self, filter: LocationFilter) {
        self.location_filter = filter;
    }

    /// Rebuild the sensor sources from a catalog
    pub fn update_available_sensors(&mut self, catalog: &SensorCatalog) {
        self.available_sensors = catalog::source_nodes(catalog, &self.location_filter);
        tracing::info!("{} sensor sources available", self.available_sensors.len());
    }

    /// Drop every sensor source from the palette
    pub fn clear_available_sensors(&mut self) {
        self.available_sensors.clear();
    }

    /// Sensor sources currently offered
    pub fn available_sensors(&self) -> &[GraphNode] {
        &self.available_sensors
    }

    /// Validate the workspace and keep the report
    pub fn validate(&mut self) -> &ValidationReport {
        self.report = self.validator.validate(&self.graph);
        &self.report
    }

    /// Generate the specification of the workspace and keep it
    pub fn generate(&mut self) -> Result<&Specification, GenerateError> {
        let generator = Generator::new(self.validator.clone())
            .with_application(self.name.clone(), self.description.clone());
        let (report, result) = generator.generate_with_report(&self.graph);
        self.report = report;
        match result {
            Ok(spec) => Ok(&*self.specification.insert(spec)),
            Err(e) => {
                self.specification = None;
                Err(e)
            }
        }
    }

    /// Report of the last validation or generation
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Specification of the last successful generation
    pub fn specification(&self) -> Option<&Specification> {
        self.specification.as_ref()
    }

    /// Reset the workspace
    pub fn cleanup_workspace(&mut self) {
        self.graph.clear();
        self.report = ValidationReport::default();
        self.specification = None;
        self.location_filter = LocationFilter::default();
        self.clear_available_sensors();
        tracing::info!("Workspace cleaned up");
    }

    /// Snapshot the workspace
    pub fn document(&self) -> GraphDocument {
        self.graph.to_document(self.name.clone(), self.description.clone())
    }

    /// Replace the workspace with a saved design
    pub fn load_document(&mut self, document: &GraphDocument) -> Result<(), GraphError> {
        let graph = GraphModel::from_document(document)?;
        self.graph = graph;
        self.name = document.name.clone();
        self.description = document.description.clone();
        self.report = ValidationReport::default();
        self.specification = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_registry;
    use crate::catalog::LAT_OUTPUT;
    use crate::node::{PropertyValue, PRESENTATION};

    const CATALOG: &str = r#"{
        "sensor_types": [
            { "name": "Thermometer", "capabilities": [
                { "type": "ex#Temperature", "units": [{ "name": "C", "type": "double" }] }
            ] }
        ]
    }"#;

    fn session() -> DesignSession {
        let mut session = DesignSession::new(builtin_registry(), Validator::default());
        session.set_location_filter(LocationFilter { lat: 37.9, lon: 23.7, radius: 10.0 });
        session.update_available_sensors(&SensorCatalog::from_json(CATALOG).unwrap());
        session
    }

    #[test]
    fn test_palette_sources_first() {
        let session = session();
        let palette = session.palette();
        assert_eq!(palette.get_index(0).map(|(k, _)| k.as_str()), Some(SOURCE));
        assert_eq!(palette[SOURCE].len(), 1);
        assert_eq!(palette[SOURCE][0].label, "Thermometer");
        assert!(palette[PRESENTATION].iter().any(|i| i.key == "Map"));
    }

    #[test]
    fn test_design_and_generate() {
        let mut session = session();
        session.name = "Temperature map".into();
        let sensor_key = session.available_sensors()[0].id().to_string();

        let source = session.add_from_palette_with_id(&sensor_key, "thermo".into()).unwrap();
        let map = session.add_from_palette_with_id("Map", "map".into()).unwrap();
        let graph = session.graph_mut();
        graph.connect(&source, &LAT_OUTPUT.into(), &map, &"LAT".into()).unwrap();
        graph.connect(&source, &"LON".into(), &map, &"LON".into()).unwrap();
        graph.connect(&source, &"ex#Temperature".into(), &map, &"VALUE".into()).unwrap();

        let spec = session.generate().unwrap();
        assert_eq!(spec.name, "Temperature map");
        assert_eq!(spec.statements[0].node_id, source);
        assert_eq!(spec.statements[0].properties["LAT"], PropertyValue::Float(37.9));
        assert!(session.report().errors().is_empty());
    }

    #[test]
    fn test_failed_generation_clears_specification() {
        let mut session = session();
        session.add_from_palette_with_id("Gauge", "g".into()).unwrap();
        assert!(session.generate().is_err());
        assert!(session.specification().is_none());
        assert_eq!(session.report().errors().len(), 1);
    }

    #[test]
    fn test_generation_report_matches_validation() {
        let mut session = session();
        session.add_from_palette_with_id("Gauge", "g".into()).unwrap();
        session.add_from_palette_with_id("Min", "m".into()).unwrap();
        let _ = session.generate();
        let stored = session.report().clone();
        assert_eq!(&stored, session.validate());
        assert_eq!(stored.errors().len(), 2);
    }

    #[test]
    fn test_unknown_palette_entry() {
        let mut session = session();
        let err = session.add_from_palette("Nope").unwrap_err();
        assert_eq!(err, SessionError::UnknownPaletteEntry("Nope".into()));
    }

    #[test]
    fn test_cleanup_workspace() {
        let mut session = session();
        session.add_from_palette("Gauge").unwrap();
        session.validate();
        session.cleanup_workspace();
        assert!(session.graph().is_empty());
        assert!(session.available_sensors().is_empty());
        assert!(session.report().is_clean());
        assert_eq!(session.location_filter(), LocationFilter::default());
    }

    #[test]
    fn test_document_round_trip() {
        let mut session = session();
        session.name = "Demo".into();
        session.add_from_palette_with_id("Gauge", "g".into()).unwrap();
        let document = session.document();

        let mut other = DesignSession::new(builtin_registry(), Validator::default());
        other.load_document(&document).unwrap();
        assert_eq!(other.name, "Demo");
        assert!(other.graph().node(&"g".into()).is_some());
    }
}
