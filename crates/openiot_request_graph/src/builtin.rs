// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node palette: filters, comparators, aggregators and
//! presentation sinks.
//!
//! Sensor sources are not registered here; they are built from the sensor
//! catalog (see [`crate::catalog`]).

use crate::endpoint::{Capacity, Endpoint};
use crate::node::{GraphNode, NodeId, AGGREGATOR, COMPARATOR, FILTER, PRESENTATION};
use crate::registry::{NodeConstructor, NodeRegistry, NodeTemplate};
use crate::scope;

/// Create the registry with every built-in node template
pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    let templates: [(&str, &str, &str, &str, NodeConstructor); 17] = [
        // ====================================================================
        // Filters
        // ====================================================================
        (
            "SelectionFilter",
            FILTER,
            "Selection filter",
            "Restricts sensor selection by time window",
            selection_filter,
        ),
        ("Group", FILTER, "Group", "Groups values before aggregation", group),
        // ====================================================================
        // Comparators
        // ====================================================================
        (
            "CompareAbsoluteDateTime",
            COMPARATOR,
            "Absolute date",
            "Compares record time with a fixed date",
            compare_absolute,
        ),
        (
            "CompareRelativeDateTime",
            COMPARATOR,
            "Relative date",
            "Compares record time with a period before now",
            compare_relative,
        ),
        ("Between", COMPARATOR, "Between", "Keeps values inside a range", between),
        ("Thresholds", COMPARATOR, "Threshold", "Keeps values passing a threshold", thresholds),
        // ====================================================================
        // Aggregators
        // ====================================================================
        ("Min", AGGREGATOR, "Min", "Minimum value", min),
        ("Max", AGGREGATOR, "Max", "Maximum value", max),
        ("Average", AGGREGATOR, "Average", "Average value", average),
        ("Count", AGGREGATOR, "Count", "Number of values", count),
        ("Sum", AGGREGATOR, "Sum", "Sum of values", sum),
        // ====================================================================
        // Presentation
        // ====================================================================
        ("LineChart", PRESENTATION, "Line chart", "Plots a series over an X axis", line_chart),
        ("ColumnChart", PRESENTATION, "Column chart", "Plots a series as columns", column_chart),
        ("Gauge", PRESENTATION, "Gauge", "Shows the latest value on a dial", gauge),
        ("Map", PRESENTATION, "Map", "Places values at sensor coordinates", map),
        ("Pie", PRESENTATION, "Pie chart", "Shows value shares", pie),
        ("Passthrough", PRESENTATION, "Passthrough", "Forwards raw values", passthrough),
    ];

    for (id, node_type, label, description, build) in templates {
        registry.register(NodeTemplate {
            id: id.to_string(),
            node_type: node_type.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            build,
        });
    }

    registry
}

fn selection_filter(id: NodeId) -> GraphNode {
    GraphNode::new(id, FILTER, "Selection filter")
        .with_endpoint(Endpoint::input("DATETIME", "Date/time condition", scope::DATE))
        .with_endpoint(Endpoint::output("SENSORS", "Sensors", scope::SENSOR))
}

fn group(id: NodeId) -> GraphNode {
    GraphNode::new(id, FILTER, "Group")
        .with_property("GROUP_BY", "recordTime")
        .with_endpoint(
            Endpoint::input("IN", "Values", scope::NUMBER)
                .required()
                .with_max_connections(Capacity::Unbounded),
        )
        .with_endpoint(Endpoint::output("OUT", "Groups", scope::NUMBER))
}

fn compare_absolute(id: NodeId) -> GraphNode {
    GraphNode::new(id, COMPARATOR, "Absolute date")
        .with_property("OPERATOR", ">")
        .with_property("CMP_VALUE", "")
        .with_endpoint(Endpoint::output("DATETIME", "Condition", scope::DATE))
}

fn compare_relative(id: NodeId) -> GraphNode {
    GraphNode::new(id, COMPARATOR, "Relative date")
        .with_property("OPERATOR", ">")
        .with_property("CMP_VALUE", 1_i64)
        .with_property("CMP_UNIT", "HOUR")
        .with_endpoint(Endpoint::output("DATETIME", "Condition", scope::DATE))
}

fn between(id: NodeId) -> GraphNode {
    GraphNode::new(id, COMPARATOR, "Between")
        .with_property("LOWER", 0.0)
        .with_property("UPPER", 0.0)
        .with_endpoint(Endpoint::input("IN", "Value", scope::NUMBER).required())
        .with_endpoint(Endpoint::output("OUT", "Value", scope::NUMBER))
}

fn thresholds(id: NodeId) -> GraphNode {
    GraphNode::new(id, COMPARATOR, "Threshold")
        .with_property("OPERATOR", ">")
        .with_property("THRESHOLD", 0.0)
        .with_endpoint(Endpoint::input("IN", "Value", scope::NUMBER).required())
        .with_endpoint(Endpoint::output("OUT", "Value", scope::NUMBER))
}

fn aggregator(id: NodeId, label: &str, out_scope: &str) -> GraphNode {
    GraphNode::new(id, AGGREGATOR, label)
        .with_endpoint(Endpoint::input("IN", "Values", scope::NUMBER).required())
        .with_endpoint(Endpoint::output("OUT", label, out_scope))
}

fn min(id: NodeId) -> GraphNode {
    aggregator(id, "Min", scope::NUMBER)
}

fn max(id: NodeId) -> GraphNode {
    aggregator(id, "Max", scope::NUMBER)
}

fn average(id: NodeId) -> GraphNode {
    aggregator(id, "Average", scope::DOUBLE)
}

fn count(id: NodeId) -> GraphNode {
    aggregator(id, "Count", scope::INTEGER)
}

fn sum(id: NodeId) -> GraphNode {
    aggregator(id, "Sum", scope::NUMBER)
}

fn xy_chart(id: NodeId, label: &str) -> GraphNode {
    GraphNode::new(id, PRESENTATION, label)
        .with_property("TITLE", "")
        .with_property("X_AXIS_LABEL", "")
        .with_property("Y_AXIS_LABEL", "")
        .with_endpoint(Endpoint::input("X", "X axis", scope::NUMBER).required())
        .with_endpoint(Endpoint::input("Y", "Y axis", scope::NUMBER).required())
}

fn line_chart(id: NodeId) -> GraphNode {
    xy_chart(id, "Line chart")
}

fn column_chart(id: NodeId) -> GraphNode {
    xy_chart(id, "Column chart")
}

fn gauge(id: NodeId) -> GraphNode {
    GraphNode::new(id, PRESENTATION, "Gauge")
        .with_property("MIN", 0.0)
        .with_property("MAX", 100.0)
        .with_endpoint(Endpoint::input("VALUE", "Value", scope::NUMBER).required())
}

fn map(id: NodeId) -> GraphNode {
    GraphNode::new(id, PRESENTATION, "Map")
        .with_endpoint(Endpoint::input("LAT", "Latitude", scope::GEO_LAT).required())
        .with_endpoint(Endpoint::input("LON", "Longitude", scope::GEO_LON).required())
        .with_endpoint(Endpoint::input("VALUE", "Value", scope::NUMBER))
}

fn pie(id: NodeId) -> GraphNode {
    GraphNode::new(id, PRESENTATION, "Pie chart")
        .with_property("TITLE", "")
        .with_endpoint(Endpoint::input("VALUE", "Value", scope::NUMBER).required())
}

fn passthrough(id: NodeId) -> GraphNode {
    GraphNode::new(id, PRESENTATION, "Passthrough").with_endpoint(
        Endpoint::input("IN", "Values", scope::NUMBER)
            .required()
            .with_max_connections(Capacity::Unbounded),
    )
}
