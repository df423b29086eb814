// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end graph scenarios: wiring, validation and generation.

use openiot_request_graph::endpoint::Remaining;
use openiot_request_graph::scope;
use openiot_request_graph::{
    generate, Capacity, DiagnosticCode, Edge, Endpoint, GenerateError, GraphError, GraphModel,
    GraphNode, NodeId, Validator,
};

fn node_a() -> GraphNode {
    GraphNode::new("A", "SOURCE", "A").with_endpoint(Endpoint::output("out", "Out", scope::NUMBER))
}

fn node_b(in_scope: &str) -> GraphNode {
    GraphNode::new("B", "SINK", "B").with_endpoint(Endpoint::input("in", "In", in_scope).required())
}

fn relay(id: &str) -> GraphNode {
    GraphNode::new(id, "FILTER", id)
        .with_endpoint(Endpoint::input("in", "In", scope::NUMBER).required())
        .with_endpoint(Endpoint::output("out", "Out", scope::NUMBER))
}

fn wire(graph: &mut GraphModel, from: &str, to: &str) -> Result<Edge, GraphError> {
    graph.connect(&from.into(), &"out".into(), &to.into(), &"in".into())
}

fn connection_counts(graph: &GraphModel, ids: &[&str]) -> Vec<usize> {
    ids.iter()
        .flat_map(|id| graph.node(&NodeId::from(*id)).unwrap().endpoints())
        .map(Endpoint::connection_count)
        .collect()
}

#[test]
fn source_to_sink_generates_two_statements() {
    let mut graph = GraphModel::new();
    graph.add_node(node_a()).unwrap();
    graph.add_node(node_b(scope::NUMBER)).unwrap();
    wire(&mut graph, "A", "B").unwrap();

    let report = Validator::default().validate(&graph);
    assert!(report.errors().is_empty(), "{:?}", report.errors());

    let spec = generate(&graph).unwrap();
    let order: Vec<_> = spec.statements.iter().map(|s| s.node_id.as_str()).collect();
    assert_eq!(order, ["A", "B"]);
    assert_eq!(spec.statements[0].outputs[0].target_node, NodeId::from("B"));
}

#[test]
fn geo_lat_sink_rejects_number_source() {
    let mut graph = GraphModel::new();
    graph.add_node(node_a()).unwrap();
    graph.add_node(node_b(scope::GEO_LAT)).unwrap();

    let err = wire(&mut graph, "A", "B").unwrap_err();
    assert!(matches!(err, GraphError::ScopeMismatch { .. }), "{err:?}");
}

#[test]
fn single_slot_input_rejects_second_source() {
    let mut graph = GraphModel::new();
    graph
        .add_node(GraphNode::new("C", "SINK", "C").with_endpoint(
            Endpoint::input("in", "In", scope::NUMBER).with_max_connections(Capacity::Limited(1)),
        ))
        .unwrap();
    for id in ["S1", "S2"] {
        graph
            .add_node(
                GraphNode::new(id, "SOURCE", id)
                    .with_endpoint(Endpoint::output("out", "Out", scope::NUMBER)),
            )
            .unwrap();
    }

    wire(&mut graph, "S1", "C").unwrap();
    let err = wire(&mut graph, "S2", "C").unwrap_err();
    assert!(matches!(err, GraphError::CapacityExceeded { .. }), "{err:?}");
}

#[test]
fn connect_then_disconnect_restores_counts() {
    let mut graph = GraphModel::new();
    graph.add_node(node_a()).unwrap();
    graph.add_node(relay("R1")).unwrap();
    graph.add_node(relay("R2")).unwrap();
    wire(&mut graph, "A", "R1").unwrap();

    let before = connection_counts(&graph, &["A", "R2"]);

    let edge = wire(&mut graph, "A", "R2").unwrap();
    graph.disconnect(&edge).unwrap();

    assert_eq!(before, connection_counts(&graph, &["A", "R2"]));
}

#[test]
fn cycle_blocks_generation() {
    let mut graph = GraphModel::new();
    for id in ["X", "Y", "Z"] {
        graph.add_node(relay(id)).unwrap();
    }
    wire(&mut graph, "X", "Y").unwrap();
    wire(&mut graph, "Y", "Z").unwrap();
    wire(&mut graph, "Z", "X").unwrap();

    let report = Validator::default().validate(&graph);
    assert!(report
        .errors()
        .iter()
        .any(|d| matches!(d.code, DiagnosticCode::CycleDetected { .. })));

    match generate(&graph) {
        Err(GenerateError::ValidationFailed { errors }) => {
            assert_eq!(errors, report.errors());
        }
        Ok(spec) => panic!("cyclic graph generated {} statements", spec.statements.len()),
    }
}

#[test]
fn unwired_graph_without_required_endpoints_has_no_errors() {
    let mut graph = GraphModel::new();
    graph.add_node(node_a()).unwrap();
    graph
        .add_node(
            GraphNode::new("F", "FILTER", "F")
                .with_endpoint(Endpoint::input("in", "In", scope::NUMBER)),
        )
        .unwrap();

    let report = Validator::default().validate(&graph);
    assert!(report.errors().is_empty());
    assert!(report.warnings().iter().all(|d| d.code == DiagnosticCode::OrphanNode));
}

#[test]
fn generation_is_byte_identical() {
    let mut graph = GraphModel::new();
    graph.add_node(node_a()).unwrap();
    for id in ["R1", "R2", "R3"] {
        graph.add_node(relay(id)).unwrap();
    }
    wire(&mut graph, "A", "R1").unwrap();
    wire(&mut graph, "A", "R2").unwrap();
    wire(&mut graph, "R2", "R3").unwrap();

    let first = generate(&graph).unwrap();
    let second = generate(&graph).unwrap();
    assert_eq!(first.render(), second.render());
    assert_eq!(first.to_ron().unwrap(), second.to_ron().unwrap());
}

#[test]
fn connection_count_never_exceeds_limit() {
    let mut graph = GraphModel::new();
    graph
        .add_node(GraphNode::new("T", "SINK", "T").with_endpoint(
            Endpoint::input("in", "In", scope::NUMBER).with_max_connections(Capacity::Limited(3)),
        ))
        .unwrap();

    for i in 0..8 {
        let id = format!("S{i}");
        graph
            .add_node(
                GraphNode::new(id.as_str(), "SOURCE", id.as_str())
                    .with_endpoint(Endpoint::output("out", "Out", scope::INTEGER)),
            )
            .unwrap();
        let _ = wire(&mut graph, &id, "T");

        let target = graph.endpoint(&"T".into(), &"in".into()).unwrap();
        assert!(target.connection_count() <= 3);
    }

    let target = graph.endpoint(&"T".into(), &"in".into()).unwrap();
    assert_eq!(target.connection_count(), 3);
    assert_eq!(target.remaining_capacity(), Remaining::Slots(0));
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn long_relay_chain_validates_and_generates() {
    const LEN: usize = 10_000;
    let mut graph = GraphModel::new();
    graph.add_node(node_a()).unwrap();
    for i in 0..LEN {
        graph.add_node(relay(&format!("r{i}"))).unwrap();
    }
    wire(&mut graph, "A", "r0").unwrap();
    for i in 1..LEN {
        wire(&mut graph, &format!("r{}", i - 1), &format!("r{i}")).unwrap();
    }

    let report = Validator::default().validate(&graph);
    assert!(report.errors().is_empty());

    let spec = generate(&graph).unwrap();
    assert_eq!(spec.statements.len(), LEN + 1);
    assert_eq!(spec.statements[0].node_id, NodeId::from("A"));
    assert_eq!(spec.statements[LEN].node_id.as_str(), format!("r{}", LEN - 1));
}
