// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deterministic depth-first traversal of the graph.
//!
//! Roots are taken in node insertion order. From each node the walk follows
//! outgoing edges ordered by output endpoint, then by edge insertion. The
//! cycle check and the topological sort both use this walk so that identical
//! graphs always yield identical cycle paths and statement order.
//!
//! The walk keeps an explicit stack, so deep chains cannot exhaust the
//! thread stack. One pass costs time proportional to nodes plus edges.

use crate::edge::Edge;
use crate::graph::GraphModel;
use crate::node::NodeId;

/// Outgoing edges of every node, indexed by node insertion position
#[derive(Debug, Clone)]
pub struct Adjacency<'a> {
    outgoing: Vec<Vec<&'a Edge>>,
}

impl<'a> Adjacency<'a> {
    /// Index the outgoing edges of a graph in one pass over its edges
    pub fn build(graph: &'a GraphModel) -> Self {
        let mut outgoing: Vec<Vec<&'a Edge>> = vec![Vec::new(); graph.node_count()];
        for edge in graph.edges() {
            if let Some(index) = graph.node_index(&edge.source_node) {
                outgoing[index].push(edge);
            }
        }

        // Stable sort keeps edge insertion order within one endpoint
        for (edges, node) in outgoing.iter_mut().zip(graph.nodes()) {
            if edges.len() > 1 {
                edges.sort_by_cached_key(|e| {
                    node.endpoints().iter().position(|ep| ep.id == e.source_endpoint)
                });
            }
        }

        Self { outgoing }
    }

    /// Outgoing edges of the node at `index`, ordered by endpoint then edge
    /// insertion
    pub fn outgoing(&self, index: usize) -> &[&'a Edge] {
        self.outgoing.get(index).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// Result of a full depth-first walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Nodes in the order they were finished
    pub postorder: Vec<NodeId>,
    /// One path per back edge, from the re-entered node back to itself
    pub cycles: Vec<Vec<NodeId>>,
}

impl Traversal {
    /// Whether the walk met a back edge
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Nodes ordered so that every edge points forward.
    ///
    /// Only meaningful when [`Traversal::has_cycles`] is false.
    pub fn topological_order(&self) -> Vec<NodeId> {
        self.postorder.iter().rev().cloned().collect()
    }
}

/// Walk the whole graph
pub fn depth_first(graph: &GraphModel) -> Traversal {
    depth_first_with(graph, &Adjacency::build(graph))
}

/// Walk the whole graph over a prebuilt adjacency index
pub fn depth_first_with(graph: &GraphModel, adjacency: &Adjacency<'_>) -> Traversal {
    let ids: Vec<&NodeId> = graph.node_ids().collect();
    let mut marks: Vec<Option<Mark>> = vec![None; ids.len()];
    let mut result = Traversal::default();
    // (node position, next outgoing edge to follow)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for root in 0..ids.len() {
        if marks[root].is_some() {
            continue;
        }
        marks[root] = Some(Mark::Active);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let Some(edge) = adjacency.outgoing(node).get(next) else {
                frames.pop();
                marks[node] = Some(Mark::Done);
                result.postorder.push(ids[node].clone());
                continue;
            };
            frame.1 += 1;

            let Some(target) = graph.node_index(&edge.target_node) else {
                continue;
            };
            match marks[target] {
                Some(Mark::Active) => {
                    let start = frames.iter().position(|(n, _)| *n == target).unwrap_or(0);
                    let mut path: Vec<NodeId> =
                        frames[start..].iter().map(|(n, _)| ids[*n].clone()).collect();
                    path.push(ids[target].clone());
                    result.cycles.push(path);
                }
                Some(Mark::Done) => {}
                None => {
                    marks[target] = Some(Mark::Active);
                    frames.push((target, 0));
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Capacity, Endpoint};
    use crate::node::GraphNode;
    use crate::scope;

    fn relay(id: &str) -> GraphNode {
        GraphNode::new(id, "FILTER", id)
            .with_endpoint(
                Endpoint::input("in", "In", scope::NUMBER)
                    .with_max_connections(Capacity::Unbounded),
            )
            .with_endpoint(Endpoint::output("out", "Out", scope::NUMBER))
    }

    fn wire(graph: &mut GraphModel, from: &str, to: &str) {
        graph
            .connect(&from.into(), &"out".into(), &to.into(), &"in".into())
            .unwrap();
    }

    fn names(ids: &[NodeId]) -> Vec<&str> {
        ids.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let mut graph = GraphModel::new();
        for id in ["c", "b", "a"] {
            graph.add_node(relay(id)).unwrap();
        }
        wire(&mut graph, "a", "b");
        wire(&mut graph, "b", "c");

        let walk = depth_first(&graph);
        assert!(!walk.has_cycles());
        assert_eq!(names(&walk.topological_order()), ["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_path() {
        let mut graph = GraphModel::new();
        for id in ["a", "b", "c"] {
            graph.add_node(relay(id)).unwrap();
        }
        wire(&mut graph, "a", "b");
        wire(&mut graph, "b", "c");
        wire(&mut graph, "c", "b");

        let walk = depth_first(&graph);
        assert_eq!(walk.cycles.len(), 1);
        assert_eq!(names(&walk.cycles[0]), ["b", "c", "b"]);
    }

    #[test]
    fn test_walk_is_deterministic() {
        let mut graph = GraphModel::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(relay(id)).unwrap();
        }
        wire(&mut graph, "a", "c");
        wire(&mut graph, "b", "c");
        wire(&mut graph, "c", "d");
        assert_eq!(depth_first(&graph), depth_first(&graph));
    }

    #[test]
    fn test_adjacency_matches_outgoing() {
        let mut graph = GraphModel::new();
        graph
            .add_node(
                GraphNode::new("s", "SOURCE", "s")
                    .with_endpoint(Endpoint::output("x", "X", scope::NUMBER))
                    .with_endpoint(Endpoint::output("out", "Out", scope::NUMBER)),
            )
            .unwrap();
        for id in ["a", "b", "c"] {
            graph.add_node(relay(id)).unwrap();
        }
        wire(&mut graph, "s", "a");
        graph.connect(&"s".into(), &"x".into(), &"b".into(), &"in".into()).unwrap();
        wire(&mut graph, "s", "c");

        let adjacency = Adjacency::build(&graph);
        let indexed: Vec<&Edge> = adjacency.outgoing(0).to_vec();
        assert_eq!(indexed, graph.outgoing(&"s".into()));
        assert_eq!(indexed[0].target_node.as_str(), "b");
        assert!(adjacency.outgoing(99).is_empty());
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        const LEN: usize = 20_000;
        let mut graph = GraphModel::new();
        for i in 0..LEN {
            graph.add_node(relay(&format!("n{i}"))).unwrap();
        }
        for i in 1..LEN {
            wire(&mut graph, &format!("n{}", i - 1), &format!("n{i}"));
        }
        wire(&mut graph, &format!("n{}", LEN - 1), "n0");

        let walk = depth_first(&graph);
        assert_eq!(walk.postorder.len(), LEN);
        assert_eq!(walk.cycles.len(), 1);
        assert_eq!(walk.cycles[0].len(), LEN + 1);
    }
}
