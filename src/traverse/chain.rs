//! Cycle-safe walks over the edge list.
//!
//! Every walk keeps its own visited set, so cycles and diamonds terminate and each
//! node is handed to the visitor at most once per call. Missing nodes (dangling
//! edges) are dead ends.

use crate::foundation::ids::NodeId;
use crate::graph::model::{Edge, Node};
use crate::graph::store::GraphSnapshot;
use std::collections::HashSet;

/// Which way edges are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// From a node to the sources of its incoming edges.
    #[default]
    Upstream,
    /// From a node to the targets of its outgoing edges.
    Downstream,
}

/// Visitor verdict for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep walking past this node.
    Descend,
    /// Do not walk past this node; siblings are still visited.
    Prune,
    /// Stop the whole walk.
    Halt,
}

/// Summary of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraversalStats {
    /// Existing nodes handed to the visitor.
    pub visited: usize,
    /// `true` when the visitor returned [`Visit::Halt`].
    pub halted: bool,
}

/// Edge filter accepting only layer-carrying `input` edges.
pub fn input_edges(edge: &Edge) -> bool {
    edge.is_input()
}

/// Edge filter accepting everything.
pub fn any_edge(_: &Edge) -> bool {
    true
}

/// Depth-first pre-order walk from `start`.
///
/// The visitor receives each node with its depth (`0` for `start`). Neighbors are
/// visited in edge-array order.
pub fn traverse(
    graph: &GraphSnapshot,
    start: &str,
    direction: Direction,
    filter: impl Fn(&Edge) -> bool,
    mut visitor: impl FnMut(&Node, usize) -> Visit,
) -> TraversalStats {
    let mut stats = TraversalStats::default();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&str, usize)> = Vec::with_capacity(16);
    stack.push((start, 0));

    while let Some((id, depth)) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = graph.node(id) else {
            continue;
        };
        stats.visited += 1;

        match visitor(node, depth) {
            Visit::Descend => {}
            Visit::Prune => continue,
            Visit::Halt => {
                stats.halted = true;
                break;
            }
        }

        let next: Vec<&str> = match direction {
            Direction::Upstream => graph
                .incoming(id)
                .filter(|e| filter(e))
                .map(|e| e.source.as_str())
                .collect(),
            Direction::Downstream => graph
                .outgoing(id)
                .filter(|e| filter(e))
                .map(|e| e.target.as_str())
                .collect(),
        };
        for n in next.into_iter().rev() {
            if !visited.contains(n) {
                stack.push((n, depth + 1));
            }
        }
    }

    stats
}

/// Ids of every node reachable from `start` (excluding `start`) along any edge.
pub fn reachable(graph: &GraphSnapshot, start: &str, direction: Direction) -> Vec<NodeId> {
    let mut out = Vec::new();
    traverse(graph, start, direction, any_edge, |node, depth| {
        if depth > 0 {
            out.push(node.id.clone());
        }
        Visit::Descend
    });
    out
}

/// Follow only the first `input` edge of each node, nearest first.
///
/// Used for linear chains. `start` itself is not included; a revisit ends the chain.
pub fn first_input_chain<'a>(graph: &'a GraphSnapshot, start: &str) -> Vec<&'a Node> {
    let mut chain = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(start);

    let mut current = graph.incoming(start).find(|e| e.is_input());
    while let Some(edge) = current {
        let id = edge.source.as_str();
        if !seen.insert(id) {
            break;
        }
        let Some(node) = graph.node(id) else {
            break;
        };
        chain.push(node);
        current = graph.incoming(id).find(|e| e.is_input());
    }
    chain
}

#[cfg(test)]
#[path = "../../tests/unit/traverse/chain.rs"]
mod tests;
