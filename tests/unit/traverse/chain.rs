use super::*;
use crate::graph::model::{Edge, NodeKind};

fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> GraphSnapshot {
    let nodes = nodes
        .iter()
        .map(|id| Node::new(*id, NodeKind::LayerImage))
        .collect();
    let edges = edges
        .iter()
        .enumerate()
        .map(|(i, (s, t))| Edge::input(format!("e{i}"), *s, *t))
        .collect();
    GraphSnapshot::new(nodes, edges)
}

fn order(g: &GraphSnapshot, start: &str) -> Vec<String> {
    let mut seen = Vec::new();
    traverse(g, start, Direction::Upstream, input_edges, |n, _| {
        seen.push(n.id.to_string());
        Visit::Descend
    });
    seen
}

#[test]
fn preorder_follows_edge_array_order() {
    // d <- b <- a, d <- c
    let g = graph(&["a", "b", "c", "d"], &[("b", "d"), ("a", "b"), ("c", "d")]);
    assert_eq!(order(&g, "d"), ["d", "b", "a", "c"]);
}

#[test]
fn cycles_terminate_and_visit_once() {
    let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
    let stats = traverse(&g, "c", Direction::Upstream, input_edges, |_, _| Visit::Descend);
    assert_eq!(stats.visited, 3);
    assert!(!stats.halted);
}

#[test]
fn self_loop_is_visited_once() {
    let g = graph(&["a"], &[("a", "a")]);
    assert_eq!(order(&g, "a"), ["a"]);
}

#[test]
fn diamond_visits_shared_ancestor_once() {
    let g = graph(
        &["root", "l", "r", "top"],
        &[("l", "top"), ("r", "top"), ("root", "l"), ("root", "r")],
    );
    assert_eq!(order(&g, "top"), ["top", "l", "root", "r"]);
}

#[test]
fn prune_stops_descent_but_not_siblings() {
    let g = graph(&["a", "b", "c", "d"], &[("b", "d"), ("a", "b"), ("c", "d")]);
    let mut seen = Vec::new();
    traverse(&g, "d", Direction::Upstream, input_edges, |n, _| {
        seen.push(n.id.to_string());
        if n.id.as_str() == "b" {
            Visit::Prune
        } else {
            Visit::Descend
        }
    });
    assert_eq!(seen, ["d", "b", "c"]);
}

#[test]
fn halt_ends_walk() {
    let g = graph(&["a", "b", "c", "d"], &[("b", "d"), ("a", "b"), ("c", "d")]);
    let stats = traverse(&g, "d", Direction::Upstream, input_edges, |n, _| {
        if n.id.as_str() == "b" {
            Visit::Halt
        } else {
            Visit::Descend
        }
    });
    assert!(stats.halted);
    assert_eq!(stats.visited, 2);
}

#[test]
fn dangling_edges_are_dead_ends() {
    let g = graph(&["a"], &[("ghost", "a")]);
    let stats = traverse(&g, "a", Direction::Upstream, input_edges, |_, _| Visit::Descend);
    assert_eq!(stats.visited, 1);
    let missing = traverse(&g, "nope", Direction::Upstream, input_edges, |_, _| Visit::Descend);
    assert_eq!(missing.visited, 0);
}

#[test]
fn non_input_handles_are_ignored() {
    let mut edge = Edge::input("e0", "a", "b");
    edge.target_handle = Some("style".to_owned());
    let g = GraphSnapshot::new(
        vec![
            Node::new("a", NodeKind::LayerImage),
            Node::new("b", NodeKind::LayerOnOff),
        ],
        vec![edge],
    );
    assert_eq!(order(&g, "b"), ["b"]);
    assert_eq!(reachable(&g, "a", Direction::Downstream), [NodeId::from("b")]);
}

#[test]
fn first_input_chain_is_linear_and_cycle_safe() {
    let g = graph(
        &["a", "b", "c", "t"],
        &[("c", "t"), ("b", "c"), ("a", "b"), ("t", "a")],
    );
    let ids: Vec<_> = first_input_chain(&g, "t")
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(ids, ["c", "b", "a"]);
}
