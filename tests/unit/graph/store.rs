use super::*;
use crate::graph::model::NodeKind;

fn sample() -> GraphStore {
    let doc = WorkflowDoc {
        nodes: vec![
            Node::new("a", NodeKind::LayerImage),
            Node::new("b", NodeKind::LayerOnOff),
            Node::new("c", NodeKind::LayerPreview),
        ],
        edges: vec![
            Edge::input("e1", "a", "b"),
            Edge::input("e2", "b", "c"),
            Edge::input("e3", "a", "c"),
        ],
        ..WorkflowDoc::default()
    };
    GraphStore::from_doc(doc)
}

#[test]
fn incoming_edges_follow_array_order() {
    let store = sample();
    let snap = store.snapshot();
    let sources: Vec<_> = snap.incoming("c").map(|e| e.source.as_str()).collect();
    assert_eq!(sources, ["b", "a"]);
    assert_eq!(snap.outgoing("a").count(), 2);
    assert_eq!(snap.incoming("nope").count(), 0);
}

#[test]
fn held_snapshot_is_unaffected_by_mutation() {
    let mut store = sample();
    let before = store.snapshot();
    store.remove_node("b").unwrap();
    assert!(before.node("b").is_some());
    assert_eq!(before.edges().len(), 3);

    let after = store.snapshot();
    assert!(after.node("b").is_none());
    let ids: Vec<_> = after.edges().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e3"]);
    assert_eq!(store.version(), 1);
}

#[test]
fn update_node_clears_cached_fingerprint() {
    let mut store = sample();
    let mut nodes = store.current().nodes().to_vec();
    nodes[0].fingerprint = Some(crate::engine::fingerprint::Fingerprint { hi: 1, lo: 2 });
    let next = store.current().with_nodes(nodes);
    store.publish(next);

    store
        .update_node("a", |n| n.position.x = 5.0)
        .unwrap();
    let a = store.current().node("a").unwrap();
    assert_eq!(a.position.x, 5.0);
    assert!(a.fingerprint.is_none());
}

#[test]
fn unknown_ids_and_duplicates_are_rejected() {
    let mut store = sample();
    assert!(store.update_node("zzz", |_| ()).is_err());
    assert!(store.add_node(Node::new("a", NodeKind::LayerText)).is_err());
    assert!(store.add_edge(Edge::input("e1", "x", "y")).is_err());
    assert!(store.remove_edge(&EdgeId::from("nope")).is_err());

    store.add_edge(Edge::input("e4", "ghost", "c")).unwrap();
    assert_eq!(store.current().incoming("c").count(), 3);
    store.remove_edge(&EdgeId::from("e4")).unwrap();
    assert_eq!(store.current().incoming("c").count(), 2);
}

#[test]
fn to_doc_keeps_top_level_fields() {
    let mut doc = WorkflowDoc {
        nodes: vec![Node::new("a", NodeKind::LayerImage)],
        ..WorkflowDoc::default()
    };
    doc.extra.insert("version".to_owned(), Value::from(2));
    let mut store = GraphStore::from_doc(doc);
    store.add_node(Node::new("b", NodeKind::LayerPreview)).unwrap();

    let out = store.to_doc();
    assert_eq!(out.nodes.len(), 2);
    assert_eq!(out.extra.get("version"), Some(&Value::from(2)));
    assert!(store.snapshot().to_doc().extra.is_empty());
}
