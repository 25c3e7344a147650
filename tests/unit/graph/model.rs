use super::*;

#[test]
fn producer_node_parses_typed_fields_and_keeps_extras() {
    let json = r#"{
      "id": "img1",
      "type": "layerImage",
      "position": { "x": 10, "y": 20 },
      "data": {
        "layer": "bg_base",
        "imageUrl": "file:///bg.png",
        "imageWidth": 1920,
        "imageHeight": 1080,
        "displayX": 4,
        "label": "Background",
        "output": null
      }
    }"#;
    let node: Node = serde_json::from_str(json).unwrap();
    assert_eq!(node.kind(), NodeKind::LayerImage);
    let (kind, p) = node.as_producer().unwrap();
    assert_eq!(kind, LayerKind::Image);
    assert_eq!(p.slot(kind).as_str(), "bg_base");
    assert_eq!(p.content.image_url.as_deref(), Some("file:///bg.png"));
    assert_eq!(p.content.display_x, Some(4.0));
    assert_eq!(p.image_width, Some(1920));
    assert_eq!(p.extra["label"], "Background");
    assert!(p.output.is_none());

    let back = serde_json::to_value(&node).unwrap();
    assert_eq!(back["type"], "layerImage");
    assert_eq!(back["data"]["label"], "Background");
    assert_eq!(back["data"]["imageUrl"], "file:///bg.png");
    assert_eq!(back["position"]["y"], 20.0);
}

#[test]
fn producer_without_slot_uses_kind_default() {
    let p = ProducerData::default();
    assert_eq!(p.slot(LayerKind::Image).as_str(), "image_main");
    assert_eq!(p.slot(LayerKind::Text).as_str(), "text_main");
}

#[test]
fn unknown_node_type_round_trips_verbatim() {
    let json = r#"{ "id": "d1", "type": "dialogue", "data": { "lines": [1, 2] } }"#;
    let node: Node = serde_json::from_str(json).unwrap();
    assert_eq!(node.kind(), NodeKind::Other("dialogue".to_owned()));
    let back = serde_json::to_value(&node).unwrap();
    assert_eq!(back["type"], "dialogue");
    assert_eq!(back["data"]["lines"][1], 2);
}

#[test]
fn missing_data_defaults_to_empty_payload() {
    let node: Node = serde_json::from_str(r#"{ "id": "c", "type": "layerOnOff" }"#).unwrap();
    let c = node.as_cascade().unwrap();
    assert!(c.layer_states.is_empty());
    assert_eq!(c.active_tab, LayerTab::All);
    assert_eq!(c.phase, CascadePhase::Uninitialized);
}

#[test]
fn malformed_data_names_the_node() {
    let json = r#"{ "id": "bad", "type": "layerOnOff", "data": { "layerStates": 3 } }"#;
    let err = serde_json::from_str::<Node>(json).unwrap_err();
    assert!(err.to_string().contains("bad"));
}

#[test]
fn resolved_layer_omits_unset_flags() {
    let layer = ResolvedLayer {
        id: LayerSlotId::from("bg_base"),
        name: "BG".to_owned(),
        kind: LayerKind::Image,
        z_index: 0,
        node_id: NodeId::from("img1"),
        data: LayerPayload::default(),
        visible: None,
        passed_through: false,
    };
    let v = serde_json::to_value(&layer).unwrap();
    assert!(v.get("visible").is_none());
    assert!(v.get("passedThrough").is_none());
    assert_eq!(v["zIndex"], 0);
    assert_eq!(v["type"], "image");
}

#[test]
fn clear_derived_keeps_user_toggles() {
    let mut node = Node::new("c", NodeKind::LayerOnOff);
    {
        let c = node.as_cascade_mut().unwrap();
        c.layer_states.insert(LayerSlotId::from("bg_base"), false);
        c.output_layers.push(ResolvedLayer {
            id: LayerSlotId::from("bg_base"),
            name: String::new(),
            kind: LayerKind::Image,
            z_index: 0,
            node_id: NodeId::from("img1"),
            data: LayerPayload::default(),
            visible: Some(true),
            passed_through: true,
        });
    }
    node.clear_derived();
    let c = node.as_cascade().unwrap();
    assert!(c.output_layers.is_empty());
    assert_eq!(c.layer_states.get("bg_base"), Some(&false));
    assert_eq!(c.phase, CascadePhase::Seeded);
}

#[test]
fn edge_input_handle_filter() {
    let e = Edge::input("e1", "a", "b");
    assert!(e.is_input());
    let other = Edge {
        target_handle: Some("style".to_owned()),
        ..e
    };
    assert!(!other.is_input());
}

#[test]
fn validate_and_lint_workflow() {
    let mut doc = WorkflowDoc::default();
    doc.nodes.push(Node::new("a", NodeKind::LayerImage));
    doc.nodes.push(Node::new("b", NodeKind::LayerPreview));
    doc.edges.push(Edge::input("e1", "a", "b"));
    doc.edges.push(Edge::input("e2", "ghost", "b"));
    doc.validate().unwrap();
    let lint = doc.lint();
    assert_eq!(lint.len(), 1);
    assert!(lint[0].contains("ghost"));

    doc.nodes.push(Node::new("a", NodeKind::LayerText));
    let err = doc.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate node id 'a'"));
}

#[test]
fn patch_merges_over_wire_data() {
    let mut node = Node::new("t", NodeKind::LayerText);
    node.fingerprint = Some(Fingerprint { hi: 0, lo: 0 });
    let patch: Map<String, Value> =
        serde_json::from_str(r#"{ "text": "Hello", "layer": "text_main", "note": 1 }"#).unwrap();
    node.apply_patch(&patch).unwrap();
    let (_, p) = node.as_producer().unwrap();
    assert_eq!(p.content.text.as_deref(), Some("Hello"));
    assert_eq!(p.extra["note"], 1);
    assert!(node.fingerprint.is_none());

    let bad: Map<String, Value> = serde_json::from_str(r#"{ "imageWidth": "wide" }"#).unwrap();
    assert!(node.apply_patch(&bad).is_err());
    assert_eq!(node.as_producer().unwrap().1.content.text.as_deref(), Some("Hello"));
}
