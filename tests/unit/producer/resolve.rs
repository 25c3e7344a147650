use super::*;
use crate::config::style::{PositionPreset, StyleLayout, TextStyle};
use crate::graph::model::{CascadeData, Edge, MediaSourceData, NodeKind};

fn image_node(id: &str, slot: &str) -> Node {
    let mut n = Node::new(id, NodeKind::LayerImage);
    if let Some(p) = n.as_producer_mut() {
        p.layer = Some(slot.into());
        p.content.image_url = Some(format!("file:///{id}.png"));
    }
    n
}

#[test]
fn producer_layer_reads_config_z_and_label() {
    let cfg = LayerConfig::default();
    let layer = producer_layer(&image_node("a", "image_main"), &cfg).unwrap();
    assert_eq!(layer.id.as_str(), "image_main");
    assert_eq!(layer.z_index, 20);
    assert_eq!(layer.name, "Image (main)");
    assert_eq!(layer.visible, None);
    assert_eq!(layer.data.image_url.as_deref(), Some("file:///a.png"));
}

#[test]
fn producer_layer_skips_errors_and_unknown_slots() {
    let cfg = LayerConfig::default();
    assert!(producer_layer(&image_node("a", "nowhere"), &cfg).is_none());

    let mut broken = image_node("b", "bg_base");
    broken.as_producer_mut().unwrap().media_error = Some("decode failed".to_owned());
    assert!(producer_layer(&broken, &cfg).is_none());
}

#[test]
fn output_uses_canvas_fallback_and_render_defaults() {
    let cfg = LayerConfig::default();
    let node = image_node("a", "bg_base");
    let g = GraphSnapshot::new(vec![node.clone()], vec![]);
    let data = resolve_producer(&g, &cfg, &StyleBook::default(), &node).unwrap();
    let out = data.output.unwrap();
    assert!(out.visible);
    assert_eq!(out.source_type, "layerImage");
    assert_eq!(out.z_index, 0);
    assert_eq!(out.payload.display_width, Some(1280.0));
    assert_eq!(out.payload.display_height, Some(720.0));
    assert_eq!(out.payload.opacity, Some(1.0));
    assert_eq!(out.payload.blend_mode.as_deref(), Some("normal"));
    assert_eq!(out.payload.scale_mode, Some(ScaleMode::Cover));
}

#[test]
fn image_style_layout_needs_intrinsic_size() {
    let cfg = LayerConfig::default();
    let mut styles = StyleBook::default();
    styles.image.insert(
        "half".to_owned(),
        ImageStyle {
            layout: StyleLayout {
                width_ratio: Some(0.5),
                height_ratio: Some(0.5),
                position_preset: Some(PositionPreset::TopLeft),
                ..StyleLayout::default()
            },
            opacity: Some(0.5),
            ..ImageStyle::default()
        },
    );
    let mut node = image_node("a", "image_main");
    {
        let p = node.as_producer_mut().unwrap();
        p.content.image_style_id = Some("half".to_owned());
        p.content.display_x = Some(7.0);
    }
    let g = GraphSnapshot::new(vec![node.clone()], vec![]);

    let before = resolve_producer(&g, &cfg, &styles, &node).unwrap().output.unwrap();
    assert_eq!(before.payload.display_x, Some(7.0));
    assert_eq!(before.payload.opacity, Some(0.5));

    {
        let p = node.as_producer_mut().unwrap();
        p.image_width = Some(800);
        p.image_height = Some(600);
    }
    let after = resolve_producer(&g, &cfg, &styles, &node).unwrap().output.unwrap();
    assert_eq!(after.payload.display_x, Some(0.0));
    assert_eq!(after.payload.display_width, Some(400.0));
    assert_eq!(after.payload.display_height, Some(300.0));
}

#[test]
fn text_style_resolves_bottom_band_and_forwards_style() {
    let cfg = LayerConfig::default();
    let mut styles = StyleBook::default();
    let style: TextStyle = serde_json::from_str(r#"{ "font": { "size": 30 } }"#).unwrap();
    styles.text.insert("dlg".to_owned(), style);

    let mut node = Node::new("t", NodeKind::LayerText);
    {
        let p = node.as_producer_mut().unwrap();
        p.content.text = Some("Hello".to_owned());
        p.content.style_id = Some("dlg".to_owned());
    }
    let g = GraphSnapshot::new(vec![node.clone()], vec![]);
    let out = resolve_producer(&g, &cfg, &styles, &node).unwrap().output.unwrap();
    assert_eq!(out.id.as_str(), "text_main");
    assert_eq!(out.payload.display_y, Some(540.0));
    assert_eq!(out.payload.display_height, Some(180.0));
    assert_eq!(out.payload.text_style.unwrap()["font"]["size"], 30);
    assert_eq!(out.payload.text.as_deref(), Some("Hello"));
}

#[test]
fn hidden_upstream_cascade_clears_output() {
    let cfg = LayerConfig::default();
    let cascade = Node::with_data("c", NodeData::LayerOnOff(CascadeData::default()));
    let node = image_node("a", "bg_base");
    let g = GraphSnapshot::new(
        vec![cascade, node.clone()],
        vec![Edge::input("e1", "c", "a")],
    );
    let data = resolve_producer(&g, &cfg, &StyleBook::default(), &node).unwrap();
    assert!(data.output.is_none());
}

#[test]
fn inherits_image_source_from_loader_node() {
    let cfg = LayerConfig::default();
    let loader = Node::with_data(
        "load",
        NodeData::LoadImage(MediaSourceData {
            image_path: Some("/tmp/bg.png".to_owned()),
            image_url: Some("file:///tmp/bg.png".to_owned()),
            ..MediaSourceData::default()
        }),
    );
    let node = image_node("a", "bg_base");
    let g = GraphSnapshot::new(
        vec![loader, node.clone()],
        vec![Edge::input("e1", "load", "a")],
    );
    let data = resolve_producer(&g, &cfg, &StyleBook::default(), &node).unwrap();
    assert_eq!(data.content.image_path.as_deref(), Some("/tmp/bg.png"));
    assert_eq!(
        data.output.unwrap().payload.image_url.as_deref(),
        Some("file:///tmp/bg.png")
    );
}
