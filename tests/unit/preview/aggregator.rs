use super::*;
use crate::graph::model::LayerPayload;

fn layer(slot: &str, kind: LayerKind, z: i32, data: LayerPayload) -> ResolvedLayer {
    ResolvedLayer {
        id: LayerSlotId::from(slot),
        name: slot.to_owned(),
        kind,
        z_index: z,
        node_id: NodeId::from(format!("n_{slot}")),
        data,
        visible: Some(true),
        passed_through: false,
    }
}

#[test]
fn render_defaults_fill_missing_style() {
    let cfg = LayerConfig::default();
    let frame = render_frame(
        &cfg,
        &[layer(
            "bg_base",
            LayerKind::Image,
            0,
            LayerPayload {
                image_url: Some("file:///bg.png".to_owned()),
                ..LayerPayload::default()
            },
        )],
    );
    assert_eq!(frame.canvas, cfg.canvas);
    let item = &frame.items[0];
    assert_eq!((item.x, item.y), (0.0, 0.0));
    assert_eq!(item.width, None);
    assert_eq!(item.opacity, 1.0);
    assert_eq!(item.blend_mode, "normal");
    assert_eq!(
        item.content,
        RenderContent::Image {
            url: "file:///bg.png".to_owned(),
            scale_mode: ScaleMode::Cover,
            filters: None,
        }
    );
}

#[test]
fn images_without_url_are_dropped() {
    let cfg = LayerConfig::default();
    let frame = render_frame(
        &cfg,
        &[
            layer("bg_base", LayerKind::Image, 0, LayerPayload::default()),
            layer(
                "text_main",
                LayerKind::Text,
                50,
                LayerPayload {
                    text: Some("Hi".to_owned()),
                    display_y: Some(540.0),
                    opacity: Some(0.0),
                    ..LayerPayload::default()
                },
            ),
        ],
    );
    assert_eq!(frame.items.len(), 1);
    let item = &frame.items[0];
    assert_eq!(item.slot.as_str(), "text_main");
    assert_eq!(item.y, 540.0);
    assert_eq!(item.opacity, 0.0);
}

#[test]
fn items_serialize_with_type_tag() {
    let cfg = LayerConfig::default();
    let frame = render_frame(
        &cfg,
        &[layer(
            "text_main",
            LayerKind::Text,
            50,
            LayerPayload {
                text: Some("Hi".to_owned()),
                ..LayerPayload::default()
            },
        )],
    );
    let v = serde_json::to_value(&frame).unwrap();
    assert_eq!(v["items"][0]["content"]["type"], "text");
    assert_eq!(v["items"][0]["zIndex"], 50);
    assert_eq!(v["canvas"]["width"], 1280);
}

#[test]
fn display_layers_are_stamped_visible() {
    use crate::graph::model::{CascadeData, Edge, Node, NodeData, NodeKind};

    let cfg = LayerConfig::default();
    let mut img = Node::new("img", NodeKind::LayerImage);
    img.as_producer_mut().unwrap().layer = Some("bg_base".into());
    let c = Node::with_data(
        "c",
        NodeData::LayerOnOff(CascadeData {
            layer_states: [("bg_base".into(), true)].into_iter().collect(),
            ..CascadeData::default()
        }),
    );
    let g = GraphSnapshot::new(
        vec![img, c, Node::new("p", NodeKind::LayerPreview)],
        vec![Edge::input("e1", "img", "c"), Edge::input("e2", "c", "p")],
    );
    let up = display_layers(&g, &cfg, "p");
    assert_eq!(up.layers.len(), 1);
    assert_eq!(up.layers[0].visible, Some(true));
}
