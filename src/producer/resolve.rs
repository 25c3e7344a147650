//! Producer nodes (`layerImage`, `layerText`): resolve raw content plus styles
//! into the `output` record downstream nodes read, and expose producers as
//! [`ResolvedLayer`]s for the collectors.

use crate::config::layers::LayerConfig;
use crate::config::style::{
    BoxStyle, ImageStyle, ScaleMode, StyleBook, resolve_image_layout, resolve_text_layout,
};
use crate::foundation::ids::LayerSlotId;
use crate::graph::model::{
    LayerKind, LayerPayload, Node, NodeData, ProducerData, ProducerOutput, ResolvedLayer,
};
use crate::graph::store::GraphSnapshot;
use kurbo::{Rect, Size};

/// The layer a producer contributes, or `None` when it has a media error or its
/// slot is not configured.
///
/// Content comes from the published `output` when present, else from the node's
/// raw data.
pub fn producer_layer(node: &Node, config: &LayerConfig) -> Option<ResolvedLayer> {
    let (kind, data) = node.as_producer()?;
    if let Some(err) = &data.media_error {
        tracing::debug!(node = %node.id, error = %err, "skipping producer with media error");
        return None;
    }
    let slot = data.slot(kind);
    let Some(slot_cfg) = config.slot(&slot) else {
        tracing::debug!(node = %node.id, slot = %slot, "skipping producer with unconfigured slot");
        return None;
    };
    let payload = match &data.output {
        Some(out) => out.payload.clone(),
        None => data.content.clone(),
    };
    Some(ResolvedLayer {
        name: config.label_of(&slot),
        id: slot,
        kind,
        z_index: slot_cfg.z,
        node_id: node.id.clone(),
        data: payload,
        visible: None,
        passed_through: false,
    })
}

/// Derived producer data for `node` against the snapshot `graph`, or `None` for
/// non-producers.
pub fn resolve_producer(
    graph: &GraphSnapshot,
    config: &LayerConfig,
    styles: &StyleBook,
    node: &Node,
) -> Option<ProducerData> {
    let (kind, data) = node.as_producer()?;
    let mut next = data.clone();

    if kind == LayerKind::Image {
        inherit_image_source(graph, node, &mut next);
    }

    let slot = next.slot(kind);
    next.output = if upstream_visible(graph, node, &slot) {
        let payload = match kind {
            LayerKind::Image => image_payload(&next, config, styles),
            LayerKind::Text => text_payload(&next, config, styles),
        };
        Some(ProducerOutput {
            id: slot.clone(),
            kind,
            layer_id: slot.clone(),
            node_id: node.id.clone(),
            z_index: config.slot(&slot).map_or(0, |s| s.z),
            visible: true,
            source_type: kind.source_type().to_owned(),
            payload,
        })
    } else {
        None
    };
    Some(next)
}

fn first_input_source<'a>(graph: &'a GraphSnapshot, node: &Node) -> Option<&'a Node> {
    let edge = graph.incoming(node.id.as_str()).find(|e| e.is_input())?;
    graph.node(edge.source.as_str())
}

fn inherit_image_source(graph: &GraphSnapshot, node: &Node, data: &mut ProducerData) {
    let Some(source) = first_input_source(graph, node) else {
        return;
    };
    if let Some((path, url)) = source.data.image_source()
        && data.content.image_path.as_deref() != Some(path)
    {
        data.content.image_path = Some(path.to_owned());
        data.content.image_url = url.map(str::to_owned);
    }
}

/// Visibility a producer inherits from its direct input.
///
/// From a cascade: visible iff the cascade lets the slot through. From a node that
/// publishes an `output`: its `visible` flag. Anything else: visible.
fn upstream_visible(graph: &GraphSnapshot, node: &Node, slot: &LayerSlotId) -> bool {
    let Some(source) = first_input_source(graph, node) else {
        return true;
    };
    match &source.data {
        NodeData::LayerOnOff(c) => c.output_layers.iter().any(|l| &l.id == slot),
        NodeData::LayerImage(p) | NodeData::LayerText(p) => {
            p.output.as_ref().is_none_or(|o| o.visible)
        }
        _ => true,
    }
}

fn fallback_rect(data: &ProducerData, canvas: Size) -> Rect {
    let c = &data.content;
    Rect::from_origin_size(
        (c.display_x.unwrap_or(0.0), c.display_y.unwrap_or(0.0)),
        (
            c.display_width.unwrap_or(canvas.width),
            c.display_height.unwrap_or(canvas.height),
        ),
    )
}

fn image_payload(data: &ProducerData, config: &LayerConfig, styles: &StyleBook) -> LayerPayload {
    let c = &data.content;
    let canvas = config.canvas.to_size();
    let style: Option<&ImageStyle> = c
        .image_style_id
        .as_ref()
        .and_then(|id| styles.image.get(id));

    let intrinsic = match (data.image_width, data.image_height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(Size::new(f64::from(w), f64::from(h))),
        _ => None,
    };
    let rect = match (style, intrinsic) {
        (Some(s), Some(size)) => resolve_image_layout(&s.layout, canvas, size),
        _ => fallback_rect(data, canvas),
    };

    LayerPayload {
        image_url: c.image_url.clone(),
        image_path: c.image_path.clone(),
        image_style_id: c.image_style_id.clone(),
        display_x: Some(rect.x0),
        display_y: Some(rect.y0),
        display_width: Some(rect.width()),
        display_height: Some(rect.height()),
        opacity: Some(
            style
                .and_then(|s| s.opacity)
                .or(c.opacity)
                .unwrap_or(1.0),
        ),
        blend_mode: Some(
            style
                .and_then(|s| s.blend_mode.clone())
                .or_else(|| c.blend_mode.clone())
                .unwrap_or_else(|| "normal".to_owned()),
        ),
        scale_mode: Some(
            style
                .and_then(|s| s.scale_mode)
                .or(c.scale_mode)
                .unwrap_or(ScaleMode::Cover),
        ),
        filters: Some(
            style
                .and_then(|s| s.filters)
                .or(c.filters)
                .unwrap_or_default(),
        ),
        box_style: Some(
            style
                .and_then(|s| s.box_style.clone())
                .or_else(|| c.box_style.clone())
                .unwrap_or_else(BoxStyle::default),
        ),
        ..LayerPayload::default()
    }
}

fn text_payload(data: &ProducerData, config: &LayerConfig, styles: &StyleBook) -> LayerPayload {
    let c = &data.content;
    let canvas = config.canvas.to_size();
    let style = c.style_id.as_ref().and_then(|id| styles.text.get(id));

    let rect = match style {
        Some(s) => resolve_text_layout(&s.layout, canvas),
        None => fallback_rect(data, canvas),
    };

    LayerPayload {
        text: c.text.clone(),
        character_name: c.character_name.clone(),
        style_id: c.style_id.clone(),
        text_style: style.map(|s| s.to_value()).or_else(|| c.text_style.clone()),
        display_x: Some(rect.x0),
        display_y: Some(rect.y0),
        display_width: Some(rect.width()),
        display_height: Some(rect.height()),
        opacity: c.opacity,
        blend_mode: c.blend_mode.clone(),
        filters: c.filters,
        ..LayerPayload::default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/producer/resolve.rs"]
mod tests;
