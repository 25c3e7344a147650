use crate::collect::layers::{UpstreamLayers, collect_all_upstream_layers};
use crate::config::layers::{CanvasSize, LayerConfig};
use crate::config::style::{Filters, ScaleMode};
use crate::foundation::ids::{LayerSlotId, NodeId};
use crate::graph::model::{LayerKind, ResolvedLayer};
use crate::graph::store::GraphSnapshot;
use serde::{Deserialize, Serialize};

/// Layers the preview `preview` displays, each stamped visible, with the merged
/// upstream states.
pub fn display_layers(
    graph: &GraphSnapshot,
    config: &LayerConfig,
    preview: &str,
) -> UpstreamLayers {
    let mut up = collect_all_upstream_layers(graph, config, preview);
    for layer in &mut up.layers {
        layer.visible = Some(true);
    }
    up
}

/// What a render item draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderContent {
    /// A bitmap.
    Image {
        /// Image URL.
        url: String,
        /// Fit mode inside the box.
        #[serde(rename = "scaleMode")]
        scale_mode: ScaleMode,
        /// Color adjustments, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filters: Option<Filters>,
    },
    /// A text block.
    Text {
        /// Body text; empty when unset.
        text: String,
        /// Speaker name.
        #[serde(
            default,
            rename = "characterName",
            skip_serializing_if = "Option::is_none"
        )]
        character_name: Option<String>,
        /// Opaque text style (font, box, ...).
        #[serde(default, rename = "textStyle")]
        text_style: serde_json::Value,
    },
}

/// One positioned item in a preview frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderItem {
    /// Slot drawn into.
    pub slot: LayerSlotId,
    /// Producer node.
    pub node_id: NodeId,
    /// Paint order.
    pub z_index: i32,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box width; `None` means intrinsic.
    pub width: Option<f64>,
    /// Box height; `None` means intrinsic.
    pub height: Option<f64>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// CSS blend mode.
    pub blend_mode: String,
    /// Payload.
    pub content: RenderContent,
}

/// Ordered draw list for one preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewFrame {
    /// Canvas the items are placed on.
    pub canvas: CanvasSize,
    /// Items bottom to top.
    pub items: Vec<RenderItem>,
}

/// Turn display layers into a draw list.
///
/// Geometry and style are carried verbatim from the producers; only missing values
/// get render defaults. Image layers without a URL are dropped.
pub fn render_frame(config: &LayerConfig, layers: &[ResolvedLayer]) -> PreviewFrame {
    let mut items: Vec<RenderItem> = layers
        .iter()
        .filter(|l| l.visible != Some(false))
        .filter_map(render_item)
        .collect();
    items.sort_by_key(|i| i.z_index);
    PreviewFrame {
        canvas: config.canvas,
        items,
    }
}

fn render_item(layer: &ResolvedLayer) -> Option<RenderItem> {
    let d = &layer.data;
    let content = match layer.kind {
        LayerKind::Image => RenderContent::Image {
            url: d.image_url.clone().filter(|u| !u.is_empty())?,
            scale_mode: d.scale_mode.unwrap_or_default(),
            filters: d.filters,
        },
        LayerKind::Text => RenderContent::Text {
            text: d.text.clone().unwrap_or_default(),
            character_name: d.character_name.clone(),
            text_style: d.text_style.clone().unwrap_or(serde_json::Value::Null),
        },
    };
    Some(RenderItem {
        slot: layer.id.clone(),
        node_id: layer.node_id.clone(),
        z_index: layer.z_index,
        x: d.display_x.unwrap_or(0.0),
        y: d.display_y.unwrap_or(0.0),
        width: d.display_width,
        height: d.display_height,
        opacity: d.opacity.unwrap_or(1.0),
        blend_mode: d.blend_mode.clone().unwrap_or_else(|| "normal".to_owned()),
        content,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/preview/aggregator.rs"]
mod tests;
