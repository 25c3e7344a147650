use crate::config::layers::LayerConfig;
use crate::foundation::ids::LayerSlotId;
use crate::graph::model::{LayerKind, NodeData, TimelineFrame, TimelineLayer};
use crate::graph::store::GraphSnapshot;
use crate::traverse::chain::first_input_chain;
use std::collections::BTreeMap;

/// Frames for the timeline node `timeline`.
///
/// Walks the first-input chain, keeps image producers that have a URL (oldest
/// first) and emits a frame every time a non-background slot changes. Each frame
/// holds the latest image per slot, sorted by z. The background is the lowest-z
/// configured slot; updating it alone does not start a frame.
pub fn build_frames(
    graph: &GraphSnapshot,
    config: &LayerConfig,
    timeline: &str,
) -> Vec<TimelineFrame> {
    let background = config.background_slot();
    let mut chain = first_input_chain(graph, timeline);
    chain.reverse();

    let mut latest: BTreeMap<LayerSlotId, TimelineLayer> = BTreeMap::new();
    let mut frames = Vec::new();

    for node in chain {
        let NodeData::LayerImage(p) = &node.data else {
            continue;
        };
        let Some(url) = p.content.image_url.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        let slot = p.slot(LayerKind::Image);
        let Some(slot_cfg) = config.slot(&slot) else {
            continue;
        };

        latest.insert(
            slot.clone(),
            TimelineLayer {
                id: node.id.clone(),
                slot: slot.clone(),
                image_url: url.to_owned(),
                x: p.x.unwrap_or(0.0),
                y: p.y.unwrap_or(0.0),
                scale: p.scale.unwrap_or(1.0),
                z_index: slot_cfg.z,
            },
        );

        if Some(&slot) != background {
            let mut layers: Vec<TimelineLayer> = latest.values().cloned().collect();
            layers.sort_by_key(|l| l.z_index);
            frames.push(TimelineFrame {
                layers,
                background_width: p.background_width.unwrap_or(config.canvas.width),
                background_height: p.background_height.unwrap_or(config.canvas.height),
            });
        }
    }

    frames
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/frames.rs"]
mod tests;
