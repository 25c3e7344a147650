use crate::config::layers::LayerConfig;
use crate::foundation::ids::{LayerSlotId, NodeId};
use crate::graph::model::{NodeData, ResolvedLayer};
use crate::graph::store::GraphSnapshot;
use crate::producer::resolve::producer_layer;
use crate::traverse::chain::{Direction, Visit, input_edges, traverse};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Result of the two-pass upstream collection feeding a preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamLayers {
    /// ON layers, sorted by `z_index`, unique by slot.
    pub layers: Vec<ResolvedLayer>,
    /// Merged visibility of every slot any upstream controller reports.
    pub layer_states: BTreeMap<LayerSlotId, bool>,
    /// Whether any cascade (or nested preview with states) was found upstream.
    pub found_controller: bool,
}

/// Layers feeding the cascade `start`.
///
/// Producers contribute their resolved layer. A nested cascade contributes its
/// published `outputLayers` and hides everything above it, so a downstream cascade
/// only sees what the upstream one let through.
#[tracing::instrument(level = "trace", skip(graph, config))]
pub fn collect_chain_layers(
    graph: &GraphSnapshot,
    config: &LayerConfig,
    start: &str,
) -> Vec<ResolvedLayer> {
    let mut collected = Vec::new();
    let mut seen_nodes: HashSet<NodeId> = HashSet::new();

    traverse(graph, start, Direction::Upstream, input_edges, |node, depth| {
        if depth == 0 {
            return Visit::Descend;
        }
        match &node.data {
            NodeData::LayerOnOff(c) => {
                for layer in &c.output_layers {
                    if seen_nodes.insert(layer.node_id.clone()) {
                        collected.push(layer.clone());
                    }
                }
                Visit::Prune
            }
            NodeData::LayerImage(_) | NodeData::LayerText(_) => {
                if let Some(layer) = producer_layer(node, config)
                    && seen_nodes.insert(layer.node_id.clone())
                {
                    collected.push(layer);
                }
                Visit::Descend
            }
            _ => Visit::Descend,
        }
    });

    sort_and_dedupe(collected)
}

/// Layers a preview displays, found in two upstream passes.
///
/// Pass one merges the explicit states every upstream cascade holds for the slots
/// it currently carries: a slot is ON only if no cascade reports it OFF. Config
/// defaults fill only slots no cascade has an entry for. With no cascade upstream
/// nothing is shown.
/// Pass two collects producers for the ON slots and stops once each is matched.
/// Nested previews are boundaries: their merged states join pass one and their
/// display layers are reused in pass two.
#[tracing::instrument(level = "trace", skip(graph, config))]
pub fn collect_all_upstream_layers(
    graph: &GraphSnapshot,
    config: &LayerConfig,
    start: &str,
) -> UpstreamLayers {
    let mut merged: BTreeMap<LayerSlotId, bool> = BTreeMap::new();
    let mut found = false;

    let mut merge = |states: BTreeMap<LayerSlotId, bool>| {
        for (slot, on) in states {
            let entry = merged.entry(slot).or_insert(true);
            *entry = *entry && on;
        }
    };

    traverse(graph, start, Direction::Upstream, input_edges, |node, depth| {
        if depth == 0 {
            return Visit::Descend;
        }
        match &node.data {
            NodeData::LayerOnOff(c) => {
                found = true;
                merge(c.current_states());
                Visit::Descend
            }
            NodeData::LayerPreview(p) => {
                if !p.layer_states.is_empty() {
                    found = true;
                    merge(p.layer_states.clone());
                }
                Visit::Prune
            }
            _ => Visit::Descend,
        }
    });

    if !found {
        tracing::debug!(preview = start, "no visibility controller upstream");
        return UpstreamLayers::default();
    }
    for (id, slot) in &config.layers {
        merged.entry(id.clone()).or_insert(slot.enabled);
    }

    let mut pending: BTreeSet<LayerSlotId> = merged
        .iter()
        .filter(|(_, on)| **on)
        .map(|(slot, _)| slot.clone())
        .collect();
    let mut collected = Vec::new();
    let mut seen_nodes: HashSet<NodeId> = HashSet::new();

    if !pending.is_empty() {
        traverse(graph, start, Direction::Upstream, input_edges, |node, depth| {
            if pending.is_empty() {
                return Visit::Halt;
            }
            if depth == 0 {
                return Visit::Descend;
            }
            let verdict = match &node.data {
                NodeData::LayerPreview(p) => {
                    for layer in &p.layers {
                        if pending.remove(&layer.id) && seen_nodes.insert(layer.node_id.clone()) {
                            collected.push(layer.clone());
                        }
                    }
                    Visit::Prune
                }
                NodeData::LayerImage(_) | NodeData::LayerText(_) => {
                    if let Some(layer) = producer_layer(node, config)
                        && pending.contains(&layer.id)
                        && seen_nodes.insert(layer.node_id.clone())
                    {
                        pending.remove(&layer.id);
                        collected.push(layer);
                    }
                    Visit::Descend
                }
                _ => Visit::Descend,
            };
            if pending.is_empty() { Visit::Halt } else { verdict }
        });
    }

    if !pending.is_empty() {
        tracing::debug!(preview = start, unmatched = pending.len(), "ON slots without producer");
    }

    UpstreamLayers {
        layers: sort_and_dedupe(collected),
        layer_states: merged,
        found_controller: true,
    }
}

/// Stable sort by `z_index`, then keep the first layer per slot.
pub fn sort_and_dedupe(mut layers: Vec<ResolvedLayer>) -> Vec<ResolvedLayer> {
    layers.sort_by_key(|l| l.z_index);
    let mut seen: HashSet<LayerSlotId> = HashSet::new();
    layers.retain(|l| seen.insert(l.id.clone()));
    layers
}

#[cfg(test)]
#[path = "../../tests/unit/collect/layers.rs"]
mod tests;
