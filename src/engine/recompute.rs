use crate::collect::layers::collect_chain_layers;
use crate::config::layers::LayerConfig;
use crate::config::style::StyleBook;
use crate::engine::fingerprint::fingerprint_derived;
use crate::foundation::ids::NodeId;
use crate::graph::model::{Node, NodeData};
use crate::graph::store::{GraphSnapshot, GraphStore};
use crate::preview::aggregator::display_layers;
use crate::producer::resolve::resolve_producer;
use crate::timeline::frames::build_frames;

/// Read-only inputs of a recompute: the slot registry and the style tables.
#[derive(Debug, Clone, Default)]
pub struct RecomputeContext {
    /// Layer configuration.
    pub config: LayerConfig,
    /// Image and text styles.
    pub styles: StyleBook,
}

impl RecomputeContext {
    /// Context with the given config and no styles.
    pub fn new(config: LayerConfig) -> Self {
        Self {
            config,
            styles: StyleBook::default(),
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutcome {
    /// Nodes whose derived state changed, in node order.
    pub changed: Vec<NodeId>,
}

/// Outcome of [`settle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettleReport {
    /// Passes run, including the final quiet pass.
    pub passes: usize,
    /// Every node changed by any pass, first change first.
    pub changed: Vec<NodeId>,
    /// `false` when the pass cap was hit before a quiet pass.
    pub converged: bool,
}

/// Derive `node`'s state from `graph` without touching anything else.
pub fn derive_node(graph: &GraphSnapshot, ctx: &RecomputeContext, node: &Node) -> Option<NodeData> {
    let id = node.id.as_str();
    let data = match &node.data {
        NodeData::LayerImage(_) => {
            NodeData::LayerImage(resolve_producer(graph, &ctx.config, &ctx.styles, node)?)
        }
        NodeData::LayerText(_) => {
            NodeData::LayerText(resolve_producer(graph, &ctx.config, &ctx.styles, node)?)
        }
        NodeData::LayerOnOff(c) => {
            let upstream = collect_chain_layers(graph, &ctx.config, id);
            NodeData::LayerOnOff(c.refreshed(upstream, &ctx.config))
        }
        NodeData::LayerPreview(p) => {
            let up = display_layers(graph, &ctx.config, id);
            let mut next = p.clone();
            next.layers = up.layers;
            next.layer_states = up.layer_states;
            NodeData::LayerPreview(next)
        }
        NodeData::LayerTimeline(t) => {
            let mut next = t.clone();
            next.frames = build_frames(graph, &ctx.config, id);
            NodeData::LayerTimeline(next)
        }
        NodeData::LoadImage(_) | NodeData::LoadVideo(_) | NodeData::Other { .. } => return None,
    };
    Some(data)
}

/// One recompute pass over `graph`.
///
/// Every node derives from `graph` alone, so results do not depend on node order.
/// A node is rewritten only when the fingerprint of its derived state changes.
/// Returns `None` when nothing changed.
pub fn recompute_pass(
    graph: &GraphSnapshot,
    ctx: &RecomputeContext,
) -> Option<(GraphSnapshot, PassOutcome)> {
    let mut next: Option<Vec<Node>> = None;
    let mut outcome = PassOutcome::default();

    for (i, node) in graph.nodes().iter().enumerate() {
        let Some(data) = derive_node(graph, ctx, node) else {
            continue;
        };
        let candidate = Node {
            data,
            fingerprint: None,
            ..node.clone()
        };
        let new_fp = fingerprint_derived(&candidate);
        let old_fp = node.fingerprint.or_else(|| fingerprint_derived(node));
        if new_fp == old_fp {
            continue;
        }

        let nodes = next.get_or_insert_with(|| graph.nodes().to_vec());
        nodes[i] = Node {
            fingerprint: new_fp,
            ..candidate
        };
        outcome.changed.push(node.id.clone());
    }

    next.map(|nodes| (graph.with_nodes(nodes), outcome))
}

/// Run passes until one changes nothing.
///
/// Capped at `2 * nodes + 2` passes; hitting the cap is logged and reported, the store
/// keeps the last published state.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = store.current().nodes().len()))]
pub fn settle(store: &mut GraphStore, ctx: &RecomputeContext) -> SettleReport {
    let cap = 2 * store.current().nodes().len() + 2;
    let mut report = SettleReport::default();

    while report.passes < cap {
        report.passes += 1;
        let Some((next, outcome)) = recompute_pass(store.current(), ctx) else {
            report.converged = true;
            break;
        };
        for id in outcome.changed {
            if !report.changed.contains(&id) {
                report.changed.push(id);
            }
        }
        store.publish(next);
    }

    if report.converged {
        tracing::debug!(passes = report.passes, changed = report.changed.len(), "graph settled");
    } else {
        tracing::warn!(passes = report.passes, "recompute did not settle within pass cap");
    }
    report
}

#[cfg(test)]
#[path = "../../tests/unit/engine/recompute.rs"]
mod tests;
