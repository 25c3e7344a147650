//! Event dispatcher owning the graph store.
//!
//! Every edit arrives as an [`EditorEvent`]. The editor applies it to a fresh
//! snapshot, settles the graph and reports what changed.

use crate::config::layers::{LayerConfig, LayerTab, TabCount};
use crate::config::style::StyleBook;
use crate::engine::recompute::{RecomputeContext, settle};
use crate::foundation::error::{LayerflowError, LayerflowResult};
use crate::foundation::ids::{EdgeId, LayerSlotId, NodeId};
use crate::graph::model::{CascadeData, Edge, Node, NodeData, WorkflowDoc};
use crate::graph::store::{GraphSnapshot, GraphStore};
use crate::media::loader::{DrawToken, DrawTokens, LoadedMedia, MediaJob, MediaKind, MediaLoader};
use crate::preview::aggregator::{PreviewFrame, render_frame};
use crate::traverse::chain::{Direction, reachable};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

/// A graph edit.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// A node was created.
    NodeAdded(Node),
    /// A node was deleted along with its edges.
    NodeRemoved(NodeId),
    /// Two nodes were connected.
    EdgeConnected(Edge),
    /// A connection was deleted.
    EdgeRemoved(EdgeId),
    /// A producer's user fields changed.
    ProducerUpdated {
        /// Producer node.
        node: NodeId,
        /// Wire fields merged over the node's `data`.
        patch: Map<String, Value>,
    },
    /// One slot of a cascade was flipped.
    LayerToggled {
        /// Cascade node.
        node: NodeId,
        /// Slot to flip.
        slot: LayerSlotId,
    },
    /// Every slot of a cascade's active tab was set.
    LayersToggled {
        /// Cascade node.
        node: NodeId,
        /// New state.
        visible: bool,
    },
    /// A cascade's filter tab changed.
    TabSelected {
        /// Cascade node.
        node: NodeId,
        /// New tab.
        tab: LayerTab,
    },
    /// A queued media load finished.
    MediaLoaded {
        /// Ticket of the request.
        token: DrawToken,
        /// Loaded media.
        media: LoadedMedia,
    },
    /// A queued media load failed.
    MediaFailed {
        /// Ticket of the request.
        token: DrawToken,
        /// Failure message.
        error: String,
    },
}

impl EditorEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeAdded(_) => "node_added",
            Self::NodeRemoved(_) => "node_removed",
            Self::EdgeConnected(_) => "edge_connected",
            Self::EdgeRemoved(_) => "edge_removed",
            Self::ProducerUpdated { .. } => "producer_updated",
            Self::LayerToggled { .. } => "layer_toggled",
            Self::LayersToggled { .. } => "layers_toggled",
            Self::TabSelected { .. } => "tab_selected",
            Self::MediaLoaded { .. } => "media_loaded",
            Self::MediaFailed { .. } => "media_failed",
        }
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Nodes whose derived state changed while settling.
    pub changed: Vec<NodeId>,
    /// Recompute passes run.
    pub passes: usize,
    /// A preview changed and must be redrawn.
    pub needs_render: bool,
}

impl DispatchOutcome {
    fn merge(&mut self, other: Self) {
        for id in other.changed {
            if !self.changed.contains(&id) {
                self.changed.push(id);
            }
        }
        self.passes += other.passes;
        self.needs_render |= other.needs_render;
    }
}

/// Single mutation authority over a workflow graph.
#[derive(Debug, Default)]
pub struct Editor {
    store: GraphStore,
    ctx: RecomputeContext,
    tokens: DrawTokens,
    pending: VecDeque<MediaJob>,
}

impl Editor {
    /// Empty editor.
    pub fn new(config: LayerConfig, styles: StyleBook) -> Self {
        Self {
            ctx: RecomputeContext { config, styles },
            ..Self::default()
        }
    }

    /// Layer configuration in use.
    pub fn config(&self) -> &LayerConfig {
        &self.ctx.config
    }

    /// Replace the graph with `doc`.
    ///
    /// Persisted derived fields are dropped and re-derived; cascade `layerStates`
    /// are kept as prior toggles. Pending media jobs are discarded.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(nodes = doc.nodes.len(), edges = doc.edges.len())
    )]
    pub fn load(&mut self, mut doc: WorkflowDoc) -> LayerflowResult<DispatchOutcome> {
        doc.validate()?;
        for warning in doc.lint() {
            tracing::warn!("{warning}");
        }
        for node in &mut doc.nodes {
            node.clear_derived();
        }
        self.store = GraphStore::from_doc(doc);
        self.tokens = DrawTokens::default();
        self.pending.clear();
        Ok(self.settle())
    }

    /// Current graph as a workflow document.
    pub fn export(&self) -> WorkflowDoc {
        self.store.to_doc()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> GraphSnapshot {
        self.store.snapshot()
    }

    /// Apply `event` and settle.
    #[tracing::instrument(level = "debug", skip_all, fields(event = event.name()))]
    pub fn dispatch(&mut self, event: EditorEvent) -> LayerflowResult<DispatchOutcome> {
        match event {
            EditorEvent::NodeAdded(node) => self.store.add_node(node)?,
            EditorEvent::NodeRemoved(id) => {
                self.store.remove_node(id.as_str())?;
                self.tokens.forget(id.as_str());
                self.pending.retain(|job| job.token.node != id);
            }
            EditorEvent::EdgeConnected(edge) => self.store.add_edge(edge)?,
            EditorEvent::EdgeRemoved(id) => {
                self.store.remove_edge(&id)?;
            }
            EditorEvent::ProducerUpdated { node, patch } => {
                let snapshot = self.store.current();
                let current = snapshot
                    .node(node.as_str())
                    .ok_or_else(|| LayerflowError::validation(format!("unknown node '{node}'")))?;
                if current.as_producer().is_none() {
                    return Err(LayerflowError::validation(format!(
                        "node '{node}' is not a layer producer"
                    )));
                }
                let mut next = current.clone();
                next.apply_patch(&patch)?;
                tracing::debug!(node = %node, "producer updated");
                self.store.update_node(node.as_str(), |n| *n = next)?;
            }
            EditorEvent::LayerToggled { node, slot } => {
                let config = &self.ctx.config;
                let on = with_cascade(&mut self.store, &node, |c| c.toggle_layer(&slot, config))?;
                tracing::debug!(node = %node, slot = %slot, on, "layer toggled");
            }
            EditorEvent::LayersToggled { node, visible } => {
                let config = &self.ctx.config;
                with_cascade(&mut self.store, &node, |c| c.toggle_all(visible, config))?;
            }
            EditorEvent::TabSelected { node, tab } => {
                with_cascade(&mut self.store, &node, |c| c.select_tab(tab))?;
            }
            EditorEvent::MediaLoaded { token, media } => {
                if !self.accept(&token) {
                    return Ok(DispatchOutcome::default());
                }
                self.store
                    .update_node(token.node.as_str(), |n| apply_media(n, &media))?;
            }
            EditorEvent::MediaFailed { token, error } => {
                if !self.accept(&token) {
                    return Ok(DispatchOutcome::default());
                }
                tracing::warn!(node = %token.node, %error, "media load failed");
                self.store
                    .update_node(token.node.as_str(), |n| set_media_error(n, error))?;
            }
        }
        Ok(self.settle())
    }

    /// Queue a load of `path` for `node`. Earlier requests for the node go stale.
    pub fn request_media(
        &mut self,
        node: &NodeId,
        kind: MediaKind,
        path: impl Into<PathBuf>,
    ) -> LayerflowResult<DrawToken> {
        if self.store.current().node(node.as_str()).is_none() {
            return Err(LayerflowError::validation(format!("unknown node '{node}'")));
        }
        let token = self.tokens.issue(node);
        self.pending.push_back(MediaJob {
            token: token.clone(),
            kind,
            path: path.into(),
        });
        Ok(token)
    }

    /// Number of queued media jobs.
    pub fn pending_media(&self) -> usize {
        self.pending.len()
    }

    /// Run every queued job through `loader` and dispatch the completions.
    ///
    /// Load failures are recorded on the node, not returned.
    pub fn run_media_jobs(&mut self, loader: &dyn MediaLoader) -> LayerflowResult<DispatchOutcome> {
        let mut total = DispatchOutcome::default();
        while let Some(job) = self.pending.pop_front() {
            let event = match loader.load(job.kind, &job.path) {
                Ok(media) => EditorEvent::MediaLoaded {
                    token: job.token,
                    media,
                },
                Err(e) => EditorEvent::MediaFailed {
                    token: job.token,
                    error: e.to_string(),
                },
            };
            total.merge(self.dispatch(event)?);
        }
        Ok(total)
    }

    /// Render list of preview `id`.
    pub fn preview_frame(&self, id: &str) -> Option<PreviewFrame> {
        let preview = self.store.current().node(id)?.as_preview()?;
        Some(render_frame(&self.ctx.config, &preview.layers))
    }

    /// Render lists of every preview, in node order.
    pub fn previews(&self) -> Vec<(NodeId, PreviewFrame)> {
        self.store
            .current()
            .nodes()
            .iter()
            .filter_map(|n| {
                let p = n.as_preview()?;
                Some((n.id.clone(), render_frame(&self.ctx.config, &p.layers)))
            })
            .collect()
    }

    /// Nodes downstream of `id`, i.e. everything an edit of `id` can affect.
    pub fn dependents(&self, id: &str) -> Vec<NodeId> {
        reachable(self.store.current(), id, Direction::Downstream)
    }

    /// Per-tab visible/total counts of cascade `id`.
    pub fn cascade_tabs(&self, id: &str) -> Option<BTreeMap<LayerTab, TabCount>> {
        let cascade = self.store.current().node(id)?.as_cascade()?;
        Some(cascade.tab_stats(&self.ctx.config))
    }

    fn accept(&self, token: &DrawToken) -> bool {
        let current = self.tokens.is_current(token)
            && self.store.current().node(token.node.as_str()).is_some();
        if !current {
            tracing::debug!(
                node = %token.node,
                seq = token.seq,
                "discarding stale media completion"
            );
        }
        current
    }

    fn settle(&mut self) -> DispatchOutcome {
        let report = settle(&mut self.store, &self.ctx);
        let current = self.store.current();
        let needs_render = report
            .changed
            .iter()
            .any(|id| current.node(id.as_str()).is_some_and(|n| n.as_preview().is_some()));
        DispatchOutcome {
            changed: report.changed,
            passes: report.passes,
            needs_render,
        }
    }
}

fn with_cascade<R>(
    store: &mut GraphStore,
    node: &NodeId,
    f: impl FnOnce(&mut CascadeData) -> R,
) -> LayerflowResult<R> {
    let is_cascade = store
        .current()
        .node(node.as_str())
        .ok_or_else(|| LayerflowError::validation(format!("unknown node '{node}'")))?
        .as_cascade()
        .is_some();
    if !is_cascade {
        return Err(LayerflowError::validation(format!(
            "node '{node}' is not a visibility controller"
        )));
    }
    let out = store.update_node(node.as_str(), |n| n.as_cascade_mut().map(f))?;
    out.ok_or_else(|| {
        LayerflowError::validation(format!("node '{node}' is not a visibility controller"))
    })
}

fn apply_media(node: &mut Node, media: &LoadedMedia) {
    let path = media.path.display().to_string();
    match &mut node.data {
        NodeData::LayerImage(p) => {
            p.content.image_path = Some(path);
            p.content.image_url = Some(media.url.clone());
            p.image_width = media.width;
            p.image_height = media.height;
            p.media_error = None;
        }
        NodeData::LoadImage(m) => {
            m.image_path = Some(path);
            m.image_url = Some(media.url.clone());
            m.media_error = None;
        }
        NodeData::LoadVideo(m) => {
            m.video_path = Some(path);
            m.video_url = Some(media.url.clone());
            m.media_error = None;
        }
        _ => tracing::debug!(node = %node.id, "media completion for a node without media fields"),
    }
}

fn set_media_error(node: &mut Node, error: String) {
    match &mut node.data {
        NodeData::LayerImage(p) | NodeData::LayerText(p) => p.media_error = Some(error),
        NodeData::LoadImage(m) | NodeData::LoadVideo(m) => m.media_error = Some(error),
        _ => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/editor.rs"]
mod tests;
