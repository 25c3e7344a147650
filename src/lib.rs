//! layerflow is the layer composition engine of a node-graph scene editor.
//!
//! Producers publish image and text layers, visibility controllers switch slots
//! on and off, and previews aggregate what is left into an ordered render list.
//! The graph may be cyclic; every edit settles it to a fixpoint:
//!
//! - Load a [`WorkflowDoc`] into an [`Editor`]
//! - Dispatch [`EditorEvent`]s
//! - Read [`PreviewFrame`]s back
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cascade;
pub mod collect;
pub mod config;
pub mod engine;
pub mod foundation;
pub mod graph;
pub mod media;
pub mod preview;
pub mod producer;
pub mod timeline;
pub mod traverse;

pub use crate::collect::layers::{UpstreamLayers, collect_all_upstream_layers, collect_chain_layers};
pub use crate::config::layers::{CanvasSize, LayerConfig, LayerSlotConfig, LayerTab, TabCount};
pub use crate::config::style::{ScaleMode, StyleBook};
pub use crate::engine::editor::{DispatchOutcome, Editor, EditorEvent};
pub use crate::engine::fingerprint::Fingerprint;
pub use crate::engine::recompute::{RecomputeContext, SettleReport, recompute_pass, settle};
pub use crate::foundation::error::{LayerflowError, LayerflowResult};
pub use crate::foundation::ids::{EdgeId, LayerSlotId, NodeId};
pub use crate::graph::model::{
    CascadeData, Edge, LayerKind, LayerPayload, Node, NodeData, NodeKind, PreviewData,
    ProducerData, ResolvedLayer, WorkflowDoc,
};
pub use crate::graph::store::{GraphSnapshot, GraphStore};
pub use crate::media::loader::{DrawToken, FsMediaLoader, LoadedMedia, MediaKind, MediaLoader};
pub use crate::preview::aggregator::{PreviewFrame, RenderContent, RenderItem, render_frame};
pub use crate::traverse::chain::{Direction, Visit, traverse};
