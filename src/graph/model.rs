//! Workflow document model: nodes, edges and the derived layer payloads that flow
//! between them.
//!
//! Nodes serialize as `{ id, type, position, data }`. `data` is parsed into a typed
//! [`NodeData`] variant chosen by `type`; fields this crate does not interpret are
//! kept in each variant's `extra` map and written back unchanged.

use crate::config::layers::LayerTab;
use crate::config::style::{BoxStyle, Filters, ScaleMode};
use crate::engine::fingerprint::Fingerprint;
use crate::foundation::error::{LayerflowError, LayerflowResult};
use crate::foundation::ids::{EdgeId, LayerSlotId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Target handle of the edges that carry layer data.
pub const INPUT_HANDLE: &str = "input";

/// Source handle used for edges created by [`Edge::input`].
pub const OUTPUT_HANDLE: &str = "output";

/// Canvas position of a node in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset.
    #[serde(default)]
    pub x: f64,
    /// Vertical offset.
    #[serde(default)]
    pub y: f64,
}

/// Directed connection between two node handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Edge id.
    pub id: EdgeId,
    /// Upstream node.
    pub source: NodeId,
    /// Downstream node.
    pub target: NodeId,
    /// Handle on the upstream node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Handle on the downstream node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    /// A layer-carrying edge `source:output -> target:input`.
    pub fn input(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: Some(OUTPUT_HANDLE.to_owned()),
            target_handle: Some(INPUT_HANDLE.to_owned()),
        }
    }

    /// Return `true` when the edge lands on a node's `input` handle.
    pub fn is_input(&self) -> bool {
        self.target_handle.as_deref() == Some(INPUT_HANDLE)
    }
}

/// Node type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `layerImage` producer.
    LayerImage,
    /// `layerText` producer.
    LayerText,
    /// `layerOnOff` visibility cascade.
    LayerOnOff,
    /// `layerPreview` aggregator.
    LayerPreview,
    /// `layerTimeline` frame builder.
    LayerTimeline,
    /// `LoadImageNode` media source.
    LoadImage,
    /// `LoadVideoNode` media source.
    LoadVideo,
    /// Any other type string, kept verbatim.
    Other(String),
}

impl NodeKind {
    /// Parse a wire type string.
    pub fn parse(s: &str) -> Self {
        match s {
            "layerImage" => Self::LayerImage,
            "layerText" => Self::LayerText,
            "layerOnOff" => Self::LayerOnOff,
            "layerPreview" => Self::LayerPreview,
            "layerTimeline" => Self::LayerTimeline,
            "LoadImageNode" => Self::LoadImage,
            "LoadVideoNode" => Self::LoadVideo,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Wire type string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::LayerImage => "layerImage",
            Self::LayerText => "layerText",
            Self::LayerOnOff => "layerOnOff",
            Self::LayerPreview => "layerPreview",
            Self::LayerTimeline => "layerTimeline",
            Self::LoadImage => "LoadImageNode",
            Self::LoadVideo => "LoadVideoNode",
            Self::Other(s) => s,
        }
    }
}

/// Content category of a resolved layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Bitmap layer.
    Image,
    /// Dialogue/text layer.
    Text,
}

impl LayerKind {
    /// Slot used by a producer that has not picked one.
    pub fn default_slot(self) -> LayerSlotId {
        match self {
            Self::Image => LayerSlotId::from("image_main"),
            Self::Text => LayerSlotId::from("text_main"),
        }
    }

    /// Node type string of the producer publishing this kind.
    pub fn source_type(self) -> &'static str {
        match self {
            Self::Image => "layerImage",
            Self::Text => "layerText",
        }
    }
}

/// Media, style and geometry carried by a layer. Every field is optional; consumers
/// apply their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPayload {
    /// Loadable image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Image path on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Dialogue text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Speaker name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    /// Text style id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
    /// Resolved text style, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<Value>,
    /// Image style id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_style_id: Option<String>,
    /// Left edge on the canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_x: Option<f64>,
    /// Top edge on the canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_y: Option<f64>,
    /// Box width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_width: Option<f64>,
    /// Box height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_height: Option<f64>,
    /// Opacity in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// CSS blend mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<String>,
    /// Fit mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<ScaleMode>,
    /// Color adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    /// Backdrop box.
    #[serde(default, rename = "box", skip_serializing_if = "Option::is_none")]
    pub box_style: Option<BoxStyle>,
}

/// Output record a producer publishes on `data.output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerOutput {
    /// Slot id.
    pub id: LayerSlotId,
    /// Content category.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Slot id (duplicated for older consumers).
    pub layer_id: LayerSlotId,
    /// Publishing node.
    pub node_id: NodeId,
    /// Paint order taken from config.
    pub z_index: i32,
    /// Visibility inherited from upstream.
    pub visible: bool,
    /// Producer node type.
    pub source_type: String,
    /// Resolved content.
    #[serde(flatten)]
    pub payload: LayerPayload,
}

/// A layer as seen by cascades and previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLayer {
    /// Slot id; unique within one collected list.
    pub id: LayerSlotId,
    /// Display name from config.
    #[serde(default)]
    pub name: String,
    /// Content category.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Paint order.
    pub z_index: i32,
    /// Producer node.
    pub node_id: NodeId,
    /// Resolved content.
    #[serde(default)]
    pub data: LayerPayload,
    /// Explicit visibility; absent on layers read straight from producers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Set on layers a cascade let through.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub passed_through: bool,
}

/// `data` of `layerImage` and `layerText` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerData {
    /// Chosen slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerSlotId>,
    /// Raw content, styles and geometry as edited.
    #[serde(flatten)]
    pub content: LayerPayload,
    /// Intrinsic image width, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    /// Intrinsic image height, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    /// Last media load failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_error: Option<String>,
    /// Timeline placement offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Timeline placement offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Timeline scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Timeline frame width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_width: Option<u32>,
    /// Timeline frame height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_height: Option<u32>,
    /// Derived output; `null` while hidden upstream.
    #[serde(default)]
    pub output: Option<ProducerOutput>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProducerData {
    /// The chosen slot, or the kind's default.
    pub fn slot(&self, kind: LayerKind) -> LayerSlotId {
        self.layer.clone().unwrap_or_else(|| kind.default_slot())
    }
}

/// Runtime phase of a visibility cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadePhase {
    /// Never seeded.
    #[default]
    Uninitialized,
    /// States seeded from upstream.
    Seeded,
    /// User toggled `n` times since the last reseed.
    Toggled(u32),
}

/// `data` of `layerOnOff` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeData {
    /// Upstream snapshot.
    #[serde(default)]
    pub layers: Vec<ResolvedLayer>,
    /// Per-slot visibility, persisted.
    #[serde(default)]
    pub layer_states: BTreeMap<LayerSlotId, bool>,
    /// Layers let through.
    #[serde(default)]
    pub output_layers: Vec<ResolvedLayer>,
    /// Tab `toggle_all` applies to.
    #[serde(default)]
    pub active_tab: LayerTab,
    /// Not persisted.
    #[serde(skip)]
    pub phase: CascadePhase,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data` of `layerPreview` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewData {
    /// Display layers.
    #[serde(default)]
    pub layers: Vec<ResolvedLayer>,
    /// Merged upstream states.
    #[serde(default)]
    pub layer_states: BTreeMap<LayerSlotId, bool>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One image placed in a timeline frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayer {
    /// Producer node.
    pub id: NodeId,
    /// Slot the producer draws into.
    pub slot: LayerSlotId,
    /// Image URL.
    pub image_url: String,
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Paint order.
    pub z_index: i32,
}

/// Latest state of every slot at one point of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    /// Layers sorted by `z_index`.
    pub layers: Vec<TimelineLayer>,
    /// Frame width.
    pub background_width: u32,
    /// Frame height.
    pub background_height: u32,
}

/// `data` of `layerTimeline` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineData {
    /// Derived frames, oldest first.
    #[serde(default)]
    pub frames: Vec<TimelineFrame>,
    /// Playback interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data` of `LoadImageNode` / `LoadVideoNode`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSourceData {
    /// Image path on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Loadable image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Video path on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    /// Loadable video URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Last media load failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_error: Option<String>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Image producer.
    LayerImage(ProducerData),
    /// Text producer.
    LayerText(ProducerData),
    /// Visibility cascade.
    LayerOnOff(CascadeData),
    /// Preview aggregator.
    LayerPreview(PreviewData),
    /// Timeline.
    LayerTimeline(TimelineData),
    /// Image source.
    LoadImage(MediaSourceData),
    /// Video source.
    LoadVideo(MediaSourceData),
    /// Node type the engine does not interpret.
    Other {
        /// Wire type string.
        kind: String,
        /// Raw data.
        data: Value,
    },
}

impl NodeData {
    /// Type tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::LayerImage(_) => NodeKind::LayerImage,
            Self::LayerText(_) => NodeKind::LayerText,
            Self::LayerOnOff(_) => NodeKind::LayerOnOff,
            Self::LayerPreview(_) => NodeKind::LayerPreview,
            Self::LayerTimeline(_) => NodeKind::LayerTimeline,
            Self::LoadImage(_) => NodeKind::LoadImage,
            Self::LoadVideo(_) => NodeKind::LoadVideo,
            Self::Other { kind, .. } => NodeKind::Other(kind.clone()),
        }
    }

    /// Empty data for `kind`.
    pub fn empty(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::LayerImage => Self::LayerImage(ProducerData::default()),
            NodeKind::LayerText => Self::LayerText(ProducerData::default()),
            NodeKind::LayerOnOff => Self::LayerOnOff(CascadeData::default()),
            NodeKind::LayerPreview => Self::LayerPreview(PreviewData::default()),
            NodeKind::LayerTimeline => Self::LayerTimeline(TimelineData::default()),
            NodeKind::LoadImage => Self::LoadImage(MediaSourceData::default()),
            NodeKind::LoadVideo => Self::LoadVideo(MediaSourceData::default()),
            NodeKind::Other(kind) => Self::Other {
                kind: kind.clone(),
                data: Value::Object(Map::new()),
            },
        }
    }

    fn from_value(kind: &NodeKind, data: Value) -> LayerflowResult<Self> {
        let data = match data {
            Value::Null => Value::Object(Map::new()),
            v => v,
        };
        Ok(match kind {
            NodeKind::LayerImage => Self::LayerImage(serde_json::from_value(data)?),
            NodeKind::LayerText => Self::LayerText(serde_json::from_value(data)?),
            NodeKind::LayerOnOff => Self::LayerOnOff(serde_json::from_value(data)?),
            NodeKind::LayerPreview => Self::LayerPreview(serde_json::from_value(data)?),
            NodeKind::LayerTimeline => Self::LayerTimeline(serde_json::from_value(data)?),
            NodeKind::LoadImage => Self::LoadImage(serde_json::from_value(data)?),
            NodeKind::LoadVideo => Self::LoadVideo(serde_json::from_value(data)?),
            NodeKind::Other(kind) => Self::Other {
                kind: kind.clone(),
                data,
            },
        })
    }

    fn to_value(&self) -> Value {
        let v = match self {
            Self::LayerImage(d) | Self::LayerText(d) => serde_json::to_value(d),
            Self::LayerOnOff(d) => serde_json::to_value(d),
            Self::LayerPreview(d) => serde_json::to_value(d),
            Self::LayerTimeline(d) => serde_json::to_value(d),
            Self::LoadImage(d) | Self::LoadVideo(d) => serde_json::to_value(d),
            Self::Other { data, .. } => return data.clone(),
        };
        v.unwrap_or(Value::Null)
    }

    /// Image-ish source path this node exposes to a downstream producer.
    pub fn image_source(&self) -> Option<(&str, Option<&str>)> {
        let (path, url) = match self {
            Self::LayerImage(d) => (
                d.content.image_path.as_deref(),
                d.content.image_url.as_deref(),
            ),
            Self::LoadImage(d) => (d.image_path.as_deref(), d.image_url.as_deref()),
            _ => (None, None),
        };
        path.map(|p| (p, url))
    }
}

/// A graph node.
///
/// `fingerprint` caches the fingerprint of derived state the engine last wrote; it
/// is never serialized and is cleared by [`Node::touch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    /// Node id.
    pub id: NodeId,
    /// Editor position.
    pub position: Position,
    /// Typed payload.
    pub data: NodeData,
    /// Cached derived-state fingerprint.
    pub fingerprint: Option<Fingerprint>,
}

impl Node {
    /// A node with empty data of `kind` at the origin.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self::with_data(id, NodeData::empty(&kind))
    }

    /// A node with the given data at the origin.
    pub fn with_data(id: impl Into<NodeId>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            data,
            fingerprint: None,
        }
    }

    /// Type tag.
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Drop the cached fingerprint after an external edit.
    pub fn touch(&mut self) {
        self.fingerprint = None;
    }

    /// Producer data and its layer kind.
    pub fn as_producer(&self) -> Option<(LayerKind, &ProducerData)> {
        match &self.data {
            NodeData::LayerImage(d) => Some((LayerKind::Image, d)),
            NodeData::LayerText(d) => Some((LayerKind::Text, d)),
            _ => None,
        }
    }

    /// Mutable producer data.
    pub fn as_producer_mut(&mut self) -> Option<&mut ProducerData> {
        match &mut self.data {
            NodeData::LayerImage(d) | NodeData::LayerText(d) => Some(d),
            _ => None,
        }
    }

    /// Cascade data.
    pub fn as_cascade(&self) -> Option<&CascadeData> {
        match &self.data {
            NodeData::LayerOnOff(d) => Some(d),
            _ => None,
        }
    }

    /// Mutable cascade data.
    pub fn as_cascade_mut(&mut self) -> Option<&mut CascadeData> {
        match &mut self.data {
            NodeData::LayerOnOff(d) => Some(d),
            _ => None,
        }
    }

    /// Preview data.
    pub fn as_preview(&self) -> Option<&PreviewData> {
        match &self.data {
            NodeData::LayerPreview(d) => Some(d),
            _ => None,
        }
    }

    /// Timeline data.
    pub fn as_timeline(&self) -> Option<&TimelineData> {
        match &self.data {
            NodeData::LayerTimeline(d) => Some(d),
            _ => None,
        }
    }

    /// Shallow-merge `patch` over the node's wire `data` object and re-parse it.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> LayerflowResult<()> {
        let kind = self.kind();
        let mut value = self.data.to_value();
        let Value::Object(obj) = &mut value else {
            return Err(LayerflowError::validation(format!(
                "node '{}' data is not an object",
                self.id
            )));
        };
        for (k, v) in patch {
            obj.insert(k.clone(), v.clone());
        }
        self.data = NodeData::from_value(&kind, value).map_err(|e| {
            LayerflowError::validation(format!("patch for node '{}': {e}", self.id))
        })?;
        self.touch();
        Ok(())
    }

    /// Clear every engine-derived field. User toggles in `layerStates` survive.
    pub fn clear_derived(&mut self) {
        match &mut self.data {
            NodeData::LayerImage(d) | NodeData::LayerText(d) => d.output = None,
            NodeData::LayerOnOff(d) => {
                d.layers.clear();
                d.output_layers.clear();
                d.phase = if d.layer_states.is_empty() {
                    CascadePhase::Uninitialized
                } else {
                    CascadePhase::Seeded
                };
            }
            NodeData::LayerPreview(d) => {
                d.layers.clear();
                d.layer_states.clear();
            }
            NodeData::LayerTimeline(d) => d.frames.clear(),
            NodeData::LoadImage(_) | NodeData::LoadVideo(_) | NodeData::Other { .. } => {}
        }
        self.fingerprint = None;
    }
}

#[derive(Serialize, Deserialize)]
struct RawNode {
    id: NodeId,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawNode> for Node {
    type Error = LayerflowError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind = NodeKind::parse(&raw.kind);
        let data = NodeData::from_value(&kind, raw.data).map_err(|e| {
            LayerflowError::serde(format!("node '{}' ({}): {e}", raw.id, raw.kind))
        })?;
        Ok(Self {
            id: raw.id,
            position: raw.position,
            data,
            fingerprint: None,
        })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        Self {
            kind: node.kind().as_str().to_owned(),
            data: node.data.to_value(),
            id: node.id,
            position: node.position,
        }
    }
}

/// Serialized editor workflow: the node and edge arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDoc {
    /// Nodes in editor order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in editor order; this order drives traversal order.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Unrecognized top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowDoc {
    /// Parse a workflow document.
    pub fn from_json_str(s: &str) -> LayerflowResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read, parse and validate a workflow file.
    pub fn from_path(path: &Path) -> LayerflowResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            LayerflowError::validation(format!("read workflow '{}': {e}", path.display()))
        })?;
        let doc = Self::from_json_str(&s)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Pretty JSON.
    pub fn to_json_pretty(&self) -> LayerflowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject duplicate node or edge ids.
    pub fn validate(&self) -> LayerflowResult<()> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for n in &self.nodes {
            if !seen.insert(n.id.as_str()) {
                problems.push(format!("duplicate node id '{}'", n.id));
            }
        }
        let mut seen = HashSet::new();
        for e in &self.edges {
            if !seen.insert(e.id.as_str()) {
                problems.push(format!("duplicate edge id '{}'", e.id));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(LayerflowError::validation(problems.join("; ")))
        }
    }

    /// Non-fatal findings: edges whose endpoints do not exist.
    pub fn lint(&self) -> Vec<String> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter_map(|e| {
                let missing: Vec<&str> = [e.source.as_str(), e.target.as_str()]
                    .into_iter()
                    .filter(|id| !ids.contains(id))
                    .collect();
                (!missing.is_empty()).then(|| {
                    format!(
                        "edge '{}' references missing node(s): {}",
                        e.id,
                        missing.join(", ")
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/model.rs"]
mod tests;
