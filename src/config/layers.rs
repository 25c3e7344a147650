use crate::foundation::error::{LayerflowError, LayerflowResult};
use crate::foundation::ids::LayerSlotId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Preview canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Canvas size as kurbo geometry.
    pub fn to_size(self) -> kurbo::Size {
        kurbo::Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Registry entry for one layer slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSlotConfig {
    /// Human readable name shown in the editor.
    #[serde(default)]
    pub label: String,
    /// Slot category (`image`, `text`, `ui`, ...), used by controller tabs.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Paint order; lower values are drawn first.
    #[serde(default)]
    pub z: i32,
    /// Default visibility for slots a controller has not seen toggled.
    #[serde(default)]
    pub enabled: bool,
}

/// Display metadata for a controller tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTypeConfig {
    /// Tab caption.
    #[serde(default)]
    pub name: String,
    /// Tab accent color (CSS color string).
    #[serde(default)]
    pub color: Option<String>,
}

/// Filter tab of a visibility controller: every slot, or the slots of one category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerTab {
    /// All configured slots.
    #[default]
    All,
    /// Slots whose config `type` equals the given category.
    Kind(String),
}

impl LayerTab {
    /// Return `true` when `slot` belongs to this tab.
    pub fn contains(&self, slot: &LayerSlotConfig) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => slot.kind == *kind,
        }
    }
}

impl From<String> for LayerTab {
    fn from(s: String) -> Self {
        if s == "all" { Self::All } else { Self::Kind(s) }
    }
}

impl From<LayerTab> for String {
    fn from(tab: LayerTab) -> Self {
        match tab {
            LayerTab::All => "all".to_owned(),
            LayerTab::Kind(kind) => kind,
        }
    }
}

impl fmt::Display for LayerTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Kind(kind) => f.write_str(kind),
        }
    }
}

/// Editor layer configuration: canvas plus the authoritative slot registry.
///
/// This is the single source of z-order and default visibility. Slots absent from
/// `layers` cannot be placed and are skipped by every collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    /// Preview canvas.
    #[serde(default)]
    pub canvas: CanvasSize,
    /// Slot registry keyed by slot id.
    #[serde(default)]
    pub layers: BTreeMap<LayerSlotId, LayerSlotConfig>,
    /// Optional controller tab metadata keyed by category.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layer_types: BTreeMap<String, LayerTypeConfig>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        let slot = |label: &str, kind: &str, z: i32| LayerSlotConfig {
            label: label.to_owned(),
            kind: kind.to_owned(),
            z,
            enabled: true,
        };
        let layers = [
            ("bg_base", slot("Background (base)", "image", 0)),
            ("bg_effect", slot("Background (effect)", "image", 5)),
            ("image_back", slot("Image (back)", "image", 10)),
            ("image_main", slot("Image (main)", "image", 20)),
            ("image_front", slot("Image (front)", "image", 30)),
            ("ui_base", slot("UI (frame)", "ui", 40)),
            ("text_main", slot("Text", "text", 50)),
        ]
        .into_iter()
        .map(|(id, cfg)| (LayerSlotId::from(id), cfg))
        .collect();

        Self {
            canvas: CanvasSize::default(),
            layers,
            layer_types: BTreeMap::new(),
        }
    }
}

/// Per-tab visible/total counts for a controller header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TabCount {
    /// Configured slots in the tab.
    pub total: usize,
    /// Slots currently switched on.
    pub visible: usize,
}

impl LayerConfig {
    /// Parse a config document.
    pub fn from_json_str(s: &str) -> LayerflowResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| LayerflowError::config(format!("parse layer config: {e}")))
    }

    /// Read and parse a config file, then validate it.
    pub fn from_path(path: &Path) -> LayerflowResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            LayerflowError::config(format!("read layer config '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_json_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check structural invariants. Equal `z` values are allowed; ties keep discovery order.
    pub fn validate(&self) -> LayerflowResult<()> {
        let mut problems = Vec::new();
        if self.canvas.width == 0 || self.canvas.height == 0 {
            problems.push("canvas width/height must be > 0".to_owned());
        }
        for id in self.layers.keys() {
            if id.as_str().trim().is_empty() {
                problems.push("layer slot ids must be non-empty".to_owned());
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(LayerflowError::config(problems.join("; ")))
        }
    }

    /// Look up a slot's registry entry.
    pub fn slot(&self, id: &LayerSlotId) -> Option<&LayerSlotConfig> {
        self.layers.get(id)
    }

    /// Display name of a slot, falling back to the slot id.
    pub fn label_of(&self, id: &LayerSlotId) -> String {
        match self.layers.get(id) {
            Some(cfg) if !cfg.label.is_empty() => cfg.label.clone(),
            _ => id.to_string(),
        }
    }

    /// Default visibility of a slot. Unknown slots default to off.
    pub fn default_visibility(&self, id: &LayerSlotId) -> bool {
        self.layers.get(id).is_some_and(|cfg| cfg.enabled)
    }

    /// Slots in paint order (`z`, then id).
    pub fn slots_by_z(&self) -> Vec<(&LayerSlotId, &LayerSlotConfig)> {
        let mut slots: Vec<_> = self.layers.iter().collect();
        slots.sort_by(|a, b| a.1.z.cmp(&b.1.z).then_with(|| a.0.cmp(b.0)));
        slots
    }

    /// Slots shown under `tab`, in paint order.
    pub fn slots_in_tab(&self, tab: &LayerTab) -> Vec<&LayerSlotId> {
        self.slots_by_z()
            .into_iter()
            .filter(|(_, cfg)| tab.contains(cfg))
            .map(|(id, _)| id)
            .collect()
    }

    /// The lowest-z slot, treated as the scene background by the timeline.
    pub fn background_slot(&self) -> Option<&LayerSlotId> {
        self.slots_by_z().first().map(|(id, _)| *id)
    }

    /// Controller tabs: `all` followed by configured categories, or the stock set.
    pub fn tabs(&self) -> Vec<LayerTab> {
        let mut tabs = vec![LayerTab::All];
        if self.layer_types.is_empty() {
            tabs.extend(
                ["image", "text", "ui"]
                    .into_iter()
                    .map(|k| LayerTab::Kind(k.to_owned())),
            );
        } else {
            tabs.extend(self.layer_types.keys().cloned().map(LayerTab::Kind));
        }
        tabs
    }

    /// Visible/total counts per tab for a given state map.
    pub fn tab_counts(
        &self,
        states: &BTreeMap<LayerSlotId, bool>,
    ) -> BTreeMap<LayerTab, TabCount> {
        self.tabs()
            .into_iter()
            .map(|tab| {
                let slots = self.slots_in_tab(&tab);
                let visible = slots
                    .iter()
                    .filter(|&&id| states.get(id).copied().unwrap_or(false))
                    .count();
                let count = TabCount {
                    total: slots.len(),
                    visible,
                };
                (tab, count)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/layers.rs"]
mod tests;
