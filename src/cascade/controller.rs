//! Visibility cascade: per-slot ON/OFF state layered over an upstream snapshot.
//!
//! The state lives in [`CascadeData`] so it persists with the workflow. Toggles are
//! user intent and survive every reseed; only slots the cascade has never seen get
//! a seeded value.

use crate::config::layers::{LayerConfig, LayerTab, TabCount};
use crate::foundation::ids::LayerSlotId;
use crate::graph::model::{CascadeData, CascadePhase, ResolvedLayer};
use std::collections::BTreeMap;

/// States a controller effectively applies: its own entries, with config defaults
/// filling every configured slot it has no entry for.
pub fn effective_states(
    states: &BTreeMap<LayerSlotId, bool>,
    config: &LayerConfig,
) -> BTreeMap<LayerSlotId, bool> {
    let mut out = states.clone();
    for (id, slot) in &config.layers {
        out.entry(id.clone()).or_insert(slot.enabled);
    }
    out
}

impl CascadeData {
    /// Replace the upstream snapshot and seed states for slots seen for the first time.
    ///
    /// A new slot takes the layer's explicit `visible` flag, else the config default.
    /// Known slots keep their state.
    pub fn reseed(&mut self, upstream: Vec<ResolvedLayer>, config: &LayerConfig) {
        for layer in &upstream {
            if !self.layer_states.contains_key(&layer.id) {
                let on = layer
                    .visible
                    .unwrap_or_else(|| config.default_visibility(&layer.id));
                self.layer_states.insert(layer.id.clone(), on);
            }
        }
        if self.layers != upstream || self.phase == CascadePhase::Uninitialized {
            self.phase = CascadePhase::Seeded;
        }
        self.layers = upstream;
    }

    /// Current state of `slot`, falling back to the config default.
    pub fn is_on(&self, slot: &LayerSlotId, config: &LayerConfig) -> bool {
        self.layer_states
            .get(slot)
            .copied()
            .unwrap_or_else(|| config.default_visibility(slot))
    }

    /// Explicit states of the slots in the current upstream snapshot.
    ///
    /// Entries for slots no longer upstream are kept as toggles but left out here.
    pub fn current_states(&self) -> BTreeMap<LayerSlotId, bool> {
        self.layers
            .iter()
            .filter_map(|l| Some((l.id.clone(), *self.layer_states.get(&l.id)?)))
            .collect()
    }

    /// Flip one slot. Returns the new state.
    pub fn toggle_layer(&mut self, slot: &LayerSlotId, config: &LayerConfig) -> bool {
        let on = !self.is_on(slot, config);
        self.layer_states.insert(slot.clone(), on);
        self.bump_toggles();
        on
    }

    /// Set every configured slot of the active tab to `visible`.
    pub fn toggle_all(&mut self, visible: bool, config: &LayerConfig) {
        for slot in config.slots_in_tab(&self.active_tab) {
            self.layer_states.insert(slot.clone(), visible);
        }
        self.bump_toggles();
    }

    /// Switch the tab `toggle_all` applies to.
    pub fn select_tab(&mut self, tab: LayerTab) {
        self.active_tab = tab;
    }

    fn bump_toggles(&mut self) {
        self.phase = match self.phase {
            CascadePhase::Toggled(n) => CascadePhase::Toggled(n.saturating_add(1)),
            _ => CascadePhase::Toggled(1),
        };
    }

    /// Upstream layers switched ON, stamped as passed through, sorted by `z_index`.
    pub fn output(&self) -> Vec<ResolvedLayer> {
        let mut out: Vec<ResolvedLayer> = self
            .layers
            .iter()
            .filter(|l| self.layer_states.get(&l.id).copied().unwrap_or(false))
            .map(|l| ResolvedLayer {
                visible: Some(true),
                passed_through: true,
                ..l.clone()
            })
            .collect();
        out.sort_by_key(|l| l.z_index);
        out
    }

    /// Per-tab visible/total counts for the controller header.
    pub fn tab_stats(&self, config: &LayerConfig) -> BTreeMap<LayerTab, TabCount> {
        config.tab_counts(&effective_states(&self.layer_states, config))
    }

    /// Copy of this state with a new upstream snapshot applied and output rebuilt.
    pub fn refreshed(&self, upstream: Vec<ResolvedLayer>, config: &LayerConfig) -> Self {
        let mut next = self.clone();
        next.reseed(upstream, config);
        next.output_layers = next.output();
        next
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cascade/controller.rs"]
mod tests;
