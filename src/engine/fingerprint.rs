//! Content fingerprints for derived node state.
//!
//! Every field is written explicitly (with length prefixes and variant tags) into a
//! seeded xxh3-128 stream, so two values hash equal iff their derived content is
//! equal, barring collisions. Opaque editor JSON (`textStyle`) is hashed through
//! its canonical serialization.

use crate::config::style::{BoxStyle, Filters, ScaleMode};
use crate::foundation::ids::LayerSlotId;
use crate::graph::model::{
    CascadeData, LayerKind, LayerPayload, Node, NodeData, PreviewData, ProducerData,
    ProducerOutput, ResolvedLayer, TimelineData, TimelineFrame,
};
use std::collections::BTreeMap;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6c61_7965_7266_6c77;

/// 128-bit fingerprint of a node's derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

/// Fingerprint the derived part of a node, or `None` for kinds without derived state.
pub fn fingerprint_derived(node: &Node) -> Option<Fingerprint> {
    let mut h = StableHasher::new();
    match &node.data {
        NodeData::LayerImage(p) | NodeData::LayerText(p) => write_producer_derived(&mut h, p),
        NodeData::LayerOnOff(c) => write_cascade_derived(&mut h, c),
        NodeData::LayerPreview(p) => write_preview_derived(&mut h, p),
        NodeData::LayerTimeline(t) => write_timeline_derived(&mut h, t),
        NodeData::LoadImage(_) | NodeData::LoadVideo(_) | NodeData::Other { .. } => {
            return None;
        }
    }
    Some(h.finish())
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_len(&mut self, n: usize) {
        self.write_u64(n as u64);
    }

    fn write_str(&mut self, s: &str) {
        self.write_len(s.len());
        self.write_bytes(s.as_bytes());
    }

    fn write_opt<T>(&mut self, v: Option<&T>, f: impl FnOnce(&mut Self, &T)) {
        match v {
            None => self.write_u8(0),
            Some(v) => {
                self.write_u8(1);
                f(self, v);
            }
        }
    }

    fn finish(self) -> Fingerprint {
        let v = self.inner.digest128();
        Fingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_opt_str(h: &mut StableHasher, s: Option<&String>) {
    h.write_opt(s, |h, s| h.write_str(s));
}

fn write_opt_f64(h: &mut StableHasher, v: Option<f64>) {
    h.write_opt(v.as_ref(), |h, v| h.write_f64(*v));
}

fn write_layer_kind(h: &mut StableHasher, k: LayerKind) {
    h.write_u8(match k {
        LayerKind::Image => 0,
        LayerKind::Text => 1,
    });
}

fn write_scale_mode(h: &mut StableHasher, m: ScaleMode) {
    h.write_u8(match m {
        ScaleMode::None => 0,
        ScaleMode::Contain => 1,
        ScaleMode::Cover => 2,
        ScaleMode::Fill => 3,
    });
}

fn write_filters(h: &mut StableHasher, f: &Filters) {
    h.write_f64(f.brightness);
    h.write_f64(f.contrast);
    h.write_f64(f.saturation);
    h.write_f64(f.blur);
}

fn write_box(h: &mut StableHasher, b: &BoxStyle) {
    h.write_bool(b.enabled);
    h.write_str(&b.background);
    h.write_str(&b.border_color);
    h.write_f64(b.border_width);
    h.write_f64(b.border_radius);
}

fn write_payload(h: &mut StableHasher, p: &LayerPayload) {
    write_opt_str(h, p.image_url.as_ref());
    write_opt_str(h, p.image_path.as_ref());
    write_opt_str(h, p.text.as_ref());
    write_opt_str(h, p.character_name.as_ref());
    write_opt_str(h, p.style_id.as_ref());
    h.write_opt(p.text_style.as_ref(), |h, v| h.write_str(&v.to_string()));
    write_opt_str(h, p.image_style_id.as_ref());
    write_opt_f64(h, p.display_x);
    write_opt_f64(h, p.display_y);
    write_opt_f64(h, p.display_width);
    write_opt_f64(h, p.display_height);
    write_opt_f64(h, p.opacity);
    write_opt_str(h, p.blend_mode.as_ref());
    h.write_opt(p.scale_mode.as_ref(), |h, m| write_scale_mode(h, *m));
    h.write_opt(p.filters.as_ref(), write_filters);
    h.write_opt(p.box_style.as_ref(), write_box);
}

fn write_resolved_layer(h: &mut StableHasher, l: &ResolvedLayer) {
    h.write_str(l.id.as_str());
    h.write_str(&l.name);
    write_layer_kind(h, l.kind);
    h.write_i32(l.z_index);
    h.write_str(l.node_id.as_str());
    write_payload(h, &l.data);
    h.write_opt(l.visible.as_ref(), |h, v| h.write_bool(*v));
    h.write_bool(l.passed_through);
}

fn write_layers(h: &mut StableHasher, layers: &[ResolvedLayer]) {
    h.write_len(layers.len());
    for l in layers {
        write_resolved_layer(h, l);
    }
}

fn write_states(h: &mut StableHasher, states: &BTreeMap<LayerSlotId, bool>) {
    h.write_len(states.len());
    for (id, on) in states {
        h.write_str(id.as_str());
        h.write_bool(*on);
    }
}

fn write_output(h: &mut StableHasher, o: &ProducerOutput) {
    h.write_str(o.id.as_str());
    write_layer_kind(h, o.kind);
    h.write_str(o.layer_id.as_str());
    h.write_str(o.node_id.as_str());
    h.write_i32(o.z_index);
    h.write_bool(o.visible);
    h.write_str(&o.source_type);
    write_payload(h, &o.payload);
}

fn write_producer_derived(h: &mut StableHasher, p: &ProducerData) {
    h.write_u8(0);
    write_opt_str(h, p.content.image_path.as_ref());
    write_opt_str(h, p.content.image_url.as_ref());
    h.write_opt(p.output.as_ref(), write_output);
}

fn write_cascade_derived(h: &mut StableHasher, c: &CascadeData) {
    h.write_u8(1);
    write_layers(h, &c.layers);
    write_states(h, &c.layer_states);
    write_layers(h, &c.output_layers);
}

fn write_preview_derived(h: &mut StableHasher, p: &PreviewData) {
    h.write_u8(2);
    write_layers(h, &p.layers);
    write_states(h, &p.layer_states);
}

fn write_frame(h: &mut StableHasher, f: &TimelineFrame) {
    h.write_len(f.layers.len());
    for l in &f.layers {
        h.write_str(l.id.as_str());
        h.write_str(l.slot.as_str());
        h.write_str(&l.image_url);
        h.write_f64(l.x);
        h.write_f64(l.y);
        h.write_f64(l.scale);
        h.write_i32(l.z_index);
    }
    h.write_u32(f.background_width);
    h.write_u32(f.background_height);
}

fn write_timeline_derived(h: &mut StableHasher, t: &TimelineData) {
    h.write_u8(3);
    h.write_len(t.frames.len());
    for f in &t.frames {
        write_frame(h, f);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/fingerprint.rs"]
mod tests;
