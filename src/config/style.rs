//! Image and text style tables plus the layout resolution producers run before
//! publishing their output. Downstream consumers never redo this math; they carry
//! the resolved rectangle verbatim.

use crate::foundation::error::{LayerflowError, LayerflowResult};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Anchor used when a style does not pin explicit `x`/`y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPreset {
    /// Top-left corner.
    TopLeft,
    /// Top edge, centered horizontally.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Left edge, centered vertically.
    Left,
    /// Canvas center.
    #[default]
    Center,
    /// Right edge, centered vertically.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge, centered horizontally.
    BottomCenter,
    /// Bottom-right corner.
    BottomRight,
    /// Unrecognized preset; placed like `center`.
    #[serde(other)]
    Unknown,
}

/// How image pixels fit into the resolved box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Keep intrinsic size.
    None,
    /// Fit inside, preserving aspect ratio.
    Contain,
    /// Fill the box, preserving aspect ratio and cropping.
    #[default]
    Cover,
    /// Stretch both axes independently.
    Fill,
}

/// Layout block shared by image and text styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleLayout {
    /// Explicit left offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Explicit top offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Explicit width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Explicit height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Width relative to the base size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_ratio: Option<f64>,
    /// Height relative to the base size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_ratio: Option<f64>,
    /// Anchor used when `x` or `y` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_preset: Option<PositionPreset>,
    /// Inset from the canvas edge for edge-anchored presets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
}

/// Color adjustments applied to an image layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    /// Brightness multiplier.
    pub brightness: f64,
    /// Contrast multiplier.
    pub contrast: f64,
    /// Saturation multiplier.
    pub saturation: f64,
    /// Blur radius in pixels.
    pub blur: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            blur: 0.0,
        }
    }
}

/// Optional backdrop box drawn behind a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxStyle {
    /// Whether the box is drawn.
    #[serde(default)]
    pub enabled: bool,
    /// Fill color.
    #[serde(default)]
    pub background: String,
    /// Border color.
    #[serde(default)]
    pub border_color: String,
    /// Border width in pixels.
    #[serde(default)]
    pub border_width: f64,
    /// Corner radius in pixels.
    #[serde(default)]
    pub border_radius: f64,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            background: "rgba(0,0,0,0.4)".to_owned(),
            border_color: "#444".to_owned(),
            border_width: 0.0,
            border_radius: 0.0,
        }
    }
}

/// One entry of the image style table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStyle {
    /// Display name.
    #[serde(default)]
    pub label: Option<String>,
    /// Placement rules.
    #[serde(default)]
    pub layout: StyleLayout,
    /// Fit mode.
    #[serde(default)]
    pub scale_mode: Option<ScaleMode>,
    /// Layer opacity in `[0, 1]`.
    #[serde(default)]
    pub opacity: Option<f64>,
    /// CSS blend mode.
    #[serde(default)]
    pub blend_mode: Option<String>,
    /// Color adjustments.
    #[serde(default)]
    pub filters: Option<Filters>,
    /// Backdrop box.
    #[serde(default, rename = "box")]
    pub box_style: Option<BoxStyle>,
}

/// One entry of the text style table.
///
/// Only `layout` is interpreted here; font and box settings are opaque editor JSON
/// forwarded to renderers as `textStyle`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Placement rules.
    #[serde(default)]
    pub layout: StyleLayout,
    /// Everything else (font, box, label, ...), kept verbatim.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl TextStyle {
    /// The whole style as JSON, as published in a producer's `textStyle` field.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Image and text style tables keyed by style id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBook {
    /// Image styles.
    pub image: BTreeMap<String, ImageStyle>,
    /// Text styles.
    pub text: BTreeMap<String, TextStyle>,
}

impl StyleBook {
    /// Load the image style table (`{ styleId: ImageStyle }`).
    pub fn load_image_styles(&mut self, path: &Path) -> LayerflowResult<()> {
        self.image = read_table(path)?;
        Ok(())
    }

    /// Load the text style table (`{ styleId: TextStyle }`).
    pub fn load_text_styles(&mut self, path: &Path) -> LayerflowResult<()> {
        self.text = read_table(path)?;
        Ok(())
    }
}

fn read_table<T: serde::de::DeserializeOwned>(path: &Path) -> LayerflowResult<BTreeMap<String, T>> {
    let s = std::fs::read_to_string(path).map_err(|e| {
        LayerflowError::config(format!("read style table '{}': {e}", path.display()))
    })?;
    serde_json::from_str(&s).map_err(|e| {
        LayerflowError::config(format!("parse style table '{}': {e}", path.display()))
    })
}

/// Resolve an image style's box on the canvas.
///
/// The base size is the image's intrinsic size; explicit width/height win over
/// ratios. The result is clamped so it starts inside the canvas and rounded to
/// whole pixels.
pub fn resolve_image_layout(layout: &StyleLayout, canvas: Size, image: Size) -> Rect {
    let base_w = if image.width > 0.0 { image.width } else { 1920.0 };
    let base_h = if image.height > 0.0 { image.height } else { 1080.0 };

    let w = layout
        .width
        .unwrap_or_else(|| (base_w * layout.width_ratio.unwrap_or(1.0)).round())
        .max(1.0);
    let h = layout
        .height
        .unwrap_or_else(|| (base_h * layout.height_ratio.unwrap_or(1.0)).round())
        .max(1.0);

    let preset = layout.position_preset.unwrap_or(PositionPreset::Center);
    place(layout, preset, 0.0, canvas, Size::new(w, h))
}

/// Resolve a text style's box on the canvas.
///
/// Ratios are relative to the canvas; the default box is full width, a quarter of
/// the canvas high, anchored bottom-center.
pub fn resolve_text_layout(layout: &StyleLayout, canvas: Size) -> Rect {
    let w = layout.width.unwrap_or_else(|| match layout.width_ratio {
        Some(r) => (canvas.width * r).round(),
        None => canvas.width,
    });
    let h = layout.height.unwrap_or_else(|| match layout.height_ratio {
        Some(r) => (canvas.height * r).round(),
        None => (canvas.height * 0.25).round(),
    });

    let preset = layout
        .position_preset
        .unwrap_or(PositionPreset::BottomCenter);
    let margin = layout.margin.unwrap_or(0.0);
    place(layout, preset, margin, canvas, Size::new(w, h))
}

fn place(
    layout: &StyleLayout,
    preset: PositionPreset,
    margin: f64,
    canvas: Size,
    size: Size,
) -> Rect {
    let anchor = preset_origin(preset, margin, canvas, size);
    let x = layout.x.unwrap_or(anchor.x);
    let y = layout.y.unwrap_or(anchor.y);

    // Clamp the origin into the canvas; oversize boxes pin to 0.
    let x = x.min(canvas.width - size.width).max(0.0);
    let y = y.min(canvas.height - size.height).max(0.0);

    Rect::from_origin_size(
        Point::new(x.round(), y.round()),
        Size::new(size.width.round(), size.height.round()),
    )
}

fn preset_origin(preset: PositionPreset, margin: f64, canvas: Size, size: Size) -> Point {
    let cx = (canvas.width - size.width) / 2.0;
    let cy = (canvas.height - size.height) / 2.0;
    let right = canvas.width - size.width - margin;
    let bottom = canvas.height - size.height - margin;
    match preset {
        PositionPreset::TopLeft => Point::new(margin, margin),
        PositionPreset::TopCenter => Point::new(cx, margin),
        PositionPreset::TopRight => Point::new(right, margin),
        PositionPreset::Left => Point::new(margin, cy),
        PositionPreset::Right => Point::new(right, cy),
        PositionPreset::BottomLeft => Point::new(margin, bottom),
        PositionPreset::BottomCenter => Point::new(cx, bottom),
        PositionPreset::BottomRight => Point::new(right, bottom),
        PositionPreset::Center | PositionPreset::Unknown => Point::new(cx, cy),
    }
}

/// Per-axis scale that fits `image` into `target` under `mode`.
pub fn resolve_scale(mode: ScaleMode, image: Size, target: Size) -> Vec2 {
    if image.width <= 0.0 || image.height <= 0.0 {
        return Vec2::new(1.0, 1.0);
    }
    let sx = target.width / image.width;
    let sy = target.height / image.height;
    match mode {
        ScaleMode::None => Vec2::new(1.0, 1.0),
        ScaleMode::Contain => Vec2::new(sx.min(sy), sx.min(sy)),
        ScaleMode::Cover => Vec2::new(sx.max(sy), sx.max(sy)),
        ScaleMode::Fill => Vec2::new(sx, sy),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/style.rs"]
mod tests;
