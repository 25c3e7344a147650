use super::*;

const CANVAS: Size = Size::new(1280.0, 720.0);

#[test]
fn image_defaults_to_centered_intrinsic_size() {
    let r = resolve_image_layout(&StyleLayout::default(), CANVAS, Size::new(640.0, 360.0));
    assert_eq!(r, Rect::new(320.0, 180.0, 960.0, 540.0));
}

#[test]
fn image_ratio_and_preset() {
    let layout = StyleLayout {
        width_ratio: Some(0.5),
        height_ratio: Some(0.5),
        position_preset: Some(PositionPreset::BottomRight),
        ..StyleLayout::default()
    };
    let r = resolve_image_layout(&layout, CANVAS, Size::new(400.0, 200.0));
    assert_eq!(r.width(), 200.0);
    assert_eq!(r.height(), 100.0);
    assert_eq!(r.x0, 1080.0);
    assert_eq!(r.y0, 620.0);
}

#[test]
fn explicit_position_is_clamped_into_canvas() {
    let layout = StyleLayout {
        x: Some(5000.0),
        y: Some(-20.0),
        width: Some(100.0),
        height: Some(100.0),
        ..StyleLayout::default()
    };
    let r = resolve_image_layout(&layout, CANVAS, Size::new(10.0, 10.0));
    assert_eq!(r.x0, 1180.0);
    assert_eq!(r.y0, 0.0);
}

#[test]
fn oversize_box_pins_to_origin() {
    let r = resolve_image_layout(&StyleLayout::default(), CANVAS, Size::new(4000.0, 3000.0));
    assert_eq!(r.origin(), Point::ZERO);
    assert_eq!(r.width(), 4000.0);
}

#[test]
fn text_defaults_to_bottom_band() {
    let r = resolve_text_layout(&StyleLayout::default(), CANVAS);
    assert_eq!(r, Rect::new(0.0, 540.0, 1280.0, 720.0));
}

#[test]
fn text_margin_insets_bottom_anchor() {
    let layout = StyleLayout {
        width_ratio: Some(0.5),
        margin: Some(20.0),
        ..StyleLayout::default()
    };
    let r = resolve_text_layout(&layout, CANVAS);
    assert_eq!(r.x0, 320.0);
    assert_eq!(r.y0, 520.0);
}

#[test]
fn unknown_preset_places_centered() {
    let layout: StyleLayout =
        serde_json::from_str(r#"{ "positionPreset": "somewhere", "width": 100, "height": 100 }"#)
            .unwrap();
    assert_eq!(layout.position_preset, Some(PositionPreset::Unknown));
    let r = resolve_image_layout(&layout, CANVAS, Size::new(1.0, 1.0));
    assert_eq!(r.origin(), Point::new(590.0, 310.0));
}

#[test]
fn scale_modes() {
    let image = Size::new(200.0, 100.0);
    let target = Size::new(100.0, 100.0);
    assert_eq!(resolve_scale(ScaleMode::Contain, image, target), Vec2::new(0.5, 0.5));
    assert_eq!(resolve_scale(ScaleMode::Cover, image, target), Vec2::new(1.0, 1.0));
    assert_eq!(resolve_scale(ScaleMode::Fill, image, target), Vec2::new(0.5, 1.0));
    assert_eq!(resolve_scale(ScaleMode::None, image, target), Vec2::new(1.0, 1.0));
    assert_eq!(
        resolve_scale(ScaleMode::Cover, Size::ZERO, target),
        Vec2::new(1.0, 1.0)
    );
}

#[test]
fn text_style_keeps_opaque_fields() {
    let style: TextStyle = serde_json::from_str(
        r##"{ "label": "Default", "font": { "size": 24 }, "layout": { "margin": 8 } }"##,
    )
    .unwrap();
    assert_eq!(style.layout.margin, Some(8.0));
    let v = style.to_value();
    assert_eq!(v["font"]["size"], 24);
    assert_eq!(v["label"], "Default");
}
