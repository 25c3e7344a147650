use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_media").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn fs_loader_probes_png_dimensions() {
    let dir = scratch_dir("png");
    let path = dir.join("tiny.png");
    image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
        .save(&path)
        .unwrap();

    let media = FsMediaLoader.load(MediaKind::Image, &path).unwrap();
    assert_eq!((media.width, media.height), (Some(3), Some(2)));
    assert!(media.url.starts_with("file://"));
    assert!(media.url.ends_with("tiny.png"));
    assert!(media.byte_len > 0);
}

#[test]
fn fs_loader_reports_missing_and_garbage_files() {
    let dir = scratch_dir("bad");
    let missing = FsMediaLoader.load_image(&dir.join("nope.png")).unwrap_err();
    assert!(missing.to_string().starts_with("media error:"));

    let garbage = dir.join("garbage.png");
    std::fs::write(&garbage, b"not an image").unwrap();
    assert!(FsMediaLoader.load_image(&garbage).is_err());

    assert!(FsMediaLoader.load_video(&dir).is_err());
}

#[test]
fn newer_token_invalidates_older() {
    let mut tokens = DrawTokens::default();
    let node = NodeId::from("img");
    let first = tokens.issue(&node);
    let second = tokens.issue(&node);
    assert!(!tokens.is_current(&first));
    assert!(tokens.is_current(&second));

    let other = tokens.issue(&NodeId::from("other"));
    assert!(tokens.is_current(&other));
    assert!(tokens.is_current(&second));

    tokens.forget("img");
    assert!(!tokens.is_current(&second));
}
