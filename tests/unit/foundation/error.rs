use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LayerflowError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        LayerflowError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(
        LayerflowError::media("x")
            .to_string()
            .contains("media error:")
    );
    assert!(
        LayerflowError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LayerflowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: LayerflowError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, LayerflowError::Serde(_)));
}
