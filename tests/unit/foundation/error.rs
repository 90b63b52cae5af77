use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SplatError::invalid("x")
            .to_string()
            .contains("invalid parameter:")
    );
    assert!(
        SplatError::out_of_memory("x")
            .to_string()
            .contains("out of memory:")
    );
    assert!(
        SplatError::numerical("x")
            .to_string()
            .contains("numerical instability:")
    );
    assert!(SplatError::config("x").to_string().contains("config error:"));
    assert!(
        SplatError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SplatError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: SplatError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, SplatError::Serde(_)));
}
