use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ConvergeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ConvergeError::render("x").to_string().contains("render error:"));
    assert!(
        ConvergeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ConvergeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_map_to_serde_variant() {
    let err = serde_json::from_str::<u32>("not json").unwrap_err();
    let err = ConvergeError::from(err);
    assert!(matches!(err, ConvergeError::Serde(_)));
}
