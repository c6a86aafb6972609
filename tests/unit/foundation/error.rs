use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BannerError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(BannerError::media("x").to_string().contains("media error:"));
    assert!(BannerError::render("x").to_string().contains("render error:"));
    assert!(BannerError::encode("x").to_string().contains("encode error:"));
    assert!(BannerError::feed("x").to_string().contains("feed error:"));
    assert!(
        BannerError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BannerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: BannerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, BannerError::Serde(_)));
}
