use super::*;

#[test]
fn empty_object_yields_installation_defaults() {
    let cfg = DisplayConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, DisplayConfig::default());
    assert_eq!(cfg.canvas.width, 1056);
    assert_eq!(cfg.overlay.transition_ms, 500);
    cfg.validate().unwrap();
}

#[test]
fn zone_rects_stack_and_zone4_is_narrower() {
    let cfg = DisplayConfig::default();
    let r1 = cfg.zone_rect(ZoneId::new(1).unwrap());
    let r4 = cfg.zone_rect(ZoneId::new(4).unwrap());
    assert_eq!(r1, Rect::new(0.0, 0.0, 1056.0, 96.0));
    assert_eq!(r4, Rect::new(0.0, 288.0, 864.0, 384.0));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(DisplayConfig::from_json_str(r#"{"zone_heigth": 90}"#).is_err());
}

#[test]
fn validate_rejects_overflowing_zones() {
    let cfg = DisplayConfig {
        zone_height: 200,
        ..DisplayConfig::default()
    };
    assert!(cfg.validate().is_err());

    let mut cfg = DisplayConfig::default();
    cfg.zone_widths[3] = 2000;
    assert!(cfg.validate().is_err());
}

#[test]
fn overrides_replace_fonts_dir_and_video_fps() {
    let mut cfg = DisplayConfig::default();
    cfg.apply_overrides(Some("/srv/fonts".to_owned()), Some("12.5".to_owned()))
        .unwrap();
    assert_eq!(cfg.fonts_dir.as_deref(), Some(Path::new("/srv/fonts")));
    assert_eq!(cfg.video.sample_fps, 12.5);

    assert!(cfg.apply_overrides(None, Some("fast".to_owned())).is_err());
}

#[test]
fn load_reads_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("display.json");
    std::fs::write(&path, r#"{ "fps": 30, "text": { "single_font_px": 40 } }"#).unwrap();
    let cfg = DisplayConfig::load(&path).unwrap();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.text.single_font_px, 40.0);
    assert_eq!(cfg.text.double_font_px, 32.0);
}
