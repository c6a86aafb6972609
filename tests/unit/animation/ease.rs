use super::*;

#[test]
fn every_curve_pins_endpoints() {
    for e in [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ] {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
        assert_eq!(e.apply(-3.0), 0.0, "{e:?}");
    }
}

#[test]
fn out_curves_lead_in_curves() {
    assert!(Ease::OutCubic.apply(0.3) > Ease::Linear.apply(0.3));
    assert!(Ease::InCubic.apply(0.3) < Ease::Linear.apply(0.3));
}

#[test]
fn names_are_snake_case() {
    let e: Ease = serde_json::from_str("\"out_cubic\"").unwrap();
    assert_eq!(e, Ease::OutCubic);
}
