use super::*;

#[test]
fn zone_id_accepts_only_installed_zones() {
    assert!(ZoneId::new(0).is_err());
    assert!(ZoneId::new(5).is_err());
    assert_eq!(ZoneId::new(4).unwrap().index(), 3);
    assert_eq!(ZoneId::ALL.map(ZoneId::get), [1, 2, 3, 4]);
}

#[test]
fn zone_id_serde_is_a_bare_integer() {
    let id: ZoneId = serde_json::from_str("2").unwrap();
    assert_eq!(id.get(), 2);
    assert_eq!(serde_json::to_string(&id).unwrap(), "2");
    assert!(serde_json::from_str::<ZoneId>("9").is_err());
}

#[test]
fn premul_roundtrips_opaque_and_half_alpha() {
    let c = Rgba8Premul::from_straight_rgba(255, 0, 236, 255);
    assert_eq!(c.to_straight_rgba(), [255, 0, 236, 255]);

    let half = Rgba8Premul::from_straight_rgba(200, 100, 0, 128);
    assert_eq!(half.r, 100);
    let back = half.to_straight_rgba();
    assert!((i32::from(back[0]) - 200).abs() <= 2);
    assert_eq!(Rgba8Premul::transparent().to_straight_rgba(), [0, 0, 0, 0]);
}
