use super::*;
use serde_json::json;

#[test]
fn store_row_with_seconds_duration() {
    let m: OverlayMessage = serde_json::from_value(json!({
        "id": 42,
        "message": "Pizza en bas !",
        "zones": [1, 3],
        "duration": 5,
        "animation": "slide",
        "created_at": "2026-03-01T12:00:00Z"
    }))
    .unwrap();
    assert_eq!(m.id, "42");
    assert_eq!(m.duration_ms, 5000);
    assert_eq!(m.animation, AnimationProfile::Slide);
    assert!(m.targets(ZoneId::new(3).unwrap()));
    assert!(!m.targets(ZoneId::new(2).unwrap()));
    assert!(m.active);
}

#[test]
fn none_and_unknown_animations_fade() {
    assert_eq!(AnimationProfile::parse_lossy("none"), AnimationProfile::Fade);
    assert_eq!(AnimationProfile::parse_lossy("wobble"), AnimationProfile::Fade);
    assert_eq!(AnimationProfile::parse_lossy(" Scroll "), AnimationProfile::Scroll);
}

#[test]
fn rejects_out_of_range_zone_and_duration() {
    let bad_zone = json!({ "id": "a", "text": "x", "zones": [5], "duration_ms": 1000 });
    assert!(serde_json::from_value::<OverlayMessage>(bad_zone).is_err());

    let too_long = json!({ "id": "a", "text": "x", "zones": [1], "duration": 301 });
    assert!(serde_json::from_value::<OverlayMessage>(too_long).is_err());

    let missing = json!({ "id": "a", "text": "x", "zones": [1] });
    assert!(serde_json::from_value::<OverlayMessage>(missing).is_err());
}

#[test]
fn liveness_uses_deadline_plus_grace() {
    let created: DateTime<Utc> = "2026-03-01T12:00:00Z".parse().unwrap();
    let mut m = OverlayMessage::new("m", "hi", vec![ZoneId::new(1).unwrap()], AnimationProfile::Fade, 5000);
    m.created_at = Some(created);

    let at = |ms: i64| created + chrono::Duration::milliseconds(ms);
    assert!(m.is_live_at(at(5_000), 500));
    assert!(m.is_live_at(at(5_499), 500));
    assert!(!m.is_live_at(at(5_500), 500));

    m.active = false;
    assert!(!m.is_live_at(at(0), 500));
}

#[test]
fn messages_without_timestamps_stay_live() {
    let m = OverlayMessage::new("m", "hi", vec![ZoneId::new(1).unwrap()], AnimationProfile::Fade, 5000);
    assert_eq!(m.deadline(), None);
    assert!(m.is_live_at(Utc::now(), 0));
}
