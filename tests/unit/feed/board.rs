use chrono::TimeZone;

use super::*;
use crate::model::message::AnimationProfile;

fn z(id: u8) -> ZoneId {
    ZoneId::new(id).unwrap()
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn msg(id: &str, zones: &[u8]) -> OverlayMessage {
    OverlayMessage::new(
        id,
        format!("message {id}"),
        zones.iter().map(|&n| z(n)).collect(),
        AnimationProfile::Fade,
        5000,
    )
}

#[test]
fn newest_message_per_zone_wins() {
    let mut board = MessageBoard::new();
    assert!(board.upsert(msg("a", &[1, 2]), t0()));
    assert!(board.upsert(msg("b", &[2]), t0()));

    assert_eq!(board.newest_for(z(1)).unwrap().id, "a");
    assert_eq!(board.newest_for(z(2)).unwrap().id, "b");
    assert!(board.newest_for(z(3)).is_none());

    // Updating keeps the arrival order.
    let mut edited = msg("a", &[1, 2]);
    edited.text = "edited".into();
    assert!(board.upsert(edited, t0()));
    assert_eq!(board.newest_for(z(2)).unwrap().id, "b");
    assert_eq!(board.newest_for(z(1)).unwrap().text, "edited");
}

#[test]
fn inactive_and_expired_records_are_ignored() {
    let mut board = MessageBoard::new();
    board.upsert(msg("a", &[1]), t0());

    let mut off = msg("a", &[1]);
    off.active = false;
    assert!(!board.upsert(off, t0()));
    assert!(board.is_empty());

    let mut old = msg("old", &[1]);
    old.created_at = Some(t0() - chrono::Duration::seconds(60));
    assert!(!board.upsert(old, t0()));
    assert!(!board.contains("old"));
}

#[test]
fn sweep_keeps_records_through_the_grace_window() {
    let mut board = MessageBoard::new();
    board.upsert(msg("a", &[1]), t0());
    assert_eq!(board.iter().next().unwrap().created_at, Some(t0()));

    let at = |ms| t0() + chrono::Duration::milliseconds(ms);
    assert_eq!(board.sweep(at(5_400), 500), 0);
    assert_eq!(board.sweep(at(5_500), 500), 1);
    assert!(board.is_empty());
}

#[test]
fn remove_reports_presence() {
    let mut board = MessageBoard::new();
    board.upsert(msg("a", &[4]), t0());
    assert!(board.remove("a"));
    assert!(!board.remove("a"));
    assert_eq!(board.len(), 0);
}
