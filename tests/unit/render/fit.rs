use std::sync::Arc;

use super::*;
use crate::assets::decode::PreparedImage;

fn zone1() -> Rect {
    Rect::new(0.0, 0.0, 1056.0, 96.0)
}

fn zone4() -> Rect {
    Rect::new(0.0, 288.0, 864.0, 384.0)
}

#[test]
fn contain_wide_media_fits_width_and_centers_vertically() {
    let r = fit_rect(FitMode::Contain, 2112.0, 96.0, zone1());
    assert_eq!(r, Rect::new(0.0, 24.0, 1056.0, 72.0));
}

#[test]
fn contain_tall_media_fits_height_and_centers_horizontally() {
    let r = fit_rect(FitMode::Contain, 200.0, 100.0, zone4());
    assert_eq!(r.height(), 96.0);
    assert_eq!(r.width(), 192.0);
    assert_eq!(r.x0, (864.0 - 192.0) / 2.0);
    assert_eq!(r.y0, 288.0);
}

#[test]
fn cover_overflows_on_one_axis() {
    let r = fit_rect(FitMode::Cover, 200.0, 100.0, zone4());
    assert_eq!(r.width(), 864.0);
    assert_eq!(r.height(), 432.0);
    assert_eq!(r.y0, 288.0 - (432.0 - 96.0) / 2.0);
}

#[test]
fn fill_and_stretch_match_the_target() {
    assert_eq!(fit_rect(FitMode::Fill, 200.0, 100.0, zone4()), zone4());
    assert_eq!(fit_rect(FitMode::Stretch, 3.0, 7.0, zone4()), zone4());
}

#[test]
fn no_resizing_anchors_top_left() {
    let r = fit_rect(FitMode::NoResizing, 50.0, 200.0, zone4());
    assert_eq!(r, Rect::new(0.0, 288.0, 50.0, 488.0));
}

#[test]
fn degenerate_media_falls_back_to_target() {
    assert_eq!(fit_rect(FitMode::Contain, 0.0, 10.0, zone1()), zone1());
    assert_eq!(fit_rect(FitMode::Cover, f64::NAN, 10.0, zone1()), zone1());
}

#[test]
fn background_ops_clip_fill_then_draw() {
    let handle = ImageHandle {
        id: 7,
        image: Arc::new(PreparedImage::solid(2, 1, [255, 255, 255, 255]).unwrap()),
    };
    let mut ops = Vec::new();
    push_background(&mut ops, zone4(), FitMode::Fill, Some((handle, (200, 100))));
    assert_eq!(ops.len(), 4);
    assert!(matches!(ops[0], DrawOp::PushClip(r) if r == zone4()));
    assert!(matches!(ops[1], DrawOp::FillRect { color, .. } if color == Rgba8Premul::BLACK));
    assert!(matches!(&ops[2], DrawOp::Image { dest, .. } if *dest == zone4()));
    assert!(matches!(ops[3], DrawOp::PopClip));

    let mut pending = Vec::new();
    push_background(&mut pending, zone4(), FitMode::Contain, None);
    assert_eq!(pending.len(), 3);
}
