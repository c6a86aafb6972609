use proptest::prelude::*;

use super::*;
use crate::text::engine::FixedAdvance;

fn line(text: &str) -> TextLine {
    TextLine {
        text: text.to_owned(),
        color: Color::WHITE,
        speed: 1.0,
        font: None,
    }
}

const SINGLE: LineStyle = LineStyle {
    font_px: 48.0,
    spacing_px: 50.0,
};

fn covers(tiles: &[f64], period: f64, viewport: f64) -> bool {
    let mut covered_to = 0.0;
    for &x in tiles {
        if x > covered_to + 1e-6 {
            return false;
        }
        covered_to = f64::max(covered_to, x + period);
    }
    covered_to >= viewport - 1e-6
}

#[test]
fn tiles_at_zero_offset_start_at_origin() {
    let t = tile_positions(0.0, 300.0, 1056.0);
    assert_eq!(t, vec![0.0, 300.0, 600.0, 900.0]);
}

#[test]
fn text_wider_than_zone_still_leaves_no_gap() {
    let t = tile_positions(-1500.0, 2500.0, 864.0);
    assert_eq!(t, vec![-1500.0]);
    assert!(covers(&t, 2500.0, 864.0));

    let t = tile_positions(-2400.0, 2500.0, 864.0);
    assert_eq!(t, vec![-2400.0, 100.0]);
}

#[test]
fn invalid_input_yields_no_tiles() {
    assert!(tile_positions(f64::NAN, 100.0, 1056.0).is_empty());
    assert!(tile_positions(0.0, 100.0, 0.0).is_empty());
}

proptest! {
    #[test]
    fn tiling_covers_every_pixel(offset in -1.0e6f64..1.0e4, period in 1.0f64..5000.0, viewport in 1.0f64..2000.0) {
        let tiles = tile_positions(offset, period, viewport);
        prop_assert!(!tiles.is_empty());
        prop_assert!(covers(&tiles, period, viewport));
        prop_assert!(tiles.iter().all(|&x| x < viewport && x + period > 0.0));
    }
}

#[test]
fn single_line_draws_centered_tiles_inside_a_clip() {
    let mut ops = Vec::new();
    let mut state = ScrollState::default();
    let mut m = FixedAdvance { advance_em: 0.5 };
    let rect = Rect::new(0.0, 0.0, 1056.0, 96.0);

    let w = push_line(&mut ops, &mut m, &line("HELLO"), rect, &mut state, false, SINGLE);
    assert_eq!(w, 120.0);
    assert_eq!(state.width, Some(120.0));
    assert!(matches!(ops.first(), Some(DrawOp::PushClip(r)) if *r == rect));
    assert!(matches!(ops.last(), Some(DrawOp::PopClip)));

    let runs: Vec<&TextRun> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(runs.len(), 7);
    assert_eq!(runs[0].x, 0.0);
    assert_eq!(runs[1].x, 170.0);
    assert_eq!(runs[0].baseline, 48.0 + 16.0);
}

#[test]
fn uppercase_applies_at_draw_time_only() {
    let mut ops = Vec::new();
    let mut state = ScrollState::default();
    let l = line("bonjour");
    push_line(
        &mut ops,
        &mut FixedAdvance::default(),
        &l,
        Rect::new(0.0, 0.0, 100.0, 96.0),
        &mut state,
        true,
        SINGLE,
    );
    assert_eq!(l.text, "bonjour");
    assert!(ops.iter().any(|op| matches!(op, DrawOp::Text(r) if r.text == "BONJOUR")));
}

#[test]
fn empty_line_draws_nothing() {
    let mut ops = Vec::new();
    let mut state = ScrollState::default();
    let w = push_line(
        &mut ops,
        &mut FixedAdvance::default(),
        &line(""),
        Rect::new(0.0, 0.0, 100.0, 96.0),
        &mut state,
        false,
        SINGLE,
    );
    assert_eq!(w, 0.0);
    assert!(ops.is_empty());
}

#[test]
fn double_line_splits_halves_and_adds_divider() {
    let layout = TextLayout::Double {
        top: line("TOP"),
        bottom: line("BOTTOM"),
    };
    let mut ops = Vec::new();
    let mut scroll = ZoneScroll::default();
    scroll.secondary.offset = -10.0;
    let rect = Rect::new(0.0, 96.0, 1056.0, 192.0);
    let double = LineStyle {
        font_px: 32.0,
        spacing_px: 40.0,
    };
    push_text_zone(
        &mut ops,
        &mut FixedAdvance::default(),
        &layout,
        rect,
        &mut scroll,
        false,
        SINGLE,
        double,
        Color::rgb(0x55, 0x55, 0x55),
    );

    let clips: Vec<Rect> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::PushClip(r) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(clips, vec![Rect::new(0.0, 96.0, 1056.0, 144.0), Rect::new(0.0, 144.0, 1056.0, 192.0)]);
    assert!(matches!(
        ops.last(),
        Some(DrawOp::FillRect { rect, .. }) if *rect == Rect::new(0.0, 144.0, 1056.0, 145.0)
    ));
    let bottom_first = ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Text(r) if r.text == "BOTTOM" => Some(r.x),
            _ => None,
        })
        .unwrap();
    assert_eq!(bottom_first, -10.0);
}
