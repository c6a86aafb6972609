use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::assets::cache::LoadStrategy;
use crate::assets::decode::PreparedImage;
use crate::assets::fetch::StaticLoader;
use crate::foundation::color::Color;
use crate::text::engine::FixedAdvance;

fn zone(id: u8) -> ZoneId {
    ZoneId::new(id).unwrap()
}

fn cache(loader: StaticLoader) -> MediaCache {
    MediaCache::new(Arc::new(loader), LoadStrategy::Inline, 96)
}

fn measure() -> FixedAdvance {
    FixedAdvance { advance_em: 0.5 }
}

#[test]
fn width_has_no_trailing_spacing() {
    assert_eq!(carousel_width(&[], 80.0), 0.0);
    assert_eq!(carousel_width(&[100.0], 80.0), 100.0);
    assert_eq!(carousel_width(&[100.0, 50.0, 25.0], 80.0), 335.0);
}

proptest! {
    #[test]
    fn width_is_sum_plus_inner_spacings(widths in proptest::collection::vec(0.0f64..2000.0, 1..20), spacing in 0.0f64..200.0) {
        let expected = widths.iter().sum::<f64>() + (widths.len() - 1) as f64 * spacing;
        prop_assert!((carousel_width(&widths, spacing) - expected).abs() < 1e-6);
    }
}

#[test]
fn leading_image_keeps_ratio_and_caps_width() {
    let cfg = CarouselConfig::default();
    assert_eq!(leading_image_size(100, 100, &cfg), (72.0, 72.0));
    assert_eq!(leading_image_size(400, 100, &cfg), (160.0, 40.0));
    assert_eq!(leading_image_size(0, 100, &cfg), (0.0, 0.0));
}

#[test]
fn element_widths_account_for_leading_and_gap() {
    let cfg = CarouselConfig::default();
    let mut m = measure();

    let plain = CarouselElement::text("a", "ABCD");
    let l = layout_element(&mut m, &plain, LeadingSlot::None, false, &cfg);
    assert_eq!(l.width, 80.0);

    let two = CarouselElement::two_line("b", "AB", "ABCDEF");
    let l = layout_element(&mut m, &two, LeadingSlot::None, false, &cfg);
    assert_eq!(l.text_width, 6.0 * 13.0);

    let l = layout_element(&mut m, &plain, LeadingSlot::Placeholder, false, &cfg);
    assert_eq!(l.width, 96.0 + 16.0 + 80.0);

    let l = layout_element(&mut m, &plain, LeadingSlot::Glyph("*".into()), false, &cfg);
    assert_eq!(l.width, 20.0 + 16.0 + 80.0);
}

#[test]
fn pending_image_reserves_placeholder_then_remeasures() {
    let cfg = CarouselConfig::default();
    let loader = StaticLoader::new()
        .with_image("logo.png", PreparedImage::solid(50, 100, [0, 0, 255, 255]).unwrap());
    let mut media = cache(loader);
    let el = CarouselElement::text("m", "MATCH").with_image("logo.png");

    let slot = resolve_leading(&el, zone(2), &mut media, 0.0, &cfg);
    assert!(matches!(slot, LeadingSlot::Placeholder));

    media.poll(16.0);
    let slot = resolve_leading(&el, zone(2), &mut media, 16.0, &cfg);
    let LeadingSlot::Image { width, height, .. } = slot else {
        panic!("expected ready image");
    };
    assert_eq!((width, height), (36.0, 72.0));
}

#[test]
fn failed_image_reserves_nothing() {
    let cfg = CarouselConfig::default();
    let mut media = cache(StaticLoader::new());
    let el = CarouselElement::text("m", "AB").with_image("missing.png");
    resolve_leading(&el, zone(2), &mut media, 0.0, &cfg);
    media.poll(16.0);
    let slot = resolve_leading(&el, zone(2), &mut media, 16.0, &cfg);
    let l = layout_element(&mut measure(), &el, slot, false, &cfg);
    assert_eq!(l.width, 40.0);
}

fn render(elements: &[CarouselElement], offset: f64) -> (Vec<DrawOp>, ScrollState) {
    let cfg = CarouselConfig::default();
    let mut media = cache(StaticLoader::new());
    let mut state = ScrollState {
        offset,
        width: None,
    };
    let mut ops = Vec::new();
    push_carousel(
        &mut ops,
        &mut measure(),
        &mut media,
        CarouselZone {
            zone: zone(2),
            rect: Rect::new(0.0, 96.0, 1056.0, 192.0),
            elements,
            uppercase: false,
            now_ms: 0.0,
        },
        &mut state,
        &cfg,
    );
    (ops, state)
}

fn text_xs(ops: &[DrawOp]) -> Vec<(String, f64)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Text(r) => Some((r.text.clone(), r.x)),
            _ => None,
        })
        .collect()
}

#[test]
fn strip_repeats_with_period_total_plus_spacing() {
    let elements = [
        CarouselElement::text("a", "AAAAAAAAAA"),
        CarouselElement::text("b", "BBBBB"),
    ];
    let (ops, state) = render(&elements, 0.0);
    // 200 + 80 + 100 = 380, period 460.
    assert_eq!(state.width, Some(380.0));
    let xs = text_xs(&ops);
    assert_eq!(xs[0], ("AAAAAAAAAA".to_owned(), 0.0));
    assert_eq!(xs[1], ("BBBBB".to_owned(), 280.0));
    assert_eq!(xs[2], ("AAAAAAAAAA".to_owned(), 460.0));
    assert!(xs.iter().all(|(_, x)| *x < 1056.0));
}

#[test]
fn far_scrolled_strip_skips_invisible_passes() {
    let elements = [CarouselElement::text("a", "AAAAAAAAAA")];
    let (ops, _) = render(&elements, -1_000_000.0);
    let xs = text_xs(&ops);
    assert!(!xs.is_empty());
    assert!(xs.len() <= 1056 / 280 + 2);
    assert!(xs.iter().all(|(_, x)| *x + 200.0 > 0.0 && *x < 1056.0));
}

#[test]
fn color_override_and_default_color() {
    let elements = [
        CarouselElement::text("a", "A").with_color(Color::rgb(255, 0, 0)),
        CarouselElement::text("b", "B"),
    ];
    let (ops, _) = render(&elements, 0.0);
    let colors: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text(r) => Some(r.color),
            _ => None,
        })
        .take(2)
        .collect();
    assert_eq!(colors[0], Color::rgb(255, 0, 0).to_rgba8_premul());
    assert_eq!(colors[1], Color::WHITE.to_rgba8_premul());
}

#[test]
fn two_line_elements_stack_in_zone_quarters() {
    let elements = [CarouselElement::two_line("m", "TEAM A vs TEAM B", "Demain 20H00")];
    let (ops, _) = render(&elements, 0.0);
    let baselines: Vec<f64> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text(r) if r.x == 0.0 => Some(r.baseline),
            _ => None,
        })
        .collect();
    let third = 26.0 / 3.0;
    assert_eq!(baselines.len(), 2);
    assert!((baselines[0] - (120.0 + third)).abs() < 1e-4);
    assert!((baselines[1] - (168.0 + third)).abs() < 1e-4);
}

#[test]
fn empty_list_draws_nothing() {
    let (ops, _) = render(&[], -50.0);
    assert!(ops.is_empty());
}

proptest! {
    #[test]
    fn strip_leaves_no_gap_wider_than_spacing(
        lens in proptest::collection::vec(1usize..30, 1..8),
        offset in -1_000_000.0f64..5_000.0,
    ) {
        let spacing = CarouselConfig::default().element_spacing_px;
        let elements: Vec<CarouselElement> = lens
            .iter()
            .enumerate()
            .map(|(i, n)| CarouselElement::text(format!("e{i}"), "W".repeat(*n)))
            .collect();
        let (ops, _) = render(&elements, offset);

        // 0.5 em of 40 px per char.
        let mut spans: Vec<(f64, f64)> = text_xs(&ops)
            .into_iter()
            .map(|(text, x)| (x.max(0.0), (x + text.chars().count() as f64 * 20.0).min(1056.0)))
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        prop_assert!(!spans.is_empty());

        let mut covered = 0.0f64;
        for (start, end) in spans {
            prop_assert!(start - covered <= spacing + 1e-6, "gap before {start} (covered to {covered})");
            covered = covered.max(end);
        }
        prop_assert!(1056.0 - covered <= spacing + 1e-6, "gap at right edge from {covered}");
    }
}
