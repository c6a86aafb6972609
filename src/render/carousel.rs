//! Carousel strip: an ordered list of elements drawn as one endlessly repeating band.
//!
//! Each element is `[leading image or glyph] gap text`. Element `i` starts at the sum of the
//! widths before it plus `i * element_spacing`; the strip repeats with period
//! `total + element_spacing`, so the seam between passes has the same spacing as any other pair.

use crate::assets::cache::{ImageHandle, MediaCache, MediaKey, MediaState};
use crate::assets::fetch::MediaKind;
use crate::config::CarouselConfig;
use crate::engine::state::ScrollState;
use crate::foundation::core::{Rect, ZoneId};
use crate::model::carousel::{CarouselElement, Leading};
use crate::render::plan::{DrawOp, TextRun, centered_baseline};
use crate::text::engine::TextMeasure;

/// Resolved leading slot of one element for the current frame.
#[derive(Clone, Debug)]
pub(crate) enum LeadingSlot {
    None,
    /// Image still loading; reserves the placeholder width.
    Placeholder,
    Image {
        image: ImageHandle,
        width: f64,
        height: f64,
    },
    Glyph(String),
}

#[derive(Clone, Debug)]
pub(crate) struct ElementLayout {
    pub leading: LeadingSlot,
    pub leading_width: f64,
    pub text_width: f64,
    /// Leading width, gap and text width.
    pub width: f64,
}

/// Total strip width: element widths plus one spacing between neighbours, none trailing.
pub fn carousel_width(widths: &[f64], spacing: f64) -> f64 {
    if widths.is_empty() {
        return 0.0;
    }
    widths.iter().sum::<f64>() + (widths.len() - 1) as f64 * spacing
}

/// Scale `(w, h)` to the leading image height, keeping the ratio and capping the width.
pub(crate) fn leading_image_size(w: u32, h: u32, cfg: &CarouselConfig) -> (f64, f64) {
    if w == 0 || h == 0 {
        return (0.0, 0.0);
    }
    let ratio = f64::from(w) / f64::from(h);
    let mut height = cfg.image_height_px;
    let mut width = height * ratio;
    if width > cfg.image_max_width_px {
        width = cfg.image_max_width_px;
        height = width / ratio;
    }
    (width, height)
}

pub(crate) fn resolve_leading(
    element: &CarouselElement,
    zone: ZoneId,
    media: &mut MediaCache,
    now_ms: f64,
    cfg: &CarouselConfig,
) -> LeadingSlot {
    match &element.leading {
        None => LeadingSlot::None,
        Some(Leading::Glyph(g)) if g.is_empty() => LeadingSlot::None,
        Some(Leading::Glyph(g)) => LeadingSlot::Glyph(g.clone()),
        Some(Leading::Image { url }) => {
            let key = MediaKey::new(zone, url.as_str());
            match media.get_or_load(&key, MediaKind::Image) {
                MediaState::Pending => LeadingSlot::Placeholder,
                MediaState::Failed => LeadingSlot::None,
                MediaState::Ready(ready) => {
                    let (iw, ih) = ready.intrinsic_size();
                    let (width, height) = leading_image_size(iw, ih, cfg);
                    if width <= 0.0 {
                        return LeadingSlot::None;
                    }
                    LeadingSlot::Image {
                        image: ready.frame_at(now_ms),
                        width,
                        height,
                    }
                }
            }
        }
    }
}

fn display_text(s: &str, uppercase: bool) -> String {
    if uppercase { s.to_uppercase() } else { s.to_owned() }
}

pub(crate) fn layout_element(
    measure: &mut dyn TextMeasure,
    element: &CarouselElement,
    leading: LeadingSlot,
    uppercase: bool,
    cfg: &CarouselConfig,
) -> ElementLayout {
    let text_width = match &element.two_line {
        Some(two) => {
            let top = measure.measure(&display_text(&two.top, uppercase), None, cfg.two_line_font_px);
            let bottom =
                measure.measure(&display_text(&two.bottom, uppercase), None, cfg.two_line_font_px);
            top.max(bottom)
        }
        None if element.text.is_empty() => 0.0,
        None => measure.measure(&display_text(&element.text, uppercase), None, cfg.font_px),
    };
    let leading_width = match &leading {
        LeadingSlot::None => 0.0,
        LeadingSlot::Placeholder => cfg.placeholder_width_px,
        LeadingSlot::Image { width, .. } => *width,
        LeadingSlot::Glyph(g) => measure.measure(g, None, cfg.font_px),
    };
    let gap = if leading_width > 0.0 && text_width > 0.0 {
        cfg.image_gap_px
    } else {
        0.0
    };
    ElementLayout {
        leading,
        leading_width,
        text_width,
        width: leading_width + gap + text_width,
    }
}

/// Inputs describing one carousel zone for this frame.
pub(crate) struct CarouselZone<'a> {
    pub zone: ZoneId,
    pub rect: Rect,
    pub elements: &'a [CarouselElement],
    pub uppercase: bool,
    pub now_ms: f64,
}

/// First and one-past-last pass index that can intersect a viewport of width `viewport_w`.
pub(crate) fn pass_range(offset: f64, total: f64, period: f64, viewport_w: f64) -> (u64, u64) {
    let passes = ((viewport_w + offset.abs()) / period).ceil() + 1.0;
    let first = ((-offset - total) / period).floor().max(0.0);
    (first as u64, passes as u64)
}

pub(crate) fn push_carousel(
    ops: &mut Vec<DrawOp>,
    measure: &mut dyn TextMeasure,
    media: &mut MediaCache,
    zone: CarouselZone<'_>,
    state: &mut ScrollState,
    cfg: &CarouselConfig,
) {
    if zone.elements.is_empty() {
        return;
    }

    let layouts: Vec<ElementLayout> = zone
        .elements
        .iter()
        .map(|e| {
            let leading = resolve_leading(e, zone.zone, media, zone.now_ms, cfg);
            layout_element(measure, e, leading, zone.uppercase, cfg)
        })
        .collect();
    let widths: Vec<f64> = layouts.iter().map(|l| l.width).collect();
    let total = carousel_width(&widths, cfg.element_spacing_px);
    state.width = Some(total);
    if total <= 0.0 {
        return;
    }

    let period = total + cfg.element_spacing_px;
    let viewport_w = zone.rect.width();
    let mut offset = state.offset;
    if offset > 0.0 {
        offset -= (offset / period).ceil() * period;
    }

    let center_y = zone.rect.center().y;
    let height = zone.rect.height();
    let (first, passes) = pass_range(offset, total, period, viewport_w);

    ops.push(DrawOp::PushClip(zone.rect));
    for pass in first..passes {
        let pass_x = offset + pass as f64 * period;
        if pass_x >= viewport_w {
            break;
        }
        let mut x = pass_x;
        for (element, layout) in zone.elements.iter().zip(&layouts) {
            if x + layout.width > 0.0 && x < viewport_w {
                push_element(ops, element, layout, zone.rect.x0 + x, center_y, height, zone.uppercase, cfg);
            }
            x += layout.width + cfg.element_spacing_px;
        }
    }
    ops.push(DrawOp::PopClip);
}

#[allow(clippy::too_many_arguments)]
fn push_element(
    ops: &mut Vec<DrawOp>,
    element: &CarouselElement,
    layout: &ElementLayout,
    x: f64,
    center_y: f64,
    zone_h: f64,
    uppercase: bool,
    cfg: &CarouselConfig,
) {
    let color = element.color.unwrap_or(cfg.default_color).to_rgba8_premul();
    let run = |text: String, x: f64, center: f64, size_px: f32| {
        DrawOp::Text(TextRun {
            text,
            font: None,
            size_px,
            x,
            baseline: centered_baseline(center, size_px),
            color,
            opacity: 1.0,
        })
    };

    match &layout.leading {
        LeadingSlot::Image {
            image,
            width,
            height,
        } => ops.push(DrawOp::Image {
            image: image.clone(),
            dest: Rect::new(x, center_y - height / 2.0, x + width, center_y + height / 2.0),
            opacity: 1.0,
        }),
        LeadingSlot::Glyph(g) if layout.leading_width > 0.0 => {
            ops.push(run(g.clone(), x, center_y, cfg.font_px));
        }
        _ => {}
    }

    if layout.text_width <= 0.0 {
        return;
    }
    let text_x = x + layout.width - layout.text_width;
    match &element.two_line {
        Some(two) => {
            let quarter = zone_h / 4.0;
            for (s, center) in [(&two.top, center_y - quarter), (&two.bottom, center_y + quarter)] {
                if !s.is_empty() {
                    ops.push(run(display_text(s, uppercase), text_x, center, cfg.two_line_font_px));
                }
            }
        }
        None => ops.push(run(display_text(&element.text, uppercase), text_x, center_y, cfg.font_px)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/carousel.rs"]
mod tests;
