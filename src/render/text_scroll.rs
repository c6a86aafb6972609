use crate::engine::state::{ScrollState, ZoneScroll};
use crate::foundation::color::Color;
use crate::foundation::core::Rect;
use crate::model::zone::{TextLayout, TextLine};
use crate::render::plan::{DrawOp, TextRun, centered_baseline};
use crate::text::engine::TextMeasure;

/// Narrowest tile period; guards the tiling loop against near-zero widths.
const MIN_PERIOD_PX: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LineStyle {
    pub font_px: f32,
    pub spacing_px: f64,
}

/// Left edges (relative to the viewport) of the tiles visible at `offset`.
///
/// Tiles repeat every `period` and are placed from the rightmost possibly visible one leftward,
/// stopping once a tile lies entirely left of the viewport. Their union covers `[0, viewport_w)`
/// for any offset.
pub fn tile_positions(offset: f64, period: f64, viewport_w: f64) -> Vec<f64> {
    if !(offset.is_finite() && period.is_finite() && viewport_w.is_finite()) || viewport_w <= 0.0 {
        return Vec::new();
    }
    let period = period.max(MIN_PERIOD_PX);
    let start = ((viewport_w - offset) / period).ceil() * period + offset;

    let mut out = Vec::new();
    let mut x = start;
    while x > -period {
        if x < viewport_w {
            out.push(x);
        }
        x -= period;
    }
    out.reverse();
    out
}

/// Draw one tiled line inside `rect`. Returns the measured text width.
pub(crate) fn push_line(
    ops: &mut Vec<DrawOp>,
    measure: &mut dyn TextMeasure,
    line: &TextLine,
    rect: Rect,
    state: &mut ScrollState,
    uppercase: bool,
    style: LineStyle,
) -> f64 {
    let text = if uppercase {
        line.text.to_uppercase()
    } else {
        line.text.clone()
    };
    if text.is_empty() {
        return 0.0;
    }

    let width = match state.width {
        Some(w) => w,
        None => {
            let w = measure.measure(&text, line.font.as_deref(), style.font_px);
            // Zero usually means fonts are not available yet; measure again next frame.
            if w > 0.0 {
                state.width = Some(w);
            }
            w
        }
    };
    if width <= 0.0 {
        return 0.0;
    }

    let baseline = centered_baseline(rect.center().y, style.font_px);
    let color = line.color.to_rgba8_premul();
    ops.push(DrawOp::PushClip(rect));
    for x in tile_positions(state.offset, width + style.spacing_px, rect.width()) {
        ops.push(DrawOp::Text(TextRun {
            text: text.clone(),
            font: line.font.clone(),
            size_px: style.font_px,
            x: rect.x0 + x,
            baseline,
            color,
            opacity: 1.0,
        }));
    }
    ops.push(DrawOp::PopClip);
    width
}

/// Single or double-line text content of one zone.
#[allow(clippy::too_many_arguments)]
pub(crate) fn push_text_zone(
    ops: &mut Vec<DrawOp>,
    measure: &mut dyn TextMeasure,
    layout: &TextLayout,
    rect: Rect,
    scroll: &mut ZoneScroll,
    uppercase: bool,
    single: LineStyle,
    double: LineStyle,
    divider: Color,
) {
    match layout {
        TextLayout::Single(line) => {
            push_line(ops, measure, line, rect, &mut scroll.primary, uppercase, single);
        }
        TextLayout::Double { top, bottom } => {
            let mid = rect.y0 + rect.height() / 2.0;
            let top_rect = Rect::new(rect.x0, rect.y0, rect.x1, mid);
            let bottom_rect = Rect::new(rect.x0, mid, rect.x1, rect.y1);
            push_line(ops, measure, top, top_rect, &mut scroll.primary, uppercase, double);
            push_line(
                ops,
                measure,
                bottom,
                bottom_rect,
                &mut scroll.secondary,
                uppercase,
                double,
            );
            ops.push(DrawOp::FillRect {
                rect: Rect::new(rect.x0, mid, rect.x1, mid + 1.0),
                color: divider.to_rgba8_premul(),
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text_scroll.rs"]
mod tests;
