//! Per-zone composition: background, then content, then the zone's overlay.

use crate::assets::cache::{MediaCache, MediaKey, MediaState};
use crate::assets::fetch::MediaKind;
use crate::config::DisplayConfig;
use crate::engine::state::ZoneScroll;
use crate::feed::ContentFeeds;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::foundation::error::{BannerError, BannerResult};
use crate::model::zone::{BackgroundKind, Zone, ZoneContent};
use crate::render::carousel::{CarouselZone, push_carousel};
use crate::render::fit::push_background;
use crate::render::overlay::OverlayAnimator;
use crate::render::plan::DrawOp;
use crate::render::text_scroll::{LineStyle, push_text_zone};
use crate::text::engine::TextMeasure;

/// Everything a zone reads or updates while it is composed.
pub(crate) struct ZoneInputs<'a> {
    pub measure: &'a mut dyn TextMeasure,
    pub media: &'a mut MediaCache,
    pub feeds: &'a ContentFeeds,
    pub overlay: &'a OverlayAnimator,
    pub now_ms: f64,
}

pub(crate) fn compose_zone(
    ops: &mut Vec<DrawOp>,
    cfg: &DisplayConfig,
    zone: &Zone,
    rect: Rect,
    scroll: &mut ZoneScroll,
    inputs: &mut ZoneInputs<'_>,
) -> BannerResult<()> {
    if !(rect.width() > 0.0 && rect.height() > 0.0) {
        return Err(BannerError::render(format!("{} has an empty rectangle", zone.id)));
    }
    if !(scroll.primary.offset.is_finite() && scroll.secondary.offset.is_finite()) {
        return Err(BannerError::render(format!("{} scroll offset is not finite", zone.id)));
    }

    let background = zone.background.media_url().and_then(|url| {
        let kind = match zone.background.kind {
            BackgroundKind::Video => MediaKind::Video,
            _ => MediaKind::Image,
        };
        match inputs.media.get_or_load(&MediaKey::new(zone.id, url), kind) {
            MediaState::Ready(ready) => {
                Some((ready.frame_at(inputs.now_ms), ready.intrinsic_size()))
            }
            MediaState::Pending | MediaState::Failed => None,
        }
    });
    push_background(ops, rect, zone.background.mode, background);

    match &zone.content {
        ZoneContent::Text(layout) => {
            let single = LineStyle {
                font_px: cfg.text.single_font_px,
                spacing_px: cfg.text.single_spacing_px,
            };
            let double = LineStyle {
                font_px: cfg.text.double_font_px,
                spacing_px: cfg.text.double_spacing_px,
            };
            push_text_zone(
                ops,
                inputs.measure,
                layout,
                rect,
                scroll,
                zone.force_uppercase,
                single,
                double,
                cfg.divider_color,
            );
        }
        ZoneContent::Carousel(feed) => {
            let elements = inputs.feeds.get(*feed);
            push_carousel(
                ops,
                inputs.measure,
                inputs.media,
                CarouselZone {
                    zone: zone.id,
                    rect,
                    elements: &elements,
                    uppercase: zone.force_uppercase,
                    now_ms: inputs.now_ms,
                },
                &mut scroll.primary,
                &cfg.carousel,
            );
        }
    }

    inputs.overlay.push_zone(ops, inputs.measure, zone.id, rect);
    Ok(())
}

/// Replacement for a zone that failed to compose.
pub(crate) fn push_solid_zone(ops: &mut Vec<DrawOp>, rect: Rect) {
    ops.push(DrawOp::PushClip(rect));
    ops.push(DrawOp::FillRect {
        rect,
        color: Rgba8Premul::BLACK,
    });
    ops.push(DrawOp::PopClip);
}
