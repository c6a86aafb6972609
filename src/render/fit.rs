use crate::assets::cache::ImageHandle;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::model::zone::FitMode;
use crate::render::plan::DrawOp;

/// Where media of intrinsic size `media_w`x`media_h` lands inside `target`.
///
/// The result may extend past `target` (`cover`, `no-resizing`); drawing clips to `target`.
pub fn fit_rect(mode: FitMode, media_w: f64, media_h: f64, target: Rect) -> Rect {
    let (tw, th) = (target.width(), target.height());
    if !(media_w.is_finite() && media_h.is_finite()) || media_w <= 0.0 || media_h <= 0.0 {
        return target;
    }
    if tw <= 0.0 || th <= 0.0 {
        return Rect::new(target.x0, target.y0, target.x0, target.y0);
    }

    let media_ratio = media_w / media_h;
    let target_ratio = tw / th;
    let centered = |w: f64, h: f64| {
        let x = target.x0 + (tw - w) / 2.0;
        let y = target.y0 + (th - h) / 2.0;
        Rect::new(x, y, x + w, y + h)
    };

    match mode {
        FitMode::Contain => {
            if media_ratio > target_ratio {
                centered(tw, tw / media_ratio)
            } else {
                centered(th * media_ratio, th)
            }
        }
        FitMode::Cover => {
            if media_ratio > target_ratio {
                centered(th * media_ratio, th)
            } else {
                centered(tw, tw / media_ratio)
            }
        }
        FitMode::Fill | FitMode::Stretch => target,
        FitMode::NoResizing => Rect::new(
            target.x0,
            target.y0,
            target.x0 + media_w,
            target.y0 + media_h,
        ),
    }
}

/// Clip to `target`, fill black, then draw `media` (if ready) with the given fit.
pub(crate) fn push_background(
    ops: &mut Vec<DrawOp>,
    target: Rect,
    mode: FitMode,
    media: Option<(ImageHandle, (u32, u32))>,
) {
    ops.push(DrawOp::PushClip(target));
    ops.push(DrawOp::FillRect {
        rect: target,
        color: Rgba8Premul::BLACK,
    });
    if let Some((image, (w, h))) = media {
        let dest = fit_rect(mode, f64::from(w), f64::from(h), target);
        if dest.width() > 0.0 && dest.height() > 0.0 {
            ops.push(DrawOp::Image {
                image,
                dest,
                opacity: 1.0,
            });
        }
    }
    ops.push(DrawOp::PopClip);
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
