//! Overlay message animation.
//!
//! Each (message, zone) pair runs a timestamp-driven state machine measured from the frame it was
//! first observed. With `W` the transition window and `D` the message duration:
//! `AnimatingIn` on `[0, W)`, `Displaying` on `[W, D)`, `AnimatingOut` on `[D, D + W)` and
//! `Expired` from `D + W`. A zone shows only the newest message targeting it.

use std::collections::HashSet;

use crate::config::OverlayConfig;
use crate::engine::state::PX_PER_SEC_AT_UNIT_SPEED;
use crate::feed::board::MessageBoard;
use crate::foundation::core::{Rect, Vec2, ZONE_COUNT, ZoneId};
use crate::model::message::{AnimationProfile, OverlayMessage};
use crate::model::zone::ZoneSet;
use crate::render::plan::{DrawOp, TextRun, centered_baseline};
use crate::text::engine::TextMeasure;

/// Lifecycle phase of an overlay in one zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayPhase {
    /// Not started yet.
    Pending,
    /// Entry transition.
    AnimatingIn,
    /// Fully shown.
    Displaying,
    /// Exit transition.
    AnimatingOut,
    /// Done; state is dropped.
    Expired,
}

impl OverlayPhase {
    /// Phase after `elapsed_ms` of a message lasting `duration_ms` with a `window_ms` transition.
    pub fn at(elapsed_ms: f64, duration_ms: f64, window_ms: f64) -> Self {
        if elapsed_ms < 0.0 {
            Self::Pending
        } else if elapsed_ms >= duration_ms + window_ms {
            Self::Expired
        } else if elapsed_ms >= duration_ms {
            Self::AnimatingOut
        } else if elapsed_ms < window_ms {
            Self::AnimatingIn
        } else {
            Self::Displaying
        }
    }
}

/// How the overlay block is presented this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayPose {
    /// Opacity of scrim and text.
    pub opacity: f32,
    /// Horizontal displacement of the whole block (slide).
    pub dx: f64,
}

fn progress(elapsed: f64, start: f64, window: f64) -> f64 {
    if window <= 0.0 {
        return if elapsed >= start { 1.0 } else { 0.0 };
    }
    ((elapsed - start) / window).clamp(0.0, 1.0)
}

/// Pose of a `profile` message after `elapsed_ms` in a zone `zone_w` wide.
pub fn pose_at(
    profile: AnimationProfile,
    elapsed_ms: f64,
    duration_ms: f64,
    zone_w: f64,
    cfg: &OverlayConfig,
) -> OverlayPose {
    let window = cfg.transition_ms as f64;
    let t_in = progress(elapsed_ms, 0.0, window);
    let t_out = progress(elapsed_ms, duration_ms, window);
    match profile {
        AnimationProfile::Fade => {
            let opacity = cfg.fade_ease.apply(t_in) * (1.0 - cfg.fade_ease.apply(t_out));
            OverlayPose {
                opacity: opacity as f32,
                dx: 0.0,
            }
        }
        AnimationProfile::Slide => {
            let dx = if elapsed_ms >= duration_ms {
                -zone_w * cfg.slide_out_ease.apply(t_out)
            } else {
                zone_w * (1.0 - cfg.slide_in_ease.apply(t_in))
            };
            OverlayPose { opacity: 1.0, dx }
        }
        AnimationProfile::Scroll => OverlayPose {
            opacity: 1.0,
            dx: 0.0,
        },
    }
}

#[derive(Clone, Debug)]
struct Track {
    message: OverlayMessage,
    started_ms: f64,
    /// Time since `started_ms` at the last sync.
    elapsed_ms: f64,
    phase: OverlayPhase,
    /// Scroll profile only: displacement from the zone's right edge, never positive.
    scroll_offset: f64,
}

/// Per-zone overlay state, owned by the scheduler.
#[derive(Debug)]
pub struct OverlayAnimator {
    cfg: OverlayConfig,
    tracks: [Option<Track>; ZONE_COUNT],
    /// (message id, zone) pairs that ran to completion or were preempted; they must not restart.
    finished: HashSet<(String, ZoneId)>,
}

impl OverlayAnimator {
    /// Idle animator.
    pub fn new(cfg: OverlayConfig) -> Self {
        Self {
            cfg,
            tracks: Default::default(),
            finished: HashSet::new(),
        }
    }

    /// Phase of the overlay in `zone`, if one is active.
    pub fn phase(&self, zone: ZoneId) -> Option<OverlayPhase> {
        self.tracks[zone.index()].as_ref().map(|t| t.phase)
    }

    /// Pose of the overlay in `zone` as of the last sync, for a zone `zone_w` wide.
    pub fn pose(&self, zone: ZoneId, zone_w: f64) -> Option<OverlayPose> {
        self.tracks[zone.index()].as_ref().map(|t| {
            pose_at(
                t.message.animation,
                t.elapsed_ms,
                t.message.duration_ms as f64,
                zone_w,
                &self.cfg,
            )
        })
    }

    /// Message shown in `zone`, if any.
    pub fn active_message(&self, zone: ZoneId) -> Option<&OverlayMessage> {
        self.tracks[zone.index()].as_ref().map(|t| &t.message)
    }

    /// Whether no zone shows an overlay.
    pub fn is_idle(&self) -> bool {
        self.tracks.iter().all(Option::is_none)
    }

    /// Bring every zone in line with `board` at frame time `now_ms`.
    pub fn sync(&mut self, now_ms: f64, board: &MessageBoard) {
        self.finished.retain(|(id, _)| board.contains(id));
        let window = self.cfg.transition_ms as f64;

        for zone in ZoneId::ALL {
            let slot = &mut self.tracks[zone.index()];
            let newest = board
                .newest_for(zone)
                .filter(|m| !self.finished.contains(&(m.id.clone(), zone)));

            let Some(message) = newest else {
                if let Some(old) = slot.take() {
                    tracing::debug!(%zone, id = %old.message.id, "overlay removed");
                }
                continue;
            };

            let same = matches!(slot.as_ref(), Some(t) if t.message.id == message.id);
            if !same {
                if let Some(old) = slot.as_ref() {
                    tracing::debug!(%zone, old = %old.message.id, new = %message.id, "overlay preempted");
                    // A displaced message never comes back to this zone.
                    self.finished.insert((old.message.id.clone(), zone));
                }
                *slot = Some(Track {
                    message: message.clone(),
                    started_ms: now_ms,
                    elapsed_ms: 0.0,
                    phase: OverlayPhase::Pending,
                    scroll_offset: 0.0,
                });
            }
            let Some(track) = slot.as_mut() else {
                continue;
            };
            track.message = message.clone();

            track.elapsed_ms = now_ms - track.started_ms;
            let phase = OverlayPhase::at(
                track.elapsed_ms,
                track.message.duration_ms as f64,
                window,
            );
            if phase != track.phase {
                tracing::debug!(%zone, id = %track.message.id, ?phase, "overlay phase");
            }
            if phase == OverlayPhase::Expired {
                self.finished.insert((track.message.id.clone(), zone));
                *slot = None;
                continue;
            }
            track.phase = phase;
        }
    }

    /// Move scroll-profile overlays left at their zone's speed.
    pub fn advance_scroll(&mut self, zones: &ZoneSet, dt_secs: f64) {
        if !(dt_secs.is_finite() && dt_secs > 0.0) {
            return;
        }
        for zone in zones.iter() {
            if let Some(track) = self.tracks[zone.id.index()].as_mut() {
                if track.message.animation == AnimationProfile::Scroll {
                    track.scroll_offset -= zone.speed * PX_PER_SEC_AT_UNIT_SPEED * dt_secs;
                }
            }
        }
    }

    /// Draw the overlay of `zone`, if any, into `rect`.
    pub(crate) fn push_zone(
        &self,
        ops: &mut Vec<DrawOp>,
        measure: &mut dyn TextMeasure,
        zone: ZoneId,
        rect: Rect,
    ) {
        let Some(track) = self.tracks[zone.index()].as_ref() else {
            return;
        };
        let cfg = &self.cfg;
        let zone_w = rect.width();
        let text = &track.message.text;
        let text_w = if text.is_empty() {
            0.0
        } else {
            measure.measure(text, None, cfg.font_px)
        };
        let baseline = centered_baseline(rect.center().y, cfg.font_px);
        let run = |x: f64, opacity: f32| {
            DrawOp::Text(TextRun {
                text: text.clone(),
                font: None,
                size_px: cfg.font_px,
                x,
                baseline,
                color: cfg.text_color.to_rgba8_premul(),
                opacity,
            })
        };

        ops.push(DrawOp::PushClip(rect));
        match track.message.animation {
            AnimationProfile::Fade | AnimationProfile::Slide => {
                let pose = pose_at(
                    track.message.animation,
                    track.elapsed_ms,
                    track.message.duration_ms as f64,
                    zone_w,
                    cfg,
                );
                if pose.opacity > 0.0 {
                    let alpha = (f32::from(cfg.scrim_color.a) * pose.opacity).round() as u8;
                    ops.push(DrawOp::FillRect {
                        rect: rect + Vec2::new(pose.dx, 0.0),
                        color: cfg.scrim_color.with_alpha(alpha).to_rgba8_premul(),
                    });
                    if text_w > 0.0 {
                        ops.push(run(rect.x0 + (zone_w - text_w) / 2.0 + pose.dx, pose.opacity));
                    }
                }
            }
            AnimationProfile::Scroll if text_w > 0.0 && track.scroll_offset.is_finite() => {
                // Passes repeat behind the leading one, which entered at the right edge.
                let lead = zone_w + track.scroll_offset;
                let period = (text_w + cfg.scroll_spacing_px).max(1.0);
                let mut pass = ((-lead - text_w) / period).floor().max(0.0);
                loop {
                    let x = lead + pass * period;
                    if x >= zone_w {
                        break;
                    }
                    if x + text_w > 0.0 {
                        ops.push(run(rect.x0 + x, 1.0));
                    }
                    pass += 1.0;
                }
            }
            AnimationProfile::Scroll => {}
        }
        ops.push(DrawOp::PopClip);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
