use crate::foundation::core::{ZONE_COUNT, ZoneId};
use crate::model::zone::{TextLayout, ZoneContent, ZoneSet};

/// Pixels per second travelled at speed `1.0`.
pub const PX_PER_SEC_AT_UNIT_SPEED: f64 = 60.0;

/// Horizontal scroll of one line or strip.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    /// Signed offset in pixels; decreases while playing. Never wrapped.
    pub offset: f64,
    /// Last measured content width.
    pub width: Option<f64>,
}

impl ScrollState {
    /// Move left by `speed` units over `dt_secs`.
    pub fn advance(&mut self, speed: f64, dt_secs: f64) {
        self.offset -= speed * PX_PER_SEC_AT_UNIT_SPEED * dt_secs;
    }
}

/// Scroll state of one zone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ZoneScroll {
    /// Single line, top line of a double-line zone, or the carousel strip.
    pub primary: ScrollState,
    /// Bottom line of a double-line zone.
    pub secondary: ScrollState,
    signature: Option<u64>,
}

/// Scroll state of all zones, owned by the scheduler.
#[derive(Clone, Debug, Default)]
pub struct ScrollBook {
    zones: [ZoneScroll; ZONE_COUNT],
}

impl ScrollBook {
    pub fn zone(&self, id: ZoneId) -> &ZoneScroll {
        &self.zones[id.index()]
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> &mut ZoneScroll {
        &mut self.zones[id.index()]
    }

    /// Reset zones whose content signature changed; others keep their offsets.
    pub fn reconcile(&mut self, zones: &ZoneSet) {
        for zone in zones.iter() {
            let sig = zone.content_signature();
            let slot = &mut self.zones[zone.id.index()];
            if slot.signature != Some(sig) {
                if slot.signature.is_some() {
                    tracing::debug!(zone = %zone.id, "content changed, scroll reset");
                }
                *slot = ZoneScroll {
                    signature: Some(sig),
                    ..ZoneScroll::default()
                };
            }
        }
    }

    pub fn advance(&mut self, zones: &ZoneSet, dt_secs: f64) {
        if !(dt_secs.is_finite() && dt_secs > 0.0) {
            return;
        }
        for zone in zones.iter() {
            let slot = &mut self.zones[zone.id.index()];
            match &zone.content {
                ZoneContent::Text(TextLayout::Single(line)) => {
                    slot.primary.advance(line.speed, dt_secs);
                }
                ZoneContent::Text(TextLayout::Double { top, bottom }) => {
                    slot.primary.advance(top.speed, dt_secs);
                    slot.secondary.advance(bottom.speed, dt_secs);
                }
                ZoneContent::Carousel(_) => slot.primary.advance(zone.speed, dt_secs),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/state.rs"]
mod tests;
