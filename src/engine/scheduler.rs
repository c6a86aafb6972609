use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::assets::cache::{LoadStrategy, MediaCache};
use crate::assets::fetch::MediaLoader;
use crate::config::DisplayConfig;
use crate::engine::compositor::{ZoneInputs, compose_zone, push_solid_zone};
use crate::engine::state::{ScrollBook, ZoneScroll};
use crate::feed::board::MessageBoard;
use crate::feed::{ContentFeeds, FeedHandle, FeedInbox, FeedUpdate, MessageEvent, feed_channel};
use crate::foundation::core::ZoneId;
use crate::foundation::error::BannerResult;
use crate::model::carousel::CarouselElement;
use crate::model::zone::{CarouselFeed, ZoneSet};
use crate::render::overlay::OverlayAnimator;
use crate::render::plan::FramePlan;
use crate::text::engine::TextMeasure;

/// Top-level frame driver.
///
/// Each [`FrameScheduler::tick`] applies pending media and feed results, composes every zone in
/// ascending id order from the current state, and only then advances scroll offsets (when
/// playing). Pausing freezes offsets while frames keep rendering.
pub struct FrameScheduler {
    cfg: DisplayConfig,
    zones: ZoneSet,
    scroll: ScrollBook,
    media: MediaCache,
    feeds: ContentFeeds,
    board: MessageBoard,
    overlay: OverlayAnimator,
    inbox: Option<FeedInbox>,
    playing: bool,
    last_ts_ms: Option<f64>,
}

impl FrameScheduler {
    /// Validate `cfg` and `zones` and start playing with empty feeds and no messages.
    ///
    /// Media are fetched through `loader`, on the rayon pool or inline per `strategy`.
    pub fn new(
        cfg: DisplayConfig,
        zones: ZoneSet,
        loader: Arc<dyn MediaLoader>,
        strategy: LoadStrategy,
    ) -> BannerResult<Self> {
        cfg.validate()?;
        zones.validate()?;
        let mut scroll = ScrollBook::default();
        scroll.reconcile(&zones);
        let media = MediaCache::new(loader, strategy, cfg.zone_height.saturating_mul(2));
        let overlay = OverlayAnimator::new(cfg.overlay.clone());
        Ok(Self {
            cfg,
            zones,
            scroll,
            media,
            feeds: ContentFeeds::default(),
            board: MessageBoard::new(),
            overlay,
            inbox: None,
            playing: true,
            last_ts_ms: None,
        })
    }

    /// Open the feed channel. A second call replaces the previous inbox.
    pub fn connect_feeds(&mut self) -> FeedHandle {
        let (handle, inbox) = feed_channel();
        self.inbox = Some(inbox);
        handle
    }

    /// Replace the zone profile. Zones whose content is unchanged keep scrolling where they were.
    pub fn set_zones(&mut self, zones: ZoneSet) {
        self.scroll.reconcile(&zones);
        self.zones = zones;
    }

    /// Replace the elements of one carousel feed.
    pub fn set_carousel(&mut self, feed: CarouselFeed, elements: Vec<CarouselElement>) {
        self.feeds.replace(feed, elements);
    }

    /// Resume scrolling.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Freeze scroll offsets. Frames keep rendering and overlays keep their timing.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flip play/pause; returns the new playing state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Whether offsets advance on tick.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Validated display config.
    pub fn config(&self) -> &DisplayConfig {
        &self.cfg
    }

    /// Current zone profile.
    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    /// Scroll state of `zone`.
    pub fn scroll(&self, zone: ZoneId) -> &ZoneScroll {
        self.scroll.zone(zone)
    }

    /// Overlay messages currently known.
    pub fn board(&self) -> &MessageBoard {
        &self.board
    }

    /// Mutable access to the message board.
    pub fn board_mut(&mut self) -> &mut MessageBoard {
        &mut self.board
    }

    /// Last carousel snapshots.
    pub fn feeds(&self) -> &ContentFeeds {
        &self.feeds
    }

    /// Overlay animation state.
    pub fn overlay(&self) -> &OverlayAnimator {
        &self.overlay
    }

    /// Media cache.
    pub fn media(&self) -> &MediaCache {
        &self.media
    }

    /// Apply one feed update as if it had arrived through the channel.
    pub fn apply_update(&mut self, update: FeedUpdate, now: DateTime<Utc>) {
        match update {
            FeedUpdate::Carousel { feed, elements } => self.feeds.replace(feed, elements),
            FeedUpdate::Message(MessageEvent::Upsert { message }) => {
                self.board.upsert(message, now);
            }
            FeedUpdate::Message(MessageEvent::Remove { id }) => {
                if self.board.remove(&id) {
                    tracing::debug!(%id, "overlay message removed by feed");
                }
            }
            FeedUpdate::Profile { zones } => {
                tracing::debug!("zone profile replaced");
                self.set_zones(zones);
            }
        }
    }

    /// Frame at monotonic time `ts_ms`, using the wall clock for message expiry.
    pub fn tick(&mut self, ts_ms: f64, measure: &mut dyn TextMeasure) -> FramePlan {
        self.tick_at(ts_ms, Utc::now(), measure)
    }

    /// Frame at monotonic time `ts_ms` with an explicit wall-clock `now`.
    #[tracing::instrument(level = "trace", skip(self, now, measure))]
    pub fn tick_at(
        &mut self,
        ts_ms: f64,
        now: DateTime<Utc>,
        measure: &mut dyn TextMeasure,
    ) -> FramePlan {
        let dt_secs = match self.last_ts_ms {
            Some(last) if ts_ms > last => (ts_ms - last) / 1000.0,
            _ => 0.0,
        };
        self.last_ts_ms = Some(ts_ms);

        self.media.poll(ts_ms);
        if let Some(inbox) = self.inbox.as_ref() {
            for update in inbox.drain() {
                self.apply_update(update, now);
            }
        }
        self.board.sweep(now, self.cfg.overlay.transition_ms);
        self.overlay.sync(ts_ms, &self.board);

        let mut plan = FramePlan::new(self.cfg.canvas);
        let mut inputs = ZoneInputs {
            measure,
            media: &mut self.media,
            feeds: &self.feeds,
            overlay: &self.overlay,
            now_ms: ts_ms,
        };
        for zone in self.zones.iter() {
            let rect = self.cfg.zone_rect(zone.id);
            let scroll = self.scroll.zone_mut(zone.id);
            let mut ops = Vec::new();
            match compose_zone(&mut ops, &self.cfg, zone, rect, scroll, &mut inputs) {
                Ok(()) => plan.ops.extend(ops),
                Err(e) => {
                    tracing::warn!(zone = %zone.id, error = %e, "zone failed to compose, drawing solid fill");
                    *scroll = ZoneScroll::default();
                    push_solid_zone(&mut plan.ops, rect);
                }
            }
        }

        if self.playing {
            self.scroll.advance(&self.zones, dt_secs);
            self.overlay.advance_scroll(&self.zones, dt_secs);
        }
        plan
    }

    /// Stop the scheduler and drop cached media.
    pub fn teardown(mut self) {
        self.media.clear();
        tracing::debug!("frame scheduler torn down");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
