//! Out-of-band content: carousel feed snapshots, overlay messages and profile swaps.
//!
//! Producers hold a [`FeedHandle`] and publish whole [`FeedUpdate`]s from any thread. The frame
//! loop owns the matching [`FeedInbox`] and drains it once per frame, so every change becomes
//! visible at a frame boundary.

pub mod adapters;
/// Overlay message store mirrored by the frame loop.
pub mod board;

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{BannerError, BannerResult};
use crate::model::carousel::CarouselElement;
use crate::model::message::OverlayMessage;
use crate::model::zone::{CarouselFeed, ZoneSet};

/// Last-known element list per carousel feed. Lists are replaced wholesale, never edited.
#[derive(Clone, Debug)]
pub struct ContentFeeds {
    snapshots: [Arc<[CarouselElement]>; 3],
}

impl Default for ContentFeeds {
    fn default() -> Self {
        Self {
            snapshots: std::array::from_fn(|_| Arc::from(Vec::new())),
        }
    }
}

fn feed_slot(feed: CarouselFeed) -> usize {
    match feed {
        CarouselFeed::Informational => 0,
        CarouselFeed::StatGameA => 1,
        CarouselFeed::StatGameB => 2,
    }
}

impl ContentFeeds {
    /// Current elements of `feed`.
    pub fn get(&self, feed: CarouselFeed) -> Arc<[CarouselElement]> {
        Arc::clone(&self.snapshots[feed_slot(feed)])
    }

    /// Replace all elements of `feed`.
    pub fn replace(&mut self, feed: CarouselFeed, elements: Vec<CarouselElement>) {
        tracing::debug!(?feed, count = elements.len(), "carousel feed replaced");
        self.snapshots[feed_slot(feed)] = Arc::from(elements);
    }
}

/// Change to one overlay message record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MessageEvent {
    /// Insert a record or replace the one with the same id.
    Upsert {
        /// The full record.
        message: OverlayMessage,
    },
    /// Delete a record.
    Remove {
        /// Id of the record to delete.
        id: String,
    },
}

/// One change published to the frame loop. JSON form is tagged by `type`, e.g.
/// `{"type":"message","event":"remove","id":"42"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedUpdate {
    /// Fresh snapshot of one carousel feed.
    Carousel {
        /// Feed being replaced.
        feed: CarouselFeed,
        /// Its new elements, in display order.
        elements: Vec<CarouselElement>,
    },
    /// Overlay message change.
    Message(MessageEvent),
    /// Switch to another zone profile.
    Profile {
        /// The new zones.
        zones: ZoneSet,
    },
}

impl FeedUpdate {
    /// Parse one JSON-lines record. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> BannerResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(line)?))
    }
}

/// Publishing side of the feed channel. Cheap to clone and `Send`.
#[derive(Clone, Debug)]
pub struct FeedHandle {
    tx: Sender<FeedUpdate>,
}

impl FeedHandle {
    /// Send `update`. Fails once the loop has shut down.
    pub fn publish(&self, update: FeedUpdate) -> BannerResult<()> {
        self.tx
            .send(update)
            .map_err(|_| BannerError::feed("display loop is gone"))
    }
}

/// Receiving side, owned by the frame scheduler.
#[derive(Debug)]
pub struct FeedInbox {
    rx: Receiver<FeedUpdate>,
}

impl FeedInbox {
    /// Everything published since the last drain, in publish order.
    pub fn drain(&self) -> Vec<FeedUpdate> {
        self.rx.try_iter().collect()
    }
}

/// Create a connected handle and inbox.
pub fn feed_channel() -> (FeedHandle, FeedInbox) {
    let (tx, rx) = channel();
    (FeedHandle { tx }, FeedInbox { rx })
}

#[cfg(test)]
#[path = "../../tests/unit/feed/mod.rs"]
mod tests;
