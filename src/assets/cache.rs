use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::assets::decode::PreparedImage;
use crate::assets::fetch::{MediaKind, MediaLoader, MediaRequest, MediaResource};
use crate::foundation::core::ZoneId;
use crate::foundation::error::BannerResult;
use crate::foundation::math::Fnv1a64;

/// Cache key: media are per zone, so two zones showing one URL load it twice.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaKey {
    /// Zone the media is shown in.
    pub zone: ZoneId,
    /// Source URL or path.
    pub url: String,
}

impl MediaKey {
    /// Key for `url` shown in `zone`.
    pub fn new(zone: ZoneId, url: impl Into<String>) -> Self {
        Self {
            zone,
            url: url.into(),
        }
    }

    fn hash64(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u8(self.zone.get());
        h.write_bytes(self.url.as_bytes());
        h.finish()
    }
}

/// A raster ready to draw. `id` is stable for identical pixels so backends can cache uploads.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    /// Stable identity of the pixels.
    pub id: u64,
    /// Decoded pixels.
    pub image: Arc<PreparedImage>,
}

/// A loaded resource and the frame it became visible on.
#[derive(Clone, Debug)]
pub struct ReadyMedia {
    /// Decoded image or video.
    pub resource: MediaResource,
    /// Frame timestamp at which the resource became visible; videos loop from here.
    pub ready_at_ms: f64,
    key_hash: u64,
}

impl ReadyMedia {
    /// Intrinsic size used for fitting.
    pub fn intrinsic_size(&self) -> (u32, u32) {
        self.resource.intrinsic_size()
    }

    /// Image to draw at `now_ms`.
    pub fn frame_at(&self, now_ms: f64) -> ImageHandle {
        match &self.resource {
            MediaResource::Image(img) => ImageHandle {
                id: self.key_hash,
                image: Arc::clone(img),
            },
            MediaResource::Video(clip) => {
                let (idx, frame) = clip.frame_at((now_ms - self.ready_at_ms) / 1000.0);
                let mut h = Fnv1a64::new_default();
                h.write_u64(self.key_hash);
                h.write_u64(idx as u64);
                ImageHandle {
                    id: h.finish(),
                    image: Arc::clone(frame),
                }
            }
        }
    }
}

/// Load state of one cache entry.
#[derive(Clone, Debug)]
pub enum MediaState {
    /// Load in flight; draw the fallback fill.
    Pending,
    /// Loaded and drawable.
    Ready(ReadyMedia),
    /// Load failed; never retried.
    Failed,
}

/// Whether loads run on the rayon pool or inside `get_or_load`.
///
/// Either way the result is published on the channel and only becomes visible after the next
/// [`MediaCache::poll`], so a draw never observes a load completing mid-frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Load on the rayon pool.
    #[default]
    Background,
    /// Load synchronously inside `get_or_load`. Used for offline rendering and tests.
    Inline,
}

type LoadResult = (MediaKey, BannerResult<MediaResource>);

/// Per-(zone, URL) media cache with a Pending/Ready/Failed state per key.
///
/// Entries are never evicted or reloaded; [`MediaCache::clear`] drops everything at teardown.
pub struct MediaCache {
    entries: HashMap<MediaKey, MediaState>,
    loader: Arc<dyn MediaLoader>,
    strategy: LoadStrategy,
    target_height: u32,
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
}

impl MediaCache {
    /// Cache loading through `loader`. SVGs and videos are prepared at `target_height`.
    pub fn new(loader: Arc<dyn MediaLoader>, strategy: LoadStrategy, target_height: u32) -> Self {
        let (tx, rx) = channel();
        Self {
            entries: HashMap::new(),
            loader,
            strategy,
            target_height,
            tx,
            rx,
        }
    }

    /// Current state for `key`, starting a load the first time the key is seen.
    pub fn get_or_load(&mut self, key: &MediaKey, kind: MediaKind) -> MediaState {
        if let Some(state) = self.entries.get(key) {
            return state.clone();
        }

        self.entries.insert(key.clone(), MediaState::Pending);
        let request = MediaRequest {
            url: key.url.clone(),
            kind,
            target_height: self.target_height,
        };
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let key = key.clone();
        tracing::debug!(zone = %key.zone, url = %key.url, ?kind, "media load started");
        match self.strategy {
            LoadStrategy::Background => rayon::spawn(move || {
                let res = loader.load(&request);
                // The receiver is gone after teardown; late results are dropped.
                let _ = tx.send((key, res));
            }),
            LoadStrategy::Inline => {
                let res = loader.load(&request);
                let _ = tx.send((key, res));
            }
        }
        MediaState::Pending
    }

    /// Current state of `key`, without starting a load.
    pub fn state(&self, key: &MediaKey) -> Option<&MediaState> {
        self.entries.get(key)
    }

    /// Apply finished loads. Returns how many entries changed state.
    pub fn poll(&mut self, now_ms: f64) -> usize {
        let mut applied = 0;
        while let Ok((key, res)) = self.rx.try_recv() {
            let Some(slot) = self.entries.get_mut(&key) else {
                continue;
            };
            *slot = match res {
                Ok(resource) => {
                    let (w, h) = resource.intrinsic_size();
                    tracing::debug!(zone = %key.zone, url = %key.url, w, h, "media ready");
                    MediaState::Ready(ReadyMedia {
                        resource,
                        ready_at_ms: now_ms,
                        key_hash: key.hash64(),
                    })
                }
                Err(e) => {
                    tracing::warn!(zone = %key.zone, url = %key.url, error = %e, "media load failed, using solid fill");
                    MediaState::Failed
                }
            };
            applied += 1;
        }
        applied
    }

    /// Number of known keys in any state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key was ever requested.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Loads still in flight are discarded when they land.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
