use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::assets::fetch::StaticLoader;
use crate::assets::video::VideoClip;

struct CountingLoader {
    inner: StaticLoader,
    calls: AtomicUsize,
}

impl MediaLoader for CountingLoader {
    fn load(&self, request: &MediaRequest) -> BannerResult<MediaResource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(request)
    }
}

fn zone(id: u8) -> ZoneId {
    ZoneId::new(id).unwrap()
}

fn counting() -> Arc<CountingLoader> {
    Arc::new(CountingLoader {
        inner: StaticLoader::new()
            .with_image("bg.png", PreparedImage::solid(200, 100, [255, 0, 0, 255]).unwrap()),
        calls: AtomicUsize::new(0),
    })
}

#[test]
fn inline_load_becomes_visible_after_poll_and_loads_once() {
    let loader = counting();
    let mut cache = MediaCache::new(loader.clone(), LoadStrategy::Inline, 96);
    let key = MediaKey::new(zone(1), "bg.png");

    assert!(matches!(cache.get_or_load(&key, MediaKind::Image), MediaState::Pending));
    assert!(matches!(cache.get_or_load(&key, MediaKind::Image), MediaState::Pending));
    assert_eq!(cache.poll(16.0), 1);

    let MediaState::Ready(ready) = cache.get_or_load(&key, MediaKind::Image) else {
        panic!("expected ready");
    };
    assert_eq!(ready.intrinsic_size(), (200, 100));
    assert_eq!(ready.ready_at_ms, 16.0);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failures_are_sticky_and_not_retried() {
    let loader = counting();
    let mut cache = MediaCache::new(loader.clone(), LoadStrategy::Inline, 96);
    let key = MediaKey::new(zone(2), "missing.png");

    cache.get_or_load(&key, MediaKind::Image);
    cache.poll(0.0);
    assert!(matches!(cache.get_or_load(&key, MediaKind::Image), MediaState::Failed));
    cache.poll(1.0);
    assert!(matches!(cache.get_or_load(&key, MediaKind::Image), MediaState::Failed));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn same_url_in_two_zones_is_two_entries() {
    let loader = counting();
    let mut cache = MediaCache::new(loader.clone(), LoadStrategy::Inline, 96);
    cache.get_or_load(&MediaKey::new(zone(1), "bg.png"), MediaKind::Image);
    cache.get_or_load(&MediaKey::new(zone(3), "bg.png"), MediaKind::Image);
    assert_eq!(cache.len(), 2);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn background_loads_arrive_eventually() {
    let mut cache = MediaCache::new(counting(), LoadStrategy::Background, 96);
    let key = MediaKey::new(zone(1), "bg.png");
    cache.get_or_load(&key, MediaKind::Image);

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while cache.poll(0.0) == 0 {
        assert!(std::time::Instant::now() < deadline, "load never completed");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(matches!(cache.state(&key), Some(MediaState::Ready(_))));
}

#[test]
fn video_frames_advance_from_ready_time() {
    let frames = (0..4)
        .map(|i| PreparedImage::solid(2, 2, [i * 60, 0, 0, 255]).unwrap())
        .collect();
    let clip = VideoClip::new(640, 360, 4.0, frames).unwrap();
    let loader = Arc::new(StaticLoader::new().with_video("loop.mp4", clip));
    let mut cache = MediaCache::new(loader, LoadStrategy::Inline, 96);
    let key = MediaKey::new(zone(4), "loop.mp4");
    cache.get_or_load(&key, MediaKind::Video);
    cache.poll(1000.0);

    let Some(MediaState::Ready(ready)) = cache.state(&key) else {
        panic!("expected ready");
    };
    let a = ready.frame_at(1000.0);
    let b = ready.frame_at(1250.0);
    let c = ready.frame_at(2000.0);
    assert_ne!(a.id, b.id);
    assert_eq!(a.id, c.id);
    assert_eq!(b.image.rgba8_premul[0], 60);
}

#[test]
fn clear_drops_everything() {
    let mut cache = MediaCache::new(counting(), LoadStrategy::Inline, 96);
    cache.get_or_load(&MediaKey::new(zone(1), "bg.png"), MediaKind::Image);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.poll(0.0), 0);
}
