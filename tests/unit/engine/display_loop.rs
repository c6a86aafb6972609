use chrono::TimeZone;

use super::*;
use crate::assets::cache::LoadStrategy;
use crate::assets::fetch::StaticLoader;
use crate::config::DisplayConfig;
use crate::encode::sink::InMemorySink;
use crate::model::zone::ZoneSet;
use crate::render::cpu::CpuBackend;
use crate::text::engine::{FixedAdvance, FontBook, TextMeasure};

fn scheduler(fps: u32) -> FrameScheduler {
    let cfg = DisplayConfig {
        fps,
        ..DisplayConfig::default()
    };
    FrameScheduler::new(
        cfg,
        ZoneSet::blank(),
        Arc::new(StaticLoader::new()),
        LoadStrategy::Inline,
    )
    .unwrap()
}

struct FailingBackend;

impl TextMeasure for FailingBackend {
    fn measure(&mut self, text: &str, font: Option<&str>, size_px: f32) -> f64 {
        FixedAdvance::default().measure(text, font, size_px)
    }
}

impl RenderBackend for FailingBackend {
    fn render_plan(&mut self, _plan: &FramePlan) -> BannerResult<FrameRGBA> {
        Err(BannerError::render("no surface"))
    }
}

#[test]
fn fixed_step_run_pushes_every_frame_in_order() {
    let lp = DisplayLoop::new(
        scheduler(30),
        CpuBackend::new(FontBook::new()),
        InMemorySink::new(),
    )
    .unwrap();
    let start = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let (stats, sink) = lp.run_frames(3, start).unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(stats.failed_frames, 0);
    assert!(sink.is_ended());
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 1056,
            height: 384,
            fps: 30
        })
    );
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, vec![0, 1, 2]);
    assert_eq!(sink.frames()[0].1.pixel(1000, 300), Some([0, 0, 0, 255]));
}

#[test]
fn render_failures_degrade_to_black_frames() {
    let lp = DisplayLoop::new(scheduler(60), FailingBackend, InMemorySink::keep_last(1)).unwrap();
    let start = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let (stats, sink) = lp.run_frames(2, start).unwrap();
    assert_eq!(stats.failed_frames, 2);
    assert_eq!(sink.frames().len(), 1);
    assert_eq!(sink.frames()[0].1.data.len(), 1056 * 384 * 4);
}

#[test]
fn stop_flag_ends_the_real_time_loop() {
    let lp = DisplayLoop::new(scheduler(120), FailingBackend, InMemorySink::keep_last(2)).unwrap();
    let stop = lp.stop_handle();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Relaxed);
    });
    let (stats, sink) = lp.run().unwrap();
    stopper.join().unwrap();
    assert!(stats.frames >= 1);
    assert!(sink.is_ended());
}
