use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::engine::scheduler::FrameScheduler;
use crate::foundation::error::{BannerError, BannerResult};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::plan::FramePlan;

/// Counters reported when a loop finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Frames whose plan failed to render and were replaced by black.
    pub failed_frames: u64,
}

/// Drives a [`FrameScheduler`] into a [`FrameSink`] through a render backend.
pub struct DisplayLoop<B, S> {
    scheduler: FrameScheduler,
    backend: B,
    sink: S,
    fps: u32,
    stop: Arc<AtomicBool>,
}

impl<B: RenderBackend, S: FrameSink> DisplayLoop<B, S> {
    /// Loop at the scheduler's configured fps.
    pub fn new(scheduler: FrameScheduler, backend: B, sink: S) -> BannerResult<Self> {
        let fps = scheduler.config().fps;
        if fps == 0 {
            return Err(BannerError::validation("fps must be non-zero"));
        }
        Ok(Self {
            scheduler,
            backend,
            sink,
            fps,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that ends [`DisplayLoop::run`] after the current frame when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Scheduler driven by this loop.
    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler {
        &mut self.scheduler
    }

    fn sink_config(&self) -> SinkConfig {
        let canvas = self.scheduler.config().canvas;
        SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
        }
    }

    fn render(&mut self, plan: &FramePlan, stats: &mut LoopStats) -> FrameRGBA {
        match self.backend.render_plan(plan) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "frame failed to render, emitting black");
                stats.failed_frames += 1;
                let (w, h) = (plan.canvas.width, plan.canvas.height);
                FrameRGBA {
                    width: w,
                    height: h,
                    data: [0, 0, 0, 255].repeat(w as usize * h as usize),
                    premultiplied: true,
                }
            }
        }
    }

    /// Real-time loop paced against a monotonic clock until the stop flag is set.
    ///
    /// Frames that fall behind schedule are rendered immediately rather than skipped.
    pub fn run(mut self) -> BannerResult<(LoopStats, S)> {
        self.sink.begin(self.sink_config())?;
        let frame_dur = Duration::from_secs_f64(1.0 / f64::from(self.fps));
        let start = Instant::now();
        let mut stats = LoopStats::default();

        while !self.stop.load(Ordering::Relaxed) {
            let ts_ms = start.elapsed().as_secs_f64() * 1000.0;
            let plan = self.scheduler.tick(ts_ms, &mut self.backend);
            let frame = self.render(&plan, &mut stats);
            self.sink.push_frame(stats.frames, &frame)?;
            stats.frames += 1;

            let deadline = start + frame_dur.mul_f64(stats.frames as f64);
            if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
        }
        self.finish(stats)
    }

    /// Render exactly `frames` frames on a fixed time step, starting at wall-clock `start`.
    pub fn run_frames(mut self, frames: u64, start: DateTime<Utc>) -> BannerResult<(LoopStats, S)> {
        self.sink.begin(self.sink_config())?;
        let mut stats = LoopStats::default();
        for i in 0..frames {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let ts_ms = i as f64 * 1000.0 / f64::from(self.fps);
            let now = start + chrono::Duration::microseconds((ts_ms * 1000.0) as i64);
            let plan = self.scheduler.tick_at(ts_ms, now, &mut self.backend);
            let frame = self.render(&plan, &mut stats);
            self.sink.push_frame(i, &frame)?;
            stats.frames += 1;
        }
        self.finish(stats)
    }

    fn finish(mut self, stats: LoopStats) -> BannerResult<(LoopStats, S)> {
        let ended = self.sink.end();
        self.scheduler.teardown();
        ended?;
        tracing::info!(frames = stats.frames, failed = stats.failed_frames, "display loop finished");
        Ok((stats, self.sink))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/display_loop.rs"]
mod tests;
