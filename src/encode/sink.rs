use crate::foundation::error::BannerResult;
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called with strictly increasing frame indices between `begin` and `end`.
pub trait FrameSink: Send {
    /// Prepare for frames of `cfg`'s size and rate.
    fn begin(&mut self, cfg: SinkConfig) -> BannerResult<()>;
    /// Consume frame `idx`.
    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> BannerResult<()>;
    /// Flush and finalize the output.
    fn end(&mut self) -> BannerResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGBA)>,
    /// Keep only the most recent frames when set.
    keep_last: Option<usize>,
    ended: bool,
}

impl InMemorySink {
    /// Sink that keeps every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that retains only the last `n` frames.
    pub fn keep_last(n: usize) -> Self {
        Self {
            keep_last: Some(n.max(1)),
            ..Self::default()
        }
    }

    /// Config passed to `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Retained frames with their indices.
    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> BannerResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> BannerResult<()> {
        self.frames.push((idx, frame.clone()));
        if let Some(n) = self.keep_last
            && self.frames.len() > n
        {
            let excess = self.frames.len() - n;
            self.frames.drain(..excess);
        }
        Ok(())
    }

    fn end(&mut self) -> BannerResult<()> {
        self.ended = true;
        Ok(())
    }
}
