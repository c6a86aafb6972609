//! ledbanner renders a four-zone scrolling LED banner.
//!
//! The banner is a 1056x384 surface holding four stacked zone strips, 96 px high each. Every zone
//! scrolls a text marquee or a carousel of feed elements over an optional image or video
//! background. Temporary overlay messages can preempt any zone for a bounded time.
//!
//! The public API is loop-oriented:
//!
//! - Load and validate a [`DisplayConfig`] and a [`ZoneSet`]
//! - Create a [`FrameScheduler`] and feed it updates through a [`FeedHandle`]
//! - Drive it with a [`DisplayLoop`] that renders through a [`RenderBackend`] into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
// Some internal helpers are only reached from the CPU path or from tests.
#![allow(dead_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod config;
/// Output sinks (in-memory and ffmpeg).
pub mod encode;
pub(crate) mod engine;
/// Content feeds, overlay message board and domain adapters.
pub mod feed;
pub(crate) mod model;
pub(crate) mod render;
pub(crate) mod text;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{
    Affine, Canvas, Point, Rect, Rgba8Premul, Vec2, ZONE_COUNT, ZoneId,
};
pub use crate::foundation::error::{BannerError, BannerResult};

pub use crate::animation::ease::Ease;
pub use crate::config::{
    CarouselConfig, DisplayConfig, ENV_FONTS_DIR, ENV_VIDEO_FPS, OverlayConfig, TextConfig,
    VideoConfig,
};

pub use crate::model::carousel::{CarouselElement, Leading, TwoLine};
pub use crate::model::message::{AnimationProfile, MAX_MESSAGE_DURATION_MS, OverlayMessage};
pub use crate::model::zone::{
    BackgroundKind, BackgroundSpec, CarouselFeed, FitMode, TextLayout, TextLine, Zone,
    ZoneContent, ZoneSet,
};

pub use crate::assets::cache::{
    ImageHandle, LoadStrategy, MediaCache, MediaKey, MediaState, ReadyMedia,
};
pub use crate::assets::decode::{PreparedImage, decode_image, looks_like_svg, rasterize_svg};
pub use crate::assets::fetch::{
    MediaKind, MediaLoader, MediaRequest, MediaResource, SourceLoader, StaticLoader,
};
pub use crate::assets::video::{VideoClip, VideoSourceInfo, decode_video_loop, probe_video};

pub use crate::text::engine::{FixedAdvance, FontBook, ShapedText, TextEngine, TextMeasure};

pub use crate::render::backend::{FrameRGBA, RenderBackend};
pub use crate::render::carousel::carousel_width;
pub use crate::render::cpu::CpuBackend;
pub use crate::render::fit::fit_rect;
pub use crate::render::overlay::{OverlayAnimator, OverlayPhase, OverlayPose, pose_at};
pub use crate::render::plan::{DrawOp, FramePlan, TextRun};
pub use crate::render::text_scroll::tile_positions;

pub use crate::feed::board::MessageBoard;
pub use crate::feed::{ContentFeeds, FeedHandle, FeedInbox, FeedUpdate, MessageEvent, feed_channel};

pub use crate::engine::display_loop::{DisplayLoop, LoopStats};
pub use crate::engine::scheduler::FrameScheduler;
pub use crate::engine::state::{PX_PER_SEC_AT_UNIT_SPEED, ScrollState, ZoneScroll};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, OutputTarget};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
