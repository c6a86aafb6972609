use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::assets::decode::{PreparedImage, decode_image, looks_like_svg, rasterize_svg};
use crate::assets::video::{VideoClip, decode_video_loop, probe_video};
use crate::config::VideoConfig;
use crate::foundation::error::{BannerError, BannerResult};

/// What a URL is expected to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Still raster or SVG.
    Image,
    /// Background video, decoded through ffmpeg.
    Video,
}

/// One load handed to a [`MediaLoader`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaRequest {
    /// Source URL or path.
    pub url: String,
    /// Expected media kind.
    pub kind: MediaKind,
    /// Height SVGs are rasterized at and videos are stored at.
    pub target_height: u32,
}

/// A decoded, drawable resource.
#[derive(Clone, Debug)]
pub enum MediaResource {
    /// Still image.
    Image(Arc<PreparedImage>),
    /// Looping video clip.
    Video(Arc<VideoClip>),
}

impl MediaResource {
    /// Intrinsic size used by the fit math.
    pub fn intrinsic_size(&self) -> (u32, u32) {
        match self {
            Self::Image(img) => (img.width, img.height),
            Self::Video(clip) => (clip.width, clip.height),
        }
    }
}

/// Resolves a media request to a decoded resource. Called off the frame loop.
pub trait MediaLoader: Send + Sync {
    /// Fetch and decode `request`. Blocking.
    fn load(&self, request: &MediaRequest) -> BannerResult<MediaResource>;
}

/// Where a media URL points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MediaSource {
    Http(String),
    File(PathBuf),
}

impl MediaSource {
    pub(crate) fn classify(url: &str) -> Self {
        let trimmed = url.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Http(trimmed.to_owned())
        } else if let Some(rest) = trimmed.strip_prefix("file://") {
            Self::File(PathBuf::from(rest))
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

/// Loads from `http(s)://`, `file://` and plain paths; decodes images, SVGs and videos.
pub struct SourceLoader {
    client: reqwest::blocking::Client,
    video: VideoConfig,
}

impl SourceLoader {
    /// Loader with an HTTP client and the video sampling settings.
    pub fn new(video: VideoConfig) -> BannerResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("ledbanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client, video })
    }

    fn fetch_bytes(&self, url: &str) -> BannerResult<Vec<u8>> {
        match MediaSource::classify(url) {
            MediaSource::Http(u) => {
                let resp = self
                    .client
                    .get(&u)
                    .send()
                    .with_context(|| format!("GET {u}"))?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(BannerError::media(format!("GET {u} returned {status}")));
                }
                let bytes = resp.bytes().with_context(|| format!("read body of {u}"))?;
                Ok(bytes.to_vec())
            }
            MediaSource::File(p) => {
                Ok(std::fs::read(&p).with_context(|| format!("read '{}'", p.display()))?)
            }
        }
    }
}

impl MediaLoader for SourceLoader {
    #[tracing::instrument(level = "debug", skip(self), fields(url = %request.url))]
    fn load(&self, request: &MediaRequest) -> BannerResult<MediaResource> {
        match request.kind {
            MediaKind::Image => {
                let bytes = self.fetch_bytes(&request.url)?;
                let img = if looks_like_svg(&request.url, &bytes) {
                    rasterize_svg(&bytes, request.target_height)?
                } else {
                    decode_image(&bytes)?
                };
                Ok(MediaResource::Image(Arc::new(img)))
            }
            MediaKind::Video => {
                let source = match MediaSource::classify(&request.url) {
                    MediaSource::Http(u) => u,
                    MediaSource::File(p) => p.to_string_lossy().into_owned(),
                };
                let info = probe_video(&source)?;
                let clip = decode_video_loop(
                    &info,
                    self.video.sample_fps,
                    self.video.max_loop_secs,
                    request.target_height.saturating_mul(2),
                )?;
                Ok(MediaResource::Video(Arc::new(clip)))
            }
        }
    }
}

/// Serves pre-decoded resources by URL; unknown URLs fail.
#[derive(Default)]
pub struct StaticLoader {
    items: HashMap<String, MediaResource>,
}

impl StaticLoader {
    /// Empty loader; every request fails until resources are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `image` for `url`.
    pub fn with_image(mut self, url: impl Into<String>, image: PreparedImage) -> Self {
        self.items
            .insert(url.into(), MediaResource::Image(Arc::new(image)));
        self
    }

    /// Serve `clip` for `url`.
    pub fn with_video(mut self, url: impl Into<String>, clip: VideoClip) -> Self {
        self.items
            .insert(url.into(), MediaResource::Video(Arc::new(clip)));
        self
    }
}

impl MediaLoader for StaticLoader {
    fn load(&self, request: &MediaRequest) -> BannerResult<MediaResource> {
        let res = self
            .items
            .get(&request.url)
            .ok_or_else(|| BannerError::media(format!("no such media '{}'", request.url)))?;
        match (request.kind, res) {
            (MediaKind::Image, MediaResource::Image(_)) | (MediaKind::Video, MediaResource::Video(_)) => {
                Ok(res.clone())
            }
            _ => Err(BannerError::media(format!(
                "'{}' is not a {:?}",
                request.url, request.kind
            ))),
        }
    }
}
