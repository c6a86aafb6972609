use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::error::{BannerError, BannerResult};

/// Basic metadata about a background video.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Path or URL handed to ffmpeg.
    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    pub source: String,
    /// Intrinsic width.
    pub width: u32,
    /// Intrinsic height.
    pub height: u32,
}

/// A muted, looping stretch of video held in memory as decoded frames.
///
/// `width`/`height` are the source's intrinsic size, used for fitting; frames may be stored at a
/// lower resolution.
#[derive(Clone, Debug)]
pub struct VideoClip {
    /// Intrinsic width of the source.
    pub width: u32,
    /// Intrinsic height of the source.
    pub height: u32,
    /// Rate the frames were sampled at.
    pub fps: f64,
    frames: Vec<Arc<PreparedImage>>,
}

impl VideoClip {
    /// Build a clip from decoded frames sampled at `fps`.
    pub fn new(width: u32, height: u32, fps: f64, frames: Vec<PreparedImage>) -> BannerResult<Self> {
        if frames.is_empty() {
            return Err(BannerError::media("video clip has no frames"));
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(BannerError::media(format!("video fps must be > 0, got {fps}")));
        }
        if width == 0 || height == 0 {
            return Err(BannerError::media("video has zero width or height"));
        }
        Ok(Self {
            width,
            height,
            fps,
            frames: frames.into_iter().map(Arc::new).collect(),
        })
    }

    /// Number of frames in one loop.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame shown `elapsed_secs` after playback started, looping forever.
    pub fn frame_at(&self, elapsed_secs: f64) -> (usize, &Arc<PreparedImage>) {
        let n = self.frames.len();
        let idx = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
            ((elapsed_secs * self.fps).floor() as u64 % n as u64) as usize
        } else {
            0
        };
        (idx, &self.frames[idx])
    }
}

/// Stored frame size: intrinsic size scaled down to at most `max_height`, even dimensions.
pub(crate) fn stored_frame_size(width: u32, height: u32, max_height: u32) -> (u32, u32) {
    let h = height.min(max_height.max(2));
    let w = (f64::from(width) * f64::from(h) / f64::from(height.max(1))).round() as u32;
    let even = |v: u32| (v.max(2) / 2) * 2;
    (even(w), even(h))
}

/// Probe source video metadata through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument(level = "debug")]
pub fn probe_video(source: &str) -> BannerResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(source)
        .output()
        .map_err(|e| BannerError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(BannerError::media(format!(
            "ffprobe failed for '{source}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| BannerError::media(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| BannerError::media("no video stream found"))?;
    let width = stream
        .width
        .ok_or_else(|| BannerError::media("missing video width from ffprobe"))?;
    let height = stream
        .height
        .ok_or_else(|| BannerError::media("missing video height from ffprobe"))?;

    Ok(VideoSourceInfo {
        source: source.to_owned(),
        width,
        height,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe source video metadata through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_video(_source: &str) -> BannerResult<VideoSourceInfo> {
    Err(BannerError::media(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}

/// Decode the first `max_secs` of a video at `fps`, scaled to at most `max_height` rows.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument(level = "debug", skip(info), fields(source = %info.source))]
pub fn decode_video_loop(
    info: &VideoSourceInfo,
    fps: f64,
    max_secs: f64,
    max_height: u32,
) -> BannerResult<VideoClip> {
    let (w, h) = stored_frame_size(info.width, info.height, max_height);
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&info.source)
        .args([
            "-an",
            "-t",
            &format!("{max_secs:.3}"),
            "-vf",
            &format!("fps={fps},scale={w}:{h}"),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| BannerError::media(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(BannerError::media(format!(
            "ffmpeg video decode failed for '{}': {}",
            info.source,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let frame_len = w as usize * h as usize * 4;
    if out.stdout.len() < frame_len || !out.stdout.len().is_multiple_of(frame_len) {
        return Err(BannerError::media(format!(
            "decoded video has invalid size: got {} bytes, expected multiples of {frame_len}",
            out.stdout.len()
        )));
    }

    let frames = out
        .stdout
        .chunks_exact(frame_len)
        .map(|chunk| {
            let mut px = chunk.to_vec();
            crate::foundation::math::premultiply_rgba8_in_place(&mut px);
            PreparedImage::from_premul(w, h, px)
        })
        .collect::<BannerResult<Vec<_>>>()?;
    tracing::debug!(frames = frames.len(), w, h, "decoded video loop");
    VideoClip::new(info.width, info.height, fps, frames)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode the first `max_secs` of a video at `fps`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_video_loop(
    _info: &VideoSourceInfo,
    _fps: f64,
    _max_secs: f64,
    _max_height: u32,
) -> BannerResult<VideoClip> {
    Err(BannerError::media(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}
