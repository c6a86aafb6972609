use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{BannerError, BannerResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

/// Where the encoded stream goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    /// Container inferred by `ffmpeg` from the extension.
    File(String),
    /// Live stream; `format` is the ffmpeg muxer (`mpegts`, `flv`).
    Stream {
        /// Destination URL.
        url: String,
        /// Muxer name.
        format: &'static str,
    },
}

impl OutputTarget {
    /// `udp://`, `srt://` and `tcp://` stream MPEG-TS; `rtmp(s)://` streams FLV; anything else is a file.
    pub fn classify(output: &str) -> Self {
        let lower = output.to_ascii_lowercase();
        let format = if ["udp://", "srt://", "tcp://"].iter().any(|p| lower.starts_with(p)) {
            Some("mpegts")
        } else if lower.starts_with("rtmp://") || lower.starts_with("rtmps://") {
            Some("flv")
        } else {
            None
        };
        match format {
            Some(format) => Self::Stream {
                url: output.to_owned(),
                format,
            },
            None => Self::File(output.to_owned()),
        }
    }

    /// Whether output goes to a network stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream { .. })
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// File or stream destination.
    pub target: OutputTarget,
    /// Overwrite an existing output file.
    pub overwrite: bool,
    /// Background used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Options for `output`, overwriting files and flattening onto black.
    pub fn new(output: &str) -> Self {
        Self {
            target: OutputTarget::classify(output),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Spawns the system `ffmpeg` and streams raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<u64>,
}

impl FfmpegSink {
    /// Sink that spawns `ffmpeg` on [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

/// Full `ffmpeg` argument list for raw RGBA input of `cfg` written to `opts.target`.
pub fn ffmpeg_args(cfg: SinkConfig, opts: &FfmpegSinkOpts) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut push = |items: &[&str]| args.extend(items.iter().map(|s| (*s).to_owned()));

    push(&[if opts.overwrite { "-y" } else { "-n" }]);
    push(&["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"]);
    push(&["-s", &format!("{}x{}", cfg.width, cfg.height)]);
    push(&["-r", &cfg.fps.to_string(), "-i", "pipe:0"]);
    push(&["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"]);
    match &opts.target {
        OutputTarget::File(path) => {
            push(&["-movflags", "+faststart", path]);
        }
        OutputTarget::Stream { url, format } => {
            let gop = (cfg.fps.max(1) * 2).to_string();
            push(&["-preset", "veryfast", "-tune", "zerolatency", "-g", &gop]);
            push(&["-f", format, url]);
        }
    }
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> BannerResult<()> {
        if cfg.fps == 0 {
            return Err(BannerError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(BannerError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(BannerError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        if let OutputTarget::File(path) = &self.opts.target {
            let path = Path::new(path);
            ensure_parent_dir(path)?;
            if !self.opts.overwrite && path.exists() {
                return Err(BannerError::validation(format!(
                    "output file '{}' already exists",
                    path.display()
                )));
            }
        }

        if !is_ffmpeg_on_path() {
            return Err(BannerError::encode(
                "ffmpeg is required for video output, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(ffmpeg_args(cfg, &self.opts))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BannerError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;
        tracing::info!(target = ?self.opts.target, width = cfg.width, height = cfg.height, fps = cfg.fps, "ffmpeg started");

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BannerError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| BannerError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> BannerResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| BannerError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(BannerError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(BannerError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(BannerError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            BannerError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> BannerResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| BannerError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| BannerError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| BannerError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| BannerError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(BannerError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

/// Composite premultiplied RGBA8 over an opaque background; `dst` ends up fully opaque.
fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg_rgba: [u8; 4]) -> BannerResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(BannerError::validation(
            "frame data size does not match width*height*4",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> BannerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
