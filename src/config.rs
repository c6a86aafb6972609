//! Display configuration.
//!
//! Every field has a default matching the physical installation (1056x384 surface, four 96 px
//! strips, zone 4 narrower), so an empty JSON object is a valid config file.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::animation::ease::Ease;
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Rect, ZONE_COUNT, ZoneId};
use crate::foundation::error::{BannerError, BannerResult};

/// Environment override for [`DisplayConfig::fonts_dir`].
pub const ENV_FONTS_DIR: &str = "LEDBANNER_FONTS_DIR";
/// Environment override for [`VideoConfig::sample_fps`].
pub const ENV_VIDEO_FPS: &str = "LEDBANNER_VIDEO_FPS";

/// Banner geometry and rendering settings.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Output surface.
    pub canvas: Canvas,
    /// Height of every zone strip.
    pub zone_height: u32,
    /// Strip widths by zone id order.
    pub zone_widths: [u32; ZONE_COUNT],
    /// Text zone settings.
    pub text: TextConfig,
    /// Carousel strip settings.
    pub carousel: CarouselConfig,
    /// Overlay message settings.
    pub overlay: OverlayConfig,
    /// 1 px rule between the halves of a double-line zone.
    pub divider_color: Color,
    /// Font used when a zone names none, or names one that is not installed.
    pub default_font: String,
    /// Directory scanned for `.ttf`/`.otf` files; file stems become font identifiers.
    pub fonts_dir: Option<PathBuf>,
    /// Background video sampling.
    pub video: VideoConfig,
    /// Target rate of the real-time display loop.
    pub fps: u32,
}

/// Font sizes and tile spacing of text zones.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Font size of a single-line zone.
    pub single_font_px: f32,
    /// Font size of each half of a double-line zone.
    pub double_font_px: f32,
    /// Gap between repeats of a single line.
    pub single_spacing_px: f64,
    /// Gap between repeats of a double-line half.
    pub double_spacing_px: f64,
}

/// Carousel element sizing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Font size of single-line elements.
    pub font_px: f32,
    /// Font size of each line of a two-line element.
    pub two_line_font_px: f32,
    /// Gap between neighbouring elements, including across the seam.
    pub element_spacing_px: f64,
    /// Gap between a leading image/glyph and the element text.
    pub image_gap_px: f64,
    /// Height leading images are scaled to.
    pub image_height_px: f64,
    /// Widest a leading image may become after scaling.
    pub image_max_width_px: f64,
    /// Width reserved for a leading image that is still loading.
    pub placeholder_width_px: f64,
    /// Text color of elements that carry none.
    pub default_color: Color,
}

/// Overlay message presentation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Font size of overlay text.
    pub font_px: f32,
    /// Entry and exit window of every overlay message.
    pub transition_ms: u64,
    /// Backdrop of `fade` and `slide` messages.
    pub scrim_color: Color,
    /// Overlay text color.
    pub text_color: Color,
    /// Curve of the fade in and out.
    pub fade_ease: Ease,
    /// Curve of the slide entry.
    pub slide_in_ease: Ease,
    /// Curve of the slide exit.
    pub slide_out_ease: Ease,
    /// Gap between repeated passes of a `scroll` message.
    pub scroll_spacing_px: f64,
}

/// Background video sampling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Frames per second sampled from background videos.
    pub sample_fps: f64,
    /// Longest stretch of a background video kept in memory; playback loops over it.
    pub max_loop_secs: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1056,
                height: 384,
            },
            zone_height: 96,
            zone_widths: [1056, 1056, 1056, 864],
            text: TextConfig::default(),
            carousel: CarouselConfig::default(),
            overlay: OverlayConfig::default(),
            divider_color: Color::rgb(0x55, 0x55, 0x55),
            default_font: "HelveticaBoldExtended".to_owned(),
            fonts_dir: None,
            video: VideoConfig::default(),
            fps: 60,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            single_font_px: 48.0,
            double_font_px: 32.0,
            single_spacing_px: 50.0,
            double_spacing_px: 40.0,
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            font_px: 40.0,
            two_line_font_px: 26.0,
            element_spacing_px: 80.0,
            image_gap_px: 16.0,
            image_height_px: 72.0,
            image_max_width_px: 160.0,
            placeholder_width_px: 96.0,
            default_color: Color::WHITE,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_px: 32.0,
            transition_ms: 500,
            scrim_color: Color::rgba(0, 0, 0, 204),
            text_color: Color::WHITE,
            fade_ease: Ease::Linear,
            slide_in_ease: Ease::OutCubic,
            slide_out_ease: Ease::InCubic,
            scroll_spacing_px: 80.0,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            sample_fps: 24.0,
            max_loop_secs: 10.0,
        }
    }
}

impl DisplayConfig {
    /// Read a JSON config file, apply environment overrides and validate.
    pub fn load(path: &Path) -> BannerResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let mut cfg = Self::from_json_str(&text)?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON config without applying overrides or validating.
    pub fn from_json_str(s: &str) -> BannerResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Apply `LEDBANNER_FONTS_DIR` and `LEDBANNER_VIDEO_FPS` when set.
    pub fn apply_env_overrides(&mut self) -> BannerResult<()> {
        self.apply_overrides(
            std::env::var(ENV_FONTS_DIR).ok(),
            std::env::var(ENV_VIDEO_FPS).ok(),
        )
    }

    pub(crate) fn apply_overrides(
        &mut self,
        fonts_dir: Option<String>,
        video_fps: Option<String>,
    ) -> BannerResult<()> {
        if let Some(dir) = fonts_dir.filter(|d| !d.trim().is_empty()) {
            self.fonts_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = video_fps {
            let fps: f64 = raw.trim().parse().map_err(|_| {
                BannerError::validation(format!("{ENV_VIDEO_FPS} must be a number, got '{raw}'"))
            })?;
            self.video.sample_fps = fps;
        }
        Ok(())
    }

    /// Reject configs the renderer cannot draw.
    pub fn validate(&self) -> BannerResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(BannerError::validation("canvas width/height must be non-zero"));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(BannerError::validation("canvas dimensions must fit in u16"));
        }
        if self.zone_height == 0 || self.zone_height * ZONE_COUNT as u32 > self.canvas.height {
            return Err(BannerError::validation(format!(
                "{ZONE_COUNT} zones of height {} do not fit a canvas of height {}",
                self.zone_height, self.canvas.height
            )));
        }
        for (i, w) in self.zone_widths.iter().enumerate() {
            if *w == 0 || *w > self.canvas.width {
                return Err(BannerError::validation(format!(
                    "zone {} width {w} must be in 1..={}",
                    i + 1,
                    self.canvas.width
                )));
            }
        }

        let positive = [
            ("text.single_font_px", f64::from(self.text.single_font_px)),
            ("text.double_font_px", f64::from(self.text.double_font_px)),
            ("carousel.font_px", f64::from(self.carousel.font_px)),
            ("carousel.two_line_font_px", f64::from(self.carousel.two_line_font_px)),
            ("carousel.image_height_px", self.carousel.image_height_px),
            ("carousel.image_max_width_px", self.carousel.image_max_width_px),
            ("overlay.font_px", f64::from(self.overlay.font_px)),
            ("video.sample_fps", self.video.sample_fps),
            ("video.max_loop_secs", self.video.max_loop_secs),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(BannerError::validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }

        let non_negative = [
            ("text.single_spacing_px", self.text.single_spacing_px),
            ("text.double_spacing_px", self.text.double_spacing_px),
            ("carousel.element_spacing_px", self.carousel.element_spacing_px),
            ("carousel.image_gap_px", self.carousel.image_gap_px),
            ("carousel.placeholder_width_px", self.carousel.placeholder_width_px),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(BannerError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }

        if self.fps == 0 {
            return Err(BannerError::validation("fps must be non-zero"));
        }
        Ok(())
    }

    /// Canvas rectangle of a zone strip. Zones stack top to bottom, left aligned.
    pub fn zone_rect(&self, id: ZoneId) -> Rect {
        let h = f64::from(self.zone_height);
        let y0 = h * id.index() as f64;
        Rect::new(0.0, y0, f64::from(self.zone_widths[id.index()]), y0 + h)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
