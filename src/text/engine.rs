//! Font registry, text shaping and width measurement.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{BannerError, BannerResult};

/// Width measurement used by layout. Failures measure as `0.0` and draw nothing.
pub trait TextMeasure {
    /// Advance width of `text` at `size_px`, in pixels.
    fn measure(&mut self, text: &str, font: Option<&str>, size_px: f32) -> f64;
}

/// Every character advances by `advance_em * size_px`. Deterministic, needs no fonts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvance {
    /// Advance per character, in em.
    pub advance_em: f32,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self { advance_em: 0.6 }
    }
}

impl TextMeasure for FixedAdvance {
    fn measure(&mut self, text: &str, _font: Option<&str>, size_px: f32) -> f64 {
        text.chars().count() as f64 * f64::from(self.advance_em * size_px)
    }
}

/// Font files by identifier (file stem), e.g. `HelveticaBoldExtended`.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    fonts: Vec<(String, Arc<Vec<u8>>)>,
    default: Option<String>,
}

impl FontBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.ttf`/`.otf` in `dir`.
    pub fn from_dir(dir: &Path) -> BannerResult<Self> {
        let mut book = Self::new();
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("read fonts dir '{}'", dir.display()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.context("read fonts dir entry")?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"));
            if is_font {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes =
                std::fs::read(&path).with_context(|| format!("read font '{}'", path.display()))?;
            tracing::debug!(font = stem, bytes = bytes.len(), "registered font");
            book.insert(stem, bytes);
        }
        Ok(book)
    }

    /// Register `bytes` as font `name`, replacing any previous font of that name.
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        let bytes = Arc::new(bytes);
        match self.fonts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = bytes,
            None => self.fonts.push((name, bytes)),
        }
    }

    /// Font used when a run names none.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default = Some(name.into());
    }

    /// Whether no font is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Requested font, else the default font, else the first installed one.
    pub fn resolve(&self, name: Option<&str>) -> Option<(&str, &Arc<Vec<u8>>)> {
        let find = |n: &str| {
            self.fonts
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(n))
                .map(|(k, v)| (k.as_str(), v))
        };
        name.and_then(find)
            .or_else(|| self.default.as_deref().and_then(find))
            .or_else(|| self.fonts.first().map(|(k, v)| (k.as_str(), v)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    font: String,
    size_bits: u32,
}

const LAYOUT_CACHE_CAP: usize = 512;

/// A shaped single line plus the font it was shaped with.
#[derive(Clone)]
pub struct ShapedText {
    /// Shaped layout.
    pub layout: Arc<parley::Layout<()>>,
    /// Font the layout was shaped with.
    pub font_bytes: Arc<Vec<u8>>,
    /// Advance width in pixels.
    pub width: f64,
    /// Distance from the layout top to the first baseline.
    pub baseline: f64,
}

/// Parley-backed shaper with a layout cache.
pub struct TextEngine {
    book: FontBook,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    families: HashMap<String, String>,
    layouts: HashMap<LayoutKey, ShapedText>,
}

impl TextEngine {
    /// Engine shaping with fonts from `book`.
    pub fn new(book: FontBook) -> Self {
        Self {
            book,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
            layouts: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &str, bytes: &Arc<Vec<u8>>) -> BannerResult<String> {
        if let Some(f) = self.families.get(font) {
            return Ok(f.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            BannerError::render(format!("no font families registered from '{font}'"))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BannerError::render(format!("font '{font}' has no family name")))?
            .to_string();
        self.families.insert(font.to_owned(), family_name.clone());
        Ok(family_name)
    }

    /// Shape `text` on one line.
    pub fn shape(&mut self, text: &str, font: Option<&str>, size_px: f32) -> BannerResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(BannerError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let (font_name, bytes) = self
            .book
            .resolve(font)
            .map(|(n, b)| (n.to_owned(), Arc::clone(b)))
            .ok_or_else(|| BannerError::render("no fonts installed"))?;

        let key = LayoutKey {
            text: text.to_owned(),
            font: font_name.clone(),
            size_bits: size_px.to_bits(),
        };
        if let Some(hit) = self.layouts.get(&key) {
            return Ok(hit.clone());
        }

        let family_name = self.family_for(&font_name, &bytes)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let baseline = layout
            .lines()
            .next()
            .map(|l| f64::from(l.metrics().baseline))
            .unwrap_or(0.0);
        let shaped = ShapedText {
            width: f64::from(layout.full_width()),
            layout: Arc::new(layout),
            font_bytes: bytes,
            baseline,
        };

        if self.layouts.len() >= LAYOUT_CACHE_CAP {
            self.layouts.clear();
        }
        self.layouts.insert(key, shaped.clone());
        Ok(shaped)
    }
}

impl TextMeasure for TextEngine {
    fn measure(&mut self, text: &str, font: Option<&str>, size_px: f32) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        match self.shape(text, font, size_px) {
            Ok(s) if s.width.is_finite() => s.width.max(0.0),
            Ok(_) => 0.0,
            Err(e) => {
                tracing::debug!(error = %e, "text measurement failed");
                0.0
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
