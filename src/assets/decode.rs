use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{BannerError, BannerResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster, premultiplied RGBA8, tightly packed.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap already premultiplied bytes, checking the length against the size.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> BannerResult<Self> {
        if width == 0 || height == 0 {
            return Err(BannerError::media("image has zero width or height"));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(BannerError::media(format!(
                "image byte len {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Solid-color image, handy for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba_straight: [u8; 4]) -> BannerResult<Self> {
        let mut px = rgba_straight;
        premultiply_rgba8_in_place(&mut px);
        let bytes = px
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 4)
            .collect();
        Self::from_premul(width, height, bytes)
    }
}

/// Largest raster side the renderer can paint.
pub(crate) const MAX_RASTER_DIM: u32 = u16::MAX as u32;

/// Decode a raster (PNG, JPEG, GIF, WebP) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> BannerResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let (w, h) = (dyn_img.width(), dyn_img.height());
    if w > MAX_RASTER_DIM || h > MAX_RASTER_DIM {
        return Err(BannerError::media(format!(
            "image too large: {w}x{h} (max {MAX_RASTER_DIM} per side)"
        )));
    }
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage::from_premul(width, height, rgba8_premul)
}

/// Sniff SVG from the URL extension or the document prologue.
pub fn looks_like_svg(url: &str, bytes: &[u8]) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Parse an SVG and rasterize it at `target_height`, keeping its aspect ratio.
pub fn rasterize_svg(bytes: &[u8], target_height: u32) -> BannerResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    if !size.width().is_finite() || !size.height().is_finite() || size.height() <= 0.0 {
        return Err(BannerError::media("svg has invalid width/height"));
    }
    let scale = target_height.max(1) as f32 / size.height();
    let width = ((size.width() * scale).ceil() as u32).max(1);
    let height = target_height.max(1);

    const MAX_DIM: u32 = 8_192;
    if width > MAX_DIM {
        return Err(BannerError::media(format!(
            "svg raster size too large: {width}x{height} (max width {MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| BannerError::media("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied.
    PreparedImage::from_premul(width, height, pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
