use crate::foundation::error::BannerResult;
use crate::render::plan::FramePlan;
use crate::text::engine::TextMeasure;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied; the banner canvas is cleared to opaque black, so in practice every
/// pixel is opaque and the bytes double as straight RGBA.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Executes a [`FramePlan`]. Backends also measure text, since they own the fonts used to draw it.
pub trait RenderBackend: TextMeasure {
    /// Replay `plan` onto a fresh surface.
    fn render_plan(&mut self, plan: &FramePlan) -> BannerResult<FrameRGBA>;
}
