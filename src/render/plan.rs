//! Backend-agnostic frame plan.
//!
//! Composition emits an ordered list of [`DrawOp`]s; a backend replays them onto a surface that
//! was cleared to [`FramePlan::clear`]. Clip pushes and pops always balance within a plan.

use crate::assets::cache::ImageHandle;
use crate::foundation::core::{Canvas, Rect, Rgba8Premul};

/// A single line of text to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Text as displayed.
    pub text: String,
    /// Font identifier; the default font when unset.
    pub font: Option<String>,
    /// Font size in pixels.
    pub size_px: f32,
    /// Left edge of the run.
    pub x: f64,
    /// Baseline position.
    pub baseline: f64,
    /// Fill color.
    pub color: Rgba8Premul,
    /// Extra opacity applied to the whole run.
    pub opacity: f32,
}

/// One drawing instruction.
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Intersect the clip with a rectangle until the matching pop.
    PushClip(Rect),
    /// Restore the clip of the previous push.
    PopClip,
    /// Solid rectangle.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Rgba8Premul,
    },
    /// Image scaled into a destination rectangle.
    Image {
        /// Pixels to draw.
        image: ImageHandle,
        /// Destination on the surface.
        dest: Rect,
        /// Extra opacity.
        opacity: f32,
    },
    /// Line of text.
    Text(TextRun),
}

/// Ordered draw operations for one frame.
#[derive(Clone, Debug)]
pub struct FramePlan {
    /// Surface size.
    pub canvas: Canvas,
    /// Color the surface is cleared to.
    pub clear: Rgba8Premul,
    /// Operations in paint order.
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    /// Empty plan on a black surface.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            clear: Rgba8Premul::BLACK,
            ops: Vec::new(),
        }
    }

    /// Text runs in paint order.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Image handles with their destinations, in paint order.
    pub fn images(&self) -> impl Iterator<Item = (&ImageHandle, Rect)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { image, dest, .. } => Some((image, *dest)),
            _ => None,
        })
    }

    /// Whether every clip push has a matching pop.
    pub fn clips_balanced(&self) -> bool {
        let mut depth: i64 = 0;
        for op in &self.ops {
            match op {
                DrawOp::PushClip(_) => depth += 1,
                DrawOp::PopClip => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

/// Vertical baseline that visually centers a line of `size_px` text on `center_y`.
pub(crate) fn centered_baseline(center_y: f64, size_px: f32) -> f64 {
    center_y + f64::from(size_px) / 3.0
}
