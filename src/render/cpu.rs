use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::assets::cache::ImageHandle;
use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::foundation::error::{BannerError, BannerResult};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::plan::{DrawOp, FramePlan, TextRun};
use crate::text::engine::{FontBook, TextEngine, TextMeasure};

/// CPU raster backend powered by `vello_cpu`.
pub struct CpuBackend {
    text: TextEngine,
    image_cache: HashMap<u64, vello_cpu::Image>,
    /// Handles whose pixels cannot be turned into a paint; skipped until they leave the plan.
    rejected_images: HashSet<u64>,
    font_cache: HashMap<usize, vello_cpu::peniko::FontData>,
}

impl CpuBackend {
    /// Backend drawing text with `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            text: TextEngine::new(fonts),
            image_cache: HashMap::new(),
            rejected_images: HashSet::new(),
            font_cache: HashMap::new(),
        }
    }

    fn image_paint_for(&mut self, handle: &ImageHandle) -> BannerResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&handle.id) {
            return Ok(paint.clone());
        }
        let pixmap = image_to_pixmap(&handle.image)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(handle.id, paint.clone());
        Ok(paint)
    }

    fn font_for(&mut self, bytes: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
        let key = Arc::as_ptr(bytes) as usize;
        self.font_cache
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
                    0,
                )
            })
            .clone()
    }

    fn draw_text(&mut self, ctx: &mut vello_cpu::RenderContext, run: &TextRun) {
        if run.text.is_empty() || run.opacity <= 0.0 {
            return;
        }
        let shaped = match self.text.shape(&run.text, run.font.as_deref(), run.size_px) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, text = %run.text, "text run skipped");
                return;
            }
        };
        let font = self.font_for(&shaped.font_bytes);
        let [r, g, b, a] = run.color.to_straight_rgba();

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            run.x,
            run.baseline - shaped.baseline,
        )));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        let layered = run.opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(run.opacity);
        }
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let glyphs = glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(glyph_run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        if layered {
            ctx.pop_layer();
        }
    }

    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, op: &DrawOp) -> BannerResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::PushClip(rect) => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                let path = vello_cpu::kurbo::Shape::to_path(&rect_to_cpu(*rect), 0.1);
                ctx.push_clip_layer(&path);
            }
            DrawOp::PopClip => ctx.pop_layer(),
            DrawOp::FillRect { rect, color } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(paint_color(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
            DrawOp::Image {
                image,
                dest,
                opacity,
            } => {
                let (w, h) = (f64::from(image.image.width), f64::from(image.image.height));
                if w <= 0.0 || h <= 0.0 || *opacity <= 0.0 {
                    return Ok(());
                }
                if self.rejected_images.contains(&image.id) {
                    return Ok(());
                }
                // The zone keeps its solid fill; the rest of the frame still renders.
                let paint = match self.image_paint_for(image) {
                    Ok(paint) => paint,
                    Err(e) => {
                        tracing::warn!(id = image.id, error = %e, "image skipped");
                        self.rejected_images.insert(image.id);
                        return Ok(());
                    }
                };
                ctx.set_transform(
                    vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
                        * vello_cpu::kurbo::Affine::scale_non_uniform(
                            dest.width() / w,
                            dest.height() / h,
                        ),
                );
                ctx.set_paint(paint);
                let layered = *opacity < 1.0;
                if layered {
                    ctx.push_opacity_layer(*opacity);
                }
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                if layered {
                    ctx.pop_layer();
                }
            }
            DrawOp::Text(run) => self.draw_text(ctx, run),
        }
        Ok(())
    }
}

impl TextMeasure for CpuBackend {
    fn measure(&mut self, text: &str, font: Option<&str>, size_px: f32) -> f64 {
        self.text.measure(text, font, size_px)
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(level = "trace", skip_all, fields(ops = plan.ops.len()))]
    fn render_plan(&mut self, plan: &FramePlan) -> BannerResult<FrameRGBA> {
        if !plan.clips_balanced() {
            return Err(BannerError::render("frame plan has unbalanced clips"));
        }
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| BannerError::render("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| BannerError::render("canvas height exceeds u16"))?;

        let used: HashSet<u64> = plan.images().map(|(h, _)| h.id).collect();
        self.image_cache.retain(|id, _| used.contains(id));
        self.rejected_images.retain(|id| used.contains(id));

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint(paint_color(plan.clear));
        ctx.fill_rect(&rect_to_cpu(plan.canvas.rect()));
        for op in &plan.ops {
            self.draw_op(&mut ctx, op)?;
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn paint_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_straight_rgba();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn image_to_pixmap(img: &PreparedImage) -> BannerResult<vello_cpu::Pixmap> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| BannerError::render("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| BannerError::render("image height exceeds u16"))?;
    if img.rgba8_premul.len() != img.width as usize * img.height as usize * 4 {
        return Err(BannerError::render("prepared image byte length mismatch"));
    }
    let mut may_have_opacities = false;
    let pixels = img
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
