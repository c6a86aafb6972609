use super::*;
use crate::foundation::core::Canvas;

fn canvas() -> Canvas {
    Canvas {
        width: 64,
        height: 32,
    }
}

#[test]
fn empty_plan_renders_clear_color() {
    let mut be = CpuBackend::new(FontBook::new());
    let frame = be.render_plan(&FramePlan::new(canvas())).unwrap();
    assert_eq!((frame.width, frame.height), (64, 32));
    assert_eq!(frame.data.len(), 64 * 32 * 4);
    assert_eq!(frame.pixel(10, 10), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(64, 0), None);
}

#[test]
fn clipped_fill_stays_inside_clip() {
    let mut be = CpuBackend::new(FontBook::new());
    let mut plan = FramePlan::new(canvas());
    plan.ops.push(DrawOp::PushClip(Rect::new(0.0, 0.0, 32.0, 32.0)));
    plan.ops.push(DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, 64.0, 32.0),
        color: Rgba8Premul::from_straight_rgba(255, 0, 0, 255),
    });
    plan.ops.push(DrawOp::PopClip);

    let frame = be.render_plan(&plan).unwrap();
    assert_eq!(frame.pixel(8, 8), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(48, 8), Some([0, 0, 0, 255]));
}

#[test]
fn image_is_scaled_into_its_destination() {
    let mut be = CpuBackend::new(FontBook::new());
    let image = ImageHandle {
        id: 7,
        image: Arc::new(PreparedImage::solid(2, 2, [0, 0, 255, 255]).unwrap()),
    };
    let mut plan = FramePlan::new(canvas());
    plan.ops.push(DrawOp::Image {
        image,
        dest: Rect::new(16.0, 0.0, 48.0, 32.0),
        opacity: 1.0,
    });

    let frame = be.render_plan(&plan).unwrap();
    assert_eq!(frame.pixel(32, 16), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(4, 16), Some([0, 0, 0, 255]));
    assert_eq!(be.image_cache.len(), 1);

    be.render_plan(&FramePlan::new(canvas())).unwrap();
    assert!(be.image_cache.is_empty());
}

#[test]
fn text_without_fonts_is_skipped() {
    let mut be = CpuBackend::new(FontBook::new());
    assert_eq!(be.measure("HELLO", None, 48.0), 0.0);
    let mut plan = FramePlan::new(canvas());
    plan.ops.push(DrawOp::Text(TextRun {
        text: "HELLO".into(),
        font: None,
        size_px: 48.0,
        x: 0.0,
        baseline: 30.0,
        color: Rgba8Premul::WHITE,
        opacity: 1.0,
    }));
    let frame = be.render_plan(&plan).unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn unbalanced_clips_are_rejected() {
    let mut be = CpuBackend::new(FontBook::new());
    let mut plan = FramePlan::new(canvas());
    plan.ops.push(DrawOp::PushClip(Rect::new(0.0, 0.0, 8.0, 8.0)));
    assert!(be.render_plan(&plan).is_err());
}

#[test]
fn unpaintable_image_is_skipped_without_failing_the_frame() {
    let mut be = CpuBackend::new(FontBook::new());
    let wide = ImageHandle {
        id: 9,
        image: Arc::new(PreparedImage::solid(70_000, 1, [0, 255, 0, 255]).unwrap()),
    };
    let mut plan = FramePlan::new(canvas());
    plan.ops.push(DrawOp::PushClip(Rect::new(0.0, 0.0, 32.0, 32.0)));
    plan.ops.push(DrawOp::Image {
        image: wide,
        dest: Rect::new(0.0, 0.0, 32.0, 32.0),
        opacity: 1.0,
    });
    plan.ops.push(DrawOp::PopClip);
    plan.ops.push(DrawOp::FillRect {
        rect: Rect::new(32.0, 0.0, 64.0, 32.0),
        color: Rgba8Premul::from_straight_rgba(255, 0, 0, 255),
    });

    let frame = be.render_plan(&plan).unwrap();
    assert_eq!(frame.pixel(8, 8), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(48, 8), Some([255, 0, 0, 255]));
    assert!(be.rejected_images.contains(&9));

    // Still skipped on the next frame, then forgotten once it leaves the plan.
    be.render_plan(&plan).unwrap();
    be.render_plan(&FramePlan::new(canvas())).unwrap();
    assert!(be.rejected_images.is_empty());
}
