//! CPU rasterization of frames using `tiny-skia`.

use thiserror::Error;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, StrokeDash,
    Transform,
};

use crate::{Color, DrawCommand, Frame, Point, Rectangle, Stroke};

/// Fill color used for the image area when no background pixmap is supplied.
const PLACEHOLDER_IMAGE_COLOR: Color = Color {
    r: 0.25,
    g: 0.25,
    b: 0.25,
    a: 1.0,
};

/// Errors produced while rasterizing a frame.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Invalid pixmap size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Build a premultiplied pixmap from straight-alpha RGBA8 pixels.
pub fn pixmap_from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Pixmap, RasterError> {
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })?;
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(RasterError::BufferSize {
            expected,
            actual: rgba.len(),
        });
    }

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

/// Paint `frame` into a new pixmap of the frame's size.
///
/// `background` is stretched into every [`DrawCommand::Image`] rectangle; without
/// it the image area is filled with a flat placeholder color.
pub fn rasterize(frame: &Frame, background: Option<&Pixmap>) -> Result<Pixmap, RasterError> {
    let (width, height) = (frame.width(), frame.height());
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })?;
    pixmap.fill(frame.clear_color().to_skia());

    for command in frame.commands() {
        draw_command(&mut pixmap, command, background);
    }

    log::trace!(
        "Rasterized {} commands into {}x{} pixmap",
        frame.len(),
        width,
        height
    );
    Ok(pixmap)
}

fn draw_command(pixmap: &mut Pixmap, command: &DrawCommand, background: Option<&Pixmap>) {
    match command {
        DrawCommand::Image { rect } => match background {
            Some(bg) if bg.width() > 0 && bg.height() > 0 => {
                let sx = rect.width / bg.width() as f32;
                let sy = rect.height / bg.height() as f32;
                let transform = Transform::from_row(sx, 0.0, 0.0, sy, rect.x, rect.y);
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                pixmap.draw_pixmap(0, 0, bg.as_ref(), &paint, transform, None);
            }
            _ => fill_rect(pixmap, rect, PLACEHOLDER_IMAGE_COLOR),
        },
        DrawCommand::FillRect { rect, color } => fill_rect(pixmap, rect, *color),
        DrawCommand::StrokeRect { rect, stroke } => {
            let corners = [
                Point::new(rect.x, rect.y),
                Point::new(rect.x + rect.width, rect.y),
                Point::new(rect.x + rect.width, rect.y + rect.height),
                Point::new(rect.x, rect.y + rect.height),
            ];
            stroke_points(pixmap, &corners, true, stroke);
        }
        DrawCommand::Polyline {
            points,
            closed,
            stroke,
        } => stroke_points(pixmap, points, *closed, stroke),
        DrawCommand::FillPolygon { points, color } => {
            let mut pb = PathBuilder::new();
            trace_points(&mut pb, points, true);
            if let Some(path) = pb.finish() {
                pixmap.fill_path(
                    &path,
                    &paint_for(*color),
                    FillRule::EvenOdd,
                    Transform::identity(),
                    None,
                );
            }
        }
        DrawCommand::FillCircle {
            center,
            radius,
            color,
        } => {
            if let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) {
                pixmap.fill_path(
                    &path,
                    &paint_for(*color),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
        }
        DrawCommand::StrokeCircle {
            center,
            radius,
            stroke,
        } => {
            if let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) {
                pixmap.stroke_path(
                    &path,
                    &paint_for(stroke.color),
                    &skia_stroke(stroke),
                    Transform::identity(),
                    None,
                );
            }
        }
        DrawCommand::Line { from, to, stroke } => stroke_points(pixmap, &[*from, *to], false, stroke),
    }
}

fn fill_rect(pixmap: &mut Pixmap, rect: &Rectangle, color: Color) {
    if let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
        pixmap.fill_rect(r, &paint_for(color), Transform::identity(), None);
    }
}

fn stroke_points(pixmap: &mut Pixmap, points: &[Point], closed: bool, stroke: &Stroke) {
    let mut pb = PathBuilder::new();
    trace_points(&mut pb, points, closed);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(
            &path,
            &paint_for(stroke.color),
            &skia_stroke(stroke),
            Transform::identity(),
            None,
        );
    }
}

fn trace_points(pb: &mut PathBuilder, points: &[Point], closed: bool) {
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        pb.move_to(first.x, first.y);
        for p in iter {
            pb.line_to(p.x, p.y);
        }
        if closed {
            pb.close();
        }
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn skia_stroke(stroke: &Stroke) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: stroke.width,
        dash: stroke
            .dash
            .and_then(|[on, off]| StrokeDash::new(vec![on, off], 0.0)),
        ..tiny_skia::Stroke::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterize_clear_color() {
        let frame = Frame::new(4, 3, Color::rgb(1.0, 0.0, 0.0));
        let pixmap = rasterize(&frame, None).expect("rasterize");
        assert_eq!(pixmap.width(), 4);
        assert_eq!(pixmap.height(), 3);
        let px = pixmap.pixel(2, 1).expect("pixel");
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 0, 0, 255));
    }

    #[test]
    fn test_rasterize_zero_size_fails() {
        let frame = Frame::new(0, 10, Color::BLACK);
        assert!(matches!(
            rasterize(&frame, None),
            Err(RasterError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_fill_rect_paints_pixels() {
        let mut frame = Frame::new(10, 10, Color::BLACK);
        frame.fill_rect(Rectangle::new(2.0, 2.0, 4.0, 4.0), Color::WHITE);
        let pixmap = rasterize(&frame, None).expect("rasterize");
        assert_eq!(pixmap.pixel(4, 4).expect("pixel").red(), 255);
        assert_eq!(pixmap.pixel(8, 8).expect("pixel").red(), 0);
    }

    #[test]
    fn test_background_is_stretched_into_image_rect() {
        let bg = pixmap_from_rgba8(1, 1, &[0, 255, 0, 255]).expect("pixmap");
        let mut frame = Frame::new(8, 8, Color::BLACK);
        frame.image(Rectangle::new(0.0, 0.0, 8.0, 8.0));
        let pixmap = rasterize(&frame, Some(&bg)).expect("rasterize");
        assert_eq!(pixmap.pixel(4, 4).expect("pixel").green(), 255);
    }

    #[test]
    fn test_pixmap_from_rgba8_checks_length() {
        assert!(matches!(
            pixmap_from_rgba8(2, 2, &[0; 3]),
            Err(RasterError::BufferSize {
                expected: 16,
                actual: 3
            })
        ));
    }
}
