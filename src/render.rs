//! Builds the display list for one editor frame.
//!
//! Rendering only reads the session and the store. Layers, bottom to top:
//! background image, committed labels, the shape being drawn, the selection
//! highlight and the crosshair.

use labelkit_canvas::{Color, Frame, Rectangle, Stroke};

use crate::config::AppConfig;
use crate::constants::style;
use crate::engine::Transient;
use crate::geometry::{Point, Rect};
use crate::hit_test::RectHandle;
use crate::model::{ClassId, Geometry, Label, LabelStatus};
use crate::state::{EditorSession, LabelStore};
use crate::viewport::Viewport;

/// Visual parameters for [`render`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub line_width: f32,
    pub selected_line_width: f32,
    pub point_radius: f32,
    pub anchor_radius: f32,
    pub handle_size: f32,
    pub dash: (f32, f32),
    pub fill_alpha: f32,
    pub accent_color: Color,
    pub unclassified_color: Color,
    pub background_color: Color,
    pub crosshair_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            line_width: style::LINE_WIDTH,
            selected_line_width: style::SELECTED_LINE_WIDTH,
            point_radius: style::POINT_RADIUS,
            anchor_radius: style::ANCHOR_RADIUS,
            handle_size: crate::constants::engine::HANDLE_SIZE,
            dash: style::DASH,
            fill_alpha: style::FILL_ALPHA,
            accent_color: Color::from_rgb8(style::ACCENT_COLOR),
            unclassified_color: Color::from_rgb8(style::UNCLASSIFIED_COLOR),
            background_color: Color::from_rgb8(style::BACKGROUND_COLOR),
            crosshair_color: Color::WHITE.with_alpha(0.6),
        }
    }
}

impl RenderStyle {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            handle_size: config.engine.handle_size,
            accent_color: Color::from_rgb8(config.preferences.accent_color),
            ..Self::default()
        }
    }

    fn stroke(&self, color: Color, dashed: bool) -> Stroke {
        if dashed {
            Stroke::dashed(color, self.line_width, self.dash.0, self.dash.1)
        } else {
            Stroke::solid(color, self.line_width)
        }
    }
}

/// Compose the frame for the session's active image.
pub fn render(session: &EditorSession, store: &LabelStore, style: &RenderStyle) -> Frame {
    let viewport = session.viewport();
    let (width, height) = viewport.canvas_size();
    let mut frame = Frame::new(
        width.max(0.0) as u32,
        height.max(0.0) as u32,
        style.background_color,
    );

    let Some(image) = session.active_image(store) else {
        return frame;
    };

    frame.image(screen_rect(viewport, &viewport_image_rect(viewport)));

    let class_color = |class_id: Option<ClassId>| -> Color {
        if !session.per_class_coloration() {
            return style.accent_color;
        }
        class_id
            .and_then(|id| session.class(id))
            .map(|c| Color::from_rgb8(c.color))
            .unwrap_or(style.unclassified_color)
    };

    for label in store.labels(image) {
        if label.visible && label.status != LabelStatus::Rejected {
            draw_label(&mut frame, viewport, style, label, class_color(label.class_id));
        }
    }

    if let Some(transient) = session.transient() {
        draw_transient(
            &mut frame,
            viewport,
            style,
            &transient,
            class_color(session.active_class()),
        );
    }

    if let Some(label) = session.active_label(store).filter(|l| l.visible) {
        draw_selection(&mut frame, viewport, style, label, class_color(label.class_id));
    }

    if session.crosshair_visible() {
        if let Some(cursor) = session.cursor() {
            draw_crosshair(&mut frame, viewport, style, cursor);
        }
    }

    frame
}

fn viewport_image_rect(viewport: &Viewport) -> Rect {
    let (w, h) = viewport.image_size();
    Rect::from_xywh(0.0, 0.0, w, h)
}

/// Image-space rect to a screen rectangle.
fn screen_rect(viewport: &Viewport, rect: &Rect) -> Rectangle {
    Rectangle::from_corners(
        viewport.image_to_screen(rect.top_left).into(),
        viewport.image_to_screen(rect.bottom_right).into(),
    )
}

fn screen_points(viewport: &Viewport, points: &[Point]) -> Vec<labelkit_canvas::Point> {
    points
        .iter()
        .map(|p| viewport.image_to_screen(*p).into())
        .collect()
}

fn draw_label(frame: &mut Frame, viewport: &Viewport, style: &RenderStyle, label: &Label, color: Color) {
    let dashed = label.status == LabelStatus::Proposed;
    let stroke = style.stroke(color, dashed);
    let fill = color.with_alpha(style.fill_alpha);

    match &label.geometry {
        Geometry::Rect { rect } => {
            let r = screen_rect(viewport, rect);
            frame.fill_rect(r, fill);
            frame.stroke_rect(r, stroke);
        }
        Geometry::Point { position } => {
            let center: labelkit_canvas::Point = viewport.image_to_screen(*position).into();
            if dashed {
                frame.fill_circle(center, style.point_radius, fill);
                frame.stroke_circle(center, style.point_radius, stroke);
            } else {
                frame.fill_circle(center, style.point_radius, color);
            }
        }
        Geometry::Line { points } => {
            frame.polyline(screen_points(viewport, points), false, stroke);
        }
        Geometry::Polygon { points } => {
            let screen = screen_points(viewport, points);
            frame.fill_polygon(screen.clone(), fill);
            frame.polyline(screen, true, stroke);
        }
    }
}

fn draw_transient(
    frame: &mut Frame,
    viewport: &Viewport,
    style: &RenderStyle,
    transient: &Transient,
    color: Color,
) {
    let stroke = style.stroke(color, true);
    match transient {
        Transient::Rect { rect } => {
            let r = screen_rect(viewport, rect);
            frame.fill_rect(r, color.with_alpha(style.fill_alpha));
            frame.stroke_rect(r, stroke);
        }
        Transient::Path {
            vertices,
            cursor,
            closed,
        } => {
            let screen = screen_points(viewport, vertices);
            frame.polyline(screen.clone(), *closed, stroke);
            if let (Some(last), Some(cursor)) = (screen.last(), cursor) {
                frame.line(*last, viewport.image_to_screen(*cursor).into(), stroke);
                // Vertex anchors only while placing vertices by hand
                for p in &screen {
                    frame.fill_circle(*p, style.anchor_radius, color);
                }
            }
        }
    }
}

fn draw_selection(
    frame: &mut Frame,
    viewport: &Viewport,
    style: &RenderStyle,
    label: &Label,
    color: Color,
) {
    let outline = Stroke::solid(color, style.selected_line_width);
    let anchor_stroke = Stroke::solid(color, 1.0);

    match &label.geometry {
        Geometry::Rect { rect } => {
            let screen = Rect::from_corners(
                viewport.image_to_screen(rect.top_left),
                viewport.image_to_screen(rect.bottom_right),
            );
            frame.stroke_rect(screen_rect(viewport, rect), outline);
            let half = style.handle_size / 2.0;
            for handle in RectHandle::ALL {
                let p = handle.position(&screen);
                let square = Rectangle::new(p.x - half, p.y - half, style.handle_size, style.handle_size);
                frame.fill_rect(square, Color::WHITE);
                frame.stroke_rect(square, anchor_stroke);
            }
        }
        Geometry::Point { position } => {
            let center: labelkit_canvas::Point = viewport.image_to_screen(*position).into();
            frame.stroke_circle(center, style.point_radius + style.anchor_radius, outline);
        }
        Geometry::Line { points } | Geometry::Polygon { points } => {
            let screen = screen_points(viewport, points);
            let closed = matches!(label.geometry, Geometry::Polygon { .. });
            frame.polyline(screen.clone(), closed, outline);
            for p in screen {
                frame.fill_circle(p, style.anchor_radius, Color::WHITE);
                frame.stroke_circle(p, style.anchor_radius, anchor_stroke);
            }
        }
    }
}

/// Full-canvas crosshair lines through the cursor, drawn only over the image.
fn draw_crosshair(frame: &mut Frame, viewport: &Viewport, style: &RenderStyle, cursor: Point) {
    if !viewport.image_rect_on_screen().contains(&cursor) {
        return;
    }
    let (width, height) = viewport.canvas_size();
    let stroke = Stroke::solid(style.crosshair_color, 1.0);
    frame.line(
        labelkit_canvas::Point::new(0.0, cursor.y),
        labelkit_canvas::Point::new(width, cursor.y),
        stroke,
    );
    frame.line(
        labelkit_canvas::Point::new(cursor.x, 0.0),
        labelkit_canvas::Point::new(cursor.x, height),
        stroke,
    );
}
