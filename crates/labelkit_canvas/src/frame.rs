//! Display list types.
//!
//! All coordinates are screen pixels with the origin at the top-left corner of
//! the canvas.

use crate::Color;

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }
}

/// Outline style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// Dash pattern as `[on, off]` lengths; `None` draws a solid line.
    pub dash: Option<[f32; 2]>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, on: f32, off: f32) -> Self {
        Self {
            color,
            width,
            dash: Some([on, off]),
        }
    }
}

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// The background image stretched over `rect`.
    Image { rect: Rectangle },
    FillRect { rect: Rectangle, color: Color },
    StrokeRect { rect: Rectangle, stroke: Stroke },
    /// Connected line segments, optionally closed back to the first point.
    Polyline {
        points: Vec<Point>,
        closed: bool,
        stroke: Stroke,
    },
    FillPolygon { points: Vec<Point>, color: Color },
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Point,
        radius: f32,
        stroke: Stroke,
    },
    Line { from: Point, to: Point, stroke: Stroke },
}

/// An ordered list of draw commands for one canvas-sized frame.
///
/// Commands are painted in insertion order, so later commands end up on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    clear_color: Color,
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(width: u32, height: u32, clear_color: Color) -> Self {
        Self {
            width,
            height,
            clear_color,
            commands: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn image(&mut self, rect: Rectangle) {
        self.push(DrawCommand::Image { rect });
    }

    pub fn fill_rect(&mut self, rect: Rectangle, color: Color) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    pub fn stroke_rect(&mut self, rect: Rectangle, stroke: Stroke) {
        self.push(DrawCommand::StrokeRect { rect, stroke });
    }

    pub fn polyline(&mut self, points: Vec<Point>, closed: bool, stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        self.push(DrawCommand::Polyline {
            points,
            closed,
            stroke,
        });
    }

    pub fn fill_polygon(&mut self, points: Vec<Point>, color: Color) {
        if points.len() < 3 {
            return;
        }
        self.push(DrawCommand::FillPolygon { points, color });
    }

    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    pub fn stroke_circle(&mut self, center: Point, radius: f32, stroke: Stroke) {
        self.push(DrawCommand::StrokeCircle {
            center,
            radius,
            stroke,
        });
    }

    pub fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.push(DrawCommand::Line { from, to, stroke });
    }
}
