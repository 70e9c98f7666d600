//! Geometry primitives shared by hit testing, the creation engines and rendering.
//!
//! Everything here is pure and coordinate-space agnostic: callers decide whether
//! the points are image or screen pixels.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Distance below which a point counts as lying on an edge.
const EDGE_EPSILON: f32 = 1e-4;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<Point> for labelkit_canvas::Point {
    fn from(p: Point) -> Self {
        labelkit_canvas::Point::new(p.x, p.y)
    }
}

/// An axis-aligned rectangle stored as its top-left and bottom-right corners.
///
/// Constructors normalize the corners so `top_left <= bottom_right` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Rect {
    /// Create a rectangle from two corner points given in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            top_left: Point::new(a.x.min(b.x), a.y.min(b.y)),
            bottom_right: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    pub fn width(&self) -> f32 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f32 {
        self.bottom_right.y - self.top_left.y
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.top_left.x + self.bottom_right.x) / 2.0,
            (self.top_left.y + self.bottom_right.y) / 2.0,
        )
    }

    /// Check if a point is inside the rectangle, edges included.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.top_left.x
            && point.x <= self.bottom_right.x
            && point.y >= self.top_left.y
            && point.y <= self.bottom_right.y
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            Point::new(self.bottom_right.x, self.top_left.y),
            self.bottom_right,
            Point::new(self.top_left.x, self.bottom_right.y),
        ]
    }
}

/// Point-in-rectangle test, edges included.
pub fn point_in_rect(point: &Point, rect: &Rect) -> bool {
    rect.contains(point)
}

/// Point-in-polygon test using ray casting.
///
/// Points lying on an edge count as inside. Fewer than three vertices never
/// contain anything.
pub fn point_in_polygon(point: &Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    if distance_to_polyline(point, vertices, true).is_some_and(|d| d <= EDGE_EPSILON) {
        return true;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Closest point to `point` on the segment `a..b`.
pub fn nearest_point_on_segment(point: &Point, a: &Point, b: &Point) -> Point {
    let ab = *b - *a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return *a;
    }
    let ap = *point - *a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    *a + ab * t
}

/// Shortest distance from `point` to the segment `a..b`.
pub fn distance_to_segment(point: &Point, a: &Point, b: &Point) -> f32 {
    point.distance_to(&nearest_point_on_segment(point, a, b))
}

/// Minimum distance from `point` to a polyline.
///
/// With `closed` the last vertex connects back to the first. Returns `None` for
/// an empty vertex list; a single vertex degenerates to point distance.
pub fn distance_to_polyline(point: &Point, vertices: &[Point], closed: bool) -> Option<f32> {
    match vertices {
        [] => None,
        [only] => Some(point.distance_to(only)),
        _ => {
            let open = vertices
                .windows(2)
                .map(|w| distance_to_segment(point, &w[0], &w[1]));
            let closing = closed
                .then(|| distance_to_segment(point, &vertices[vertices.len() - 1], &vertices[0]));
            open.chain(closing).reduce(f32::min)
        }
    }
}

/// Axis-aligned bounding box of a set of points.
pub fn bounding_box(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(Rect {
        top_left: min,
        bottom_right: max,
    })
}

/// Sample `count` vertices on the ellipse inscribed in the box spanned by `a`
/// and `b`.
///
/// Sampling starts at angle 0 (the +x extreme) and advances by `2π / count`.
/// When `count` is divisible by four the samples at the axis extremes are
/// placed on the box edges exactly, so the bounding box of the result equals
/// the spanning box. Every other sample is clamped into the box.
pub fn ellipse_vertices(a: Point, b: Point, count: usize) -> Vec<Point> {
    let bounds = Rect::from_corners(a, b);
    let Rect {
        top_left: tl,
        bottom_right: br,
    } = bounds;
    let rx = f64::from(bounds.width()) / 2.0;
    let ry = f64::from(bounds.height()) / 2.0;
    let cx = f64::from(tl.x) + rx;
    let cy = f64::from(tl.y) + ry;

    (0..count)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / count as f64;
            let x = ((cx + rx * angle.cos()) as f32).clamp(tl.x, br.x);
            let y = ((cy + ry * angle.sin()) as f32).clamp(tl.y, br.y);
            // Quarter turns land on an edge
            match (4 * i % count == 0).then_some(4 * i / count) {
                Some(0) => Point::new(br.x, y),
                Some(1) => Point::new(x, br.y),
                Some(2) => Point::new(tl.x, y),
                Some(3) => Point::new(x, tl.y),
                _ => Point::new(x, y),
            }
        })
        .collect()
}
