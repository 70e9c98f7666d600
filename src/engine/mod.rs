//! Label creation engines.
//!
//! Each label type with on-canvas geometry has a state machine that turns
//! pointer presses, moves and releases into committed labels. The session owns
//! exactly one engine at a time in its active slot; switching label type drops
//! the engine together with any transient state.
//!
//! Engines never hold on to the store. Every handler receives an
//! [`EngineContext`] that borrows the store, the viewport and the session's
//! active-label slot for the duration of one input event.

mod line;
mod point;
mod polygon;
mod rect;

pub use line::LineEngine;
pub use point::PointEngine;
pub use polygon::{PolygonEngine, PolygonMode};
pub use rect::RectEngine;

use serde::{Deserialize, Serialize};

use crate::constants::engine as defaults;
use crate::geometry::{Point, Rect};
use crate::hit_test::{Hit, HitTarget, HitTolerance, hit_test};
use crate::model::{ClassId, Geometry, Label, LabelId, LabelPatch, LabelStatus, LabelType};
use crate::state::{ImageId, LabelStore};
use crate::viewport::Viewport;

/// Engine tuning. Distances are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hit_tolerance: f32,
    pub handle_size: f32,
    pub min_rect_size: f32,
    pub polygon_close_distance: f32,
    pub ellipse_vertex_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: defaults::HIT_TOLERANCE,
            handle_size: defaults::HANDLE_SIZE,
            min_rect_size: defaults::MIN_RECT_SIZE,
            polygon_close_distance: defaults::POLYGON_CLOSE_DISTANCE,
            ellipse_vertex_count: defaults::ELLIPSE_VERTEX_COUNT,
        }
    }
}

/// Everything an engine may touch while handling one event.
pub struct EngineContext<'a> {
    pub store: &'a mut LabelStore,
    pub viewport: &'a Viewport,
    pub config: &'a EngineConfig,
    pub image: ImageId,
    /// Class given to newly committed labels.
    pub class_id: Option<ClassId>,
    /// The session's active (selected) label.
    pub active_label: &'a mut Option<LabelId>,
}

impl EngineContext<'_> {
    pub fn to_image(&self, screen: Point) -> Point {
        self.viewport.screen_to_image(screen)
    }

    /// Whether an image-space point lies on the image (edges included).
    pub fn is_inside_image(&self, p: Point) -> bool {
        let (w, h) = self.viewport.image_size();
        Rect::from_xywh(0.0, 0.0, w, h).contains(&p)
    }

    pub fn clamp_to_image(&self, p: Point) -> Point {
        let (w, h) = self.viewport.image_size();
        Point::new(p.x.clamp(0.0, w.max(0.0)), p.y.clamp(0.0, h.max(0.0)))
    }

    /// Screen-space distance between two image-space points.
    pub fn screen_distance(&self, a: Point, b: Point) -> f32 {
        a.distance_to(&b) * self.viewport.scale()
    }

    pub fn tolerance(&self) -> HitTolerance {
        HitTolerance {
            radius: self.config.hit_tolerance,
            handle_size: self.config.handle_size,
        }
    }

    /// Topmost visible label of `label_type` under a screen point.
    pub fn hit(&self, label_type: LabelType, screen: Point) -> Option<Hit> {
        hit_test(
            self.store.list_visible(self.image, label_type),
            self.viewport,
            screen,
            self.tolerance(),
        )
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.store.label(self.image, id)
    }

    pub fn is_active(&self, id: LabelId) -> bool {
        *self.active_label == Some(id)
    }

    pub fn select(&mut self, id: LabelId) {
        if *self.active_label != Some(id) {
            log::debug!("Selected label {}", id);
        }
        *self.active_label = Some(id);
    }

    /// Commit a user-drawn shape and make it the active label.
    pub fn commit(&mut self, geometry: Geometry) -> Option<LabelId> {
        let id = self
            .store
            .commit(self.image, self.class_id, LabelStatus::Accepted, geometry)?;
        *self.active_label = Some(id);
        Some(id)
    }

    pub fn set_geometry(&mut self, id: LabelId, geometry: Geometry) -> bool {
        self.store
            .mutate(self.image, id, LabelPatch::geometry(geometry))
    }
}

/// In-progress geometry exposed to the renderer, in image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Transient {
    Rect {
        rect: Rect,
    },
    /// Placed vertices plus an optional rubber-band edge to the cursor.
    Path {
        vertices: Vec<Point>,
        cursor: Option<Point>,
        closed: bool,
    },
}

/// The active creation engine, one variant per drawable label type.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationEngine {
    Rect(RectEngine),
    Point(PointEngine),
    Line(LineEngine),
    Polygon(PolygonEngine),
}

impl CreationEngine {
    /// A fresh idle engine, or `None` for label types drawn without geometry.
    pub fn for_label_type(label_type: LabelType) -> Option<Self> {
        match label_type {
            LabelType::Rect => Some(CreationEngine::Rect(RectEngine::default())),
            LabelType::Point => Some(CreationEngine::Point(PointEngine::default())),
            LabelType::Line => Some(CreationEngine::Line(LineEngine::default())),
            LabelType::Polygon => Some(CreationEngine::Polygon(PolygonEngine::default())),
            LabelType::ImageRecognition => None,
        }
    }

    pub fn label_type(&self) -> LabelType {
        match self {
            CreationEngine::Rect(_) => LabelType::Rect,
            CreationEngine::Point(_) => LabelType::Point,
            CreationEngine::Line(_) => LabelType::Line,
            CreationEngine::Polygon(_) => LabelType::Polygon,
        }
    }

    /// Pointer press at a screen point.
    pub fn begin_or_continue(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        match self {
            CreationEngine::Rect(e) => e.begin_or_continue(ctx, screen),
            CreationEngine::Point(e) => e.begin_or_continue(ctx, screen),
            CreationEngine::Line(e) => e.begin_or_continue(ctx, screen),
            CreationEngine::Polygon(e) => e.begin_or_continue(ctx, screen),
        }
    }

    pub fn move_cursor(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        match self {
            CreationEngine::Rect(e) => e.move_cursor(ctx, screen),
            CreationEngine::Point(e) => e.move_cursor(ctx, screen),
            CreationEngine::Line(e) => e.move_cursor(ctx, screen),
            CreationEngine::Polygon(e) => e.move_cursor(ctx, screen),
        }
    }

    pub fn release(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        match self {
            CreationEngine::Rect(e) => e.release(ctx, screen),
            CreationEngine::Point(e) => e.release(ctx, screen),
            CreationEngine::Line(e) => e.release(ctx, screen),
            CreationEngine::Polygon(e) => e.release(ctx, screen),
        }
    }

    /// Commit the in-progress shape. Returns the new label id on success.
    pub fn finish(&mut self, ctx: &mut EngineContext<'_>) -> Option<LabelId> {
        match self {
            CreationEngine::Rect(_) | CreationEngine::Point(_) => None,
            CreationEngine::Line(e) => e.finish(ctx),
            CreationEngine::Polygon(e) => e.finish(ctx),
        }
    }

    /// Discard transient state. The store is left as it was before the
    /// interaction started.
    pub fn cancel(&mut self, ctx: &mut EngineContext<'_>) {
        match self {
            CreationEngine::Rect(e) => e.cancel(ctx),
            CreationEngine::Point(_) => {}
            CreationEngine::Line(e) => e.cancel(ctx),
            CreationEngine::Polygon(e) => e.cancel(ctx),
        }
    }

    pub fn undo_last_step(&mut self, ctx: &mut EngineContext<'_>) {
        match self {
            CreationEngine::Rect(e) => e.cancel(ctx),
            CreationEngine::Point(_) => {}
            CreationEngine::Line(e) => e.undo_last_step(ctx),
            CreationEngine::Polygon(e) => e.undo_last_step(ctx),
        }
    }

    /// Whether the engine has no in-progress shape or drag.
    pub fn is_idle(&self) -> bool {
        match self {
            CreationEngine::Rect(e) => e.is_idle(),
            CreationEngine::Point(e) => e.is_idle(),
            CreationEngine::Line(e) => e.is_idle(),
            CreationEngine::Polygon(e) => e.is_idle(),
        }
    }

    pub fn transient(&self, config: &EngineConfig) -> Option<Transient> {
        match self {
            CreationEngine::Rect(e) => e.transient(),
            CreationEngine::Point(_) => None,
            CreationEngine::Line(e) => e.transient(),
            CreationEngine::Polygon(e) => e.transient(config),
        }
    }

    /// The polygon engine, for its ellipse controls.
    pub fn as_polygon_mut(&mut self) -> Option<&mut PolygonEngine> {
        match self {
            CreationEngine::Polygon(e) => Some(e),
            _ => None,
        }
    }
}

/// What a press on an idle vertex-based engine turned out to be.
pub(crate) enum IdlePress {
    /// An existing label was selected.
    Selected,
    /// A vertex of the active label was grabbed.
    GrabVertex { label_id: LabelId, index: usize },
    /// Empty image area; start a new shape at this image point.
    Start(Point),
    /// Outside the image.
    Ignored,
}

/// Press handling shared by the line and polygon engines while idle.
pub(crate) fn idle_press(ctx: &mut EngineContext<'_>, label_type: LabelType, screen: Point) -> IdlePress {
    if let Some(hit) = ctx.hit(label_type, screen) {
        let grab = match hit.target {
            HitTarget::Vertex(index) if ctx.is_active(hit.label_id) => ctx
                .label(hit.label_id)
                .filter(|l| l.status == LabelStatus::Accepted)
                .map(|_| index),
            _ => None,
        };
        ctx.select(hit.label_id);
        return match grab {
            Some(index) => IdlePress::GrabVertex {
                label_id: hit.label_id,
                index,
            },
            None => IdlePress::Selected,
        };
    }

    let p = ctx.to_image(screen);
    if ctx.is_inside_image(p) {
        IdlePress::Start(p)
    } else {
        IdlePress::Ignored
    }
}

/// Move one vertex of a committed line or polygon.
pub(crate) fn move_vertex(ctx: &mut EngineContext<'_>, id: LabelId, index: usize, to: Point) -> bool {
    let moved = |points: &[Point]| {
        let mut points = points.to_vec();
        if let Some(v) = points.get_mut(index) {
            *v = to;
        }
        points
    };
    let geometry = match ctx.label(id).map(|l| &l.geometry) {
        Some(Geometry::Line { points }) => Geometry::Line {
            points: moved(points),
        },
        Some(Geometry::Polygon { points }) => Geometry::Polygon {
            points: moved(points),
        },
        _ => return false,
    };
    ctx.set_geometry(id, geometry)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_engine_per_label_type() {
        for label_type in LabelType::all() {
            let engine = CreationEngine::for_label_type(*label_type);
            match label_type {
                LabelType::ImageRecognition => assert!(engine.is_none()),
                _ => assert_eq!(engine.map(|e| e.label_type()), Some(*label_type)),
            }
        }
    }

    #[test]
    fn test_ellipse_controls_only_on_polygon() {
        let mut rect = CreationEngine::for_label_type(LabelType::Rect).unwrap();
        assert!(rect.as_polygon_mut().is_none());
        let mut polygon = CreationEngine::for_label_type(LabelType::Polygon).unwrap();
        assert!(polygon.as_polygon_mut().is_some());
    }

    #[test]
    fn test_context_commit_sets_active_label() {
        let mut fx = Fixture::new();
        let id = fx
            .ctx()
            .commit(Geometry::Point { position: pt(1.0, 1.0) })
            .unwrap();
        assert_eq!(fx.active_label, Some(id));
        assert_eq!(fx.labels()[0].class_id, Some(1));
        assert_eq!(fx.labels()[0].status, LabelStatus::Accepted);
    }

    #[test]
    fn test_context_image_bounds() {
        let mut fx = Fixture::new();
        let ctx = fx.ctx();
        assert!(ctx.is_inside_image(pt(0.0, 0.0)));
        assert!(ctx.is_inside_image(pt(200.0, 100.0)));
        assert!(!ctx.is_inside_image(pt(201.0, 50.0)));
        assert_eq!(ctx.clamp_to_image(pt(-5.0, 150.0)), pt(0.0, 100.0));
    }
}
