//! Polygon creation, vertex by vertex or as a sampled ellipse.

use super::{EngineConfig, EngineContext, IdlePress, Transient, idle_press, move_vertex};
use crate::geometry::{Point, Rect, ellipse_vertices};
use crate::model::{Geometry, LabelId, LabelType, MIN_POLYGON_VERTICES};

/// How presses build a new polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    /// Each press places a vertex.
    #[default]
    Vertices,
    /// Two reference points span the bounding box of an ellipse.
    Ellipse,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum PolygonState {
    #[default]
    Idle,
    Building {
        vertices: Vec<Point>,
        cursor: Point,
    },
    BuildingEllipse {
        anchor: Point,
        /// Fixed by a second press; until then the cursor is used.
        opposite: Option<Point>,
        cursor: Point,
    },
    DraggingVertex {
        label_id: LabelId,
        index: usize,
        original: Point,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonEngine {
    mode: PolygonMode,
    state: PolygonState,
}

impl PolygonEngine {
    pub fn mode(&self) -> PolygonMode {
        self.mode
    }

    pub fn is_idle(&self) -> bool {
        self.state == PolygonState::Idle
    }

    /// Whether an ellipse is being spanned right now.
    pub fn is_drawing_ellipse(&self) -> bool {
        matches!(self.state, PolygonState::BuildingEllipse { .. })
    }

    /// Vertices placed so far in vertex mode.
    pub fn vertices(&self) -> &[Point] {
        match &self.state {
            PolygonState::Building { vertices, .. } => vertices,
            _ => &[],
        }
    }

    /// Switch to ellipse mode. A polygon in progress is discarded.
    pub fn start_ellipse(&mut self) {
        self.set_mode(PolygonMode::Ellipse);
    }

    pub fn toggle_ellipse_mode(&mut self) {
        let mode = match self.mode {
            PolygonMode::Vertices => PolygonMode::Ellipse,
            PolygonMode::Ellipse => PolygonMode::Vertices,
        };
        self.set_mode(mode);
    }

    fn set_mode(&mut self, mode: PolygonMode) {
        if matches!(self.state, PolygonState::DraggingVertex { .. }) {
            log::debug!("Polygon: mode change ignored while dragging a vertex");
            return;
        }
        if mode != self.mode && !self.is_idle() {
            log::debug!("Polygon: discarding shape in progress on mode change");
            self.state = PolygonState::Idle;
        }
        self.mode = mode;
        log::debug!("Polygon: mode {:?}", mode);
    }

    /// Whether a press at `screen` lands on the first vertex of a closable polygon.
    fn closes_at(&self, ctx: &EngineContext<'_>, screen: Point) -> bool {
        match &self.state {
            PolygonState::Building { vertices, .. } if vertices.len() >= MIN_POLYGON_VERTICES => {
                let p = ctx.to_image(screen);
                ctx.screen_distance(p, vertices[0]) <= ctx.config.polygon_close_distance
            }
            _ => false,
        }
    }

    pub fn begin_or_continue(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        if self.closes_at(ctx, screen) {
            log::debug!("Polygon: closed on first vertex");
            self.finish(ctx);
            return;
        }

        match &mut self.state {
            PolygonState::Idle => match idle_press(ctx, LabelType::Polygon, screen) {
                IdlePress::Start(p) => {
                    log::debug!(
                        "Polygon: started {:?} at ({:.1}, {:.1})",
                        self.mode,
                        p.x,
                        p.y
                    );
                    self.state = match self.mode {
                        PolygonMode::Vertices => PolygonState::Building {
                            vertices: vec![p],
                            cursor: p,
                        },
                        PolygonMode::Ellipse => PolygonState::BuildingEllipse {
                            anchor: p,
                            opposite: None,
                            cursor: p,
                        },
                    };
                }
                IdlePress::GrabVertex { label_id, index } => {
                    let original = ctx
                        .label(label_id)
                        .and_then(|l| l.geometry.vertices().get(index).copied());
                    if let Some(original) = original {
                        self.state = PolygonState::DraggingVertex {
                            label_id,
                            index,
                            original,
                        };
                    }
                }
                IdlePress::Selected | IdlePress::Ignored => {}
            },
            PolygonState::Building { vertices, cursor } => {
                let p = ctx.clamp_to_image(ctx.to_image(screen));
                vertices.push(p);
                *cursor = p;
                log::debug!(
                    "Polygon: added vertex {} at ({:.1}, {:.1})",
                    vertices.len(),
                    p.x,
                    p.y
                );
            }
            PolygonState::BuildingEllipse {
                opposite, cursor, ..
            } => {
                let p = ctx.clamp_to_image(ctx.to_image(screen));
                *opposite = Some(p);
                *cursor = p;
            }
            PolygonState::DraggingVertex { .. } => {}
        }
    }

    pub fn move_cursor(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        let p = ctx.clamp_to_image(ctx.to_image(screen));
        match &mut self.state {
            PolygonState::Idle => {}
            PolygonState::Building { cursor, .. } | PolygonState::BuildingEllipse { cursor, .. } => {
                *cursor = p
            }
            PolygonState::DraggingVertex {
                label_id, index, ..
            } => {
                move_vertex(ctx, *label_id, *index, p);
            }
        }
    }

    pub fn release(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        if matches!(self.state, PolygonState::DraggingVertex { .. }) {
            self.move_cursor(ctx, screen);
            self.state = PolygonState::Idle;
        }
    }

    /// Commit the polygon or ellipse in progress.
    ///
    /// A polygon needs at least three vertices and an ellipse a box with
    /// non-zero width and height; otherwise the engine keeps building.
    pub fn finish(&mut self, ctx: &mut EngineContext<'_>) -> Option<LabelId> {
        let points = match &self.state {
            PolygonState::Building { vertices, .. } => {
                if vertices.len() < MIN_POLYGON_VERTICES {
                    log::debug!(
                        "Polygon: finish rejected with {} of {} vertices",
                        vertices.len(),
                        MIN_POLYGON_VERTICES
                    );
                    return None;
                }
                vertices.clone()
            }
            PolygonState::BuildingEllipse {
                anchor,
                opposite,
                cursor,
            } => {
                let opposite = opposite.unwrap_or(*cursor);
                let bounds = Rect::from_corners(*anchor, opposite);
                if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
                    log::debug!("Polygon: finish rejected, ellipse has no area");
                    return None;
                }
                ellipse_vertices(*anchor, opposite, ctx.config.ellipse_vertex_count)
            }
            PolygonState::Idle | PolygonState::DraggingVertex { .. } => {
                log::debug!("Polygon: finish ignored, nothing in progress");
                return None;
            }
        };
        let id = ctx.commit(Geometry::Polygon { points })?;
        self.state = PolygonState::Idle;
        Some(id)
    }

    pub fn cancel(&mut self, ctx: &mut EngineContext<'_>) {
        match std::mem::take(&mut self.state) {
            PolygonState::DraggingVertex {
                label_id,
                index,
                original,
            } => {
                move_vertex(ctx, label_id, index, original);
            }
            PolygonState::Building { .. } | PolygonState::BuildingEllipse { .. } => {
                log::debug!("Polygon: creation cancelled");
            }
            PolygonState::Idle => {}
        }
    }

    /// Remove the last vertex. Mid-ellipse this cancels the ellipse.
    pub fn undo_last_step(&mut self, ctx: &mut EngineContext<'_>) {
        match &mut self.state {
            PolygonState::Building { vertices, .. } => {
                vertices.pop();
                log::debug!("Polygon: undo, {} vertices left", vertices.len());
                if vertices.is_empty() {
                    self.state = PolygonState::Idle;
                }
            }
            PolygonState::BuildingEllipse { .. } | PolygonState::DraggingVertex { .. } => {
                self.cancel(ctx)
            }
            PolygonState::Idle => {}
        }
    }

    pub fn transient(&self, config: &EngineConfig) -> Option<Transient> {
        match &self.state {
            PolygonState::Building { vertices, cursor } => Some(Transient::Path {
                vertices: vertices.clone(),
                cursor: Some(*cursor),
                closed: false,
            }),
            PolygonState::BuildingEllipse {
                anchor,
                opposite,
                cursor,
            } => Some(Transient::Path {
                vertices: ellipse_vertices(
                    *anchor,
                    opposite.unwrap_or(*cursor),
                    config.ellipse_vertex_count,
                ),
                cursor: None,
                closed: true,
            }),
            PolygonState::Idle | PolygonState::DraggingVertex { .. } => None,
        }
    }
}
