//! Polyline creation: each press appends a vertex until finished.

use super::{EngineContext, IdlePress, Transient, idle_press, move_vertex};
use crate::geometry::Point;
use crate::model::{Geometry, LabelId, LabelType, MIN_LINE_VERTICES};

#[derive(Debug, Clone, PartialEq, Default)]
enum LineState {
    #[default]
    Idle,
    Building {
        vertices: Vec<Point>,
        cursor: Point,
    },
    DraggingVertex {
        label_id: LabelId,
        index: usize,
        original: Point,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineEngine {
    state: LineState,
}

impl LineEngine {
    pub fn is_idle(&self) -> bool {
        self.state == LineState::Idle
    }

    /// Vertices placed so far.
    pub fn vertices(&self) -> &[Point] {
        match &self.state {
            LineState::Building { vertices, .. } => vertices,
            _ => &[],
        }
    }

    pub fn begin_or_continue(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        match &mut self.state {
            LineState::Idle => match idle_press(ctx, LabelType::Line, screen) {
                IdlePress::Start(p) => {
                    log::debug!("Line: started at ({:.1}, {:.1})", p.x, p.y);
                    self.state = LineState::Building {
                        vertices: vec![p],
                        cursor: p,
                    };
                }
                IdlePress::GrabVertex { label_id, index } => {
                    let original = ctx
                        .label(label_id)
                        .and_then(|l| l.geometry.vertices().get(index).copied());
                    if let Some(original) = original {
                        self.state = LineState::DraggingVertex {
                            label_id,
                            index,
                            original,
                        };
                    }
                }
                IdlePress::Selected | IdlePress::Ignored => {}
            },
            LineState::Building { vertices, cursor } => {
                let p = ctx.clamp_to_image(ctx.to_image(screen));
                vertices.push(p);
                *cursor = p;
                log::debug!(
                    "Line: added vertex {} at ({:.1}, {:.1})",
                    vertices.len(),
                    p.x,
                    p.y
                );
            }
            LineState::DraggingVertex { .. } => {}
        }
    }

    pub fn move_cursor(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        let p = ctx.clamp_to_image(ctx.to_image(screen));
        match &mut self.state {
            LineState::Idle => {}
            LineState::Building { cursor, .. } => *cursor = p,
            LineState::DraggingVertex {
                label_id, index, ..
            } => {
                move_vertex(ctx, *label_id, *index, p);
            }
        }
    }

    pub fn release(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        if matches!(self.state, LineState::DraggingVertex { .. }) {
            self.move_cursor(ctx, screen);
            self.state = LineState::Idle;
        }
    }

    /// Commit the line if it has enough vertices; otherwise keep building.
    pub fn finish(&mut self, ctx: &mut EngineContext<'_>) -> Option<LabelId> {
        let LineState::Building { vertices, .. } = &self.state else {
            log::debug!("Line: finish ignored, nothing in progress");
            return None;
        };
        if vertices.len() < MIN_LINE_VERTICES {
            log::debug!(
                "Line: finish rejected with {} of {} vertices",
                vertices.len(),
                MIN_LINE_VERTICES
            );
            return None;
        }
        let points = vertices.clone();
        let id = ctx.commit(Geometry::Line { points })?;
        self.state = LineState::Idle;
        Some(id)
    }

    pub fn cancel(&mut self, ctx: &mut EngineContext<'_>) {
        match std::mem::take(&mut self.state) {
            LineState::Building { vertices, .. } => {
                log::debug!("Line: cancelled with {} vertices", vertices.len());
            }
            LineState::DraggingVertex {
                label_id,
                index,
                original,
            } => {
                move_vertex(ctx, label_id, index, original);
            }
            LineState::Idle => {}
        }
    }

    pub fn undo_last_step(&mut self, ctx: &mut EngineContext<'_>) {
        match &mut self.state {
            LineState::Building { vertices, .. } => {
                vertices.pop();
                log::debug!("Line: undo, {} vertices left", vertices.len());
                if vertices.is_empty() {
                    self.state = LineState::Idle;
                }
            }
            LineState::DraggingVertex { .. } => self.cancel(ctx),
            LineState::Idle => {}
        }
    }

    pub fn transient(&self) -> Option<Transient> {
        match &self.state {
            LineState::Building { vertices, cursor } => Some(Transient::Path {
                vertices: vertices.clone(),
                cursor: Some(*cursor),
                closed: false,
            }),
            _ => None,
        }
    }
}
