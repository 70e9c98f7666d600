//! Point creation. Every press on empty image area commits a point at once.

use super::EngineContext;
use crate::geometry::Point;
use crate::model::{Geometry, LabelId, LabelStatus, LabelType};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointEngine {
    /// Label being dragged, if any.
    dragging: Option<LabelId>,
}

impl PointEngine {
    pub fn is_idle(&self) -> bool {
        self.dragging.is_none()
    }

    pub fn begin_or_continue(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        if let Some(hit) = ctx.hit(LabelType::Point, screen) {
            ctx.select(hit.label_id);
            let accepted = ctx
                .label(hit.label_id)
                .is_some_and(|l| l.status == LabelStatus::Accepted);
            if accepted {
                self.dragging = Some(hit.label_id);
            }
            return;
        }

        let position = ctx.to_image(screen);
        if !ctx.is_inside_image(position) {
            log::debug!("Point: press outside image ignored");
            return;
        }
        ctx.commit(Geometry::Point { position });
    }

    pub fn move_cursor(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        if let Some(id) = self.dragging {
            let position = ctx.clamp_to_image(ctx.to_image(screen));
            log::trace!("Point: dragging {} to ({:.1}, {:.1})", id, position.x, position.y);
            ctx.set_geometry(id, Geometry::Point { position });
        }
    }

    pub fn release(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        self.move_cursor(ctx, screen);
        self.dragging = None;
    }
}
