//! Rectangle creation and resizing.

use super::{EngineContext, Transient};
use crate::geometry::{Point, Rect};
use crate::hit_test::{HitTarget, RectHandle};
use crate::model::{Geometry, LabelId, LabelStatus, LabelType};

#[derive(Debug, Clone, PartialEq, Default)]
enum RectState {
    #[default]
    Idle,
    /// Drawing a new rect from `anchor` (image space) to the cursor.
    Dragging { anchor: Point, cursor: Point },
    /// Resizing a committed rect; `original` is restored on cancel.
    Resizing {
        label_id: LabelId,
        handle: RectHandle,
        original: Rect,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RectEngine {
    state: RectState,
}

impl RectEngine {
    pub fn is_idle(&self) -> bool {
        self.state == RectState::Idle
    }

    pub fn begin_or_continue(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        if !self.is_idle() {
            log::debug!("Rect: press ignored while {:?}", self.state);
            return;
        }

        if let Some(hit) = ctx.hit(LabelType::Rect, screen) {
            let resizable = ctx.label(hit.label_id).and_then(|label| match label.geometry {
                Geometry::Rect { rect } if label.status == LabelStatus::Accepted => Some(rect),
                _ => None,
            });
            ctx.select(hit.label_id);
            if let (HitTarget::Handle(handle), Some(original)) = (hit.target, resizable) {
                log::debug!("Rect: resizing label {} by {:?}", hit.label_id, handle);
                self.state = RectState::Resizing {
                    label_id: hit.label_id,
                    handle,
                    original,
                };
            }
            return;
        }

        let anchor = ctx.to_image(screen);
        if !ctx.is_inside_image(anchor) {
            log::debug!("Rect: press outside image ignored");
            return;
        }
        log::debug!("Rect: drag started at ({:.1}, {:.1})", anchor.x, anchor.y);
        self.state = RectState::Dragging {
            anchor,
            cursor: anchor,
        };
    }

    pub fn move_cursor(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        let p = ctx.clamp_to_image(ctx.to_image(screen));
        match &mut self.state {
            RectState::Idle => {}
            RectState::Dragging { cursor, .. } => *cursor = p,
            RectState::Resizing {
                label_id,
                handle,
                original,
            } => {
                let rect = handle.resize(original, p);
                ctx.set_geometry(*label_id, Geometry::Rect { rect });
            }
        }
    }

    pub fn release(&mut self, ctx: &mut EngineContext<'_>, screen: Point) {
        self.move_cursor(ctx, screen);
        match std::mem::take(&mut self.state) {
            RectState::Idle => {}
            RectState::Dragging { anchor, cursor } => {
                let rect = Rect::from_corners(anchor, cursor);
                if is_large_enough(ctx, &rect) {
                    ctx.commit(Geometry::Rect { rect });
                } else {
                    log::debug!(
                        "Rect: discarded {:.1}x{:.1} rect below minimum size",
                        rect.width(),
                        rect.height()
                    );
                }
            }
            RectState::Resizing {
                label_id, original, ..
            } => {
                let resized = ctx.label(label_id).and_then(|label| match label.geometry {
                    Geometry::Rect { rect } => Some(rect),
                    _ => None,
                });
                let collapsed = resized.is_some_and(|rect| !is_large_enough(ctx, &rect));
                if collapsed {
                    log::debug!("Rect: resize of label {} below minimum size, restored", label_id);
                    ctx.set_geometry(label_id, Geometry::Rect { rect: original });
                } else {
                    log::debug!("Rect: resize of label {} done", label_id);
                }
            }
        }
    }

    pub fn cancel(&mut self, ctx: &mut EngineContext<'_>) {
        if let RectState::Resizing {
            label_id, original, ..
        } = std::mem::take(&mut self.state)
        {
            ctx.set_geometry(label_id, Geometry::Rect { rect: original });
        }
    }

    pub fn transient(&self) -> Option<Transient> {
        match &self.state {
            RectState::Dragging { anchor, cursor } => Some(Transient::Rect {
                rect: Rect::from_corners(*anchor, *cursor),
            }),
            _ => None,
        }
    }
}

/// Both sides must exceed the minimum size in screen pixels.
fn is_large_enough(ctx: &EngineContext<'_>, rect: &Rect) -> bool {
    let scale = ctx.viewport.scale();
    let min = ctx.config.min_rect_size;
    rect.width() * scale > min && rect.height() * scale > min
}
