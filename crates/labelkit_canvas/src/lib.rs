//! labelkit_canvas - backend-neutral display lists for the labelkit editor.
//!
//! The editor composes a [`Frame`] of [`DrawCommand`]s in screen space. A frame
//! carries no reference to editor state, so it can be compared, cached, or
//! handed to any backend. The [`raster`] module provides a CPU backend built on
//! `tiny-skia` for headless output.

mod color;
mod frame;
pub mod raster;

pub use color::Color;
pub use frame::{DrawCommand, Frame, Point, Rectangle, Stroke};
pub use raster::{RasterError, pixmap_from_rgba8, rasterize};
pub use tiny_skia::Pixmap;
