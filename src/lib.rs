//! labelkit - interactive image labelling core
//!
//! The editing engine behind an image annotation canvas: a pan/zoom viewport,
//! creation engines for rectangles, points, lines and polygons, hit testing,
//! keyboard shortcuts and a renderer that turns the editor state into a
//! [`labelkit_canvas::Frame`] of draw commands. Host UIs feed pointer and key
//! events into an [`state::EditorSession`]; committed labels live in a
//! [`state::LabelStore`].

pub mod config;
pub mod constants;
pub mod engine;
pub mod geometry;
pub mod keybindings;
pub mod model;
pub mod render;
pub mod replay;
pub mod state;
pub mod suggestions;
pub mod viewport;
