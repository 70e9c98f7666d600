//! Default tuning values for the labelkit editor.
//!
//! These are the fallbacks used when the configuration file does not override
//! them (see [`crate::config`]).

/// Viewport defaults.
pub mod viewport {
    /// Zoom at which the whole image fits the canvas.
    pub const MIN_ZOOM: f32 = 1.0;
    /// Largest zoom relative to the fit scale.
    pub const MAX_ZOOM: f32 = 16.0;
    /// Multiplier applied per zoom-in step.
    pub const ZOOM_STEP: f32 = 1.25;
    /// Screen pixels moved per keyboard pan step.
    pub const TRANSLATION_STEP: f32 = 40.0;
    /// How far (screen px) the image edge may be pulled inside the canvas.
    pub const PAN_MARGIN: f32 = 0.0;
    /// Canvas size used before the host reports a real one.
    pub const DEFAULT_CANVAS_SIZE: (f32, f32) = (1280.0, 720.0);
}

/// Creation engine and hit testing defaults. Distances are screen pixels.
pub mod engine {
    /// Proximity tolerance for points, lines and polygon edges.
    pub const HIT_TOLERANCE: f32 = 8.0;
    /// Side length of a rect resize handle.
    pub const HANDLE_SIZE: f32 = 10.0;
    /// Rects whose width or height does not exceed this are discarded.
    pub const MIN_RECT_SIZE: f32 = 2.0;
    /// Clicking this close to the first vertex closes a polygon.
    pub const POLYGON_CLOSE_DISTANCE: f32 = 10.0;
    /// Vertices synthesized for an ellipse polygon.
    pub const ELLIPSE_VERTEX_COUNT: usize = 36;
}

/// Render style defaults.
pub mod style {
    pub const LINE_WIDTH: f32 = 2.0;
    pub const SELECTED_LINE_WIDTH: f32 = 3.0;
    pub const POINT_RADIUS: f32 = 6.0;
    pub const ANCHOR_RADIUS: f32 = 4.0;
    /// Dash pattern (on, off) for previews and proposed labels.
    pub const DASH: (f32, f32) = (6.0, 4.0);
    /// Fill alpha for rects and polygons.
    pub const FILL_ALPHA: f32 = 0.2;
    /// Accent color used when per-class coloration is off.
    pub const ACCENT_COLOR: [u8; 3] = [255, 200, 60];
    /// Color for labels without a class.
    pub const UNCLASSIFIED_COLOR: [u8; 3] = [255, 0, 0];
    pub const BACKGROUND_COLOR: [u8; 3] = [30, 30, 30];
}
