//! Viewport transform between image pixels and screen pixels.
//!
//! `zoom` is relative to the fit-to-canvas scale: at `min_zoom` (1.0 by default)
//! the whole image fits the canvas. `translate` is the screen position of the
//! image centre, so
//!
//! ```text
//! screen = (image - image_centre) * fit_scale * zoom + translate
//! ```
//!
//! Nothing here fails; every input is clamped into range.

use serde::{Deserialize, Serialize};

use crate::constants::viewport as defaults;
use crate::geometry::{Point, Rect};

/// Tolerance used when deciding whether the view is zoomed past the fit level.
const ZOOM_EPSILON: f32 = 1e-4;

/// Zoom and pan limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub translation_step: f32,
    pub pan_margin: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: defaults::MIN_ZOOM,
            max_zoom: defaults::MAX_ZOOM,
            zoom_step: defaults::ZOOM_STEP,
            translation_step: defaults::TRANSLATION_STEP,
            pan_margin: defaults::PAN_MARGIN,
        }
    }
}

impl ViewportConfig {
    /// A copy that is safe to clamp against.
    ///
    /// Zoom bounds are made positive and ordered, the zoom step is at least 1
    /// and the pan step and margin are non-negative. Non-finite values fall
    /// back to the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        let non_negative = |value: f32, fallback: f32| {
            if value.is_finite() {
                value.max(0.0)
            } else {
                fallback
            }
        };

        let min_zoom = positive(self.min_zoom, defaults.min_zoom);
        let max_zoom = positive(self.max_zoom, defaults.max_zoom);
        let zoom_step = if self.zoom_step.is_finite() && self.zoom_step >= 1.0 {
            self.zoom_step
        } else {
            defaults.zoom_step
        };
        let sanitized = Self {
            min_zoom: min_zoom.min(max_zoom),
            max_zoom: min_zoom.max(max_zoom),
            zoom_step,
            translation_step: non_negative(self.translation_step, defaults.translation_step),
            pan_margin: non_negative(self.pan_margin, defaults.pan_margin),
        };
        if sanitized != self {
            log::warn!("Viewport config {:?} adjusted to {:?}", self, sanitized);
        }
        sanitized
    }
}

/// Direction in which the view moves. Moving the view right shifts the image left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Pan/zoom state for one canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    config: ViewportConfig,
    canvas_size: (f32, f32),
    image_size: (f32, f32),
    zoom: f32,
    translate: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default(), defaults::DEFAULT_CANVAS_SIZE)
    }
}

impl Viewport {
    /// Create a viewport at the fit zoom level for the given canvas size.
    pub fn new(config: ViewportConfig, canvas_size: (f32, f32)) -> Self {
        let config = config.sanitized();
        let mut viewport = Self {
            config,
            canvas_size,
            image_size: (0.0, 0.0),
            zoom: config.min_zoom,
            translate: Point::default(),
        };
        viewport.set_default_zoom();
        viewport
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        self.canvas_size
    }

    pub fn image_size(&self) -> (f32, f32) {
        self.image_size
    }

    /// Whether the view is zoomed in past the fit level.
    pub fn is_zoomed(&self) -> bool {
        self.zoom > self.config.min_zoom + ZOOM_EPSILON
    }

    /// Resize the canvas, keeping the zoom level.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_size = (width.max(0.0), height.max(0.0));
        if self.is_zoomed() {
            self.clamp_translate();
        } else {
            self.translate = self.canvas_center();
        }
    }

    /// Switch to an image of a different size. Resets to the fit zoom.
    pub fn set_image_size(&mut self, width: f32, height: f32) {
        self.image_size = (width.max(0.0), height.max(0.0));
        self.set_default_zoom();
    }

    /// Scale that fits the whole image into the canvas.
    pub fn fit_scale(&self) -> f32 {
        let (iw, ih) = self.image_size;
        let (cw, ch) = self.canvas_size;
        if iw <= 0.0 || ih <= 0.0 || cw <= 0.0 || ch <= 0.0 {
            return 1.0;
        }
        (cw / iw).min(ch / ih)
    }

    /// Screen pixels per image pixel.
    pub fn scale(&self) -> f32 {
        self.fit_scale() * self.zoom
    }

    fn view_origin(&self) -> Point {
        Point::new(self.image_size.0 / 2.0, self.image_size.1 / 2.0)
    }

    fn canvas_center(&self) -> Point {
        Point::new(self.canvas_size.0 / 2.0, self.canvas_size.1 / 2.0)
    }

    /// Map an image-space point to screen space.
    pub fn image_to_screen(&self, p: Point) -> Point {
        (p - self.view_origin()) * self.scale() + self.translate
    }

    /// Map a screen-space point to image space. Exact inverse of [`Self::image_to_screen`].
    pub fn screen_to_image(&self, p: Point) -> Point {
        (p - self.translate) * (1.0 / self.scale()) + self.view_origin()
    }

    /// Convert a screen distance to image pixels.
    pub fn screen_to_image_distance(&self, distance: f32) -> f32 {
        distance / self.scale()
    }

    /// The image bounds in screen space.
    pub fn image_rect_on_screen(&self) -> Rect {
        Rect::from_corners(
            self.image_to_screen(Point::new(0.0, 0.0)),
            self.image_to_screen(Point::new(self.image_size.0, self.image_size.1)),
        )
    }

    pub fn zoom_in(&mut self) {
        let target = self.zoom * self.config.zoom_step;
        self.set_zoom_about(self.canvas_center(), target);
    }

    pub fn zoom_out(&mut self) {
        let target = self.zoom / self.config.zoom_step;
        self.set_zoom_about(self.canvas_center(), target);
    }

    /// Multiply zoom by `factor`, keeping the image point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32) {
        let target = self.zoom * factor;
        self.set_zoom_about(anchor, target);
    }

    /// Fit the whole image into the canvas and centre it.
    pub fn set_default_zoom(&mut self) {
        self.zoom = self.config.min_zoom;
        self.translate = self.canvas_center();
        self.clamp_translate();
    }

    /// Zoom so one image pixel covers one screen pixel (clamped to the zoom bounds).
    pub fn set_one_for_one_zoom(&mut self) {
        let target = 1.0 / self.fit_scale();
        self.set_zoom_about(self.canvas_center(), target);
    }

    /// Pan the view one step in `direction`.
    pub fn translate_view(&mut self, direction: Direction) {
        let step = self.config.translation_step;
        let (dx, dy) = match direction {
            Direction::Left => (step, 0.0),
            Direction::Right => (-step, 0.0),
            Direction::Up => (0.0, step),
            Direction::Down => (0.0, -step),
        };
        self.pan_by(dx, dy);
    }

    /// Move the image by a screen-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.translate = Point::new(self.translate.x + dx, self.translate.y + dy);
        self.clamp_translate();
    }

    fn set_zoom_about(&mut self, anchor: Point, zoom: f32) {
        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let image_point = self.screen_to_image(anchor);
        self.zoom = zoom;
        self.translate = anchor - (image_point - self.view_origin()) * self.scale();
        self.clamp_translate();
        log::debug!(
            "Viewport zoom={:.3} translate=({:.1}, {:.1})",
            self.zoom,
            self.translate.x,
            self.translate.y
        );
    }

    /// Keep the image from leaving the canvas by more than the pan margin.
    fn clamp_translate(&mut self) {
        let scale = self.scale();
        let center = self.canvas_center();
        let margin = self.config.pan_margin;
        let clamp_axis = |value: f32, image_extent: f32, canvas_half: f32| {
            let half = image_extent * scale / 2.0;
            let slack = ((half - canvas_half).max(0.0) + margin).max(0.0);
            value.clamp(canvas_half - slack, canvas_half + slack)
        };
        self.translate = Point::new(
            clamp_axis(self.translate.x, self.image_size.0, center.x),
            clamp_axis(self.translate.y, self.image_size.1, center.y),
        );
    }
}
