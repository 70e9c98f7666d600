//! Scripted editing sessions.
//!
//! A [`ReplayScript`] lists the images of a project and a sequence of input
//! events. Replaying it drives an [`EditorSession`] exactly as a host UI would,
//! which makes the editor usable headless: from the `labelkit-replay` binary,
//! from integration tests, or from a batch job that needs a rendered preview.

use std::fs;
use std::path::Path;

use labelkit_canvas::{Pixmap, RasterError, pixmap_from_rgba8, rasterize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AppConfig, ConfigError};
use crate::geometry::Point;
use crate::keybindings::{KeyCombo, command_table};
use crate::model::LabelType;
use crate::render::{RenderStyle, render};
use crate::state::{EditorSession, ImageData, LabelStore};
use crate::suggestions::{self, Suggestion};
use crate::viewport::Direction;

/// Errors that can occur while loading, replaying or exporting a script.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to rasterize frame: {0}")]
    Raster(#[from] RasterError),

    #[error("Failed to encode PNG: {0}")]
    Png(String),

    #[error("Script has no images")]
    NoImages,
}

/// An image entry of a script. Only the name and size matter to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        let (width, height) = crate::constants::viewport::DEFAULT_CANVAS_SIZE;
        Self { width, height }
    }
}

/// One input event. Pointer coordinates are screen pixels on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerLeave,
    /// Press and release at the same spot.
    Click { x: f32, y: f32 },
    /// A key combination, resolved through the configured shortcuts.
    Key { combo: KeyCombo },
    SetLabelType { label_type: LabelType },
    SelectClass { index: usize },
    SetImage { index: usize },
    NextImage,
    PreviousImage,
    Finish,
    Cancel,
    Undo,
    DeleteActiveLabel,
    ToggleLabelsVisibility,
    ZoomIn,
    ZoomOut,
    ZoomAt { x: f32, y: f32, factor: f32 },
    DefaultZoom,
    OneForOneZoom,
    Pan { direction: Direction },
    StartEllipse,
    ToggleEllipseMode,
    ToggleCrosshair,
    ToggleClassColoration,
    ToggleImageDragMode,
    /// Ingest detector output on the active image.
    Suggest { suggestions: Vec<Suggestion> },
    AcceptAllSuggestions,
    RejectAllSuggestions,
}

/// A replayable editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub images: Vec<ScriptImage>,
    #[serde(default)]
    pub canvas: CanvasSize,
    #[serde(default)]
    pub label_type: LabelType,
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let json = fs::read_to_string(path)?;
        let script = Self::from_json(&json)?;
        log::info!(
            "Loaded script {:?}: {} images, {} events",
            path,
            script.images.len(),
            script.events.len()
        );
        Ok(script)
    }
}

/// The state left behind by a replayed script.
#[derive(Debug, Clone)]
pub struct Replay {
    pub session: EditorSession,
    pub store: LabelStore,
}

impl Replay {
    /// Data of the image that was active when the script ended.
    pub fn active_image_data(&self) -> Option<&ImageData> {
        self.store.image(self.session.active_image(&self.store)?)
    }

    /// Labels of every image as pretty JSON.
    pub fn labels_json(&self) -> Result<String, ReplayError> {
        let images: Vec<&ImageData> = self
            .store
            .image_ids()
            .filter_map(|id| self.store.image(id))
            .collect();
        Ok(serde_json::to_string_pretty(&images)?)
    }

    /// Render the final frame and paint it into a pixmap.
    pub fn rasterize(
        &self,
        config: &AppConfig,
        background: Option<&Pixmap>,
    ) -> Result<Pixmap, ReplayError> {
        let style = RenderStyle::from_config(config);
        let frame = render(&self.session, &self.store, &style);
        Ok(rasterize(&frame, background)?)
    }
}

/// Run every event of `script` against a fresh session built from `config`.
pub fn run_script(script: &ReplayScript, config: &AppConfig) -> Result<Replay, ReplayError> {
    if script.images.is_empty() {
        return Err(ReplayError::NoImages);
    }

    let mut store = LabelStore::new();
    for image in &script.images {
        store.add_image(image.name.as_str(), image.width, image.height);
    }

    let mut session = EditorSession::from_config(config);
    session.set_canvas_size(script.canvas.width, script.canvas.height);
    session.set_active_image(&mut store, 0);
    session.set_label_type(&mut store, script.label_type);

    let table = command_table(&config.shortcuts);
    for (index, event) in script.events.iter().enumerate() {
        log::trace!("Event {}: {:?}", index, event);
        apply_event(&mut session, &mut store, &table, event);
    }

    log::info!("Replayed {} events", script.events.len());
    Ok(Replay { session, store })
}

fn apply_event(
    session: &mut EditorSession,
    store: &mut LabelStore,
    table: &crate::keybindings::CommandTable,
    event: &ReplayEvent,
) {
    match event {
        ReplayEvent::PointerDown { x, y } => session.pointer_down(store, Point::new(*x, *y)),
        ReplayEvent::PointerMove { x, y } => session.pointer_move(store, Point::new(*x, *y)),
        ReplayEvent::PointerUp { x, y } => session.pointer_up(store, Point::new(*x, *y)),
        ReplayEvent::PointerLeave => session.pointer_leave(),
        ReplayEvent::Click { x, y } => {
            session.pointer_down(store, Point::new(*x, *y));
            session.pointer_up(store, Point::new(*x, *y));
        }
        ReplayEvent::Key { combo } => {
            session.key_down(store, combo, table);
        }
        ReplayEvent::SetLabelType { label_type } => session.set_label_type(store, *label_type),
        ReplayEvent::SelectClass { index } => {
            session.select_class(store, *index);
        }
        ReplayEvent::SetImage { index } => {
            session.set_active_image(store, *index);
        }
        ReplayEvent::NextImage => {
            session.next_image(store);
        }
        ReplayEvent::PreviousImage => {
            session.previous_image(store);
        }
        ReplayEvent::Finish => {
            session.finish(store);
        }
        ReplayEvent::Cancel => session.cancel(store),
        ReplayEvent::Undo => session.undo_last_step(store),
        ReplayEvent::DeleteActiveLabel => {
            session.delete_active_label(store);
        }
        ReplayEvent::ToggleLabelsVisibility => {
            session.toggle_labels_visibility(store);
        }
        ReplayEvent::ZoomIn => session.zoom_in(),
        ReplayEvent::ZoomOut => session.zoom_out(),
        ReplayEvent::ZoomAt { x, y, factor } => session.zoom_at(Point::new(*x, *y), *factor),
        ReplayEvent::DefaultZoom => session.set_default_zoom(),
        ReplayEvent::OneForOneZoom => session.set_one_for_one_zoom(),
        ReplayEvent::Pan { direction } => session.translate_view(*direction),
        ReplayEvent::StartEllipse => match session.polygon_engine() {
            Some(engine) => engine.start_ellipse(),
            None => log::warn!("Ellipse mode needs the polygon label type"),
        },
        ReplayEvent::ToggleEllipseMode => match session.polygon_engine() {
            Some(engine) => engine.toggle_ellipse_mode(),
            None => log::warn!("Ellipse mode needs the polygon label type"),
        },
        ReplayEvent::ToggleCrosshair => session.toggle_crosshair(),
        ReplayEvent::ToggleClassColoration => session.toggle_class_coloration(),
        ReplayEvent::ToggleImageDragMode => {
            session.toggle_image_drag_mode(store);
        }
        ReplayEvent::Suggest { suggestions } => {
            if let Some(image) = session.active_image(store) {
                suggestions::ingest(store, image, suggestions.iter().cloned());
            }
        }
        ReplayEvent::AcceptAllSuggestions => {
            if let Some(image) = session.active_image(store) {
                suggestions::accept_all(store, image);
            }
        }
        ReplayEvent::RejectAllSuggestions => {
            if let Some(image) = session.active_image(store) {
                suggestions::reject_all(store, image);
            }
        }
    }
}

/// Decode an image file into a pixmap usable as the frame background.
pub fn load_background(path: &Path) -> Result<Pixmap, ReplayError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::info!("Loaded background {:?} ({}x{})", path, width, height);
    Ok(pixmap_from_rgba8(width, height, rgba.as_raw())?)
}

pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<(), ReplayError> {
    pixmap
        .save_png(path)
        .map_err(|e| ReplayError::Png(e.to_string()))?;
    log::info!("Wrote {:?}", path);
    Ok(())
}
