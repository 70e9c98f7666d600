//! Editor session: the state of one editing canvas.
//!
//! The session owns the viewport, the active engine slot and the selection.
//! It never owns labels; every handler that can change labels takes the
//! [`LabelStore`] explicitly.

use crate::config::AppConfig;
use crate::engine::{CreationEngine, EngineConfig, EngineContext, PolygonEngine, Transient};
use crate::geometry::Point;
use crate::keybindings::{Command, CommandTable, KeyCombo};
use crate::model::{Category, ClassId, Label, LabelId, LabelPatch, LabelType};
use crate::state::{ImageId, LabelStore};
use crate::viewport::{Direction, Viewport};

#[derive(Debug, Clone)]
pub struct EditorSession {
    viewport: Viewport,
    engine_config: EngineConfig,
    classes: Vec<Category>,
    active_image_index: usize,
    active_label_type: LabelType,
    active_label_id: Option<LabelId>,
    active_class: Option<ClassId>,
    /// Engine for the active label type; `None` for image recognition.
    engine: Option<CreationEngine>,
    /// Last pointer position in screen space.
    cursor: Option<Point>,
    crosshair_visible: bool,
    per_class_coloration: bool,
    image_drag_mode: bool,
    /// Last pointer position of an image drag in progress.
    drag_origin: Option<Point>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl EditorSession {
    pub fn from_config(config: &AppConfig) -> Self {
        let label_type = LabelType::default();
        Self {
            viewport: Viewport::new(
                config.viewport,
                crate::constants::viewport::DEFAULT_CANVAS_SIZE,
            ),
            engine_config: config.engine,
            classes: config.classes.clone(),
            active_image_index: 0,
            active_label_type: label_type,
            active_label_id: None,
            active_class: config.classes.first().map(|c| c.id),
            engine: CreationEngine::for_label_type(label_type),
            cursor: None,
            crosshair_visible: config.preferences.crosshair_visible,
            per_class_coloration: config.preferences.per_class_coloration,
            image_drag_mode: false,
            drag_origin: None,
        }
    }

    // Accessors

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    pub fn class(&self, id: ClassId) -> Option<&Category> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn active_image_index(&self) -> usize {
        self.active_image_index
    }

    /// Id of the active image, if the store has one at the active index.
    pub fn active_image(&self, store: &LabelStore) -> Option<ImageId> {
        store.image_at(self.active_image_index).map(|img| img.id)
    }

    pub fn active_label_type(&self) -> LabelType {
        self.active_label_type
    }

    pub fn active_label_id(&self) -> Option<LabelId> {
        self.active_label_id
    }

    pub fn active_label<'s>(&self, store: &'s LabelStore) -> Option<&'s Label> {
        let image = self.active_image(store)?;
        store.label(image, self.active_label_id?)
    }

    pub fn active_class(&self) -> Option<ClassId> {
        self.active_class
    }

    pub fn engine(&self) -> Option<&CreationEngine> {
        self.engine.as_ref()
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn crosshair_visible(&self) -> bool {
        self.crosshair_visible
    }

    pub fn per_class_coloration(&self) -> bool {
        self.per_class_coloration
    }

    pub fn image_drag_mode(&self) -> bool {
        self.image_drag_mode
    }

    /// In-progress shape of the active engine.
    pub fn transient(&self) -> Option<Transient> {
        self.engine.as_ref()?.transient(&self.engine_config)
    }

    /// Split borrows so the engine can run against the store.
    fn engine_and_context<'a>(
        &'a mut self,
        store: &'a mut LabelStore,
    ) -> Option<(&'a mut CreationEngine, EngineContext<'a>)> {
        let image = store.image_at(self.active_image_index)?.id;
        let engine = self.engine.as_mut()?;
        Some((
            engine,
            EngineContext {
                store,
                viewport: &self.viewport,
                config: &self.engine_config,
                image,
                class_id: self.active_class,
                active_label: &mut self.active_label_id,
            },
        ))
    }

    // Pointer input

    pub fn pointer_down(&mut self, store: &mut LabelStore, screen: Point) {
        self.cursor = Some(screen);
        if self.image_drag_mode {
            self.drag_origin = Some(screen);
            return;
        }
        match self.engine_and_context(store) {
            Some((engine, mut ctx)) => engine.begin_or_continue(&mut ctx, screen),
            None => log::debug!("Pointer down ignored: no active image or engine"),
        }
    }

    pub fn pointer_move(&mut self, store: &mut LabelStore, screen: Point) {
        log::trace!("Pointer at ({:.1}, {:.1})", screen.x, screen.y);
        self.cursor = Some(screen);
        if self.image_drag_mode {
            if let Some(origin) = self.drag_origin.replace(screen) {
                self.viewport.pan_by(screen.x - origin.x, screen.y - origin.y);
            }
            return;
        }
        if let Some((engine, mut ctx)) = self.engine_and_context(store) {
            engine.move_cursor(&mut ctx, screen);
        }
    }

    pub fn pointer_up(&mut self, store: &mut LabelStore, screen: Point) {
        self.cursor = Some(screen);
        if self.image_drag_mode {
            self.drag_origin = None;
            return;
        }
        if let Some((engine, mut ctx)) = self.engine_and_context(store) {
            engine.release(&mut ctx, screen);
        }
    }

    /// The pointer left the canvas; hides the crosshair.
    pub fn pointer_leave(&mut self) {
        self.cursor = None;
        self.drag_origin = None;
    }

    // Creation control

    /// Commit the shape in progress. Returns the new label id on success.
    pub fn finish(&mut self, store: &mut LabelStore) -> Option<LabelId> {
        let (engine, mut ctx) = self.engine_and_context(store)?;
        engine.finish(&mut ctx)
    }

    pub fn cancel(&mut self, store: &mut LabelStore) {
        if let Some((engine, mut ctx)) = self.engine_and_context(store) {
            engine.cancel(&mut ctx);
        }
    }

    pub fn undo_last_step(&mut self, store: &mut LabelStore) {
        if let Some((engine, mut ctx)) = self.engine_and_context(store) {
            engine.undo_last_step(&mut ctx);
        }
    }

    /// The polygon engine, when polygons are being drawn.
    pub fn polygon_engine(&mut self) -> Option<&mut PolygonEngine> {
        self.engine.as_mut()?.as_polygon_mut()
    }

    /// Switch the label type. Any shape in progress is cancelled.
    pub fn set_label_type(&mut self, store: &mut LabelStore, label_type: LabelType) {
        if label_type == self.active_label_type {
            return;
        }
        self.cancel(store);
        self.active_label_type = label_type;
        self.active_label_id = None;
        self.engine = CreationEngine::for_label_type(label_type);
        log::info!("Label type: {}", label_type.name());
    }

    // Images

    /// Make the image at `index` active. Any shape in progress is cancelled
    /// and the view is reset to fit the new image.
    pub fn set_active_image(&mut self, store: &mut LabelStore, index: usize) -> bool {
        let Some(image) = store.image_at(index) else {
            log::debug!("No image at index {}", index);
            return false;
        };
        let (width, height) = image.size;
        let name = image.name.clone();

        self.cancel(store);
        self.active_image_index = index;
        self.active_label_id = None;
        self.drag_origin = None;
        self.viewport.set_image_size(width as f32, height as f32);
        self.sync_image_drag_mode();
        log::info!("Active image {} '{}' ({}x{})", index, name, width, height);
        true
    }

    pub fn next_image(&mut self, store: &mut LabelStore) -> bool {
        self.set_active_image(store, self.active_image_index + 1)
    }

    pub fn previous_image(&mut self, store: &mut LabelStore) -> bool {
        match self.active_image_index.checked_sub(1) {
            Some(index) => self.set_active_image(store, index),
            None => false,
        }
    }

    // Labels and classes

    /// Delete the selected label. Returns the removed label.
    pub fn delete_active_label(&mut self, store: &mut LabelStore) -> Option<Label> {
        let id = self.active_label_id?;
        let image = self.active_image(store)?;
        self.cancel(store);
        self.active_label_id = None;
        store.delete(image, id)
    }

    /// Hide all labels of the active image, or show them if all are hidden.
    pub fn toggle_labels_visibility(&mut self, store: &mut LabelStore) -> Option<bool> {
        let image = self.active_image(store)?;
        store.toggle_all_visibility(image)
    }

    /// Pick the class at `index` in the class list.
    ///
    /// In image recognition mode this toggles the class as a tag on the active
    /// image. Otherwise it becomes the class for new labels and is applied to
    /// the selected label.
    pub fn select_class(&mut self, store: &mut LabelStore, index: usize) -> bool {
        let Some(class_id) = self.classes.get(index).map(|c| c.id) else {
            log::debug!("No class at index {}", index);
            return false;
        };
        let Some(image) = self.active_image(store) else {
            self.active_class = Some(class_id);
            return true;
        };

        if self.active_label_type == LabelType::ImageRecognition {
            return store.toggle_tag(image, class_id).is_some();
        }

        self.active_class = Some(class_id);
        if let Some(id) = self.active_label_id {
            store.mutate(image, id, LabelPatch::class(Some(class_id)));
        }
        true
    }

    // View

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.viewport.set_canvas_size(width, height);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.sync_image_drag_mode();
    }

    /// Wheel zoom around a screen point.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32) {
        self.viewport.zoom_at(anchor, factor);
        self.sync_image_drag_mode();
    }

    pub fn set_default_zoom(&mut self) {
        self.viewport.set_default_zoom();
        self.sync_image_drag_mode();
    }

    pub fn set_one_for_one_zoom(&mut self) {
        self.viewport.set_one_for_one_zoom();
        self.sync_image_drag_mode();
    }

    pub fn translate_view(&mut self, direction: Direction) {
        self.viewport.translate_view(direction);
    }

    pub fn toggle_crosshair(&mut self) {
        self.crosshair_visible = !self.crosshair_visible;
    }

    pub fn toggle_class_coloration(&mut self) {
        self.per_class_coloration = !self.per_class_coloration;
    }

    /// Toggle dragging the image with the pointer. Only possible while zoomed.
    pub fn toggle_image_drag_mode(&mut self, store: &mut LabelStore) -> bool {
        if !self.image_drag_mode && !self.viewport.is_zoomed() {
            log::debug!("Image drag mode needs a zoomed view");
            return false;
        }
        self.cancel(store);
        self.image_drag_mode = !self.image_drag_mode;
        self.drag_origin = None;
        true
    }

    fn sync_image_drag_mode(&mut self) {
        if self.image_drag_mode && !self.viewport.is_zoomed() {
            self.image_drag_mode = false;
            self.drag_origin = None;
        }
    }

    // Keyboard

    /// Run the command bound to `combo`, if any. Returns the command run.
    pub fn key_down(
        &mut self,
        store: &mut LabelStore,
        combo: &KeyCombo,
        table: &CommandTable,
    ) -> Option<Command> {
        let Some(command) = table.resolve(combo) else {
            log::trace!("Unbound key {}", combo);
            return None;
        };
        log::debug!("Key {} -> {:?}", combo, command);
        self.execute(store, command);
        Some(command)
    }

    pub fn execute(&mut self, store: &mut LabelStore, command: Command) {
        match command {
            Command::FinishCreation => {
                self.finish(store);
            }
            Command::CancelCreation => self.cancel(store),
            Command::UndoLastVertex => self.undo_last_step(store),
            Command::ToggleLabelsVisibility => {
                self.toggle_labels_visibility(store);
            }
            Command::PreviousImage => {
                self.previous_image(store);
            }
            Command::NextImage => {
                self.next_image(store);
            }
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::Pan(direction) => self.translate_view(direction),
            Command::DeleteActiveLabel => {
                self.delete_active_label(store);
            }
            Command::SelectClass(index) => {
                self.select_class(store, usize::from(index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::keybindings::{Key, Platform, ShortcutConfig, command_table};
    use crate::model::{Geometry, LabelStatus};

    fn setup() -> (EditorSession, LabelStore) {
        let mut store = LabelStore::new();
        store.add_image("first.png", 200, 100);
        store.add_image("second.png", 400, 300);
        let mut session = EditorSession::default();
        session.set_canvas_size(200.0, 100.0);
        assert!(session.set_active_image(&mut store, 0));
        (session, store)
    }

    fn click(session: &mut EditorSession, store: &mut LabelStore, x: f32, y: f32) {
        session.pointer_down(store, Point::new(x, y));
        session.pointer_up(store, Point::new(x, y));
    }

    #[test]
    fn test_rect_drag_through_session() {
        let (mut session, mut store) = setup();
        session.pointer_down(&mut store, Point::new(10.0, 10.0));
        session.pointer_move(&mut store, Point::new(50.0, 40.0));
        session.pointer_up(&mut store, Point::new(50.0, 40.0));

        let image = session.active_image(&store).unwrap();
        let labels = store.labels(image);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].class_id, session.active_class());
        assert_eq!(session.active_label_id(), Some(labels[0].id));
    }

    #[test]
    fn test_switching_label_type_cancels() {
        let (mut session, mut store) = setup();
        session.set_label_type(&mut store, LabelType::Polygon);
        click(&mut session, &mut store, 10.0, 10.0);
        click(&mut session, &mut store, 50.0, 10.0);
        assert!(session.transient().is_some());

        session.set_label_type(&mut store, LabelType::Line);
        assert!(session.transient().is_none());
        assert!(session.engine().unwrap().is_idle());
        let image = session.active_image(&store).unwrap();
        assert!(store.labels(image).is_empty());
    }

    #[test]
    fn test_switching_image_cancels_and_refits() {
        let (mut session, mut store) = setup();
        session.set_label_type(&mut store, LabelType::Line);
        click(&mut session, &mut store, 10.0, 10.0);

        assert!(session.next_image(&mut store));
        assert_eq!(session.active_image_index(), 1);
        assert!(session.transient().is_none());
        assert_eq!(session.viewport().image_size(), (400.0, 300.0));
        assert!(!session.next_image(&mut store));
        assert!(session.previous_image(&mut store));
        assert!(!session.previous_image(&mut store));
    }

    #[test]
    fn test_image_recognition_has_no_engine() {
        let (mut session, mut store) = setup();
        session.set_label_type(&mut store, LabelType::ImageRecognition);
        assert!(session.engine().is_none());
        click(&mut session, &mut store, 10.0, 10.0);
        assert!(session.finish(&mut store).is_none());

        assert!(session.select_class(&mut store, 1));
        let image = session.active_image(&store).unwrap();
        assert!(store.image(image).unwrap().tags().contains(&2));
        assert!(store.labels(image).is_empty());
    }

    #[test]
    fn test_select_class_applies_to_active_label() {
        let (mut session, mut store) = setup();
        session.set_label_type(&mut store, LabelType::Point);
        click(&mut session, &mut store, 20.0, 20.0);
        assert!(session.select_class(&mut store, 2));

        let label = session.active_label(&store).unwrap();
        assert_eq!(label.class_id, Some(3));
        assert_eq!(session.active_class(), Some(3));
        assert!(!session.select_class(&mut store, 9));
    }

    #[test]
    fn test_key_down_dispatch() {
        let (mut session, mut store) = setup();
        let table = command_table(&ShortcutConfig::defaults(Platform::Other));
        session.set_label_type(&mut store, LabelType::Polygon);
        for (x, y) in [(10.0, 10.0), (50.0, 10.0), (50.0, 50.0)] {
            click(&mut session, &mut store, x, y);
        }
        let command = session.key_down(&mut store, &KeyCombo::key(Key::Space), &table);
        assert_eq!(command, Some(Command::FinishCreation));

        let image = session.active_image(&store).unwrap();
        assert_eq!(store.labels(image).len(), 1);

        session.key_down(&mut store, &KeyCombo::key(Key::Delete), &table);
        assert!(store.labels(image).is_empty());
        assert_eq!(session.active_label_id(), None);

        assert_eq!(
            session.key_down(&mut store, &KeyCombo::key(Key::Char('q')), &table),
            None
        );
    }

    #[test]
    fn test_toggle_labels_visibility() {
        let (mut session, mut store) = setup();
        let image = session.active_image(&store).unwrap();
        store.commit(
            image,
            None,
            LabelStatus::Accepted,
            Geometry::Rect {
                rect: Rect::from_xywh(0.0, 0.0, 10.0, 10.0),
            },
        );
        assert_eq!(session.toggle_labels_visibility(&mut store), Some(false));
        assert!(!store.labels(image)[0].visible);
    }

    #[test]
    fn test_image_drag_mode_requires_zoom() {
        let (mut session, mut store) = setup();
        assert!(!session.toggle_image_drag_mode(&mut store));

        session.zoom_in();
        assert!(session.toggle_image_drag_mode(&mut store));
        let before = session.viewport().translate();
        session.pointer_down(&mut store, Point::new(100.0, 50.0));
        session.pointer_move(&mut store, Point::new(110.0, 50.0));
        session.pointer_up(&mut store, Point::new(110.0, 50.0));
        assert!(session.viewport().translate().x > before.x);

        // Nothing was drawn while dragging
        let image = session.active_image(&store).unwrap();
        assert!(store.labels(image).is_empty());

        session.set_default_zoom();
        assert!(!session.image_drag_mode());
    }

    #[test]
    fn test_ellipse_through_polygon_engine() {
        let (mut session, mut store) = setup();
        assert!(session.polygon_engine().is_none());
        session.set_label_type(&mut store, LabelType::Polygon);
        session.polygon_engine().unwrap().start_ellipse();
        click(&mut session, &mut store, 0.0, 0.0);
        session.pointer_move(&mut store, Point::new(100.0, 50.0));
        let id = session.finish(&mut store).unwrap();

        let image = session.active_image(&store).unwrap();
        let label = store.label(image, id).unwrap();
        assert_eq!(
            label.geometry.bounding_box(),
            Some(Rect::from_xywh(0.0, 0.0, 100.0, 50.0))
        );
    }
}
