//! Keyboard shortcuts for the editor.
//!
//! Shortcuts are stored as a list of [`ShortcutItem`]s (each with its current
//! and default key combination) so they can be edited and persisted in the
//! config file. [`command_table`] turns that list into a lookup table that
//! [`crate::state::EditorSession::key_down`] consults for every key press.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::viewport::Direction;

/// Maximum number of classes that can have hotkeys (0-9 keys).
pub const MAX_CLASS_HOTKEYS: u8 = 10;

/// A key without modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, stored lowercase.
    Char(char),
    Space,
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl Key {
    fn parse(name: &str) -> Option<Self> {
        let key = match name {
            " " | "Space" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "Tab" => Key::Tab,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    fn name(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Space => " ".to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Enter => "Enter".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::ArrowLeft => "ArrowLeft".to_string(),
            Key::ArrowRight => "ArrowRight".to_string(),
            Key::ArrowUp => "ArrowUp".to_string(),
            Key::ArrowDown => "ArrowDown".to_string(),
        }
    }
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };
}

/// Errors from parsing a key combination.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyComboError {
    #[error("Key combination is empty")]
    Empty,

    #[error("Unknown key: {0:?}")]
    UnknownKey(String),

    #[error("Key combination has no non-modifier key")]
    MissingKey,

    #[error("Key combination has more than one non-modifier key")]
    MultipleKeys,
}

/// A key plus modifiers, written as e.g. `["Control", "z"]` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl KeyCombo {
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// A key without modifiers.
    pub fn key(key: Key) -> Self {
        Self::new(Modifiers::NONE, key)
    }

    pub fn ctrl(key: Key) -> Self {
        Self::new(
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
            key,
        )
    }

    pub fn alt(key: Key) -> Self {
        Self::new(
            Modifiers {
                alt: true,
                ..Modifiers::NONE
            },
            key,
        )
    }

    /// Parse a list of key names such as `["Control", "ArrowLeft"]`.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, KeyComboError> {
        if names.is_empty() {
            return Err(KeyComboError::Empty);
        }
        let mut modifiers = Modifiers::NONE;
        let mut key = None;
        for name in names {
            match name.as_ref() {
                "Control" | "Ctrl" => modifiers.ctrl = true,
                "Alt" | "Option" => modifiers.alt = true,
                "Shift" => modifiers.shift = true,
                "Meta" | "Command" | "Cmd" => modifiers.meta = true,
                other => {
                    let parsed =
                        Key::parse(other).ok_or_else(|| KeyComboError::UnknownKey(other.into()))?;
                    if key.replace(parsed).is_some() {
                        return Err(KeyComboError::MultipleKeys);
                    }
                }
            }
        }
        key.map(|key| Self { modifiers, key })
            .ok_or(KeyComboError::MissingKey)
    }

    /// Key names in canonical order (modifiers first).
    pub fn names(&self) -> Vec<String> {
        let m = &self.modifiers;
        [
            (m.ctrl, "Control"),
            (m.alt, "Alt"),
            (m.shift, "Shift"),
            (m.meta, "Meta"),
        ]
        .into_iter()
        .filter(|(held, _)| *held)
        .map(|(_, name)| name.to_string())
        .chain(std::iter::once(self.key.name()))
        .collect()
    }
}

impl TryFrom<Vec<String>> for KeyCombo {
    type Error = KeyComboError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(names.as_slice())
    }
}

impl From<KeyCombo> for Vec<String> {
    fn from(combo: KeyCombo) -> Self {
        combo.names()
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .names()
            .into_iter()
            .map(|n| if n == " " { "Space".to_string() } else { n })
            .collect();
        write!(f, "{}", names.join("+"))
    }
}

/// Editor actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FinishCreation,
    CancelCreation,
    UndoLastVertex,
    ToggleLabelsVisibility,
    PreviousImage,
    NextImage,
    ZoomIn,
    ZoomOut,
    Pan(Direction),
    DeleteActiveLabel,
    /// Select the class at this index (0-9).
    SelectClass(u8),
}

impl Command {
    /// Stable shortcut id used in config files.
    pub fn shortcut_id(&self) -> String {
        match self {
            Command::FinishCreation => "finish-polygon-creation".to_string(),
            Command::CancelCreation => "cancel-label-creation".to_string(),
            Command::UndoLastVertex => "undo-last-point".to_string(),
            Command::ToggleLabelsVisibility => "toggle-labels-visibility".to_string(),
            Command::PreviousImage => "previous-image".to_string(),
            Command::NextImage => "next-image".to_string(),
            Command::ZoomIn => "zoom-in".to_string(),
            Command::ZoomOut => "zoom-out".to_string(),
            Command::Pan(Direction::Right) => "move-right".to_string(),
            Command::Pan(Direction::Left) => "move-left".to_string(),
            Command::Pan(Direction::Up) => "move-up".to_string(),
            Command::Pan(Direction::Down) => "move-down".to_string(),
            Command::DeleteActiveLabel => "delete-active-label".to_string(),
            Command::SelectClass(i) => format!("select-label-{}", i),
        }
    }

    pub fn from_shortcut_id(id: &str) -> Option<Self> {
        let command = match id {
            "finish-polygon-creation" => Command::FinishCreation,
            "cancel-label-creation" => Command::CancelCreation,
            "undo-last-point" => Command::UndoLastVertex,
            "toggle-labels-visibility" => Command::ToggleLabelsVisibility,
            "previous-image" => Command::PreviousImage,
            "next-image" => Command::NextImage,
            "zoom-in" => Command::ZoomIn,
            "zoom-out" => Command::ZoomOut,
            "move-right" => Command::Pan(Direction::Right),
            "move-left" => Command::Pan(Direction::Left),
            "move-up" => Command::Pan(Direction::Up),
            "move-down" => Command::Pan(Direction::Down),
            "delete-active-label" => Command::DeleteActiveLabel,
            _ => {
                let index: u8 = id.strip_prefix("select-label-")?.parse().ok()?;
                return (index < MAX_CLASS_HOTKEYS).then_some(Command::SelectClass(index));
            }
        };
        Some(command)
    }
}

/// Which set of default combinations to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

/// One configurable shortcut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutItem {
    pub id: String,
    pub name: String,
    pub key_combo: KeyCombo,
    pub default_key_combo: KeyCombo,
    pub description: String,
}

impl ShortcutItem {
    fn new(command: Command, name: &str, combo: KeyCombo, description: &str) -> Self {
        Self {
            id: command.shortcut_id(),
            name: name.to_string(),
            key_combo: combo,
            default_key_combo: combo,
            description: description.to_string(),
        }
    }

    pub fn command(&self) -> Option<Command> {
        Command::from_shortcut_id(&self.id)
    }
}

/// The full, editable shortcut list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcutConfig {
    pub items: Vec<ShortcutItem>,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self::defaults(Platform::current())
    }
}

impl ShortcutConfig {
    /// Default shortcuts. On macOS Alt (Option) replaces Control and
    /// Backspace deletes.
    pub fn defaults(platform: Platform) -> Self {
        let mac = platform == Platform::Mac;
        let primary = |key| {
            if mac {
                KeyCombo::alt(key)
            } else {
                KeyCombo::ctrl(key)
            }
        };

        let mut items = vec![
            ShortcutItem::new(
                Command::FinishCreation,
                "Finish Polygon Creation",
                KeyCombo::key(Key::Space),
                "Completes polygon creation and adds the label",
            ),
            ShortcutItem::new(
                Command::CancelCreation,
                "Cancel Label Creation",
                KeyCombo::key(Key::Escape),
                "Cancels current label creation",
            ),
            ShortcutItem::new(
                Command::UndoLastVertex,
                "Undo Last Point",
                KeyCombo::ctrl(Key::Char('z')),
                "Removes the last added point in polygon creation",
            ),
            ShortcutItem::new(
                Command::ToggleLabelsVisibility,
                "Toggle Labels Visibility",
                KeyCombo::alt(Key::Char('z')),
                "Shows or hides all labels in the current image",
            ),
            ShortcutItem::new(
                Command::PreviousImage,
                "Previous Image",
                primary(Key::ArrowLeft),
                "Go to the previous image",
            ),
            ShortcutItem::new(
                Command::NextImage,
                "Next Image",
                primary(Key::ArrowRight),
                "Go to the next image",
            ),
            ShortcutItem::new(
                Command::ZoomIn,
                "Zoom In",
                primary(Key::Char('+')),
                "Zoom in the image",
            ),
            ShortcutItem::new(
                Command::ZoomOut,
                "Zoom Out",
                primary(Key::Char('-')),
                "Zoom out the image",
            ),
            ShortcutItem::new(
                Command::Pan(Direction::Right),
                "Move Right",
                KeyCombo::key(Key::ArrowRight),
                "Move image right when zoomed",
            ),
            ShortcutItem::new(
                Command::Pan(Direction::Left),
                "Move Left",
                KeyCombo::key(Key::ArrowLeft),
                "Move image left when zoomed",
            ),
            ShortcutItem::new(
                Command::Pan(Direction::Up),
                "Move Up",
                KeyCombo::key(Key::ArrowUp),
                "Move image up when zoomed",
            ),
            ShortcutItem::new(
                Command::Pan(Direction::Down),
                "Move Down",
                KeyCombo::key(Key::ArrowDown),
                "Move image down when zoomed",
            ),
            ShortcutItem::new(
                Command::DeleteActiveLabel,
                "Delete Active Label",
                KeyCombo::key(if mac { Key::Backspace } else { Key::Delete }),
                "Delete currently selected label",
            ),
        ];

        for i in 0..MAX_CLASS_HOTKEYS {
            let digit = char::from(b'0' + i);
            items.push(ShortcutItem::new(
                Command::SelectClass(i),
                &format!("Select Label {}", i),
                primary(Key::Char(digit)),
                &format!("Selects label at index {}", i),
            ));
        }

        Self { items }
    }

    pub fn get(&self, id: &str) -> Option<&ShortcutItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Rebind a shortcut. Returns false for unknown ids.
    pub fn set_combo(&mut self, id: &str, combo: KeyCombo) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                log::info!("Shortcut '{}' bound to {}", id, combo);
                item.key_combo = combo;
                true
            }
            None => false,
        }
    }

    /// Restore a shortcut's default combination. Returns false for unknown ids.
    pub fn reset_to_default(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.key_combo = item.default_key_combo;
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&mut self) {
        for item in &mut self.items {
            item.key_combo = item.default_key_combo;
        }
    }

    /// Check if a combination is already used by another shortcut.
    /// Returns the conflicting shortcut, if any.
    pub fn conflict(&self, combo: &KeyCombo, exclude_id: Option<&str>) -> Option<&ShortcutItem> {
        self.items
            .iter()
            .filter(|item| Some(item.id.as_str()) != exclude_id)
            .find(|item| item.key_combo == *combo)
    }
}

/// Resolved key combination to command lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandTable {
    bindings: HashMap<KeyCombo, Command>,
}

impl CommandTable {
    pub fn resolve(&self, combo: &KeyCombo) -> Option<Command> {
        self.bindings.get(combo).copied()
    }

    /// The combination bound to `command`, if any.
    pub fn combo_for(&self, command: Command) -> Option<KeyCombo> {
        self.bindings
            .iter()
            .find(|(_, c)| **c == command)
            .map(|(combo, _)| *combo)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Build the lookup table for a shortcut list.
///
/// Unknown ids are skipped. When two shortcuts share a combination the one
/// listed first wins.
pub fn command_table(config: &ShortcutConfig) -> CommandTable {
    let mut bindings = HashMap::new();
    for item in &config.items {
        let Some(command) = item.command() else {
            log::warn!("Ignoring unknown shortcut id '{}'", item.id);
            continue;
        };
        if bindings.contains_key(&item.key_combo) {
            log::warn!(
                "Shortcut '{}' ({}) conflicts with an earlier binding",
                item.id,
                item.key_combo
            );
            continue;
        }
        bindings.insert(item.key_combo, command);
    }
    CommandTable { bindings }
}
