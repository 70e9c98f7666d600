//! Configuration file support for labelkit.
//!
//! This module provides serialization and deserialization of editor settings:
//! preferences, viewport limits, engine tolerances, keyboard shortcuts and the
//! label classes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::style;
use crate::engine::EngineConfig;
use crate::keybindings::ShortcutConfig;
use crate::model::{Category, default_categories};
use crate::viewport::ViewportConfig;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub preferences: UserPreferences,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub shortcuts: ShortcutConfig,

    /// Label classes, in hotkey order
    #[serde(default = "default_categories")]
    pub classes: Vec<Category>,
}

fn default_app_name() -> String {
    "labelkit".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Draw crosshair lines at the cursor
    #[serde(default = "default_true")]
    pub crosshair_visible: bool,

    /// Color labels by class instead of a single accent color
    #[serde(default = "default_true")]
    pub per_class_coloration: bool,

    #[serde(default = "default_accent_color")]
    pub accent_color: [u8; 3],
}

fn default_true() -> bool {
    true
}

fn default_accent_color() -> [u8; 3] {
    style::ACCENT_COLOR
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            crosshair_visible: true,
            per_class_coloration: true,
            accent_color: default_accent_color(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            viewport: ViewportConfig::default(),
            engine: EngineConfig::default(),
            shortcuts: ShortcutConfig::default(),
            classes: default_categories(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.viewport = config.viewport.sanitized();
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "labelkit-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("labelkit").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("labelkit")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::{Key, KeyCombo};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.app_name, "labelkit");
        assert_eq!(config.classes.len(), 3);
        assert!(config.preferences.crosshair_visible);
        assert_eq!(config.engine.ellipse_vertex_count, 36);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = AppConfig::default();
        config.preferences.log_level = LogLevel::Debug;
        config.engine.hit_tolerance = 12.0;
        config
            .shortcuts
            .set_combo("finish-polygon-creation", KeyCombo::key(Key::Enter));

        let json = config.to_json().unwrap();
        let loaded = AppConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        let result = AppConfig::from_json(&json);
        assert!(matches!(
            result,
            Err(ConfigError::VersionTooNew {
                file_version: 2,
                supported_version: 1
            })
        ));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let json = r#"{"version": 1, "engine": {"min_rect_size": 4.0}}"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.engine.min_rect_size, 4.0);
        assert_eq!(config.engine.handle_size, EngineConfig::default().handle_size);
        assert_eq!(config.viewport, ViewportConfig::default());
        assert_eq!(config.classes, default_categories());
        assert_eq!(config.app_name, "labelkit");
    }

    #[test]
    fn test_viewport_section_sanitized_on_load() {
        let json = r#"{"version": 1, "viewport": {"min_zoom": 8.0, "max_zoom": 2.0, "pan_margin": -5.0}}"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.viewport.min_zoom, 2.0);
        assert_eq!(config.viewport.max_zoom, 8.0);
        assert_eq!(config.viewport.pan_margin, 0.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AppConfig::from_json("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().name(), "Info");
    }
}
