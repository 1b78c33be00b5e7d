use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::canvas::{BrushSettings, DrawingTool, Rgb};
use crate::constants::{DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_HINT_COLLAPSE_SECS, DEFAULT_STROKE_WIDTH};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

fn default_width() -> f32 {
    DEFAULT_STROKE_WIDTH
}

fn default_check_interval() -> f32 {
    DEFAULT_CHECK_INTERVAL_SECS
}

fn default_hint_collapse() -> f32 {
    DEFAULT_HINT_COLLAPSE_SECS
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Tool selected when the app starts
    #[serde(default)]
    pub default_tool: DrawingTool,

    /// Ink color selected when the app starts
    #[serde(default)]
    pub default_color: Rgb,

    /// Stroke width selected when the app starts
    #[serde(default = "default_width")]
    pub default_width: f32,

    /// Minimum seconds between two implicit checks
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: f32,

    /// Idle seconds before the hint card collapses
    #[serde(default = "default_hint_collapse")]
    pub hint_collapse_secs: f32,

    /// Question that was active when the app last closed
    #[serde(default)]
    pub last_question_id: Option<String>,

    /// Last saved or opened drawing (not auto-loaded, just remembered for quick access)
    #[serde(default)]
    pub last_drawing_path: Option<PathBuf>,
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            default_tool: DrawingTool::default(),
            default_color: Rgb::default(),
            default_width: DEFAULT_STROKE_WIDTH,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            hint_collapse_secs: DEFAULT_HINT_COLLAPSE_SECS,
            last_question_id: None,
            last_drawing_path: None,
        }
    }
}

impl AppConfigData {
    /// Brush the drawing surface starts with
    pub fn brush(&self) -> BrushSettings {
        let width = if self.default_width.is_finite() && self.default_width > 0.0 {
            self.default_width
        } else {
            DEFAULT_STROKE_WIDTH
        };
        BrushSettings {
            tool: self.default_tool,
            color: self.default_color,
            width,
        }
    }

    pub fn check_interval(&self) -> std::time::Duration {
        seconds_or(self.check_interval_secs, DEFAULT_CHECK_INTERVAL_SECS)
    }

    pub fn hint_collapse(&self) -> std::time::Duration {
        seconds_or(self.hint_collapse_secs, DEFAULT_HINT_COLLAPSE_SECS)
    }
}

/// Negative or non-finite values in a hand-edited file fall back to the default
fn seconds_or(secs: f32, fallback: f32) -> std::time::Duration {
    if secs.is_finite() && secs >= 0.0 {
        std::time::Duration::from_secs_f32(secs)
    } else {
        std::time::Duration::from_secs_f32(fallback)
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

/// Resource for the "drawing file missing" warning dialog
#[derive(Resource, Default)]
pub struct MissingDrawingWarning {
    pub show: bool,
    pub path: Option<PathBuf>,
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to remember the current brush as the startup brush
#[derive(Message)]
pub struct UpdateBrushDefaultsRequest {
    pub brush: BrushSettings,
}

/// Message to remember the active question
#[derive(Message)]
pub struct UpdateLastQuestionRequest {
    pub question_id: Option<String>,
}

/// Message to update the last drawing path in config
#[derive(Message)]
pub struct UpdateLastDrawingRequest {
    pub path: PathBuf,
}

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Parse config file contents. Errors carry the message shown in the reset dialog.
pub fn parse_config(json: &str) -> Result<AppConfigData, String> {
    serde_json::from_str(json).map_err(|e| format!("Configuration file was corrupted: {}", e))
}

/// Result of loading config from disk
struct LoadConfigResult {
    config: AppConfig,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Load configuration from disk
fn load_config() -> LoadConfigResult {
    let config_path = get_config_path();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match parse_config(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(reason) => {
                    warn!("Failed to parse config file: {}", reason);
                    (AppConfigData::default(), Some(reason))
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult {
        config: AppConfig {
            data,
            config_path,
            dirty: false,
        },
        reset_reason,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config();
    config.data = result.config.data;
    config.config_path = result.config.config_path;
    config.dirty = result.config.dirty;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// Startup system to check if the last drawing still exists
fn check_last_drawing_exists(config: Res<AppConfig>, mut warning: ResMut<MissingDrawingWarning>) {
    if let Some(ref path) = config.data.last_drawing_path
        && !path.exists()
    {
        warning.show = true;
        warning.path = Some(path.clone());
        info!("Last drawing no longer exists: {:?}", path);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

fn update_brush_defaults_system(
    mut events: MessageReader<UpdateBrushDefaultsRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    // Only the latest brush of the frame matters
    let Some(event) = events.read().last() else {
        return;
    };
    let brush = event.brush;
    if config.data.brush() == brush {
        return;
    }
    config.data.default_tool = brush.tool;
    config.data.default_color = brush.color;
    config.data.default_width = brush.width;
    config.dirty = true;
    save_events.write(SaveConfigRequest);
}

fn update_last_question_system(
    mut events: MessageReader<UpdateLastQuestionRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_question_id == event.question_id {
            continue;
        }
        config.data.last_question_id = event.question_id.clone();
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

/// System to update last drawing path
fn update_last_drawing_system(
    mut events: MessageReader<UpdateLastDrawingRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.last_drawing_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<MissingDrawingWarning>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<UpdateBrushDefaultsRequest>()
            .add_message::<UpdateLastQuestionRequest>()
            .add_message::<UpdateLastDrawingRequest>()
            .add_systems(
                Startup,
                (load_config_system, check_last_drawing_exists)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    update_brush_defaults_system.run_if(on_message::<UpdateBrushDefaultsRequest>),
                    update_last_question_system.run_if(on_message::<UpdateLastQuestionRequest>),
                    update_last_drawing_system.run_if(on_message::<UpdateLastDrawingRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.default_tool, DrawingTool::Pen);
        assert_eq!(data.default_color, Rgb::BLACK);
        assert_eq!(data.default_width, 2.0);
        assert_eq!(data.check_interval_secs, 10.0);
        assert_eq!(data.hint_collapse_secs, 10.0);
        assert!(data.last_question_id.is_none());
        assert!(data.last_drawing_path.is_none());
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            default_tool: DrawingTool::Marker,
            default_color: Rgb::new(255, 0, 0),
            default_width: 6.0,
            check_interval_secs: 5.0,
            hint_collapse_secs: 20.0,
            last_question_id: Some("q2".to_string()),
            last_drawing_path: Some(PathBuf::from("/path/to/drawing.json")),
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed = parse_config(&json).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed = parse_config(r#"{ "default_tool": "eraser" }"#).unwrap();
        assert_eq!(parsed.default_tool, DrawingTool::Eraser);
        assert_eq!(parsed.default_width, 2.0);
        assert_eq!(parsed.check_interval_secs, 10.0);
    }

    #[test]
    fn test_corrupted_config_reports_reason() {
        let reason = parse_config("{ not json").unwrap_err();
        assert!(reason.starts_with("Configuration file was corrupted"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let data = AppConfigData {
            default_width: -3.0,
            check_interval_secs: f32::NAN,
            ..Default::default()
        };
        assert_eq!(data.brush().width, 2.0);
        assert_eq!(data.check_interval(), std::time::Duration::from_secs(10));
    }

    #[test]
    fn test_missing_drawing_warning_default() {
        let warning = MissingDrawingWarning::default();
        assert!(!warning.show);
        assert!(warning.path.is_none());
    }
}
