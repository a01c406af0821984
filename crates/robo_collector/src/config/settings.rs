use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{Point, WindowBorderMode, WindowDisplayMode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::gui::controller::LocalControllerMode;
use crate::gui::robot::RobotFieldMarkers;

/// Points at a settings file used instead of `<share>/config/settings.json`.
pub(crate) const SETTINGS_ENV_VAR: &str = "ROBO_COLLECTOR_SETTINGS";
const SETTINGS_FILE_NAME: &str = "settings.json";
const SETTINGS_FOLDER_NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    pub(crate) window_pos: Point,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) window_display_mode: WindowDisplayMode,
    pub(crate) window_border_mode: WindowBorderMode,
    pub(crate) tile_width_height: u32,
    pub(crate) robot_field_markers: RobotFieldMarkers,
    pub(crate) total_game_seconds: u32,
    pub(crate) local_controller_mode: LocalControllerMode,
    pub(crate) target_win_coins: u32,
    pub(crate) level_id: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            window_pos: Point::new(72, 27),
            window_width: 1848,
            window_height: 1053,
            window_display_mode: WindowDisplayMode::Windowed,
            window_border_mode: WindowBorderMode::Borderless,
            tile_width_height: 160,
            robot_field_markers: RobotFieldMarkers::Enabled,
            total_game_seconds: 180,
            local_controller_mode: LocalControllerMode::Disabled,
            target_win_coins: 30,
            level_id: 1,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file {path} at {location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn default_settings_path(project_install_prefix: &Path) -> PathBuf {
    project_install_prefix
        .join(SETTINGS_FOLDER_NAME)
        .join(SETTINGS_FILE_NAME)
}

/// Loads the game settings.
///
/// A file named by `ROBO_COLLECTOR_SETTINGS` must exist. The default file is
/// optional and built-in defaults apply when it is absent.
pub(crate) fn load_settings(project_install_prefix: &Path) -> Result<GameSettings, SettingsError> {
    let (path, required) = match env::var(SETTINGS_ENV_VAR) {
        Ok(value) => (PathBuf::from(value), true),
        Err(env::VarError::NotPresent) => (default_settings_path(project_install_prefix), false),
        Err(source) => {
            return Err(SettingsError::EnvVar {
                var: SETTINGS_ENV_VAR,
                source,
            })
        }
    };
    load_settings_file(&path, required)
}

fn load_settings_file(path: &Path, required: bool) -> Result<GameSettings, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "settings_file_absent");
            return Ok(GameSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let settings = parse_settings_json(&raw).map_err(|(location, source)| {
        SettingsError::Parse {
            path: path.to_path_buf(),
            location,
            source,
        }
    })?;
    info!(
        path = %path.display(),
        level_id = settings.level_id,
        "settings_loaded"
    );
    Ok(settings)
}

fn parse_settings_json(raw: &str) -> Result<GameSettings, (String, serde_json::Error)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameSettings>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let location = if path.is_empty() || path == "." {
            "document root".to_string()
        } else {
            path
        };
        (location, error.into_inner())
    })
}
