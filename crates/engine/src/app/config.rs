use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::input::Point;
use crate::resources::{ResourceDesc, RsrcId, RESOURCES_FOLDER_NAME};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowDisplayMode {
    #[default]
    Windowed,
    FullScreen,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowBorderMode {
    #[default]
    Bordered,
    Borderless,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub name: String,
    pub icon_path: Option<PathBuf>,
    /// `None` lets the platform place the window.
    pub pos: Option<Point>,
    pub width: u32,
    pub height: u32,
    pub display_mode: WindowDisplayMode,
    pub border_mode: WindowBorderMode,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            name: "engine".to_string(),
            icon_path: None,
            pos: None,
            width: 1280,
            height: 720,
            display_mode: WindowDisplayMode::Windowed,
            border_mode: WindowBorderMode::Bordered,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub resources_dir: PathBuf,
    pub resources: Vec<ResourceDesc>,
    pub debug_console_rsrc_id: Option<RsrcId>,
    pub max_render_fps: Option<u32>,
    pub overlay_visible: bool,
    pub max_frame_delta: Duration,
}

/// Engine defaults for a project installed under `project_install_prefix`.
pub fn default_engine_config(project_install_prefix: &Path) -> EngineConfig {
    EngineConfig {
        window: WindowConfig::default(),
        resources_dir: project_install_prefix.join(RESOURCES_FOLDER_NAME),
        resources: Vec::new(),
        debug_console_rsrc_id: None,
        max_render_fps: Some(60),
        overlay_visible: false,
        max_frame_delta: Duration::from_millis(250),
    }
}
