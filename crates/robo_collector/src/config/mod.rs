//! Pure builders turning settings, the level file and the timer layout into
//! the immutable configuration of every subsystem.

pub(crate) mod level;
pub(crate) mod settings;
pub(crate) mod timers;

use std::path::Path;
use std::sync::Arc;

use engine::{
    default_engine_config, release_runtime_context, DependencyDescriptor, DependencyRegistry,
    EngineConfig, RESOURCES_FOLDER_NAME,
};
use thiserror::Error;
use tracing::debug;

use crate::comms::{self, CommsRuntime};
use crate::defines::{
    COINS_CNT, EMPTY_TILE_MARKER, ENEMY_MARKER, HARD_OBSTACLE_MARKER, PLAYER_MARKER,
};
use crate::gui::coin_handler::CoinHandlerConfig;
use crate::gui::controller::RoboCollectorControllerConfig;
use crate::gui::field::{FieldConfig, FieldDescription};
use crate::gui::panels::{
    CoinPanelConfig, HealthPanelConfig, PanelHandlerConfig, TimePanelConfig,
};
use crate::gui::robot::RobotBaseConfig;
use crate::gui::{CommonLayoutConfig, RoboCollectorGuiConfig, RoboCollectorLayoutConfig};
use crate::resources;

use level::{read_field_data, LevelError};
use settings::{load_settings, GameSettings, SettingsError};
use timers::TIMER_LAYOUT;

pub(crate) const WINDOW_NAME: &str = "RoboCollector";
pub(crate) const COMMS_DEPENDENCY: &str = "comms";
const GOLD_COIN_MARKER: char = 'g';
const SILVER_COIN_MARKER: char = 's';
const BRONZE_COIN_MARKER: char = 'b';

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Level(#[from] LevelError),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ApplicationConfig {
    pub(crate) engine_cfg: EngineConfig,
    pub(crate) game_cfg: RoboCollectorGuiConfig,
}

pub(crate) fn generate_robot_base_config(settings: &GameSettings) -> RobotBaseConfig {
    RobotBaseConfig {
        player_rsrc_id: resources::PLAYER_ROBOT,
        enemies_rsrc_id: resources::ENEMY_ROBOTS,
        damage_marker_rsrc_id: resources::DAMAGE_MARKER,
        move_anim_timers: TIMER_LAYOUT.robots_move,
        wall_collision_anim_timers: TIMER_LAYOUT.robots_wall_collision,
        robot_collision_anim_timers: TIMER_LAYOUT.robots_robot_collision,
        robot_damage_anim_timers: TIMER_LAYOUT.robots_damage,
        robot_field_markers: settings.robot_field_markers,
    }
}

pub(crate) fn generate_controller_config(settings: &GameSettings) -> RoboCollectorControllerConfig {
    RoboCollectorControllerConfig {
        move_button_rsrc_ids: [
            resources::UP_BUTTON,
            resources::LEFT_BUTTON,
            resources::RIGHT_BUTTON,
        ],
        move_button_info_text_font_id: resources::VINQUE_RG_30,
        hor_delimiter_rsrc_id: resources::HOR_DELIMITER,
        vert_delimiter_rsrc_id: resources::VERT_DELIMITER,
        help_button_rsrc_id: resources::HELP_BUTTON,
        settings_button_rsrc_id: resources::SETTINGS_BUTTON,
        local_controller_mode: settings.local_controller_mode,
    }
}

pub(crate) fn generate_coin_handler_config(settings: &GameSettings) -> CoinHandlerConfig {
    CoinHandlerConfig {
        anim_rsrc_ids: [
            resources::COIN_ANIM_GOLD,
            resources::COIN_ANIM_SILVER,
            resources::COIN_ANIM_BRONZE,
        ],
        field_markers: [GOLD_COIN_MARKER, SILVER_COIN_MARKER, BRONZE_COIN_MARKER],
        max_coins: COINS_CNT,
        target_win_coins: settings.target_win_coins,
        rotate_anim_timers: TIMER_LAYOUT.coin_rotate,
        collect_anim_timers: TIMER_LAYOUT.coin_collect,
        respawn_anim_timers: TIMER_LAYOUT.coin_respawn,
        field_empty_marker: EMPTY_TILE_MARKER,
    }
}

pub(crate) fn generate_panel_handler_config(settings: &GameSettings) -> PanelHandlerConfig {
    PanelHandlerConfig {
        health_panel_cfg: HealthPanelConfig {
            rsrc_id: resources::HEALTH_PANEL,
            indicator_rsrc_id: resources::HEALTH_INDICATOR,
            indicator_font_id: resources::VINQUE_RG_30,
            indicator_reduce_timer_id: TIMER_LAYOUT.health_panel_reduce_indicator,
        },
        coin_panel_cfg: CoinPanelConfig {
            target_number: settings.target_win_coins,
            rsrc_id: resources::COIN_PANEL,
            font_id: resources::VINQUE_RG_75,
            incr_timer_id: TIMER_LAYOUT.coin_panel_incr,
            decr_timer_id: TIMER_LAYOUT.coin_panel_decr,
        },
        time_panel_cfg: TimePanelConfig {
            rsrc_id: resources::TIME_PANEL,
            font_id: resources::VINQUE_RG_75,
            clock_timer_id: TIMER_LAYOUT.time_panel_clock,
            blink_timer_id: TIMER_LAYOUT.time_panel_blink,
            total_seconds: settings.total_game_seconds,
        },
    }
}

pub(crate) fn generate_field_config(
    settings: &GameSettings,
    project_install_prefix: &Path,
) -> Result<FieldConfig, LevelError> {
    let data = read_field_data(project_install_prefix, settings.level_id)?;
    let rows = data.len();
    let cols = data.first().map_or(0, Vec::len);
    Ok(FieldConfig {
        description: FieldDescription {
            data,
            rows,
            cols,
            tile_width: settings.tile_width_height,
            tile_height: settings.tile_width_height,
            empty_data_marker: EMPTY_TILE_MARKER,
            hard_obstacle_marker: HARD_OBSTACLE_MARKER,
        },
        tile_rsrc_id: resources::MAP_TILE,
        debug_font_rsrc_id: resources::VINQUE_RG_30,
    })
}

pub(crate) fn generate_engine_config(
    settings: &GameSettings,
    project_install_prefix: &Path,
) -> EngineConfig {
    let mut cfg = default_engine_config(project_install_prefix);
    cfg.window.name = WINDOW_NAME.to_string();
    cfg.window.icon_path = Some(
        project_install_prefix
            .join(RESOURCES_FOLDER_NAME)
            .join(format!("{}.png", resources::PLAYER_ROBOT_ICON_KEY)),
    );
    cfg.window.pos = Some(settings.window_pos);
    cfg.window.width = settings.window_width;
    cfg.window.height = settings.window_height;
    cfg.window.display_mode = settings.window_display_mode;
    cfg.window.border_mode = settings.window_border_mode;
    cfg.debug_console_rsrc_id = Some(resources::VINQUE_RG_30);
    cfg.resources = resources::RESOURCE_TABLE.to_vec();
    cfg
}

pub(crate) fn generate_game_config(
    settings: &GameSettings,
    project_install_prefix: &Path,
) -> Result<RoboCollectorGuiConfig, LevelError> {
    let common_layout_cfg = CommonLayoutConfig {
        field_cfg: generate_field_config(settings, project_install_prefix)?,
        robot_base_cfg: generate_robot_base_config(settings),
        map_rsrc_id: resources::MAP,
        player_field_marker: PLAYER_MARKER,
        enemy_field_marker: ENEMY_MARKER,
    };
    Ok(RoboCollectorGuiConfig {
        layout_cfg: RoboCollectorLayoutConfig {
            common_layout_cfg,
            panel_handler_cfg: generate_panel_handler_config(settings),
            coin_handler_cfg: generate_coin_handler_config(settings),
            controller_cfg: generate_controller_config(settings),
        },
    })
}

pub(crate) fn generate_config(
    settings: &GameSettings,
    project_install_prefix: &Path,
) -> Result<ApplicationConfig, LevelError> {
    let config = ApplicationConfig {
        engine_cfg: generate_engine_config(settings, project_install_prefix),
        game_cfg: generate_game_config(settings, project_install_prefix)?,
    };
    debug!(
        level_id = settings.level_id,
        resources = config.engine_cfg.resources.len(),
        "config_generated"
    );
    Ok(config)
}

/// Loads settings from the share directory and builds the whole config.
pub(crate) fn load_application_config(
    project_install_prefix: &Path,
) -> Result<ApplicationConfig, ConfigError> {
    let settings = load_settings(project_install_prefix)?;
    Ok(generate_config(&settings, project_install_prefix)?)
}

/// Registry holding the process-wide communication runtime.
pub(crate) fn generate_dependencies(args: Vec<String>) -> DependencyRegistry {
    comms_dependencies(comms::global(), args)
}

pub(crate) fn comms_dependencies(runtime: Arc<CommsRuntime>, args: Vec<String>) -> DependencyRegistry {
    let acquire_runtime = Arc::clone(&runtime);
    let release_runtime = runtime;
    let mut registry = DependencyRegistry::new();
    registry.register(DependencyDescriptor::new(
        COMMS_DEPENDENCY,
        move || acquire_runtime.init(&args).map_err(Into::into),
        move || release_runtime_context(COMMS_DEPENDENCY, release_runtime.as_ref()),
    ));
    registry
}
