//! Handle table of every image, sprite sheet and font the game draws.
//!
//! Keys are paths below `<share>/resources` without the `.png` suffix.

use engine::{ResourceDesc, ResourceKind, RsrcId};

pub(crate) const MAP: RsrcId = RsrcId(0);
pub(crate) const MAP_TILE: RsrcId = RsrcId(1);
pub(crate) const PLAYER_ROBOT: RsrcId = RsrcId(2);
pub(crate) const ENEMY_ROBOTS: RsrcId = RsrcId(3);
pub(crate) const DAMAGE_MARKER: RsrcId = RsrcId(4);
pub(crate) const COIN_ANIM_GOLD: RsrcId = RsrcId(5);
pub(crate) const COIN_ANIM_SILVER: RsrcId = RsrcId(6);
pub(crate) const COIN_ANIM_BRONZE: RsrcId = RsrcId(7);
pub(crate) const HEALTH_PANEL: RsrcId = RsrcId(8);
pub(crate) const HEALTH_INDICATOR: RsrcId = RsrcId(9);
pub(crate) const COIN_PANEL: RsrcId = RsrcId(10);
pub(crate) const TIME_PANEL: RsrcId = RsrcId(11);
pub(crate) const UP_BUTTON: RsrcId = RsrcId(12);
pub(crate) const LEFT_BUTTON: RsrcId = RsrcId(13);
pub(crate) const RIGHT_BUTTON: RsrcId = RsrcId(14);
pub(crate) const HOR_DELIMITER: RsrcId = RsrcId(15);
pub(crate) const VERT_DELIMITER: RsrcId = RsrcId(16);
pub(crate) const HELP_BUTTON: RsrcId = RsrcId(17);
pub(crate) const SETTINGS_BUTTON: RsrcId = RsrcId(18);
pub(crate) const VINQUE_RG_30: RsrcId = RsrcId(19);
pub(crate) const VINQUE_RG_75: RsrcId = RsrcId(20);

pub(crate) const ENEMY_ROBOT_FRAMES: u32 = 3;
pub(crate) const COIN_ANIM_FRAMES: u32 = 6;

pub(crate) const PLAYER_ROBOT_ICON_KEY: &str = "p/entities/player_robot";

const fn image(id: RsrcId, key: &'static str) -> ResourceDesc {
    ResourceDesc {
        id,
        key,
        kind: ResourceKind::Image,
    }
}

const fn sheet(id: RsrcId, key: &'static str, frames: u32) -> ResourceDesc {
    ResourceDesc {
        id,
        key,
        kind: ResourceKind::SpriteSheet { frames },
    }
}

const fn font(id: RsrcId, key: &'static str, size: u32) -> ResourceDesc {
    ResourceDesc {
        id,
        key,
        kind: ResourceKind::Font { size },
    }
}

pub(crate) const RESOURCE_TABLE: &[ResourceDesc] = &[
    image(MAP, "p/map"),
    image(MAP_TILE, "p/map_tile"),
    image(PLAYER_ROBOT, PLAYER_ROBOT_ICON_KEY),
    sheet(ENEMY_ROBOTS, "p/entities/enemy_robots", ENEMY_ROBOT_FRAMES),
    image(DAMAGE_MARKER, "p/entities/damage_marker"),
    sheet(COIN_ANIM_GOLD, "p/coins/coin_gold", COIN_ANIM_FRAMES),
    sheet(COIN_ANIM_SILVER, "p/coins/coin_silver", COIN_ANIM_FRAMES),
    sheet(COIN_ANIM_BRONZE, "p/coins/coin_bronze", COIN_ANIM_FRAMES),
    image(HEALTH_PANEL, "p/panels/health_panel"),
    image(HEALTH_INDICATOR, "p/panels/health_indicator"),
    image(COIN_PANEL, "p/panels/coin_panel"),
    image(TIME_PANEL, "p/panels/time_panel"),
    image(UP_BUTTON, "p/buttons/up_button"),
    image(LEFT_BUTTON, "p/buttons/left_button"),
    image(RIGHT_BUTTON, "p/buttons/right_button"),
    image(HOR_DELIMITER, "p/buttons/hor_delimiter"),
    image(VERT_DELIMITER, "p/buttons/vert_delimiter"),
    image(HELP_BUTTON, "p/buttons/help_button"),
    image(SETTINGS_BUTTON, "p/buttons/settings_button"),
    font(VINQUE_RG_30, "f/vinque_rg", 30),
    font(VINQUE_RG_75, "f/vinque_rg", 75),
];
