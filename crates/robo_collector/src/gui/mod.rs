pub(crate) mod coin_handler;
pub(crate) mod controller;
pub(crate) mod field;
pub(crate) mod panels;
pub(crate) mod robot;

use engine::{Frame, Game, InputEvent, Point, RsrcId};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::defines::{PLAYER_ROBOT_IDX, ROBOTS_CNT};
use crate::resources::ENEMY_ROBOT_FRAMES;

use coin_handler::{CoinHandler, CoinHandlerConfig, CoinHandlerError};
use controller::{ControllerError, RoboCollectorController, RoboCollectorControllerConfig};
use field::{Field, FieldConfig, FieldError, FieldPos};
use panels::{PanelError, PanelHandler, PanelHandlerConfig};
use robot::{Direction, MoveType, Robot, RobotAct, RobotBaseConfig, RobotError, RobotLook};

const MAP_POS: Point = Point::new(0, 0);
const CORNER_COUNT: usize = 4;
/// Health percent a collision costs the player.
const COLLISION_DAMAGE: u32 = 10;

const _: () = assert!(ROBOTS_CNT <= CORNER_COUNT, "every robot needs a corner");
const _: () = assert!(PLAYER_ROBOT_IDX < ROBOTS_CNT);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommonLayoutConfig {
    pub(crate) field_cfg: FieldConfig,
    pub(crate) robot_base_cfg: RobotBaseConfig,
    pub(crate) map_rsrc_id: RsrcId,
    pub(crate) player_field_marker: char,
    pub(crate) enemy_field_marker: char,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RoboCollectorLayoutConfig {
    pub(crate) common_layout_cfg: CommonLayoutConfig,
    pub(crate) panel_handler_cfg: PanelHandlerConfig,
    pub(crate) coin_handler_cfg: CoinHandlerConfig,
    pub(crate) controller_cfg: RoboCollectorControllerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RoboCollectorGuiConfig {
    pub(crate) layout_cfg: RoboCollectorLayoutConfig,
}

#[derive(Debug, Error)]
pub(crate) enum GuiError {
    #[error("game is already running")]
    AlreadyInitialized,
    #[error("field init failed: {0}")]
    Field(#[from] FieldError),
    #[error("robot init failed: {0}")]
    Robot(#[from] RobotError),
    #[error("coin handler init failed: {0}")]
    CoinHandler(#[from] CoinHandlerError),
    #[error("panel handler init failed: {0}")]
    Panels(#[from] PanelError),
    #[error("controller init failed: {0}")]
    Controller(#[from] ControllerError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum GuiState {
    #[default]
    Uninitialized,
    Running,
    Deinitialized,
}

/// Everything `init` creates. Stored only once every subsystem came up.
#[derive(Debug, Default)]
struct Session {
    map_rsrc_id: RsrcId,
    field: Field,
    robots: [Robot; ROBOTS_CNT],
    coin_handler: CoinHandler,
    panels: PanelHandler,
    controller: RoboCollectorController,
}

impl Session {
    fn init(&mut self, cfg: RoboCollectorLayoutConfig) -> Result<(), GuiError> {
        let CommonLayoutConfig {
            field_cfg,
            robot_base_cfg,
            map_rsrc_id,
            player_field_marker,
            enemy_field_marker,
        } = cfg.common_layout_cfg;
        self.map_rsrc_id = map_rsrc_id;
        self.field.init(field_cfg)?;

        let starts = corner_starts(self.field.rows(), self.field.cols());
        let mut placed = Vec::with_capacity(ROBOTS_CNT);
        for (robot_id, robot) in self.robots.iter_mut().enumerate() {
            let (start_pos, start_dir) = starts[robot_id];
            let look = robot_look(
                &robot_base_cfg,
                player_field_marker,
                enemy_field_marker,
                robot_id,
            );
            let robot_cfg = robot_base_cfg.robot_config(robot_id, look, start_pos, start_dir)?;
            robot.init(robot_cfg, &mut self.field, &placed)?;
            placed.push(start_pos);
        }

        self.coin_handler
            .init(cfg.coin_handler_cfg, &mut self.field, &placed)?;
        self.panels.init(cfg.panel_handler_cfg)?;
        self.controller.init(cfg.controller_cfg)?;
        Ok(())
    }

    fn teardown(&mut self) {
        self.controller.deinit();
        self.panels.deinit();
        self.coin_handler.deinit();
        for robot in self.robots.iter_mut().rev() {
            robot.deinit();
        }
        self.field.deinit();
    }

    fn draw(&self, frame: &mut Frame) {
        frame.draw_image(self.map_rsrc_id, MAP_POS);
        self.field.draw(frame);
        for robot in &self.robots {
            robot.draw(&self.field, frame);
        }
        self.coin_handler.draw(&self.field, frame);
        self.panels.draw(frame);
        self.controller.draw(frame);
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if let Some(move_type) = self.controller.handle_event(event) {
            self.apply_player_move(move_type);
        }
    }

    fn robot_positions(&self) -> Vec<FieldPos> {
        self.robots.iter().map(Robot::pos).collect()
    }

    fn apply_player_move(&mut self, move_type: MoveType) {
        let mut others = self.robot_positions();
        others.remove(PLAYER_ROBOT_IDX);
        let Some(act) =
            self.robots[PLAYER_ROBOT_IDX].act(move_type, &mut self.field, &others)
        else {
            return;
        };
        debug!(
            timer_id = %act.timer_id(),
            dir = ?self.robots[PLAYER_ROBOT_IDX].dir(),
            "player_robot_acted"
        );

        match act {
            RobotAct::Moved { to, .. } => {
                let blocked = self.robot_positions();
                let Some(collected) = self.coin_handler.collect_at(to, &mut self.field, &blocked)
                else {
                    return;
                };
                debug!(
                    value = collected.value,
                    collect_timer_id = %collected.collect_timer_id,
                    respawn_timer_id = ?collected.respawn_timer_id,
                    "player_collected_coin"
                );
                self.panels.set_collected_coins(collected.collected);
                if self.coin_handler.is_target_reached() {
                    info!(collected = collected.collected, "coin_target_reached");
                    self.controller.lock();
                }
            }
            RobotAct::WallCollision {
                damage_timer_id, ..
            }
            | RobotAct::RobotCollision {
                damage_timer_id, ..
            } => {
                self.panels.reduce_health(COLLISION_DAMAGE);
                info!(
                    health = self.panels.health(),
                    damage_timer_id = %damage_timer_id,
                    "player_robot_damaged"
                );
            }
            RobotAct::Rotated { .. } => {}
        }
    }
}

/// Player on the bottom-left corner, enemies clockwise from the top-left.
fn corner_starts(rows: usize, cols: usize) -> [(FieldPos, Direction); CORNER_COUNT] {
    let last_row = rows.saturating_sub(1) as i32;
    let last_col = cols.saturating_sub(1) as i32;
    [
        (FieldPos::new(last_row, 0), Direction::Up),
        (FieldPos::new(0, 0), Direction::Down),
        (FieldPos::new(0, last_col), Direction::Down),
        (FieldPos::new(last_row, last_col), Direction::Up),
    ]
}

fn robot_look(
    base: &RobotBaseConfig,
    player_field_marker: char,
    enemy_field_marker: char,
    robot_id: usize,
) -> RobotLook {
    if robot_id == PLAYER_ROBOT_IDX {
        RobotLook {
            rsrc_id: base.player_rsrc_id,
            frame: 0,
            field_marker: player_field_marker,
        }
    } else {
        let enemy_idx = if robot_id > PLAYER_ROBOT_IDX {
            robot_id - 1
        } else {
            robot_id
        };
        RobotLook {
            rsrc_id: base.enemies_rsrc_id,
            frame: enemy_idx as u32 % ENEMY_ROBOT_FRAMES,
            field_marker: enemy_field_marker,
        }
    }
}

/// Owns the game session between `Game::init` and `Game::deinit`.
#[derive(Debug, Default)]
pub(crate) struct RoboCollectorGui {
    state: GuiState,
    session: Option<Session>,
    sessions_released: u32,
}

impl RoboCollectorGui {
    pub(crate) fn state(&self) -> GuiState {
        self.state
    }

    /// Number of sessions torn down so far.
    pub(crate) fn sessions_released(&self) -> u32 {
        self.sessions_released
    }
}

impl Game for RoboCollectorGui {
    type Config = RoboCollectorGuiConfig;
    type Error = GuiError;

    fn init(&mut self, cfg: Self::Config) -> Result<(), Self::Error> {
        if self.state == GuiState::Running {
            return Err(GuiError::AlreadyInitialized);
        }

        let mut session = Session::default();
        if let Err(error) = session.init(cfg.layout_cfg) {
            session.teardown();
            self.state = GuiState::Uninitialized;
            warn!(error = %error, "gui_init_failed");
            return Err(error);
        }

        info!(
            robots = ROBOTS_CNT,
            coins = session.coin_handler.coin_count(),
            rows = session.field.rows(),
            cols = session.field.cols(),
            "gui_initialized"
        );
        self.session = Some(session);
        self.state = GuiState::Running;
        Ok(())
    }

    fn deinit(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.teardown();
        self.sessions_released += 1;
        self.state = GuiState::Deinitialized;
        info!(sessions_released = self.sessions_released, "gui_deinitialized");
    }

    fn draw(&self, frame: &mut Frame) {
        if let Some(session) = &self.session {
            session.draw(frame);
        }
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if let Some(session) = &mut self.session {
            session.handle_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::{DrawCommand, InputAction, KeyState};

    use super::*;
    use crate::config::timers::TIMER_LAYOUT;
    use crate::defines::{COINS_CNT, ENEMY_MARKER, PLAYER_MARKER};
    use crate::resources::{
        COIN_ANIM_BRONZE, COIN_ANIM_GOLD, COIN_ANIM_SILVER, DAMAGE_MARKER, ENEMY_ROBOTS, MAP,
        PLAYER_ROBOT,
    };
    use controller::tests::controller_config;
    use controller::LocalControllerMode;
    use field::tests::field_config;
    use panels::tests::panel_config;
    use robot::RobotFieldMarkers;

    fn gui_config(rows: &[&str]) -> RoboCollectorGuiConfig {
        RoboCollectorGuiConfig {
            layout_cfg: RoboCollectorLayoutConfig {
                common_layout_cfg: CommonLayoutConfig {
                    field_cfg: field_config(rows),
                    robot_base_cfg: RobotBaseConfig {
                        player_rsrc_id: PLAYER_ROBOT,
                        enemies_rsrc_id: ENEMY_ROBOTS,
                        damage_marker_rsrc_id: DAMAGE_MARKER,
                        move_anim_timers: TIMER_LAYOUT.robots_move,
                        wall_collision_anim_timers: TIMER_LAYOUT.robots_wall_collision,
                        robot_collision_anim_timers: TIMER_LAYOUT.robots_robot_collision,
                        robot_damage_anim_timers: TIMER_LAYOUT.robots_damage,
                        robot_field_markers: RobotFieldMarkers::Enabled,
                    },
                    map_rsrc_id: MAP,
                    player_field_marker: PLAYER_MARKER,
                    enemy_field_marker: ENEMY_MARKER,
                },
                panel_handler_cfg: panel_config(),
                coin_handler_cfg: CoinHandlerConfig {
                    anim_rsrc_ids: [COIN_ANIM_GOLD, COIN_ANIM_SILVER, COIN_ANIM_BRONZE],
                    field_markers: ['g', 's', 'b'],
                    max_coins: COINS_CNT,
                    target_win_coins: 3,
                    rotate_anim_timers: TIMER_LAYOUT.coin_rotate,
                    collect_anim_timers: TIMER_LAYOUT.coin_collect,
                    respawn_anim_timers: TIMER_LAYOUT.coin_respawn,
                    field_empty_marker: '.',
                },
                controller_cfg: controller_config(LocalControllerMode::Enabled),
            },
        }
    }

    const FIELD_5X7: [&str; 5] = [".......", "..#....", ".......", "....#..", "......."];

    fn key(action: InputAction) -> InputEvent {
        InputEvent::Key {
            action,
            state: KeyState::Pressed,
        }
    }

    #[test]
    fn init_runs_and_deinit_is_idempotent() {
        let mut gui = RoboCollectorGui::default();
        assert_eq!(gui.state(), GuiState::Uninitialized);

        gui.init(gui_config(&FIELD_5X7)).expect("init");
        assert_eq!(gui.state(), GuiState::Running);

        gui.deinit();
        gui.deinit();
        assert_eq!(gui.state(), GuiState::Deinitialized);
        assert_eq!(gui.sessions_released(), 1);
    }

    #[test]
    fn second_init_while_running_is_rejected() {
        let mut gui = RoboCollectorGui::default();
        gui.init(gui_config(&FIELD_5X7)).expect("init");
        assert!(matches!(
            gui.init(gui_config(&FIELD_5X7)),
            Err(GuiError::AlreadyInitialized)
        ));
        assert_eq!(gui.state(), GuiState::Running);
    }

    #[test]
    fn failed_init_stays_uninitialized_and_draws_nothing() {
        let mut gui = RoboCollectorGui::default();
        let result = gui.init(gui_config(&[]));
        assert!(matches!(
            result,
            Err(GuiError::Field(FieldError::EmptyGrid { .. }))
        ));
        assert_eq!(gui.state(), GuiState::Uninitialized);

        let mut frame = Frame::new();
        gui.draw(&mut frame);
        assert!(frame.is_empty());

        gui.deinit();
        assert_eq!(gui.sessions_released(), 0);
    }

    #[test]
    fn failed_reinit_after_deinit_is_uninitialized() {
        let mut gui = RoboCollectorGui::default();
        gui.init(gui_config(&FIELD_5X7)).expect("init");
        gui.deinit();
        assert_eq!(gui.state(), GuiState::Deinitialized);

        assert!(gui.init(gui_config(&[])).is_err());
        assert_eq!(gui.state(), GuiState::Uninitialized);
        assert!(gui.session.is_none());

        gui.init(gui_config(&FIELD_5X7)).expect("init after failure");
        assert_eq!(gui.state(), GuiState::Running);
    }

    #[test]
    fn unmarked_robots_keep_their_tiles_free_of_coins() {
        let mut cfg = gui_config(&["....", "....", "....", "...."]);
        cfg.layout_cfg.common_layout_cfg.robot_base_cfg.robot_field_markers =
            RobotFieldMarkers::Disabled;
        let mut gui = RoboCollectorGui::default();
        gui.init(cfg).expect("init");

        let session = gui.session.as_ref().expect("session");
        assert_eq!(session.coin_handler.coin_count(), COINS_CNT);
        for robot in &session.robots {
            assert_eq!(
                session.field.marker_at(robot.pos()),
                Some('.'),
                "coin placed under robot at {:?}",
                robot.pos()
            );
        }
    }

    #[test]
    fn blocked_corner_fails_robot_init() {
        let mut rows = FIELD_5X7;
        rows[0] = "#......";
        let mut gui = RoboCollectorGui::default();
        assert!(matches!(
            gui.init(gui_config(&rows)),
            Err(GuiError::Robot(RobotError::BlockedStart { robot_id: 1, .. }))
        ));
        assert_eq!(gui.state(), GuiState::Uninitialized);
    }

    #[test]
    fn too_small_field_fails_coin_placement() {
        let mut gui = RoboCollectorGui::default();
        assert!(matches!(
            gui.init(gui_config(&["...", "..."])),
            Err(GuiError::CoinHandler(CoinHandlerError::NotEnoughFreeTiles { .. }))
        ));
    }

    #[test]
    fn draw_order_is_map_field_robots_coins_panels_controller() {
        let mut gui = RoboCollectorGui::default();
        gui.init(gui_config(&FIELD_5X7)).expect("init");

        let mut frame = Frame::new();
        gui.draw(&mut frame);

        let layer_of = |rsrc_id: RsrcId| match rsrc_id.0 {
            0 => 0,
            1 => 1,
            2..=4 => 2,
            5..=7 => 3,
            8..=11 => 4,
            12..=18 => 5,
            other => panic!("unexpected image {other}"),
        };
        let layers: Vec<u32> = frame
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Image { rsrc_id, .. } => Some(layer_of(*rsrc_id)),
                DrawCommand::Text { .. } => None,
            })
            .collect();

        assert_eq!(layers.first(), Some(&0));
        assert!(layers.windows(2).all(|pair| pair[0] <= pair[1]));
        for layer in 0..=5 {
            assert!(layers.contains(&layer), "layer {layer} missing");
        }
        assert_eq!(layers.iter().filter(|layer| **layer == 2).count(), ROBOTS_CNT);
        assert_eq!(layers.iter().filter(|layer| **layer == 3).count(), COINS_CNT);
    }

    #[test]
    fn enemies_use_distinct_sheet_frames() {
        let common = gui_config(&FIELD_5X7).layout_cfg.common_layout_cfg;
        let look = |robot_id| {
            robot_look(
                &common.robot_base_cfg,
                PLAYER_MARKER,
                ENEMY_MARKER,
                robot_id,
            )
        };
        let frames: Vec<u32> = (1..ROBOTS_CNT).map(|robot_id| look(robot_id).frame).collect();
        assert_eq!(frames, vec![0, 1, 2]);
        assert_eq!(look(PLAYER_ROBOT_IDX).rsrc_id, PLAYER_ROBOT);
        assert_eq!(look(1).field_marker, ENEMY_MARKER);
    }

    #[test]
    fn player_moves_through_controller_and_collects_coins() {
        let mut gui = RoboCollectorGui::default();
        // Robots hold the corners. Ten coins fill the first ten of the
        // twelve free tiles, so (2, 0) holds a gold coin.
        gui.init(gui_config(&["....", "....", "....", "...."]))
            .expect("init");

        let session = gui.session.as_ref().expect("session");
        assert_eq!(session.robots[PLAYER_ROBOT_IDX].pos(), FieldPos::new(3, 0));

        gui.handle_event(&key(InputAction::MoveUp));
        let session = gui.session.as_ref().expect("session");
        assert_eq!(session.robots[PLAYER_ROBOT_IDX].pos(), FieldPos::new(2, 0));
        assert!(session.coin_handler.collected() > 0);
        assert_eq!(
            session.field.marker_at(FieldPos::new(2, 0)),
            Some(PLAYER_MARKER)
        );
    }

    #[test]
    fn target_reached_locks_controller() {
        let mut gui = RoboCollectorGui::default();
        gui.init(gui_config(&["....", "....", "....", "...."]))
            .expect("init");
        // Gold coin worth 3 reaches the target of 3.
        gui.handle_event(&key(InputAction::MoveUp));
        let session = gui.session.as_ref().expect("session");
        assert!(session.coin_handler.is_target_reached());
        assert!(session.controller.is_locked());

        gui.handle_event(&key(InputAction::MoveUp));
        let session = gui.session.as_ref().expect("session");
        assert_eq!(session.robots[PLAYER_ROBOT_IDX].pos(), FieldPos::new(2, 0));
    }

    #[test]
    fn collision_costs_health() {
        let mut gui = RoboCollectorGui::default();
        gui.init(gui_config(&FIELD_5X7)).expect("init");
        gui.handle_event(&key(InputAction::MoveLeft));
        gui.handle_event(&key(InputAction::MoveUp));

        let session = gui.session.as_ref().expect("session");
        assert_eq!(session.robots[PLAYER_ROBOT_IDX].pos(), FieldPos::new(4, 0));
        assert_eq!(session.panels.health(), 90);
    }
}
