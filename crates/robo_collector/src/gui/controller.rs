use engine::{Frame, InputAction, InputEvent, KeyState, Point, RsrcId};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::robot::MoveType;

const MOVE_BUTTON_WIDTH: i32 = 150;
const MOVE_BUTTON_HEIGHT: i32 = 120;
const MOVE_BUTTON_POSITIONS: [Point; 3] = [
    Point::new(1470, 740),
    Point::new(1300, 880),
    Point::new(1640, 880),
];
const MOVE_BUTTON_LABELS: [&str; 3] = ["Forward", "Left", "Right"];
const MOVE_BUTTON_LABEL_OFFSET: Point = Point::new(30, 128);
const HOR_DELIMITER_POS: Point = Point::new(1245, 700);
const VERT_DELIMITER_POS: Point = Point::new(1230, 47);
const HELP_BUTTON_POS: Point = Point::new(1300, 620);
const SETTINGS_BUTTON_POS: Point = Point::new(1640, 620);

/// Whether keyboard input drives the player robot next to the buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LocalControllerMode {
    Enabled,
    #[default]
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RoboCollectorControllerConfig {
    /// Up, left and right button images.
    pub(crate) move_button_rsrc_ids: [RsrcId; 3],
    pub(crate) move_button_info_text_font_id: RsrcId,
    pub(crate) hor_delimiter_rsrc_id: RsrcId,
    pub(crate) vert_delimiter_rsrc_id: RsrcId,
    pub(crate) help_button_rsrc_id: RsrcId,
    pub(crate) settings_button_rsrc_id: RsrcId,
    pub(crate) local_controller_mode: LocalControllerMode,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ControllerError {
    #[error("move buttons share image {rsrc_id}")]
    DuplicateMoveButton { rsrc_id: RsrcId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MoveButton {
    rsrc_id: RsrcId,
    pos: Point,
    move_type: MoveType,
}

impl MoveButton {
    fn contains(&self, point: Point) -> bool {
        point.x >= self.pos.x
            && point.y >= self.pos.y
            && point.x < self.pos.x + MOVE_BUTTON_WIDTH
            && point.y < self.pos.y + MOVE_BUTTON_HEIGHT
    }
}

/// Turns mouse presses on the move buttons, and key presses when the local
/// controller is enabled, into player robot moves.
#[derive(Debug, Default)]
pub(crate) struct RoboCollectorController {
    cfg: Option<RoboCollectorControllerConfig>,
    buttons: Vec<MoveButton>,
    locked: bool,
}

impl RoboCollectorController {
    pub(crate) fn init(&mut self, cfg: RoboCollectorControllerConfig) -> Result<(), ControllerError> {
        let ids = cfg.move_button_rsrc_ids;
        for (idx, rsrc_id) in ids.iter().enumerate() {
            if ids[..idx].contains(rsrc_id) {
                return Err(ControllerError::DuplicateMoveButton { rsrc_id: *rsrc_id });
            }
        }

        let move_types = [MoveType::Forward, MoveType::RotateLeft, MoveType::RotateRight];
        self.buttons = ids
            .iter()
            .zip(MOVE_BUTTON_POSITIONS)
            .zip(move_types)
            .map(|((rsrc_id, pos), move_type)| MoveButton {
                rsrc_id: *rsrc_id,
                pos,
                move_type,
            })
            .collect();
        info!(
            local_controller_mode = ?cfg.local_controller_mode,
            "controller_initialized"
        );
        self.locked = false;
        self.cfg = Some(cfg);
        Ok(())
    }

    pub(crate) fn deinit(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let Some(cfg) = &self.cfg else {
            return;
        };
        frame.draw_image(cfg.vert_delimiter_rsrc_id, VERT_DELIMITER_POS);
        frame.draw_image(cfg.hor_delimiter_rsrc_id, HOR_DELIMITER_POS);
        frame.draw_image(cfg.help_button_rsrc_id, HELP_BUTTON_POS);
        frame.draw_image(cfg.settings_button_rsrc_id, SETTINGS_BUTTON_POS);
        for (button, label) in self.buttons.iter().zip(MOVE_BUTTON_LABELS) {
            frame.draw_image(button.rsrc_id, button.pos);
            frame.draw_text(
                cfg.move_button_info_text_font_id,
                label,
                Point::new(
                    button.pos.x + MOVE_BUTTON_LABEL_OFFSET.x,
                    button.pos.y + MOVE_BUTTON_LABEL_OFFSET.y,
                ),
            );
        }
    }

    /// Stops translating input, e.g. once the coin target is reached.
    pub(crate) fn lock(&mut self) {
        if !self.locked {
            info!("controller_locked");
        }
        self.locked = true;
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.locked
    }

    /// Maps `event` to the move the player robot should make.
    pub(crate) fn handle_event(&self, event: &InputEvent) -> Option<MoveType> {
        let cfg = self.cfg.as_ref()?;
        if self.is_locked() {
            return None;
        }
        let move_type = match *event {
            InputEvent::MouseButton {
                pos,
                state: KeyState::Pressed,
            } => self
                .buttons
                .iter()
                .find(|button| button.contains(pos))
                .map(|button| button.move_type),
            InputEvent::Key {
                action,
                state: KeyState::Pressed,
            } if cfg.local_controller_mode == LocalControllerMode::Enabled => {
                move_for_action(action)
            }
            _ => None,
        };
        if let Some(move_type) = move_type {
            debug!(move_type = ?move_type, "player_move_requested");
        }
        move_type
    }
}

fn move_for_action(action: InputAction) -> Option<MoveType> {
    match action {
        InputAction::MoveUp => Some(MoveType::Forward),
        InputAction::MoveLeft => Some(MoveType::RotateLeft),
        InputAction::MoveRight => Some(MoveType::RotateRight),
        InputAction::MoveDown | InputAction::ToggleOverlay | InputAction::Quit => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn controller_config(mode: LocalControllerMode) -> RoboCollectorControllerConfig {
        RoboCollectorControllerConfig {
            move_button_rsrc_ids: [RsrcId(12), RsrcId(13), RsrcId(14)],
            move_button_info_text_font_id: RsrcId(19),
            hor_delimiter_rsrc_id: RsrcId(15),
            vert_delimiter_rsrc_id: RsrcId(16),
            help_button_rsrc_id: RsrcId(17),
            settings_button_rsrc_id: RsrcId(18),
            local_controller_mode: mode,
        }
    }

    fn press_at(x: i32, y: i32) -> InputEvent {
        InputEvent::MouseButton {
            pos: Point::new(x, y),
            state: KeyState::Pressed,
        }
    }

    fn key(action: InputAction) -> InputEvent {
        InputEvent::Key {
            action,
            state: KeyState::Pressed,
        }
    }

    #[test]
    fn button_presses_map_to_moves() {
        let mut controller = RoboCollectorController::default();
        controller
            .init(controller_config(LocalControllerMode::Disabled))
            .expect("controller");

        assert_eq!(controller.handle_event(&press_at(1480, 750)), Some(MoveType::Forward));
        assert_eq!(
            controller.handle_event(&press_at(1300, 880)),
            Some(MoveType::RotateLeft)
        );
        assert_eq!(
            controller.handle_event(&press_at(1789, 999)),
            Some(MoveType::RotateRight)
        );
        assert_eq!(controller.handle_event(&press_at(10, 10)), None);
    }

    #[test]
    fn keys_only_drive_moves_in_local_mode() {
        let mut remote = RoboCollectorController::default();
        remote
            .init(controller_config(LocalControllerMode::Disabled))
            .expect("controller");
        assert_eq!(remote.handle_event(&key(InputAction::MoveUp)), None);

        let mut local = RoboCollectorController::default();
        local
            .init(controller_config(LocalControllerMode::Enabled))
            .expect("controller");
        assert_eq!(
            local.handle_event(&key(InputAction::MoveUp)),
            Some(MoveType::Forward)
        );
        assert_eq!(
            local.handle_event(&key(InputAction::MoveLeft)),
            Some(MoveType::RotateLeft)
        );
        assert_eq!(local.handle_event(&key(InputAction::MoveDown)), None);
    }

    #[test]
    fn locked_controller_ignores_input() {
        let mut controller = RoboCollectorController::default();
        controller
            .init(controller_config(LocalControllerMode::Enabled))
            .expect("controller");
        controller.lock();
        assert!(controller.is_locked());
        assert_eq!(controller.handle_event(&press_at(1480, 750)), None);
        assert_eq!(controller.handle_event(&key(InputAction::MoveUp)), None);
    }

    #[test]
    fn duplicate_button_images_are_rejected() {
        let mut cfg = controller_config(LocalControllerMode::Disabled);
        cfg.move_button_rsrc_ids[2] = cfg.move_button_rsrc_ids[0];
        assert_eq!(
            RoboCollectorController::default().init(cfg),
            Err(ControllerError::DuplicateMoveButton {
                rsrc_id: RsrcId(12)
            })
        );
    }

    #[test]
    fn draw_emits_chrome_and_labelled_buttons() {
        let mut controller = RoboCollectorController::default();
        controller
            .init(controller_config(LocalControllerMode::Disabled))
            .expect("controller");
        let mut frame = Frame::new();
        controller.draw(&mut frame);
        assert_eq!(frame.len(), 10);
    }
}
