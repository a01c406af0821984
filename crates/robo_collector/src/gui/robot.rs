use engine::{Frame, RsrcId, TimerId, TimerRange};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::field::{Field, FieldPos};

/// Whether robots stamp their marker onto the field grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RobotFieldMarkers {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Direction {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    fn turned_left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }

    fn turned_right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    fn step(self, pos: FieldPos) -> FieldPos {
        match self {
            Self::Up => FieldPos::new(pos.row - 1, pos.col),
            Self::Down => FieldPos::new(pos.row + 1, pos.col),
            Self::Left => FieldPos::new(pos.row, pos.col - 1),
            Self::Right => FieldPos::new(pos.row, pos.col + 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveType {
    Forward,
    RotateLeft,
    RotateRight,
}

/// Shared by every robot. Each robot takes slot `robot_id` of every range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RobotBaseConfig {
    pub(crate) player_rsrc_id: RsrcId,
    pub(crate) enemies_rsrc_id: RsrcId,
    pub(crate) damage_marker_rsrc_id: RsrcId,
    pub(crate) move_anim_timers: TimerRange,
    pub(crate) wall_collision_anim_timers: TimerRange,
    pub(crate) robot_collision_anim_timers: TimerRange,
    pub(crate) robot_damage_anim_timers: TimerRange,
    pub(crate) robot_field_markers: RobotFieldMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RobotAnimTimers {
    pub(crate) move_id: TimerId,
    pub(crate) wall_collision_id: TimerId,
    pub(crate) robot_collision_id: TimerId,
    pub(crate) damage_id: TimerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RobotConfig {
    pub(crate) robot_id: usize,
    pub(crate) rsrc_id: RsrcId,
    pub(crate) frame: u32,
    pub(crate) damage_marker_rsrc_id: RsrcId,
    pub(crate) field_marker: char,
    pub(crate) field_markers: RobotFieldMarkers,
    pub(crate) start_pos: FieldPos,
    pub(crate) start_dir: Direction,
    pub(crate) timers: RobotAnimTimers,
}

/// Sprite selection for one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RobotLook {
    pub(crate) rsrc_id: RsrcId,
    pub(crate) frame: u32,
    pub(crate) field_marker: char,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum RobotError {
    #[error("robot {robot_id} has no timer slot, ranges hold {count} robots")]
    NoTimerSlot { robot_id: usize, count: u32 },
    #[error("robot {robot_id} start ({}, {}) is outside the field", .pos.row, .pos.col)]
    OutsideField { robot_id: usize, pos: FieldPos },
    #[error("robot {robot_id} start ({}, {}) is blocked by '{marker}'", .pos.row, .pos.col)]
    BlockedStart {
        robot_id: usize,
        pos: FieldPos,
        marker: char,
    },
}

impl RobotBaseConfig {
    pub(crate) fn robot_config(
        &self,
        robot_id: usize,
        look: RobotLook,
        start_pos: FieldPos,
        start_dir: Direction,
    ) -> Result<RobotConfig, RobotError> {
        let slot = |range: TimerRange| {
            u32::try_from(robot_id)
                .ok()
                .and_then(|index| range.id_at(index))
                .ok_or(RobotError::NoTimerSlot {
                    robot_id,
                    count: range.count(),
                })
        };
        let timers = RobotAnimTimers {
            move_id: slot(self.move_anim_timers)?,
            wall_collision_id: slot(self.wall_collision_anim_timers)?,
            robot_collision_id: slot(self.robot_collision_anim_timers)?,
            damage_id: slot(self.robot_damage_anim_timers)?,
        };
        Ok(RobotConfig {
            robot_id,
            rsrc_id: look.rsrc_id,
            frame: look.frame,
            damage_marker_rsrc_id: self.damage_marker_rsrc_id,
            field_marker: look.field_marker,
            field_markers: self.robot_field_markers,
            start_pos,
            start_dir,
            timers,
        })
    }
}

/// Result of one [`Robot::act`] call with the timer that animates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RobotAct {
    Rotated {
        timer_id: TimerId,
    },
    Moved {
        to: FieldPos,
        timer_id: TimerId,
    },
    WallCollision {
        timer_id: TimerId,
        damage_timer_id: TimerId,
    },
    RobotCollision {
        timer_id: TimerId,
        damage_timer_id: TimerId,
    },
}

impl RobotAct {
    pub(crate) fn timer_id(&self) -> TimerId {
        match *self {
            Self::Rotated { timer_id }
            | Self::Moved { timer_id, .. }
            | Self::WallCollision { timer_id, .. }
            | Self::RobotCollision { timer_id, .. } => timer_id,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Robot {
    cfg: Option<RobotConfig>,
    pos: FieldPos,
    dir: Direction,
    damaged: bool,
}

impl Robot {
    /// Places the robot on its start tile. `occupied` holds the tiles of the
    /// robots placed before it.
    pub(crate) fn init(
        &mut self,
        cfg: RobotConfig,
        field: &mut Field,
        occupied: &[FieldPos],
    ) -> Result<(), RobotError> {
        let robot_id = cfg.robot_id;
        let pos = cfg.start_pos;
        let Some(marker) = field.marker_at(pos) else {
            return Err(RobotError::OutsideField { robot_id, pos });
        };
        if marker != field.empty_marker() {
            return Err(RobotError::BlockedStart {
                robot_id,
                pos,
                marker,
            });
        }
        if occupied.contains(&pos) {
            return Err(RobotError::BlockedStart {
                robot_id,
                pos,
                marker: cfg.field_marker,
            });
        }

        if cfg.field_markers == RobotFieldMarkers::Enabled {
            field.set_marker(pos, cfg.field_marker);
        }
        debug!(robot_id, row = pos.row, col = pos.col, "robot_placed");
        self.pos = pos;
        self.dir = cfg.start_dir;
        self.damaged = false;
        self.cfg = Some(cfg);
        Ok(())
    }

    pub(crate) fn deinit(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn draw(&self, field: &Field, frame: &mut Frame) {
        let Some(cfg) = &self.cfg else {
            return;
        };
        let origin = field.tile_origin(self.pos);
        frame.draw_image_frame(cfg.rsrc_id, cfg.frame, origin);
        if self.damaged {
            frame.draw_image(cfg.damage_marker_rsrc_id, origin);
        }
    }

    pub(crate) fn pos(&self) -> FieldPos {
        self.pos
    }

    pub(crate) fn dir(&self) -> Direction {
        self.dir
    }

    /// Turns or advances one tile. `occupied` holds the other robots' tiles.
    /// Returns `None` before `init`.
    pub(crate) fn act(
        &mut self,
        move_type: MoveType,
        field: &mut Field,
        occupied: &[FieldPos],
    ) -> Option<RobotAct> {
        let cfg = self.cfg.as_ref()?;
        let timers = cfg.timers;
        let act = match move_type {
            MoveType::RotateLeft => {
                self.dir = self.dir.turned_left();
                RobotAct::Rotated {
                    timer_id: timers.move_id,
                }
            }
            MoveType::RotateRight => {
                self.dir = self.dir.turned_right();
                RobotAct::Rotated {
                    timer_id: timers.move_id,
                }
            }
            MoveType::Forward => {
                let next = self.dir.step(self.pos);
                match field.marker_at(next) {
                    None => RobotAct::WallCollision {
                        timer_id: timers.wall_collision_id,
                        damage_timer_id: timers.damage_id,
                    },
                    Some(marker) if marker == field.obstacle_marker() => {
                        RobotAct::WallCollision {
                            timer_id: timers.wall_collision_id,
                            damage_timer_id: timers.damage_id,
                        }
                    }
                    Some(_) if occupied.contains(&next) => RobotAct::RobotCollision {
                        timer_id: timers.robot_collision_id,
                        damage_timer_id: timers.damage_id,
                    },
                    Some(_) => {
                        if cfg.field_markers == RobotFieldMarkers::Enabled {
                            field.set_marker(self.pos, field.empty_marker());
                            field.set_marker(next, cfg.field_marker);
                        }
                        self.pos = next;
                        RobotAct::Moved {
                            to: next,
                            timer_id: timers.move_id,
                        }
                    }
                }
            }
        };

        self.damaged = matches!(
            act,
            RobotAct::WallCollision { .. } | RobotAct::RobotCollision { .. }
        );
        if self.damaged {
            info!(robot_id = cfg.robot_id, act = ?act, "robot_damaged");
        }
        Some(act)
    }
}

#[cfg(test)]
mod tests {
    use engine::{DrawCommand, TimerIdAllocator};

    use super::*;
    use crate::gui::field::tests::field_config;

    fn base_config(robots: u32) -> RobotBaseConfig {
        let mut allocator = TimerIdAllocator::new(TimerId(100));
        RobotBaseConfig {
            player_rsrc_id: RsrcId(2),
            enemies_rsrc_id: RsrcId(3),
            damage_marker_rsrc_id: RsrcId(4),
            move_anim_timers: allocator.allocate(robots),
            wall_collision_anim_timers: allocator.allocate(robots),
            robot_collision_anim_timers: allocator.allocate(robots),
            robot_damage_anim_timers: allocator.allocate(robots),
            robot_field_markers: RobotFieldMarkers::Enabled,
        }
    }

    fn look(marker: char) -> RobotLook {
        RobotLook {
            rsrc_id: RsrcId(2),
            frame: 0,
            field_marker: marker,
        }
    }

    fn placed_robot(rows: &[&str], pos: FieldPos, dir: Direction) -> (Robot, Field) {
        let mut field = Field::default();
        field.init(field_config(rows)).expect("field");
        let cfg = base_config(4)
            .robot_config(0, look('B'), pos, dir)
            .expect("robot config");
        let mut robot = Robot::default();
        robot.init(cfg, &mut field, &[]).expect("robot");
        (robot, field)
    }

    #[test]
    fn robot_timers_are_the_indexed_slot_of_each_range() {
        let base = base_config(4);
        let cfg = base
            .robot_config(2, look('E'), FieldPos::new(0, 0), Direction::Up)
            .expect("robot config");
        assert_eq!(cfg.timers.move_id, TimerId(102));
        assert_eq!(cfg.timers.wall_collision_id, TimerId(106));
        assert_eq!(cfg.timers.robot_collision_id, TimerId(110));
        assert_eq!(cfg.timers.damage_id, TimerId(114));
    }

    #[test]
    fn robot_beyond_range_count_has_no_slot() {
        let result = base_config(2).robot_config(2, look('E'), FieldPos::new(0, 0), Direction::Up);
        assert_eq!(
            result,
            Err(RobotError::NoTimerSlot {
                robot_id: 2,
                count: 2
            })
        );
    }

    #[test]
    fn placement_on_obstacle_or_outside_fails() {
        let mut field = Field::default();
        field.init(field_config(&["#."])).expect("field");
        let base = base_config(1);

        let blocked = base
            .robot_config(0, look('B'), FieldPos::new(0, 0), Direction::Up)
            .expect("robot config");
        assert_eq!(
            Robot::default().init(blocked, &mut field, &[]),
            Err(RobotError::BlockedStart {
                robot_id: 0,
                pos: FieldPos::new(0, 0),
                marker: '#'
            })
        );

        let outside = base
            .robot_config(0, look('B'), FieldPos::new(3, 0), Direction::Up)
            .expect("robot config");
        assert!(matches!(
            Robot::default().init(outside, &mut field, &[]),
            Err(RobotError::OutsideField { .. })
        ));
    }

    #[test]
    fn placement_on_taken_tile_fails_even_without_markers() {
        let mut field = Field::default();
        field.init(field_config(&["."])).expect("field");
        let mut base = base_config(2);
        base.robot_field_markers = RobotFieldMarkers::Disabled;
        let cfg = base
            .robot_config(1, look('E'), FieldPos::new(0, 0), Direction::Up)
            .expect("robot config");
        assert!(matches!(
            Robot::default().init(cfg, &mut field, &[FieldPos::new(0, 0)]),
            Err(RobotError::BlockedStart { robot_id: 1, .. })
        ));
    }

    #[test]
    fn forward_moves_and_updates_markers() {
        let (mut robot, mut field) = placed_robot(&["...", "..."], FieldPos::new(1, 0), Direction::Up);
        let act = robot
            .act(MoveType::Forward, &mut field, &[])
            .expect("initialized");

        assert_eq!(
            act,
            RobotAct::Moved {
                to: FieldPos::new(0, 0),
                timer_id: TimerId(100)
            }
        );
        assert_eq!(field.marker_at(FieldPos::new(0, 0)), Some('B'));
        assert_eq!(field.marker_at(FieldPos::new(1, 0)), Some('.'));
    }

    #[test]
    fn rotation_changes_direction_only() {
        let (mut robot, mut field) = placed_robot(&["..."], FieldPos::new(0, 0), Direction::Up);
        let act = robot
            .act(MoveType::RotateRight, &mut field, &[])
            .expect("initialized");
        assert_eq!(act.timer_id(), TimerId(100));
        assert_eq!(robot.dir(), Direction::Right);
        assert_eq!(robot.pos(), FieldPos::new(0, 0));

        robot.act(MoveType::RotateLeft, &mut field, &[]);
        robot.act(MoveType::RotateLeft, &mut field, &[]);
        assert_eq!(robot.dir(), Direction::Left);
    }

    #[test]
    fn collisions_keep_position_and_mark_damage() {
        let (mut robot, mut field) = placed_robot(&[".#."], FieldPos::new(0, 0), Direction::Right);

        let wall = robot
            .act(MoveType::Forward, &mut field, &[])
            .expect("initialized");
        assert_eq!(wall.timer_id(), TimerId(104));
        assert_eq!(robot.pos(), FieldPos::new(0, 0));

        robot.act(MoveType::RotateLeft, &mut field, &[]);
        let edge = robot
            .act(MoveType::Forward, &mut field, &[])
            .expect("initialized");
        assert!(matches!(edge, RobotAct::WallCollision { .. }));

        let mut frame = Frame::new();
        robot.draw(&field, &mut frame);
        assert_eq!(frame.len(), 2);
        assert!(matches!(
            frame.commands()[1],
            DrawCommand::Image {
                rsrc_id: RsrcId(4),
                ..
            }
        ));
    }

    #[test]
    fn forward_into_other_robot_is_a_robot_collision() {
        let (mut robot, mut field) = placed_robot(&["..."], FieldPos::new(0, 0), Direction::Right);
        let act = robot
            .act(MoveType::Forward, &mut field, &[FieldPos::new(0, 1)])
            .expect("initialized");
        assert_eq!(
            act,
            RobotAct::RobotCollision {
                timer_id: TimerId(108),
                damage_timer_id: TimerId(112)
            }
        );
    }

    #[test]
    fn uninitialized_robot_neither_acts_nor_draws() {
        let mut field = Field::default();
        field.init(field_config(&["."])).expect("field");
        let mut robot = Robot::default();
        assert!(robot.act(MoveType::Forward, &mut field, &[]).is_none());

        let mut frame = Frame::new();
        robot.draw(&field, &mut frame);
        assert!(frame.is_empty());
    }
}
