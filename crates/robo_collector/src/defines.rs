pub(crate) const ENEMIES_CNT: usize = 3;
pub(crate) const ROBOTS_CNT: usize = ENEMIES_CNT + 1;
pub(crate) const PLAYER_ROBOT_IDX: usize = 0;
pub(crate) const COINS_CNT: usize = 10;

pub(crate) const EMPTY_TILE_MARKER: char = '.';
pub(crate) const HARD_OBSTACLE_MARKER: char = '#';
pub(crate) const PLAYER_MARKER: char = 'B';
pub(crate) const ENEMY_MARKER: char = 'E';
