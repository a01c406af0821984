use engine::{ranges_are_disjoint, TimerId, TimerIdAllocator, TimerRange};

use crate::defines::{COINS_CNT, ROBOTS_CNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EntityAnimationKind {
    RobotMove,
    RobotWallCollision,
    RobotPeerCollision,
    RobotDamage,
    CoinRotate,
    CoinCollect,
    CoinRespawn,
    CoinPanelIncrement,
    CoinPanelDecrement,
    TimePanelClock,
    TimePanelBlink,
    HealthPanelReduceIndicator,
}

const KIND_COUNT: usize = 12;

/// Every timer id the game uses, partitioned per entity type and animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimerLayout {
    pub(crate) robots_move: TimerRange,
    pub(crate) robots_wall_collision: TimerRange,
    pub(crate) robots_robot_collision: TimerRange,
    pub(crate) robots_damage: TimerRange,
    pub(crate) coin_rotate: TimerRange,
    pub(crate) coin_collect: TimerRange,
    pub(crate) coin_respawn: TimerRange,
    pub(crate) coin_panel_incr: TimerId,
    pub(crate) coin_panel_decr: TimerId,
    pub(crate) time_panel_clock: TimerId,
    pub(crate) time_panel_blink: TimerId,
    pub(crate) health_panel_reduce_indicator: TimerId,
}

impl TimerLayout {
    pub(crate) const fn compute(robots: u32, coins: u32) -> Self {
        let mut allocator = TimerIdAllocator::new(TimerId(0));
        Self {
            robots_move: allocator.allocate(robots),
            robots_wall_collision: allocator.allocate(robots),
            robots_robot_collision: allocator.allocate(robots),
            robots_damage: allocator.allocate(robots),
            coin_rotate: allocator.allocate(coins),
            coin_collect: allocator.allocate(coins),
            coin_respawn: allocator.allocate(coins),
            coin_panel_incr: allocator.allocate_one(),
            coin_panel_decr: allocator.allocate_one(),
            time_panel_clock: allocator.allocate_one(),
            time_panel_blink: allocator.allocate_one(),
            health_panel_reduce_indicator: allocator.allocate_one(),
        }
    }

    pub(crate) const fn ranges(&self) -> [(EntityAnimationKind, TimerRange); KIND_COUNT] {
        [
            (EntityAnimationKind::RobotMove, self.robots_move),
            (EntityAnimationKind::RobotWallCollision, self.robots_wall_collision),
            (EntityAnimationKind::RobotPeerCollision, self.robots_robot_collision),
            (EntityAnimationKind::RobotDamage, self.robots_damage),
            (EntityAnimationKind::CoinRotate, self.coin_rotate),
            (EntityAnimationKind::CoinCollect, self.coin_collect),
            (EntityAnimationKind::CoinRespawn, self.coin_respawn),
            (
                EntityAnimationKind::CoinPanelIncrement,
                TimerRange::new(self.coin_panel_incr, 1),
            ),
            (
                EntityAnimationKind::CoinPanelDecrement,
                TimerRange::new(self.coin_panel_decr, 1),
            ),
            (
                EntityAnimationKind::TimePanelClock,
                TimerRange::new(self.time_panel_clock, 1),
            ),
            (
                EntityAnimationKind::TimePanelBlink,
                TimerRange::new(self.time_panel_blink, 1),
            ),
            (
                EntityAnimationKind::HealthPanelReduceIndicator,
                TimerRange::new(self.health_panel_reduce_indicator, 1),
            ),
        ]
    }

    pub(crate) const fn is_disjoint(&self) -> bool {
        let pairs = self.ranges();
        let mut ranges = [TimerRange::new(TimerId(0), 0); KIND_COUNT];
        let mut idx = 0;
        while idx < KIND_COUNT {
            ranges[idx] = pairs[idx].1;
            idx += 1;
        }
        ranges_are_disjoint(&ranges)
    }

    pub(crate) const fn total_span(&self) -> u32 {
        self.health_panel_reduce_indicator.0 + 1
    }
}

pub(crate) const TIMER_LAYOUT: TimerLayout =
    TimerLayout::compute(ROBOTS_CNT as u32, COINS_CNT as u32);

const _: () = assert!(TIMER_LAYOUT.is_disjoint(), "timer id ranges overlap");
const _: () = assert!(
    TIMER_LAYOUT.total_span() == 4 * ROBOTS_CNT as u32 + 3 * COINS_CNT as u32 + 5,
    "timer id space has gaps"
);
