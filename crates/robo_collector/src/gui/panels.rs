use engine::{Frame, Point, RsrcId, TimerId};
use thiserror::Error;
use tracing::info;

const HEALTH_PANEL_POS: Point = Point::new(1245, 47);
const HEALTH_INDICATOR_OFFSET: Point = Point::new(70, 60);
const COIN_PANEL_POS: Point = Point::new(1245, 252);
const TIME_PANEL_POS: Point = Point::new(1245, 457);
const PANEL_TEXT_OFFSET: Point = Point::new(220, 60);
const FULL_HEALTH: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HealthPanelConfig {
    pub(crate) rsrc_id: RsrcId,
    pub(crate) indicator_rsrc_id: RsrcId,
    pub(crate) indicator_font_id: RsrcId,
    pub(crate) indicator_reduce_timer_id: TimerId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CoinPanelConfig {
    pub(crate) target_number: u32,
    pub(crate) rsrc_id: RsrcId,
    pub(crate) font_id: RsrcId,
    pub(crate) incr_timer_id: TimerId,
    pub(crate) decr_timer_id: TimerId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TimePanelConfig {
    pub(crate) rsrc_id: RsrcId,
    pub(crate) font_id: RsrcId,
    pub(crate) clock_timer_id: TimerId,
    pub(crate) blink_timer_id: TimerId,
    pub(crate) total_seconds: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PanelHandlerConfig {
    pub(crate) health_panel_cfg: HealthPanelConfig,
    pub(crate) coin_panel_cfg: CoinPanelConfig,
    pub(crate) time_panel_cfg: TimePanelConfig,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum PanelError {
    #[error("coin panel target number must be non-zero")]
    ZeroCoinTarget,
    #[error("time panel total seconds must be non-zero")]
    ZeroGameDuration,
    #[error("panel timer {timer_id} is assigned to more than one animation")]
    DuplicateTimerId { timer_id: TimerId },
}

/// Health, coin and time panels on the right side of the map.
#[derive(Debug, Default)]
pub(crate) struct PanelHandler {
    cfg: Option<PanelHandlerConfig>,
    health: u32,
    coins: u32,
    remaining_seconds: u32,
}

impl PanelHandler {
    pub(crate) fn init(&mut self, cfg: PanelHandlerConfig) -> Result<(), PanelError> {
        if cfg.coin_panel_cfg.target_number == 0 {
            return Err(PanelError::ZeroCoinTarget);
        }
        if cfg.time_panel_cfg.total_seconds == 0 {
            return Err(PanelError::ZeroGameDuration);
        }
        let timer_ids = [
            cfg.health_panel_cfg.indicator_reduce_timer_id,
            cfg.coin_panel_cfg.incr_timer_id,
            cfg.coin_panel_cfg.decr_timer_id,
            cfg.time_panel_cfg.clock_timer_id,
            cfg.time_panel_cfg.blink_timer_id,
        ];
        for (idx, timer_id) in timer_ids.iter().enumerate() {
            if timer_ids[..idx].contains(timer_id) {
                return Err(PanelError::DuplicateTimerId {
                    timer_id: *timer_id,
                });
            }
        }

        info!(
            target_number = cfg.coin_panel_cfg.target_number,
            total_seconds = cfg.time_panel_cfg.total_seconds,
            "panels_initialized"
        );
        self.health = FULL_HEALTH;
        self.coins = 0;
        self.remaining_seconds = cfg.time_panel_cfg.total_seconds;
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

        let health = &cfg.health_panel_cfg;
        frame.draw_image(health.rsrc_id, HEALTH_PANEL_POS);
        frame.draw_image(
            health.indicator_rsrc_id,
            offset(HEALTH_PANEL_POS, HEALTH_INDICATOR_OFFSET),
        );
        frame.draw_text(
            health.indicator_font_id,
            format!("{}%", self.health),
            offset(HEALTH_PANEL_POS, PANEL_TEXT_OFFSET),
        );

        let coin = &cfg.coin_panel_cfg;
        frame.draw_image(coin.rsrc_id, COIN_PANEL_POS);
        frame.draw_text(
            coin.font_id,
            format!("{}/{}", self.coins, coin.target_number),
            offset(COIN_PANEL_POS, PANEL_TEXT_OFFSET),
        );

        let time = &cfg.time_panel_cfg;
        frame.draw_image(time.rsrc_id, TIME_PANEL_POS);
        frame.draw_text(
            time.font_id,
            format_clock(self.remaining_seconds),
            offset(TIME_PANEL_POS, PANEL_TEXT_OFFSET),
        );
    }

    /// Shows `collected` on the coin panel and returns the timer animating
    /// the change, or `None` when the value did not change.
    pub(crate) fn set_collected_coins(&mut self, collected: u32) -> Option<TimerId> {
        let cfg = self.cfg.as_ref()?;
        let timer_id = match collected.cmp(&self.coins) {
            std::cmp::Ordering::Greater => cfg.coin_panel_cfg.incr_timer_id,
            std::cmp::Ordering::Less => cfg.coin_panel_cfg.decr_timer_id,
            std::cmp::Ordering::Equal => return None,
        };
        self.coins = collected;
        Some(timer_id)
    }

    /// Lowers health by `amount` percent and returns the indicator timer.
    pub(crate) fn reduce_health(&mut self, amount: u32) -> Option<TimerId> {
        let cfg = self.cfg.as_ref()?;
        self.health = self.health.saturating_sub(amount);
        Some(cfg.health_panel_cfg.indicator_reduce_timer_id)
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }
}

fn offset(base: Point, delta: Point) -> Point {
    Point::new(base.x + delta.x, base.y + delta.y)
}

fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
pub(crate) mod tests {
    use engine::DrawCommand;

    use super::*;

    pub(crate) fn panel_config() -> PanelHandlerConfig {
        PanelHandlerConfig {
            health_panel_cfg: HealthPanelConfig {
                rsrc_id: RsrcId(8),
                indicator_rsrc_id: RsrcId(9),
                indicator_font_id: RsrcId(19),
                indicator_reduce_timer_id: TimerId(50),
            },
            coin_panel_cfg: CoinPanelConfig {
                target_number: 30,
                rsrc_id: RsrcId(10),
                font_id: RsrcId(20),
                incr_timer_id: TimerId(46),
                decr_timer_id: TimerId(47),
            },
            time_panel_cfg: TimePanelConfig {
                rsrc_id: RsrcId(11),
                font_id: RsrcId(20),
                clock_timer_id: TimerId(48),
                blink_timer_id: TimerId(49),
                total_seconds: 180,
            },
        }
    }

    #[test]
    fn zero_target_and_zero_duration_are_rejected() {
        let mut cfg = panel_config();
        cfg.coin_panel_cfg.target_number = 0;
        assert_eq!(PanelHandler::default().init(cfg), Err(PanelError::ZeroCoinTarget));

        let mut cfg = panel_config();
        cfg.time_panel_cfg.total_seconds = 0;
        assert_eq!(
            PanelHandler::default().init(cfg),
            Err(PanelError::ZeroGameDuration)
        );
    }

    #[test]
    fn shared_timer_ids_are_rejected() {
        let mut cfg = panel_config();
        cfg.time_panel_cfg.blink_timer_id = cfg.coin_panel_cfg.incr_timer_id;
        assert_eq!(
            PanelHandler::default().init(cfg),
            Err(PanelError::DuplicateTimerId {
                timer_id: TimerId(46)
            })
        );
    }

    #[test]
    fn draw_shows_health_coins_and_clock() {
        let mut panels = PanelHandler::default();
        panels.init(panel_config()).expect("panels");
        assert_eq!(panels.set_collected_coins(4), Some(TimerId(46)));
        assert_eq!(panels.set_collected_coins(4), None);
        assert_eq!(panels.reduce_health(25), Some(TimerId(50)));

        let mut frame = Frame::new();
        panels.draw(&mut frame);
        let texts: Vec<_> = frame
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                DrawCommand::Image { .. } => None,
            })
            .collect();
        assert_eq!(texts, vec!["75%", "4/30", "03:00"]);
        assert_eq!(frame.len(), 7);
    }

    #[test]
    fn uninitialized_panels_draw_nothing() {
        let mut frame = Frame::new();
        PanelHandler::default().draw(&mut frame);
        assert!(frame.is_empty());
    }
}
