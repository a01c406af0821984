use engine::{Frame, RsrcId, TimerId, TimerRange};
use thiserror::Error;
use tracing::{debug, info};

use super::field::{Field, FieldPos};

pub(crate) const COIN_TIERS: usize = 3;
/// Score of a gold, silver and bronze coin.
const COIN_VALUES: [u32; COIN_TIERS] = [3, 2, 1];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CoinHandlerConfig {
    /// Gold, silver and bronze rotation sheets.
    pub(crate) anim_rsrc_ids: [RsrcId; COIN_TIERS],
    pub(crate) field_markers: [char; COIN_TIERS],
    pub(crate) max_coins: usize,
    pub(crate) target_win_coins: u32,
    pub(crate) rotate_anim_timers: TimerRange,
    pub(crate) collect_anim_timers: TimerRange,
    pub(crate) respawn_anim_timers: TimerRange,
    pub(crate) field_empty_marker: char,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CoinHandlerError {
    #[error("{required} coins need {required} free tiles, field has {available}")]
    NotEnoughFreeTiles { required: usize, available: usize },
    #[error("{kind} timer range holds {available} ids, {required} coins need one each")]
    TimerRangeTooSmall {
        kind: &'static str,
        required: usize,
        available: u32,
    },
    #[error("coin empty marker '{configured}' differs from field empty marker '{field}'")]
    EmptyMarkerMismatch { configured: char, field: char },
    #[error("coin marker '{marker}' collides with a reserved field marker")]
    ReservedMarker { marker: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Coin {
    tier: usize,
    pos: Option<FieldPos>,
    rotate_timer_id: TimerId,
    collect_timer_id: TimerId,
    respawn_timer_id: TimerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CoinCollected {
    pub(crate) value: u32,
    pub(crate) collected: u32,
    pub(crate) collect_timer_id: TimerId,
    /// `None` when no free tile was left for the coin to reappear on.
    pub(crate) respawn_timer_id: Option<TimerId>,
}

#[derive(Debug, Default)]
pub(crate) struct CoinHandler {
    coins: Vec<Coin>,
    anim_rsrc_ids: [RsrcId; COIN_TIERS],
    field_markers: [char; COIN_TIERS],
    target_win_coins: u32,
    collected: u32,
}

impl CoinHandler {
    /// Spreads `max_coins` coins over the empty tiles at an even row-major
    /// stride, cycling gold, silver, bronze. Tiles in `occupied` are skipped
    /// even when the field does not mark them.
    pub(crate) fn init(
        &mut self,
        cfg: CoinHandlerConfig,
        field: &mut Field,
        occupied: &[FieldPos],
    ) -> Result<(), CoinHandlerError> {
        if cfg.field_empty_marker != field.empty_marker() {
            return Err(CoinHandlerError::EmptyMarkerMismatch {
                configured: cfg.field_empty_marker,
                field: field.empty_marker(),
            });
        }
        if let Some(marker) = cfg
            .field_markers
            .iter()
            .copied()
            .find(|marker| *marker == field.empty_marker() || *marker == field.obstacle_marker())
        {
            return Err(CoinHandlerError::ReservedMarker { marker });
        }
        for (kind, range) in [
            ("rotate", cfg.rotate_anim_timers),
            ("collect", cfg.collect_anim_timers),
            ("respawn", cfg.respawn_anim_timers),
        ] {
            if (range.count() as usize) < cfg.max_coins {
                return Err(CoinHandlerError::TimerRangeTooSmall {
                    kind,
                    required: cfg.max_coins,
                    available: range.count(),
                });
            }
        }

        let free: Vec<FieldPos> = field
            .empty_positions()
            .into_iter()
            .filter(|pos| !occupied.contains(pos))
            .collect();
        if free.len() < cfg.max_coins {
            return Err(CoinHandlerError::NotEnoughFreeTiles {
                required: cfg.max_coins,
                available: free.len(),
            });
        }

        let stride = if cfg.max_coins == 0 {
            0
        } else {
            free.len() / cfg.max_coins
        };
        let mut coins = Vec::with_capacity(cfg.max_coins);
        for (idx, slot) in (0..cfg.max_coins).zip(0u32..) {
            let pos = free[idx * stride];
            let tier = idx % COIN_TIERS;
            field.set_marker(pos, cfg.field_markers[tier]);
            coins.push(Coin {
                tier,
                pos: Some(pos),
                rotate_timer_id: timer_slot(cfg.rotate_anim_timers, slot),
                collect_timer_id: timer_slot(cfg.collect_anim_timers, slot),
                respawn_timer_id: timer_slot(cfg.respawn_anim_timers, slot),
            });
        }

        info!(
            coins = coins.len(),
            target_win_coins = cfg.target_win_coins,
            "coin_handler_initialized"
        );
        self.coins = coins;
        self.anim_rsrc_ids = cfg.anim_rsrc_ids;
        self.field_markers = cfg.field_markers;
        self.target_win_coins = cfg.target_win_coins;
        self.collected = 0;
        Ok(())
    }

    pub(crate) fn deinit(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn draw(&self, field: &Field, frame: &mut Frame) {
        for coin in &self.coins {
            if let Some(pos) = coin.pos {
                frame.draw_image_frame(self.anim_rsrc_ids[coin.tier], 0, field.tile_origin(pos));
            }
        }
    }

    pub(crate) fn coin_count(&self) -> usize {
        self.coins.len()
    }

    pub(crate) fn collected(&self) -> u32 {
        self.collected
    }

    pub(crate) fn is_target_reached(&self) -> bool {
        self.collected >= self.target_win_coins
    }

    /// Collects the coin lying on `pos`, if any, and respawns it on the first
    /// free tile after `pos` in row-major order. `blocked` lists tiles that
    /// must stay clear even when the field does not mark them.
    pub(crate) fn collect_at(
        &mut self,
        pos: FieldPos,
        field: &mut Field,
        blocked: &[FieldPos],
    ) -> Option<CoinCollected> {
        let idx = self.coins.iter().position(|coin| coin.pos == Some(pos))?;
        let tier = self.coins[idx].tier;
        if field.marker_at(pos) == Some(self.field_markers[tier]) {
            field.set_marker(pos, field.empty_marker());
        }

        let taken: Vec<FieldPos> = self.coins.iter().filter_map(|coin| coin.pos).collect();
        let respawn_pos = next_free_after(field, pos, |candidate| {
            candidate != pos && !taken.contains(&candidate) && !blocked.contains(&candidate)
        });

        let value = COIN_VALUES[tier];
        self.collected = self.collected.saturating_add(value);
        let coin = &mut self.coins[idx];
        coin.pos = respawn_pos;
        if let Some(respawn_pos) = respawn_pos {
            field.set_marker(respawn_pos, self.field_markers[tier]);
        }
        debug!(
            coin = idx,
            value,
            collected = self.collected,
            respawned = respawn_pos.is_some(),
            "coin_collected"
        );

        Some(CoinCollected {
            value,
            collected: self.collected,
            collect_timer_id: coin.collect_timer_id,
            respawn_timer_id: respawn_pos.map(|_| coin.respawn_timer_id),
        })
    }
}

fn timer_slot(range: TimerRange, slot: u32) -> TimerId {
    range.id_at(slot).unwrap_or_else(|| range.start())
}

fn next_free_after(
    field: &Field,
    after: FieldPos,
    mut accept: impl FnMut(FieldPos) -> bool,
) -> Option<FieldPos> {
    let free = field.empty_positions();
    let split = free
        .iter()
        .position(|candidate| (candidate.row, candidate.col) > (after.row, after.col))
        .unwrap_or(free.len());
    free[split..]
        .iter()
        .chain(&free[..split])
        .copied()
        .find(|candidate| accept(*candidate))
}
