//! Round-scoped transient storage
//!
//! Created empty at round start and dropped at round end. Nothing in here
//! survives into the next round.

use crate::core::{BoardField, Color, PlayerId};
use crate::game::phase::ContextKey;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Outcome of one player's drawing sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    pub player: PlayerId,
    /// Track position the sequence started from
    pub pos_start: u32,
    /// Position after the last committed chip
    pub pos_last: u32,
    /// Sum of bust-color values left in the pot
    pub bust_sum: u32,
    /// Sum of all values left in the pot
    pub chip_sum: u32,
    pub exploded: bool,
    /// Board index of the landing field, clamped to the table
    pub landing_index: usize,
    pub landing: BoardField,
}

/// Transient workspace of one round
#[derive(Debug, Clone, Default)]
pub struct RoundContext {
    pub round: u32,
    /// Bust limit in effect for this round's drawing
    pub draw_limit: Option<u32>,
    /// Extra start positions chosen in the pre-draw phase
    pub pre_draw_counts: Option<FxHashMap<PlayerId, u32>>,
    /// Drawing results in seat order
    pub draw_results: Option<Vec<DrawResult>>,
    /// Bonus die rolls of the winner roll, in roll order
    pub dice_results: Vec<(PlayerId, u8)>,
    /// Colors whose once-per-round return option a player already used
    pub first_return_used: FxHashSet<(PlayerId, Color)>,
    /// Whether players may return the whole palm instead of committing
    pub allow_palm_return: bool,
}

impl RoundContext {
    pub fn new(round: u32, allow_palm_return: bool) -> Self {
        RoundContext {
            round,
            allow_palm_return,
            ..Self::default()
        }
    }

    /// Whether a prerequisite key is populated
    pub fn has(&self, key: ContextKey) -> bool {
        match key {
            ContextKey::DrawLimit => self.draw_limit.is_some(),
            ContextKey::PreDrawCounts => self.pre_draw_counts.is_some(),
            ContextKey::DrawingResults => self.draw_results.is_some(),
        }
    }

    pub fn pre_draw_count(&self, player: PlayerId) -> u32 {
        self.pre_draw_counts
            .as_ref()
            .and_then(|counts| counts.get(&player).copied())
            .unwrap_or(0)
    }

    pub fn draw_result(&self, player: PlayerId) -> Option<&DrawResult> {
        self.draw_results
            .as_ref()?
            .iter()
            .find(|result| result.player == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_has_nothing() {
        let ctx = RoundContext::new(1, false);
        assert!(!ctx.has(ContextKey::DrawLimit));
        assert!(!ctx.has(ContextKey::PreDrawCounts));
        assert!(!ctx.has(ContextKey::DrawingResults));
        assert_eq!(ctx.pre_draw_count(PlayerId::new(0)), 0);
    }

    #[test]
    fn test_keys_follow_fields() {
        let mut ctx = RoundContext::new(2, true);
        ctx.draw_limit = Some(7);
        ctx.pre_draw_counts = Some(FxHashMap::from_iter([(PlayerId::new(1), 3)]));
        assert!(ctx.has(ContextKey::DrawLimit));
        assert_eq!(ctx.pre_draw_count(PlayerId::new(1)), 3);
        assert!(ctx.allow_palm_return);
    }
}
