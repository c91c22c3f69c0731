//! Random controller - makes random choices
//!
//! Useful for fuzzing the engine and for batch simulations. Seeded, so a
//! game driven by random controllers is still reproducible.

use crate::core::{ChipId, EventCard, PlayerId};
use crate::game::controller::{
    EventOption, GameStateView, PalmChoice, PlayerController, RubyTrade, ShopOffer,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A controller that makes random choices from the options it is given
pub struct RandomController {
    player_id: PlayerId,
    rng: ChaCha12Rng,
    /// Chance of drawing again on each prompt
    continue_chance: f64,
}

impl RandomController {
    /// Create a random controller with a seeded RNG
    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
            continue_chance: 0.75,
        }
    }

    /// Set the chance of drawing again (clamped to 0..=1)
    pub fn with_continue_chance(mut self, chance: f64) -> Self {
        self.continue_chance = chance.clamp(0.0, 1.0);
        self
    }
}

impl PlayerController for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_pre_draw_count(&mut self, _view: &GameStateView) -> u32 {
        self.rng.gen_range(0..=2)
    }

    fn wants_to_continue(&mut self, _view: &GameStateView, _bust_sum: u32, _limit: u32) -> bool {
        self.rng.gen_bool(self.continue_chance)
    }

    fn choose_draw_count(&mut self, _view: &GameStateView) -> usize {
        self.rng.gen_range(1..=2)
    }

    fn choose_palm_action(
        &mut self,
        _view: &GameStateView,
        palm: &[ChipId],
        allow_return: bool,
    ) -> PalmChoice {
        if allow_return && self.rng.gen_bool(0.1) {
            return PalmChoice::ReturnAll;
        }
        PalmChoice::Commit(self.rng.gen_range(0..palm.len().max(1)))
    }

    fn use_potion(&mut self, _view: &GameStateView, _chip: ChipId) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn return_first_chip(&mut self, _view: &GameStateView, _chip: ChipId) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn remove_preceding_chip(
        &mut self,
        _view: &GameStateView,
        _placed: ChipId,
        _preceding: ChipId,
    ) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn choose_event_option(
        &mut self,
        _view: &GameStateView,
        _card: &EventCard,
        options: &[EventOption],
    ) -> usize {
        self.rng.gen_range(0..options.len().max(1))
    }

    fn choose_purchase(&mut self, _view: &GameStateView, offers: &[ShopOffer]) -> Option<usize> {
        if offers.is_empty() || self.rng.gen_bool(0.3) {
            None
        } else {
            Some(self.rng.gen_range(0..offers.len()))
        }
    }

    fn choose_ruby_trade(&mut self, view: &GameStateView) -> RubyTrade {
        let potion_empty = view.me().map(|p| !p.potion_filled).unwrap_or(false);
        match self.rng.gen_range(0..3) {
            1 => RubyTrade::AdvanceTrack,
            2 if potion_empty => RubyTrade::RefillPotion,
            _ => RubyTrade::Done,
        }
    }
}
