//! Heuristic AI controller
//!
//! A press-your-luck player: it keeps drawing while the chance that the next
//! chip pushes the bust-color sum over the limit stays under its risk
//! tolerance. Shopping, trading, and event choices use simple greedy rules.

use crate::core::{ChipId, EventCard, PlayerId};
use crate::game::controller::{
    EventOption, GameStateView, PalmChoice, PlayerController, RubyTrade, ShopOffer,
};

/// Heuristic AI controller that decides from the visible bag contents
pub struct HeuristicController {
    player_id: PlayerId,
    /// Highest acceptable chance of busting on the next draw
    max_risk: f64,
}

impl HeuristicController {
    /// Create a new heuristic controller with default settings
    pub fn new(player_id: PlayerId) -> Self {
        HeuristicController {
            player_id,
            max_risk: 0.3,
        }
    }

    /// Set the risk tolerance (clamped to 0..=1)
    pub fn with_max_risk(mut self, max_risk: f64) -> Self {
        self.max_risk = max_risk.clamp(0.0, 1.0);
        self
    }

    /// Chance that one random chip from the bag pushes `bust_sum` past `limit`
    fn bust_risk(view: &GameStateView, bust_sum: u32, limit: u32) -> f64 {
        let bag_len = view.bag_len();
        if bag_len == 0 {
            return 0.0;
        }
        let headroom = limit.saturating_sub(bust_sum);
        let deadly = view
            .bag_bust_values()
            .into_iter()
            .filter(|&value| value > headroom)
            .count();
        deadly as f64 / bag_len as f64
    }
}

impl PlayerController for HeuristicController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Trailing players take one rat tail per four points behind the leader
    fn choose_pre_draw_count(&mut self, view: &GameStateView) -> u32 {
        let leader = view.players().iter().map(|p| p.score).max().unwrap_or(0);
        let mine = view.me().map(|p| p.score).unwrap_or(0);
        (leader.saturating_sub(mine) / 4).min(3)
    }

    fn wants_to_continue(&mut self, view: &GameStateView, bust_sum: u32, limit: u32) -> bool {
        let risk = Self::bust_risk(view, bust_sum, limit);
        let has_potion = view.me().map(|p| p.potion_filled).unwrap_or(false);
        // A filled potion absorbs one bad draw
        let tolerance = if has_potion {
            self.max_risk * 1.5
        } else {
            self.max_risk
        };
        risk <= tolerance
    }

    /// Commit the most valuable non-bust chip, else the smallest bust chip
    fn choose_palm_action(
        &mut self,
        view: &GameStateView,
        palm: &[ChipId],
        _allow_return: bool,
    ) -> PalmChoice {
        let mut best: Option<(usize, i32)> = None;
        for (idx, &chip_id) in palm.iter().enumerate() {
            let Some(chip) = view.chip(chip_id) else {
                continue;
            };
            let value = i32::from(chip.value());
            let score = if chip.color().is_bust() {
                -value
            } else {
                value + 10
            };
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        PalmChoice::Commit(best.map(|(idx, _)| idx).unwrap_or(0))
    }

    fn use_potion(&mut self, view: &GameStateView, chip: ChipId) -> bool {
        view.chip(chip).map(|c| c.value() >= 2).unwrap_or(false)
    }

    fn return_first_chip(&mut self, _view: &GameStateView, _chip: ChipId) -> bool {
        true
    }

    fn remove_preceding_chip(
        &mut self,
        _view: &GameStateView,
        _placed: ChipId,
        _preceding: ChipId,
    ) -> bool {
        true
    }

    fn choose_event_option(
        &mut self,
        _view: &GameStateView,
        _card: &EventCard,
        options: &[EventOption],
    ) -> usize {
        options
            .iter()
            .position(|o| matches!(o, EventOption::AdvanceTrack(_)))
            .unwrap_or(0)
    }

    /// Buy the most expensive offer on the list
    fn choose_purchase(&mut self, _view: &GameStateView, offers: &[ShopOffer]) -> Option<usize> {
        offers
            .iter()
            .enumerate()
            .max_by_key(|(_, offer)| offer.price)
            .map(|(idx, _)| idx)
    }

    fn choose_ruby_trade(&mut self, view: &GameStateView) -> RubyTrade {
        let Some(me) = view.me() else {
            return RubyTrade::Done;
        };
        if me.rubies < 2 {
            RubyTrade::Done
        } else if !me.potion_filled {
            RubyTrade::RefillPotion
        } else {
            RubyTrade::AdvanceTrack
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChipTypeId, Color};
    use crate::game::state::small_game;

    #[test]
    fn test_prefers_non_bust_chip() {
        let mut game = small_game();
        let p0 = PlayerId::new(0);
        game.give_bag_subset(p0, ChipTypeId::new(Color::Gray, 1), 1)
            .unwrap();
        game.give_bag_subset(p0, ChipTypeId::new(Color::Orange, 1), 1)
            .unwrap();

        let view = GameStateView::new(&game, p0);
        let mut controller = HeuristicController::new(p0);
        // chip 0 is gray, chip 3 is orange
        let choice = controller.choose_palm_action(&view, &[ChipId::new(0), ChipId::new(3)], false);
        assert_eq!(choice, PalmChoice::Commit(1));
    }

    #[test]
    fn test_stops_when_every_draw_busts() {
        let mut game = small_game();
        let p0 = PlayerId::new(0);
        game.give_bag_subset(p0, ChipTypeId::new(Color::Gray, 1), 3)
            .unwrap();
        game.player_mut(p0).unwrap().potion_filled = false;

        let view = GameStateView::new(&game, p0);
        let mut controller = HeuristicController::new(p0);
        assert!(controller.wants_to_continue(&view, 0, 7));
        assert!(!controller.wants_to_continue(&view, 7, 7));
    }

    #[test]
    fn test_trade_refills_empty_potion_first() {
        let mut game = small_game();
        let p0 = PlayerId::new(0);
        {
            let player = game.player_mut(p0).unwrap();
            player.rubies = 4;
            player.potion_filled = false;
        }
        let view = GameStateView::new(&game, p0);
        let mut controller = HeuristicController::new(p0);
        assert_eq!(controller.choose_ruby_trade(&view), RubyTrade::RefillPotion);
    }
}
