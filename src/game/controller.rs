//! Player controller trait and game state view
//!
//! This module defines the interface between the game engine and whoever
//! makes the choices (scripted test harness, AI, or a UI). The engine calls
//! the controller whenever a decision is needed; the controller inspects a
//! read-only view of the game and returns a typed answer. The engine never
//! originates a decision itself.

use crate::core::{ChipId, ChipInstance, Color, EventCard, PlayerId, PlayerState};
use crate::game::logger::{GameLogger, LogCategory};
use crate::game::GameState;
use crate::{GameError, Result};
use std::fmt;

/// How many times an invalid answer is asked again before the engine falls
/// back to the default answer
pub const MAX_PROMPTS: usize = 3;

/// What to do with the chips in the palm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalmChoice {
    /// Commit the palm chip at this index to the pot
    Commit(usize),
    /// Put every palm chip back into the bag (only when the round allows it)
    ReturnAll,
}

/// One action of the resource trade phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubyTrade {
    /// Spend rubies to advance the persistent track position by one
    AdvanceTrack,
    /// Spend rubies to refill an empty potion
    RefillPotion,
    /// Finish trading
    Done,
}

/// A choice offered by an event card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOption {
    AdvanceTrack(u32),
    TakeChip(Color),
}

impl fmt::Display for EventOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOption::AdvanceTrack(n) => write!(f, "move track +{n}"),
            EventOption::TakeChip(color) => write!(f, "take 1 {color} chip"),
        }
    }
}

/// A chip for sale in the purchase phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopOffer {
    pub type_id: crate::core::ChipTypeId,
    pub price: u32,
}

impl fmt::Display for ShopOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {} coins", self.type_id, self.price)
    }
}

/// Read-only view of game state for controllers
///
/// This provides access to game information without allowing mutation.
pub struct GameStateView<'a> {
    game: &'a GameState,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    /// Create a new view of the game state from a player's perspective
    pub fn new(game: &'a GameState, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    /// Get the player ID this view is for
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Logger, so controllers can record their choices
    pub fn logger(&self) -> &GameLogger {
        &self.game.logger
    }

    /// This player's counters
    pub fn me(&self) -> Option<&PlayerState> {
        self.game.player(self.player_id).ok()
    }

    /// All players, in seat order
    pub fn players(&self) -> &[PlayerState] {
        &self.game.players
    }

    pub fn chip(&self, chip_id: ChipId) -> Option<&ChipInstance> {
        self.game.chip(chip_id).ok()
    }

    pub fn bag_len(&self) -> usize {
        self.game
            .zones(self.player_id)
            .map(|z| z.bag.len())
            .unwrap_or(0)
    }

    /// Chips in the palm, in draw order
    pub fn palm(&self) -> &[ChipId] {
        self.game
            .zones(self.player_id)
            .map(|z| z.palm.chips.as_slice())
            .unwrap_or(&[])
    }

    /// Chips in the pot, in commit order
    pub fn pot(&self) -> &[ChipId] {
        self.game
            .zones(self.player_id)
            .map(|z| z.pot.chips.as_slice())
            .unwrap_or(&[])
    }

    /// Bust-color values still in the bag
    pub fn bag_bust_values(&self) -> Vec<u32> {
        let Ok(zones) = self.game.zones(self.player_id) else {
            return Vec::new();
        };
        zones
            .bag
            .chips
            .iter()
            .filter_map(|&id| self.game.chip(id).ok())
            .filter(|chip| chip.color().is_bust())
            .map(|chip| u32::from(chip.value()))
            .collect()
    }

    /// `(bust-color sum, total)` of this player's pot
    pub fn pot_sums(&self) -> (u32, u32) {
        self.game.pot_sums(self.player_id).unwrap_or((0, 0))
    }

    /// Round-modifier card in force, if any
    pub fn active_modifier(&self) -> Option<&EventCard> {
        self.game.active_modifier.as_ref()
    }

    pub fn supply_has(&self, color: Color) -> bool {
        self.game.supply_has(color)
    }
}

/// Player controller trait
///
/// Implement this trait to create AI players or connect to a UI. Every
/// method receives a read-only view; invalid answers are logged by the engine
/// and the question is asked again.
pub trait PlayerController {
    /// Get the player ID this controller is responsible for
    fn player_id(&self) -> PlayerId;

    /// Extra start positions for this round (rat tails)
    fn choose_pre_draw_count(&mut self, view: &GameStateView) -> u32;

    /// Whether to draw again. `bust_sum` and `limit` describe the pot now.
    fn wants_to_continue(&mut self, view: &GameStateView, bust_sum: u32, limit: u32) -> bool;

    /// How many chips to draw into the palm (at least 1)
    fn choose_draw_count(&mut self, _view: &GameStateView) -> usize {
        1
    }

    /// Pick the palm chip to commit, or return the whole palm when allowed
    fn choose_palm_action(
        &mut self,
        view: &GameStateView,
        palm: &[ChipId],
        allow_return: bool,
    ) -> PalmChoice;

    /// Spend the potion to undo committing this bust-color chip?
    fn use_potion(&mut self, view: &GameStateView, chip: ChipId) -> bool;

    /// Return this first chip of the card's color to the bag?
    fn return_first_chip(&mut self, view: &GameStateView, chip: ChipId) -> bool;

    /// A committed chip lets you pull `preceding` out of the pot. Do it?
    fn remove_preceding_chip(
        &mut self,
        view: &GameStateView,
        placed: ChipId,
        preceding: ChipId,
    ) -> bool;

    /// Pick one of the options an event card offers (index into `options`)
    fn choose_event_option(
        &mut self,
        view: &GameStateView,
        card: &EventCard,
        options: &[EventOption],
    ) -> usize;

    /// Pick one offer to buy, or `None` to stop shopping
    fn choose_purchase(&mut self, view: &GameStateView, offers: &[ShopOffer]) -> Option<usize>;

    /// Next resource trade action
    fn choose_ruby_trade(&mut self, view: &GameStateView) -> RubyTrade;

    /// Acknowledge a confirmation gate
    fn acknowledge(&mut self, _view: &GameStateView, _message: &str) -> bool {
        true
    }

    /// Called when the game ends (for cleanup/logging)
    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}

/// Find the controller seated for `player`
pub fn controller_for(
    controllers: &mut [Box<dyn PlayerController>],
    player: PlayerId,
) -> Result<&mut Box<dyn PlayerController>> {
    controllers
        .iter_mut()
        .find(|c| c.player_id() == player)
        .ok_or(GameError::NoControllerForPlayer(player))
}

/// Unanimous confirmation gate: blocks until every listed player has
/// acknowledged `message`
pub fn confirm_all(
    game: &GameState,
    controllers: &mut [Box<dyn PlayerController>],
    players: &[PlayerId],
    message: &str,
) -> Result<()> {
    game.logger
        .verbose(LogCategory::Confirm, &format!("[CONFIRM-ALL] {message}"));
    for &player in players {
        let controller = controller_for(controllers, player)?;
        let view = GameStateView::new(game, player);
        while !controller.acknowledge(&view, message) {
            game.logger.verbose(
                LogCategory::Confirm,
                &format!("Player {player} has not confirmed yet"),
            );
        }
    }
    Ok(())
}
