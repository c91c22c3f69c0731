//! Fixed script controller for deterministic testing
//!
//! This controller follows a predetermined sequence of numbers, making it
//! handy for command-line replays (`--p1-fixed-inputs "1,0,1,0"`). Once the
//! script is exhausted, every answer is 0.

use crate::core::{ChipId, EventCard, PlayerId};
use crate::game::controller::{
    EventOption, GameStateView, PalmChoice, PlayerController, RubyTrade, ShopOffer,
};

/// A controller that follows a fixed script of numeric choices
///
/// How each number is read:
/// - yes/no questions: 0 = no, anything else = yes
/// - draw count: the number itself, with 0 meaning 1
/// - palm: the index to commit; `palm.len()` returns the whole palm when allowed
/// - purchase: 0 = stop, N = offer N-1
/// - ruby trade: 0 = done, 1 = advance track, 2 = refill potion
///
/// Confirmation gates are always acknowledged and do not consume the script.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FixedScriptController {
    player_id: PlayerId,
    /// The predetermined sequence of choices
    script: Vec<usize>,
    /// Current position in the script
    pub current_index: usize,
}

impl FixedScriptController {
    /// Create a new scripted controller with a predetermined sequence of choices
    ///
    /// # Example
    /// ```
    /// use cauldron::game::FixedScriptController;
    /// use cauldron::core::PlayerId;
    ///
    /// let controller = FixedScriptController::new(
    ///     PlayerId::new(0),
    ///     vec![0, 1, 0, 0], // no rat tails, draw, commit palm[0], stop
    /// );
    /// ```
    pub fn new(player_id: PlayerId, script: Vec<usize>) -> Self {
        FixedScriptController {
            player_id,
            script,
            current_index: 0,
        }
    }

    /// Parse a comma or whitespace separated list of numbers
    pub fn parse_script(text: &str) -> crate::Result<Vec<usize>> {
        text.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>().map_err(|_| {
                    crate::GameError::InvalidConfig(format!("invalid script entry '{s}'"))
                })
            })
            .collect()
    }

    /// Get the next choice from the script, or 0 if the script is exhausted
    fn next_choice(&mut self) -> usize {
        if self.current_index < self.script.len() {
            let choice = self.script[self.current_index];
            self.current_index += 1;
            choice
        } else {
            0
        }
    }

    fn next_yes(&mut self) -> bool {
        self.next_choice() != 0
    }
}

impl PlayerController for FixedScriptController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_pre_draw_count(&mut self, _view: &GameStateView) -> u32 {
        u32::try_from(self.next_choice()).unwrap_or(u32::MAX)
    }

    fn wants_to_continue(&mut self, _view: &GameStateView, _bust_sum: u32, _limit: u32) -> bool {
        self.next_yes()
    }

    fn choose_draw_count(&mut self, _view: &GameStateView) -> usize {
        self.next_choice().max(1)
    }

    fn choose_palm_action(
        &mut self,
        _view: &GameStateView,
        palm: &[ChipId],
        allow_return: bool,
    ) -> PalmChoice {
        let choice = self.next_choice();
        if allow_return && choice == palm.len() {
            PalmChoice::ReturnAll
        } else {
            PalmChoice::Commit(choice)
        }
    }

    fn use_potion(&mut self, _view: &GameStateView, _chip: ChipId) -> bool {
        self.next_yes()
    }

    fn return_first_chip(&mut self, _view: &GameStateView, _chip: ChipId) -> bool {
        self.next_yes()
    }

    fn remove_preceding_chip(
        &mut self,
        _view: &GameStateView,
        _placed: ChipId,
        _preceding: ChipId,
    ) -> bool {
        self.next_yes()
    }

    fn choose_event_option(
        &mut self,
        _view: &GameStateView,
        _card: &EventCard,
        _options: &[EventOption],
    ) -> usize {
        self.next_choice()
    }

    fn choose_purchase(&mut self, _view: &GameStateView, offers: &[ShopOffer]) -> Option<usize> {
        if offers.is_empty() {
            // Nothing to choose from, don't consume the script
            return None;
        }
        match self.next_choice() {
            0 => None,
            n => Some(n - 1),
        }
    }

    fn choose_ruby_trade(&mut self, _view: &GameStateView) -> RubyTrade {
        match self.next_choice() {
            1 => RubyTrade::AdvanceTrack,
            2 => RubyTrade::RefillPotion,
            _ => RubyTrade::Done,
        }
    }
}
