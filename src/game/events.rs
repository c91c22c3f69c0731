//! Event card system
//!
//! One card is drawn per round, without replacement. One-shot cards run their
//! effect immediately; round-modifier cards become the active modifier and
//! are consulted through the extension points below until the next round
//! starts. Every table is keyed by card id. A one-shot card without a handler
//! falls back to manual resolution, and a modifier without an entry in an
//! extension table changes nothing.

use crate::core::{ChipTypeId, Color, EventCard, EventKind, EventScope, PlayerId};
use crate::game::bonus_die::roll_bonus_die;
use crate::game::controller::{
    confirm_all, controller_for, EventOption, GameStateView, PlayerController, MAX_PROMPTS,
};
use crate::game::logger::LogCategory;
use crate::game::GameState;
use crate::{GameError, Result};
use rand::{Rng, RngCore};
use rustc_hash::FxHashMap;

/// Everything a one-shot effect may touch
pub struct EventEnv<'e> {
    pub game: &'e mut GameState,
    pub controllers: &'e mut [Box<dyn PlayerController>],
    pub rng: &'e mut dyn RngCore,
}

impl<'e> EventEnv<'e> {
    pub fn players(&self) -> Vec<PlayerId> {
        self.game.player_ids()
    }
}

/// Coins and score granted by the scoring phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardDelta {
    pub coins: u32,
    pub score: u32,
}

pub type OneShotEffect = fn(&mut EventEnv<'_>, &EventCard) -> Result<()>;
/// `(card, default limit) -> limit`
pub type DrawLimitRule = fn(&EventCard, u32) -> u32;
/// `(card, base gain, landed on a ruby field) -> gain`
pub type RubyRule = fn(&EventCard, u32, bool) -> u32;
/// `(card, base reward, landed on a ruby field) -> reward`
pub type ScoreRule = fn(&EventCard, RewardDelta, bool) -> RewardDelta;

/// Event card dispatch tables
#[derive(Clone)]
pub struct EventRules {
    one_shot: FxHashMap<String, OneShotEffect>,
    draw_limit_rules: FxHashMap<String, DrawLimitRule>,
    ruby_rules: FxHashMap<String, RubyRule>,
    score_rules: FxHashMap<String, ScoreRule>,
    /// Cards that let each player send back the first committed chip of a color
    first_return_rules: FxHashMap<String, Color>,
}

impl std::fmt::Debug for EventRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut one_shot: Vec<_> = self.one_shot.keys().collect();
        one_shot.sort();
        f.debug_struct("EventRules")
            .field("one_shot", &one_shot)
            .field("draw_limit_rules", &self.draw_limit_rules.len())
            .field("ruby_rules", &self.ruby_rules.len())
            .field("score_rules", &self.score_rules.len())
            .field("first_return_rules", &self.first_return_rules)
            .finish()
    }
}

impl Default for EventRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl EventRules {
    pub fn empty() -> Self {
        EventRules {
            one_shot: FxHashMap::default(),
            draw_limit_rules: FxHashMap::default(),
            ruby_rules: FxHashMap::default(),
            score_rules: FxHashMap::default(),
            first_return_rules: FxHashMap::default(),
        }
    }

    /// Handlers for the cards of the standard deck that have one
    pub fn standard() -> Self {
        let mut rules = Self::empty();
        rules.register_one_shot("EV02", pot_filling_up);
        rules.register_one_shot("EV03", donations);
        rules.register_one_shot("EV07", beginners_bonus);
        rules.register_one_shot("EV12", alms);
        rules.register_one_shot("EV13", choose_track_or_purple);
        rules.register_one_shot("EV14", choose_track_or_purple);
        rules.register_first_return("EV15", Color::BUST);
        rules.register_draw_limit("EV20", |_, _| 9);
        rules.register_score("EV23", |_, reward, landed_on_ruby| RewardDelta {
            score: reward.score + if landed_on_ruby { 2 } else { 0 },
            ..reward
        });
        rules.register_ruby("EV25", |_, gain, landed_on_ruby| {
            gain + u32::from(landed_on_ruby)
        });
        rules
    }

    pub fn register_one_shot(&mut self, card_id: &str, effect: OneShotEffect) {
        self.one_shot.insert(card_id.to_string(), effect);
    }

    pub fn register_draw_limit(&mut self, card_id: &str, rule: DrawLimitRule) {
        self.draw_limit_rules.insert(card_id.to_string(), rule);
    }

    pub fn register_ruby(&mut self, card_id: &str, rule: RubyRule) {
        self.ruby_rules.insert(card_id.to_string(), rule);
    }

    pub fn register_score(&mut self, card_id: &str, rule: ScoreRule) {
        self.score_rules.insert(card_id.to_string(), rule);
    }

    pub fn register_first_return(&mut self, card_id: &str, color: Color) {
        self.first_return_rules.insert(card_id.to_string(), color);
    }

    /// Execute a one-shot card now.
    ///
    /// Without a registered handler the card is resolved by hand: the log says
    /// so, and the players (each one for per-player cards, everyone at once
    /// otherwise) must acknowledge having resolved it.
    pub fn resolve_one_shot(&self, env: &mut EventEnv<'_>, card: &EventCard) -> Result<()> {
        env.game.logger.normal(
            LogCategory::Event,
            &format!(
                "[ONE-SHOT EVENT] Executing {} - {} (scope={})",
                card.card_id, card.title, card.scope
            ),
        );

        let Some(effect) = self.one_shot.get(&card.card_id) else {
            env.game.logger.normal(
                LogCategory::Event,
                &format!(
                    "[ONE-SHOT EVENT] No implementation registered for {}, resolve manually",
                    card.card_id
                ),
            );
            let players = env.players();
            match card.scope {
                EventScope::PerPlayer => {
                    for player in players {
                        confirm_all(
                            env.game,
                            env.controllers,
                            &[player],
                            &format!("Player {player}: resolve {} manually", card.card_id),
                        )?;
                    }
                }
                EventScope::Global => {
                    confirm_all(
                        env.game,
                        env.controllers,
                        &players,
                        &format!("Resolve {} (global) manually. Confirm when done.", card.card_id),
                    )?;
                }
            }
            env.game.logger.normal(
                LogCategory::Event,
                &format!("[ONE-SHOT EVENT] Completed (manual) {}", card.card_id),
            );
            return Ok(());
        };

        effect(env, card)?;
        env.game.logger.normal(
            LogCategory::Event,
            &format!("[ONE-SHOT EVENT] Completed {}", card.card_id),
        );
        Ok(())
    }

    /// Make `card` the active modifier for this round
    pub fn activate_modifier(&self, game: &mut GameState, card: &EventCard, round: u32) {
        game.active_modifier = Some(card.clone());
        game.logger.normal(
            LogCategory::Event,
            &format!(
                "[ROUND MODIFIER] {} - {} is active for the rest of round {round}",
                card.card_id, card.title
            ),
        );
    }

    /// Log that the active modifier (if any) is in force for a phase
    pub fn note_phase(&self, game: &GameState, phase: crate::game::phase::PhaseId) {
        if let Some(card) = active_modifier(game) {
            game.logger.verbose(
                LogCategory::Event,
                &format!(
                    "[ROUND MODIFIER] {} - {} is active for phase: {phase}",
                    card.card_id, card.title
                ),
            );
        }
    }

    /// Bust limit for this round's drawing
    pub fn draw_limit(&self, game: &GameState, default_limit: u32) -> u32 {
        active_modifier(game)
            .and_then(|card| {
                self.draw_limit_rules
                    .get(&card.card_id)
                    .map(|rule| rule(card, default_limit))
            })
            .unwrap_or(default_limit)
    }

    /// Rubies granted in the ruby phase
    pub fn ruby_gain(&self, game: &GameState, base_gain: u32, landed_on_ruby: bool) -> u32 {
        active_modifier(game)
            .and_then(|card| {
                self.ruby_rules
                    .get(&card.card_id)
                    .map(|rule| rule(card, base_gain, landed_on_ruby))
            })
            .unwrap_or(base_gain)
    }

    /// Coins and score granted in the scoring phase
    pub fn score_gain(
        &self,
        game: &GameState,
        base: RewardDelta,
        landed_on_ruby: bool,
    ) -> RewardDelta {
        active_modifier(game)
            .and_then(|card| {
                self.score_rules
                    .get(&card.card_id)
                    .map(|rule| rule(card, base, landed_on_ruby))
            })
            .unwrap_or(base)
    }

    /// Color whose first committed chip may be sent back this round
    pub fn first_return_color(&self, game: &GameState) -> Option<Color> {
        active_modifier(game).and_then(|card| self.first_return_rules.get(&card.card_id).copied())
    }
}

/// The active card, if it really is a round modifier
fn active_modifier(game: &GameState) -> Option<&EventCard> {
    game.active_modifier
        .as_ref()
        .filter(|card| card.kind == EventKind::RoundModifier)
}

impl GameState {
    /// Draw a uniformly random card from the deck into the discard pile.
    ///
    /// Returns `None` once the deck is empty.
    pub fn draw_event_card(&mut self, rng: &mut dyn RngCore) -> Option<EventCard> {
        if self.event_deck.is_empty() {
            self.current_event = None;
            return None;
        }
        let index = rng.gen_range(0..self.event_deck.len());
        let card = self.event_deck.remove(index);
        self.event_discard.push(card.clone());
        self.current_event = Some(card.clone());
        Some(card)
    }
}

/// Ask for an event option, re-prompting on out-of-range answers
fn ask_event_option(
    env: &mut EventEnv<'_>,
    player: PlayerId,
    card: &EventCard,
    options: &[EventOption],
) -> Result<EventOption> {
    let controller = controller_for(env.controllers, player)?;
    for _ in 0..MAX_PROMPTS {
        let view = GameStateView::new(env.game, player);
        let choice = controller.choose_event_option(&view, card, options);
        if let Some(option) = options.get(choice) {
            env.game
                .logger
                .controller_choice(player, &format!("chose to {option}"));
            return Ok(*option);
        }
        env.game.logger.normal(
            LogCategory::Decision,
            &format!("Player {player}: option {choice} is out of range, choose again"),
        );
    }
    let fallback = options[0];
    env.game.logger.normal(
        LogCategory::Decision,
        &format!("Player {player}: no valid option given, using '{fallback}'"),
    );
    Ok(fallback)
}

/// EV02: every player's track position moves forward one space
fn pot_filling_up(env: &mut EventEnv<'_>, card: &EventCard) -> Result<()> {
    for player in env.players() {
        let state = env.game.player_mut(player)?;
        state.advance_track(1);
        let pos = state.track_pos;
        env.game.logger.normal(
            LogCategory::Event,
            &format!("[{}] Player {player}: track position now {pos}", card.card_id),
        );
    }
    Ok(())
}

/// EV03: everyone rolls the bonus die once
fn donations(env: &mut EventEnv<'_>, _card: &EventCard) -> Result<()> {
    for player in env.players() {
        roll_bonus_die(env.game, player, env.rng)?;
    }
    Ok(())
}

/// EV07: the player(s) with the lowest score take a green 1-chip
fn beginners_bonus(env: &mut EventEnv<'_>, card: &EventCard) -> Result<()> {
    let lowest = env.game.players.iter().map(|p| p.score).min().unwrap_or(0);
    let targets: Vec<PlayerId> = env
        .game
        .players
        .iter()
        .filter(|p| p.score == lowest)
        .map(|p| p.id)
        .collect();

    for player in targets {
        match env
            .game
            .take_type_from_supply(player, ChipTypeId::new(Color::Green, 1))
        {
            Ok(chip) => {
                let described = env.game.describe_chip(chip);
                env.game.logger.normal(
                    LogCategory::Event,
                    &format!("[{}] Player {player} (score {lowest}) takes {described}", card.card_id),
                );
            }
            Err(GameError::SupplyExhausted(_)) => {
                env.game.logger.normal(
                    LogCategory::Event,
                    &format!("[{}] Player {player}: no green 1-chip left in supply", card.card_id),
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// EV12: the player(s) with the fewest rubies gain one
fn alms(env: &mut EventEnv<'_>, card: &EventCard) -> Result<()> {
    let fewest = env.game.players.iter().map(|p| p.rubies).min().unwrap_or(0);
    let mut targets = Vec::new();
    for state in env.game.players.iter_mut().filter(|p| p.rubies == fewest) {
        state.add_rubies(1);
        targets.push(state.id.to_string());
    }
    env.game.logger.normal(
        LogCategory::Event,
        &format!(
            "[{}] Alms: fewest rubies={fewest} -> players [{}] gain +1 ruby",
            card.card_id,
            targets.join(", ")
        ),
    );
    Ok(())
}

/// EV13 / EV14: each player moves their track two spaces or takes a purple
/// chip. With no purple chip left the track option is applied instead.
fn choose_track_or_purple(env: &mut EventEnv<'_>, card: &EventCard) -> Result<()> {
    const TRACK_STEPS: u32 = 2;
    let options = [
        EventOption::AdvanceTrack(TRACK_STEPS),
        EventOption::TakeChip(Color::Purple),
    ];

    for player in env.players() {
        let option = ask_event_option(env, player, card, &options)?;
        let steps = match option {
            EventOption::AdvanceTrack(steps) => Some(steps),
            EventOption::TakeChip(color) => match env.game.take_from_supply(player, color) {
                Ok(chip) => {
                    let described = env.game.describe_chip(chip);
                    env.game.logger.normal(
                        LogCategory::Event,
                        &format!("[{}] Player {player}: took {described} from supply into bag", card.card_id),
                    );
                    None
                }
                Err(GameError::SupplyExhausted(_)) => {
                    env.game.logger.normal(
                        LogCategory::Event,
                        &format!(
                            "[{}] Player {player}: no {color} chip left in supply, moving track +{TRACK_STEPS} instead",
                            card.card_id
                        ),
                    );
                    Some(TRACK_STEPS)
                }
                Err(e) => return Err(e),
            },
        };

        if let Some(steps) = steps {
            let state = env.game.player_mut(player)?;
            state.advance_track(steps);
            let pos = state.track_pos;
            env.game.logger.normal(
                LogCategory::Event,
                &format!("[{}] Player {player}: track position now {pos}", card.card_id),
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::scripted_controller::{Answer, ScriptedController};
    use crate::game::state::small_game;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn card(id: &str, kind: EventKind, scope: EventScope) -> EventCard {
        EventCard::new(id, kind, scope, format!("Card {id}"), "")
    }

    fn controllers(answers: [Vec<Answer>; 2]) -> Vec<Box<dyn PlayerController>> {
        let [a, b] = answers;
        vec![
            Box::new(ScriptedController::new(PlayerId::new(0), a)),
            Box::new(ScriptedController::new(PlayerId::new(1), b)),
        ]
    }

    #[test]
    fn test_draw_without_replacement() {
        let mut game = small_game();
        game.event_deck = vec![
            card("EV12", EventKind::OneShot, EventScope::Global),
            card("EV20", EventKind::RoundModifier, EventScope::Global),
        ];
        let mut rng = ChaCha12Rng::seed_from_u64(3);

        let first = game.draw_event_card(&mut rng).unwrap();
        let second = game.draw_event_card(&mut rng).unwrap();
        assert_ne!(first.card_id, second.card_id);
        assert!(game.draw_event_card(&mut rng).is_none());
        assert_eq!(game.event_discard.len(), 2);
        assert!(game.current_event.is_none());
    }

    #[test]
    fn test_alms_goes_to_fewest() {
        let mut game = small_game();
        game.player_mut(PlayerId::new(0)).unwrap().rubies = 3;
        game.player_mut(PlayerId::new(1)).unwrap().rubies = 1;
        let mut ctrls = controllers([vec![], vec![]]);
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let rules = EventRules::standard();

        let mut env = EventEnv {
            game: &mut game,
            controllers: &mut ctrls,
            rng: &mut rng,
        };
        rules
            .resolve_one_shot(&mut env, &card("EV12", EventKind::OneShot, EventScope::Global))
            .unwrap();
        assert_eq!(game.player(PlayerId::new(0)).unwrap().rubies, 3);
        assert_eq!(game.player(PlayerId::new(1)).unwrap().rubies, 2);
    }

    #[test]
    fn test_choose_wisely_falls_back_to_track_without_purple() {
        let mut game = small_game();
        let mut ctrls = controllers([vec![Answer::EventOption(1)], vec![Answer::EventOption(0)]]);
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let rules = EventRules::standard();

        let mut env = EventEnv {
            game: &mut game,
            controllers: &mut ctrls,
            rng: &mut rng,
        };
        rules
            .resolve_one_shot(&mut env, &card("EV13", EventKind::OneShot, EventScope::PerPlayer))
            .unwrap();
        // No purple chips in this pool: both players end up with +2
        assert_eq!(game.player(PlayerId::new(0)).unwrap().track_pos, 2);
        assert_eq!(game.player(PlayerId::new(1)).unwrap().track_pos, 2);
        assert_eq!(game.supply().len(), 5);
    }

    #[test]
    fn test_unregistered_one_shot_is_resolved_manually() {
        let mut game = small_game();
        let mut ctrls = controllers([vec![], vec![]]);
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let rules = EventRules::standard();

        let mut env = EventEnv {
            game: &mut game,
            controllers: &mut ctrls,
            rng: &mut rng,
        };
        rules
            .resolve_one_shot(&mut env, &card("EV05", EventKind::OneShot, EventScope::PerPlayer))
            .unwrap();
        let messages = game.logger.messages();
        assert!(messages.iter().any(|m| m.contains("No implementation registered for EV05")));
        assert!(messages.iter().any(|m| m.contains("Completed (manual) EV05")));
    }

    #[test]
    fn test_modifier_extension_points() {
        let mut game = small_game();
        let rules = EventRules::standard();
        assert_eq!(rules.draw_limit(&game, 7), 7);

        rules.activate_modifier(
            &mut game,
            &card("EV20", EventKind::RoundModifier, EventScope::Global),
            1,
        );
        assert_eq!(rules.draw_limit(&game, 7), 9);
        assert_eq!(rules.ruby_gain(&game, 1, true), 1);

        game.active_modifier = Some(card("EV25", EventKind::RoundModifier, EventScope::Global));
        assert_eq!(rules.ruby_gain(&game, 1, true), 2);
        assert_eq!(rules.ruby_gain(&game, 0, false), 0);

        game.active_modifier = Some(card("EV23", EventKind::RoundModifier, EventScope::Global));
        let base = RewardDelta { coins: 3, score: 1 };
        assert_eq!(
            rules.score_gain(&game, base, true),
            RewardDelta { coins: 3, score: 3 }
        );
        assert_eq!(rules.score_gain(&game, base, false), base);

        game.active_modifier = Some(card("EV15", EventKind::RoundModifier, EventScope::Global));
        assert_eq!(rules.first_return_color(&game), Some(Color::Gray));
    }

    #[test]
    fn test_one_shot_card_is_not_a_modifier() {
        let mut game = small_game();
        let rules = EventRules::standard();
        game.active_modifier = Some(card("EV20", EventKind::OneShot, EventScope::Global));
        assert_eq!(rules.draw_limit(&game, 7), 7);
    }
}
