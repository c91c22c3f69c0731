//! Game loop implementation
//!
//! Runs the fixed round structure: every round walks the phase list in order,
//! checks each phase's round-context prerequisites, and always finishes with
//! cleanup (palm and pot back into the bags) and an integrity check, however
//! far the phases got.

use crate::core::{ChipTypeId, Color, PlayerId};
use crate::game::bonus_die::roll_bonus_die;
use crate::game::controller::{
    confirm_all, controller_for, GameStateView, PlayerController, RubyTrade, ShopOffer,
    MAX_PROMPTS,
};
use crate::game::drawing::Drawing;
use crate::game::effects::ChipRules;
use crate::game::events::{EventEnv, EventRules, RewardDelta};
use crate::game::logger::LogCategory;
use crate::game::phase::{ContextKey, PhaseId, ROUND_PHASES};
use crate::game::round_context::{DrawResult, RoundContext};
use crate::game::GameState;
use crate::zones::Zone;
use crate::{GameError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Verbosity level for game output
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - explosions and the final standings
    Minimal = 1,
    /// Normal - phases, chip moves, rewards, and decisions (default)
    #[default]
    Normal = 2,
    /// Verbose - confirmation gates, rule lookups, and every zone transition
    Verbose = 3,
}

/// One line of the final standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerId,
    pub name: String,
    pub score: u32,
    pub coins: u32,
    pub rubies: u32,
}

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Players sharing the top score (ties broken by coins)
    pub winners: Vec<PlayerId>,
    /// Total number of rounds played
    pub rounds_played: u32,
    /// Every player, best first
    pub standings: Vec<Standing>,
}

/// Round driver
///
/// Owns the random source, the rule tables, and the round settings; borrows
/// the game state for the duration of the game.
pub struct GameLoop<'a> {
    /// The game state
    pub game: &'a mut GameState,
    rng: ChaCha12Rng,
    rounds: u32,
    /// Bust limit before round modifiers
    draw_limit: u32,
    allow_palm_return: bool,
    chip_rules: ChipRules,
    event_rules: EventRules,
    ruby_trade_cost: u32,
    max_purchases: usize,
    prices: BTreeMap<ChipTypeId, u32>,
    rounds_played: u32,
}

impl<'a> GameLoop<'a> {
    /// Create a new game loop for the given game state.
    ///
    /// Every random outcome of the game comes from `seed`.
    pub fn new(game: &'a mut GameState, seed: u64) -> Self {
        GameLoop {
            game,
            rng: ChaCha12Rng::seed_from_u64(seed),
            rounds: 9,
            draw_limit: 7,
            allow_palm_return: false,
            chip_rules: ChipRules::standard(),
            event_rules: EventRules::standard(),
            ruby_trade_cost: 2,
            max_purchases: 2,
            prices: BTreeMap::new(),
            rounds_played: 0,
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the bust limit used when no round modifier overrides it
    pub fn with_draw_limit(mut self, limit: u32) -> Self {
        self.draw_limit = limit;
        self
    }

    /// Let players return the whole palm instead of committing a chip
    pub fn with_palm_return(mut self, allow: bool) -> Self {
        self.allow_palm_return = allow;
        self
    }

    /// Set verbosity level for output
    ///
    /// This sets the verbosity on the game's centralized logger, which is
    /// accessed by controllers via GameStateView.
    pub fn with_verbosity(self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    /// Shop price table. Chip types without a price are never offered.
    pub fn with_prices(mut self, prices: BTreeMap<ChipTypeId, u32>) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_chip_rules(mut self, rules: ChipRules) -> Self {
        self.chip_rules = rules;
        self
    }

    pub fn with_event_rules(mut self, rules: EventRules) -> Self {
        self.event_rules = rules;
        self
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Run every round with the given player controllers
    ///
    /// Needs one controller per player. A fatal error aborts the game after
    /// the failing round has been cleaned up.
    pub fn run_game(
        &mut self,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<GameResult> {
        let players = self.game.player_ids();
        for &player in &players {
            controller_for(controllers, player)?;
        }

        self.game.logger.normal(
            LogCategory::Setup,
            &format!(
                "GAME START: players={}, rounds={}, draw_limit={}",
                players.len(),
                self.rounds,
                self.draw_limit
            ),
        );
        confirm_all(
            self.game,
            controllers,
            &players,
            "Game start confirmed. Begin round 1?",
        )?;

        for round in 1..=self.rounds {
            self.run_round(round, controllers)?;
        }

        let result = self.final_standings()?;
        for controller in controllers.iter_mut() {
            let player = controller.player_id();
            let view = GameStateView::new(self.game, player);
            controller.on_game_end(&view, result.winners.contains(&player));
        }
        Ok(result)
    }

    /// Run one round: every phase in order, then cleanup
    ///
    /// Cleanup runs even when a phase fails; the phase error is reported
    /// after it.
    pub fn run_round(
        &mut self,
        round: u32,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let mut ctx = RoundContext::new(round, self.allow_palm_return);
        ctx.draw_limit = Some(self.draw_limit);

        let mut outcome = Ok(());
        for phase in ROUND_PHASES {
            outcome = self.run_phase(phase, &mut ctx, controllers);
            if outcome.is_err() {
                break;
            }
        }

        let cleanup = self.cleanup_round(round);
        outcome?;
        cleanup?;
        self.game.validate_locations()?;
        self.rounds_played += 1;
        Ok(())
    }

    /// Run a single phase after checking its prerequisites
    pub fn run_phase(
        &mut self,
        phase: PhaseId,
        ctx: &mut RoundContext,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        for &key in phase.requires() {
            if !ctx.has(key) {
                return Err(GameError::PhasePrerequisiteMissing { phase, key });
            }
        }
        self.game.logger.verbose(
            LogCategory::Phase,
            &format!("Round {}: phase {phase}", ctx.round),
        );
        self.event_rules.note_phase(self.game, phase);

        match phase {
            PhaseId::Start => self.start_phase(ctx),
            PhaseId::EventCard => self.event_card_phase(ctx, controllers),
            PhaseId::PreDraw => self.pre_draw_phase(ctx, controllers),
            PhaseId::Drawing => self.drawing_phase(ctx, controllers),
            PhaseId::WinnerRoll => self.winner_roll_phase(ctx, controllers),
            PhaseId::Evaluation => self.evaluation_phase(controllers),
            PhaseId::Rubies => self.rubies_phase(ctx, controllers),
            PhaseId::Scoring => self.scoring_phase(ctx, controllers),
            PhaseId::Purchase => self.purchase_phase(controllers),
            PhaseId::ResourceTrade => self.resource_trade_phase(controllers),
        }
    }

    fn start_phase(&mut self, ctx: &RoundContext) -> Result<()> {
        self.game.current_event = None;
        self.game.active_modifier = None;

        self.game.logger.normal(
            LogCategory::Phase,
            &format!("=== ROUND {}/{} - START ===", ctx.round, self.rounds),
        );
        self.log_player_table(&format!("PLAYER STATE - Round {} start", ctx.round))
    }

    fn event_card_phase(
        &mut self,
        ctx: &RoundContext,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let players = self.game.player_ids();
        let Some(card) = self.game.draw_event_card(&mut self.rng) else {
            self.game.logger.normal(
                LogCategory::Event,
                &format!("[EVENT CARD] Round {}: No cards left in deck.", ctx.round),
            );
            return confirm_all(
                self.game,
                controllers,
                &players,
                "No event card available. Proceed?",
            );
        };

        self.game.logger.normal(
            LogCategory::Event,
            &format!("[EVENT CARD] Round {}: Drew {card}", ctx.round),
        );
        if !card.description.is_empty() {
            self.game.logger.normal(
                LogCategory::Event,
                &format!("[EVENT CARD] Description: {}", card.description),
            );
        }
        confirm_all(self.game, controllers, &players, "Event card acknowledged.")?;

        if card.is_one_shot() {
            let mut env = EventEnv {
                game: &mut *self.game,
                controllers: &mut *controllers,
                rng: &mut self.rng,
            };
            self.event_rules.resolve_one_shot(&mut env, &card)?;
            confirm_all(
                self.game,
                controllers,
                &players,
                "One-shot event resolved. Proceed to pre-draw?",
            )
        } else {
            self.event_rules
                .activate_modifier(self.game, &card, ctx.round);
            confirm_all(
                self.game,
                controllers,
                &players,
                "Round modifier is active. Proceed to pre-draw?",
            )
        }
    }

    fn pre_draw_phase(
        &mut self,
        ctx: &mut RoundContext,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let players = self.game.player_ids();
        let mut counts = FxHashMap::default();
        for &player in &players {
            let controller = controller_for(controllers, player)?;
            let count = ask_pre_draw_count(self.game, controller.as_mut(), player);
            self.game
                .logger
                .controller_choice(player, &format!("chose a pre-draw bonus of {count}"));
            counts.insert(player, count);
        }
        ctx.pre_draw_counts = Some(counts);
        confirm_all(
            self.game,
            controllers,
            &players,
            "Pre-draw done. Proceed to drawing phase?",
        )
    }

    fn drawing_phase(
        &mut self,
        ctx: &mut RoundContext,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let players = self.game.player_ids();
        let default_limit = ctx.draw_limit.unwrap_or(self.draw_limit);
        let limit = self.event_rules.draw_limit(self.game, default_limit);
        if limit != default_limit {
            self.game.logger.normal(
                LogCategory::Event,
                &format!("[ROUND MODIFIER] Bust limit this round: {limit} (default {default_limit})"),
            );
        }
        ctx.draw_limit = Some(limit);

        self.log_player_table(&format!("PLAYER STATE - Round {} before drawing", ctx.round))?;

        let drawing = Drawing {
            rules: &self.chip_rules,
            limit,
            first_return: self.event_rules.first_return_color(self.game),
        };
        let mut results = Vec::with_capacity(players.len());
        for &player in &players {
            let controller = controller_for(controllers, player)?;
            let result = drawing.run(
                &mut *self.game,
                controller.as_mut(),
                ctx,
                player,
                &mut self.rng,
            )?;
            results.push(result);
        }
        ctx.draw_results = Some(results);

        confirm_all(
            self.game,
            controllers,
            &players,
            "Drawing done for all. Proceed to winner roll?",
        )
    }

    fn winner_roll_phase(
        &mut self,
        ctx: &mut RoundContext,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let results = drawing_results(ctx, PhaseId::WinnerRoll)?;
        let winners = round_winners(&results);
        let best = results
            .iter()
            .filter(|r| winners.contains(&r.player))
            .map(|r| r.pos_last)
            .max()
            .unwrap_or(0);
        self.game.logger.normal(
            LogCategory::Reward,
            &format!(
                "[WINNER] Winner(s) of the drawing phase: {} (max POS_LAST={best})",
                join_players(&winners)
            ),
        );

        for &winner in &winners {
            let roll = roll_bonus_die(self.game, winner, &mut self.rng)?;
            ctx.dice_results.push((winner, roll));
        }

        let players = self.game.player_ids();
        confirm_all(
            self.game,
            controllers,
            &players,
            "Winner roll resolved. Proceed to evaluation?",
        )
    }

    fn evaluation_phase(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> Result<()> {
        let players = self.game.player_ids();
        for &player in &players {
            self.chip_rules.apply_eval_effects(self.game, player)?;
        }
        confirm_all(
            self.game,
            controllers,
            &players,
            "Evaluation done. Proceed to ruby distribution?",
        )
    }

    fn rubies_phase(
        &mut self,
        ctx: &RoundContext,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let results = drawing_results(ctx, PhaseId::Rubies)?;
        self.game.logger.normal(
            LogCategory::Reward,
            "[RUBIES] Distributing rubies based on landing fields.",
        );

        for result in &results {
            let base = u32::from(result.landing.ruby);
            let gain = self
                .event_rules
                .ruby_gain(self.game, base, result.landing.ruby);
            let state = self.game.player_mut(result.player)?;
            state.add_rubies(gain);
            let total = state.rubies;
            let message = if result.landing.ruby {
                format!(
                    "Player {}: landed on RUBY field -> +{gain} ruby (now {total})",
                    result.player
                )
            } else {
                format!(
                    "Player {}: no ruby field -> +{gain} rubies (now {total})",
                    result.player
                )
            };
            self.game.logger.normal(LogCategory::Reward, &message);
        }

        let players = self.game.player_ids();
        confirm_all(
            self.game,
            controllers,
            &players,
            "Rubies resolved. Proceed to scoring?",
        )
    }

    fn scoring_phase(
        &mut self,
        ctx: &RoundContext,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let results = drawing_results(ctx, PhaseId::Scoring)?;
        self.game.logger.normal(
            LogCategory::Reward,
            "[SCORING] Adding landing rewards (coins + score).",
        );

        for result in &results {
            let base = RewardDelta {
                coins: result.landing.coins,
                score: result.landing.score,
            };
            let gain = self
                .event_rules
                .score_gain(self.game, base, result.landing.ruby);
            let state = self.game.player_mut(result.player)?;
            state.add_coins(gain.coins);
            state.add_score(gain.score);
            let (coins, score) = (state.coins, state.score);
            self.game.logger.normal(
                LogCategory::Reward,
                &format!(
                    "Player {}: +{} coins, +{} score => coins={coins}, score={score}",
                    result.player, gain.coins, gain.score
                ),
            );
        }

        let players = self.game.player_ids();
        confirm_all(
            self.game,
            controllers,
            &players,
            "Scoring acknowledged. Proceed to purchase phase?",
        )
    }

    fn purchase_phase(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> Result<()> {
        let players = self.game.player_ids();
        for &player in &players {
            let controller = controller_for(controllers, player)?;
            let mut bought: Vec<Color> = Vec::new();

            while bought.len() < self.max_purchases {
                let offers = self.shop_offers(player, &bought)?;
                if offers.is_empty() {
                    self.game.logger.normal(
                        LogCategory::Reward,
                        &format!("[SHOP] Player {player}: nothing affordable left"),
                    );
                    break;
                }

                let Some(offer) = ask_purchase(self.game, controller.as_mut(), player, &offers)
                else {
                    self.game
                        .logger
                        .controller_choice(player, "chose to stop shopping");
                    break;
                };

                let state = self.game.player_mut(player)?;
                if !state.try_spend_coins(offer.price) {
                    self.game.logger.normal(
                        LogCategory::Decision,
                        &format!("Player {player}: cannot afford {}", offer.type_id),
                    );
                    break;
                }
                let coins_left = state.coins;
                let chip = self.game.take_type_from_supply(player, offer.type_id)?;
                bought.push(offer.type_id.color);
                let described = self.game.describe_chip(chip);
                self.game.logger.controller_choice(
                    player,
                    &format!("chose to buy {described} for {} coins ({coins_left} left)", offer.price),
                );
            }
        }
        confirm_all(
            self.game,
            controllers,
            &players,
            "Purchases done. Proceed to ruby trade phase?",
        )
    }

    /// Offers a player can take right now: priced, affordable, in stock,
    /// not the bust color, and not a color already bought this phase
    fn shop_offers(&self, player: PlayerId, bought: &[Color]) -> Result<Vec<ShopOffer>> {
        let coins = self.game.player(player)?.coins;
        Ok(self
            .prices
            .iter()
            .filter(|&(type_id, &price)| {
                !type_id.color.is_bust()
                    && !bought.contains(&type_id.color)
                    && price <= coins
                    && self.game.supply_has_type(*type_id)
            })
            .map(|(&type_id, &price)| ShopOffer { type_id, price })
            .collect())
    }

    fn resource_trade_phase(
        &mut self,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<()> {
        let cost = self.ruby_trade_cost;
        self.game.logger.normal(
            LogCategory::Reward,
            &format!(
                "[RUBY TRADE] Spend {cost} rubies to refill an empty potion or to advance the track by 1."
            ),
        );

        let players = self.game.player_ids();
        for &player in &players {
            let controller = controller_for(controllers, player)?;
            let mut refused = 0;
            loop {
                let state = self.game.player(player)?;
                let potion_filled = state.potion_filled;
                if state.rubies < cost {
                    self.game.logger.normal(
                        LogCategory::Reward,
                        &format!("Player {player}: not enough rubies to trade (need {cost})"),
                    );
                    break;
                }

                let choice = {
                    let view = GameStateView::new(self.game, player);
                    controller.choose_ruby_trade(&view)
                };
                match choice {
                    RubyTrade::Done => {
                        self.game
                            .logger
                            .controller_choice(player, "chose to finish trading");
                        break;
                    }
                    RubyTrade::AdvanceTrack => {
                        let state = self.game.player_mut(player)?;
                        if !state.try_spend_rubies(cost) {
                            break;
                        }
                        state.advance_track(1);
                        let (track, rubies) = (state.track_pos, state.rubies);
                        self.game.logger.controller_choice(
                            player,
                            &format!(
                                "chose to spend {cost} rubies: track now {track} ({rubies} rubies left)"
                            ),
                        );
                    }
                    RubyTrade::RefillPotion if potion_filled => {
                        self.game.logger.normal(
                            LogCategory::Decision,
                            &format!("Player {player}: potion is already FILLED. Refill not allowed."),
                        );
                        refused += 1;
                        if refused >= MAX_PROMPTS {
                            break;
                        }
                    }
                    RubyTrade::RefillPotion => {
                        let state = self.game.player_mut(player)?;
                        if !state.try_spend_rubies(cost) {
                            break;
                        }
                        state.potion_filled = true;
                        let rubies = state.rubies;
                        self.game.logger.controller_choice(
                            player,
                            &format!(
                                "chose to spend {cost} rubies: potion refilled ({rubies} rubies left)"
                            ),
                        );
                    }
                }
            }
        }

        confirm_all(
            self.game,
            controllers,
            &players,
            "Ruby trade done. Round ends.",
        )
    }

    /// Return every palm and pot chip to its owner's bag and clear the event
    /// pointers. Runs for every player even if one of them fails.
    pub fn cleanup_round(&mut self, round: u32) -> Result<()> {
        self.game.logger.normal(
            LogCategory::Cleanup,
            &format!("[ROUND {round}] CLEANUP: returning pot contents to bags."),
        );

        let mut first_error = None;
        for player in self.game.player_ids() {
            if let Err(e) = self.cleanup_player(round, player) {
                first_error.get_or_insert(e);
            }
        }
        self.game.active_modifier = None;
        self.game.current_event = None;

        first_error.map_or(Ok(()), Err)
    }

    fn cleanup_player(&mut self, round: u32, player: PlayerId) -> Result<()> {
        if !self.game.zones(player)?.palm.is_empty() {
            let leftover = self.game.return_all(player, Zone::Palm)?;
            self.game.logger.normal(
                LogCategory::Cleanup,
                &format!(
                    "[ROUND {round}] CLEANUP: Player {player} had leftover palm chips -> bag: {}",
                    self.game.describe_chips(&leftover)
                ),
            );
        }
        let returned = self.game.return_all(player, Zone::Pot)?;
        self.game.logger.normal(
            LogCategory::Cleanup,
            &format!(
                "[ROUND {round}] CLEANUP: Player {player} pot -> bag ({} chips)",
                returned.len()
            ),
        );
        Ok(())
    }

    fn log_player_table(&self, title: &str) -> Result<()> {
        let logger = &self.game.logger;
        logger.normal(LogCategory::Table, &format!("--- {title} ---"));
        logger.normal(
            LogCategory::Table,
            &format!(
                "{:<3} {:<12} {:>5} {:>5} {:>6} {:>5} {:>6} {:>4} {:>4} {:>4} {:>4}",
                "id", "name", "score", "coins", "rubies", "track", "potion", "bag", "palm", "pot",
                "desk"
            ),
        );
        for state in &self.game.players {
            let zones = self.game.zones(state.id)?;
            logger.normal(
                LogCategory::Table,
                &format!(
                    "{:<3} {:<12} {:>5} {:>5} {:>6} {:>5} {:>6} {:>4} {:>4} {:>4} {:>4}",
                    state.id.as_u32(),
                    state.name,
                    state.score,
                    state.coins,
                    state.rubies,
                    state.track_pos,
                    if state.potion_filled { "FULL" } else { "EMPTY" },
                    zones.bag.len(),
                    zones.palm.len(),
                    zones.pot.len(),
                    zones.desktop.len(),
                ),
            );
        }
        Ok(())
    }

    /// Rank players by score, then coins, and log the final standings
    fn final_standings(&self) -> Result<GameResult> {
        let mut standings: Vec<Standing> = self
            .game
            .players
            .iter()
            .map(|p| Standing {
                player: p.id,
                name: p.name.clone(),
                score: p.score,
                coins: p.coins,
                rubies: p.rubies,
            })
            .collect();
        standings.sort_by(|a, b| {
            (b.score, b.coins)
                .cmp(&(a.score, a.coins))
                .then(a.player.cmp(&b.player))
        });

        let winners = match standings.first() {
            Some(top) => standings
                .iter()
                .take_while(|s| (s.score, s.coins) == (top.score, top.coins))
                .map(|s| s.player)
                .collect(),
            None => Vec::new(),
        };

        let logger = &self.game.logger;
        logger.minimal(LogCategory::Phase, "GAME END - Final standings:");
        for s in &standings {
            logger.minimal(
                LogCategory::Phase,
                &format!(
                    "Player {} ({}): score={}, coins={}, rubies={}",
                    s.player, s.name, s.score, s.coins, s.rubies
                ),
            );
        }

        Ok(GameResult {
            winners,
            rounds_played: self.rounds_played,
            standings,
        })
    }
}

/// Non-exploded players with the furthest position win; if everyone
/// exploded, the furthest position among all players wins. Ties share.
pub fn round_winners(results: &[DrawResult]) -> Vec<PlayerId> {
    let survivors: Vec<&DrawResult> = results.iter().filter(|r| !r.exploded).collect();
    let eligible: Vec<&DrawResult> = if survivors.is_empty() {
        results.iter().collect()
    } else {
        survivors
    };
    let Some(best) = eligible.iter().map(|r| r.pos_last).max() else {
        return Vec::new();
    };
    eligible
        .iter()
        .filter(|r| r.pos_last == best)
        .map(|r| r.player)
        .collect()
}

fn drawing_results(ctx: &RoundContext, phase: PhaseId) -> Result<Vec<DrawResult>> {
    ctx.draw_results
        .clone()
        .ok_or(GameError::PhasePrerequisiteMissing {
            phase,
            key: ContextKey::DrawingResults,
        })
}

fn join_players(players: &[PlayerId]) -> String {
    players
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ask for the round's pre-draw bonus. It may not carry the start position
/// past the end of the board; out-of-range answers are re-prompted and
/// finally replaced by 0.
fn ask_pre_draw_count(
    game: &GameState,
    controller: &mut dyn PlayerController,
    player: PlayerId,
) -> u32 {
    let max = u32::try_from(game.board.len()).unwrap_or(u32::MAX);
    for _ in 0..MAX_PROMPTS {
        let view = GameStateView::new(game, player);
        let count = controller.choose_pre_draw_count(&view);
        if count <= max {
            return count;
        }
        game.logger.normal(
            LogCategory::Decision,
            &format!("Player {player}: pre-draw bonus {count} is above {max}, choose again"),
        );
    }
    game.logger.normal(
        LogCategory::Decision,
        &format!("Player {player}: no valid pre-draw bonus, using 0"),
    );
    0
}

/// Ask for a purchase, re-prompting on out-of-range answers
fn ask_purchase(
    game: &GameState,
    controller: &mut dyn PlayerController,
    player: PlayerId,
    offers: &[ShopOffer],
) -> Option<ShopOffer> {
    let listing = offers
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    game.logger.normal(
        LogCategory::Reward,
        &format!("[SHOP] Player {player} offers: {listing}"),
    );
    for _ in 0..MAX_PROMPTS {
        let view = GameStateView::new(game, player);
        match controller.choose_purchase(&view, offers) {
            None => return None,
            Some(idx) => match offers.get(idx) {
                Some(offer) => return Some(*offer),
                None => game.logger.normal(
                    LogCategory::Decision,
                    &format!("Player {player}: offer {idx} does not exist, choose again"),
                ),
            },
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, BoardField, ChipType};
    use crate::game::controller::PalmChoice;
    use crate::game::logger::OutputMode;
    use crate::game::scripted_controller::{Answer, ScriptedController};

    /// Two players with four gray:1 and two orange:1 chips each, plus spare
    /// green and purple chips in the supply. Field i pays i coins and i score;
    /// every third field has a ruby.
    fn loop_game() -> GameState {
        let fields = (0..20u32)
            .map(|i| BoardField::new(i, i, i % 3 == 2))
            .collect();
        let mut game = GameState::new(Board::new(fields), Vec::new());
        game.logger.set_output_mode(OutputMode::Memory);
        for (color, count) in [
            (Color::Gray, 8),
            (Color::Orange, 4),
            (Color::Green, 2),
            (Color::Purple, 2),
        ] {
            game.add_chip_type(ChipType::new(ChipTypeId::new(color, 1), color.as_str()), count)
                .unwrap();
        }
        for name in ["Alice", "Bob"] {
            let player = game.add_player(name);
            game.give_bag_subset(player, ChipTypeId::new(Color::Gray, 1), 4)
                .unwrap();
            game.give_bag_subset(player, ChipTypeId::new(Color::Orange, 1), 2)
                .unwrap();
        }
        game
    }

    fn scripted(answers: [Vec<Answer>; 2]) -> Vec<Box<dyn PlayerController>> {
        let [a, b] = answers;
        vec![
            Box::new(ScriptedController::new(PlayerId::new(0), a)),
            Box::new(ScriptedController::new(PlayerId::new(1), b)),
        ]
    }

    fn result(player: u32, pos_last: u32, exploded: bool) -> DrawResult {
        DrawResult {
            player: PlayerId::new(player),
            pos_start: 0,
            pos_last,
            bust_sum: 0,
            chip_sum: 0,
            exploded,
            landing_index: pos_last as usize,
            landing: BoardField::default(),
        }
    }

    #[test]
    fn test_missing_prerequisite_is_fatal() {
        let mut game = loop_game();
        let mut controllers = scripted([Vec::new(), Vec::new()]);
        let mut game_loop = GameLoop::new(&mut game, 1);
        let mut ctx = RoundContext::new(1, false);

        let err = game_loop
            .run_phase(PhaseId::Scoring, &mut ctx, &mut controllers)
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::PhasePrerequisiteMissing {
                phase: PhaseId::Scoring,
                key: ContextKey::DrawingResults
            }
        ));
        assert!(err.is_fatal());

        let err = game_loop
            .run_phase(PhaseId::Drawing, &mut ctx, &mut controllers)
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::PhasePrerequisiteMissing {
                key: ContextKey::DrawLimit,
                ..
            }
        ));
    }

    #[test]
    fn test_round_winners() {
        let results = [result(0, 5, false), result(1, 9, true), result(2, 5, false)];
        assert_eq!(
            round_winners(&results),
            vec![PlayerId::new(0), PlayerId::new(2)]
        );

        let all_exploded = [result(0, 5, true), result(1, 9, true)];
        assert_eq!(round_winners(&all_exploded), vec![PlayerId::new(1)]);
    }

    #[test]
    fn test_cleanup_runs_when_a_phase_fails() {
        let mut game = loop_game();
        let p0 = PlayerId::new(0);
        let orange = game.zones(p0).unwrap().bag.chips[4];
        game.move_specific(p0, orange, Zone::Bag, Zone::Pot).unwrap();

        // Only one controller: the first confirmation gate fails
        let mut controllers: Vec<Box<dyn PlayerController>> =
            vec![Box::new(ScriptedController::new(p0, Vec::new()))];
        let mut game_loop = GameLoop::new(&mut game, 1);
        let err = game_loop.run_round(1, &mut controllers).unwrap_err();
        assert!(matches!(err, GameError::NoControllerForPlayer(_)));
        assert_eq!(game_loop.rounds_played(), 0);

        let zones = game.zones(p0).unwrap();
        assert!(zones.pot.is_empty());
        assert_eq!(zones.bag.len(), 6);
        assert!(game.validate_locations().is_ok());
    }

    #[test]
    fn test_full_round_with_scripted_players() {
        let mut game = loop_game();
        let mut controllers = scripted([
            vec![
                Answer::PreDraw(1),
                Answer::Continue(true),
                Answer::Palm(PalmChoice::Commit(0)),
                Answer::Continue(true),
                Answer::Continue(false),
            ],
            vec![Answer::Continue(false)],
        ]);
        let mut game_loop = GameLoop::new(&mut game, 7);
        game_loop.run_round(1, &mut controllers).unwrap();
        assert_eq!(game_loop.rounds_played(), 1);

        // Alice started at 1 and drew two chips of value 1 (potion declined)
        let alice = game.player(PlayerId::new(0)).unwrap();
        assert_eq!(alice.score, 3 + alice_die_bonus(&game));
        assert!(game.zones(PlayerId::new(0)).unwrap().pot.is_empty());
        assert_eq!(game.zones(PlayerId::new(0)).unwrap().bag.len(), 6);
        assert!(game
            .logger
            .messages()
            .iter()
            .any(|m| m.contains("[WINNER] Winner(s) of the drawing phase: 0")));
    }

    /// Score gained by player 0 from the bonus die in the log
    fn alice_die_bonus(game: &GameState) -> u32 {
        game.logger
            .messages()
            .iter()
            .filter(|m| m.starts_with("[DICE] Player 0"))
            .map(|m| {
                if m.ends_with("gain +1 score") {
                    1
                } else if m.ends_with("gain +2 score") {
                    2
                } else {
                    0
                }
            })
            .sum()
    }

    #[test]
    fn test_shop_buys_distinct_non_bust_colors() {
        let mut game = loop_game();
        let p0 = PlayerId::new(0);
        game.player_mut(p0).unwrap().add_coins(10);
        let prices = BTreeMap::from([
            (ChipTypeId::new(Color::Gray, 1), 1),
            (ChipTypeId::new(Color::Green, 1), 4),
            (ChipTypeId::new(Color::Purple, 1), 5),
        ]);
        let mut controllers = scripted([
            vec![
                Answer::Purchase(Some(0)),
                Answer::Purchase(Some(0)),
                Answer::Purchase(Some(0)),
            ],
            Vec::new(),
        ]);
        let mut game_loop = GameLoop::new(&mut game, 1).with_prices(prices);
        game_loop
            .run_phase(PhaseId::Purchase, &mut RoundContext::new(1, false), &mut controllers)
            .unwrap();

        let alice = game.player(p0).unwrap();
        assert_eq!(alice.coins, 1);
        assert_eq!(game.count_color(p0, Zone::Bag, Color::Green).unwrap(), 1);
        assert_eq!(game.count_color(p0, Zone::Bag, Color::Purple).unwrap(), 1);
        assert_eq!(game.count_color(p0, Zone::Bag, Color::Gray).unwrap(), 4);
        assert!(game.validate_locations().is_ok());
    }

    #[test]
    fn test_ruby_trade() {
        let mut game = loop_game();
        let p0 = PlayerId::new(0);
        {
            let alice = game.player_mut(p0).unwrap();
            alice.add_rubies(5);
        }
        let mut controllers = scripted([
            vec![
                Answer::Trade(RubyTrade::RefillPotion),
                Answer::Trade(RubyTrade::AdvanceTrack),
                Answer::Trade(RubyTrade::AdvanceTrack),
                Answer::Trade(RubyTrade::AdvanceTrack),
            ],
            Vec::new(),
        ]);
        let mut game_loop = GameLoop::new(&mut game, 1);
        game_loop
            .run_phase(
                PhaseId::ResourceTrade,
                &mut RoundContext::new(1, false),
                &mut controllers,
            )
            .unwrap();

        let alice = game.player(p0).unwrap();
        assert_eq!(alice.track_pos, 2);
        assert_eq!(alice.rubies, 1);
        assert!(alice.potion_filled);
        assert!(game
            .logger
            .messages()
            .iter()
            .any(|m| m.contains("Refill not allowed")));
    }

    #[test]
    fn test_pre_draw_bonus_beyond_the_board_is_asked_again() {
        let mut game = loop_game();
        // Alice corrects herself; Bob keeps answering out of range
        let mut controllers = scripted([
            vec![Answer::PreDraw(u32::MAX), Answer::PreDraw(3)],
            vec![Answer::PreDraw(21); 3],
        ]);
        let mut ctx = RoundContext::new(1, false);
        let mut game_loop = GameLoop::new(&mut game, 1);
        game_loop
            .run_phase(PhaseId::PreDraw, &mut ctx, &mut controllers)
            .unwrap();

        assert_eq!(ctx.pre_draw_count(PlayerId::new(0)), 3);
        assert_eq!(ctx.pre_draw_count(PlayerId::new(1)), 0);
        let messages = game.logger.messages();
        assert!(messages
            .iter()
            .any(|m| m.contains("pre-draw bonus 21 is above 20")));
        assert!(messages
            .iter()
            .any(|m| m.contains("Player 1: no valid pre-draw bonus, using 0")));
    }

    #[test]
    fn test_shop_stops_when_the_price_is_not_covered() {
        let mut game = loop_game();
        let p0 = PlayerId::new(0);
        game.player_mut(p0).unwrap().add_coins(3);
        let prices = BTreeMap::from([(ChipTypeId::new(Color::Green, 1), 4)]);
        let mut controllers = scripted([vec![Answer::Purchase(Some(0))], Vec::new()]);
        let mut game_loop = GameLoop::new(&mut game, 1).with_prices(prices);
        game_loop
            .run_phase(PhaseId::Purchase, &mut RoundContext::new(1, false), &mut controllers)
            .unwrap();

        assert_eq!(game.player(p0).unwrap().coins, 3);
        assert_eq!(game.count_color(p0, Zone::Bag, Color::Green).unwrap(), 0);
    }
}
