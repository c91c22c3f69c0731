//! Chip rule dispatch
//!
//! Three lookup tables decide what a chip does beyond its printed value:
//!
//! 1. placement-step rules: how far a freshly committed chip moves the track
//!    position tracker (default: the printed value)
//! 2. on-commit rules: run right after a chip lands in the pot and may move
//!    other chips (default: nothing)
//! 3. evaluation rules: run in the evaluation phase for every pot chip
//!    (default: nothing; the table ships empty)
//!
//! Rules are keyed by exact chip type first and by color second, so a rule for
//! `red:4` overrides the rule for all red chips without touching call sites.
//! A chip with no registered rule falls back to the default and is logged.

use crate::core::{ChipId, ChipInstance, ChipTypeId, Color, PlayerId};
use crate::game::controller::{GameStateView, PlayerController};
use crate::game::logger::LogCategory;
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;
use rustc_hash::FxHashMap;

/// Key of a chip rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKey {
    Type(ChipTypeId),
    Color(Color),
}

/// `(game, player, placed chip, printed value) -> step`
pub type StepRule = fn(&GameState, PlayerId, ChipId, u32) -> Result<u32>;

/// `(game, controller, player, placed chip)`
pub type OnCommitRule = fn(&mut GameState, &mut dyn PlayerController, PlayerId, ChipId) -> Result<()>;

/// `(game, player, pot chip)`
pub type EvalRule = fn(&mut GameState, PlayerId, ChipId) -> Result<()>;

/// The three chip rule tables
#[derive(Clone)]
pub struct ChipRules {
    step_rules: FxHashMap<RuleKey, StepRule>,
    on_commit_rules: FxHashMap<RuleKey, OnCommitRule>,
    eval_rules: FxHashMap<RuleKey, EvalRule>,
}

impl std::fmt::Debug for ChipRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChipRules")
            .field("step_rules", &self.step_rules.keys().collect::<Vec<_>>())
            .field("on_commit_rules", &self.on_commit_rules.keys().collect::<Vec<_>>())
            .field("eval_rules", &self.eval_rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ChipRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl ChipRules {
    /// No rules at all: every chip steps by its value and does nothing else
    pub fn empty() -> Self {
        ChipRules {
            step_rules: FxHashMap::default(),
            on_commit_rules: FxHashMap::default(),
            eval_rules: FxHashMap::default(),
        }
    }

    /// The rule set of the standard game
    pub fn standard() -> Self {
        let mut rules = Self::empty();
        rules.register_step(RuleKey::Color(Color::Red), step_red_adds_oranges);
        rules.register_on_commit(RuleKey::Color(Color::Yellow), yellow_may_remove_preceding_bust);
        rules
    }

    pub fn register_step(&mut self, key: RuleKey, rule: StepRule) {
        self.step_rules.insert(key, rule);
    }

    pub fn register_on_commit(&mut self, key: RuleKey, rule: OnCommitRule) {
        self.on_commit_rules.insert(key, rule);
    }

    pub fn register_eval(&mut self, key: RuleKey, rule: EvalRule) {
        self.eval_rules.insert(key, rule);
    }

    fn lookup<T: Copy>(table: &FxHashMap<RuleKey, T>, chip: &ChipInstance) -> Option<T> {
        table
            .get(&RuleKey::Type(chip.type_id))
            .or_else(|| table.get(&RuleKey::Color(chip.color())))
            .copied()
    }

    /// How far `chip` advances the player's position tracker.
    ///
    /// Must be called with the chip already in the pot so that rules see the
    /// pot as it is at placement time.
    pub fn effective_placement_step(
        &self,
        game: &GameState,
        player: PlayerId,
        chip: ChipId,
    ) -> Result<u32> {
        let instance = *game.chip(chip)?;
        let base = u32::from(instance.value());
        match Self::lookup(&self.step_rules, &instance) {
            Some(rule) => {
                let step = rule(game, player, chip, base)?;
                game.logger.verbose(
                    LogCategory::Reward,
                    &format!("Step rule for {instance}: base {base} -> step {step}"),
                );
                Ok(step)
            }
            None => Ok(base),
        }
    }

    /// Run the on-commit rule of `chip`, if any. Returns whether a rule ran.
    ///
    /// Rules never touch the position tracker; they only move chips.
    pub fn apply_on_commit_effects(
        &self,
        game: &mut GameState,
        controller: &mut dyn PlayerController,
        player: PlayerId,
        chip: ChipId,
    ) -> Result<bool> {
        let instance = *game.chip(chip)?;
        match Self::lookup(&self.on_commit_rules, &instance) {
            Some(rule) => {
                rule(game, controller, player, chip)?;
                Ok(true)
            }
            None => {
                game.logger.verbose(
                    LogCategory::ChipMove,
                    &format!("No on-commit rule registered for {instance}"),
                );
                Ok(false)
            }
        }
    }

    /// Run evaluation rules for every chip in the player's pot. Returns how
    /// many rules ran.
    pub fn apply_eval_effects(&self, game: &mut GameState, player: PlayerId) -> Result<usize> {
        let pot: Vec<ChipId> = game.zones(player)?.pot.chips.clone();
        let mut applied = 0;
        for chip in pot {
            let instance = *game.chip(chip)?;
            if let Some(rule) = Self::lookup(&self.eval_rules, &instance) {
                rule(game, player, chip)?;
                applied += 1;
            }
        }
        if applied == 0 {
            game.logger.normal(
                LogCategory::Phase,
                &format!("Player {player}: no evaluation rule applies to the pot"),
            );
        }
        Ok(applied)
    }
}

/// Red: printed value plus one per orange chip already in the pot
fn step_red_adds_oranges(
    game: &GameState,
    player: PlayerId,
    _chip: ChipId,
    base: u32,
) -> Result<u32> {
    let oranges = game.count_color(player, Zone::Pot, Color::Orange)?;
    Ok(base + oranges as u32)
}

/// Yellow: if the chip committed just before it is a bust chip, the player may
/// send that chip back to the bag
fn yellow_may_remove_preceding_bust(
    game: &mut GameState,
    controller: &mut dyn PlayerController,
    player: PlayerId,
    chip: ChipId,
) -> Result<()> {
    let pot = &game.zones(player)?.pot;
    let Some(position) = pot.position(chip) else {
        return Ok(());
    };
    if position == 0 {
        return Ok(());
    }
    let preceding = pot.chips[position - 1];
    if !game.chip(preceding)?.color().is_bust() {
        return Ok(());
    }

    let remove = {
        let view = GameStateView::new(game, player);
        controller.remove_preceding_chip(&view, chip, preceding)
    };
    let described = game.describe_chip(preceding);
    if remove {
        game.logger
            .controller_choice(player, &format!("chose to remove preceding {described}"));
        game.move_specific(player, preceding, Zone::Pot, Zone::Bag)?;
        game.logger.normal(
            LogCategory::ChipMove,
            &format!("Player {player}: {described} removed from pot back to bag"),
        );
    } else {
        game.logger
            .controller_choice(player, &format!("chose to keep preceding {described}"));
    }
    Ok(())
}
