//! Game initialization from static tables
//!
//! Builds the chip pool, seats the players, and fills their bags

use crate::core::{ChipType, PlayerId};
use crate::game::logger::{LogCategory, OutputMode};
use crate::game::{GameState, VerbosityLevel};
use crate::loader::tables::{BagEntry, GameTables};
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};

/// Runtime choices for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// Player names in seat order
    pub names: Vec<String>,
    pub starting_rubies: u32,
    /// Starting track position per seat; missing seats start at 0
    pub start_positions: Vec<u32>,
    /// Bag recipe per seat; `None` (or a missing seat) uses the standard bag
    pub bags: Vec<Option<Vec<BagEntry>>>,
    /// Logger settings applied before the first setup line is written
    pub verbosity: VerbosityLevel,
    pub output_mode: OutputMode,
}

impl GameSetup {
    pub fn new(names: Vec<String>) -> Self {
        GameSetup {
            names,
            starting_rubies: 2,
            start_positions: Vec::new(),
            bags: Vec::new(),
            verbosity: VerbosityLevel::default(),
            output_mode: OutputMode::default(),
        }
    }

    /// Quiet setup for batch runs and tests: record only, echo nothing
    pub fn quiet(mut self) -> Self {
        self.verbosity = VerbosityLevel::Silent;
        self.output_mode = OutputMode::Memory;
        self
    }

    pub fn with_logging(mut self, verbosity: VerbosityLevel, output_mode: OutputMode) -> Self {
        self.verbosity = verbosity;
        self.output_mode = output_mode;
        self
    }

    pub fn with_starting_rubies(mut self, rubies: u32) -> Self {
        self.starting_rubies = rubies;
        self
    }

    pub fn with_start_position(mut self, seat: usize, position: u32) -> Self {
        if self.start_positions.len() <= seat {
            self.start_positions.resize(seat + 1, 0);
        }
        self.start_positions[seat] = position;
        self
    }

    pub fn with_bag(mut self, seat: usize, recipe: Vec<BagEntry>) -> Self {
        if self.bags.len() <= seat {
            self.bags.resize(seat + 1, None);
        }
        self.bags[seat] = Some(recipe);
        self
    }
}

/// Game builder for initializing games from tables
pub struct GameInitializer<'a> {
    tables: &'a GameTables,
}

impl<'a> GameInitializer<'a> {
    pub fn new(tables: &'a GameTables) -> Self {
        GameInitializer { tables }
    }

    /// Build a ready-to-play game: full pool in the supply, players seated,
    /// bags filled from the supply (lowest chip ids first), counters set
    pub fn init_game(&self, setup: &GameSetup) -> Result<GameState> {
        self.tables.validate()?;
        if setup.names.is_empty() {
            return Err(GameError::InvalidConfig("No players".to_string()));
        }

        let mut game = GameState::new(self.tables.board.clone(), self.tables.deck.clone());
        game.logger.set_verbosity(setup.verbosity);
        game.logger.set_output_mode(setup.output_mode);
        for spec in &self.tables.inventory {
            game.add_chip_type(ChipType::new(spec.type_id(), spec.name.clone()), spec.count)?;
        }
        game.logger.normal(
            LogCategory::Setup,
            &format!(
                "Pool built: {} chip types, {} chips in supply",
                self.tables.inventory.len(),
                game.total_chips()
            ),
        );

        for (seat, name) in setup.names.iter().enumerate() {
            let player = game.add_player(name.clone());
            let recipe = setup
                .bags
                .get(seat)
                .and_then(|bag| bag.as_ref())
                .unwrap_or(&self.tables.starting_bag);
            self.load_bag_into_game(&mut game, player, recipe)?;

            let state = game.player_mut(player)?;
            state.rubies = setup.starting_rubies;
            state.track_pos = setup.start_positions.get(seat).copied().unwrap_or(0);
            let (rubies, track) = (state.rubies, state.track_pos);

            let bag_len = game.zones(player)?.bag.len();
            game.logger.normal(
                LogCategory::Setup,
                &format!(
                    "Player {player} ({name}): {bag_len} chips in bag, rubies={rubies}, track={track}"
                ),
            );
        }

        game.validate_locations()?;
        Ok(game)
    }

    /// Move a bag recipe from the supply into a player's bag
    fn load_bag_into_game(
        &self,
        game: &mut GameState,
        player: PlayerId,
        recipe: &[BagEntry],
    ) -> Result<()> {
        for entry in recipe {
            game.chip_type(entry.type_id())?;
            game.give_bag_subset(player, entry.type_id(), entry.count)?;
        }
        Ok(())
    }
}
