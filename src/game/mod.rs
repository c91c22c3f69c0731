//! Game state, zone transitions, rules, and the round structure

pub mod actions;
pub mod bonus_die;
pub mod controller;
pub mod drawing;
pub mod effects;
pub mod events;
pub mod fixed_script_controller;
pub mod game_loop;
pub mod heuristic_controller;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod round_context;
pub mod scripted_controller;
pub mod state;

pub use controller::{GameStateView, PalmChoice, PlayerController, RubyTrade};
pub use effects::{ChipRules, RuleKey};
pub use events::EventRules;
pub use fixed_script_controller::FixedScriptController;
pub use game_loop::{GameLoop, GameResult, Standing, VerbosityLevel};
pub use heuristic_controller::HeuristicController;
pub use logger::{GameLogger, LogCategory, OutputFormat, OutputMode};
pub use phase::PhaseId;
pub use random_controller::RandomController;
pub use round_context::{DrawResult, RoundContext};
pub use scripted_controller::{Answer, ScriptedController};
pub use state::GameState;
