//! Table loading and game setup
//!
//! Static tables (inventory, board, event deck, prices, starting bag) come
//! from built-in defaults or a JSON file; the initializer turns them into a
//! ready-to-play [`crate::game::GameState`].

pub mod defaults;
pub mod game_init;
pub mod tables;

pub use game_init::{GameInitializer, GameSetup};
pub use tables::{parse_bag_recipe, BagEntry, ChipSpec, GameTables, PriceEntry};
