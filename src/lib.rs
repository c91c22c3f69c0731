//! Cauldron - rules engine for a bag-building press-your-luck chip game
//!
//! Chips move between a shared supply and each player's bag, palm, desktop,
//! and pot through a small set of zone transitions that keep every chip in
//! exactly one place. A round driver walks a fixed list of phases, and chip
//! colors and event cards change the flow through lookup tables.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod tournament;
pub mod zones;

pub use error::{GameError, Result};
