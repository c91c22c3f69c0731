//! Core game types: identifiers, chips, players, the board, event cards

pub mod board;
pub mod chip;
pub mod entity;
pub mod event_card;
pub mod player;

pub use board::{Board, BoardField};
pub use chip::{ChipInstance, ChipType, Color};
pub use entity::{ChipId, ChipTypeId, PlayerId};
pub use event_card::{EventCard, EventKind, EventScope};
pub use player::PlayerState;
