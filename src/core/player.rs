//! Per-player counters

use crate::core::PlayerId;
use serde::{Deserialize, Serialize};

/// Centrally recorded state of one player
///
/// Chip containers live in [`crate::zones::PlayerZones`]; this struct only
/// holds the counters that persist across rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Unique ID for this player
    pub id: PlayerId,

    /// Display name
    pub name: String,

    /// Currency, spent in the shop
    pub coins: u32,

    /// Score (victory points)
    pub score: u32,

    /// Rare resource (rubies)
    pub rubies: u32,

    /// Persistent head start on the track (droplet position)
    pub track_pos: u32,

    /// Consumable charge (potion). Starts filled; spent to undo one bust-color
    /// commit and refilled only through a trade.
    pub potion_filled: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        PlayerState {
            id,
            name: name.into(),
            coins: 0,
            score: 0,
            rubies: 0,
            track_pos: 0,
            potion_filled: true,
        }
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score += amount;
    }

    pub fn add_coins(&mut self, amount: u32) {
        self.coins += amount;
    }

    pub fn add_rubies(&mut self, amount: u32) {
        self.rubies += amount;
    }

    pub fn advance_track(&mut self, steps: u32) {
        self.track_pos = self.track_pos.saturating_add(steps);
    }

    /// Spend coins if the player can afford it
    pub fn try_spend_coins(&mut self, amount: u32) -> bool {
        if self.coins >= amount {
            self.coins -= amount;
            true
        } else {
            false
        }
    }

    /// Spend rubies if the player can afford it
    pub fn try_spend_rubies(&mut self, amount: u32) -> bool {
        if self.rubies >= amount {
            self.rubies -= amount;
            true
        } else {
            false
        }
    }

    /// Use the potion. Returns false if it was already empty.
    pub fn consume_potion(&mut self) -> bool {
        std::mem::replace(&mut self.potion_filled, false)
    }
}
