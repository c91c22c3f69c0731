//! Chip colors, denominations, and physical chip instances

use crate::core::{ChipId, ChipTypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chip colors
///
/// Serialized in lowercase (`"gray"`, `"greenred"`), matching the inventory
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Gray,
    Orange,
    Red,
    Blue,
    Yellow,
    Green,
    Purple,
    Black,
    GreenRed,
}

impl Color {
    /// The color whose running sum in the pot ends a player's drawing
    pub const BUST: Color = Color::Gray;

    pub const ALL: [Color; 9] = [
        Color::Gray,
        Color::Orange,
        Color::Red,
        Color::Blue,
        Color::Yellow,
        Color::Green,
        Color::Purple,
        Color::Black,
        Color::GreenRed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Gray => "gray",
            Color::Orange => "orange",
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Purple => "purple",
            Color::Black => "black",
            Color::GreenRed => "greenred",
        }
    }

    pub fn is_bust(&self) -> bool {
        *self == Color::BUST
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Color {
    type Err = crate::GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| crate::GameError::UnknownChipType(s.to_string()))
    }
}

/// Immutable definition of a chip denomination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipType {
    pub type_id: ChipTypeId,
    /// Display name of the ingredient
    pub name: String,
}

impl ChipType {
    pub fn new(type_id: ChipTypeId, name: impl Into<String>) -> Self {
        ChipType {
            type_id,
            name: name.into(),
        }
    }

    pub fn color(&self) -> Color {
        self.type_id.color
    }

    pub fn value(&self) -> u8 {
        self.type_id.value
    }
}

/// One physical chip. Never destroyed or recreated during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInstance {
    pub id: ChipId,
    pub type_id: ChipTypeId,
}

impl ChipInstance {
    pub fn color(&self) -> Color {
        self.type_id.color
    }

    pub fn value(&self) -> u8 {
        self.type_id.value
    }
}

impl fmt::Display for ChipInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:04}", self.type_id, self.id.as_u32())
    }
}
