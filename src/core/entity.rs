//! Identifier newtypes for chips, chip types, and players
//!
//! IDs are simple and contiguous for human readability and dense storage.
//! They are stable for the whole process lifetime: chips are created once at
//! pool construction and never destroyed.

use crate::core::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one physical chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChipId(u32);

impl ChipId {
    pub fn new(id: u32) -> Self {
        ChipId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Index into dense per-chip storage
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a seat at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        PlayerId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chip denomination: color x printed value
///
/// Displays as `color:value` (e.g. `orange:1`), which is also the form used in
/// configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChipTypeId {
    pub color: Color,
    pub value: u8,
}

impl ChipTypeId {
    pub fn new(color: Color, value: u8) -> Self {
        ChipTypeId { color, value }
    }
}

impl fmt::Display for ChipTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.color, self.value)
    }
}

impl std::str::FromStr for ChipTypeId {
    type Err = crate::GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (color, value) = s
            .split_once(':')
            .ok_or_else(|| crate::GameError::UnknownChipType(s.to_string()))?;
        let color: Color = color.parse()?;
        let value = value
            .trim()
            .parse::<u8>()
            .map_err(|_| crate::GameError::UnknownChipType(s.to_string()))?;
        Ok(ChipTypeId { color, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_ordered() {
        assert!(ChipId::new(1) < ChipId::new(2));
        assert_eq!(ChipId::new(42).index(), 42);
        assert_eq!(PlayerId::new(3).to_string(), "3");
    }

    #[test]
    fn test_type_id_round_trip_through_text() {
        let tid = ChipTypeId::new(Color::Red, 4);
        assert_eq!(tid.to_string(), "red:4");
        assert_eq!("red:4".parse::<ChipTypeId>().unwrap(), tid);
        assert!("red".parse::<ChipTypeId>().is_err());
        assert!("teal:1".parse::<ChipTypeId>().is_err());
    }
}
