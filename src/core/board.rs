//! Linear scoring track
//!
//! Field index == track position. A player's final position after drawing
//! selects the field whose rewards they collect.

use serde::{Deserialize, Serialize};

/// Rewards for landing on one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardField {
    pub coins: u32,
    #[serde(rename = "victory_points")]
    pub score: u32,
    pub ruby: bool,
}

impl BoardField {
    pub const fn new(coins: u32, score: u32, ruby: bool) -> Self {
        BoardField { coins, score, ruby }
    }
}

/// The reward table, indexed by track position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    fields: Vec<BoardField>,
}

impl Board {
    pub fn new(fields: Vec<BoardField>) -> Self {
        Board { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[BoardField] {
        &self.fields
    }

    /// Clamp a position to the table bounds
    pub fn clamp(&self, position: u32) -> usize {
        (position as usize).min(self.fields.len().saturating_sub(1))
    }

    /// Look up the field for a position, clamped to the last field.
    ///
    /// Returns the clamped index alongside the rewards. An empty board yields
    /// no rewards.
    pub fn landing(&self, position: u32) -> (usize, BoardField) {
        if self.fields.is_empty() {
            return (position as usize, BoardField::default());
        }
        let index = self.clamp(position);
        (index, self.fields[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_board() -> Board {
        Board::new(vec![
            BoardField::new(0, 0, false),
            BoardField::new(1, 0, true),
            BoardField::new(2, 1, false),
        ])
    }

    #[test]
    fn test_landing_in_range() {
        let board = small_board();
        assert_eq!(board.landing(1), (1, BoardField::new(1, 0, true)));
    }

    #[test]
    fn test_landing_clamps_past_end() {
        let board = small_board();
        assert_eq!(board.landing(99), (2, BoardField::new(2, 1, false)));
    }

    #[test]
    fn test_empty_board_gives_nothing() {
        let board = Board::new(Vec::new());
        assert_eq!(board.landing(4), (4, BoardField::default()));
    }

    #[test]
    fn test_field_json_names() {
        let json = r#"[{"coins": 6, "victory_points": 1, "ruby": true}]"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.fields()[0], BoardField::new(6, 1, true));
    }
}
