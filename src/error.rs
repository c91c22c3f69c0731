//! Error types for the cauldron engine

use crate::core::{ChipId, Color, PlayerId};
use crate::game::phase::{ContextKey, PhaseId};
use crate::zones::Zone;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    /// Drawing from an empty container. Callers treat this as a normal stop.
    #[error("Player {player} has no chips left in {zone}")]
    EmptySource { player: PlayerId, zone: Zone },

    /// An action targeted a chip that is not where the caller expected it.
    #[error("Chip {chip} not found in {zone} ({})", owner_label(.player))]
    ChipNotFound {
        chip: ChipId,
        zone: Zone,
        player: Option<PlayerId>,
    },

    #[error("No {0} chip left in the supply")]
    SupplyExhausted(Color),

    #[error("Phase '{phase}' requires round context key '{key}', which is missing")]
    PhasePrerequisiteMissing { phase: PhaseId, key: ContextKey },

    #[error("Illegal chip transition: {from} -> {to}")]
    IllegalTransition { from: Zone, to: Zone },

    #[error("Player not found: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Chip not found in pool: {0}")]
    UnknownChip(ChipId),

    #[error("Unknown chip type: {0}")]
    UnknownChipType(String),

    #[error("Chip location index is inconsistent: {0}")]
    LocationMismatch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No controller registered for player {0}")]
    NoControllerForPlayer(PlayerId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn owner_label(player: &Option<PlayerId>) -> String {
    match player {
        Some(id) => format!("player {id}"),
        None => "shared".to_string(),
    }
}

impl GameError {
    /// Errors that signal a sequencing defect rather than a missing resource.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GameError::PhasePrerequisiteMissing { .. }
                | GameError::LocationMismatch(_)
                | GameError::NoControllerForPlayer(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::SupplyExhausted(Color::Purple);
        assert_eq!(err.to_string(), "No purple chip left in the supply");

        let err = GameError::ChipNotFound {
            chip: ChipId::new(7),
            zone: Zone::Supply,
            player: None,
        };
        assert_eq!(err.to_string(), "Chip 7 not found in supply (shared)");
    }

    #[test]
    fn test_fatal_classification() {
        let fatal = GameError::PhasePrerequisiteMissing {
            phase: PhaseId::Drawing,
            key: ContextKey::DrawLimit,
        };
        assert!(fatal.is_fatal());
        assert!(!GameError::SupplyExhausted(Color::Orange).is_fatal());
    }
}
