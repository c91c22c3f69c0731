//! Bonus die rolled by the round winners (and by everyone on some events)

use crate::core::{Color, PlayerId};
use crate::game::logger::LogCategory;
use crate::game::GameState;
use crate::{GameError, Result};
use rand::{Rng, RngCore};

/// What one face of the bonus die grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DieFace {
    Score(u32),
    /// One chip of this color from the supply into the bag
    Chip(Color),
    Ruby,
    Track,
}

/// Faces 1 to 6
pub const BONUS_DIE: [DieFace; 6] = [
    DieFace::Score(1),
    DieFace::Score(1),
    DieFace::Score(2),
    DieFace::Chip(Color::Orange),
    DieFace::Ruby,
    DieFace::Track,
];

/// Roll the bonus die for `player`, apply the face, and log it.
///
/// Returns the rolled number (1-6). A chip face with an exhausted supply
/// grants nothing and says so in the log.
pub fn roll_bonus_die(game: &mut GameState, player: PlayerId, rng: &mut dyn RngCore) -> Result<u8> {
    let roll: u8 = rng.gen_range(1..=6);
    let face = BONUS_DIE[usize::from(roll - 1)];

    let effect = match face {
        DieFace::Score(points) => {
            game.player_mut(player)?.add_score(points);
            format!("gain +{points} score")
        }
        DieFace::Chip(color) => match game.take_from_supply(player, color) {
            Ok(chip) => format!("take {} from supply into bag", game.describe_chip(chip)),
            Err(GameError::SupplyExhausted(_)) => {
                format!("take 1 {color} chip (none left in supply)")
            }
            Err(e) => return Err(e),
        },
        DieFace::Ruby => {
            game.player_mut(player)?.add_rubies(1);
            "gain +1 ruby".to_string()
        }
        DieFace::Track => {
            let state = game.player_mut(player)?;
            state.advance_track(1);
            format!("move track +1 (now {})", state.track_pos)
        }
    };

    game.logger.normal(
        LogCategory::Reward,
        &format!("[DICE] Player {player} rolls {roll}/6 -> {effect}"),
    );
    Ok(roll)
}
