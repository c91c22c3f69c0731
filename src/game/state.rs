//! Main game state structure
//!
//! Holds the chip pool (types, instances, and the location index), the
//! per-player counters and containers, the board, the event deck, and the
//! public log. Chip locations are only mutated through the zone transitions
//! in [`crate::game::actions`].

use crate::core::{
    Board, ChipId, ChipInstance, ChipType, ChipTypeId, Color, EventCard, PlayerId, PlayerState,
};
use crate::game::GameLogger;
use crate::zones::{ChipZone, Location, PlayerZones, Zone};
use crate::{GameError, Result};
use std::collections::BTreeMap;

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Chip denominations, keyed by type
    pub chip_types: BTreeMap<ChipTypeId, ChipType>,

    /// Every physical chip, indexed by `ChipId`
    chips: Vec<ChipInstance>,

    /// Current location of every chip, indexed by `ChipId`
    pub(in crate::game) locations: Vec<Location>,

    /// Shared supply
    pub(in crate::game) supply: ChipZone,

    /// Player counters, indexed by `PlayerId` (stable seat order)
    pub players: Vec<PlayerState>,

    /// Player chip containers, indexed by `PlayerId`
    pub(in crate::game) player_zones: Vec<PlayerZones>,

    /// Reward table
    pub board: Board,

    /// Undrawn event cards
    pub event_deck: Vec<EventCard>,

    /// Drawn event cards, in draw order
    pub event_discard: Vec<EventCard>,

    /// Card drawn this round
    pub current_event: Option<EventCard>,

    /// Round-modifier card active for this round
    pub active_modifier: Option<EventCard>,

    /// Public transparency log
    pub logger: GameLogger,
}

impl GameState {
    /// Create an empty game with no chips and no players
    pub fn new(board: Board, event_deck: Vec<EventCard>) -> Self {
        GameState {
            chip_types: BTreeMap::new(),
            chips: Vec::new(),
            locations: Vec::new(),
            supply: ChipZone::new(Zone::Supply, None),
            players: Vec::new(),
            player_zones: Vec::new(),
            board,
            event_deck,
            event_discard: Vec::new(),
            current_event: None,
            active_modifier: None,
            logger: GameLogger::new(),
        }
    }

    /// Register a chip denomination and create `count` instances of it in
    /// the supply. Chip ids are handed out contiguously in creation order.
    pub fn add_chip_type(&mut self, chip_type: ChipType, count: u32) -> Result<()> {
        let type_id = chip_type.type_id;
        if self.chip_types.contains_key(&type_id) {
            return Err(GameError::InvalidConfig(format!(
                "chip type {type_id} registered twice"
            )));
        }
        self.chip_types.insert(type_id, chip_type);

        for _ in 0..count {
            let id = ChipId::new(self.chips.len() as u32);
            self.chips.push(ChipInstance { id, type_id });
            self.locations.push(Location::supply());
            self.supply.add(id);
        }
        Ok(())
    }

    /// Seat a new player. Player ids follow seating order.
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = PlayerId::new(self.players.len() as u32);
        self.players.push(PlayerState::new(id, name));
        self.player_zones.push(PlayerZones::new(id));
        id
    }

    /// Player ids in seating order
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn player(&self, id: PlayerId) -> Result<&PlayerState> {
        self.players
            .get(id.index())
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Get a mutable player by ID
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut PlayerState> {
        self.players
            .get_mut(id.index())
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Get the chip containers of a player
    pub fn zones(&self, id: PlayerId) -> Result<&PlayerZones> {
        self.player_zones
            .get(id.index())
            .ok_or(GameError::UnknownPlayer(id))
    }

    pub(in crate::game) fn zones_mut(&mut self, id: PlayerId) -> Result<&mut PlayerZones> {
        self.player_zones
            .get_mut(id.index())
            .ok_or(GameError::UnknownPlayer(id))
    }

    pub fn supply(&self) -> &ChipZone {
        &self.supply
    }

    /// Get a chip by ID
    pub fn chip(&self, id: ChipId) -> Result<&ChipInstance> {
        self.chips.get(id.index()).ok_or(GameError::UnknownChip(id))
    }

    pub fn chip_type(&self, type_id: ChipTypeId) -> Result<&ChipType> {
        self.chip_types
            .get(&type_id)
            .ok_or_else(|| GameError::UnknownChipType(type_id.to_string()))
    }

    /// Current location of a chip
    pub fn location(&self, id: ChipId) -> Result<Location> {
        self.locations
            .get(id.index())
            .copied()
            .ok_or(GameError::UnknownChip(id))
    }

    /// Every chip in the pool
    pub fn chips(&self) -> &[ChipInstance] {
        &self.chips
    }

    pub fn total_chips(&self) -> usize {
        self.chips.len()
    }

    /// Resolve a container by location
    pub fn container(&self, zone: Zone, owner: Option<PlayerId>) -> Result<&ChipZone> {
        match (zone, owner) {
            (Zone::Supply, _) => Ok(&self.supply),
            (zone, Some(player)) => self
                .zones(player)?
                .get_zone(zone)
                .ok_or(GameError::IllegalTransition { from: zone, to: zone }),
            (zone, None) => Err(GameError::LocationMismatch(format!(
                "zone {zone} requires an owner"
            ))),
        }
    }

    /// Count chips of a color in one of a player's containers
    pub fn count_color(&self, player: PlayerId, zone: Zone, color: Color) -> Result<usize> {
        let container = self.container(zone, Some(player))?;
        let mut count = 0;
        for &id in &container.chips {
            if self.chip(id)?.color() == color {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Describe a chip for log lines, e.g. `orange:1#0012`
    pub fn describe_chip(&self, id: ChipId) -> String {
        match self.chip(id) {
            Ok(chip) => chip.to_string(),
            Err(_) => format!("?#{id}"),
        }
    }

    /// Describe a list of chips for log lines
    pub fn describe_chips(&self, ids: &[ChipId]) -> String {
        let parts: Vec<String> = ids.iter().map(|&id| self.describe_chip(id)).collect();
        format!("[{}]", parts.join(", "))
    }

    /// Integrity check: every chip is in exactly one container, and that
    /// container agrees with the location index.
    pub fn validate_locations(&self) -> Result<()> {
        let mut seen = vec![false; self.chips.len()];

        let mut check = |container: &ChipZone| -> Result<()> {
            let expected = container.location();
            for &id in &container.chips {
                let slot = seen
                    .get_mut(id.index())
                    .ok_or(GameError::UnknownChip(id))?;
                if *slot {
                    return Err(GameError::LocationMismatch(format!(
                        "chip {id} appears in more than one container"
                    )));
                }
                *slot = true;

                let recorded = self.locations[id.index()];
                if recorded != expected {
                    return Err(GameError::LocationMismatch(format!(
                        "chip {id} is held by {expected} but indexed at {recorded}"
                    )));
                }
            }
            Ok(())
        };

        check(&self.supply)?;
        for zones in &self.player_zones {
            check(&zones.bag)?;
            check(&zones.palm)?;
            check(&zones.desktop)?;
            check(&zones.pot)?;
        }

        let missing = seen.iter().filter(|&&s| !s).count();
        if missing > 0 {
            return Err(GameError::LocationMismatch(format!(
                "{missing} chips are in no container"
            )));
        }
        Ok(())
    }
}

/// Two players, three gray 1-chips and two orange 1-chips, all in the supply
#[cfg(test)]
pub(crate) fn small_game() -> GameState {
    use crate::core::BoardField;

    let mut game = GameState::new(Board::new(vec![BoardField::default(); 5]), Vec::new());
    game.logger
        .set_output_mode(crate::game::logger::OutputMode::Memory);
    game.add_chip_type(ChipType::new(ChipTypeId::new(Color::Gray, 1), "Knallerbse"), 3)
        .unwrap();
    game.add_chip_type(ChipType::new(ChipTypeId::new(Color::Orange, 1), "Kuerbis"), 2)
        .unwrap();
    game.add_player("Alice");
    game.add_player("Bob");
    game
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_construction() {
        let game = small_game();
        assert_eq!(game.total_chips(), 5);
        assert_eq!(game.supply().len(), 5);
        assert_eq!(game.chip(ChipId::new(3)).unwrap().color(), Color::Orange);
        assert_eq!(game.location(ChipId::new(0)).unwrap(), Location::supply());
        assert!(game.validate_locations().is_ok());
    }

    #[test]
    fn test_duplicate_chip_type_rejected() {
        let mut game = small_game();
        let err = game
            .add_chip_type(ChipType::new(ChipTypeId::new(Color::Gray, 1), "again"), 1)
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_players_in_seat_order() {
        let game = small_game();
        assert_eq!(game.player_ids(), vec![PlayerId::new(0), PlayerId::new(1)]);
        assert_eq!(game.player(PlayerId::new(1)).unwrap().name, "Bob");
        assert!(game.player(PlayerId::new(5)).is_err());
    }

    #[test]
    fn test_validate_detects_index_drift() {
        let mut game = small_game();
        game.locations[0] = Location::player(Zone::Bag, PlayerId::new(0));
        assert!(matches!(
            game.validate_locations(),
            Err(GameError::LocationMismatch(_))
        ));
    }
}
