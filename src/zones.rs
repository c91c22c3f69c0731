//! Chip zones (Supply, Bag, Palm, Desktop, Pot)

use crate::core::{ChipId, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Places a chip can be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Shared pool of not-yet-distributed chips
    Supply,
    /// A player's private reserve of undrawn chips
    Bag,
    /// Just-drawn chips under inspection
    Palm,
    /// Persistent side-area, reachable only from the palm
    Desktop,
    /// Chips committed this round
    Pot,
}

impl Zone {
    /// Zones owned by a player (everything except the supply)
    pub const PLAYER_ZONES: [Zone; 4] = [Zone::Bag, Zone::Palm, Zone::Desktop, Zone::Pot];

    pub fn is_shared(&self) -> bool {
        matches!(self, Zone::Supply)
    }

    /// Transitions the rules permit
    pub fn can_move_to(&self, to: Zone) -> bool {
        matches!(
            (self, to),
            (Zone::Supply, Zone::Bag)
                | (Zone::Bag, Zone::Supply)
                | (Zone::Bag, Zone::Palm)
                | (Zone::Bag, Zone::Pot)
                | (Zone::Palm, Zone::Bag)
                | (Zone::Palm, Zone::Pot)
                | (Zone::Palm, Zone::Desktop)
                | (Zone::Desktop, Zone::Bag)
                | (Zone::Desktop, Zone::Pot)
                | (Zone::Pot, Zone::Bag)
        )
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Supply => "supply",
            Zone::Bag => "bag",
            Zone::Palm => "palm",
            Zone::Desktop => "desktop",
            Zone::Pot => "pot",
        };
        f.write_str(name)
    }
}

/// Where a chip currently is. `owner` is `None` iff the zone is the supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub zone: Zone,
    pub owner: Option<PlayerId>,
}

impl Location {
    pub fn supply() -> Self {
        Location {
            zone: Zone::Supply,
            owner: None,
        }
    }

    pub fn player(zone: Zone, owner: PlayerId) -> Self {
        debug_assert!(!zone.is_shared());
        Location {
            zone,
            owner: Some(owner),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "{}@{}", self.zone, owner),
            None => write!(f, "{}", self.zone),
        }
    }
}

/// An ordered container of chips
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipZone {
    /// Zone type
    pub zone_type: Zone,

    /// Owner of this zone (`None` for the supply)
    pub owner: Option<PlayerId>,

    /// Chips in this zone. Order matters for the palm and the pot.
    pub chips: Vec<ChipId>,
}

impl ChipZone {
    pub fn new(zone_type: Zone, owner: Option<PlayerId>) -> Self {
        ChipZone {
            zone_type,
            owner,
            chips: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        Location {
            zone: self.zone_type,
            owner: self.owner,
        }
    }

    pub fn add(&mut self, chip_id: ChipId) {
        self.chips.push(chip_id);
    }

    /// Remove a specific chip, preserving the order of the rest
    pub fn remove(&mut self, chip_id: ChipId) -> bool {
        if let Some(pos) = self.position(chip_id) {
            self.chips.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove the chip at `index` by swapping the last chip into its slot.
    ///
    /// Used for the bag, whose order is irrelevant.
    pub fn swap_remove_at(&mut self, index: usize) -> Option<ChipId> {
        if index < self.chips.len() {
            Some(self.chips.swap_remove(index))
        } else {
            None
        }
    }

    pub fn position(&self, chip_id: ChipId) -> Option<usize> {
        self.chips.iter().position(|&id| id == chip_id)
    }

    pub fn contains(&self, chip_id: ChipId) -> bool {
        self.chips.contains(&chip_id)
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn last(&self) -> Option<ChipId> {
        self.chips.last().copied()
    }

    /// Take every chip out, in order
    pub fn drain_all(&mut self) -> Vec<ChipId> {
        std::mem::take(&mut self.chips)
    }
}

/// Collection of all zones for a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub bag: ChipZone,
    pub palm: ChipZone,
    pub desktop: ChipZone,
    pub pot: ChipZone,
}

impl PlayerZones {
    pub fn new(player_id: PlayerId) -> Self {
        PlayerZones {
            bag: ChipZone::new(Zone::Bag, Some(player_id)),
            palm: ChipZone::new(Zone::Palm, Some(player_id)),
            desktop: ChipZone::new(Zone::Desktop, Some(player_id)),
            pot: ChipZone::new(Zone::Pot, Some(player_id)),
        }
    }

    pub fn get_zone(&self, zone: Zone) -> Option<&ChipZone> {
        match zone {
            Zone::Bag => Some(&self.bag),
            Zone::Palm => Some(&self.palm),
            Zone::Desktop => Some(&self.desktop),
            Zone::Pot => Some(&self.pot),
            Zone::Supply => None,
        }
    }

    pub fn get_zone_mut(&mut self, zone: Zone) -> Option<&mut ChipZone> {
        match zone {
            Zone::Bag => Some(&mut self.bag),
            Zone::Palm => Some(&mut self.palm),
            Zone::Desktop => Some(&mut self.desktop),
            Zone::Pot => Some(&mut self.pot),
            Zone::Supply => None,
        }
    }

    /// Total chips across all of this player's zones
    pub fn total(&self) -> usize {
        self.bag.len() + self.palm.len() + self.desktop.len() + self.pot.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_zone() {
        let player_id = PlayerId::new(1);
        let mut zone = ChipZone::new(Zone::Palm, Some(player_id));

        assert_eq!(zone.len(), 0);
        assert!(zone.is_empty());

        let chip1 = ChipId::new(10);
        let chip2 = ChipId::new(11);
        let chip3 = ChipId::new(12);

        zone.add(chip1);
        zone.add(chip2);
        zone.add(chip3);

        assert_eq!(zone.len(), 3);
        assert!(zone.contains(chip1));

        assert!(zone.remove(chip1));
        assert_eq!(zone.chips, vec![chip2, chip3]);
        assert!(!zone.remove(chip1));
    }

    #[test]
    fn test_swap_remove_at() {
        let mut bag = ChipZone::new(Zone::Bag, Some(PlayerId::new(0)));
        for id in 0..4 {
            bag.add(ChipId::new(id));
        }

        assert_eq!(bag.swap_remove_at(1), Some(ChipId::new(1)));
        assert_eq!(bag.chips, vec![ChipId::new(0), ChipId::new(3), ChipId::new(2)]);
        assert_eq!(bag.swap_remove_at(5), None);
    }

    #[test]
    fn test_transition_table() {
        assert!(Zone::Palm.can_move_to(Zone::Desktop));
        assert!(!Zone::Bag.can_move_to(Zone::Desktop));
        assert!(!Zone::Supply.can_move_to(Zone::Palm));
        assert!(!Zone::Pot.can_move_to(Zone::Pot));
    }

    #[test]
    fn test_player_zones() {
        let player_id = PlayerId::new(1);
        let zones = PlayerZones::new(player_id);

        assert_eq!(zones.bag.zone_type, Zone::Bag);
        assert_eq!(zones.pot.location(), Location::player(Zone::Pot, player_id));
        assert!(zones.get_zone(Zone::Supply).is_none());
        assert_eq!(zones.total(), 0);
    }
}
