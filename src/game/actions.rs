//! Zone transition actions
//!
//! These are the only functions that change where a chip is. Each one removes
//! the chip from exactly one container, appends it to exactly one other, and
//! rewrites the location index in the same call. Validation happens before
//! the first mutation, so a failed action leaves the state untouched.

use crate::core::{ChipId, ChipTypeId, Color, PlayerId};
use crate::game::GameState;
use crate::zones::{ChipZone, Location, Zone};
use crate::{GameError, Result};
use rand::{Rng, RngCore};
use smallvec::SmallVec;

/// Chips drawn in one go; most draws take one or two
pub type DrawnChips = SmallVec<[ChipId; 4]>;

impl GameState {
    fn container_mut(&mut self, location: Location) -> Result<&mut ChipZone> {
        match (location.zone, location.owner) {
            (Zone::Supply, _) => Ok(&mut self.supply),
            (zone, Some(player)) => self
                .zones_mut(player)?
                .get_zone_mut(zone)
                .ok_or(GameError::IllegalTransition { from: zone, to: zone }),
            (zone, None) => Err(GameError::LocationMismatch(format!(
                "zone {zone} requires an owner"
            ))),
        }
    }

    fn location_for(zone: Zone, player: PlayerId) -> Location {
        if zone.is_shared() {
            Location::supply()
        } else {
            Location::player(zone, player)
        }
    }

    /// Append a chip that has already been taken out of its source and
    /// record its new location
    fn place(&mut self, chip: ChipId, from: Location, to: Location) -> Result<()> {
        self.container_mut(to)?.add(chip);
        self.locations[chip.index()] = to;
        self.logger.verbose(
            crate::game::logger::LogCategory::ChipMove,
            &format!("{}: {} -> {}", self.describe_chip(chip), from, to),
        );
        Ok(())
    }

    /// Draw one uniformly random chip from the player's bag into the pot or
    /// the palm.
    ///
    /// An empty bag fails with `EmptySource` and changes nothing, so retrying
    /// is harmless.
    pub fn draw_random(
        &mut self,
        player: PlayerId,
        to: Zone,
        rng: &mut dyn RngCore,
    ) -> Result<ChipId> {
        if !matches!(to, Zone::Pot | Zone::Palm) {
            return Err(GameError::IllegalTransition {
                from: Zone::Bag,
                to,
            });
        }

        let bag_len = self.zones(player)?.bag.len();
        if bag_len == 0 {
            return Err(GameError::EmptySource {
                player,
                zone: Zone::Bag,
            });
        }

        let index = rng.gen_range(0..bag_len);
        let chip = self
            .zones_mut(player)?
            .bag
            .swap_remove_at(index)
            .ok_or(GameError::EmptySource {
                player,
                zone: Zone::Bag,
            })?;
        self.place(
            chip,
            Location::player(Zone::Bag, player),
            Location::player(to, player),
        )?;
        Ok(chip)
    }

    /// Draw up to `n` chips from the bag into the palm, stopping early when
    /// the bag runs out. Returns the chips in draw order.
    pub fn draw_n(
        &mut self,
        player: PlayerId,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<DrawnChips> {
        let mut drawn = DrawnChips::new();
        for _ in 0..n {
            match self.draw_random(player, Zone::Palm, rng) {
                Ok(chip) => drawn.push(chip),
                Err(GameError::EmptySource { .. }) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(drawn)
    }

    /// Move a named chip between two of the player's zones (or to and from
    /// the supply).
    ///
    /// Fails with `IllegalTransition` for moves the rules forbid and with
    /// `ChipNotFound` when the chip is not in `from`.
    pub fn move_specific(
        &mut self,
        player: PlayerId,
        chip: ChipId,
        from: Zone,
        to: Zone,
    ) -> Result<()> {
        if !from.can_move_to(to) {
            return Err(GameError::IllegalTransition { from, to });
        }
        let source = Self::location_for(from, player);
        let dest = Self::location_for(to, player);

        // Resolve the destination before touching the source
        self.container(dest.zone, dest.owner)?;

        let removed = self.container_mut(source)?.remove(chip);
        if !removed {
            return Err(GameError::ChipNotFound {
                chip,
                zone: from,
                player: source.owner,
            });
        }
        self.place(chip, source, dest)
    }

    /// Empty the palm, pot, or desktop back into the bag.
    ///
    /// Returns the moved chips in their former order.
    pub fn return_all(&mut self, player: PlayerId, zone: Zone) -> Result<Vec<ChipId>> {
        if !zone.can_move_to(Zone::Bag) || zone.is_shared() {
            return Err(GameError::IllegalTransition {
                from: zone,
                to: Zone::Bag,
            });
        }
        let source = Location::player(zone, player);
        let chips = self.container_mut(source)?.drain_all();
        let bag = Location::player(Zone::Bag, player);
        for &chip in &chips {
            self.place(chip, source, bag)?;
        }
        Ok(chips)
    }

    /// `(bust-color sum, total sum)` of the values in the player's pot
    pub fn pot_sums(&self, player: PlayerId) -> Result<(u32, u32)> {
        let mut bust_sum = 0;
        let mut total = 0;
        for &id in &self.zones(player)?.pot.chips {
            let chip = self.chip(id)?;
            let value = u32::from(chip.value());
            if chip.color().is_bust() {
                bust_sum += value;
            }
            total += value;
        }
        Ok((bust_sum, total))
    }

    /// Move the lowest-id supply chip of `color` into the player's bag.
    ///
    /// Fails with `SupplyExhausted` and changes nothing when none is left.
    pub fn take_from_supply(&mut self, player: PlayerId, color: Color) -> Result<ChipId> {
        self.zones(player)?;
        let chip = self.lowest_supply_chip(|chip_type| chip_type.color == color)?;
        let chip = chip.ok_or(GameError::SupplyExhausted(color))?;
        self.move_specific(player, chip, Zone::Supply, Zone::Bag)?;
        Ok(chip)
    }

    /// Move the lowest-id supply chip of an exact type into the player's bag
    pub fn take_type_from_supply(
        &mut self,
        player: PlayerId,
        type_id: ChipTypeId,
    ) -> Result<ChipId> {
        self.zones(player)?;
        let chip = self.lowest_supply_chip(|t| t == type_id)?;
        let chip = chip.ok_or(GameError::SupplyExhausted(type_id.color))?;
        self.move_specific(player, chip, Zone::Supply, Zone::Bag)?;
        Ok(chip)
    }

    /// Whether the supply still holds a chip of `color`
    pub fn supply_has(&self, color: Color) -> bool {
        self.supply
            .chips
            .iter()
            .any(|&id| self.chip(id).map(|c| c.color() == color).unwrap_or(false))
    }

    /// Whether the supply still holds a chip of exactly this type
    pub fn supply_has_type(&self, type_id: ChipTypeId) -> bool {
        matches!(self.lowest_supply_chip(|t| t == type_id), Ok(Some(_)))
    }

    fn lowest_supply_chip(&self, wanted: impl Fn(ChipTypeId) -> bool) -> Result<Option<ChipId>> {
        let mut best: Option<ChipId> = None;
        for &id in &self.supply.chips {
            if wanted(self.chip(id)?.type_id) && best.map_or(true, |b| id < b) {
                best = Some(id);
            }
        }
        Ok(best)
    }

    /// Send a chip from the player's bag back to the supply
    pub fn return_to_supply(&mut self, player: PlayerId, chip: ChipId) -> Result<()> {
        self.move_specific(player, chip, Zone::Bag, Zone::Supply)
    }

    /// Move `count` chips of one type from the supply into the player's bag,
    /// lowest ids first. All-or-nothing: a shortage fails before any chip moves.
    pub fn give_bag_subset(
        &mut self,
        player: PlayerId,
        type_id: ChipTypeId,
        count: usize,
    ) -> Result<Vec<ChipId>> {
        self.zones(player)?;
        let mut candidates = Vec::new();
        for &id in &self.supply.chips {
            if self.chip(id)?.type_id == type_id {
                candidates.push(id);
            }
        }
        if candidates.len() < count {
            return Err(GameError::SupplyExhausted(type_id.color));
        }
        candidates.sort_unstable();
        candidates.truncate(count);
        for &chip in &candidates {
            self.move_specific(player, chip, Zone::Supply, Zone::Bag)?;
        }
        Ok(candidates)
    }
}
