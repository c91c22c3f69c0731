//! Static configuration tables
//!
//! Chip inventory, board, event deck, shop prices, and the standard starting
//! bag. Loaded once before the game is built and never changed afterwards.
//! A JSON file only needs the tables it wants to replace; every missing one
//! falls back to the built-in default.

use crate::core::{Board, ChipTypeId, Color, EventCard};
use crate::loader::defaults;
use crate::{GameError, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// How many chips of one type the game box holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSpec {
    pub color: Color,
    pub value: u8,
    pub count: u32,
    #[serde(default)]
    pub name: String,
}

impl ChipSpec {
    pub fn type_id(&self) -> ChipTypeId {
        ChipTypeId::new(self.color, self.value)
    }
}

/// Shop price of one chip type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub color: Color,
    pub value: u8,
    pub price: u32,
}

impl PriceEntry {
    pub fn type_id(&self) -> ChipTypeId {
        ChipTypeId::new(self.color, self.value)
    }
}

/// One line of a bag recipe: `count` chips of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagEntry {
    pub color: Color,
    pub value: u8,
    pub count: usize,
}

impl BagEntry {
    pub fn new(color: Color, value: u8, count: usize) -> Self {
        BagEntry {
            color,
            value,
            count,
        }
    }

    pub fn type_id(&self) -> ChipTypeId {
        ChipTypeId::new(self.color, self.value)
    }
}

/// Parse a bag recipe from text
///
/// Entries are separated by commas or newlines and read `<count> <color>:<value>`,
/// e.g. `4 gray:1, 2 gray:2, 1 orange:1`. Lines starting with `#` are
/// comments.
pub fn parse_bag_recipe(text: &str) -> Result<Vec<BagEntry>> {
    let mut recipe = Vec::new();
    for item in text.split([',', '\n']) {
        let item = item.trim();
        if item.is_empty() || item.starts_with('#') {
            continue;
        }

        let (count, type_text) = item.split_once(char::is_whitespace).ok_or_else(|| {
            GameError::InvalidConfig(format!("bag entry '{item}' is not '<count> <color>:<value>'"))
        })?;
        let count = count
            .parse::<usize>()
            .map_err(|_| GameError::InvalidConfig(format!("bad chip count in '{item}'")))?;
        let type_id: ChipTypeId = type_text.trim().parse()?;
        recipe.push(BagEntry::new(type_id.color, type_id.value, count));
    }

    if recipe.is_empty() {
        return Err(GameError::InvalidConfig("Empty bag recipe".to_string()));
    }
    Ok(recipe)
}

/// Every static table the game consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTables {
    pub inventory: Vec<ChipSpec>,
    pub board: Board,
    pub deck: Vec<EventCard>,
    pub prices: Vec<PriceEntry>,
    pub starting_bag: Vec<BagEntry>,
}

impl Default for GameTables {
    fn default() -> Self {
        GameTables {
            inventory: defaults::standard_inventory(),
            board: defaults::standard_board(),
            deck: defaults::standard_deck(),
            prices: defaults::standard_prices(),
            starting_bag: defaults::standard_starting_bag(),
        }
    }
}

impl GameTables {
    /// Load tables from a JSON file and validate them
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse tables from JSON text and validate them
    pub fn parse(content: &str) -> Result<Self> {
        let tables: GameTables = serde_json::from_str(content)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Total number of chips in the box
    pub fn total_chips(&self) -> u32 {
        self.inventory.iter().map(|spec| spec.count).sum()
    }

    /// Shop prices keyed by chip type
    pub fn price_table(&self) -> BTreeMap<ChipTypeId, u32> {
        self.prices
            .iter()
            .map(|entry| (entry.type_id(), entry.price))
            .collect()
    }

    /// Reject tables the engine cannot run on
    pub fn validate(&self) -> Result<()> {
        if self.board.is_empty() {
            return Err(GameError::InvalidConfig("Empty board".to_string()));
        }

        let mut types = FxHashSet::default();
        for spec in &self.inventory {
            if spec.count == 0 {
                return Err(GameError::InvalidConfig(format!(
                    "inventory lists {} with a count of zero",
                    spec.type_id()
                )));
            }
            if !types.insert(spec.type_id()) {
                return Err(GameError::InvalidConfig(format!(
                    "inventory lists {} twice",
                    spec.type_id()
                )));
            }
        }
        if types.is_empty() {
            return Err(GameError::InvalidConfig("Empty chip inventory".to_string()));
        }

        for entry in &self.prices {
            if !types.contains(&entry.type_id()) {
                return Err(GameError::UnknownChipType(entry.type_id().to_string()));
            }
        }
        for entry in &self.starting_bag {
            if !types.contains(&entry.type_id()) {
                return Err(GameError::UnknownChipType(entry.type_id().to_string()));
            }
        }

        let mut card_ids = FxHashSet::default();
        for card in &self.deck {
            if !card_ids.insert(card.card_id.as_str()) {
                return Err(GameError::InvalidConfig(format!(
                    "event card {} appears twice",
                    card.card_id
                )));
            }
        }
        Ok(())
    }
}
