//! Event card records

use serde::{Deserialize, Serialize};
use std::fmt;

/// When an event card's effect applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Executes immediately and completely upon draw
    #[serde(alias = "purple")]
    OneShot,
    /// Stays active for the rest of the round
    #[serde(alias = "blue")]
    RoundModifier,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::OneShot => f.write_str("one-shot"),
            EventKind::RoundModifier => f.write_str("round-modifier"),
        }
    }
}

/// Whether a card is resolved once for the table or once per player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    #[default]
    Global,
    PerPlayer,
}

impl fmt::Display for EventScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventScope::Global => f.write_str("global"),
            EventScope::PerPlayer => f.write_str("per_player"),
        }
    }
}

/// One event card. `card_id` is stable and unique within a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCard {
    pub card_id: String,
    #[serde(alias = "color")]
    pub kind: EventKind,
    #[serde(default)]
    pub scope: EventScope,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl EventCard {
    pub fn new(
        card_id: impl Into<String>,
        kind: EventKind,
        scope: EventScope,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        EventCard {
            card_id: card_id.into(),
            kind,
            scope,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_one_shot(&self) -> bool {
        self.kind == EventKind::OneShot
    }
}

impl fmt::Display for EventCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.card_id, self.kind, self.title)
    }
}
