//! Round phases and their prerequisites

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a round, in play order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseId {
    Start,
    EventCard,
    PreDraw,
    Drawing,
    WinnerRoll,
    Evaluation,
    Rubies,
    Scoring,
    Purchase,
    ResourceTrade,
}

/// Fixed phase order of every round. Cleanup runs after the last phase and is
/// not listed because it runs even when a phase fails.
pub const ROUND_PHASES: [PhaseId; 10] = [
    PhaseId::Start,
    PhaseId::EventCard,
    PhaseId::PreDraw,
    PhaseId::Drawing,
    PhaseId::WinnerRoll,
    PhaseId::Evaluation,
    PhaseId::Rubies,
    PhaseId::Scoring,
    PhaseId::Purchase,
    PhaseId::ResourceTrade,
];

impl PhaseId {
    pub fn name(&self) -> &'static str {
        match self {
            PhaseId::Start => "start",
            PhaseId::EventCard => "event card",
            PhaseId::PreDraw => "pre-draw",
            PhaseId::Drawing => "drawing",
            PhaseId::WinnerRoll => "winner roll",
            PhaseId::Evaluation => "evaluation",
            PhaseId::Rubies => "rubies",
            PhaseId::Scoring => "scoring",
            PhaseId::Purchase => "purchase",
            PhaseId::ResourceTrade => "resource trade",
        }
    }

    /// Round context keys that must be populated before this phase runs
    pub fn requires(&self) -> &'static [ContextKey] {
        match self {
            PhaseId::Drawing => &[ContextKey::DrawLimit, ContextKey::PreDrawCounts],
            PhaseId::WinnerRoll | PhaseId::Rubies | PhaseId::Scoring => {
                &[ContextKey::DrawingResults]
            }
            _ => &[],
        }
    }

    /// Next phase in round order, `None` after the last one
    pub fn next(&self) -> Option<PhaseId> {
        let idx = ROUND_PHASES.iter().position(|p| p == self)?;
        ROUND_PHASES.get(idx + 1).copied()
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keys of round-scoped data that phases declare as prerequisites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKey {
    DrawLimit,
    PreDrawCounts,
    DrawingResults,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextKey::DrawLimit => "draw_limit",
            ContextKey::PreDrawCounts => "pre_draw_counts",
            ContextKey::DrawingResults => "drawing_results",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert_eq!(ROUND_PHASES[0], PhaseId::Start);
        assert_eq!(PhaseId::Drawing.next(), Some(PhaseId::WinnerRoll));
        assert_eq!(PhaseId::ResourceTrade.next(), None);
    }

    #[test]
    fn test_reward_phases_need_results() {
        for phase in [PhaseId::WinnerRoll, PhaseId::Rubies, PhaseId::Scoring] {
            assert_eq!(phase.requires(), &[ContextKey::DrawingResults]);
        }
        assert!(PhaseId::Start.requires().is_empty());
        assert!(PhaseId::Drawing.requires().contains(&ContextKey::DrawLimit));
    }

    #[test]
    fn test_display() {
        assert_eq!(PhaseId::WinnerRoll.to_string(), "winner roll");
        assert_eq!(ContextKey::DrawLimit.to_string(), "draw_limit");
    }
}
