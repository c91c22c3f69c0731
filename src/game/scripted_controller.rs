//! Scripted player controller for testing
//!
//! This controller answers from a predetermined queue of typed answers,
//! which makes whole games replayable from a seed plus the script.

use crate::core::{ChipId, EventCard, PlayerId};
use crate::game::controller::{
    EventOption, GameStateView, PalmChoice, PlayerController, RubyTrade, ShopOffer,
};
use std::collections::VecDeque;

/// One canned answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    PreDraw(u32),
    Continue(bool),
    DrawCount(usize),
    Palm(PalmChoice),
    /// Commit this chip, wherever it sits in the palm
    CommitChip(ChipId),
    Potion(bool),
    ReturnFirst(bool),
    RemovePreceding(bool),
    EventOption(usize),
    Purchase(Option<usize>),
    Trade(RubyTrade),
    Ack(bool),
}

/// A controller that follows a predetermined sequence of answers
///
/// Each question consumes the front of the queue only when the front answers
/// that kind of question; otherwise the default answer is used and the queue
/// is left alone. Scripts therefore only need to list the interesting
/// answers. Defaults: no rat tails, stop drawing, draw one chip, commit the
/// first palm chip, decline optional effects, first event option, buy
/// nothing, finish trading, acknowledge.
#[derive(Debug, Clone)]
pub struct ScriptedController {
    player_id: PlayerId,
    answers: VecDeque<Answer>,
}

impl ScriptedController {
    /// Create a new scripted controller with a sequence of answers
    pub fn new(player_id: PlayerId, answers: Vec<Answer>) -> Self {
        ScriptedController {
            player_id,
            answers: answers.into(),
        }
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next<T>(&mut self, pick: impl Fn(Answer) -> Option<T>) -> Option<T> {
        let value = pick(*self.answers.front()?)?;
        self.answers.pop_front();
        Some(value)
    }
}

impl PlayerController for ScriptedController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_pre_draw_count(&mut self, _view: &GameStateView) -> u32 {
        self.next(|a| match a {
            Answer::PreDraw(n) => Some(n),
            _ => None,
        })
        .unwrap_or(0)
    }

    fn wants_to_continue(&mut self, _view: &GameStateView, _bust_sum: u32, _limit: u32) -> bool {
        self.next(|a| match a {
            Answer::Continue(yes) => Some(yes),
            _ => None,
        })
        .unwrap_or(false)
    }

    fn choose_draw_count(&mut self, _view: &GameStateView) -> usize {
        self.next(|a| match a {
            Answer::DrawCount(n) => Some(n),
            _ => None,
        })
        .unwrap_or(1)
    }

    fn choose_palm_action(
        &mut self,
        _view: &GameStateView,
        palm: &[ChipId],
        _allow_return: bool,
    ) -> PalmChoice {
        self.next(|a| match a {
            Answer::Palm(choice) => Some(choice),
            // A chip missing from the palm becomes an out-of-range index
            Answer::CommitChip(chip) => Some(PalmChoice::Commit(
                palm.iter().position(|&c| c == chip).unwrap_or(palm.len()),
            )),
            _ => None,
        })
        .unwrap_or(PalmChoice::Commit(0))
    }

    fn use_potion(&mut self, _view: &GameStateView, _chip: ChipId) -> bool {
        self.next(|a| match a {
            Answer::Potion(yes) => Some(yes),
            _ => None,
        })
        .unwrap_or(false)
    }

    fn return_first_chip(&mut self, _view: &GameStateView, _chip: ChipId) -> bool {
        self.next(|a| match a {
            Answer::ReturnFirst(yes) => Some(yes),
            _ => None,
        })
        .unwrap_or(false)
    }

    fn remove_preceding_chip(
        &mut self,
        _view: &GameStateView,
        _placed: ChipId,
        _preceding: ChipId,
    ) -> bool {
        self.next(|a| match a {
            Answer::RemovePreceding(yes) => Some(yes),
            _ => None,
        })
        .unwrap_or(false)
    }

    fn choose_event_option(
        &mut self,
        _view: &GameStateView,
        _card: &EventCard,
        _options: &[EventOption],
    ) -> usize {
        self.next(|a| match a {
            Answer::EventOption(idx) => Some(idx),
            _ => None,
        })
        .unwrap_or(0)
    }

    fn choose_purchase(&mut self, _view: &GameStateView, _offers: &[ShopOffer]) -> Option<usize> {
        self.next(|a| match a {
            Answer::Purchase(choice) => Some(choice),
            _ => None,
        })
        .flatten()
    }

    fn choose_ruby_trade(&mut self, _view: &GameStateView) -> RubyTrade {
        self.next(|a| match a {
            Answer::Trade(trade) => Some(trade),
            _ => None,
        })
        .unwrap_or(RubyTrade::Done)
    }

    fn acknowledge(&mut self, _view: &GameStateView, _message: &str) -> bool {
        self.next(|a| match a {
            Answer::Ack(yes) => Some(yes),
            _ => None,
        })
        .unwrap_or(true)
    }
}
