//! Guess model: current location, click history, scoring and the input phase.
use serde::{Deserialize, Serialize};

use crate::catalog::{Location, LocationCatalog};
use crate::constants::{DAYS_PER_WRONG_GUESS, STARTING_DAY_COUNTER};
use crate::geometry::Point;

/// Which kind of input the game is currently interpreting.
///
/// Exactly one phase is active at a time, so "accepting map clicks",
/// "message box visible" and "travel path visible" can never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GuessPhase {
    /// Map clicks are judged as guesses against the current location.
    #[default]
    AwaitingGuess,
    /// A feedback message is shown; only its continue control is honored.
    ShowingFeedback,
    /// The travel path replay is shown; only its continue control is honored.
    ShowingTravelPath,
    /// Every location has been found. No further input is processed.
    Complete,
}

/// One judged click, stored in native coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickRecord {
    pub point: Point,
    pub was_correct: bool,
}

/// Serializable view of a session for debugging and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub location_index: usize,
    pub location_count: usize,
    pub days_travelled: u32,
    pub day_counter: u32,
    pub guesses_at_location: u32,
    pub phase: GuessPhase,
    pub click_history: Vec<ClickRecord>,
}

/// Pure game state for one playthrough.
#[derive(Debug, Clone)]
pub struct GuessModel {
    catalog: LocationCatalog,
    click_history: Vec<ClickRecord>,
    days_travelled: u32,
    day_counter: u32,
    guesses_at_location: u32,
    last_credit: Option<u32>,
    phase: GuessPhase,
}

impl GuessModel {
    #[must_use]
    pub fn new(catalog: LocationCatalog) -> Self {
        let phase = if catalog.is_exhausted() {
            GuessPhase::Complete
        } else {
            GuessPhase::AwaitingGuess
        };
        Self {
            catalog,
            click_history: Vec::new(),
            days_travelled: 0,
            day_counter: STARTING_DAY_COUNTER,
            guesses_at_location: 0,
            last_credit: None,
            phase,
        }
    }

    /// True iff `point` (native space) lies within the current location's
    /// tolerance, boundary inclusive. Always false once the catalog is exhausted.
    #[must_use]
    pub fn is_click_correct(&self, point: Point) -> bool {
        self.catalog
            .current()
            .is_some_and(|location| location.accepts(point))
    }

    /// Append a judged click and apply its score.
    ///
    /// A wrong guess adds a day to the running counter; a correct one credits
    /// the counter to `days_travelled` and resets it.
    pub fn record_click(&mut self, point: Point, was_correct: bool) {
        self.click_history.push(ClickRecord { point, was_correct });
        self.guesses_at_location = self.guesses_at_location.saturating_add(1);
        if was_correct {
            self.days_travelled = self.days_travelled.saturating_add(self.day_counter);
            self.last_credit = Some(self.day_counter);
            self.day_counter = STARTING_DAY_COUNTER;
        } else {
            self.day_counter = self.day_counter.saturating_add(DAYS_PER_WRONG_GUESS);
        }
    }

    /// Correctness of the most recent click; `false` when nothing was clicked.
    #[must_use]
    pub fn last_click_was_correct(&self) -> bool {
        self.click_history
            .last()
            .is_some_and(|record| record.was_correct)
    }

    /// Move to the next location. Returns whether a current location remains.
    ///
    /// Exhaustion is a normal end state; calling this again afterwards is a
    /// no-op that keeps returning `false`.
    pub fn advance_to_next(&mut self) -> bool {
        if self.catalog.is_exhausted() {
            return false;
        }
        self.guesses_at_location = 0;
        self.catalog.advance().is_some()
    }

    /// Points of every correct click, in the order they were recorded.
    pub fn correct_click_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.click_history
            .iter()
            .filter(|record| record.was_correct)
            .map(|record| record.point)
    }

    #[must_use]
    pub fn has_correct_clicks(&self) -> bool {
        self.click_history.iter().any(|record| record.was_correct)
    }

    #[must_use]
    pub fn current_location(&self) -> Option<&Location> {
        self.catalog.current()
    }

    #[must_use]
    pub fn current_location_index(&self) -> usize {
        self.catalog.index()
    }

    #[must_use]
    pub fn location_count(&self) -> usize {
        self.catalog.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.catalog.is_exhausted()
    }

    #[must_use]
    pub fn click_history(&self) -> &[ClickRecord] {
        &self.click_history
    }

    #[must_use]
    pub const fn days_travelled(&self) -> u32 {
        self.days_travelled
    }

    /// Days that will be credited by the next correct guess.
    #[must_use]
    pub const fn day_counter(&self) -> u32 {
        self.day_counter
    }

    #[must_use]
    pub const fn guesses_at_location(&self) -> u32 {
        self.guesses_at_location
    }

    /// Days credited by the most recent correct guess.
    #[must_use]
    pub const fn last_credit(&self) -> Option<u32> {
        self.last_credit
    }

    #[must_use]
    pub const fn phase(&self) -> GuessPhase {
        self.phase
    }

    /// Switch input phase.
    ///
    /// Guessing can only resume while a location remains, and `Complete` is
    /// final; violating either is a controller bug.
    pub fn set_phase(&mut self, phase: GuessPhase) {
        debug_assert!(
            !(phase == GuessPhase::AwaitingGuess && self.catalog.is_exhausted()),
            "cannot await a guess once the catalog is exhausted"
        );
        debug_assert!(
            self.phase != GuessPhase::Complete || phase == GuessPhase::Complete,
            "complete is a terminal phase"
        );
        self.phase = phase;
    }

    #[must_use]
    pub fn message_box_visible(&self) -> bool {
        self.phase == GuessPhase::ShowingFeedback
    }

    #[must_use]
    pub fn travel_path_visible(&self) -> bool {
        self.phase == GuessPhase::ShowingTravelPath
    }

    #[must_use]
    pub fn accepting_clicks(&self) -> bool {
        self.phase == GuessPhase::AwaitingGuess
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            location_index: self.catalog.index(),
            location_count: self.catalog.len(),
            days_travelled: self.days_travelled,
            day_counter: self.day_counter,
            guesses_at_location: self.guesses_at_location,
            phase: self.phase,
            click_history: self.click_history.clone(),
        }
    }
}
