//! Centralized tuning constants for the location-guessing core.
//!
//! Scoring and feedback wording are fixed here so that gameplay can only be
//! adjusted via reviewed code changes, while location data stays in JSON.

// Scoring ------------------------------------------------------------------
/// Day counter value at the start of every location.
pub const STARTING_DAY_COUNTER: u32 = 1;
/// Days added to the per-location counter for every wrong guess.
pub const DAYS_PER_WRONG_GUESS: u32 = 1;

// Catalog defaults ---------------------------------------------------------
/// Click tolerance (native pixels) used when a location omits one.
pub const DEFAULT_TOLERANCE: f64 = 30.0;

// Feedback templates -------------------------------------------------------
pub(crate) const MSG_CORRECT_PREFIX: &str = "You clicked on the correct city! This postcard of ";
pub(crate) const MSG_CORRECT_BELONGS: &str = " belongs to: ";
pub(crate) const MSG_INCORRECT_PREFIX: &str = "Oh no! Your next location is ";
pub(crate) const MSG_INCORRECT_SUFFIX: &str = ". Good luck!";

// View transform -----------------------------------------------------------
pub(crate) const MIN_VIEW_SCALE: f64 = 1e-6;
