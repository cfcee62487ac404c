#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_on_vec_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! Crossword-grid autofill engine: a pattern-indexed word bank and a ranked depth-first
//! backtracking filler that fills every light cell of a grid so that every across/down run spells
//! a word from the bank, with no word reused.
//!
//! Five layers, leaves first: [`grid`] parses a template string into slots, [`pattern`] and
//! [`answer`] model a slot's in-progress letters, [`bank`] is the immutable indexed word store and
//! ranking heuristic, and [`fill_state`]/[`filler`] carry out the search itself. `.puz`/QXW I/O,
//! clue text, rendering to HTML or PDF, and CLI argument parsing are all external collaborators
//! this crate never touches.

pub mod answer;
pub mod bank;
pub mod error;
pub mod fill_state;
pub mod filler;
pub mod grid;
pub mod pattern;
pub mod types;

/// The expected maximum length for a single slot. Not enforced anywhere in the core -- a longer
/// slot simply falls back to `Bank::filter_slowly` once its pattern exceeds the registry cap --
/// but it's well above what any real crossword grid's longest entry runs to.
pub const MAX_SLOT_LENGTH: usize = 21;
