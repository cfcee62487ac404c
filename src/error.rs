//! Typed errors for the two fallible constructors in this crate: parsing a [`crate::grid::Grid`]
//! and building a [`crate::bank::Bank`]. Everything past construction time is infallible -- a
//! running [`crate::filler::Filler`] never surfaces an error, only an empty result (see
//! `filler::FillListener`).

use thiserror::Error;

/// Failure building a [`crate::grid::Grid`] from a template string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The template string was empty.
    #[error("grid template is empty")]
    Empty,

    /// The template string's length is not a perfect rectangle, or the caller supplied explicit
    /// dimensions that don't multiply out to the template's length.
    #[error("grid template of length {len} is not rectangular for width {width}")]
    NotRectangular { len: usize, width: usize },
}

/// Failure building a [`crate::bank::Bank`] from a word list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankError {
    /// A word was shorter than the minimum of one character.
    #[error("word at index {index} is empty")]
    EmptyWord { index: usize },

    /// A word contained a character outside the crate's alphabet (uppercase ASCII letters).
    #[error("word {word:?} at index {index} contains a non-uppercase-ASCII character")]
    InvalidCharacter { index: usize, word: String },

    /// `pattern_registry_cap` was below the minimum of 2.
    #[error("pattern_registry_cap must be at least 2, got {0}")]
    RegistryCapTooSmall(usize),
}
