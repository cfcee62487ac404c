//! Shared index types used throughout the crate.
//!
//! These are plain `usize` aliases rather than newtype wrappers: every index here is immediately
//! used to subscript a `Vec` in `bank` and `fill_state`, and a newtype would just mean unwrapping
//! it again at each of those call sites.

/// Row-major index of a light cell in the grid.
pub type CellIndex = usize;

/// Index of a [`crate::grid::Slot`] within a [`crate::grid::Grid`]'s slot list, and correspondingly
/// within a [`crate::fill_state::FillState`]'s `answers`.
pub type SlotIndex = usize;

/// The two directions a slot can run in a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Across,
    Down,
}
