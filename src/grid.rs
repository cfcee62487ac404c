//! Grid parsing and slot enumeration.
//!
//! A grid is handed to us as a single string of `width * height` characters, row-major, where
//! `'.'` marks a dark cell and anything else marks a light one (see [`DARK`]). This module's only
//! job is to turn that string into the ordered list of [`Slot`]s the rest of the crate operates
//! on -- it does not know about patterns, banks, or fill state.

use crate::error::GridError;
use crate::types::{CellIndex, Direction};

use log::debug;

/// The character that marks a dark (unusable) cell.
pub const DARK: char = '.';

/// A maximal run of light cells in one direction -- what a solver calls an "entry".
///
/// Built once from a [`Grid`] and never mutated afterwards; everything downstream (answers, fill
/// states) refers to slots by index into `Grid::slots()`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot {
    pub direction: Direction,
    /// Conventional crossword numbering of the slot's starting cell. Carried as plain metadata --
    /// nothing in this crate renders it, since rendering belongs to a downstream consumer, but
    /// it falls out for free alongside slot enumeration so there's no reason to drop it.
    pub number: u32,
    /// Cell indices in contiguous geometric order, length >= 2.
    pub cells: Vec<CellIndex>,
}

impl Slot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A parsed rectangular grid: dimensions, which cells are light, and the slots they form.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major; `light[r * width + c]` is true iff `(r, c)` is a light cell.
    light: Vec<bool>,
    slots: Vec<Slot>,
}

impl Grid {
    /// Build a grid from a template string and an explicit width. `template.len()` must be a
    /// positive multiple of `width`.
    pub fn build(template: &str, width: usize) -> Result<Grid, GridError> {
        let chars: Vec<char> = template.chars().collect();
        if chars.is_empty() {
            return Err(GridError::Empty);
        }
        if width == 0 || chars.len() % width != 0 {
            return Err(GridError::NotRectangular {
                len: chars.len(),
                width,
            });
        }
        let height = chars.len() / width;
        let light: Vec<bool> = chars.iter().map(|&c| c != DARK).collect();

        let slots = enumerate_slots(&light, width, height);

        #[cfg(feature = "check_invariants")]
        {
            let mut crossing_counts = vec![0u8; light.len()];
            for slot in &slots {
                for &cell in &slot.cells {
                    crossing_counts[cell] += 1;
                }
            }
            assert!(
                crossing_counts.iter().all(|&n| n <= 2),
                "a rectangular grid must never produce a cell crossed by more than one across \
                 and one down slot"
            );
        }

        debug!(
            "parsed grid {}x{} with {} light cells and {} slots",
            width,
            height,
            light.iter().filter(|&&l| l).count(),
            slots.len()
        );

        Ok(Grid {
            width,
            height,
            light,
            slots,
        })
    }

    /// Convenience constructor for the common case of a square grid, where the width can be
    /// derived from the template's length.
    pub fn build_square(template: &str) -> Result<Grid, GridError> {
        let len = template.chars().count();
        if len == 0 {
            return Err(GridError::Empty);
        }
        let width = (len as f64).sqrt().round() as usize;
        if width == 0 || width * width != len {
            return Err(GridError::NotRectangular { len, width });
        }
        Grid::build(template, width)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.light.len()
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[must_use]
    pub fn is_dark(&self, cell: CellIndex) -> bool {
        !self.light[cell]
    }

    #[must_use]
    pub fn cell_index(&self, row: usize, col: usize) -> CellIndex {
        row * self.width + col
    }

    /// Render a complete letter assignment back into an `R`-line, newline-separated grid string,
    /// using `dark` for dark cells and `blank` wherever `legend` has no entry for a light cell.
    #[must_use]
    pub fn render(&self, legend: impl Fn(CellIndex) -> Option<char>, blank: char) -> String {
        let mut rows = Vec::with_capacity(self.height);
        for r in 0..self.height {
            let mut row = String::with_capacity(self.width);
            for c in 0..self.width {
                let idx = self.cell_index(r, c);
                if self.is_dark(idx) {
                    row.push(DARK);
                } else {
                    row.push(legend(idx).unwrap_or(blank));
                }
            }
            rows.push(row);
        }
        rows.join("\n")
    }
}

fn is_light(light: &[bool], width: usize, height: usize, row: isize, col: isize) -> bool {
    if row < 0 || col < 0 || row as usize >= height || col as usize >= width {
        return false;
    }
    light[row as usize * width + col as usize]
}

fn starts_across(light: &[bool], width: usize, height: usize, row: usize, col: usize) -> bool {
    if !light[row * width + col] {
        return false;
    }
    let left_dark = col == 0 || !is_light(light, width, height, row as isize, col as isize - 1);
    let right_light = is_light(light, width, height, row as isize, col as isize + 1);
    left_dark && right_light
}

fn starts_down(light: &[bool], width: usize, height: usize, row: usize, col: usize) -> bool {
    if !light[row * width + col] {
        return false;
    }
    let up_dark = row == 0 || !is_light(light, width, height, row as isize - 1, col as isize);
    let down_light = is_light(light, width, height, row as isize + 1, col as isize);
    up_dark && down_light
}

fn run_across(width: usize, row: usize, col: usize, light: &[bool]) -> Vec<CellIndex> {
    let mut cells = Vec::new();
    let mut c = col;
    while c < width && light[row * width + c] {
        cells.push(row * width + c);
        c += 1;
    }
    cells
}

fn run_down(width: usize, height: usize, row: usize, col: usize, light: &[bool]) -> Vec<CellIndex> {
    let mut cells = Vec::new();
    let mut r = row;
    while r < height && light[r * width + col] {
        cells.push(r * width + col);
        r += 1;
    }
    cells
}

/// Scan the grid row-major, assigning the conventional crossword numbering and collecting every
/// across/down slot of length >= 2 along the way. Single-cell runs are not slots.
fn enumerate_slots(light: &[bool], width: usize, height: usize) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut number = 1u32;

    for row in 0..height {
        for col in 0..width {
            let across = starts_across(light, width, height, row, col);
            let down = starts_down(light, width, height, row, col);

            if !across && !down {
                continue;
            }

            if across {
                let cells = run_across(width, row, col, light);
                if cells.len() >= 2 {
                    slots.push(Slot {
                        direction: Direction::Across,
                        number,
                        cells,
                    });
                }
            }
            if down {
                let cells = run_down(width, height, row, col, light);
                if cells.len() >= 2 {
                    slots.push(Slot {
                        direction: Direction::Down,
                        number,
                        cells,
                    });
                }
            }
            number += 1;
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_empty() {
        assert_eq!(Grid::build("", 0), Err(GridError::Empty));
    }

    #[test]
    fn build_rejects_non_rectangular() {
        assert!(matches!(
            Grid::build("abc", 2),
            Err(GridError::NotRectangular { len: 3, width: 2 })
        ));
    }

    #[test]
    fn build_square_derives_width() {
        let grid = Grid::build_square("____").unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
    }

    #[test]
    fn build_square_rejects_non_square_length() {
        assert!(Grid::build_square("_____").is_err());
    }

    #[test]
    fn two_by_two_has_four_slots() {
        let grid = Grid::build_square("____").unwrap();
        assert_eq!(grid.slots().len(), 4);
        for slot in grid.slots() {
            assert_eq!(slot.len(), 2);
        }
    }

    #[test]
    fn three_by_three_with_darks() {
        // AB.
        // CDE
        // .FG
        let grid = Grid::build_square("__.___.__").unwrap();
        // across: row0 (0,1) len2, row1 (3,4,5) len3, row2 (7,8) len2
        // down: col0 (0,3) len2, col1 (1,4,7) len3, col2 (4,5 ... ) etc
        let across: Vec<_> = grid
            .slots()
            .iter()
            .filter(|s| s.direction == Direction::Across)
            .collect();
        let down: Vec<_> = grid
            .slots()
            .iter()
            .filter(|s| s.direction == Direction::Down)
            .collect();
        assert_eq!(across.len(), 3);
        assert_eq!(down.len(), 3);
    }

    #[test]
    fn single_cell_runs_are_not_slots() {
        // a 1x1 grid of all light cells would only ever produce zero slots since a slot needs
        // length >= 2; a 1x3 grid with darks on both sides of the middle cell produces none.
        let grid = Grid::build(".a.", 3).unwrap();
        assert!(grid.slots().is_empty());
    }

    #[test]
    fn numbering_skips_cells_that_start_nothing() {
        let grid = Grid::build_square("____").unwrap();
        let numbers: Vec<u32> = grid.slots().iter().map(|s| s.number).collect();
        // top-left cell starts both an across and a down slot, numbered 1; top-right starts only
        // a down slot, numbered 2; bottom-left starts only an across slot, numbered 3.
        assert!(numbers.contains(&1));
        assert!(numbers.contains(&2) || numbers.contains(&3));
    }

    #[test]
    fn render_fills_dark_and_blank_cells() {
        let grid = Grid::build_square("____").unwrap();
        let legend = |cell: CellIndex| if cell == 0 { Some('A') } else { None };
        let rendered = grid.render(legend, '_');
        assert_eq!(rendered, "A_\n__");
    }
}
