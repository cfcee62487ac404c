//! `FillState`: an immutable snapshot of one node in the backtracking search.
//!
//! A `FillState` bundles every slot's current `Answer`, the (shared, never-mutated) crossings
//! table, and a `used` vector tracking which slots are complete and what they spell. States are
//! produced by `advance` and never mutated in place: a child state can share structure with its
//! parent, and backtracking is just letting a reference go out of scope rather than undoing a
//! mutation.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::answer::{most_constrained_first_key, Answer};
use crate::grid::Grid;
use crate::types::{CellIndex, SlotIndex};

/// Up to two slots ever cross a given cell (one across, one down) in a rectangular grid; the
/// model permits more, but `SmallVec` with an inline capacity of 2 means the common case never
/// allocates.
type Crossing = SmallVec<[SlotIndex; 2]>;

/// The result of evaluating a proposed set of letter commitments against every slot they touch:
/// the newly-completed answers, and the mean crossing-match rank of the whole batch.
///
/// A "dead" changeset (see `is_dead`) signals that some crossing has zero viable completions --
/// the candidate that produced it must be rejected outright, independent of `rank`.
#[derive(Debug, Clone)]
pub struct AnswerChangeset {
    entries: HashMap<SlotIndex, Answer>,
    rank: f64,
    dead: bool,
}

impl AnswerChangeset {
    fn dead() -> AnswerChangeset {
        AnswerChangeset {
            entries: HashMap::new(),
            rank: 0.0,
            dead: true,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &HashMap<SlotIndex, Answer> {
        &self.entries
    }

    #[must_use]
    pub fn rank(&self) -> f64 {
        self.rank
    }

    /// True iff this changeset resulted from a crossing with zero viable completions and must be
    /// treated as a dead branch, regardless of `rank`'s numeric value.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

/// A proposed commitment: the cell-to-letter map a candidate word would force, plus the set of
/// slots it would newly complete and the mean rank of the crossings it touches.
#[derive(Debug, Clone)]
pub struct Suggestion {
    letter_map: HashMap<CellIndex, char>,
    new_entries: HashMap<SlotIndex, Answer>,
    rank: f64,
}

impl Suggestion {
    #[must_use]
    pub fn new(letter_map: HashMap<CellIndex, char>, changeset: AnswerChangeset) -> Suggestion {
        debug_assert!(!changeset.is_dead(), "a dead changeset is never a valid suggestion");
        Suggestion {
            letter_map,
            new_entries: changeset.entries,
            rank: changeset.rank,
        }
    }

    #[must_use]
    pub fn letter_map(&self) -> &HashMap<CellIndex, char> {
        &self.letter_map
    }

    #[must_use]
    pub fn new_entries(&self) -> &HashMap<SlotIndex, Answer> {
        &self.new_entries
    }

    #[must_use]
    pub fn rank(&self) -> f64 {
        self.rank
    }
}

/// An immutable snapshot of the search: every slot's current answer, the shared crossings table,
/// and which slots are complete.
#[derive(Debug, Clone)]
pub struct FillState {
    answers: Vec<Answer>,
    crossings: Rc<Vec<Crossing>>,
    used: Vec<Option<String>>,
    num_incomplete: usize,
}

impl FillState {
    /// Build a state from a list of (possibly already partially filled) answers and the total
    /// cell count they range over. Exposed mainly for tests that want to exercise `FillState`
    /// without going through a full `Grid`.
    #[must_use]
    pub fn from_answers(answers: Vec<Answer>, num_cells: usize) -> FillState {
        let mut crossings: Vec<Crossing> = vec![Crossing::new(); num_cells];
        for (slot_idx, answer) in answers.iter().enumerate() {
            for content in answer.content() {
                if let crate::answer::Content::Cell(cell) = *content {
                    crossings[cell].push(slot_idx);
                }
            }
        }
        let used: Vec<Option<String>> = answers.iter().map(Answer::rendering).collect();
        let num_incomplete = used.iter().filter(|u| u.is_none()).count();
        FillState {
            answers,
            crossings: Rc::new(crossings),
            used,
            num_incomplete,
        }
    }

    /// Build the initial state for a freshly-parsed grid: every slot fully uncommitted.
    #[must_use]
    pub fn from_grid(grid: &Grid) -> FillState {
        let answers = grid.slots().iter().map(|s| Answer::unfilled(&s.cells)).collect();
        FillState::from_answers(answers, grid.num_cells())
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn used(&self) -> &[Option<String>] {
        &self.used
    }

    #[must_use]
    pub fn num_incomplete(&self) -> usize {
        self.num_incomplete
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.num_incomplete == 0
    }

    /// The set of renderings already committed somewhere in this state, for "don't reuse a word"
    /// checks.
    #[must_use]
    pub fn used_renderings(&self) -> HashSet<String> {
        self.used.iter().flatten().cloned().collect()
    }

    /// Indexes of slots that are not yet complete, ordered by `sort_key`. The default ordering is
    /// [`crate::answer::most_constrained_first_key`].
    #[must_use]
    pub fn provide_unfilled<K: Ord>(&self, sort_key: impl Fn(&Answer) -> K) -> Vec<SlotIndex> {
        let mut idxs: Vec<SlotIndex> = self
            .used
            .iter()
            .enumerate()
            .filter(|(_, u)| u.is_none())
            .map(|(i, _)| i)
            .collect();
        idxs.sort_by_key(|&i| sort_key(&self.answers[i]));
        idxs
    }

    /// Indexes of slots that are not yet complete, in the default most-constrained-first order.
    #[must_use]
    pub fn provide_unfilled_default(&self) -> Vec<SlotIndex> {
        self.provide_unfilled(most_constrained_first_key)
    }

    /// Walk every slot crossing any cell in `letter_map` (optionally including `origin_slot`),
    /// apply the update, and score the result with `evaluator`. Each crossing slot is visited
    /// exactly once, even if it crosses `letter_map` at more than one cell (this matters most for
    /// `origin_slot`, every one of whose own cells is in `letter_map`) -- a slot shouldn't be
    /// scored or counted twice toward the mean just because it shares two cells with the update.
    ///
    /// If `evaluator` ever returns a rank `<= 0`, the walk aborts immediately and returns a dead
    /// changeset (see [`AnswerChangeset::is_dead`]) rather than finishing the walk and deciding
    /// afterwards -- the faster of the two equally-correct ways to handle a dead crossing. A
    /// `None` from `evaluator` means "cannot rank," and is excluded from the mean rather than
    /// counted as zero.
    #[must_use]
    pub fn list_new_entries_using_updates(
        &self,
        letter_map: &HashMap<CellIndex, char>,
        origin_slot: SlotIndex,
        include_origin: bool,
        evaluator: impl Fn(&Answer) -> Option<i64>,
    ) -> AnswerChangeset {
        let mut entries = HashMap::new();
        let mut rank_sum: i64 = 0;
        let mut rank_count: usize = 0;
        let mut visited: HashSet<SlotIndex> = HashSet::new();

        for &cell in letter_map.keys() {
            for &slot_idx in &self.crossings[cell] {
                if slot_idx == origin_slot && !include_origin {
                    continue;
                }
                if !visited.insert(slot_idx) {
                    continue;
                }
                let candidate = self.answers[slot_idx].update(letter_map);
                if let Some(rank) = evaluator(&candidate) {
                    if rank <= 0 {
                        return AnswerChangeset::dead();
                    }
                    rank_sum += rank;
                    rank_count += 1;
                }
                if candidate.is_complete() {
                    entries.insert(slot_idx, candidate);
                }
            }
        }

        // No crossing could be scored (e.g. a slot with no crossings at all): there is no
        // evidence against this commitment, so treat it as neutral rather than dividing by zero.
        #[allow(clippy::cast_precision_loss)]
        let rank = if rank_count == 0 {
            1.0
        } else {
            rank_sum as f64 / rank_count as f64
        };

        AnswerChangeset {
            entries,
            rank,
            dead: false,
        }
    }

    /// Construct the successor state implied by `suggestion`.
    #[must_use]
    pub fn advance(&self, suggestion: &Suggestion) -> FillState {
        let mut answers = self.answers.clone();
        let mut used = self.used.clone();
        let mut num_incomplete = self.num_incomplete;
        let mut newly_defined: HashSet<SlotIndex> = HashSet::new();

        for (&slot_idx, new_answer) in suggestion.new_entries() {
            if !answers[slot_idx].is_complete() {
                answers[slot_idx] = new_answer.clone();
                newly_defined.insert(slot_idx);
                used[slot_idx] = Some(
                    new_answer
                        .rendering()
                        .expect("Suggestion::new_entries only ever contains complete answers"),
                );
                num_incomplete -= 1;
            }
        }

        for &cell in suggestion.letter_map().keys() {
            for &slot_idx in &self.crossings[cell] {
                if !newly_defined.contains(&slot_idx) {
                    answers[slot_idx] = answers[slot_idx].update(suggestion.letter_map());
                }
            }
        }

        FillState {
            answers,
            crossings: Rc::clone(&self.crossings),
            used,
            num_incomplete,
        }
    }

    /// Render this state against `grid` into an `R`-line grid string.
    #[must_use]
    pub fn render(&self, grid: &Grid, blank: char) -> String {
        let mut legend: HashMap<CellIndex, char> = HashMap::new();
        for (slot, answer) in grid.slots().iter().zip(self.answers.iter()) {
            for (i, &cell) in slot.cells.iter().enumerate() {
                if let Some(letter) = answer.pattern().get(i) {
                    legend.insert(cell, letter);
                }
            }
        }
        grid.render(|cell| legend.get(&cell).copied(), blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Content;

    fn unfilled(cells: &[CellIndex]) -> Answer {
        Answer::unfilled(cells)
    }

    #[test]
    fn from_grid_starts_fully_incomplete() {
        let grid = Grid::build_square("____").unwrap();
        let state = FillState::from_grid(&grid);
        assert_eq!(state.num_incomplete(), 4);
        assert!(!state.is_complete());
    }

    #[test]
    fn advance_commits_crossing_letters() {
        // 2x2 grid: slots are row0 across (0,1), row1 across (2,3), col0 down (0,2), col1 down (1,3)
        let answers = vec![
            unfilled(&[0, 1]),
            unfilled(&[2, 3]),
            unfilled(&[0, 2]),
            unfilled(&[1, 3]),
        ];
        let state = FillState::from_answers(answers, 4);

        let mut letter_map = HashMap::new();
        letter_map.insert(0, 'A');
        letter_map.insert(1, 'B');
        let mut new_entries = HashMap::new();
        new_entries.insert(0, state.answers()[0].update(&letter_map));
        let changeset = AnswerChangeset {
            entries: new_entries,
            rank: 1.0,
            dead: false,
        };
        let suggestion = Suggestion::new(letter_map, changeset);
        let next = state.advance(&suggestion);

        assert_eq!(next.used()[0], Some("AB".to_string()));
        assert_eq!(next.num_incomplete(), 3);
        // crossing slots (col0 down, col1 down) should have picked up the committed letters
        assert_eq!(next.answers()[2].pattern().get(0), Some('A'));
        assert_eq!(next.answers()[3].pattern().get(0), Some('B'));
    }

    #[test]
    fn list_new_entries_aborts_on_nonpositive_rank() {
        let answers = vec![unfilled(&[0, 1]), unfilled(&[0, 2])];
        let state = FillState::from_answers(answers, 3);
        let mut letter_map = HashMap::new();
        letter_map.insert(0, 'A');
        let changeset = state.list_new_entries_using_updates(&letter_map, 0, false, |_| Some(0));
        assert!(changeset.is_dead());
        assert!(changeset.entries().is_empty());
    }

    #[test]
    fn list_new_entries_visits_each_crossing_slot_once() {
        let answers = vec![unfilled(&[0, 1]), unfilled(&[0, 2]), unfilled(&[1, 3])];
        let state = FillState::from_answers(answers, 4);
        let mut letter_map = HashMap::new();
        letter_map.insert(0, 'A');
        letter_map.insert(1, 'B');
        let mut calls = 0;
        let changeset =
            state.list_new_entries_using_updates(&letter_map, 0, true, |_| {
                calls += 1;
                Some(1)
            });
        // origin slot 0 touches both cells 0 and 1, but must only be evaluated once
        assert_eq!(calls, 3);
        assert_eq!(changeset.rank(), 1.0);
    }

    #[test]
    fn used_renderings_only_includes_complete_slots() {
        let answer = unfilled(&[0, 1]);
        let state = FillState::from_answers(vec![answer], 2);
        assert!(state.used_renderings().is_empty());
    }

    #[test]
    fn content_cell_sentinels_build_crossings_table() {
        let answer = unfilled(&[0, 1]);
        assert!(matches!(answer.content()[0], Content::Cell(0)));
    }
}
