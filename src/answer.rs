//! The `Answer` type: a slot's cell-index template plus its current pattern and strength.
//!
//! An `Answer`'s `content` sequence is the single source of truth; `pattern` and `strength` are
//! derived from it once, at construction time, so that every other operation (`is_complete`,
//! `normalized_strength`, sorting) is a cheap field read rather than a re-scan.

use std::collections::HashMap;

use crate::pattern::Pattern;
use crate::types::CellIndex;

/// One position of an `Answer`'s content: either a committed letter, or a sentinel tagged with the
/// grid cell that will eventually fill it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Content {
    Letter(char),
    Cell(CellIndex),
}

impl Content {
    #[must_use]
    pub fn letter(self) -> Option<char> {
        match self {
            Content::Letter(c) => Some(c),
            Content::Cell(_) => None,
        }
    }
}

/// A slot plus its current pattern and bookkeeping. Immutable: every mutating-looking operation
/// (`update`) returns a new `Answer` rather than changing this one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Answer {
    content: Vec<Content>,
    pattern: Pattern,
    strength: usize,
}

impl Answer {
    /// Build an `Answer` from its content sequence, computing `pattern` and `strength`.
    #[must_use]
    pub fn from_content(content: Vec<Content>) -> Answer {
        let pattern = Pattern::new(content.iter().map(|c| c.letter()).collect());
        let strength = content.iter().filter(|c| c.letter().is_some()).count();
        Answer {
            content,
            pattern,
            strength,
        }
    }

    /// Build a fully-uncommitted `Answer` for a freshly-parsed slot: one `Content::Cell` sentinel
    /// per cell index, in order.
    #[must_use]
    pub fn unfilled(cells: &[CellIndex]) -> Answer {
        Answer::from_content(cells.iter().copied().map(Content::Cell).collect())
    }

    #[must_use]
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.pattern.len()
    }

    #[must_use]
    pub fn strength(&self) -> usize {
        self.strength
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized_strength(&self) -> f64 {
        self.strength as f64 / self.length() as f64
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.strength == self.length()
    }

    /// The slot's rendering if every position is committed, using `blank` otherwise. Prefer
    /// `rendering()` when you only care about the complete case.
    #[must_use]
    pub fn render(&self, blank: char) -> String {
        self.pattern.render(blank)
    }

    /// The slot's rendering as a plain `String`, iff complete.
    #[must_use]
    pub fn rendering(&self) -> Option<String> {
        self.is_complete().then(|| self.pattern.render('_'))
    }

    /// Return a new `Answer` in which every previously-uncommitted position whose cell is a key of
    /// `letter_map` becomes committed. Already-committed positions are left untouched, even if
    /// `letter_map` disagrees with them -- callers are expected to only ever supply updates that
    /// agree with what's already committed at a shared cell.
    #[must_use]
    pub fn update(&self, letter_map: &HashMap<CellIndex, char>) -> Answer {
        let content: Vec<Content> = self
            .content
            .iter()
            .map(|&c| match c {
                Content::Letter(l) => Content::Letter(l),
                Content::Cell(cell) => letter_map
                    .get(&cell)
                    .map_or(Content::Cell(cell), |&l| Content::Letter(l)),
            })
            .collect();
        Answer::from_content(content)
    }

    /// Given a candidate word of the same length as this answer, return the map of cell index to
    /// letter for every position that is currently uncommitted. The caller is responsible for
    /// having verified that `word` already agrees with this answer's committed positions (this is
    /// exactly what a `Bank::filter`/`Bank::suggest` query guarantees).
    #[must_use]
    pub fn to_updates(&self, word: &[char]) -> HashMap<CellIndex, char> {
        debug_assert_eq!(word.len(), self.length());
        let mut updates = HashMap::new();
        for (i, &c) in self.content.iter().enumerate() {
            if let Content::Cell(cell) = c {
                updates.insert(cell, word[i]);
            }
        }
        updates
    }
}

/// Default ordering for `FillState::provide_unfilled`: most-constrained first (highest
/// `normalized_strength`), ties broken by shorter slots first.
#[must_use]
pub fn most_constrained_first_key(answer: &Answer) -> (std::cmp::Reverse<float_ord::FloatOrd<f64>>, usize) {
    (
        std::cmp::Reverse(float_ord::FloatOrd(answer.normalized_strength())),
        answer.length(),
    )
}
