//! `Bank`: a pattern-indexed word store, plus the ranking and suggestion logic that drives the
//! filler's search.
//!
//! Construction builds an inverted index from every sub-pattern of every word (the `2^len`
//! enumeration in [`crate::pattern::Pattern::sub_patterns_of`]) up to `pattern_registry_cap`
//! letters revealed; above that length the index is skipped and `filter` falls back to a linear
//! scan over words of the matching length.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::debug;

use crate::answer::Answer;
use crate::error::BankError;
use crate::fill_state::{AnswerChangeset, FillState, Suggestion};
use crate::pattern::Pattern;
use crate::types::SlotIndex;

/// Default cap on how many revealed letters a pattern may carry and still be served directly from
/// the index. Almost every crossing query in a real-sized grid reveals far fewer letters than
/// this, and raising it mostly just inflates construction time and memory for rarely-hit long
/// patterns.
pub const DEFAULT_PATTERN_REGISTRY_CAP: usize = 9;

/// One word in the bank. Cheaply cloneable: the bank stores the same `BankItem` under many
/// sub-pattern buckets, and cloning just bumps a reference count.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BankItem(Rc<BankItemInner>);

#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct BankItemInner {
    tableau: Vec<char>,
    rendering: String,
}

impl BankItem {
    fn new(word: &str) -> BankItem {
        BankItem(Rc::new(BankItemInner {
            tableau: word.chars().collect(),
            rendering: word.to_string(),
        }))
    }

    #[must_use]
    pub fn tableau(&self) -> &[char] {
        &self.0.tableau
    }

    #[must_use]
    pub fn rendering(&self) -> &str {
        &self.0.rendering
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.0.tableau.len()
    }
}

impl PartialEq for BankItem {
    fn eq(&self, other: &Self) -> bool {
        self.0.rendering == other.0.rendering
    }
}
impl Eq for BankItem {}

impl PartialOrd for BankItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BankItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.rendering.cmp(&other.0.rendering)
    }
}

/// A pattern-indexed store of candidate words.
///
/// Behind the `serde` feature this derives `Serialize`/`Deserialize`, the seam an external
/// disk-cache layer (not implemented by this crate) would use to persist a built index.
/// `by_pattern`'s keys are `Pattern` values, not strings, so a
/// caller serializing to a string-keyed-object format (e.g. JSON) should serialize `by_length` or
/// the plain word list instead; formats with general map keys (e.g. `bincode`) round-trip the
/// whole struct.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bank {
    renderings: HashSet<String>,
    by_pattern: HashMap<Pattern, Vec<BankItem>>,
    by_length: HashMap<usize, Vec<BankItem>>,
    pattern_registry_cap: usize,
}

impl Bank {
    /// Build a bank from `words`, indexing sub-patterns up to `pattern_registry_cap` letters
    /// revealed. Words are validated (non-empty, uppercase ASCII only) and de-duplicated; a word
    /// repeated in the input is only ever deposited once.
    pub fn with_registry(
        words: impl IntoIterator<Item = impl AsRef<str>>,
        pattern_registry_cap: usize,
    ) -> Result<Bank, BankError> {
        if pattern_registry_cap < 2 {
            return Err(BankError::RegistryCapTooSmall(pattern_registry_cap));
        }

        let mut renderings: HashSet<String> = HashSet::new();
        let mut items: Vec<BankItem> = Vec::new();
        for (index, word) in words.into_iter().enumerate() {
            let word = word.as_ref();
            if word.is_empty() {
                return Err(BankError::EmptyWord { index });
            }
            if !word.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(BankError::InvalidCharacter {
                    index,
                    word: word.to_string(),
                });
            }
            if renderings.insert(word.to_string()) {
                items.push(BankItem::new(word));
            }
        }

        let mut by_pattern: HashMap<Pattern, Vec<BankItem>> = HashMap::new();
        let mut by_length: HashMap<usize, Vec<BankItem>> = HashMap::new();
        for item in &items {
            by_length.entry(item.length()).or_default().push(item.clone());
            if item.length() <= pattern_registry_cap {
                for pattern in Pattern::sub_patterns_of(item.tableau()) {
                    by_pattern.entry(pattern).or_default().push(item.clone());
                }
            }
        }
        for bucket in by_pattern.values_mut() {
            bucket.sort();
        }
        for bucket in by_length.values_mut() {
            bucket.sort();
        }

        debug!(
            "built bank with {} words, {} registered pattern buckets",
            items.len(),
            by_pattern.len()
        );

        Ok(Bank {
            renderings,
            by_pattern,
            by_length,
            pattern_registry_cap,
        })
    }

    /// Build a bank with the default `pattern_registry_cap`.
    pub fn new(words: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Bank, BankError> {
        Bank::with_registry(words, DEFAULT_PATTERN_REGISTRY_CAP)
    }

    #[must_use]
    pub fn pattern_registry_cap(&self) -> usize {
        self.pattern_registry_cap
    }

    #[must_use]
    pub fn has_word(&self, rendering: &str) -> bool {
        self.renderings.contains(rendering)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.renderings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renderings.is_empty()
    }

    /// Every bank word matching `pattern`, from the index when `pattern.len() <=
    /// pattern_registry_cap`, or a linear scan over same-length words otherwise.
    pub fn filter<'a>(&'a self, pattern: &Pattern) -> Box<dyn Iterator<Item = &'a BankItem> + 'a> {
        if pattern.len() <= self.pattern_registry_cap {
            match self.by_pattern.get(pattern) {
                Some(items) => Box::new(items.iter()),
                None => Box::new(std::iter::empty()),
            }
        } else {
            self.filter_slowly(pattern)
        }
    }

    /// Linear scan fallback: every word of the right length whose letters agree with `pattern`.
    /// Used for patterns longer than `pattern_registry_cap`, and exposed directly so callers (and
    /// tests) can sanity-check the indexed path against it.
    pub fn filter_slowly<'a>(&'a self, pattern: &Pattern) -> Box<dyn Iterator<Item = &'a BankItem> + 'a> {
        match self.by_length.get(&pattern.len()) {
            Some(items) => Box::new(
                items
                    .iter()
                    .filter(move |item| pattern.matches_word(item.tableau())),
            ),
            None => Box::new(std::iter::empty()),
        }
    }

    /// The exact match count for `pattern` when it's answerable from the index (`pattern.len() <=
    /// pattern_registry_cap`); `None` ("cannot rank without a scan") otherwise.
    #[must_use]
    pub fn count_filter(&self, pattern: &Pattern) -> Option<usize> {
        if pattern.len() > self.pattern_registry_cap {
            return None;
        }
        Some(self.by_pattern.get(pattern).map_or(0, Vec::len))
    }

    /// A predicate excluding any item already committed somewhere in `used`.
    #[must_use]
    pub fn not_already_used_predicate<'a>(
        used: &'a HashSet<String>,
    ) -> impl Fn(&BankItem) -> bool + 'a {
        move |item: &BankItem| !used.contains(item.rendering())
    }

    /// Score a candidate answer for ranking purposes:
    ///
    /// - if `answer` is fully committed, `-1` if its rendering is absent from the bank or already
    ///   in `used` (reject), otherwise the index's match count for the complete pattern (always 1
    ///   if the word is unique, as it always is here);
    /// - otherwise, the index's match count for the partial pattern -- `0` if nothing in the bank
    ///   can complete it (reject), `None` if the pattern is too long to be answerable from the
    ///   index (treated as "cannot rank", and excluded from any mean).
    #[must_use]
    pub fn rank_candidate(&self, answer: &Answer, used: &HashSet<String>) -> Option<i64> {
        if answer.is_complete() {
            let rendering = answer.rendering().expect("is_complete implies a rendering");
            if !self.has_word(&rendering) || used.contains(&rendering) {
                return Some(-1);
            }
        }
        match self.count_filter(answer.pattern()) {
            #[allow(clippy::cast_possible_wrap)]
            Some(n) => Some(n as i64),
            None => None,
        }
    }

    /// Propose every word that could fill `slot_idx` in `state`, each carrying the letter
    /// commitments it would force and the mean rank of the crossings it touches. Ordered by rank,
    /// descending, with ties broken by rendering for determinism.
    #[must_use]
    pub fn suggest(&self, state: &FillState, slot_idx: SlotIndex) -> Vec<Suggestion> {
        let answer = &state.answers()[slot_idx];
        let used = state.used_renderings();
        let not_used = Bank::not_already_used_predicate(&used);
        let candidates = self.filter(answer.pattern()).filter(|item| not_used(*item));

        let mut suggestions: Vec<Suggestion> = candidates
            .filter_map(|item| {
                let letter_map = answer.to_updates(item.tableau());
                let changeset: AnswerChangeset = state.list_new_entries_using_updates(
                    &letter_map,
                    slot_idx,
                    true,
                    |candidate| self.rank_candidate(candidate, &used),
                );
                if changeset.is_dead() {
                    return None;
                }
                // Reject a candidate that would duplicate a rendering among its own newly
                // completed slots (including itself): a conservative default where the reference
                // implementations disagree (see DESIGN.md).
                let mut renderings_seen: HashSet<String> = HashSet::new();
                for completed in changeset.entries().values() {
                    if let Some(rendering) = completed.rendering() {
                        if !renderings_seen.insert(rendering) {
                            return None;
                        }
                    }
                }
                Some(Suggestion::new(letter_map, changeset))
            })
            .collect();

        suggestions.sort_by(|a, b| {
            b.rank()
                .partial_cmp(&a.rank())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let a_word = a.new_entries().get(&slot_idx).and_then(Answer::rendering);
                    let b_word = b.new_entries().get(&slot_idx).and_then(Answer::rendering);
                    a_word.cmp(&b_word)
                })
        });
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_bank(words: &[&str]) -> Bank {
        Bank::new(words.iter().copied()).unwrap()
    }

    #[test]
    fn rejects_empty_word() {
        assert_eq!(Bank::new(["AB", ""]).unwrap_err(), BankError::EmptyWord { index: 1 });
    }

    #[test]
    fn rejects_lowercase_word() {
        assert!(matches!(
            Bank::new(["ab"]).unwrap_err(),
            BankError::InvalidCharacter { index: 0, .. }
        ));
    }

    #[test]
    fn rejects_registry_cap_too_small() {
        assert_eq!(
            Bank::with_registry(["AB"], 1).unwrap_err(),
            BankError::RegistryCapTooSmall(1)
        );
    }

    #[test]
    fn dedupes_repeated_words() {
        let bank = create_bank(&["AB", "AB", "CD"]);
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn count_filter_matches_filter_slowly() {
        let bank = create_bank(&["AB", "CD", "AC", "BD", "XY"]);
        let pattern = Pattern::new(vec![Some('A'), None]);
        let indexed_count = bank.count_filter(&pattern).unwrap();
        let scanned_count = bank.filter_slowly(&pattern).count();
        assert_eq!(indexed_count, scanned_count);
        assert_eq!(indexed_count, 2); // AB, AC
    }

    #[test]
    fn rank_candidate_matches_reference_scenarios() {
        let bank = create_bank(&["AB", "CD", "AC", "BD", "XY", "JJ", "OP", "BX", "AX"]);
        let used = HashSet::new();

        let complete_valid = Answer::unfilled(&[0, 1]).update(&{
            let mut m = HashMap::new();
            m.insert(0, 'X');
            m.insert(1, 'Y');
            m
        });
        assert!(bank.rank_candidate(&complete_valid, &used).unwrap() > 0);

        let complete_invalid = Answer::unfilled(&[0, 1]).update(&{
            let mut m = HashMap::new();
            m.insert(0, 'M');
            m.insert(1, 'Y');
            m
        });
        assert!(bank.rank_candidate(&complete_invalid, &used).unwrap() <= 0);

        let partial_dead = Answer::unfilled(&[0, 1]).update(&{
            let mut m = HashMap::new();
            m.insert(0, 'M');
            m
        });
        assert!(bank.rank_candidate(&partial_dead, &used).unwrap() <= 0);
    }

    #[test]
    fn rank_candidate_rejects_already_used_word() {
        let bank = create_bank(&["AB", "CD"]);
        let mut used = HashSet::new();
        used.insert("AB".to_string());
        let complete = Answer::unfilled(&[0, 1]).update(&{
            let mut m = HashMap::new();
            m.insert(0, 'A');
            m.insert(1, 'B');
            m
        });
        assert_eq!(bank.rank_candidate(&complete, &used), Some(-1));
    }

    #[test]
    fn suggest_orders_by_rank_descending() {
        // 2x2 grid: across slots (0,1) and (2,3), down slots (0,2) and (1,3)
        let bank = create_bank(&["AB", "AC", "CD", "BD", "AA", "CC"]);
        let answers = vec![
            Answer::unfilled(&[0, 1]),
            Answer::unfilled(&[2, 3]),
            Answer::unfilled(&[0, 2]),
            Answer::unfilled(&[1, 3]),
        ];
        let state = FillState::from_answers(answers, 4);
        let suggestions = bank.suggest(&state, 0);
        assert!(!suggestions.is_empty());
        for window in suggestions.windows(2) {
            assert!(window[0].rank() >= window[1].rank());
        }
    }

    #[test]
    fn suggest_excludes_already_used_words() {
        let bank = create_bank(&["AB", "CD", "AC", "BD"]);
        let answers = vec![
            Answer::unfilled(&[0, 1]).update(&{
                let mut m = HashMap::new();
                m.insert(0, 'A');
                m.insert(1, 'B');
                m
            }),
            Answer::unfilled(&[2, 3]),
            Answer::unfilled(&[0, 2]),
            Answer::unfilled(&[1, 3]),
        ];
        let state = FillState::from_answers(answers, 4);
        for suggestion in bank.suggest(&state, 2) {
            for (&idx, answer) in suggestion.new_entries() {
                if idx != 2 {
                    if let Some(rendering) = answer.rendering() {
                        assert_ne!(rendering, "AB");
                    }
                }
            }
        }
    }

    /// Every sub-pattern of an indexed word hits that word via `filter`, and a pattern of
    /// matching length that is not a sub-pattern of a given word never returns that word.
    #[test]
    fn indexing_is_complete_over_every_sub_pattern() {
        let word = "CRANE";
        let bank = create_bank(&[word, "SNAKE", "GRAPE"]);
        let tableau: Vec<char> = word.chars().collect();

        for pattern in Pattern::sub_patterns_of(&tableau) {
            let matches: Vec<&str> = bank.filter(&pattern).map(BankItem::rendering).collect();
            assert!(
                matches.contains(&word),
                "pattern {pattern:?} should match {word}"
            );
        }

        // A pattern that commits a letter CRANE does not have at a given position must never
        // return CRANE as a match.
        let mismatching = Pattern::new(vec![Some('Z'), None, None, None, None]);
        let matches: Vec<&str> = bank.filter(&mismatching).map(BankItem::rendering).collect();
        assert!(!matches.contains(&word));
    }
}
