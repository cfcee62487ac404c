//! The `Pattern` type: what a slot currently looks like from the bank's point of view.

/// A length-N sequence of letters and gaps describing a slot's current state. `None` stands for an
/// uncommitted position; `Some(letter)` is a committed one.
///
/// Two patterns of different lengths are never equal and never match each other; this falls out
/// naturally from comparing the underlying `Vec`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern(Vec<Option<char>>);

impl Pattern {
    #[must_use]
    pub fn new(entries: Vec<Option<char>>) -> Pattern {
        Pattern(entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<char> {
        self.0[index]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<char>] {
        &self.0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Does `word` (already known to be the same length) satisfy every committed position of this
    /// pattern?
    #[must_use]
    pub fn matches_word(&self, word: &[char]) -> bool {
        if word.len() != self.0.len() {
            return false;
        }
        self.0
            .iter()
            .zip(word)
            .all(|(slot, &letter)| slot.map_or(true, |required| required == letter))
    }

    /// Render with `blank` standing in for every `None` entry.
    #[must_use]
    pub fn render(&self, blank: char) -> String {
        self.0.iter().map(|c| c.unwrap_or(blank)).collect()
    }

    /// Every sub-pattern of `word`: one pattern per subset of revealed positions, `2^len(word)` in
    /// total. Used once, at bank-construction time, to build the inverted pattern index.
    #[must_use]
    pub fn sub_patterns_of(word: &[char]) -> Vec<Pattern> {
        let n = word.len();
        let mut patterns = Vec::with_capacity(1 << n);
        for mask in 0..(1u32 << n) {
            let entries: Vec<Option<char>> = (0..n)
                .map(|i| if mask & (1 << i) != 0 { Some(word[i]) } else { None })
                .collect();
            patterns.push(Pattern(entries));
        }
        patterns
    }
}
