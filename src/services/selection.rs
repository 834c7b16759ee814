use serde::Serialize;

use crate::models::keyword::{Keyword, RankContext};
use crate::services::ranking::relevance_score;

/// Default capacity of a keyword selection.
pub const DEFAULT_MAX_SELECTIONS: usize = 8;

/// Positions after the primary keyword that display as secondary.
const SECONDARY_SLOTS: usize = 3;

/// Bulk "high volume" threshold; volume must be strictly above it.
const HIGH_VOLUME_MIN: u64 = 100;

/// Bulk "low difficulty" threshold; difficulty must be strictly below it.
const LOW_DIFFICULTY_MAX: f64 = 50.0;

/// What a toggle did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The keyword was absent and the selection full; nothing changed.
    AtCapacity,
}

/// Ordered, bounded set of selected keywords, unique by keyword text.
///
/// Index 0 is the primary keyword. The selection never holds more than
/// `max_selections` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSelection {
    selected: Vec<Keyword>,
    max_selections: usize,
}

impl Default for KeywordSelection {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SELECTIONS)
    }
}

impl KeywordSelection {
    pub fn new(max_selections: usize) -> Self {
        Self {
            selected: Vec::with_capacity(max_selections),
            max_selections,
        }
    }

    /// Build from caller-supplied state. Duplicates after the first
    /// occurrence and entries past capacity are dropped.
    pub fn with_initial(initial: impl IntoIterator<Item = Keyword>, max_selections: usize) -> Self {
        let mut selection = Self::new(max_selections);
        selection.replace_with(initial);
        selection
    }

    /// Remove the keyword if selected, otherwise append it when there is room.
    pub fn toggle(&mut self, keyword: &Keyword) -> ToggleOutcome {
        if let Some(index) = self.position(&keyword.keyword) {
            self.selected.remove(index);
            return ToggleOutcome::Removed;
        }
        if self.is_full() {
            return ToggleOutcome::AtCapacity;
        }
        self.selected.push(keyword.clone());
        ToggleOutcome::Added
    }

    /// Replace the selection with the filtered entries scoring above zero,
    /// in filtered order.
    pub fn auto_select_relevant(&mut self, filtered: &[&Keyword], ctx: &RankContext) {
        self.replace_with(
            filtered
                .iter()
                .filter(|k| relevance_score(&k.keyword, ctx) > 0)
                .map(|k| (*k).clone()),
        );
    }

    /// Replace the selection with filtered entries above 100 searches and
    /// below 50 difficulty. Missing volume counts as 0 and missing
    /// difficulty as 100, so incomplete candidates never qualify.
    pub fn select_high_volume_low_difficulty(&mut self, filtered: &[&Keyword]) {
        self.replace_with(
            filtered
                .iter()
                .filter(|k| {
                    k.search_volume.unwrap_or(0) > HIGH_VOLUME_MIN
                        && k.difficulty.unwrap_or(100.0) < LOW_DIFFICULTY_MAX
                })
                .map(|k| (*k).clone()),
        );
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    fn replace_with(&mut self, keywords: impl IntoIterator<Item = Keyword>) {
        self.selected.clear();
        for keyword in keywords {
            if self.is_full() {
                break;
            }
            if !self.contains(&keyword.keyword) {
                self.selected.push(keyword);
            }
        }
    }

    fn position(&self, keyword: &str) -> Option<usize> {
        self.selected.iter().position(|k| k.keyword == keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.position(keyword).is_some()
    }

    pub fn primary(&self) -> Option<&Keyword> {
        self.selected.first()
    }

    /// Entries displayed as secondary: positions 1 through 3.
    pub fn secondary(&self) -> &[Keyword] {
        let end = self.selected.len().min(1 + SECONDARY_SLOTS);
        self.selected.get(1..end).unwrap_or_default()
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= self.max_selections
    }

    pub fn max_selections(&self) -> usize {
        self.max_selections
    }

    pub fn into_keywords(self) -> Vec<Keyword> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(selection: &KeywordSelection) -> Vec<&str> {
        selection.keywords().iter().map(|k| k.keyword.as_str()).collect()
    }

    #[test]
    fn test_toggle_respects_capacity() {
        let (a, b, c) = (Keyword::new("a"), Keyword::new("b"), Keyword::new("c"));
        let mut selection = KeywordSelection::new(2);

        assert_eq!(selection.toggle(&a), ToggleOutcome::Added);
        assert_eq!(selection.toggle(&b), ToggleOutcome::Added);
        assert_eq!(selection.toggle(&c), ToggleOutcome::AtCapacity);
        assert_eq!(keys(&selection), vec!["a", "b"]);

        assert_eq!(selection.toggle(&a), ToggleOutcome::Removed);
        assert_eq!(keys(&selection), vec!["b"]);
    }

    #[test]
    fn test_toggle_at_capacity_is_idempotent() {
        let mut selection = KeywordSelection::with_initial([Keyword::new("a")], 1);
        let extra = Keyword::new("z");

        assert_eq!(selection.toggle(&extra), ToggleOutcome::AtCapacity);
        let after_first = selection.clone();
        assert_eq!(selection.toggle(&extra), ToggleOutcome::AtCapacity);
        assert_eq!(selection, after_first);
    }

    #[test]
    fn test_primary_and_secondary_positions() {
        let mut selection = KeywordSelection::default();
        assert!(selection.primary().is_none());
        assert!(selection.secondary().is_empty());

        for key in ["p", "s1", "s2", "s3", "tail"] {
            selection.toggle(&Keyword::new(key));
        }
        assert_eq!(selection.primary().map(|k| k.keyword.as_str()), Some("p"));
        let secondary: Vec<&str> = selection.secondary().iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(secondary, vec!["s1", "s2", "s3"]);

        // Removing the primary promotes the next entry.
        selection.toggle(&Keyword::new("p"));
        assert_eq!(selection.primary().map(|k| k.keyword.as_str()), Some("s1"));
    }

    #[test]
    fn test_initial_state_is_deduplicated_and_truncated() {
        let initial = ["a", "b", "a", "c", "d"].map(Keyword::new);
        let selection = KeywordSelection::with_initial(initial, 3);
        assert_eq!(keys(&selection), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_high_volume_low_difficulty() {
        let candidates = vec![
            Keyword::new("plumber austin").with_volume(500).with_difficulty(20.0),
            Keyword::new("emergency plumber").with_volume(50).with_difficulty(80.0),
            Keyword::new("no difficulty").with_volume(900),
            Keyword::new("no volume").with_difficulty(10.0),
            Keyword::new("edge").with_volume(100).with_difficulty(10.0),
        ];
        let filtered: Vec<&Keyword> = candidates.iter().collect();
        let mut selection = KeywordSelection::with_initial([Keyword::new("old")], 8);

        selection.select_high_volume_low_difficulty(&filtered);
        assert_eq!(keys(&selection), vec!["plumber austin"]);
    }

    #[test]
    fn test_auto_select_relevant_truncates() {
        let ctx = RankContext::new("Plumbing Services", "plumbing");
        let candidates = vec![
            Keyword::new("plumbing a"),
            Keyword::new("unrelated"),
            Keyword::new("plumbing b"),
            Keyword::new("plumbing c"),
        ];
        let filtered: Vec<&Keyword> = candidates.iter().collect();
        let mut selection = KeywordSelection::new(2);

        selection.auto_select_relevant(&filtered, &ctx);
        assert_eq!(keys(&selection), vec!["plumbing a", "plumbing b"]);

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let ctx = RankContext::new("roof", "roofing");
        let candidates: Vec<Keyword> = (0..20)
            .map(|i| Keyword::new(format!("roof {i}")).with_volume(500).with_difficulty(10.0))
            .collect();
        let filtered: Vec<&Keyword> = candidates.iter().collect();
        let mut selection = KeywordSelection::new(4);

        for keyword in &candidates {
            selection.toggle(keyword);
            assert!(selection.len() <= 4);
        }
        selection.auto_select_relevant(&filtered, &ctx);
        assert_eq!(selection.len(), 4);
        selection.select_high_volume_low_difficulty(&filtered);
        assert_eq!(selection.len(), 4);
    }
}
