//! Row selection by key.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Deserialize;
use serde::Serialize;

/// Selection mode for the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No selection allowed.
    #[default]
    None,
    /// At most one row selected.
    Single,
    /// Any number of rows selected.
    Multi,
}

/// Tracks selected rows by their keys.
///
/// Every mutating method returns `true` if the selection changed.
#[derive(Debug, Clone)]
pub struct Selection<K: Clone + Eq + Hash> {
    mode: SelectionMode,
    selected: HashSet<K>,
    /// Last key toggled or selected, the fixed end of a range selection.
    anchor: Option<K>,
}

impl<K: Clone + Eq + Hash> Default for Selection<K> {
    fn default() -> Self {
        Self::new(SelectionMode::None)
    }
}

impl<K: Clone + Eq + Hash> Selection<K> {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: HashSet::new(),
            anchor: None,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the mode, trimming the selection to what the mode allows.
    pub fn set_mode(&mut self, mode: SelectionMode) -> bool {
        self.mode = mode;
        match mode {
            SelectionMode::None => self.clear(),
            SelectionMode::Single if self.selected.len() > 1 => {
                let keep = self.anchor.clone().filter(|k| self.selected.contains(k));
                self.selected.clear();
                self.selected.extend(keep);
                true
            }
            _ => false,
        }
    }

    /// Toggle selection for a key.
    pub fn toggle(&mut self, key: K) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                let was_selected = self.selected.contains(&key);
                self.selected.clear();
                if !was_selected {
                    self.selected.insert(key.clone());
                }
                self.anchor = Some(key);
                true
            }
            SelectionMode::Multi => {
                if !self.selected.remove(&key) {
                    self.selected.insert(key.clone());
                }
                self.anchor = Some(key);
                true
            }
        }
    }

    /// Select only this key.
    pub fn select(&mut self, key: K) -> bool {
        if self.mode == SelectionMode::None {
            return false;
        }
        if self.selected.len() == 1 && self.selected.contains(&key) {
            return false;
        }
        self.selected.clear();
        self.selected.insert(key.clone());
        self.anchor = Some(key);
        true
    }

    /// Select every key between the anchor and `key` in `ordered` (inclusive).
    ///
    /// With `extend`, the range is added to the existing selection. Without an
    /// anchor this selects `key` alone. Multi mode only.
    pub fn range_select(&mut self, key: K, ordered: &[K], extend: bool) -> bool {
        if self.mode != SelectionMode::Multi {
            return false;
        }
        let Some(end) = ordered.iter().position(|k| *k == key) else {
            return false;
        };
        let start = self
            .anchor
            .as_ref()
            .and_then(|a| ordered.iter().position(|k| k == a))
            .unwrap_or(end);
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };

        let before = self.selected.clone();
        if !extend {
            self.selected.clear();
        }
        self.selected.extend(ordered[lo..=hi].iter().cloned());
        self.selected != before
    }

    /// Select all keys. Multi mode only.
    pub fn select_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a K>) -> bool
    where
        K: 'a,
    {
        if self.mode != SelectionMode::Multi {
            return false;
        }
        let before = self.selected.len();
        self.selected.extend(keys.into_iter().cloned());
        self.selected.len() != before
    }

    /// Drop keys for which `keep` returns false.
    pub fn retain(&mut self, keep: impl Fn(&K) -> bool) -> bool {
        let before = self.selected.len();
        self.selected.retain(|k| keep(k));
        if self.anchor.as_ref().is_some_and(|a| !keep(a)) {
            self.anchor = None;
        }
        self.selected.len() != before
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    /// Clear all selections.
    pub fn clear(&mut self) -> bool {
        self.anchor = None;
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        true
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get all selected keys.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mode_keeps_at_most_one() {
        let mut selection = Selection::new(SelectionMode::Single);
        assert!(selection.toggle("a"));
        assert!(selection.toggle("b"));
        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected(&"b"));
        assert!(selection.toggle("b"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_none_mode_ignores_everything() {
        let mut selection = Selection::new(SelectionMode::None);
        assert!(!selection.toggle("a"));
        assert!(!selection.select("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_range_select_from_anchor() {
        let keys = ["a", "b", "c", "d", "e"];
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.toggle("b");
        assert!(selection.range_select("d", &keys, false));
        let mut selected: Vec<_> = selection.iter().copied().collect();
        selected.sort();
        assert_eq!(selected, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_switching_to_single_trims_to_anchor() {
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.toggle("a");
        selection.toggle("b");
        assert!(selection.set_mode(SelectionMode::Single));
        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected(&"b"));
    }
}
