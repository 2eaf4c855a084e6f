// laratail - app/state.rs
//
// Consumer-side entry list: everything received from the watch session plus
// the set of levels the user has ticked.
//
// Visibility here is strict membership: with no level ticked nothing is
// shown. This differs from the session's FilterSet, where an empty set means
// "no filter". Ticking levels also applies retroactively to rows already held,
// while the session filter only affects lines read afterwards.

use crate::core::model::{LogEntry, Severity};
use std::collections::HashSet;

/// Entries received so far and the levels currently ticked for display.
#[derive(Debug, Clone)]
pub struct EntryLog {
    entries: Vec<LogEntry>,
    checked: HashSet<Severity>,
}

impl EntryLog {
    /// Empty list with every level ticked.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            checked: Severity::all().iter().copied().collect(),
        }
    }

    /// Append an entry in arrival order.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Drop every held entry ("clear display"). Ticked levels are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the ticked levels.
    pub fn set_checked<I: IntoIterator<Item = Severity>>(&mut self, levels: I) {
        self.checked = levels.into_iter().collect();
    }

    /// Ticked levels, most severe first.
    pub fn checked(&self) -> Vec<Severity> {
        let mut levels: Vec<Severity> = self.checked.iter().copied().collect();
        levels.sort();
        levels
    }

    /// Whether a held entry would currently be shown.
    pub fn is_visible(&self, entry: &LogEntry) -> bool {
        entry.level().is_some_and(|s| self.checked.contains(&s))
    }

    /// Shown entries with their row index into the full list.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &LogEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.is_visible(e))
    }

    /// Entry at `row` (index into the full list).
    pub fn get(&self, row: usize) -> Option<&LogEntry> {
        self.entries.get(row)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EntryLog {
    fn default() -> Self {
        Self::new()
    }
}
