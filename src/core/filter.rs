// laratail - core/filter.rs
//
// Severity allow-list applied to entries before they reach the consumer.
// Core layer: pure logic, no I/O.
//
// An empty set means "no filter configured" and accepts every entry. It does
// not mean "everything disabled"; a consumer that wants to hide every row
// does so in its own view (see app::state::EntryLog).

use crate::core::model::Severity;
use crate::util::error::FilterError;
use std::collections::HashSet;

/// Set of enabled severities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    levels: HashSet<Severity>,
}

impl FilterSet {
    /// A filter accepting the given levels (empty = accept all).
    pub fn new<I: IntoIterator<Item = Severity>>(levels: I) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }

    /// Build a filter from user-supplied tokens such as `"error"` or `"WARNING"`.
    ///
    /// Fails on the first token outside the severity vocabulary.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut levels = HashSet::new();
        for token in tokens {
            let token = token.as_ref();
            let severity = Severity::from_token(token).ok_or_else(|| FilterError::UnknownSeverity {
                token: token.to_string(),
            })?;
            levels.insert(severity);
        }
        Ok(Self { levels })
    }

    /// Replace every enabled level at once.
    pub fn set_filters<I: IntoIterator<Item = Severity>>(&mut self, levels: I) {
        self.levels = levels.into_iter().collect();
    }

    /// Returns true if no levels are configured.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns true if `severity` is explicitly enabled.
    pub fn contains(&self, severity: Severity) -> bool {
        self.levels.contains(&severity)
    }

    /// Enabled levels, most severe first.
    pub fn levels(&self) -> Vec<Severity> {
        let mut levels: Vec<Severity> = self.levels.iter().copied().collect();
        levels.sort();
        levels
    }

    /// Whether an entry with this severity token should reach the consumer.
    ///
    /// Empty set: always true. Otherwise true iff the token (case-insensitive)
    /// names an enabled level; tokens outside the vocabulary never match.
    pub fn should_display(&self, severity: &str) -> bool {
        if self.levels.is_empty() {
            return true;
        }
        Severity::from_token(severity).is_some_and(|s| self.levels.contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = FilterSet::default();
        for s in Severity::all() {
            assert!(filter.should_display(s.token()));
        }
        assert!(filter.should_display("custom"));
        assert!(filter.should_display(""));
    }

    #[test]
    fn test_membership_is_case_insensitive() {
        let filter = FilterSet::new([Severity::Error, Severity::Warning]);
        assert!(filter.should_display("error"));
        assert!(filter.should_display("ERROR"));
        assert!(filter.should_display("Warning"));
        assert!(!filter.should_display("info"));
        assert!(!filter.should_display("debug"));
    }

    #[test]
    fn test_unknown_token_rejected_by_non_empty_filter() {
        let filter = FilterSet::new([Severity::Info]);
        assert!(!filter.should_display("custom"));
    }

    #[test]
    fn test_set_filters_replaces_whole_set() {
        let mut filter = FilterSet::new([Severity::Error]);
        filter.set_filters([Severity::Debug]);
        assert!(!filter.should_display("error"));
        assert!(filter.should_display("debug"));

        filter.set_filters(std::iter::empty());
        assert!(filter.is_empty());
        assert!(filter.should_display("error"));
    }

    #[test]
    fn test_from_tokens_parses_mixed_case() {
        let filter = FilterSet::from_tokens(["Error", "CRITICAL"]).unwrap();
        assert_eq!(filter.levels(), vec![Severity::Critical, Severity::Error]);
    }

    #[test]
    fn test_from_tokens_rejects_unknown_level() {
        let result = FilterSet::from_tokens(["error", "loud"]);
        assert_eq!(
            result,
            Err(FilterError::UnknownSeverity {
                token: "loud".to_string()
            })
        );
    }
}
