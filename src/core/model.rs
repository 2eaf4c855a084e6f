// laratail - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies. These types are the shared vocabulary across
// all layers.

use crate::util::constants::NO_DETAILS_TEXT;
use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// Log Entry
// =============================================================================

/// A single parsed log line.
///
/// Built only by `core::parser::parse_line` and never mutated afterwards;
/// whoever receives it owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Timestamp text exactly as it appeared between the brackets.
    pub timestamp: String,

    /// Lowercased level token (e.g. "error"). May fall outside the
    /// `Severity` vocabulary if the source wrote a custom level.
    pub severity: String,

    /// Single-line summary.
    pub message: String,

    /// Full detail payload: exception text, pretty-printed JSON, or the raw
    /// remainder of the line.
    pub details: String,
}

impl LogEntry {
    /// Severity as a vocabulary variant, if the token is one.
    pub fn level(&self) -> Option<Severity> {
        Severity::from_token(&self.severity)
    }

    /// Details prepared for a detail pane.
    ///
    /// JSON payloads are re-indented with four spaces; anything else has
    /// literal `\n` escapes expanded so stack traces read line by line.
    pub fn formatted_details(&self) -> String {
        if self.details.is_empty() {
            return NO_DETAILS_TEXT.to_string();
        }
        match serde_json::from_str::<serde_json::Value>(&self.details) {
            Ok(value) => pretty_json(&value, b"    ").unwrap_or_else(|| self.details.clone()),
            Err(_) => self.details.replace("\\n", "\n"),
        }
    }
}

/// Serialise `value` with the given indent string.
pub(crate) fn pretty_json(value: &serde_json::Value, indent: &[u8]) -> Option<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser).ok()?;
    String::from_utf8(out).ok()
}

// =============================================================================
// Severity
// =============================================================================

/// The fixed severity vocabulary, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    /// Returns all variants in display order (most severe first).
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Emergency,
            Severity::Alert,
            Severity::Critical,
            Severity::Error,
            Severity::Warning,
            Severity::Notice,
            Severity::Info,
            Severity::Debug,
        ]
    }

    /// Lowercase token as written in filters and entries.
    pub fn token(&self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Case-insensitive lookup of a level token.
    pub fn from_token(token: &str) -> Option<Severity> {
        let token = token.trim();
        Severity::all()
            .iter()
            .copied()
            .find(|s| s.token().eq_ignore_ascii_case(token))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// Watch events (for consumers)
// =============================================================================

/// Messages sent from the watch thread to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The poll thread is running against `path`.
    Started { path: PathBuf },

    /// The file does not exist; polling for it to appear.
    Waiting { path: PathBuf },

    /// The file appeared (or reappeared); reading from the start.
    FileAppeared { path: PathBuf },

    /// The file shrank below the read offset; reading from the start.
    Truncated { path: PathBuf },

    /// A different file now sits at the watched path; reading from the start.
    Rotated { path: PathBuf },

    /// A non-fatal stat/read failure. The loop retries on the next tick.
    FileError { path: PathBuf, message: String },

    /// An entry that passed the severity filter, in file order.
    Entry(LogEntry),
}
