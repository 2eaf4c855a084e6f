// laratail - core/parser.rs
//
// Line parser for `[timestamp] channel.LEVEL: rest` log lines.
// Core layer: operates on one line of text, never touches the filesystem.
//
// The remainder after the level may be plain text or a JSON document. A JSON
// object carrying an `exception` string is summarised by the first line of
// that exception; any other JSON is pretty-printed into the details.

use crate::core::model::{pretty_json, LogEntry};
use crate::util::logging::preview;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Compiled line pattern, built once per process.
fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // The literal is covered by the unit tests below.
    PATTERN.get_or_init(|| {
        Regex::new(r"^\[(?P<timestamp>.*?)\] (?P<channel>\w+)\.(?P<level>\w+): (?P<rest>.*)$")
            .expect("line_pattern: invalid regex")
    })
}

/// Parse one physical log line.
///
/// Returns `None` for lines that do not have the bracketed-timestamp shape.
/// Such lines are dropped by callers; continuation lines of multi-line
/// messages land here too and are not stitched back onto earlier entries.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    let Some(caps) = line_pattern().captures(line) else {
        tracing::trace!(line = preview(line), "Dropping unparsable line");
        return None;
    };

    let timestamp = caps.name("timestamp")?.as_str();
    let level = caps.name("level")?.as_str();
    let rest = caps.name("rest")?.as_str();

    let (message, details) = split_payload(rest);

    Some(LogEntry {
        timestamp: timestamp.to_string(),
        severity: level.to_lowercase(),
        message,
        details,
    })
}

/// Derive `(message, details)` from the text after `LEVEL: `.
fn split_payload(rest: &str) -> (String, String) {
    let value: Value = match serde_json::from_str(rest) {
        Ok(v) => v,
        Err(_) => return (rest.to_string(), rest.to_string()),
    };

    if let Some(exception) = exception_text(&value) {
        let message = exception.split('\n').next().unwrap_or_default().trim();
        return (message.to_string(), exception.to_string());
    }

    let details = match pretty_json(&value, b"  ") {
        Some(pretty) => pretty,
        None => {
            tracing::warn!(rest = preview(rest), "Could not re-serialise JSON payload");
            rest.to_string()
        }
    };
    (rest.to_string(), details)
}

/// The `exception` field, when it is present as non-empty text.
fn exception_text(value: &Value) -> Option<&str> {
    value
        .as_object()?
        .get("exception")?
        .as_str()
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_payload_summarised_by_first_line() {
        let line = r#"[2024-01-01 10:00:00] local.ERROR: {"exception":"RuntimeException: boom\nat file.php:10"}"#;
        let entry = parse_line(line).expect("line should parse");
        assert_eq!(entry.timestamp, "2024-01-01 10:00:00");
        assert_eq!(entry.severity, "error");
        assert_eq!(entry.message, "RuntimeException: boom");
        assert_eq!(entry.details, "RuntimeException: boom\nat file.php:10");
    }

    #[test]
    fn test_plain_text_payload_used_verbatim() {
        let entry = parse_line("[2024-01-01 10:00:01] local.INFO: plain message").unwrap();
        assert_eq!(entry.severity, "info");
        assert_eq!(entry.message, "plain message");
        assert_eq!(entry.details, "plain message");
    }

    #[test]
    fn test_malformed_line_is_dropped() {
        assert!(parse_line("not a log line").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("[2024-01-01] missing-level: text").is_none());
        assert!(parse_line("#0 /var/www/app/Http/Kernel.php(12): handle()").is_none());
    }

    #[test]
    fn test_json_without_exception_is_pretty_printed_with_sorted_keys() {
        let line = r#"[2024-01-01 10:00:02] production.WARNING: {"zeta":1,"alpha":{"b":true}}"#;
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.severity, "warning");
        assert_eq!(entry.message, r#"{"zeta":1,"alpha":{"b":true}}"#);
        assert_eq!(
            entry.details,
            "{\n  \"alpha\": {\n    \"b\": true\n  },\n  \"zeta\": 1\n}"
        );
    }

    #[test]
    fn test_empty_exception_falls_back_to_pretty_json() {
        let line = r#"[t] local.ERROR: {"exception":""}"#;
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.message, r#"{"exception":""}"#);
        assert_eq!(entry.details, "{\n  \"exception\": \"\"\n}");
    }

    #[test]
    fn test_non_string_exception_is_not_usable() {
        let line = r#"[t] local.ERROR: {"exception":{"class":"E"}}"#;
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.message, r#"{"exception":{"class":"E"}}"#);
        assert!(entry.details.contains("\"class\": \"E\""));
    }

    #[test]
    fn test_non_object_json_is_pretty_printed() {
        let entry = parse_line("[t] local.DEBUG: [1,2]").unwrap();
        assert_eq!(entry.message, "[1,2]");
        assert_eq!(entry.details, "[\n  1,\n  2\n]");
    }

    #[test]
    fn test_exception_first_line_is_trimmed() {
        let line = r#"[t] local.CRITICAL: {"exception":"  Boom  \r\nnext"}"#;
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.message, "Boom");
    }

    #[test]
    fn test_timestamp_stops_at_first_closing_bracket() {
        let entry = parse_line("[2024-01-01 10:00:00] local.NOTICE: [x] y").unwrap();
        assert_eq!(entry.timestamp, "2024-01-01 10:00:00");
        assert_eq!(entry.message, "[x] y");
    }

    #[test]
    fn test_trailing_newline_and_carriage_return_are_ignored() {
        let entry = parse_line("[t] local.Alert: hello\r\n").unwrap();
        assert_eq!(entry.severity, "alert");
        assert_eq!(entry.message, "hello");
    }

    #[test]
    fn test_every_vocabulary_level_is_lowercased() {
        for level in [
            "EMERGENCY", "ALERT", "CRITICAL", "ERROR", "WARNING", "NOTICE", "INFO", "DEBUG",
        ] {
            let entry = parse_line(&format!("[t] app.{level}: x")).unwrap();
            assert_eq!(entry.severity, level.to_lowercase());
        }
    }
}
