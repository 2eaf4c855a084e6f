// laratail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "laratail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "laratail";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Live tail limits
// =============================================================================

/// How often the tail loop polls a present file for new content (ms).
/// New entries appear within roughly this delay of being written.
pub const TAIL_POLL_INTERVAL_MS: u64 = 100;

/// How often the tail loop checks whether a missing file has appeared (ms).
pub const TAIL_MISSING_FILE_POLL_MS: u64 = 1_000;

/// How often the cancel flag is checked within each poll sleep (ms).
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 20;

/// Minimum user-configurable poll interval (ms).
pub const MIN_TAIL_POLL_INTERVAL_MS: u64 = 10;

/// Maximum user-configurable poll interval (ms).
pub const MAX_TAIL_POLL_INTERVAL_MS: u64 = 10_000; // 10 s

/// Maximum bytes read from the watched file in one poll tick.
/// Prevents a large burst of new content from stalling the poll loop.
pub const MAX_TAIL_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Longest line the follower will buffer while waiting for its terminator.
///
/// A line growing past this (binary content, a runaway writer) is dropped
/// with a warning, up to and including its eventual newline.
pub const MAX_TAIL_LINE_BYTES: usize = 16 * 1_024 * 1_024; // 16 MiB

// =============================================================================
// Parsing
// =============================================================================

/// Placeholder shown when an entry carries no detail payload.
pub const NO_DETAILS_TEXT: &str = "No additional details available";

// =============================================================================
// Recent files
// =============================================================================

/// Maximum number of paths remembered in the recent-files list.
pub const MAX_RECENT_FILES: usize = 10;

/// Recent-files list name (stored in the platform data directory).
pub const RECENT_FILES_FILE_NAME: &str = "recent_files.json";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
