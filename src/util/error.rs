// laratail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Nothing here crosses the consumer boundary of a watch session: the tail
// loop reports failures as events and keeps going.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all laratail operations.
#[derive(Debug)]
pub enum LaratailError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Recent-files persistence failed.
    RecentFiles(RecentFilesError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LaratailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::RecentFiles(e) => write!(f, "Recent files error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LaratailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::RecentFiles(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to building a severity filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A level token is not part of the severity vocabulary.
    UnknownSeverity { token: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSeverity { token } => write!(
                f,
                "Unknown severity '{token}'. Expected one of: emergency, alert, \
                 critical, error, warning, notice, info, debug"
            ),
        }
    }
}

impl std::error::Error for FilterError {}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for LaratailError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Recent files errors
// ---------------------------------------------------------------------------

/// Errors related to saving the recent-files list.
///
/// Loading never fails: a missing or corrupt list simply starts empty.
#[derive(Debug)]
pub enum RecentFilesError {
    /// JSON serialisation failed.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// I/O error writing the list.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RecentFilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { path, source } => {
                write!(f, "Cannot serialise '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Cannot write '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RecentFilesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<RecentFilesError> for LaratailError {
    fn from(e: RecentFilesError) -> Self {
        Self::RecentFiles(e)
    }
}

/// Convenience type alias for laratail results.
pub type Result<T> = std::result::Result<T, LaratailError>;
