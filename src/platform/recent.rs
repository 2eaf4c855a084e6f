// laratail - platform/recent.rs
//
// Recently opened log files, persisted as a JSON array of paths.
//
// - Most recent first, at most MAX_RECENT_FILES entries, no duplicates.
// - Duplicates are detected on normalised paths (lexically cleaned, and
//   case-insensitive on Windows) while the first spelling seen is kept.
// - Saved atomically (write temp, rename) so a crash mid-save never
//   corrupts the previous list.
// - Load problems are never fatal: a missing, unreadable, or malformed file
//   just yields an empty list.

use crate::util::constants::MAX_RECENT_FILES;
use crate::util::error::{RecentFilesError, Result};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Ordered list of recently opened files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentFiles {
    paths: Vec<PathBuf>,
}

impl RecentFiles {
    /// Build a list from arbitrary input, dropping empties and duplicates and
    /// keeping the first `MAX_RECENT_FILES`.
    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .filter(|p| !p.as_os_str().is_empty())
            .filter(|p| seen.insert(normalize(p)))
            .take(MAX_RECENT_FILES)
            .collect();
        Self { paths }
    }

    /// Load the list from `path`.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), error = %e, "Cannot read recent files");
                }
                return Self::default();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Recent files list is malformed, starting fresh"
                );
                return Self::default();
            }
        };

        let Some(items) = value.as_array() else {
            tracing::warn!(path = %path.display(), "Recent files list is not an array, ignoring");
            return Self::default();
        };

        let list = Self::from_paths(
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(PathBuf::from),
        );
        tracing::debug!(path = %path.display(), count = list.len(), "Recent files loaded");
        list
    }

    /// Save the cleaned list to `path` atomically.
    ///
    /// Creates parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source: std::io::Error| RecentFilesError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string(&self.paths).map_err(|source| RecentFilesError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes()).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            io_err(e)
        })?;

        tracing::debug!(path = %path.display(), count = self.paths.len(), "Recent files saved");
        Ok(())
    }

    /// Move `file` to the front, removing any other spelling of it.
    pub fn add(&mut self, file: &Path) {
        let key = normalize(file);
        let rest = self.paths.drain(..).filter(|p| normalize(p) != key);
        let merged: Vec<PathBuf> = std::iter::once(file.to_path_buf()).chain(rest).collect();
        *self = Self::from_paths(merged);
    }

    /// Forget every spelling of `file`. Returns true if anything was removed.
    pub fn remove(&mut self, file: &Path) -> bool {
        let key = normalize(file);
        let before = self.paths.len();
        self.paths.retain(|p| normalize(p) != key);
        self.paths.len() != before
    }

    pub fn most_recent(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Comparison key for a path: `.` removed, `..` folded where possible, and
/// case folded on Windows.
fn normalize(path: &Path) -> String {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(parts.last(), Some(Component::Normal(_))) =>
            {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let cleaned: PathBuf = parts.iter().collect();
    let key = cleaned.to_string_lossy().into_owned();
    if cfg!(windows) {
        key.replace('/', "\\").to_lowercase()
    } else {
        key
    }
}
