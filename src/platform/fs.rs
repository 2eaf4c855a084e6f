// laratail - platform/fs.rs
//
// Filesystem helpers used by the tail follower and the front-end:
// bounded reads at an offset, file identity for rotation detection, and the
// "empty log" truncation.

use crate::util::error::LaratailError;
use std::fs::Metadata;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Identity of the file currently sitting at a path.
///
/// Two stats of the same path with different identities mean the file was
/// replaced (rotation by rename, delete + recreate) even if the new file
/// happens to be larger than the old offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(not(unix))]
    created: Option<std::time::SystemTime>,
}

impl FileIdentity {
    /// Identity of the file described by `meta`.
    #[cfg(unix)]
    pub fn of(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    /// Identity of the file described by `meta`.
    ///
    /// Creation time is the best portable signal here; platforms that do
    /// not report it fall back to truncation detection alone.
    #[cfg(not(unix))]
    pub fn of(meta: &Metadata) -> Self {
        Self {
            created: meta.created().ok(),
        }
    }
}

/// Read up to `limit` bytes from `path` starting at byte position `offset`.
///
/// The handle lives only for this call, so it is released on every path
/// including when the file disappears between the stat and the read.
/// Returns fewer bytes than `limit` if the file ends first.
pub fn read_bytes_at(path: &Path, offset: u64, limit: usize) -> io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Truncate the file at `path` to zero length.
///
/// A session watching the file sees this as a truncation and starts again
/// from offset 0.
pub fn empty_file(path: &Path) -> crate::util::error::Result<()> {
    std::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| LaratailError::Io {
            path: path.to_path_buf(),
            operation: "truncate",
            source,
        })?;
    tracing::info!(file = %path.display(), "Log file emptied");
    Ok(())
}
