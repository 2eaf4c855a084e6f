// laratail - app/tail.rs
//
// Tail follower: tracks a byte offset into one named file and returns the
// complete lines appended since the previous poll.
//
// States:
//   Idle      - constructed, not yet polled
//   Following - the file exists; reading from `offset`
//   Waiting   - the file does not exist; every poll checks for it
//   Stopped   - terminal; polls yield nothing
//
// `offset` sits just past the last byte read. Bytes after the final newline
// (an in-progress line) are held in `pending` until their terminator arrives,
// however many polls that takes, so a partial line is never yielded. A line
// that outgrows MAX_TAIL_LINE_BYTES is dropped through its newline.
//
// Restart rules: the offset goes back to 0 and `pending` is cleared when the
// file appears, when it shrinks below the offset (truncation, "empty log"),
// and when a different file is found at the path (rotation by rename).
//
// Encoding: lines are decoded as lossy UTF-8.

use crate::platform::fs::{read_bytes_at, FileIdentity};
use crate::util::constants::{MAX_TAIL_LINE_BYTES, MAX_TAIL_READ_BYTES_PER_TICK};
use std::io;
use std::path::{Path, PathBuf};

/// Where the follower is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    Idle,
    Following,
    Waiting,
    Stopped,
}

/// What a poll observed about the file besides new lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The file was found (first poll, or after being absent).
    Appeared,
    /// The file is absent.
    Vanished,
    /// The file shrank below the offset.
    Truncated,
    /// A different file now sits at the path.
    Rotated,
}

/// Result of one poll.
#[derive(Debug, Default)]
pub struct TailPoll {
    /// Complete lines in file order, without their terminators.
    pub lines: Vec<String>,
    /// State change detected during this poll.
    pub transition: Option<Transition>,
    /// The read stopped at the per-poll cap with more of the file unread.
    /// The caller should poll again without waiting.
    pub backlog: bool,
}

/// Follows one file by polling.
#[derive(Debug)]
pub struct TailFollower {
    path: PathBuf,
    offset: u64,
    identity: Option<FileIdentity>,
    state: FollowState,
    /// Bytes of the line currently being written, read but not yet yielded.
    pending: Vec<u8>,
    /// Dropping an overlong line until its newline shows up.
    skipping: bool,
    read_limit: usize,
    max_line: usize,
}

impl TailFollower {
    /// A follower for `path`, starting at offset 0.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            identity: None,
            state: FollowState::Idle,
            pending: Vec::new(),
            skipping: false,
            read_limit: MAX_TAIL_READ_BYTES_PER_TICK,
            max_line: MAX_TAIL_LINE_BYTES,
        }
    }

    /// Cap the bytes read per poll. Mostly useful for tests.
    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = limit.max(1);
        self
    }

    /// Cap the length of a buffered line. Mostly useful for tests.
    pub fn with_max_line_bytes(mut self, limit: usize) -> Self {
        self.max_line = limit.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Enter the terminal state. Later polls return nothing.
    pub fn stop(&mut self) {
        self.state = FollowState::Stopped;
        self.pending.clear();
    }

    /// Check the file once and return any new complete lines.
    ///
    /// Absence is not an error: it moves the follower to `Waiting`. Other
    /// stat and read failures are returned so the caller can report them and
    /// retry on its next tick; the follower's position is unchanged.
    pub fn poll(&mut self) -> io::Result<TailPoll> {
        let mut poll = TailPoll::default();
        if self.state == FollowState::Stopped {
            return Ok(poll);
        }

        // ---------------------------------------------------------------------
        // 1. Stat the path.
        // ---------------------------------------------------------------------
        let meta = match std::fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.state != FollowState::Waiting {
                    tracing::info!(file = %self.path.display(), "Tail: file absent, waiting");
                    self.reset();
                    self.state = FollowState::Waiting;
                    poll.transition = Some(Transition::Vanished);
                }
                return Ok(poll);
            }
            Err(e) => return Err(e),
        };

        // ---------------------------------------------------------------------
        // 2. Appearance, replacement, truncation.
        // ---------------------------------------------------------------------
        let identity = FileIdentity::of(&meta);
        let current_size = meta.len();

        if matches!(self.state, FollowState::Idle | FollowState::Waiting) {
            tracing::info!(
                file = %self.path.display(),
                size = current_size,
                "Tail: following file"
            );
            self.reset();
            self.state = FollowState::Following;
            poll.transition = Some(Transition::Appeared);
        } else if self.identity.is_some_and(|known| known != identity) {
            tracing::info!(
                file = %self.path.display(),
                old_offset = self.offset,
                "Tail: file replaced, resetting offset to 0"
            );
            self.reset();
            poll.transition = Some(Transition::Rotated);
        } else if current_size < self.offset {
            tracing::info!(
                file = %self.path.display(),
                old_offset = self.offset,
                new_size = current_size,
                "Tail: file truncated, resetting offset to 0"
            );
            self.reset();
            poll.transition = Some(Transition::Truncated);
        }
        self.identity = Some(identity);

        // ---------------------------------------------------------------------
        // 3. Nothing new.
        // ---------------------------------------------------------------------
        if current_size <= self.offset {
            return Ok(poll);
        }

        // ---------------------------------------------------------------------
        // 4. Read new bytes (capped per tick).
        // ---------------------------------------------------------------------
        let available = usize::try_from(current_size - self.offset).unwrap_or(usize::MAX);
        let limit = available.min(self.read_limit);
        let bytes = read_bytes_at(&self.path, self.offset, limit)?;
        self.offset += bytes.len() as u64;
        poll.backlog = bytes.len() == self.read_limit && self.offset < current_size;

        // ---------------------------------------------------------------------
        // 5. Hand out complete lines; keep the unterminated tail buffered.
        // ---------------------------------------------------------------------
        self.take_lines(&bytes, &mut poll.lines);

        if !poll.lines.is_empty() {
            tracing::debug!(
                file = %self.path.display(),
                count = poll.lines.len(),
                offset = self.offset,
                "Tail: new lines"
            );
        }
        Ok(poll)
    }

    /// Append `bytes` to the pending line and move every completed line to
    /// `out`.
    fn take_lines(&mut self, mut bytes: &[u8], out: &mut Vec<String>) {
        if self.skipping {
            let Some(pos) = bytes.iter().position(|&b| b == b'\n') else {
                return;
            };
            self.skipping = false;
            bytes = &bytes[pos + 1..];
        }

        self.pending.extend_from_slice(bytes);
        let consumed = split_complete_lines(&self.pending, out);
        self.pending.drain(..consumed);

        if self.pending.len() > self.max_line {
            tracing::warn!(
                file = %self.path.display(),
                bytes = self.pending.len(),
                "Tail: line exceeds maximum length, dropping it"
            );
            self.pending.clear();
            self.skipping = true;
        }
    }

    fn reset(&mut self) {
        self.offset = 0;
        self.identity = None;
        self.pending.clear();
        self.skipping = false;
    }
}

/// Push every newline-terminated line in `bytes` onto `out` and return the
/// number of bytes those lines occupied, terminators included.
fn split_complete_lines(bytes: &[u8], out: &mut Vec<String>) -> usize {
    let mut consumed = 0;
    while let Some(pos) = bytes[consumed..].iter().position(|&b| b == b'\n') {
        let mut line = &bytes[consumed..consumed + pos];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        out.push(String::from_utf8_lossy(line).into_owned());
        consumed += pos + 1;
    }
    consumed
}
