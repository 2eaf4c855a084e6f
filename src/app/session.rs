// laratail - app/session.rs
//
// Watch session: runs a TailFollower on a background thread, parses every new
// line, applies the shared severity filter, and hands accepted entries to the
// consumer over an mpsc channel.
//
// Architecture:
//   - `WatchSession` lives on the consumer's thread and exposes
//     start/stop/switch_file/update_filters plus non-blocking event polling.
//   - `run_watch` is the poll loop on the background thread.
//   - An `Arc<AtomicBool>` cancel flag stops the loop; `stop()` then joins the
//     thread and drops the receiver, so nothing from a stopped run can be
//     observed once `stop()` has returned.
//   - The filter lives behind `Arc<RwLock<FilterSet>>` and is replaced whole,
//     so each line is checked against either the old or the new set.
//
// Failure policy: unparsable lines are dropped, absence is the waiting state,
// stat/read failures become `WatchEvent::FileError` and are retried on the
// next tick. Only `stop()` ends the loop (or the consumer hanging up).

use crate::app::tail::{FollowState, TailFollower, Transition};
use crate::core::filter::FilterSet;
use crate::core::model::{Severity, WatchEvent};
use crate::core::parser;
use crate::platform::config::AppConfig;
use crate::util::constants::{
    TAIL_CANCEL_CHECK_INTERVAL_MS, TAIL_MISSING_FILE_POLL_MS, TAIL_POLL_INTERVAL_MS,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

// =============================================================================
// Options
// =============================================================================

/// Poll cadence for a watch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Delay between polls while the file exists.
    pub poll_interval: Duration,
    /// Delay between polls while the file is absent.
    pub missing_file_poll: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(TAIL_POLL_INTERVAL_MS),
            missing_file_poll: Duration::from_millis(TAIL_MISSING_FILE_POLL_MS),
        }
    }
}

impl From<&AppConfig> for WatchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            missing_file_poll: config.missing_file_poll,
        }
    }
}

// =============================================================================
// Shared filter
// =============================================================================

/// Filter shared between the consumer and the poll thread.
#[derive(Debug, Clone, Default)]
pub struct SharedFilter(Arc<RwLock<FilterSet>>);

impl SharedFilter {
    pub fn new(filter: FilterSet) -> Self {
        Self(Arc::new(RwLock::new(filter)))
    }

    /// Swap in a whole new set.
    pub fn replace(&self, filter: FilterSet) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = filter;
    }

    /// Copy of the current set.
    pub fn snapshot(&self) -> FilterSet {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn should_display(&self, severity: &str) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .should_display(severity)
    }
}

// =============================================================================
// WatchSession
// =============================================================================

/// Tails one file at a time on a background thread.
pub struct WatchSession {
    options: WatchOptions,
    filter: SharedFilter,
    /// Channel receiver for the consumer to poll events.
    progress_rx: Option<mpsc::Receiver<WatchEvent>>,
    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
    handle: Option<JoinHandle<()>>,
    path: Option<PathBuf>,
}

impl WatchSession {
    pub fn new(options: WatchOptions, filter: FilterSet) -> Self {
        Self {
            options,
            filter: SharedFilter::new(filter),
            progress_rx: None,
            cancel_flag: None,
            handle: None,
            path: None,
        }
    }

    /// Start tailing `path` from offset 0.
    ///
    /// A running session is stopped first. A missing file is not an error:
    /// the session waits for it to appear.
    pub fn start(&mut self, path: impl Into<PathBuf>) {
        self.stop();

        let path = path.into();
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let follower = TailFollower::new(path.clone());
        let options = self.options;
        let filter = self.filter.clone();
        let thread_cancel = Arc::clone(&cancel);

        let spawned = std::thread::Builder::new()
            .name("laratail-watch".to_string())
            .spawn(move || run_watch(follower, options, filter, tx, thread_cancel));

        match spawned {
            Ok(handle) => {
                tracing::info!(file = %path.display(), "Watch started");
                self.progress_rx = Some(rx);
                self.cancel_flag = Some(cancel);
                self.handle = Some(handle);
                self.path = Some(path);
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Cannot spawn watch thread");
            }
        }
    }

    /// Stop the background thread and wait for it to exit.
    ///
    /// Events queued but not yet drained are discarded. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            flag.store(true, Ordering::SeqCst);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Watch thread panicked");
            }
        }
        self.progress_rx = None;
        if let Some(path) = self.path.take() {
            tracing::info!(file = %path.display(), "Watch stopped");
        }
    }

    /// Stop watching the current file and start on `path` from offset 0.
    pub fn switch_file(&mut self, path: impl Into<PathBuf>) {
        self.stop();
        self.start(path);
    }

    /// Replace the enabled levels. Applies from the next line read.
    pub fn update_filters<I: IntoIterator<Item = Severity>>(&self, levels: I) {
        let filter = FilterSet::new(levels);
        tracing::debug!(levels = ?filter.levels(), "Filters updated");
        self.filter.replace(filter);
    }

    /// Handle for updating the filter from another thread.
    pub fn filter_handle(&self) -> SharedFilter {
        self.filter.clone()
    }

    /// Returns `true` while a background thread is running.
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// The file currently being watched.
    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Drain every queued event without blocking.
    pub fn poll_events(&self) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        events
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout or when no session is running.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WatchEvent> {
        self.progress_rx.as_ref()?.recv_timeout(timeout).ok()
    }
}

impl Default for WatchSession {
    fn default() -> Self {
        Self::new(WatchOptions::default(), FilterSet::default())
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Background poll loop
// =============================================================================

fn run_watch(
    mut follower: TailFollower,
    options: WatchOptions,
    filter: SharedFilter,
    tx: mpsc::Sender<WatchEvent>,
    cancel: Arc<AtomicBool>,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                // Consumer gone, nothing left to do.
                return;
            }
        };
    }

    let path = follower.path().to_path_buf();
    send!(WatchEvent::Started { path: path.clone() });

    loop {
        if cancel.load(Ordering::SeqCst) {
            follower.stop();
            return;
        }

        let delay = match follower.poll() {
            Ok(poll) => {
                if let Some(transition) = poll.transition {
                    send!(transition_event(transition, &path));
                }
                for line in poll.lines {
                    if cancel.load(Ordering::SeqCst) {
                        follower.stop();
                        return;
                    }
                    let Some(entry) = parser::parse_line(&line) else {
                        continue;
                    };
                    if filter.should_display(&entry.severity) {
                        send!(WatchEvent::Entry(entry));
                    }
                }
                if poll.backlog {
                    // More is already on disk; read it before sleeping.
                    continue;
                }
                if follower.state() == FollowState::Waiting {
                    options.missing_file_poll
                } else {
                    options.poll_interval
                }
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Watch: read error");
                send!(WatchEvent::FileError {
                    path: path.clone(),
                    message: e.to_string(),
                });
                options.poll_interval
            }
        };

        sleep_unless_cancelled(delay, &cancel);
    }
}

fn transition_event(transition: Transition, path: &Path) -> WatchEvent {
    let path = path.to_path_buf();
    match transition {
        Transition::Appeared => WatchEvent::FileAppeared { path },
        Transition::Vanished => WatchEvent::Waiting { path },
        Transition::Truncated => WatchEvent::Truncated { path },
        Transition::Rotated => WatchEvent::Rotated { path },
    }
}

/// Sleep for `total`, waking every `TAIL_CANCEL_CHECK_INTERVAL_MS` to check
/// the cancel flag.
fn sleep_unless_cancelled(total: Duration, cancel: &AtomicBool) {
    let slice = Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS);
    let deadline = Instant::now() + total;
    while !cancel.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(slice.min(deadline - now));
    }
}
