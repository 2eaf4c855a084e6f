// laratail - console.rs
//
// Console front-end: the consumer side of a WatchSession.
//
// Reads commands from stdin on a helper thread and drains session events on
// the main thread, printing entries whose level is ticked. Mirrors what a
// windowed front-end would do: select file, start/stop, tick levels, clear
// the display, inspect one entry's details, empty the file.

use crate::app::session::{WatchOptions, WatchSession};
use crate::app::state::EntryLog;
use crate::core::filter::FilterSet;
use crate::core::model::{LogEntry, Severity, WatchEvent};
use crate::platform::fs::empty_file;
use crate::platform::recent::RecentFiles;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// How long the main loop waits for a command before draining events again.
const COMMAND_WAIT: Duration = Duration::from_millis(50);

const HELP: &str = "\
Commands:
  levels <a,b,..|all|none>  choose severities to show
  open <path>               watch another file
  stop | start              pause or resume watching
  clear                     clear the display
  show <row>                print an entry's details
  empty                     empty the watched log file
  recent                    list recently watched files
  help                      this text
  quit                      exit";

/// A parsed stdin command.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Levels(Vec<Severity>),
    Open(PathBuf),
    Stop,
    Start,
    Clear,
    Show(usize),
    Empty,
    Recent,
    Help,
    Quit,
}

fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    let (word, arg) = match input.split_once(char::is_whitespace) {
        Some((w, a)) => (w, a.trim()),
        None => (input, ""),
    };
    match word.to_lowercase().as_str() {
        "levels" | "level" => match arg.to_lowercase().as_str() {
            "" | "all" => Ok(Command::Levels(Severity::all().to_vec())),
            "none" => Ok(Command::Levels(Vec::new())),
            list => FilterSet::from_tokens(list.split(',').map(str::trim).filter(|t| !t.is_empty()))
                .map(|f| Command::Levels(f.levels()))
                .map_err(|e| e.to_string()),
        },
        "open" if !arg.is_empty() => Ok(Command::Open(PathBuf::from(arg))),
        "open" => Err("usage: open <path>".to_string()),
        "stop" => Ok(Command::Stop),
        "start" => Ok(Command::Start),
        "clear" => Ok(Command::Clear),
        "show" => arg
            .parse()
            .map(Command::Show)
            .map_err(|_| "usage: show <row>".to_string()),
        "empty" => Ok(Command::Empty),
        "recent" => Ok(Command::Recent),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

/// First recent file that still exists, pruning ones that do not.
pub fn pick_recent(recent: &mut RecentFiles, store: &Path) -> Option<PathBuf> {
    let mut pruned = false;
    let found = loop {
        let Some(candidate) = recent.most_recent().map(Path::to_path_buf) else {
            break None;
        };
        if candidate.exists() {
            break Some(candidate);
        }
        eprintln!("Recent file not found, forgetting it: {}", candidate.display());
        recent.remove(&candidate);
        pruned = true;
    };
    if pruned {
        if let Err(e) = recent.save(store) {
            tracing::warn!(error = %e, "Failed to save recent files");
        }
    }
    found
}

/// Console consumer of a watch session.
pub struct ConsoleApp {
    session: WatchSession,
    log: EntryLog,
    show_details: bool,
    current: Option<PathBuf>,
    recent: RecentFiles,
    recent_path: PathBuf,
}

impl ConsoleApp {
    pub fn new(
        options: WatchOptions,
        levels: Vec<Severity>,
        show_details: bool,
        recent: RecentFiles,
        recent_path: PathBuf,
    ) -> Self {
        let mut log = EntryLog::new();
        if !levels.is_empty() {
            log.set_checked(levels.iter().copied());
        }
        Self {
            session: WatchSession::new(options, FilterSet::new(levels)),
            log,
            show_details,
            current: None,
            recent,
            recent_path,
        }
    }

    /// Select `path`, remember it, and watch it.
    pub fn open(&mut self, path: PathBuf) {
        self.recent.add(&path);
        if let Err(e) = self.recent.save(&self.recent_path) {
            tracing::warn!(error = %e, "Failed to save recent files");
        }
        self.current = Some(path);
        self.start();
    }

    /// Process events and commands until `quit` or end of input.
    pub fn run(&mut self) {
        let commands = spawn_stdin_reader();
        loop {
            self.drain_events();
            match commands.recv_timeout(COMMAND_WAIT) {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => self.execute(cmd),
                    Err(msg) => eprintln!("{msg}"),
                },
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                // stdin closed: keep tailing until the process is killed.
                Err(mpsc::RecvTimeoutError::Disconnected) => loop {
                    self.drain_events();
                    std::thread::sleep(COMMAND_WAIT);
                },
            }
        }
        self.session.stop();
    }

    fn execute(&mut self, cmd: Command) {
        match cmd {
            Command::Levels(levels) => {
                self.session.update_filters(levels.iter().copied());
                self.log.set_checked(levels);
                self.reprint();
            }
            Command::Open(path) => self.open(path),
            Command::Stop => self.session.stop(),
            Command::Start => self.start(),
            Command::Clear => self.log.clear(),
            Command::Show(row) => match self.log.get(row) {
                Some(entry) => println!("{}", entry.formatted_details()),
                None => eprintln!("no entry at row {row}"),
            },
            Command::Empty => self.empty_current(),
            Command::Recent => {
                for (i, path) in self.recent.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, path.display());
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    /// (Re)start watching the current file. The session reads from offset 0,
    /// so the display is cleared first to avoid showing rows twice.
    fn start(&mut self) {
        let Some(path) = self.current.clone() else {
            eprintln!("no file selected");
            return;
        };
        self.log.clear();
        println!("Watching {}", path.display());
        self.session.start(path);
    }

    /// Stop, empty the file, clear the display, restart if we were watching.
    fn empty_current(&mut self) {
        let Some(path) = self.current.clone() else {
            eprintln!("no file selected");
            return;
        };
        let was_watching = self.session.is_active();
        self.session.stop();
        match empty_file(&path) {
            Ok(()) => {
                self.log.clear();
                println!("Log file emptied: {}", path.display());
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to empty log file");
                eprintln!("Failed to empty log file: {e}");
            }
        }
        if was_watching {
            self.start();
        }
    }

    fn drain_events(&mut self) {
        for event in self.session.poll_events() {
            match event {
                WatchEvent::Entry(entry) => {
                    let row = self.log.len();
                    if self.log.is_visible(&entry) {
                        self.print_row(row, &entry);
                    }
                    self.log.push(entry);
                }
                WatchEvent::Waiting { path } => {
                    eprintln!("Waiting for {} to appear...", path.display());
                }
                WatchEvent::Truncated { path } => {
                    eprintln!("{} was truncated; reading from the start", path.display());
                }
                WatchEvent::Rotated { path } => {
                    eprintln!("{} was replaced; reading from the start", path.display());
                }
                WatchEvent::FileError { path, message } => {
                    eprintln!("Cannot read {}: {message}", path.display());
                }
                WatchEvent::Started { .. } | WatchEvent::FileAppeared { .. } => {}
            }
        }
    }

    fn reprint(&self) {
        for (row, entry) in self.log.visible() {
            self.print_row(row, entry);
        }
    }

    fn print_row(&self, row: usize, entry: &LogEntry) {
        println!(
            "{row:>5}  {}  {:<9}  {}",
            entry.timestamp,
            entry.severity.to_uppercase(),
            entry.message
        );
        if self.show_details && entry.details != entry.message {
            for line in entry.formatted_details().lines() {
                println!("         {line}");
            }
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
