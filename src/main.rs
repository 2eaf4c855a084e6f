// laratail - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Log file selection (CLI path or most recent file)
// 4. Console front-end launch

mod console;

pub use laratail::app;
pub use laratail::core;
pub use laratail::platform;
pub use laratail::util;

use clap::Parser;
use std::path::PathBuf;

/// laratail - live tail for Laravel-style application logs.
///
/// Follows a log file as it grows, survives truncation and rotation, and
/// prints entries of the selected severities. Type `help` while running for
/// interactive commands.
#[derive(Parser, Debug)]
#[command(name = "laratail", version, about)]
struct Cli {
    /// Log file to watch (defaults to the most recently watched file).
    path: Option<PathBuf>,

    /// Severity to show; repeat for several (default: all).
    #[arg(short = 'l', long = "level", value_name = "LEVEL")]
    levels: Vec<String>,

    /// Print each entry's details below it.
    #[arg(long = "details")]
    details: bool,

    /// Empty the log file before watching it.
    #[arg(long = "empty")]
    empty: bool,

    /// List recently watched files and exit.
    #[arg(long = "recent")]
    recent: bool,

    /// Use this config file instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = platform::config::PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "laratail starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
        eprintln!("Warning: {warning}");
    }

    let recent_path = platform_paths.recent_files();
    let mut recent = platform::recent::RecentFiles::load(&recent_path);

    if cli.recent {
        if recent.is_empty() {
            println!("No recently watched files.");
        }
        for (i, path) in recent.iter().enumerate() {
            println!("{:>2}. {}", i + 1, path.display());
        }
        return;
    }

    let levels = if cli.levels.is_empty() {
        config.levels.clone()
    } else {
        match core::filter::FilterSet::from_tokens(&cli.levels) {
            Ok(filter) => filter.levels(),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        }
    };

    let path = match cli.path {
        Some(path) => path,
        None => match console::pick_recent(&mut recent, &recent_path) {
            Some(path) => path,
            None => {
                eprintln!("Error: no log file given and no recent file available");
                std::process::exit(2);
            }
        },
    };

    if cli.empty {
        if let Err(e) = platform::fs::empty_file(&path) {
            tracing::error!(error = %e, "Failed to empty log file");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    let options = app::session::WatchOptions::from(&config);
    let mut console = console::ConsoleApp::new(options, levels, cli.details, recent, recent_path);
    console.open(path);
    console.run();
}
