// CLI module - command-line argument parsing and handlers
//
// Subcommands cover headless use and configuration management:
// - analyze <text>: Submit a dream and print the analysis
// - history [--search]: List recorded dreams
// - clear [--yes]: Drop the entire history
// - config --show/--reset/--edit/--path: Manage the config file
//
// With no subcommand the binary starts the TUI instead.

use crate::config::{Config, VERSION};
use crate::journal::{filter_history, DreamJournal};
use crate::record::{DreamRecord, STRESS_MAX};
use crate::store::HistoryStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::Command;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Oneiro - AI dream journal for the terminal
#[derive(Parser)]
#[command(name = "oneiro")]
#[command(version = VERSION)]
#[command(about = "AI dream journal for the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a dream without entering the TUI
    Analyze {
        /// The dream text to analyze
        text: String,
    },

    /// List recorded dreams, newest first
    History {
        /// Only show records matching this term
        #[arg(long)]
        search: Option<String>,
    },

    /// Delete the entire history
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub async fn handle_cli() -> Result<bool> {
    let cli = Cli::parse();

    if cli.command.is_some() {
        init_headless_logging();
    }

    match cli.command {
        Some(Commands::Analyze { text }) => {
            handle_analyze(&text).await?;
            Ok(true)
        }
        Some(Commands::History { search }) => {
            handle_history(search.as_deref());
            Ok(true)
        }
        Some(Commands::Clear { yes }) => {
            handle_clear(yes);
            Ok(true)
        }
        Some(Commands::Config {
            show,
            reset,
            edit,
            path,
        }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else if reset {
                handle_config_reset();
            } else if edit {
                handle_config_edit();
            } else {
                // No flag provided, show help
                println!("Usage: oneiro config [--show|--reset|--edit|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                println!("  --path    Show config file path");
            }
            Ok(true)
        }
        None => Ok(false), // No subcommand, run the TUI
    }
}

/// Default directive for headless runs when RUST_LOG is unset
const HEADLESS_LOG_DIRECTIVE: &str = "oneiro=info";

/// Filter for headless runs: RUST_LOG wins, otherwise the crate at info
fn headless_log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(HEADLESS_LOG_DIRECTIVE))
}

/// Headless subcommands have no TUI log buffer, so store and client
/// diagnostics (corrupt slot, failed writes) go straight to stderr.
/// The TUI path installs its own subscriber in main instead.
fn init_headless_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(headless_log_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Build the journal the same way the TUI does
fn open_journal(config: &Config) -> DreamJournal {
    let store = HistoryStore::new(config.history_path.clone());
    DreamJournal::new(store, crate::gemini::analyzer_from_config(config))
}

async fn handle_analyze(text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        eprintln!("Error: dream text is empty");
        std::process::exit(1);
    }

    let config = Config::from_env();
    let journal = open_journal(&config);

    eprintln!("Analyzing...");
    let record = journal.submit_dream(text).await?;
    print_record(&record);
    Ok(())
}

fn handle_history(search: Option<&str>) {
    let config = Config::from_env();
    let journal = open_journal(&config);

    let records = match search {
        Some(term) => filter_history(&journal.history(), term),
        None => journal.history(),
    };

    if records.is_empty() {
        println!("No records.");
        return;
    }

    for record in &records {
        println!(
            "{}  [{:>2}/{}]  {}",
            record.date_str,
            record.stress_level,
            STRESS_MAX,
            crate::util::clip(&crate::util::one_line(&record.dream_content), 60)
        );
    }
    println!();
    println!("{} record(s)", records.len());
}

fn handle_clear(yes: bool) {
    let config = Config::from_env();
    let journal = open_journal(&config);

    let count = journal.history().len();
    if count == 0 {
        println!("History is already empty.");
        return;
    }

    if !yes {
        eprint!("Delete all {count} record(s)? [y/N] ");
        std::io::stderr().flush().unwrap();

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).unwrap();

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return;
        }
    }

    journal.clear();
    println!("History cleared.");
}

fn print_record(record: &DreamRecord) {
    println!("{}", record.date_str);
    println!();
    println!("Dream:    {}", record.dream_content);
    println!(
        "Stress:   {}/{} ({})",
        record.stress_level,
        STRESS_MAX,
        record.band().label()
    );
    println!("Analysis: {}", record.analysis);
    println!("Advice:   {}", record.advice);
    if record.image_url.is_some() {
        println!();
        println!("An illustration was generated; open the TUI and press x to export it.");
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!(
        "api_key = {}",
        if config.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!("api_base = {:?}", config.api_base);
    println!("text_model = {:?}", config.text_model);
    println!("image_model = {:?}", config.image_model);
    println!("history_path = {:?}", config.history_path.display().to_string());
    println!(
        "illustration_dir = {:?}",
        config.illustration_dir.display().to_string()
    );
    println!("demo_mode = {}", config.demo_mode);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_dir = {:?}", config.logging.file_dir.display().to_string());
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());
    println!("file_prefix = {:?}", config.logging.file_prefix);

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush().unwrap();

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).unwrap();

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status();

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

/// Journal handle shared between the TUI event loop and spawned tasks
pub fn shared_journal(config: &Config) -> Arc<DreamJournal> {
    Arc::new(open_journal(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_filter_enables_crate_info_by_default() {
        let filter = EnvFilter::new(HEADLESS_LOG_DIRECTIVE);
        assert!(filter.to_string().contains("oneiro=info"));
    }
}
