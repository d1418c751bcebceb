// Oneiro - AI dream journal for the terminal
//
// Describe a dream, get a Gemini-powered interpretation with a stress
// score and advice, and keep the whole history on disk.
//
// Architecture:
// - Gemini client (reqwest): Structured text analysis + best-effort image
// - Journal: Orchestrates the two concurrent requests into one record
// - Store: Single JSON file holding the full history, newest first
// - TUI (ratatui): Home composer / analysis card, History chart + timeline
// - CLI (clap): Headless analyze/history/clear and config management

mod cli;
mod config;
mod gemini;
mod journal;
mod logging;
mod record;
mod store;
mod tui;
mod util;

use anyhow::Result;
use config::{Config, LogRotation};
use logging::{LogBuffer, TuiLogLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Headless subcommands run and exit before any TUI setup
    if cli::handle_cli().await? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env();

    // Logs go to an in-memory buffer the TUI renders in its footer;
    // writing to stdout would garble the alternate screen.
    // Optionally also to rotating JSON log files.
    //
    // Precedence: RUST_LOG env var > config file > default "info"
    let log_buffer = LogBuffer::new();
    let default_filter = format!("oneiro={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // The guard must stay alive for the whole run so file logs flush
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> = if config
        .logging
        .file_enabled
    {
        match std::fs::create_dir_all(&config.logging.file_dir) {
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                tracing_subscriber::registry()
                    .with(filter)
                    .with(TuiLogLayer::new(log_buffer.clone()))
                    .init();
                None
            }
            Ok(()) => {
                let file_appender = match config.logging.file_rotation {
                    LogRotation::Hourly => tracing_appender::rolling::hourly(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Daily => tracing_appender::rolling::daily(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Never => tracing_appender::rolling::never(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                };

                // Non-blocking writer: file IO happens on a background thread
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                tracing_subscriber::registry()
                    .with(filter)
                    .with(TuiLogLayer::new(log_buffer.clone()))
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(non_blocking)
                            .with_ansi(false),
                    )
                    .init();

                Some(guard)
            }
        }
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(log_buffer.clone()))
            .init();
        None
    };

    tracing::info!(
        version = config::VERSION,
        history = %config.history_path.display(),
        "Starting oneiro"
    );

    if !config.demo_mode && config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; submissions will fail until it is");
    }

    let journal = cli::shared_journal(&config);

    if let Err(e) = tui::run_tui(journal, log_buffer, config).await {
        tracing::error!("TUI error: {:?}", e);
        return Err(e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
