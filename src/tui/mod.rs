// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, submission results)
// - Rendering the UI
//
// Keyboard dispatch is layered: Modal → Global → View-specific. The
// Home composer and the focused search box are text-entry modes where
// printable characters go into a buffer, so the global layer shrinks to
// Ctrl+C and the F-keys while one of them is active.

pub mod app;
pub mod components;
pub mod modal;
pub mod views;

use crate::config::Config;
use crate::journal::DreamJournal;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, AppEvent, View};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use modal::{Modal, ModalAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and cleans up when done.
pub async fn run_tui(journal: Arc<DreamJournal>, log_buffer: LogBuffer, config: Config) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (events_tx, mut events_rx) = mpsc::channel(16);
    let mut app = App::new(journal, log_buffer, config.illustration_dir.clone(), events_tx);

    let result = run_event_loop(&mut terminal, &mut app, &mut events_rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources with tokio::select!:
/// 1. Keyboard input
/// 2. Timer ticks (spinner animation, toast expiry, redraw)
/// 3. Settled submission results from background tasks
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick();
            }

            Some(app_event) = events_rx.recv() => {
                app.on_event(app_event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Modal → Global → View-specific
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if handle_modal_input(app, &key_event) {
        return;
    }

    if handle_global_keys(app, &key_event) {
        return;
    }

    match app.view {
        View::Home => handle_home_keys(app, &key_event),
        View::History => handle_history_keys(app, &key_event),
    }
}

/// Modal captures all input when active - returns true if absorbed
fn handle_modal_input(app: &mut App, key_event: &KeyEvent) -> bool {
    let Some(ref mut modal) = app.modal else {
        return false;
    };

    match modal.handle_input(key_event.code) {
        ModalAction::None => {}
        ModalAction::Close => app.modal = None,
        ModalAction::DeleteConfirmed(id) => {
            app.modal = None;
            app.delete(&id);
        }
        ModalAction::SaveEdit(record) => {
            app.modal = None;
            app.update(*record);
        }
    }

    true
}

/// Global keys - returns true if handled
///
/// Kept deliberately small because the composer and the search box need
/// most printable characters for themselves.
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            true
        }
        KeyCode::F(1) => {
            app.set_view(View::Home);
            true
        }
        KeyCode::F(2) => {
            app.set_view(View::History);
            true
        }
        _ => false,
    }
}

/// Home view: composer when no record is on display, card keys otherwise
fn handle_home_keys(app: &mut App, key_event: &KeyEvent) {
    if app.current.is_none() {
        // Text-entry mode
        match key_event.code {
            KeyCode::Enter => app.submit(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Esc => app.input.clear(),
            KeyCode::Char(c) if !app.loading => app.input.push(c),
            _ => {}
        }
        return;
    }

    // Card mode: hotkeys act on the displayed record
    match key_event.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.modal = Some(Modal::help()),
        KeyCode::Char('n') | KeyCode::Esc => app.reset(),
        KeyCode::Char('e') => {
            if let Some(record) = app.current.clone() {
                app.modal = Some(Modal::edit(record));
            }
        }
        KeyCode::Char('d') => {
            if let Some(record) = &app.current {
                app.modal = Some(Modal::confirm_delete(record));
            }
        }
        KeyCode::Char('y') => copy_card(app),
        KeyCode::Char('x') => match app.export_illustration() {
            Ok(path) => app.show_toast(format!("Saved {}", path.display())),
            Err(e) => app.show_toast(format!("Export failed: {e}")),
        },
        _ => {}
    }
}

/// History view: search box focus toggles text-entry mode
fn handle_history_keys(app: &mut App, key_event: &KeyEvent) {
    if app.search_focused {
        match key_event.code {
            KeyCode::Esc | KeyCode::Enter => app.search_focused = false,
            KeyCode::Backspace => {
                app.search.pop();
                app.clamp_selection();
            }
            KeyCode::Char(c) => {
                app.search.push(c);
                app.clamp_selection();
            }
            _ => {}
        }
        return;
    }

    match key_event.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.modal = Some(Modal::help()),
        KeyCode::Char('/') => app.search_focused = true,
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter => {
            if let Some(record) = app.selected_record().cloned() {
                app.select_record(record);
            }
        }
        KeyCode::Char('e') => {
            if let Some(record) = app.selected_record().cloned() {
                app.modal = Some(Modal::edit(record));
            }
        }
        KeyCode::Char('d') => {
            if let Some(record) = app.selected_record().cloned() {
                app.modal = Some(Modal::confirm_delete(&record));
            }
        }
        KeyCode::Esc => app.set_view(View::Home),
        _ => {}
    }
}

fn copy_card(app: &mut App) {
    let Some(text) = app.card_text() else {
        return;
    };
    if copy_to_clipboard(&text).is_ok() {
        app.show_toast("Copied to clipboard");
    } else {
        app.show_toast("Clipboard unavailable");
    }
}

/// Copy text to the system clipboard via arboard.
///
/// A fresh handle per call avoids holding clipboard resources between
/// copies. Fails on headless systems without a display server.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}
