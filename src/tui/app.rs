// TUI application state
//
// This is the view controller: an explicit state struct owned by the
// event loop, mutated only through the transition methods below. The
// render layer reads it as read-only props.

use super::modal::Modal;
use crate::journal::DreamJournal;
use crate::logging::LogBuffer;
use crate::record::DreamRecord;
use anyhow::{Context, Result};
use base64::Engine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The two top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home, // Dream input, or the current record's analysis card
    History, // Stress chart and searchable timeline
}

impl View {
    /// Display name for the title bar
    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "Dream",
            View::History => "History",
        }
    }
}

/// Results flowing back from a background submission task
#[derive(Debug)]
pub enum AppEvent {
    AnalysisComplete(Box<DreamRecord>),
    AnalysisFailed(String),
}

/// How long a toast stays on screen
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Main application state for the TUI
pub struct App {
    /// Current view being displayed
    pub view: View,

    /// Full history, newest first (mirrors the store)
    pub records: Vec<DreamRecord>,

    /// The record shown on the Home view, if any
    pub current: Option<DreamRecord>,

    /// A submission is in flight
    pub loading: bool,

    /// User-visible failure message from the last submission
    pub error: Option<String>,

    /// Dream text being composed on the Home view
    pub input: String,

    /// Timeline search term
    pub search: String,

    /// Whether keystrokes go to the search box
    pub search_focused: bool,

    /// Selection index into the filtered timeline
    pub selected: usize,

    /// Active modal overlay, if any
    pub modal: Option<Modal>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Transient notification line
    toast: Option<(String, Instant)>,

    /// Animation frame counter for the loading spinner
    pub tick_frame: usize,

    /// Captured tracing output for the footer
    pub log_buffer: LogBuffer,

    /// Where exported illustrations land
    illustration_dir: PathBuf,

    journal: Arc<DreamJournal>,
    events_tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(
        journal: Arc<DreamJournal>,
        log_buffer: LogBuffer,
        illustration_dir: PathBuf,
        events_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let records = journal.history();
        Self {
            view: View::default(),
            records,
            current: None,
            loading: false,
            error: None,
            input: String::new(),
            search: String::new(),
            search_focused: false,
            selected: 0,
            modal: None,
            should_quit: false,
            toast: None,
            tick_frame: 0,
            log_buffer,
            illustration_dir,
            journal,
            events_tx,
        }
    }

    // ───────────────────────────────────────────────────────────────────
    // Transitions
    // ───────────────────────────────────────────────────────────────────

    /// Submit the composed dream text. Ignored while a submission is in
    /// flight or when the trimmed input is empty.
    pub fn submit(&mut self) {
        if self.loading {
            return;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.loading = true;
        self.error = None;

        let journal = self.journal.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match journal.submit_dream(&text).await {
                Ok(record) => AppEvent::AnalysisComplete(Box::new(record)),
                Err(e) => {
                    tracing::error!("Dream analysis failed: {}", e);
                    AppEvent::AnalysisFailed(user_message(&e))
                }
            };
            // The receiver only disappears on shutdown
            let _ = tx.send(event).await;
        });
    }

    /// Apply a settled submission result
    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AnalysisComplete(record) => {
                self.loading = false;
                self.records.insert(0, (*record).clone());
                self.current = Some(*record);
                self.input.clear();
                // Stay on Home and show the card
            }
            AppEvent::AnalysisFailed(message) => {
                self.loading = false;
                self.error = Some(message);
                // current record unchanged
            }
        }
    }

    /// Open a record from the timeline on the Home view
    pub fn select_record(&mut self, record: DreamRecord) {
        self.current = Some(record);
        self.view = View::Home;
    }

    /// Back to a blank Home view
    pub fn reset(&mut self) {
        self.current = None;
        self.error = None;
        self.view = View::Home;
    }

    /// Delete by id. Deleting the record currently on display also
    /// clears it and returns Home.
    pub fn delete(&mut self, id: &str) {
        self.records = self.journal.delete(id);
        if self.current.as_ref().is_some_and(|r| r.id == id) {
            self.current = None;
            self.view = View::Home;
        }
        self.clamp_selection();
        self.show_toast("Record deleted");
    }

    /// Write an edited record through to the store and display it
    pub fn update(&mut self, record: DreamRecord) {
        self.records = self.journal.update(record.clone());
        self.current = Some(record);
        self.show_toast("Record updated");
    }

    /// Pure navigation, no side effects
    pub fn set_view(&mut self, view: View) {
        self.view = view;
        if view == View::History {
            self.clamp_selection();
        } else {
            self.search_focused = false;
        }
    }

    // ───────────────────────────────────────────────────────────────────
    // Timeline selection and search
    // ───────────────────────────────────────────────────────────────────

    /// Indices into `records` that match the current search term
    pub fn filtered_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.matches(&self.search))
            .map(|(i, _)| i)
            .collect()
    }

    /// The record under the timeline cursor
    pub fn selected_record(&self) -> Option<&DreamRecord> {
        let indices = self.filtered_indices();
        indices.get(self.selected).map(|&i| &self.records[i])
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        let len = self.filtered_indices().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    /// Keep the cursor inside the (possibly shrunk) filtered list
    pub fn clamp_selection(&mut self) {
        let len = self.filtered_indices().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    // ───────────────────────────────────────────────────────────────────
    // Extras
    // ───────────────────────────────────────────────────────────────────

    /// Advance animations and expire the toast. Called on every tick.
    pub fn tick(&mut self) {
        self.tick_frame = self.tick_frame.wrapping_add(1);
        if let Some((_, shown_at)) = self.toast {
            if shown_at.elapsed() > TOAST_DURATION {
                self.toast = None;
            }
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some((message.into(), Instant::now()));
    }

    pub fn toast_message(&self) -> Option<&str> {
        self.toast.as_ref().map(|(message, _)| message.as_str())
    }

    /// Plain-text rendering of the current analysis card, for the clipboard
    pub fn card_text(&self) -> Option<String> {
        let record = self.current.as_ref()?;
        Some(format!(
            "{}\n\nDream: {}\n\nStress: {}/10 ({})\n\nAnalysis: {}\n\nAdvice: {}\n",
            record.date_str,
            record.dream_content,
            record.stress_level,
            record.band().label(),
            record.analysis,
            record.advice,
        ))
    }

    /// Decode the current record's data-URI illustration and write it to
    /// disk. The terminal cannot render it inline, so this is the way out.
    pub fn export_illustration(&self) -> Result<PathBuf> {
        let record = self.current.as_ref().context("No record on display")?;
        let data_uri = record
            .image_url
            .as_deref()
            .context("This record has no illustration")?;

        let (mime, payload) = parse_data_uri(data_uri).context("Malformed illustration data")?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .context("Illustration payload is not valid base64")?;

        let ext = mime.strip_prefix("image/").unwrap_or("bin");
        std::fs::create_dir_all(&self.illustration_dir)
            .context("Failed to create illustration directory")?;
        let path = self.illustration_dir.join(format!("{}.{}", record.id, ext));
        std::fs::write(&path, bytes).context("Failed to write illustration file")?;

        tracing::info!("Illustration exported to {:?}", path);
        Ok(path)
    }
}

/// Split `data:<mime>;base64,<payload>` into mime and payload
fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    Some((mime, payload))
}

/// Map a client failure to the message shown in the error banner.
/// Detail goes to the log; the user gets something actionable but generic.
fn user_message(error: &crate::gemini::AnalysisError) -> String {
    use crate::gemini::AnalysisError;
    match error {
        AnalysisError::MissingApiKey => {
            "No API key configured. Set GEMINI_API_KEY and try again.".to_string()
        }
        _ => "Analysis failed. Check your network connection or API key.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::{AnalysisError, DreamAnalyzer};
    use crate::record::DreamAnalysis;
    use crate::store::HistoryStore;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct ScriptedAnalyzer {
        fail: bool,
    }

    #[async_trait]
    impl DreamAnalyzer for ScriptedAnalyzer {
        async fn analyze_dream(&self, _text: &str) -> Result<DreamAnalysis, AnalysisError> {
            if self.fail {
                Err(AnalysisError::Service("scripted failure".to_string()))
            } else {
                Ok(DreamAnalysis {
                    analysis: "Scripted reading.".to_string(),
                    stress_level: 6,
                    advice: "Scripted advice.".to_string(),
                })
            }
        }

        async fn generate_dream_image(&self, _text: &str) -> Option<String> {
            None
        }
    }

    fn test_app(
        dir: &tempfile::TempDir,
        fail: bool,
    ) -> (App, mpsc::Receiver<AppEvent>) {
        let store = HistoryStore::new(dir.path().join("history.json"));
        let journal = Arc::new(DreamJournal::new(
            store,
            Arc::new(ScriptedAnalyzer { fail }),
        ));
        let (tx, rx) = mpsc::channel(8);
        let app = App::new(journal, LogBuffer::new(), dir.path().join("img"), tx);
        (app, rx)
    }

    #[tokio::test]
    async fn submit_success_sets_current_and_clears_input() {
        let dir = tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir, false);

        app.input = "  a glass city  ".to_string();
        app.submit();
        assert!(app.loading);
        assert!(app.error.is_none());

        let event = rx.recv().await.unwrap();
        app.on_event(event);

        assert!(!app.loading);
        assert!(app.input.is_empty());
        assert_eq!(app.view, View::Home);
        let current = app.current.as_ref().unwrap();
        assert_eq!(current.dream_content, "a glass city");
        assert_eq!(current.stress_level, 6);
        assert_eq!(app.records.len(), 1);
    }

    #[tokio::test]
    async fn submit_failure_sets_error_and_keeps_current() {
        let dir = tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir, true);

        app.input = "endless stairs".to_string();
        app.submit();
        let event = rx.recv().await.unwrap();
        app.on_event(event);

        assert!(!app.loading);
        assert!(app.error.is_some());
        assert!(app.current.is_none());
        assert!(app.records.is_empty());
        // Input is preserved so the user can retry
        assert_eq!(app.input, "endless stairs");
    }

    #[tokio::test]
    async fn submit_is_ignored_while_loading_or_empty() {
        let dir = tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir, false);

        app.input = "   ".to_string();
        app.submit();
        assert!(!app.loading);

        app.input = "real dream".to_string();
        app.submit();
        assert!(app.loading);
        // Second submit while in flight does not spawn another task
        app.submit();
        assert!(app.loading);
    }

    #[tokio::test]
    async fn deleting_the_displayed_record_returns_home() {
        let dir = tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir, false);

        app.input = "a red door".to_string();
        app.submit();
        let event = rx.recv().await.unwrap();
        app.on_event(event);

        let id = app.current.as_ref().unwrap().id.clone();
        app.view = View::History;
        app.delete(&id);

        assert!(app.current.is_none());
        assert_eq!(app.view, View::Home);
        assert!(app.records.is_empty());
    }

    #[tokio::test]
    async fn deleting_another_record_keeps_the_current_one() {
        let dir = tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir, false);

        for text in ["first", "second"] {
            app.input = text.to_string();
            app.submit();
            let event = rx.recv().await.unwrap();
            app.on_event(event);
        }

        // Current is "second" (head); delete "first"
        let other_id = app.records[1].id.clone();
        app.delete(&other_id);

        assert!(app.current.is_some());
        assert_eq!(app.records.len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_current_without_reordering() {
        let dir = tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir, false);

        for text in ["older", "newer"] {
            app.input = text.to_string();
            app.submit();
            let event = rx.recv().await.unwrap();
            app.on_event(event);
        }

        let mut edited = app.records[1].clone(); // "older"
        edited.advice = "Edited advice.".to_string();
        app.update(edited.clone());

        assert_eq!(app.current.as_ref().unwrap().id, edited.id);
        // Order preserved: edited record stays in second place
        assert_eq!(app.records[1].advice, "Edited advice.");
        assert_eq!(app.records[0].dream_content, "newer");
    }

    #[tokio::test]
    async fn search_narrows_the_timeline() {
        let dir = tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir, false);

        for text in ["glass city", "dark forest"] {
            app.input = text.to_string();
            app.submit();
            let event = rx.recv().await.unwrap();
            app.on_event(event);
        }

        app.search = "forest".to_string();
        let indices = app.filtered_indices();
        assert_eq!(indices.len(), 1);
        assert_eq!(app.records[indices[0]].dream_content, "dark forest");

        app.search = "submarine".to_string();
        assert!(app.filtered_indices().is_empty());
        assert!(app.selected_record().is_none());
    }

    #[tokio::test]
    async fn reset_clears_card_and_error() {
        let dir = tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir, false);

        app.input = "x".to_string();
        app.submit();
        let event = rx.recv().await.unwrap();
        app.on_event(event);
        app.error = Some("stale".to_string());

        app.reset();
        assert!(app.current.is_none());
        assert!(app.error.is_none());
        assert_eq!(app.view, View::Home);
    }

    #[test]
    fn data_uri_parsing() {
        assert_eq!(
            parse_data_uri("data:image/png;base64,QUJD"),
            Some(("image/png", "QUJD"))
        );
        assert!(parse_data_uri("not a uri").is_none());
        assert!(parse_data_uri("data:image/png,raw").is_none());
    }

    #[tokio::test]
    async fn export_writes_decoded_illustration() {
        let dir = tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir, false);

        let record = DreamRecord::new(
            "pictured".to_string(),
            DreamAnalysis {
                analysis: "a".to_string(),
                stress_level: 1,
                advice: "b".to_string(),
            },
            // "ABC" base64-encoded
            Some("data:image/png;base64,QUJD".to_string()),
        );
        app.current = Some(record.clone());

        let path = app.export_illustration().unwrap();
        assert!(path.ends_with(format!("{}.png", record.id)));
        assert_eq!(std::fs::read(path).unwrap(), b"ABC");
    }
}
