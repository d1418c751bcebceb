// Record orchestrator
//
// Combines user input, the two concurrent AI results, and id/timestamp
// generation into one persisted record, and drives the history store for
// every mutation the UI or CLI needs.
//
// submit_dream fans out the text-analysis and image-generation requests
// with tokio::join!, which collects both outcomes independently: an image
// failure cannot cancel the text branch, and a text failure discards
// whatever the image branch produced. Exactly one store mutation happens
// per successful submission, zero on failure.

use crate::gemini::{AnalysisError, DreamAnalyzer};
use crate::record::{DreamAnalysis, DreamRecord};
use crate::store::HistoryStore;
use std::sync::Arc;

pub struct DreamJournal {
    store: HistoryStore,
    analyzer: Arc<dyn DreamAnalyzer>,
}

impl DreamJournal {
    pub fn new(store: HistoryStore, analyzer: Arc<dyn DreamAnalyzer>) -> Self {
        Self { store, analyzer }
    }

    /// Full history, newest first
    pub fn history(&self) -> Vec<DreamRecord> {
        self.store.list()
    }

    /// Submit a dream for analysis. Expects non-empty trimmed text.
    ///
    /// Both external requests are issued concurrently and both settle
    /// before anything else happens. On success the merged record is
    /// appended at the head of the store and returned as the new current
    /// record.
    pub async fn submit_dream(&self, dream_text: &str) -> Result<DreamRecord, AnalysisError> {
        let (analysis, image_url) = tokio::join!(
            self.analyzer.analyze_dream(dream_text),
            self.analyzer.generate_dream_image(dream_text),
        );

        // Text analysis is the core value: its failure fails the whole
        // submission and the image result, settled or not, is dropped.
        let analysis: DreamAnalysis = analysis?;

        let record = DreamRecord::new(dream_text.to_string(), analysis, image_url);
        self.store.append(record.clone());

        tracing::info!(id = %record.id, stress_level = record.stress_level, "Dream recorded");
        Ok(record)
    }

    /// Remove a record by id, returning the updated history
    pub fn delete(&self, id: &str) -> Vec<DreamRecord> {
        self.store.remove(id)
    }

    /// Write an edited record through to the store, keeping list order
    pub fn update(&self, record: DreamRecord) -> Vec<DreamRecord> {
        self.store.replace(record)
    }

    /// Drop the entire history
    pub fn clear(&self) {
        self.store.clear()
    }
}

/// Filter a history list by the timeline search term
pub fn filter_history(records: &[DreamRecord], term: &str) -> Vec<DreamRecord> {
    records
        .iter()
        .filter(|record| record.matches(term))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::tempdir;

    /// Scripted analyzer for orchestrator tests
    struct ScriptedAnalyzer {
        analysis: Result<DreamAnalysis, &'static str>,
        image: Option<String>,
    }

    #[async_trait]
    impl DreamAnalyzer for ScriptedAnalyzer {
        async fn analyze_dream(&self, _text: &str) -> Result<DreamAnalysis, AnalysisError> {
            self.analysis
                .clone()
                .map_err(|msg| AnalysisError::Service(msg.to_string()))
        }

        async fn generate_dream_image(&self, _text: &str) -> Option<String> {
            self.image.clone()
        }
    }

    fn journal_with(
        dir: &tempfile::TempDir,
        analysis: Result<DreamAnalysis, &'static str>,
        image: Option<String>,
    ) -> DreamJournal {
        let store = HistoryStore::new(dir.path().join("history.json"));
        DreamJournal::new(store, Arc::new(ScriptedAnalyzer { analysis, image }))
    }

    fn good_analysis(level: u8) -> DreamAnalysis {
        DreamAnalysis {
            analysis: "A wish-fulfillment pattern.".to_string(),
            stress_level: level,
            advice: "Stretch before bed.".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_submission_lands_at_the_head() {
        let dir = tempdir().unwrap();
        let journal = journal_with(
            &dir,
            Ok(good_analysis(7)),
            Some("data:image/png;base64,AA==".to_string()),
        );

        let record = journal
            .submit_dream("I dreamt of flying over a glass city")
            .await
            .unwrap();

        assert_eq!(record.stress_level, 7);
        assert!(record.image_url.is_some());
        assert_eq!(record.date_str, chrono::Local::now().format("%A, %B %-d, %Y").to_string());

        let history = journal.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, record.id);
        assert_eq!(history[0].dream_content, "I dreamt of flying over a glass city");
    }

    #[tokio::test]
    async fn image_failure_degrades_without_error() {
        let dir = tempdir().unwrap();
        let journal = journal_with(&dir, Ok(good_analysis(4)), None);

        let record = journal.submit_dream("a silent house").await.unwrap();
        assert!(record.image_url.is_none());
        assert_eq!(journal.history().len(), 1);
    }

    #[tokio::test]
    async fn analysis_failure_leaves_the_store_untouched() {
        let dir = tempdir().unwrap();
        let journal = journal_with(
            &dir,
            Err("upstream melted"),
            Some("data:image/png;base64,AA==".to_string()),
        );

        let before = journal.history().len();
        let result = journal.submit_dream("endless stairs").await;

        assert!(matches!(result, Err(AnalysisError::Service(_))));
        // Zero mutations on failure; the settled image result is discarded
        assert_eq!(journal.history().len(), before);
    }

    #[tokio::test]
    async fn submissions_stack_newest_first() {
        let dir = tempdir().unwrap();
        let journal = journal_with(&dir, Ok(good_analysis(2)), None);

        journal.submit_dream("first dream").await.unwrap();
        journal.submit_dream("second dream").await.unwrap();

        let history = journal.history();
        assert_eq!(history[0].dream_content, "second dream");
        assert_eq!(history[1].dream_content, "first dream");
    }

    #[tokio::test]
    async fn update_and_delete_pass_through() {
        let dir = tempdir().unwrap();
        let journal = journal_with(&dir, Ok(good_analysis(5)), None);

        let record = journal.submit_dream("a red door").await.unwrap();

        let mut edited = record.clone();
        edited.advice = "Open it.".to_string();
        let history = journal.update(edited);
        assert_eq!(history[0].advice, "Open it.");

        let history = journal.delete(&record.id);
        assert!(history.is_empty());
    }

    #[test]
    fn search_filters_by_any_field() {
        let records = vec![
            DreamRecord::new("glass city".to_string(), good_analysis(3), None),
            DreamRecord::new("dark forest".to_string(), good_analysis(8), None),
        ];

        let hits = filter_history(&records, "forest");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].dream_content, "dark forest");

        // Term present only in the analysis field still matches
        let hits = filter_history(&records, "wish-fulfillment");
        assert_eq!(hits.len(), 2);

        assert!(filter_history(&records, "submarine").is_empty());
        assert_eq!(filter_history(&records, "").len(), 2);
    }
}
