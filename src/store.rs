// History store - single-slot JSON persistence for dream records
//
// The whole history lives in one JSON file holding an ordered list,
// newest first. Every mutation rewrites the slot. There is no schema
// versioning and no migration; a format change is out-of-band.
//
// Failure policy: a corrupt slot reads as an empty history (logged,
// not repaired), and a failed write is logged while the
// caller still gets the best available in-memory state. Persistence
// problems never surface to the user as blocking errors.

use crate::record::DreamRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub struct HistoryStore {
    slot_path: PathBuf,
}

impl HistoryStore {
    /// Create a store backed by the given slot file. The file is created
    /// lazily on first write.
    pub fn new(slot_path: PathBuf) -> Self {
        Self { slot_path }
    }

    /// Full history, newest first. Missing or corrupt data reads as empty.
    pub fn list(&self) -> Vec<DreamRecord> {
        let contents = match fs::read_to_string(&self.slot_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to read history slot {:?}: {}", self.slot_path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(e) => {
                // Corrupt slot: treated as empty history, not repaired
                tracing::error!("Corrupt history slot {:?}: {}", self.slot_path, e);
                Vec::new()
            }
        }
    }

    /// Insert a record at the head and persist. Returns the updated list
    /// even when the write itself fails.
    pub fn append(&self, record: DreamRecord) -> Vec<DreamRecord> {
        let mut records = self.list();
        records.insert(0, record);
        self.persist(&records);
        records
    }

    /// Replace the record with a matching id in place, keeping list order.
    /// Unknown ids leave the history unchanged.
    pub fn replace(&self, updated: DreamRecord) -> Vec<DreamRecord> {
        let mut records = self.list();
        for record in records.iter_mut() {
            if record.id == updated.id {
                *record = updated;
                break;
            }
        }
        self.persist(&records);
        records
    }

    /// Remove the record with the given id, if present.
    pub fn remove(&self, id: &str) -> Vec<DreamRecord> {
        let mut records = self.list();
        records.retain(|record| record.id != id);
        self.persist(&records);
        records
    }

    /// Empty the store entirely.
    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.slot_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!("Failed to clear history slot {:?}: {}", self.slot_path, e);
            }
        }
    }

    /// Write the full list back to the slot. Errors are logged and
    /// swallowed so callers keep their in-memory state.
    fn persist(&self, records: &[DreamRecord]) {
        if let Err(e) = self.try_persist(records) {
            tracing::error!("Failed to persist history: {:?}", e);
        }
    }

    fn try_persist(&self, records: &[DreamRecord]) -> Result<()> {
        if let Some(parent) = self.slot_path.parent() {
            fs::create_dir_all(parent).context("Failed to create history directory")?;
        }
        let json = serde_json::to_string(records).context("Failed to serialize history")?;
        fs::write(&self.slot_path, json).context("Failed to write history slot")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DreamAnalysis;
    use tempfile::tempdir;

    fn record(content: &str, level: u8) -> DreamRecord {
        DreamRecord::new(
            content.to_string(),
            DreamAnalysis {
                analysis: format!("analysis of {content}"),
                stress_level: level,
                advice: "rest".to_string(),
            },
            None,
        )
    }

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("history.json"))
    }

    #[test]
    fn empty_store_lists_nothing() {
        let dir = tempdir().unwrap();
        assert!(store_in(&dir).list().is_empty());
    }

    #[test]
    fn append_prepends_and_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.append(record("first", 2));
        let after_second = store.append(record("second", 5));

        assert_eq!(after_second.len(), 2);
        assert_eq!(after_second[0].dream_content, "second");
        assert_eq!(after_second[1].dream_content, "first");

        // A fresh read sees the same ordering
        let listed = store.list();
        assert_eq!(listed, after_second);
    }

    #[test]
    fn list_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append(record("dream", 3));

        assert_eq!(store.list(), store.list());
    }

    #[test]
    fn replace_updates_fields_but_keeps_position() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.append(record("oldest", 1));
        let target = record("middle", 4);
        let target_id = target.id.clone();
        store.append(target.clone());
        store.append(record("newest", 7));

        let mut edited = target;
        edited.analysis = "revised interpretation".to_string();
        let updated = store.replace(edited);

        assert_eq!(updated.len(), 3);
        assert_eq!(updated[1].id, target_id);
        assert_eq!(updated[1].analysis, "revised interpretation");
        assert_eq!(updated[0].dream_content, "newest");
    }

    #[test]
    fn replace_unknown_id_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append(record("only", 3));

        let stranger = record("stranger", 9);
        let updated = store.replace(stranger);

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].dream_content, "only");
    }

    #[test]
    fn remove_filters_by_id() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let doomed = record("doomed", 8);
        let doomed_id = doomed.id.clone();
        store.append(record("keeper", 2));
        store.append(doomed);

        let updated = store.remove(&doomed_id);
        assert_eq!(updated.len(), 1);
        assert!(updated.iter().all(|r| r.id != doomed_id));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn clear_empties_the_slot() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append(record("gone", 5));

        store.clear();
        assert!(store.list().is_empty());

        // Clearing an already-empty store is fine
        store.clear();
        assert!(store.list().is_empty());
    }

    #[test]
    fn slot_with_unclamped_score_reads_in_domain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"[{
                "id": "legacy",
                "timestamp": 1700000000000,
                "dateStr": "Friday, January 3, 2026",
                "dreamContent": "endless stairs",
                "analysis": "looping worry",
                "stressLevel": 15,
                "advice": "rest"
            }]"#,
        )
        .unwrap();

        let records = HistoryStore::new(path).list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stress_level, crate::record::STRESS_MAX);
    }

    #[test]
    fn corrupt_slot_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json at all").unwrap();

        let store = HistoryStore::new(path);
        assert!(store.list().is_empty());

        // The store keeps working after the corrupt read
        let updated = store.append(record("fresh start", 1));
        assert_eq!(updated.len(), 1);
        assert_eq!(store.list().len(), 1);
    }
}
