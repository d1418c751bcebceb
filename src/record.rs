// Dream record data model
//
// A DreamRecord is one persisted analysis session: the user's dream text,
// the AI outputs merged into it, and creation metadata. Records are stored
// as JSON with camelCase keys so the history slot stays compatible with
// what the original web app persisted.

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Canonical upper bound for a stress score. The model is prompted for
/// 1-10, but nothing above this survives the client boundary.
pub const STRESS_MAX: u8 = 10;

/// One persisted dream analysis session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamRecord {
    /// Unique opaque id, generated at creation, never reused
    pub id: String,

    /// Creation time in epoch milliseconds
    pub timestamp: i64,

    /// Human-readable long-form date, fixed at creation
    pub date_str: String,

    /// The user's dream description as submitted
    pub dream_content: String,

    /// AI-generated psychological analysis
    pub analysis: String,

    /// Inferred stress score in [0, STRESS_MAX]
    #[serde(deserialize_with = "clamp_stress")]
    pub stress_level: u8,

    /// AI-generated advice for the day
    pub advice: String,

    /// Data-URI illustration; absent when image generation failed or was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Transient result of the text-analysis call, merged into a DreamRecord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamAnalysis {
    pub analysis: String,
    pub stress_level: u8,
    pub advice: String,
}

impl DreamAnalysis {
    /// Clamp the stress score to the canonical [0, STRESS_MAX] domain.
    ///
    /// The external service is not contractually bound to the range, so
    /// every analysis crossing the client boundary goes through here.
    pub fn clamped(mut self) -> Self {
        self.stress_level = self.stress_level.min(STRESS_MAX);
        self
    }
}

impl DreamRecord {
    /// Build a new record from the user's text and the settled AI results.
    ///
    /// Called only by the journal after a successful analysis round.
    pub fn new(dream_content: String, analysis: DreamAnalysis, image_url: Option<String>) -> Self {
        let now = Local::now();
        let analysis = analysis.clamped();

        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: now.timestamp_millis(),
            date_str: format_date(&now),
            dream_content,
            analysis: analysis.analysis,
            stress_level: analysis.stress_level,
            advice: analysis.advice,
            image_url,
        }
    }

    /// Stress band used for display colors
    pub fn band(&self) -> StressBand {
        StressBand::of(self.stress_level)
    }

    /// Substring search over content, analysis and the date string.
    ///
    /// Content and analysis match case-insensitively; the date string is
    /// matched verbatim. An empty needle matches everything.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let lower = needle.to_lowercase();
        self.dream_content.to_lowercase().contains(&lower)
            || self.analysis.to_lowercase().contains(&lower)
            || self.date_str.contains(needle)
    }
}

/// Display bands for a stress score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressBand {
    /// 0-3: restful
    Low,
    /// 4-6: elevated
    Moderate,
    /// 7-10: distressed
    High,
}

impl StressBand {
    pub fn of(level: u8) -> Self {
        match level {
            0..=3 => StressBand::Low,
            4..=6 => StressBand::Moderate,
            _ => StressBand::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StressBand::Low => "low",
            StressBand::Moderate => "moderate",
            StressBand::High => "high",
        }
    }
}

/// Long-form date string, e.g. "Friday, January 3, 2026"
fn format_date(when: &DateTime<Local>) -> String {
    when.format("%A, %B %-d, %Y").to_string()
}

/// Clamp incoming stress scores to [0, STRESS_MAX] during deserialization.
///
/// The history slot is shared with journals written by other clients that
/// never clamped, so out-of-range integers are representable on disk and
/// must be folded into the canonical domain on every read.
fn clamp_stress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, STRESS_MAX as i64) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(level: u8) -> DreamAnalysis {
        DreamAnalysis {
            analysis: "Processing of unresolved tension.".to_string(),
            stress_level: level,
            advice: "Take a walk before noon.".to_string(),
        }
    }

    #[test]
    fn clamps_above_canonical_max() {
        assert_eq!(analysis(42).clamped().stress_level, 10);
        assert_eq!(analysis(11).clamped().stress_level, 10);
    }

    #[test]
    fn keeps_in_range_values() {
        assert_eq!(analysis(0).clamped().stress_level, 0);
        assert_eq!(analysis(7).clamped().stress_level, 7);
        assert_eq!(analysis(10).clamped().stress_level, 10);
    }

    #[test]
    fn new_record_clamps_and_fills_metadata() {
        let record = DreamRecord::new("falling".to_string(), analysis(99), None);
        assert_eq!(record.stress_level, 10);
        assert!(!record.id.is_empty());
        assert!(record.timestamp > 0);
        assert!(!record.date_str.is_empty());
        assert!(record.image_url.is_none());
    }

    #[test]
    fn distinct_ids() {
        let a = DreamRecord::new("a".to_string(), analysis(1), None);
        let b = DreamRecord::new("b".to_string(), analysis(1), None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn bands_follow_display_thresholds() {
        assert_eq!(StressBand::of(0), StressBand::Low);
        assert_eq!(StressBand::of(3), StressBand::Low);
        assert_eq!(StressBand::of(4), StressBand::Moderate);
        assert_eq!(StressBand::of(6), StressBand::Moderate);
        assert_eq!(StressBand::of(7), StressBand::High);
        assert_eq!(StressBand::of(10), StressBand::High);
    }

    #[test]
    fn search_matches_each_field() {
        let mut record = DreamRecord::new("Flying over a glass city".to_string(), analysis(5), None);
        record.date_str = "Friday, January 3, 2026".to_string();

        assert!(record.matches("glass"));
        assert!(record.matches("GLASS")); // content is case-insensitive
        assert!(record.matches("tension")); // analysis field
        assert!(record.matches("January")); // date string, verbatim
        assert!(record.matches("")); // empty needle matches everything
        assert!(!record.matches("submarine"));
    }

    #[test]
    fn out_of_range_slot_values_clamp_on_read() {
        // Slots written by clients that never clamped stay loadable
        let json = r#"{
            "id": "abc",
            "timestamp": 1700000000000,
            "dateStr": "Friday, January 3, 2026",
            "dreamContent": "endless stairs",
            "analysis": "looping worry",
            "stressLevel": 15,
            "advice": "rest"
        }"#;
        let record: DreamRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.stress_level, STRESS_MAX);

        let negative = json.replace("15", "-3");
        let record: DreamRecord = serde_json::from_str(&negative).unwrap();
        assert_eq!(record.stress_level, 0);
    }

    #[test]
    fn wire_format_uses_camel_case_and_omits_missing_image() {
        let record = DreamRecord::new("test".to_string(), analysis(5), None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("dreamContent").is_some());
        assert!(json.get("stressLevel").is_some());
        assert!(json.get("dateStr").is_some());
        assert!(json.get("imageUrl").is_none());

        let with_image =
            DreamRecord::new("test".to_string(), analysis(5), Some("data:image/png;base64,AA==".to_string()));
        let json = serde_json::to_value(&with_image).unwrap();
        assert!(json.get("imageUrl").is_some());
    }
}
