use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::models::StageTemplate;

/// Stage progress status
///
/// A stage is `Completed` only once an actual end date has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Completed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" | "in_progress" => Some(StageStatus::Pending),
            "completed" => Some(StageStatus::Completed),
            _ => None,
        }
    }
}

/// Progress record for one stage of one procurement instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    pub id: Option<i64>,
    pub template_id: Option<i64>,
    pub sequence: u32,
    pub status: StageStatus,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    pub note: Option<String>,
}

impl StageProgress {
    /// Fresh pending record for a template, with the given planned window
    pub fn planned(template: &StageTemplate, planned_start: Option<NaiveDate>, planned_end: Option<NaiveDate>) -> Self {
        Self {
            id: None,
            template_id: template.id,
            sequence: template.sequence,
            status: StageStatus::Pending,
            planned_start,
            planned_end,
            actual_start: None,
            actual_end: None,
            note: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }
}

/// A stage template joined with its progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub template: StageTemplate,
    pub progress: StageProgress,
}

impl StageEntry {
    pub fn sequence(&self) -> u32 {
        self.template.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_conversion() {
        assert_eq!(StageStatus::Pending.as_str(), "pending");
        assert_eq!(StageStatus::from_str("pending"), Some(StageStatus::Pending));
        assert_eq!(StageStatus::from_str("in_progress"), Some(StageStatus::Pending));
        assert_eq!(StageStatus::Completed.as_str(), "completed");
        assert_eq!(StageStatus::from_str("completed"), Some(StageStatus::Completed));
        assert_eq!(StageStatus::from_str("selesai"), None);
    }

    #[test]
    fn test_planned_record_starts_pending() {
        let mut template = StageTemplate::new(3, "Reviu Barjas", Some(7), 3.0);
        template.id = Some(42);
        let start = NaiveDate::from_ymd_opt(2024, 1, 2);
        let end = NaiveDate::from_ymd_opt(2024, 1, 9);
        let progress = StageProgress::planned(&template, start, end);

        assert_eq!(progress.template_id, Some(42));
        assert_eq!(progress.sequence, 3);
        assert_eq!(progress.status, StageStatus::Pending);
        assert!(!progress.is_completed());
        assert!(progress.actual_start.is_none());
        assert!(progress.actual_end.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&StageStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
