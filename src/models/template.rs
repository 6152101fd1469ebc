use serde::{Deserialize, Serialize};

/// Procurement type (master "pengadaan"), e.g. "Tender" or "Swakelola Tipe 1"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementType {
    pub id: Option<i64>,
    pub name: String,
    pub created_ts: i64,
}

impl ProcurementType {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            created_ts: chrono::Utc::now().timestamp(),
        }
    }
}

/// Stage template (master "tahapan")
///
/// Immutable once authored. `duration_days == None` marks a variable-duration
/// stage whose end can only be known from a recorded actual completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTemplate {
    #[serde(default)]
    pub id: Option<i64>,
    pub sequence: u32,
    pub name: String,
    pub duration_days: Option<u32>,
    pub weight: f64,
}

impl StageTemplate {
    pub fn new(sequence: u32, name: impl Into<String>, duration_days: Option<u32>, weight: f64) -> Self {
        Self {
            id: None,
            sequence,
            name: name.into(),
            duration_days,
            weight,
        }
    }

    /// True when the stage has no standard duration
    pub fn is_duration_editable(&self) -> bool {
        self.duration_days.is_none()
    }
}
