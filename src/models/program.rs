use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Program model
///
/// An agency-owned grouping of procurement instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub agency: Option<String>,
    pub created_ts: i64,
}

/// Procurement instance model
///
/// One concrete run of a procurement type. Its stage progress rows are
/// created together with it and keyed by template sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementInstance {
    pub id: Option<i64>,
    pub uuid: String,
    pub type_id: i64,
    pub program_id: Option<i64>,
    pub title: String,
    pub budget: Option<i64>,
    pub anchor_date: NaiveDate,
    pub created_ts: i64,
}

impl ProcurementInstance {
    pub fn new(type_id: i64, title: String, anchor_date: NaiveDate) -> Self {
        Self {
            id: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            type_id,
            program_id: None,
            title,
            budget: None,
            anchor_date,
            created_ts: chrono::Utc::now().timestamp(),
        }
    }
}

/// Build a URL-friendly slug from a program name
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single '-', and trims leading/trailing dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Smart City 2024"), "smart-city-2024");
        assert_eq!(slugify("  Jalan & Jembatan!! "), "jalan-jembatan");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_instance_creation() {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let instance = ProcurementInstance::new(1, "Website".to_string(), anchor);
        assert!(instance.id.is_none());
        assert!(!instance.uuid.is_empty());
        assert_eq!(instance.anchor_date, anchor);
        assert!(instance.program_id.is_none());
    }
}
