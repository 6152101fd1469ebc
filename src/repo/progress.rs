use rusqlite::{Connection, Row};
use crate::models::{StageEntry, StageProgress, StageStatus};
use crate::repo::procurement_type::row_to_template;
use anyhow::{Context, Result};

/// Stage progress repository for database operations
pub struct ProgressRepo;

impl ProgressRepo {
    /// Insert progress rows for an instance
    ///
    /// Each row must carry the id of the template it was built from.
    pub fn insert_all(conn: &Connection, instance_id: i64, rows: &[StageProgress]) -> Result<Vec<StageProgress>> {
        let now = chrono::Utc::now().timestamp();
        let mut stmt = conn.prepare(
            "INSERT INTO stage_progress (instance_id, template_id, status, planned_start, planned_end,
                    actual_start, actual_end, note, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        )?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let template_id = row.template_id
                .with_context(|| format!("Stage {} has no template id", row.sequence))?;
            stmt.execute(rusqlite::params![
                instance_id,
                template_id,
                row.status.as_str(),
                row.planned_start,
                row.planned_end,
                row.actual_start,
                row.actual_end,
                row.note,
                now,
            ])
            .with_context(|| format!("Failed to insert stage {} for procurement {}", row.sequence, instance_id))?;
            inserted.push(StageProgress {
                id: Some(conn.last_insert_rowid()),
                ..row.clone()
            });
        }
        Ok(inserted)
    }

    /// Overwrite the mutable fields of a progress row
    pub fn update(conn: &Connection, row: &StageProgress) -> Result<()> {
        let id = row.id.context("Cannot update a progress row without an id")?;
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE stage_progress
             SET status = ?1, planned_start = ?2, planned_end = ?3, actual_start = ?4,
                 actual_end = ?5, note = ?6, modified_ts = ?7
             WHERE id = ?8",
            rusqlite::params![
                row.status.as_str(),
                row.planned_start,
                row.planned_end,
                row.actual_start,
                row.actual_end,
                row.note,
                now,
                id,
            ],
        )
        .with_context(|| format!("Failed to update progress row id={}", id))?;

        if updated == 0 {
            anyhow::bail!("No progress row found with id={}", id);
        }
        Ok(())
    }

    /// All stages of an instance joined with their templates, in sequence order
    pub fn get_entries(conn: &Connection, instance_id: i64) -> Result<Vec<StageEntry>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.sequence, t.name, t.duration_days, t.weight,
                    p.id, p.status, p.planned_start, p.planned_end, p.actual_start, p.actual_end, p.note
             FROM stage_progress p
             JOIN stage_templates t ON t.id = p.template_id
             WHERE p.instance_id = ?1
             ORDER BY t.sequence"
        )?;
        let rows = stmt.query_map([instance_id], row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

fn row_to_entry(row: &Row) -> rusqlite::Result<StageEntry> {
    let template = row_to_template(row)?;
    let status: String = row.get(6)?;
    let status = StageStatus::from_str(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown stage status '{}'", status).into(),
        )
    })?;
    let progress = StageProgress {
        id: Some(row.get(5)?),
        template_id: template.id,
        sequence: template.sequence,
        status,
        planned_start: row.get(7)?,
        planned_end: row.get(8)?,
        actual_start: row.get(9)?,
        actual_end: row.get(10)?,
        note: row.get(11)?,
    };
    Ok(StageEntry { template, progress })
}
