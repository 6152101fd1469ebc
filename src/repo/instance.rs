use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::ProcurementInstance;
use anyhow::{Context, Result};

/// Procurement instance repository
///
/// Only the instance row itself; stage progress rows are written through the
/// ledger (see `SqliteLedger`).
pub struct InstanceRepo;

impl InstanceRepo {
    /// Insert a new procurement instance
    pub fn create(
        conn: &Connection,
        type_id: i64,
        program_id: Option<i64>,
        title: &str,
        budget: Option<i64>,
        anchor_date: NaiveDate,
    ) -> Result<ProcurementInstance> {
        let mut instance = ProcurementInstance::new(type_id, title.to_string(), anchor_date);
        instance.program_id = program_id;
        instance.budget = budget;

        conn.execute(
            "INSERT INTO procurement_instances (uuid, type_id, program_id, title, budget, anchor_date, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                instance.uuid,
                instance.type_id,
                instance.program_id,
                instance.title,
                instance.budget,
                instance.anchor_date,
                instance.created_ts,
            ],
        )
        .with_context(|| format!("Failed to create procurement: {}", title))?;

        Ok(ProcurementInstance {
            id: Some(conn.last_insert_rowid()),
            ..instance
        })
    }

    /// Get instance by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<ProcurementInstance>> {
        conn.query_row(
            "SELECT id, uuid, type_id, program_id, title, budget, anchor_date, created_ts
             FROM procurement_instances WHERE id = ?1",
            [id],
            row_to_instance,
        )
        .optional()
        .context("Failed to query procurement")
    }

    /// List instances, optionally limited to one program, oldest first
    pub fn list(conn: &Connection, program_id: Option<i64>) -> Result<Vec<ProcurementInstance>> {
        let mut stmt = conn.prepare(
            "SELECT id, uuid, type_id, program_id, title, budget, anchor_date, created_ts
             FROM procurement_instances
             WHERE ?1 IS NULL OR program_id = ?1
             ORDER BY id"
        )?;
        let rows = stmt.query_map([program_id], row_to_instance)?;

        let mut instances = Vec::new();
        for row in rows {
            instances.push(row?);
        }
        Ok(instances)
    }
}

fn row_to_instance(row: &Row) -> rusqlite::Result<ProcurementInstance> {
    Ok(ProcurementInstance {
        id: Some(row.get(0)?),
        uuid: row.get(1)?,
        type_id: row.get(2)?,
        program_id: row.get(3)?,
        title: row.get(4)?,
        budget: row.get(5)?,
        anchor_date: row.get(6)?,
        created_ts: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::repo::ProgramRepo;

    #[test]
    fn test_create_and_get() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let created = InstanceRepo::create(&conn, 1, None, "Website Dinas", Some(150_000_000), anchor).unwrap();

        let loaded = InstanceRepo::get_by_id(&conn, created.id.unwrap()).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.anchor_date, anchor);
        assert_eq!(loaded.budget, Some(150_000_000));
    }

    #[test]
    fn test_list_filters_by_program() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let program = ProgramRepo::create(&conn, "Smart City", None).unwrap();

        InstanceRepo::create(&conn, 1, program.id, "A", None, anchor).unwrap();
        InstanceRepo::create(&conn, 2, None, "B", None, anchor).unwrap();

        assert_eq!(InstanceRepo::list(&conn, None).unwrap().len(), 2);
        let filtered = InstanceRepo::list(&conn, program.id).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "A");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(InstanceRepo::create(&conn, 999, None, "X", None, anchor).is_err());
    }
}
