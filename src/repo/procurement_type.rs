use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{ProcurementType, StageTemplate};
use crate::schedule::validate_templates;
use anyhow::{Context, Result};

/// Procurement type repository (the stage template store)
pub struct ProcurementTypeRepo;

impl ProcurementTypeRepo {
    /// Create a procurement type together with its stage templates
    ///
    /// Templates are validated first; the type and every template are written
    /// in one transaction.
    pub fn create_with_stages(conn: &Connection, name: &str, templates: &[StageTemplate]) -> Result<(ProcurementType, Vec<StageTemplate>)> {
        validate_templates(templates)?;
        if Self::get_by_name(conn, name)?.is_some() {
            anyhow::bail!("Procurement type '{}' already exists", name);
        }

        let mut ty = ProcurementType::new(name.to_string());
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO procurement_types (name, created_ts) VALUES (?1, ?2)",
            rusqlite::params![ty.name, ty.created_ts],
        )
        .with_context(|| format!("Failed to create procurement type: {}", name))?;
        let type_id = tx.last_insert_rowid();
        ty.id = Some(type_id);

        let mut stored = Vec::with_capacity(templates.len());
        for template in templates {
            tx.execute(
                "INSERT INTO stage_templates (type_id, sequence, name, duration_days, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![type_id, template.sequence, template.name, template.duration_days, template.weight],
            )
            .with_context(|| format!("Failed to create stage {} of '{}'", template.sequence, name))?;
            stored.push(StageTemplate {
                id: Some(tx.last_insert_rowid()),
                ..template.clone()
            });
        }
        tx.commit()?;
        log::info!("Created procurement type '{}' with {} stages", name, stored.len());

        Ok((ty, stored))
    }

    /// Get procurement type by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<ProcurementType>> {
        conn.query_row(
            "SELECT id, name, created_ts FROM procurement_types WHERE id = ?1",
            [id],
            row_to_type,
        )
        .optional()
        .context("Failed to query procurement type")
    }

    /// Get procurement type by exact name
    pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<ProcurementType>> {
        conn.query_row(
            "SELECT id, name, created_ts FROM procurement_types WHERE name = ?1",
            [name],
            row_to_type,
        )
        .optional()
        .context("Failed to query procurement type")
    }

    /// Resolve a user-supplied type reference: numeric id or exact name
    pub fn resolve(conn: &Connection, reference: &str) -> Result<Option<ProcurementType>> {
        if let Ok(id) = reference.parse::<i64>() {
            if let Some(ty) = Self::get_by_id(conn, id)? {
                return Ok(Some(ty));
            }
        }
        Self::get_by_name(conn, reference)
    }

    /// List all procurement types ordered by id
    pub fn list(conn: &Connection) -> Result<Vec<ProcurementType>> {
        let mut stmt = conn.prepare("SELECT id, name, created_ts FROM procurement_types ORDER BY id")?;
        let rows = stmt.query_map([], row_to_type)?;

        let mut types = Vec::new();
        for row in rows {
            types.push(row?);
        }
        Ok(types)
    }

    /// Stage templates of a type in sequence order
    pub fn get_stages(conn: &Connection, type_id: i64) -> Result<Vec<StageTemplate>> {
        let mut stmt = conn.prepare(
            "SELECT id, sequence, name, duration_days, weight
             FROM stage_templates WHERE type_id = ?1 ORDER BY sequence"
        )?;
        let rows = stmt.query_map([type_id], row_to_template)?;

        let mut templates = Vec::new();
        for row in rows {
            templates.push(row?);
        }
        Ok(templates)
    }
}

fn row_to_type(row: &Row) -> rusqlite::Result<ProcurementType> {
    Ok(ProcurementType {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        created_ts: row.get(2)?,
    })
}

/// Map `id, sequence, name, duration_days, weight` columns
pub(crate) fn row_to_template(row: &Row) -> rusqlite::Result<StageTemplate> {
    Ok(StageTemplate {
        id: Some(row.get(0)?),
        sequence: row.get(1)?,
        name: row.get(2)?,
        duration_days: row.get(3)?,
        weight: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[test]
    fn test_builtin_types_listed() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let types = ProcurementTypeRepo::list(&conn).unwrap();
        assert_eq!(types[0].name, "Pengadaan Langsung");
        assert_eq!(types.last().unwrap().name, "Mini Kompetisi");
    }

    #[test]
    fn test_get_stages_in_sequence_order() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let ty = ProcurementTypeRepo::get_by_name(&conn, "Swakelola Tipe 1").unwrap().unwrap();
        let stages = ProcurementTypeRepo::get_stages(&conn, ty.id.unwrap()).unwrap();

        assert_eq!(stages.len(), 6);
        assert_eq!(stages.iter().map(|s| s.sequence).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(stages[4].name, "Pelaksanaan");
        assert!(stages[4].is_duration_editable());
        assert_eq!(stages[2].duration_days, Some(14));
    }

    #[test]
    fn test_resolve_by_id_or_name() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let by_id = ProcurementTypeRepo::resolve(&conn, "5").unwrap().unwrap();
        let by_name = ProcurementTypeRepo::resolve(&conn, "Tender").unwrap().unwrap();
        assert_eq!(by_id, by_name);
        assert!(ProcurementTypeRepo::resolve(&conn, "Lelang").unwrap().is_none());
    }

    #[test]
    fn test_create_with_stages() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let templates = vec![
            StageTemplate::new(1, "Survei", Some(3), 40.0),
            StageTemplate::new(2, "Pelaksanaan", None, 60.0),
        ];
        let (ty, stored) = ProcurementTypeRepo::create_with_stages(&conn, "Hibah", &templates).unwrap();
        assert!(ty.id.is_some());
        assert!(stored.iter().all(|t| t.id.is_some()));

        let loaded = ProcurementTypeRepo::get_stages(&conn, ty.id.unwrap()).unwrap();
        assert_eq!(loaded, stored);
    }

    #[test]
    fn test_create_rejects_invalid_templates() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let templates = vec![
            StageTemplate::new(1, "Survei", Some(3), 40.0),
            StageTemplate::new(3, "Pelaksanaan", None, 60.0),
        ];
        assert!(ProcurementTypeRepo::create_with_stages(&conn, "Hibah", &templates).is_err());
        assert!(ProcurementTypeRepo::get_by_name(&conn, "Hibah").unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let templates = vec![StageTemplate::new(1, "Survei", Some(3), 100.0)];
        assert!(ProcurementTypeRepo::create_with_stages(&conn, "Tender", &templates).is_err());
    }
}
