use rusqlite::{Connection, OptionalExtension, Result};
use std::collections::HashMap;
use crate::catalog::{CatalogType, BUILTIN_TYPES, MINI_KOMPETISI};

/// Current database schema version
const CURRENT_VERSION: u32 = 3;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn)?;

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied ledger migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> {
    let mut migrations: HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations.insert(3, migration_v3);
    migrations
}

/// Migration v1: Initial schema
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE procurement_types (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    // duration_days NULL marks a variable-duration stage
    tx.execute(
        "CREATE TABLE stage_templates (
            id INTEGER PRIMARY KEY,
            type_id INTEGER NOT NULL REFERENCES procurement_types(id) ON DELETE CASCADE,
            sequence INTEGER NOT NULL CHECK(sequence > 0),
            name TEXT NOT NULL,
            duration_days INTEGER NULL CHECK(duration_days IS NULL OR duration_days > 0),
            weight REAL NOT NULL CHECK(weight > 0),
            UNIQUE(type_id, sequence)
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE programs (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            agency TEXT NULL,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    // Dates are stored as TEXT 'YYYY-MM-DD'
    tx.execute(
        "CREATE TABLE procurement_instances (
            id INTEGER PRIMARY KEY,
            uuid TEXT NOT NULL UNIQUE,
            type_id INTEGER NOT NULL REFERENCES procurement_types(id),
            program_id INTEGER NULL REFERENCES programs(id),
            title TEXT NOT NULL,
            budget INTEGER NULL,
            anchor_date TEXT NOT NULL,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE stage_progress (
            id INTEGER PRIMARY KEY,
            instance_id INTEGER NOT NULL REFERENCES procurement_instances(id) ON DELETE CASCADE,
            template_id INTEGER NOT NULL REFERENCES stage_templates(id),
            status TEXT NOT NULL CHECK(status IN ('pending','completed')),
            planned_start TEXT NULL,
            planned_end TEXT NULL,
            actual_start TEXT NULL,
            actual_end TEXT NULL,
            note TEXT NULL,
            modified_ts INTEGER NOT NULL,
            UNIQUE(instance_id, template_id)
        )",
        [],
    )?;

    tx.execute("CREATE INDEX idx_stage_templates_type_id ON stage_templates(type_id)", [])?;
    tx.execute("CREATE INDEX idx_instances_program_id ON procurement_instances(program_id)", [])?;
    tx.execute("CREATE INDEX idx_stage_progress_instance_id ON stage_progress(instance_id)", [])?;

    Ok(())
}

/// Migration v2: Seed the built-in procurement catalog
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    for ty in BUILTIN_TYPES {
        insert_catalog_type(tx, ty)?;
    }
    Ok(())
}

/// Migration v3: Add the Mini Kompetisi procurement type
///
/// Skipped when a type of that name was already imported by hand.
fn migration_v3(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM procurement_types WHERE name = ?1",
            [MINI_KOMPETISI.name],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_none() {
        insert_catalog_type(tx, &MINI_KOMPETISI)?;
    }
    Ok(())
}

fn insert_catalog_type(tx: &rusqlite::Transaction, ty: &CatalogType) -> Result<(), rusqlite::Error> {
    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO procurement_types (name, created_ts) VALUES (?1, ?2)",
        rusqlite::params![ty.name, now],
    )?;
    let type_id = tx.last_insert_rowid();
    for template in ty.templates() {
        tx.execute(
            "INSERT INTO stage_templates (type_id, sequence, name, duration_days, weight)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![type_id, template.sequence, template.name, template.duration_days, template.weight],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_migration_applies_cleanly() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationManager::initialize(&conn).unwrap();

        let version = MigrationManager::get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        MigrationManager::initialize(&conn).unwrap();
        MigrationManager::initialize(&conn).unwrap();

        let version = MigrationManager::get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
        assert_eq!(
            count(&conn, "SELECT COUNT(*) FROM procurement_types"),
            BUILTIN_TYPES.len() as i64 + 1
        );
    }

    #[test]
    fn test_catalog_seeded_with_variable_stages() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationManager::initialize(&conn).unwrap();

        let variable = count(&conn, "SELECT COUNT(*) FROM stage_templates WHERE duration_days IS NULL");
        assert_eq!(variable, BUILTIN_TYPES.len() as i64 + 1);

        let tender_stages = count(
            &conn,
            "SELECT COUNT(*) FROM stage_templates s JOIN procurement_types t ON t.id = s.type_id
             WHERE t.name = 'Tender'",
        );
        assert_eq!(tender_stages, 11);
    }

    #[test]
    fn test_migration_v3_skips_existing_mini_kompetisi() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        ).unwrap();

        for version in 1..=2 {
            let migrations = get_migrations();
            let migration = migrations.get(&version).unwrap();
            let tx = conn.unchecked_transaction().unwrap();
            migration(&tx).unwrap();
            tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version]).unwrap();
            tx.commit().unwrap();
        }

        // Imported by hand before v3 shipped
        conn.execute(
            "INSERT INTO procurement_types (name, created_ts) VALUES ('Mini Kompetisi', 1000)",
            [],
        ).unwrap();

        MigrationManager::initialize(&conn).unwrap();

        assert_eq!(
            count(&conn, "SELECT COUNT(*) FROM procurement_types WHERE name = 'Mini Kompetisi'"),
            1
        );
        assert_eq!(MigrationManager::get_version(&conn).unwrap(), 3);
    }

    #[test]
    fn test_template_constraints() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        MigrationManager::initialize(&conn).unwrap();

        // Zero duration is rejected
        let result = conn.execute(
            "INSERT INTO stage_templates (type_id, sequence, name, duration_days, weight)
             VALUES (1, 99, 'Bad', 0, 1.0)",
            [],
        );
        assert!(result.is_err());

        // Unknown type is rejected
        let result = conn.execute(
            "INSERT INTO stage_templates (type_id, sequence, name, duration_days, weight)
             VALUES (999, 1, 'Orphan', 3, 1.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_single_progress_row_per_stage() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        MigrationManager::initialize(&conn).unwrap();

        conn.execute(
            "INSERT INTO procurement_instances (uuid, type_id, title, anchor_date, created_ts)
             VALUES ('uuid1', 1, 'Website', '2024-01-01', 1000)",
            [],
        ).unwrap();
        let instance_id = conn.last_insert_rowid();

        let insert = "INSERT INTO stage_progress (instance_id, template_id, status, modified_ts)
                      VALUES (?1, 1, 'pending', 1000)";
        conn.execute(insert, [instance_id]).unwrap();
        assert!(conn.execute(insert, [instance_id]).is_err());
    }
}
