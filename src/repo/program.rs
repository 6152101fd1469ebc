use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{slugify, Program};
use anyhow::{Context, Result};

/// Program repository for database operations
pub struct ProgramRepo;

impl ProgramRepo {
    /// Create a new program
    ///
    /// The slug is derived from the name; a numeric suffix is appended when
    /// another program already uses it.
    pub fn create(conn: &Connection, name: &str, agency: Option<&str>) -> Result<Program> {
        let base = slugify(name);
        if base.is_empty() {
            anyhow::bail!("Program name '{}' must contain letters or digits", name);
        }
        let mut slug = base.clone();
        let mut suffix = 2;
        while Self::get_by_slug(conn, &slug)?.is_some() {
            slug = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO programs (name, slug, agency, created_ts) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![name, slug, agency, now],
        )
        .with_context(|| format!("Failed to create program: {}", name))?;

        Ok(Program {
            id: Some(conn.last_insert_rowid()),
            name: name.to_string(),
            slug,
            agency: agency.map(|a| a.to_string()),
            created_ts: now,
        })
    }

    /// Get program by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Program>> {
        conn.query_row(
            "SELECT id, name, slug, agency, created_ts FROM programs WHERE id = ?1",
            [id],
            row_to_program,
        )
        .optional()
        .context("Failed to query program")
    }

    /// Get program by slug
    pub fn get_by_slug(conn: &Connection, slug: &str) -> Result<Option<Program>> {
        conn.query_row(
            "SELECT id, name, slug, agency, created_ts FROM programs WHERE slug = ?1",
            [slug],
            row_to_program,
        )
        .optional()
        .context("Failed to query program")
    }

    /// List programs, newest first
    pub fn list(conn: &Connection) -> Result<Vec<Program>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, slug, agency, created_ts FROM programs ORDER BY created_ts DESC, id DESC"
        )?;
        let rows = stmt.query_map([], row_to_program)?;

        let mut programs = Vec::new();
        for row in rows {
            programs.push(row?);
        }
        Ok(programs)
    }
}

fn row_to_program(row: &Row) -> rusqlite::Result<Program> {
    Ok(Program {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        slug: row.get(2)?,
        agency: row.get(3)?,
        created_ts: row.get(4)?,
    })
}
