use rusqlite::Connection;
use crate::models::{StageEntry, StageProgress};
use crate::repo::ProgressRepo;
use crate::schedule::{ProgressLedger, ScheduleError};

/// SQLite-backed progress ledger
///
/// `atomically` opens an immediate transaction when the connection is in
/// autocommit mode, so the write lock is taken before anything is read. When
/// the caller already holds an open transaction (for example while inserting
/// the instance row the schedule belongs to) the unit runs under a savepoint:
/// a failed unit is undone on its own and the caller's commit or rollback
/// decides the rest.
pub struct SqliteLedger<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteLedger<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl<'c> ProgressLedger for SqliteLedger<'c> {
    fn load_stages(&self, instance_id: i64) -> Result<Vec<StageEntry>, ScheduleError> {
        Ok(ProgressRepo::get_entries(self.conn, instance_id)?)
    }

    fn insert_progress(&mut self, instance_id: i64, rows: &[StageProgress]) -> Result<Vec<StageProgress>, ScheduleError> {
        Ok(ProgressRepo::insert_all(self.conn, instance_id, rows)?)
    }

    fn write_progress(&mut self, row: &StageProgress) -> Result<(), ScheduleError> {
        Ok(ProgressRepo::update(self.conn, row)?)
    }

    fn atomically<T, F>(&mut self, f: F) -> Result<T, ScheduleError>
    where
        F: FnOnce(&mut Self) -> Result<T, ScheduleError>,
    {
        let conn = self.conn;
        let (begin, commit, rollback) = if conn.is_autocommit() {
            ("BEGIN IMMEDIATE", "COMMIT", "ROLLBACK")
        } else {
            (
                "SAVEPOINT ledger_unit",
                "RELEASE ledger_unit",
                "ROLLBACK TO ledger_unit; RELEASE ledger_unit",
            )
        };

        conn.execute_batch(begin)?;
        match f(self) {
            Ok(value) => {
                if let Err(e) = conn.execute_batch(commit) {
                    log::debug!("Ledger commit failed, rolling back: {}", e);
                    let _ = conn.execute_batch(rollback);
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(e) => {
                log::debug!("Rolling back ledger unit: {}", e);
                conn.execute_batch(rollback)?;
                Err(e)
            }
        }
    }
}
