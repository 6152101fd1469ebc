// Acceptance Test Framework
// Provides infrastructure for writing Given/When/Then acceptance tests

#![allow(dead_code)]

use assert_cmd::Command;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tahap::db::DbConnection;
use tahap::models::{StageEntry, StageStatus};
use tahap::repo::{InstanceRepo, ProcurementTypeRepo, ProgramRepo, SqliteLedger};
use tahap::schedule::{create_schedule, ProgressLedger};
use tempfile::TempDir;

/// Test context for acceptance tests
/// Owns a temporary HOME with an rc file pointing at a fresh database
pub struct AcceptanceTestContext {
    temp_dir: TempDir,
    db_path: PathBuf,
    conn: rusqlite::Connection,
}

impl AcceptanceTestContext {
    /// Create a new test context with a fresh database
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config_dir = temp_dir.path().join(".tahap");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("rc"), format!("data.location={}\n", db_path.display())).unwrap();

        let conn = DbConnection::connect_at(&db_path).unwrap();

        Self {
            temp_dir,
            db_path,
            conn,
        }
    }

    /// Get a command instance configured for this test context
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tahap").unwrap();
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("TAHAP_LOG");
        cmd
    }

    /// Get direct database connection for assertions
    pub fn db(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builder for Given steps (test setup)
pub struct GivenBuilder<'a> {
    ctx: &'a AcceptanceTestContext,
}

impl<'a> GivenBuilder<'a> {
    pub fn new(ctx: &'a AcceptanceTestContext) -> Self {
        Self { ctx }
    }

    /// Given: a procurement of a catalog type, scheduled from `anchor`
    pub fn procurement_exists(&self, type_name: &str, title: &str, anchor: NaiveDate) -> i64 {
        let conn = self.ctx.db();
        let ty = ProcurementTypeRepo::get_by_name(conn, type_name).unwrap().unwrap();
        let templates = ProcurementTypeRepo::get_stages(conn, ty.id.unwrap()).unwrap();
        let instance = InstanceRepo::create(conn, ty.id.unwrap(), None, title, None, anchor).unwrap();
        let id = instance.id.unwrap();
        create_schedule(&mut SqliteLedger::new(conn), id, &templates, anchor).unwrap();
        id
    }

    /// Given: a program exists; returns its slug
    pub fn program_exists(&self, name: &str) -> String {
        ProgramRepo::create(self.ctx.db(), name, None).unwrap().slug
    }
}

/// Builder for When steps (running the binary)
pub struct WhenBuilder<'a> {
    ctx: &'a AcceptanceTestContext,
}

impl<'a> WhenBuilder<'a> {
    pub fn new(ctx: &'a AcceptanceTestContext) -> Self {
        Self { ctx }
    }

    /// When: the command runs and succeeds; returns its stdout
    pub fn execute_success(&mut self, args: &[&str]) -> String {
        let output = self.ctx.cmd().args(args).assert().success().get_output().stdout.clone();
        String::from_utf8(output).unwrap()
    }

    /// When: the command runs and fails with `code`; returns its stderr
    pub fn execute_failure(&mut self, args: &[&str], code: i32) -> String {
        let output = self.ctx.cmd().args(args).assert().failure().code(code).get_output().stderr.clone();
        String::from_utf8(output).unwrap()
    }
}

/// Builder for Then steps (assertions against the database)
pub struct ThenBuilder<'a> {
    ctx: &'a AcceptanceTestContext,
}

impl<'a> ThenBuilder<'a> {
    pub fn new(ctx: &'a AcceptanceTestContext) -> Self {
        Self { ctx }
    }

    pub fn stages(&self, instance_id: i64) -> Vec<StageEntry> {
        SqliteLedger::new(self.ctx.db()).load_stages(instance_id).unwrap()
    }

    fn stage(&self, instance_id: i64, sequence: u32) -> StageEntry {
        self.stages(instance_id)
            .into_iter()
            .find(|e| e.sequence() == sequence)
            .unwrap_or_else(|| panic!("procurement {} has no stage {}", instance_id, sequence))
    }

    /// Then: the stage has exactly these planned dates
    pub fn stage_planned_is(&self, instance_id: i64, sequence: u32, start: Option<NaiveDate>, end: Option<NaiveDate>) -> &Self {
        let progress = self.stage(instance_id, sequence).progress;
        assert_eq!(
            (progress.planned_start, progress.planned_end),
            (start, end),
            "planned window of stage {}",
            sequence
        );
        self
    }

    /// Then: the stage has this status
    pub fn stage_status_is(&self, instance_id: i64, sequence: u32, status: StageStatus) -> &Self {
        assert_eq!(self.stage(instance_id, sequence).progress.status, status, "status of stage {}", sequence);
        self
    }

    /// Then: the stage has this actual end date
    pub fn stage_actual_end_is(&self, instance_id: i64, sequence: u32, end: Option<NaiveDate>) -> &Self {
        assert_eq!(self.stage(instance_id, sequence).progress.actual_end, end, "actual end of stage {}", sequence);
        self
    }

    /// Then: this many procurements exist
    pub fn procurement_count_is(&self, count: usize) -> &Self {
        assert_eq!(InstanceRepo::list(self.ctx.db(), None).unwrap().len(), count);
        self
    }
}
