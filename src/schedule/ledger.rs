use std::collections::BTreeMap;
use anyhow::anyhow;
use crate::models::{StageEntry, StageProgress, StageTemplate};
use crate::schedule::ScheduleError;

/// Storage seam for stage progress records
///
/// The scheduling service only talks to the ledger through this trait, so the
/// same operations run against SQLite in production and against
/// [`MemoryLedger`] in tests.
pub trait ProgressLedger {
    /// All stages of an instance joined with their templates, ordered by
    /// sequence. Unknown instances yield an empty list.
    fn load_stages(&self, instance_id: i64) -> Result<Vec<StageEntry>, ScheduleError>;

    /// Insert freshly built progress rows for an instance; returns them with
    /// their assigned ids
    fn insert_progress(&mut self, instance_id: i64, rows: &[StageProgress]) -> Result<Vec<StageProgress>, ScheduleError>;

    /// Overwrite a stored progress row, matched by its id
    fn write_progress(&mut self, row: &StageProgress) -> Result<(), ScheduleError>;

    /// Run `f` as one atomic unit: either every write it made is kept, or
    /// none is
    fn atomically<T, F>(&mut self, f: F) -> Result<T, ScheduleError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, ScheduleError>;
}

/// In-memory ledger
///
/// Templates must be registered per instance before progress rows are
/// inserted. Atomic units snapshot the whole ledger and restore it on error.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    templates: BTreeMap<i64, Vec<StageTemplate>>,
    progress: BTreeMap<i64, Vec<StageProgress>>,
    next_id: i64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stage templates an instance is built from
    pub fn register_instance(&mut self, instance_id: i64, templates: Vec<StageTemplate>) {
        self.templates.insert(instance_id, templates);
    }

    /// Raw progress rows of an instance in insertion order
    pub fn progress_rows(&self, instance_id: i64) -> &[StageProgress] {
        self.progress.get(&instance_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ProgressLedger for MemoryLedger {
    fn load_stages(&self, instance_id: i64) -> Result<Vec<StageEntry>, ScheduleError> {
        let templates = match self.templates.get(&instance_id) {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };
        let mut entries = Vec::new();
        for progress in self.progress_rows(instance_id) {
            let template = templates
                .iter()
                .find(|t| t.sequence == progress.sequence)
                .ok_or_else(|| anyhow!("No template with sequence {} for instance {}", progress.sequence, instance_id))?;
            entries.push(StageEntry {
                template: template.clone(),
                progress: progress.clone(),
            });
        }
        entries.sort_by_key(|e| e.sequence());
        Ok(entries)
    }

    fn insert_progress(&mut self, instance_id: i64, rows: &[StageProgress]) -> Result<Vec<StageProgress>, ScheduleError> {
        if !self.templates.contains_key(&instance_id) {
            return Err(anyhow!("Instance {} has no registered templates", instance_id).into());
        }
        let stored = self.progress.entry(instance_id).or_default();
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            if stored.iter().any(|p| p.sequence == row.sequence) {
                return Err(anyhow!("Stage {} already exists for instance {}", row.sequence, instance_id).into());
            }
            self.next_id += 1;
            let row = StageProgress {
                id: Some(self.next_id),
                ..row.clone()
            };
            stored.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    fn write_progress(&mut self, row: &StageProgress) -> Result<(), ScheduleError> {
        let id = row.id.ok_or_else(|| anyhow!("Cannot write a progress row without an id"))?;
        let slot = self
            .progress
            .values_mut()
            .flat_map(|rows| rows.iter_mut())
            .find(|p| p.id == Some(id))
            .ok_or_else(|| anyhow!("No progress row with id={}", id))?;
        *slot = row.clone();
        Ok(())
    }

    fn atomically<T, F>(&mut self, f: F) -> Result<T, ScheduleError>
    where
        F: FnOnce(&mut Self) -> Result<T, ScheduleError>,
    {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}
