// Scheduling operations over a progress ledger
//
// Every mutating operation runs inside `ProgressLedger::atomically`: inputs are
// fully validated before the first write, and a failure part-way through a
// cascade rolls back every row it touched.

use chrono::NaiveDate;
use serde::Serialize;
use crate::models::{StageEntry, StageProgress, StageStatus, StageTemplate};
use crate::schedule::{build_schedule, cascade_after, ProgressLedger, ScheduleError};

/// Caller-supplied changes to a stage's actual progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageUpdate {
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    pub note: Option<String>,
}

impl StageUpdate {
    pub fn is_empty(&self) -> bool {
        self.actual_start.is_none() && self.actual_end.is_none() && self.note.is_none()
    }
}

/// Ordered stage list of one instance with its weighted completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReport {
    pub instance_id: i64,
    pub percent_complete: f64,
    pub stages: Vec<StageEntry>,
}

/// Build the initial schedule for `instance_id` and store it
///
/// The templates are validated before anything is written, and all rows are
/// inserted in one atomic unit.
pub fn create_schedule<L: ProgressLedger>(
    ledger: &mut L,
    instance_id: i64,
    templates: &[StageTemplate],
    anchor: NaiveDate,
) -> Result<Vec<StageProgress>, ScheduleError> {
    let rows = build_schedule(templates, anchor)?;
    log::debug!(
        "Built schedule for procurement {}: {} stages anchored on {}",
        instance_id, rows.len(), anchor
    );
    ledger.atomically(|l| l.insert_progress(instance_id, &rows))
}

/// Record the actual completion of a stage
///
/// Completing a variable-duration stage re-chains the planned dates of every
/// later stage from the day after `actual_end`, up to the next
/// variable-duration stage. Completing a fixed-duration stage touches only
/// that stage.
pub fn record_actual_completion<L: ProgressLedger>(
    ledger: &mut L,
    instance_id: i64,
    sequence: u32,
    actual_end: NaiveDate,
) -> Result<Vec<StageEntry>, ScheduleError> {
    let update = StageUpdate {
        actual_end: Some(actual_end),
        ..StageUpdate::default()
    };
    update_stage(ledger, instance_id, sequence, update)
}

/// Apply a stage update; cascades when it carries an actual end date
///
/// Returns the full ordered stage list of the instance after the update.
pub fn update_stage<L: ProgressLedger>(
    ledger: &mut L,
    instance_id: i64,
    sequence: u32,
    update: StageUpdate,
) -> Result<Vec<StageEntry>, ScheduleError> {
    ledger.atomically(|l| {
        let stages = l.load_stages(instance_id)?;
        let index = locate(&stages, instance_id, sequence)?;
        if update.is_empty() {
            return Ok(stages);
        }

        let entry = &stages[index];
        let mut progress = entry.progress.clone();
        if let Some(start) = update.actual_start {
            progress.actual_start = Some(start);
        }
        if let Some(note) = update.note {
            progress.note = Some(note);
        }
        if let Some(end) = update.actual_end {
            progress.actual_end = Some(end);
            progress.status = StageStatus::Completed;
        }
        l.write_progress(&progress)?;

        match update.actual_end {
            Some(end) if entry.template.is_duration_editable() => {
                let downstream = &stages[index + 1..];
                let rescheduled = cascade_after(downstream, end)?;
                for row in &rescheduled {
                    l.write_progress(row)?;
                }
                log::info!(
                    "Procurement {}: stage {} completed on {}, rescheduled {} later stages",
                    instance_id, sequence, end, rescheduled.len()
                );
            }
            Some(end) => {
                log::debug!(
                    "Procurement {}: fixed-duration stage {} completed on {}, no cascade",
                    instance_id, sequence, end
                );
            }
            None => {}
        }

        l.load_stages(instance_id)
    })
}

/// Overwrite the planned dates of one stage without touching its neighbours
///
/// Dates left as `None` keep their current value; with both `None` nothing is
/// written.
pub fn set_planned_dates<L: ProgressLedger>(
    ledger: &mut L,
    instance_id: i64,
    sequence: u32,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<StageProgress, ScheduleError> {
    ledger.atomically(|l| {
        let stages = l.load_stages(instance_id)?;
        let index = locate(&stages, instance_id, sequence)?;
        let mut progress = stages[index].progress.clone();
        if start.is_none() && end.is_none() {
            return Ok(progress);
        }
        if start.is_some() {
            progress.planned_start = start;
        }
        if end.is_some() {
            progress.planned_end = end;
        }
        l.write_progress(&progress)?;
        Ok(progress)
    })
}

/// Ordered stages of an instance with weighted percent complete
pub fn instance_report<L: ProgressLedger>(ledger: &L, instance_id: i64) -> Result<InstanceReport, ScheduleError> {
    let stages = ledger.load_stages(instance_id)?;
    Ok(InstanceReport {
        instance_id,
        percent_complete: percent_complete(&stages),
        stages,
    })
}

/// `100 * weight(completed) / weight(all)`, or 0 when there is no weight
pub fn percent_complete(stages: &[StageEntry]) -> f64 {
    let total: f64 = stages.iter().map(|e| e.template.weight).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let done: f64 = stages
        .iter()
        .filter(|e| e.progress.is_completed())
        .map(|e| e.template.weight)
        .sum();
    done * 100.0 / total
}

fn locate(stages: &[StageEntry], instance_id: i64, sequence: u32) -> Result<usize, ScheduleError> {
    stages
        .iter()
        .position(|e| e.sequence() == sequence)
        .ok_or(ScheduleError::NotFound { instance_id, sequence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::MemoryLedger;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario_ledger() -> MemoryLedger {
        let templates = vec![
            StageTemplate::new(1, "Reviu Bappeda", Some(7), 10.0),
            StageTemplate::new(2, "Pelaksanaan Kontrak", None, 70.0),
            StageTemplate::new(3, "Serah Terima", Some(5), 20.0),
        ];
        let mut ledger = MemoryLedger::new();
        ledger.register_instance(1, templates.clone());
        create_schedule(&mut ledger, 1, &templates, date(2024, 1, 1)).unwrap();
        ledger
    }

    #[test]
    fn test_scenario_cascade() {
        let mut ledger = scenario_ledger();
        let stages = record_actual_completion(&mut ledger, 1, 2, date(2024, 2, 1)).unwrap();

        assert_eq!(stages[1].progress.status, StageStatus::Completed);
        assert_eq!(stages[1].progress.actual_end, Some(date(2024, 2, 1)));
        assert_eq!(stages[2].progress.planned_start, Some(date(2024, 2, 2)));
        assert_eq!(stages[2].progress.planned_end, Some(date(2024, 2, 7)));
        // Stage before the completed one is untouched
        assert_eq!(stages[0].progress.planned_start, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_unknown_stage_is_not_found() {
        let mut ledger = scenario_ledger();
        let err = record_actual_completion(&mut ledger, 1, 9, date(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, ScheduleError::NotFound { instance_id: 1, sequence: 9 }));

        let err = set_planned_dates(&mut ledger, 7, 1, Some(date(2024, 1, 1)), None).unwrap_err();
        assert!(matches!(err, ScheduleError::NotFound { instance_id: 7, sequence: 1 }));
    }

    #[test]
    fn test_update_without_end_does_not_complete() {
        let mut ledger = scenario_ledger();
        let update = StageUpdate {
            actual_start: Some(date(2024, 1, 3)),
            note: Some("Menunggu SPD".to_string()),
            ..StageUpdate::default()
        };
        let stages = update_stage(&mut ledger, 1, 2, update).unwrap();
        assert_eq!(stages[1].progress.status, StageStatus::Pending);
        assert_eq!(stages[1].progress.actual_start, Some(date(2024, 1, 3)));
        assert_eq!(stages[1].progress.note.as_deref(), Some("Menunggu SPD"));
        assert_eq!(stages[2].progress.planned_start, None);
    }

    #[test]
    fn test_set_planned_dates_partial() {
        let mut ledger = scenario_ledger();
        let updated = set_planned_dates(&mut ledger, 1, 3, None, Some(date(2024, 6, 30))).unwrap();
        assert_eq!(updated.planned_start, None);
        assert_eq!(updated.planned_end, Some(date(2024, 6, 30)));
    }

    #[test]
    fn test_percent_complete() {
        let mut ledger = scenario_ledger();
        assert_eq!(instance_report(&ledger, 1).unwrap().percent_complete, 0.0);

        record_actual_completion(&mut ledger, 1, 1, date(2024, 1, 8)).unwrap();
        let report = instance_report(&ledger, 1).unwrap();
        assert!((report.percent_complete - 10.0).abs() < 1e-9);

        record_actual_completion(&mut ledger, 1, 2, date(2024, 3, 1)).unwrap();
        let report = instance_report(&ledger, 1).unwrap();
        assert!((report.percent_complete - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_complete_empty() {
        assert_eq!(percent_complete(&[]), 0.0);
    }
}
