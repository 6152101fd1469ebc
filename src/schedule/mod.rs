//! Stage scheduling engine
//!
//! The builder and the cascade share one primitive, [`chain`], which walks an
//! ordered run of stage durations forward from a cursor date. A stage planned
//! `start..end` occupies both endpoints, so the next stage starts the day
//! after `end`. A variable-duration stage (no standard duration) gets a start
//! but no end, and the cursor is lost for every stage after it until an
//! actual completion date is recorded.
//!
//! All dates are `NaiveDate` calendar days; no time of day or zone is
//! involved in the arithmetic.

pub mod error;
pub mod ledger;
pub mod service;

pub use error::ScheduleError;
pub use ledger::{MemoryLedger, ProgressLedger};
pub use service::*;

use chrono::{Days, NaiveDate};
use crate::models::{StageEntry, StageProgress, StageTemplate};

/// Planned window of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlannedWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Outcome of chaining a run of stages: one window per stage, plus the
/// cursor left after the last one (`None` once a variable stage was reached,
/// or when the last end is the final representable day)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub windows: Vec<PlannedWindow>,
    pub cursor: Option<NaiveDate>,
}

/// Where the next stage starts. The day after an end is only computed when a
/// stage actually needs it.
#[derive(Debug, Clone, Copy)]
enum Next {
    On(NaiveDate),
    DayAfter(NaiveDate),
    Unknown,
}

impl Next {
    fn resolve(self) -> Result<Option<NaiveDate>, ScheduleError> {
        match self {
            Next::On(date) => Ok(Some(date)),
            Next::DayAfter(end) => next_day(end).map(Some),
            Next::Unknown => Ok(None),
        }
    }
}

/// Walk `durations` forward from `cursor`
///
/// `None` in `durations` is a variable-duration stage. Fails only when the
/// date arithmetic leaves chrono's supported range.
pub fn chain<I>(cursor: Option<NaiveDate>, durations: I) -> Result<Chain, ScheduleError>
where
    I: IntoIterator<Item = Option<u32>>,
{
    walk(cursor.map_or(Next::Unknown, Next::On), durations)
}

fn walk<I>(next: Next, durations: I) -> Result<Chain, ScheduleError>
where
    I: IntoIterator<Item = Option<u32>>,
{
    let (windows, next) = durations.into_iter().try_fold(
        (Vec::new(), next),
        |(mut windows, next), duration| {
            let start = next.resolve()?;
            let (end, next) = match (start, duration) {
                (Some(start), Some(days)) => {
                    let end = start
                        .checked_add_days(Days::new(u64::from(days)))
                        .ok_or_else(|| out_of_range(start, days))?;
                    (Some(end), Next::DayAfter(end))
                }
                _ => (None, Next::Unknown),
            };
            windows.push(PlannedWindow { start, end });
            Ok::<_, ScheduleError>((windows, next))
        },
    )?;

    let cursor = match next {
        Next::On(date) => Some(date),
        Next::DayAfter(end) => end.succ_opt(),
        Next::Unknown => None,
    };
    Ok(Chain { windows, cursor })
}

/// Check the template invariants: sequences contiguous from 1 in ascending
/// order, positive durations and weights
pub fn validate_templates(templates: &[StageTemplate]) -> Result<(), ScheduleError> {
    for (index, template) in templates.iter().enumerate() {
        let expected = index as u32 + 1;
        if template.sequence != expected {
            return Err(ScheduleError::InvalidTemplate(format!(
                "expected sequence {} at position {}, found {} ('{}')",
                expected, index + 1, template.sequence, template.name
            )));
        }
        if template.duration_days == Some(0) {
            return Err(ScheduleError::InvalidTemplate(format!(
                "stage {} ('{}') has a zero duration; leave it empty for a variable-duration stage",
                template.sequence, template.name
            )));
        }
        if !(template.weight > 0.0 && template.weight.is_finite()) {
            return Err(ScheduleError::InvalidTemplate(format!(
                "stage {} ('{}') must have a positive weight, got {}",
                template.sequence, template.name, template.weight
            )));
        }
    }
    Ok(())
}

/// Build the initial schedule of a new procurement instance
///
/// Planning starts the day after `anchor`. Returns one pending record per
/// template in sequence order; nothing is returned if the templates are
/// invalid.
pub fn build_schedule(templates: &[StageTemplate], anchor: NaiveDate) -> Result<Vec<StageProgress>, ScheduleError> {
    validate_templates(templates)?;
    let planned = walk(
        Next::DayAfter(anchor),
        templates.iter().map(|t| t.duration_days),
    )?;
    Ok(templates
        .iter()
        .zip(planned.windows)
        .map(|(template, window)| StageProgress::planned(template, window.start, window.end))
        .collect())
}

/// Re-derive the planned windows of `downstream` after a variable-duration
/// stage finished on `actual_end`
///
/// `downstream` must be the stages strictly after the completed one, in
/// sequence order. Returns their progress records with only the planned
/// dates replaced.
pub fn cascade_after(downstream: &[StageEntry], actual_end: NaiveDate) -> Result<Vec<StageProgress>, ScheduleError> {
    let planned = walk(
        Next::DayAfter(actual_end),
        downstream.iter().map(|e| e.template.duration_days),
    )?;
    Ok(downstream
        .iter()
        .zip(planned.windows)
        .map(|(entry, window)| StageProgress {
            planned_start: window.start,
            planned_end: window.end,
            ..entry.progress.clone()
        })
        .collect())
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    date.succ_opt()
        .ok_or_else(|| ScheduleError::invalid_argument("date", format!("{} has no following day", date)))
}

fn out_of_range(start: NaiveDate, days: u32) -> ScheduleError {
    ScheduleError::invalid_argument(
        "duration",
        format!("{} + {} days is outside the supported date range", start, days),
    )
}
