// Calendar date parsing and formatting
//
// Every date in the ledger is a chrono::NaiveDate: no time of day and no time
// zone, so day arithmetic cannot drift across midnight or DST changes.
// "today" is taken from the local clock once per call.

use chrono::{Local, NaiveDate, NaiveDateTime};
use crate::schedule::ScheduleError;

/// Today's date in the local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a user-supplied date for `field`
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` (time is dropped), and the
/// words `today`, `yesterday` and `tomorrow`. Anything else, including
/// impossible dates like 2024-02-30, is an `InvalidArgument` naming `field`.
pub fn parse_date(field: &str, expr: &str) -> Result<NaiveDate, ScheduleError> {
    let expr = expr.trim();
    match expr.to_ascii_lowercase().as_str() {
        "today" => return Ok(today()),
        "yesterday" => return today().pred_opt().ok_or_else(|| invalid(field, expr)),
        "tomorrow" => return today().succ_opt().ok_or_else(|| invalid(field, expr)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(expr, format) {
            return Ok(datetime.date());
        }
    }
    Err(invalid(field, expr))
}

/// Parse an optional date argument
pub fn parse_optional_date(field: &str, expr: Option<&str>) -> Result<Option<NaiveDate>, ScheduleError> {
    expr.map(|e| parse_date(field, e)).transpose()
}

/// Format an optional date for display, "-" when unset
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn invalid(field: &str, expr: &str) -> ScheduleError {
    ScheduleError::invalid_argument(
        field,
        format!("'{}' is not a calendar date (expected YYYY-MM-DD, today, yesterday or tomorrow)", expr),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("start", "2024-01-10").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(parse_date("start", " 2024-02-29 ").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_parse_datetime_truncates_time() {
        assert_eq!(parse_date("end", "2024-01-10T23:59").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(parse_date("end", "2024-01-10T00:00:01").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_parse_relative_words() {
        let today = today();
        assert_eq!(parse_date("end", "today").unwrap(), today);
        assert_eq!(parse_date("end", "Tomorrow").unwrap(), today.succ_opt().unwrap());
        assert_eq!(parse_date("end", "yesterday").unwrap(), today.pred_opt().unwrap());
    }

    #[test]
    fn test_parse_rejects_invalid_dates() {
        for bad in ["2024-02-30", "2023-02-29", "10/01/2024", "", "next week"] {
            let err = parse_date("actual end", bad).unwrap_err();
            match err {
                ScheduleError::InvalidArgument { field, .. } => assert_eq!(field, "actual end"),
                other => panic!("unexpected error for {:?}: {}", bad, other),
            }
        }
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date("start", None).unwrap(), None);
        assert!(parse_optional_date("start", Some("2024-13-01")).is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 1, 2)), "2024-01-02");
        assert_eq!(format_date(None), "-");
    }
}
