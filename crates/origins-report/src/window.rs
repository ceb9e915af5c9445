//! Report window computation.
//!
//! A window covers Monday 00:00:00.000 through Saturday 23:59:59.999 (UTC)
//! of the week containing a reference date.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::error::ReportError;

/// The inclusive date range a weekly report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Window for the week containing `date`.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        let monday = date.week(Weekday::Mon).first_day();
        let sunday = monday + Duration::days(6);

        let start = monday.and_time(NaiveTime::MIN).and_utc();
        // Saturday 23:59:59.999 == Sunday 00:00:00.000 - 1ms
        let end = sunday.and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(1);
        Self { start, end }
    }

    /// Window for the current week (UTC).
    #[must_use]
    pub fn current() -> Self {
        Self::for_date(Utc::now().date_naive())
    }

    /// Human-readable bounds for report titles, e.g. `2026-08-24 - 2026-08-29`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Whether `date` falls on the automatic-trigger target day.
    #[must_use]
    pub fn is_target_day(date: NaiveDate, target: Weekday) -> bool {
        date.weekday() == target
    }
}

/// Parse a configured target-day string (`"saturday"`, `"sat"`, ...).
///
/// # Errors
///
/// Returns [`ReportError::InvalidTargetDay`] if the string is not a weekday name.
pub fn parse_target_day(s: &str) -> Result<Weekday, ReportError> {
    s.parse::<Weekday>()
        .map_err(|_| ReportError::InvalidTargetDay(s.to_string()))
}
