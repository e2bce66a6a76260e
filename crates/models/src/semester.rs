use crate::error::ValidationError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Length used to propose an end date when only a start date is known
pub const DEFAULT_SEMESTER_DAYS: i64 = 120;

/// First month of the fall term
const FALL_START_MONTH: u32 = 9;

/// Inclusive date range of a semester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemesterWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SemesterWindow {
    /// Creates a window, requiring `end` to be strictly after `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::SemesterDatesNotOrdered { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Checks that `date` falls inside the window
    pub fn ensure_contains(&self, field: &'static str, date: NaiveDate) -> Result<(), ValidationError> {
        if self.contains(date) {
            Ok(())
        } else {
            Err(ValidationError::DateOutsideSemester {
                field,
                date,
                start: self.start,
                end: self.end,
            })
        }
    }
}

/// Semester name derived from its start date
///
/// Two-digit year followed by `1` for a term starting in September or later
/// and `2` otherwise, e.g. 2024-09-01 is `241` and 2025-01-15 is `252`.
pub fn semester_name(start: NaiveDate) -> String {
    let term = if start.month() >= FALL_START_MONTH { 1 } else { 2 };
    format!("{:02}{term}", start.year().rem_euclid(100))
}

pub fn default_end_date(start: NaiveDate) -> NaiveDate {
    start + Duration::days(DEFAULT_SEMESTER_DAYS)
}
