use crate::{error::ValidationError, semester::SemesterWindow};
use chrono::NaiveDate;
use serde::Deserialize;

/// Shortest accepted explanation for moving an exam
pub const MIN_REASON_LEN: usize = 10;

/// Details a student supplies when asking to move an exam
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExamDelayRequest {
    pub reason: String,
    pub old_date: NaiveDate,
    pub new_date: NaiveDate,
}

impl ExamDelayRequest {
    pub fn new(reason: impl Into<String>, old_date: NaiveDate, new_date: NaiveDate) -> Self {
        Self {
            reason: reason.into(),
            old_date,
            new_date,
        }
    }

    /// Checks the reason length, the date ordering, and that both dates fall in `window`
    pub fn validate(&self, window: &SemesterWindow) -> Result<(), ValidationError> {
        let len = self.reason.trim().chars().count();
        if len < MIN_REASON_LEN {
            return Err(ValidationError::ReasonTooShort {
                len,
                min: MIN_REASON_LEN,
            });
        }

        if self.old_date >= self.new_date {
            return Err(ValidationError::DatesNotOrdered {
                old: self.old_date,
                new: self.new_date,
            });
        }

        window.ensure_contains("old_exam_date", self.old_date)?;
        window.ensure_contains("new_exam_date", self.new_date)?;

        Ok(())
    }
}
