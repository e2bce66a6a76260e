//! Translation of raw storage errors into messages a user can act on.
//!
//! The store reports failures as free text. Known error markers (custom error
//! numbers raised by database routines, or constraint names) are mapped to a
//! fixed explanation; anything else is passed through, truncated.

use crate::{activity::RequestStatus, error::ServiceError};

/// Name of the partial unique index over pending activities
pub const UNIQUE_PENDING_ACTIVITY_INDEX: &str = "unique_student_course_activity";

/// Longest slice of an unrecognised message shown to the user
const RAW_MESSAGE_LIMIT: usize = 200;

const KNOWN_ERRORS: [(&str, &str); 10] = [
    ("50007", "Student does not exist"),
    ("50011", "Course does not exist"),
    ("50012", "Semester does not exist"),
    ("50019", "Exceeds the maximum credit load (21 credits)"),
    ("50001", "The minimum credit load is 14"),
    ("50002", "The maximum credit load is 21"),
    ("50003", "Prerequisite courses have not been completed"),
    ("50004", "Exam date is outside the semester"),
    ("50020", "Activity does not exist"),
    (
        UNIQUE_PENDING_ACTIVITY_INDEX,
        "This request already exists for this course",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendMessage {
    /// The marker that matched, if any
    pub code: Option<&'static str>,
    pub message: String,
}

/// Match a raw backend message against the known error table
pub fn translate(raw: &str) -> BackendMessage {
    for (code, message) in KNOWN_ERRORS {
        if raw.contains(code) {
            return BackendMessage {
                code: Some(code),
                message: message.to_string(),
            };
        }
    }

    let truncated: String = raw.chars().take(RAW_MESSAGE_LIMIT).collect();
    BackendMessage {
        code: None,
        message: format!("Error: {truncated}"),
    }
}

impl From<BackendMessage> for ServiceError {
    fn from(msg: BackendMessage) -> Self {
        match msg.code {
            Some(UNIQUE_PENDING_ACTIVITY_INDEX) => Self::DuplicateRequest {
                existing_id: None,
                status: RequestStatus::Pending,
            },
            code => Self::BackendFailure {
                code,
                message: msg.message,
            },
        }
    }
}
