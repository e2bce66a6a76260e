use crate::activity::RequestStatus;
use chrono::NaiveDate;
use thiserror::Error;

/// Result type returned by every service operation
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Input that fails a locally checkable precondition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("reason must be at least {min} characters long (got {len})")]
    ReasonTooShort { len: usize, min: usize },

    #[error("new exam date {new} must be after old exam date {old}")]
    DatesNotOrdered { old: NaiveDate, new: NaiveDate },

    #[error("{field} {date} is outside the semester ({start} to {end})")]
    DateOutsideSemester {
        field: &'static str,
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("semester end date {end} must be after start date {start}")]
    SemesterDatesNotOrdered { start: NaiveDate, end: NaiveDate },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("a course cannot be its own prerequisite")]
    SelfPrerequisite,

    #[error("unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },

    #[error("decision must be Approved or Rejected (got {0})")]
    InvalidDecision(String),
}

/// Errors surfaced by the service layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("a {status} request already exists for this course")]
    DuplicateRequest {
        existing_id: Option<i32>,
        status: RequestStatus,
    },

    #[error("credit limit exceeded: {current} + {requested} credits is over the limit of {limit}")]
    CreditLimitExceeded {
        current: i64,
        requested: i64,
        limit: i64,
    },

    #[error("no approved enrollment for course {course_id}")]
    NoApprovedEnrollment { course_id: i32 },

    #[error("prerequisites not completed for course {course_id}: {missing:?}")]
    PrerequisiteNotMet { course_id: i32, missing: Vec<i32> },

    #[error("activity {activity_id} is already {current}")]
    InvalidTransition {
        activity_id: i32,
        current: RequestStatus,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{entity} {id} is still referenced by {dependents} record(s)")]
    InUse {
        entity: &'static str,
        id: i32,
        dependents: u64,
    },

    #[error("{message}")]
    BackendFailure {
        code: Option<&'static str>,
        message: String,
    },
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    /// Stable identifier for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateRequest { .. } => "DUPLICATE_REQUEST",
            Self::CreditLimitExceeded { .. } => "CREDIT_LIMIT_EXCEEDED",
            Self::NoApprovedEnrollment { .. } => "NO_APPROVED_ENROLLMENT",
            Self::PrerequisiteNotMet { .. } => "PREREQUISITE_NOT_MET",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::InUse { .. } => "IN_USE",
            Self::BackendFailure { .. } => "BACKEND_FAILURE",
        }
    }
}

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        crate::backend::translate(&err.to_string()).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validation_converts_into_service_error() {
        let err: ServiceError = ValidationError::SelfPrerequisite.into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "a course cannot be its own prerequisite");
    }

    #[test]
    fn test_backend_failure_code() {
        let err = ServiceError::BackendFailure {
            code: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.code(), "BACKEND_FAILURE");
    }
}
