use chrono::NaiveDate;
use database::{entities::semesters, services::semester::SemesterSummary};
use models::semester::SemesterWindow;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSemesterRequest {
    pub start_date: NaiveDate,
    /// Defaults to 120 days after the start date
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SemesterResponse {
    pub id: i32,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<semesters::Model> for SemesterResponse {
    fn from(semester: semesters::Model) -> Self {
        Self {
            id: semester.id,
            name: semester.name,
            start_date: semester.start_date,
            end_date: semester.end_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SemesterSummaryResponse {
    #[serde(flatten)]
    pub semester: SemesterResponse,
    pub student_count: u64,
    pub activity_count: u64,
}

impl From<SemesterSummary> for SemesterSummaryResponse {
    fn from(summary: SemesterSummary) -> Self {
        Self {
            semester: summary.semester.into(),
            student_count: summary.student_count,
            activity_count: summary.activity_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WindowResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<SemesterWindow> for WindowResponse {
    fn from(window: SemesterWindow) -> Self {
        Self {
            start_date: window.start,
            end_date: window.end,
        }
    }
}
