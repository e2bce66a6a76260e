use database::services::activity_query::StudentStats;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQueryParams {
    /// Limit the counts to one semester
    pub semester_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQueryParams {
    /// `Enrollment`, `Withdrawal` or `Exam_Delay`
    pub activity_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentStatsResponse {
    /// Approved enrollments
    pub enrolled: u64,
    /// Credits over approved enrollments
    pub credits: i64,
    /// Requests of any type awaiting review
    pub pending: u64,
}

impl From<StudentStats> for StudentStatsResponse {
    fn from(stats: StudentStats) -> Self {
        Self {
            enrolled: stats.enrolled,
            credits: stats.credits,
            pending: stats.pending,
        }
    }
}
