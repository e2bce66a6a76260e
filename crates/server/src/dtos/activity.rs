use chrono::NaiveDate;
use database::{
    entities::{activities, exam_delays},
    services::{
        activity::Submission,
        activity_query::{ActivityDetail, PendingCounts},
    },
};
use models::{activity::SortOrder, credits::CreditWarning};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Target of an enrollment or withdrawal request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ActivityRequest {
    pub course_id: i32,
    pub semester_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExamDelayBody {
    pub course_id: i32,
    pub semester_id: i32,
    pub reason: String,
    pub old_exam_date: NaiveDate,
    pub new_exam_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    /// `Approved` or `Rejected`
    pub decision: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityResponse {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub semester_id: i32,
    /// `Enrollment`, `Withdrawal` or `Exam_Delay`
    pub activity_type: String,
    pub submission_date: NaiveDate,
    /// `Pending`, `Approved` or `Rejected`
    pub request_status: String,
    pub reviewer_id: Option<i32>,
}

impl From<activities::Model> for ActivityResponse {
    fn from(activity: activities::Model) -> Self {
        Self {
            id: activity.id,
            student_id: activity.student_id,
            course_id: activity.course_id,
            semester_id: activity.semester_id,
            activity_type: activity.activity_type.to_string(),
            submission_date: activity.submission_date,
            request_status: activity.request_status.to_string(),
            reviewer_id: activity.reviewer_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExamDelayResponse {
    pub reason: String,
    pub old_exam_date: NaiveDate,
    pub new_exam_date: NaiveDate,
}

impl From<exam_delays::Model> for ExamDelayResponse {
    fn from(detail: exam_delays::Model) -> Self {
        Self {
            reason: detail.reason,
            old_exam_date: detail.old_exam_date,
            new_exam_date: detail.new_exam_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WarningResponse {
    pub kind: String,
    pub message: String,
}

impl From<CreditWarning> for WarningResponse {
    fn from(warning: CreditWarning) -> Self {
        match warning {
            CreditWarning::BelowMinimum { remaining, minimum } => Self {
                kind: "below_minimum".to_string(),
                message: format!(
                    "after this withdrawal you would carry {remaining} credits, below the minimum of {minimum}"
                ),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub activity: ActivityResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_delay: Option<ExamDelayResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<WarningResponse>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            activity: submission.activity.into(),
            exam_delay: submission.exam_delay.map(Into::into),
            warning: submission.warning.map(Into::into),
        }
    }
}

/// An activity with student, course and semester names
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityDetailResponse {
    #[serde(flatten)]
    pub activity: ActivityResponse,
    pub student_name: String,
    pub course_code: String,
    pub course_title: String,
    pub credit: i32,
    pub semester_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_delay: Option<ExamDelayResponse>,
}

impl From<ActivityDetail> for ActivityDetailResponse {
    fn from(detail: ActivityDetail) -> Self {
        Self {
            activity: detail.activity.into(),
            student_name: detail.student_name,
            course_code: detail.course_code,
            course_title: detail.course_title,
            credit: detail.credit,
            semester_name: detail.semester_name,
            exam_delay: detail.exam_delay.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingCountsResponse {
    pub enrollment: u64,
    pub withdrawal: u64,
    pub exam_delay: u64,
    pub total: u64,
}

impl From<PendingCounts> for PendingCountsResponse {
    fn from(counts: PendingCounts) -> Self {
        Self {
            enrollment: counts.enrollment,
            withdrawal: counts.withdrawal,
            exam_delay: counts.exam_delay,
            total: counts.total,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQueryParams {
    /// `Enrollment`, `Withdrawal` or `Exam_Delay`
    pub activity_type: String,
    /// Omit to list every status
    pub status: Option<String>,
    /// `newest_first` (default) or `oldest_first`
    #[param(value_type = Option<String>)]
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQueryParams {
    pub student_id: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    10
}
