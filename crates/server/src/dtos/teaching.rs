use crate::dtos::{
    activity::ActivityDetailResponse, course::CourseResponse, program::StudentProgramResponse,
    semester::SemesterResponse,
};
use chrono::NaiveDate;
use database::{
    entities::professor_courses,
    services::teaching::{
        RosterEntry, StatusCount, StudentCredits, StudentReport, TaughtCourse,
        TeachingAssignment, TeachingOverview, TeachingSemester,
    },
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SemesterQueryParams {
    pub semester_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignmentRequest {
    pub course_id: i32,
    pub semester_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    pub professor_id: i32,
    pub course_id: i32,
    pub semester_id: i32,
}

impl From<professor_courses::Model> for AssignmentResponse {
    fn from(assignment: professor_courses::Model) -> Self {
        Self {
            professor_id: assignment.professor_id,
            course_id: assignment.course_id,
            semester_id: assignment.semester_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeachingAssignmentResponse {
    #[serde(flatten)]
    pub assignment: AssignmentResponse,
    pub course_code: String,
    pub course_title: String,
    pub semester_name: String,
}

impl From<TeachingAssignment> for TeachingAssignmentResponse {
    fn from(row: TeachingAssignment) -> Self {
        Self {
            assignment: row.assignment.into(),
            course_code: row.course_code,
            course_title: row.course_title,
            semester_name: row.semester_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeachingSemesterResponse {
    #[serde(flatten)]
    pub semester: SemesterResponse,
    /// Courses taught that semester
    pub course_count: u64,
    /// Distinct students with an approved enrollment in those courses
    pub student_count: u64,
}

impl From<TeachingSemester> for TeachingSemesterResponse {
    fn from(row: TeachingSemester) -> Self {
        Self {
            semester: row.semester.into(),
            course_count: row.course_count,
            student_count: row.student_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeachingOverviewResponse {
    pub courses: u64,
    pub students: u64,
    /// Pending enrollment requests
    pub pending: u64,
}

impl From<TeachingOverview> for TeachingOverviewResponse {
    fn from(overview: TeachingOverview) -> Self {
        Self {
            courses: overview.courses,
            students: overview.students,
            pending: overview.pending,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaughtCourseResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub enrolled_students: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl From<TaughtCourse> for TaughtCourseResponse {
    fn from(row: TaughtCourse) -> Self {
        Self {
            course: row.course.into(),
            enrolled_students: row.enrolled_students,
            pending: row.pending,
            approved: row.approved,
            rejected: row.rejected,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RosterEntryResponse {
    pub student_id: i32,
    pub student_name: String,
    pub email: String,
    pub request_status: String,
    pub submission_date: NaiveDate,
}

impl From<RosterEntry> for RosterEntryResponse {
    fn from(entry: RosterEntry) -> Self {
        Self {
            student_id: entry.student_id,
            student_name: entry.student_name,
            email: entry.email,
            request_status: entry.request_status.to_string(),
            submission_date: entry.submission_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCountResponse {
    pub activity_type: String,
    pub request_status: String,
    pub count: u64,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(row: StatusCount) -> Self {
        Self {
            activity_type: row.activity_type.to_string(),
            request_status: row.request_status.to_string(),
            count: row.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentReportResponse {
    pub student_id: i32,
    pub student_name: String,
    /// Approved and pending enrollment credits in the semester
    pub credit_load: i64,
    /// Approved enrollments in the semester
    pub enrolled: u64,
    /// Requests awaiting review, every semester
    pub pending: u64,
    /// Enrollment requests of every semester, newest first
    pub enrollments: Vec<ActivityDetailResponse>,
    pub breakdown: Vec<StatusCountResponse>,
    pub programs: Vec<StudentProgramResponse>,
}

impl From<StudentReport> for StudentReportResponse {
    fn from(report: StudentReport) -> Self {
        Self {
            student_id: report.student_id,
            student_name: report.student_name,
            credit_load: report.credit_load,
            enrolled: report.enrolled,
            pending: report.pending,
            enrollments: report.enrollments.into_iter().map(Into::into).collect(),
            breakdown: report.breakdown.into_iter().map(Into::into).collect(),
            programs: report.programs.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentCreditsResponse {
    pub student_id: i32,
    pub student_name: String,
    pub total_credits: i64,
}

impl From<StudentCredits> for StudentCreditsResponse {
    fn from(row: StudentCredits) -> Self {
        Self {
            student_id: row.student_id,
            student_name: row.student_name,
            total_credits: row.total_credits,
        }
    }
}
