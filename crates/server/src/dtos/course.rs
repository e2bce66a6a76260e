use database::{
    entities::courses,
    services::course::{CourseChanges, CourseSummary, NewCourse},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    /// 1 to 10
    pub credit: i32,
    /// 0 to 100
    pub passing_score: i32,
    pub department_id: Option<i32>,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(request: CreateCourseRequest) -> Self {
        Self {
            code: request.code,
            title: request.title,
            description: request.description,
            credit: request.credit,
            passing_score: request.passing_score,
            department_id: request.department_id,
        }
    }
}

/// Fields left out keep their current value; the code cannot change
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    /// An empty string clears the description
    pub description: Option<String>,
    pub credit: Option<i32>,
    pub passing_score: Option<i32>,
    pub department_id: Option<i32>,
}

impl From<UpdateCourseRequest> for CourseChanges {
    fn from(request: UpdateCourseRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            credit: request.credit,
            passing_score: request.passing_score,
            department_id: request.department_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub credit: i32,
    pub passing_score: i32,
    pub department_id: Option<i32>,
}

impl From<courses::Model> for CourseResponse {
    fn from(course: courses::Model) -> Self {
        Self {
            id: course.id,
            code: course.code,
            title: course.title,
            description: course.description,
            credit: course.credit,
            passing_score: course.passing_score,
            department_id: course.department_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseSummaryResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub department: Option<String>,
    /// Students holding an approved enrollment
    pub student_count: u64,
}

impl From<CourseSummary> for CourseSummaryResponse {
    fn from(summary: CourseSummary) -> Self {
        Self {
            course: summary.course.into(),
            department: summary.department,
            student_count: summary.student_count,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PrerequisiteRequest {
    pub prerequisite_id: i32,
}
