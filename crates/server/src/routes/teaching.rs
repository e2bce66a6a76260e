use crate::{
    dtos::teaching::{
        AssignmentRequest, AssignmentResponse, RosterEntryResponse, SemesterQueryParams,
        StudentCreditsResponse, StudentReportResponse, TaughtCourseResponse,
        TeachingAssignmentResponse, TeachingOverviewResponse, TeachingSemesterResponse,
    },
    error::{ApiResult, ErrorResponse},
    extractors::CurrentUser,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::teaching::TeachingService;

/// Teaching assignments of a professor, latest semester first
#[utoipa::path(
    get,
    path = "/professors/{id}/assignments",
    params(("id" = i32, Path, description = "Professor user ID")),
    responses(
        (status = 200, description = "Assignments", body = Vec<TeachingAssignmentResponse>),
        (status = 403, description = "Not allowed to view this professor", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<TeachingAssignmentResponse>>> {
    let assignments = TeachingService::assignments_of(&state.db, &user.context(), id).await?;
    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/professors/{id}/assignments",
    params(("id" = i32, Path, description = "Professor user ID")),
    request_body = AssignmentRequest,
    responses(
        (status = 201, description = "Professor assigned", body = AssignmentResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown professor, course or semester", body = ErrorResponse),
        (status = 409, description = "Already assigned", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn assign_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<AssignmentRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentResponse>)> {
    let assignment = TeachingService::assign_professor(
        &state.db,
        &user.context(),
        id,
        request.course_id,
        request.semester_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(assignment.into())))
}

#[utoipa::path(
    delete,
    path = "/professors/{id}/assignments/{course_id}/{semester_id}",
    params(
        ("id" = i32, Path, description = "Professor user ID"),
        ("course_id" = i32, Path, description = "Course ID"),
        ("semester_id" = i32, Path, description = "Semester ID")
    ),
    responses(
        (status = 204, description = "Assignment removed"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "No such assignment", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn unassign_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, course_id, semester_id)): Path<(i32, i32, i32)>,
) -> ApiResult<StatusCode> {
    TeachingService::unassign(&state.db, &user.context(), id, course_id, semester_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every semester with the professor's course and student counts
#[utoipa::path(
    get,
    path = "/professors/{id}/semesters",
    params(("id" = i32, Path, description = "Professor user ID")),
    responses(
        (status = 200, description = "Semesters, latest first", body = Vec<TeachingSemesterResponse>),
        (status = 403, description = "Not allowed to view this professor", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn teaching_semesters(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<TeachingSemesterResponse>>> {
    let semesters = TeachingService::teaching_semesters(&state.db, &user.context(), id).await?;
    Ok(Json(semesters.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/professors/{id}/overview",
    params(
        ("id" = i32, Path, description = "Professor user ID"),
        SemesterQueryParams
    ),
    responses(
        (status = 200, description = "Courses, students and pending enrollments", body = TeachingOverviewResponse),
        (status = 403, description = "Not allowed to view this professor", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn overview(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Query(params): Query<SemesterQueryParams>,
) -> ApiResult<Json<TeachingOverviewResponse>> {
    let overview =
        TeachingService::professor_overview(&state.db, &user.context(), id, params.semester_id)
            .await?;
    Ok(Json(overview.into()))
}

/// Courses taught in a semester with their enrollment status breakdown
#[utoipa::path(
    get,
    path = "/professors/{id}/courses",
    params(
        ("id" = i32, Path, description = "Professor user ID"),
        SemesterQueryParams
    ),
    responses(
        (status = 200, description = "Taught courses", body = Vec<TaughtCourseResponse>),
        (status = 403, description = "Not allowed to view this professor", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn taught_courses(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Query(params): Query<SemesterQueryParams>,
) -> ApiResult<Json<Vec<TaughtCourseResponse>>> {
    let courses =
        TeachingService::taught_courses(&state.db, &user.context(), id, params.semester_id)
            .await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/courses/{id}/roster",
    params(
        ("id" = i32, Path, description = "Course ID"),
        SemesterQueryParams
    ),
    responses(
        (status = 200, description = "Enrollment requests for the course", body = Vec<RosterEntryResponse>),
        (status = 403, description = "Caller neither staff nor teaching the course", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn course_roster(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Query(params): Query<SemesterQueryParams>,
) -> ApiResult<Json<Vec<RosterEntryResponse>>> {
    let roster =
        TeachingService::course_roster(&state.db, &user.context(), id, params.semester_id)
            .await?;
    Ok(Json(roster.into_iter().map(Into::into).collect()))
}

/// Credit load, history, status breakdown and programs of one student
#[utoipa::path(
    get,
    path = "/students/{id}/report",
    params(
        ("id" = i32, Path, description = "Student user ID"),
        SemesterQueryParams
    ),
    responses(
        (status = 200, description = "Student report", body = StudentReportResponse),
        (status = 403, description = "Caller is a student", body = ErrorResponse),
        (status = 404, description = "Unknown student or semester", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn student_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Query(params): Query<SemesterQueryParams>,
) -> ApiResult<Json<StudentReportResponse>> {
    let report =
        TeachingService::student_report(&state.db, &user.context(), id, params.semester_id)
            .await?;
    Ok(Json(report.into()))
}

#[utoipa::path(
    get,
    path = "/semesters/{id}/credits",
    params(("id" = i32, Path, description = "Semester ID")),
    responses(
        (status = 200, description = "Approved credits per student, highest first", body = Vec<StudentCreditsResponse>),
        (status = 403, description = "Caller is a student", body = ErrorResponse),
        (status = 404, description = "Unknown semester", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Teaching"
)]
pub async fn credit_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<StudentCreditsResponse>>> {
    let report = TeachingService::credit_report(&state.db, &user.context(), id).await?;
    Ok(Json(report.into_iter().map(Into::into).collect()))
}
