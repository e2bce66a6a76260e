use crate::{
    dtos::course::{
        CourseResponse, CourseSummaryResponse, CreateCourseRequest, PrerequisiteRequest,
        UpdateCourseRequest,
    },
    error::{ApiResult, ErrorResponse},
    extractors::CurrentUser,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::course::CourseService;

/// The course catalog ordered by code
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Courses", body = Vec<CourseSummaryResponse>)
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CourseSummaryResponse>>> {
    let courses = CourseService::list_courses(&state.db).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Missing or out of range field", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 409, description = "Course code already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<CourseResponse>)> {
    let course = CourseService::create_course(&state.db, &user.context(), request.into()).await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

/// Edits title, description, credits, passing score or department
#[utoipa::path(
    patch,
    path = "/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Blank or out of range field", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown course or department", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateCourseRequest>,
) -> ApiResult<Json<CourseResponse>> {
    let course =
        CourseService::update_course(&state.db, &user.context(), id, request.into()).await?;
    Ok(Json(course.into()))
}

#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse),
        (status = 409, description = "Course still has activities", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    CourseService::delete_course(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Courses that must be completed first
#[utoipa::path(
    get,
    path = "/courses/{id}/prerequisites",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Prerequisites", body = Vec<CourseResponse>),
        (status = 404, description = "Unknown course", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn list_prerequisites(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<CourseResponse>>> {
    let courses = CourseService::prerequisites_of(&state.db, id).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/courses/{id}/prerequisites",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = PrerequisiteRequest,
    responses(
        (status = 201, description = "Prerequisite added"),
        (status = 400, description = "Course cannot require itself", body = ErrorResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse),
        (status = 409, description = "Already a prerequisite", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Courses"
)]
pub async fn add_prerequisite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<PrerequisiteRequest>,
) -> ApiResult<StatusCode> {
    CourseService::add_prerequisite(&state.db, &user.context(), id, request.prerequisite_id)
        .await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    delete,
    path = "/courses/{id}/prerequisites/{prerequisite_id}",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("prerequisite_id" = i32, Path, description = "Prerequisite course ID")
    ),
    responses(
        (status = 204, description = "Prerequisite removed"),
        (status = 404, description = "Not a prerequisite of this course", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Courses"
)]
pub async fn remove_prerequisite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, prerequisite_id)): Path<(i32, i32)>,
) -> ApiResult<StatusCode> {
    CourseService::remove_prerequisite(&state.db, &user.context(), id, prerequisite_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
