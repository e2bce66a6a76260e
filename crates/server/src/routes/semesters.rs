use crate::{
    dtos::semester::{
        CreateSemesterRequest, SemesterResponse, SemesterSummaryResponse, WindowResponse,
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
use database::services::semester::SemesterService;
use models::semester::default_end_date;

/// All semesters, newest first, with usage counts
#[utoipa::path(
    get,
    path = "/semesters",
    responses(
        (status = 200, description = "Semesters", body = Vec<SemesterSummaryResponse>)
    ),
    tag = "Semesters"
)]
pub async fn list_semesters(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SemesterSummaryResponse>>> {
    let semesters = SemesterService::list_semesters(&state.db).await?;
    Ok(Json(semesters.into_iter().map(Into::into).collect()))
}

/// Opens a new semester; its name is derived from the start date
#[utoipa::path(
    post,
    path = "/semesters",
    request_body = CreateSemesterRequest,
    responses(
        (status = 201, description = "Semester created", body = SemesterResponse),
        (status = 400, description = "End date not after start date", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 409, description = "Start or end date already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Semesters"
)]
pub async fn create_semester(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateSemesterRequest>,
) -> ApiResult<(StatusCode, Json<SemesterResponse>)> {
    let end_date = request
        .end_date
        .unwrap_or_else(|| default_end_date(request.start_date));
    let semester =
        SemesterService::create_semester(&state.db, &user.context(), request.start_date, end_date)
            .await?;
    Ok((StatusCode::CREATED, Json(semester.into())))
}

/// The semester with the latest start date
#[utoipa::path(
    get,
    path = "/semesters/current",
    responses(
        (status = 200, description = "Current semester, or null when none exist", body = Option<SemesterResponse>)
    ),
    tag = "Semesters"
)]
pub async fn current_semester(
    State(state): State<AppState>,
) -> ApiResult<Json<Option<SemesterResponse>>> {
    let semester = SemesterService::current_semester(&state.db).await?;
    Ok(Json(semester.map(Into::into)))
}

/// Date range exam delays must fall in
#[utoipa::path(
    get,
    path = "/semesters/{id}/window",
    params(("id" = i32, Path, description = "Semester ID")),
    responses(
        (status = 200, description = "Semester window", body = WindowResponse),
        (status = 404, description = "Unknown semester", body = ErrorResponse)
    ),
    tag = "Semesters"
)]
pub async fn get_window(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<WindowResponse>> {
    let window = SemesterService::semester_window(&state.db, id).await?;
    Ok(Json(window.into()))
}

#[utoipa::path(
    delete,
    path = "/semesters/{id}",
    params(("id" = i32, Path, description = "Semester ID")),
    responses(
        (status = 204, description = "Semester deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown semester", body = ErrorResponse),
        (status = 409, description = "Semester still has activities", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Semesters"
)]
pub async fn delete_semester(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    SemesterService::delete_semester(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
