use crate::{
    dtos::{
        activity::ActivityDetailResponse,
        student::{HistoryQueryParams, StatsQueryParams, StudentStatsResponse},
    },
    error::ApiResult,
    extractors::CurrentUser,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use database::services::activity_query::ActivityQueryService;
use models::activity::ActivityType;

/// Enrolled course count, approved credits and pending requests of a student
#[utoipa::path(
    get,
    path = "/students/{id}/stats",
    params(
        ("id" = i32, Path, description = "Student user ID"),
        StatsQueryParams
    ),
    responses(
        (status = 200, description = "Stats computed", body = StudentStatsResponse),
        (status = 403, description = "Not allowed to view this student", body = crate::error::ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Students"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Query(params): Query<StatsQueryParams>,
) -> ApiResult<Json<StudentStatsResponse>> {
    let stats =
        ActivityQueryService::get_student_stats(&state.db, &user.context(), id, params.semester_id)
            .await?;
    Ok(Json(stats.into()))
}

/// A student's requests, newest first
#[utoipa::path(
    get,
    path = "/students/{id}/activities",
    params(
        ("id" = i32, Path, description = "Student user ID"),
        HistoryQueryParams
    ),
    responses(
        (status = 200, description = "Activity history", body = Vec<ActivityDetailResponse>),
        (status = 400, description = "Unknown activity type", body = crate::error::ErrorResponse),
        (status = 403, description = "Not allowed to view this student", body = crate::error::ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Students"
)]
pub async fn get_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Query(params): Query<HistoryQueryParams>,
) -> ApiResult<Json<Vec<ActivityDetailResponse>>> {
    let activity_type = params
        .activity_type
        .as_deref()
        .map(str::parse::<ActivityType>)
        .transpose()?;

    let history =
        ActivityQueryService::student_history(&state.db, &user.context(), id, activity_type)
            .await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}
