use crate::{
    dtos::organization::{
        CenterResponse, CenterSummaryResponse, CreateCenterRequest, CreateDepartmentRequest,
        DepartmentResponse, DepartmentSummaryResponse,
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
use database::services::organization::OrganizationService;

#[utoipa::path(
    get,
    path = "/centers",
    responses(
        (status = 200, description = "Education centers", body = Vec<CenterSummaryResponse>)
    ),
    tag = "Organizations"
)]
pub async fn list_centers(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CenterSummaryResponse>>> {
    let centers = OrganizationService::list_centers(&state.db).await?;
    Ok(Json(centers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/centers",
    request_body = CreateCenterRequest,
    responses(
        (status = 201, description = "Center created", body = CenterResponse),
        (status = 400, description = "Missing name", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Organizations"
)]
pub async fn create_center(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateCenterRequest>,
) -> ApiResult<(StatusCode, Json<CenterResponse>)> {
    let center =
        OrganizationService::create_center(&state.db, &user.context(), request.into()).await?;
    Ok((StatusCode::CREATED, Json(center.into())))
}

#[utoipa::path(
    delete,
    path = "/centers/{id}",
    params(("id" = i32, Path, description = "Education center ID")),
    responses(
        (status = 204, description = "Center deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown center", body = ErrorResponse),
        (status = 409, description = "Center still has departments", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Organizations"
)]
pub async fn delete_center(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    OrganizationService::delete_center(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Departments with their center, professor and course counts
#[utoipa::path(
    get,
    path = "/departments",
    responses(
        (status = 200, description = "Departments", body = Vec<DepartmentSummaryResponse>)
    ),
    tag = "Organizations"
)]
pub async fn list_departments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DepartmentSummaryResponse>>> {
    let departments = OrganizationService::list_departments(&state.db).await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Missing name", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown center", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Organizations"
)]
pub async fn create_department(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateDepartmentRequest>,
) -> ApiResult<(StatusCode, Json<DepartmentResponse>)> {
    let department =
        OrganizationService::create_department(&state.db, &user.context(), request.into())
            .await?;
    Ok((StatusCode::CREATED, Json(department.into())))
}

#[utoipa::path(
    delete,
    path = "/departments/{id}",
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown department", body = ErrorResponse),
        (status = 409, description = "Department still has professors or courses", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Organizations"
)]
pub async fn delete_department(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    OrganizationService::delete_department(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
