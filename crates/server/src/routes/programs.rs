use crate::{
    dtos::program::{
        AssignProgramRequest, CreateProgramRequest, CreateSpecializationRequest,
        ProgramResponse, ProgramSummaryResponse, SpecializationDetailResponse,
        SpecializationQueryParams, SpecializationResponse, StudentProgramResponse,
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
use chrono::Utc;
use database::services::program::ProgramService;

/// Degree programs ordered by code
#[utoipa::path(
    get,
    path = "/programs",
    responses(
        (status = 200, description = "Degree programs", body = Vec<ProgramSummaryResponse>)
    ),
    tag = "Programs"
)]
pub async fn list_programs(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProgramSummaryResponse>>> {
    let programs = ProgramService::list_programs(&state.db).await?;
    Ok(Json(programs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/programs",
    request_body = CreateProgramRequest,
    responses(
        (status = 201, description = "Program created", body = ProgramResponse),
        (status = 400, description = "Missing code or name", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 409, description = "Program code already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Programs"
)]
pub async fn create_program(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateProgramRequest>,
) -> ApiResult<(StatusCode, Json<ProgramResponse>)> {
    let program = ProgramService::create_program(&state.db, &user.context(), request.into()).await?;
    Ok((StatusCode::CREATED, Json(program.into())))
}

#[utoipa::path(
    delete,
    path = "/programs/{id}",
    params(("id" = i32, Path, description = "Program ID")),
    responses(
        (status = 204, description = "Program and its specializations deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown program", body = ErrorResponse),
        (status = 409, description = "Students still follow the program", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Programs"
)]
pub async fn delete_program(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    ProgramService::delete_program(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/specializations",
    params(SpecializationQueryParams),
    responses(
        (status = 200, description = "Specializations", body = Vec<SpecializationDetailResponse>)
    ),
    tag = "Programs"
)]
pub async fn list_specializations(
    State(state): State<AppState>,
    Query(params): Query<SpecializationQueryParams>,
) -> ApiResult<Json<Vec<SpecializationDetailResponse>>> {
    let specializations = ProgramService::list_specializations(&state.db, params.program_id).await?;
    Ok(Json(specializations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/specializations",
    request_body = CreateSpecializationRequest,
    responses(
        (status = 201, description = "Specialization created", body = SpecializationResponse),
        (status = 400, description = "Missing code or name", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown program", body = ErrorResponse),
        (status = 409, description = "Specialization code already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Programs"
)]
pub async fn create_specialization(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateSpecializationRequest>,
) -> ApiResult<(StatusCode, Json<SpecializationResponse>)> {
    let specialization =
        ProgramService::create_specialization(&state.db, &user.context(), request.into()).await?;
    Ok((StatusCode::CREATED, Json(specialization.into())))
}

#[utoipa::path(
    delete,
    path = "/specializations/{id}",
    params(("id" = i32, Path, description = "Specialization ID")),
    responses(
        (status = 204, description = "Specialization deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown specialization", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Programs"
)]
pub async fn delete_specialization(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    ProgramService::delete_specialization(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Programs a student follows
#[utoipa::path(
    get,
    path = "/students/{id}/programs",
    params(("id" = i32, Path, description = "Student user ID")),
    responses(
        (status = 200, description = "Programs of the student", body = Vec<StudentProgramResponse>),
        (status = 403, description = "Not allowed to view this student", body = ErrorResponse),
        (status = 404, description = "Unknown student", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Programs"
)]
pub async fn student_programs(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<StudentProgramResponse>>> {
    let programs = ProgramService::programs_of_student(&state.db, &user.context(), id).await?;
    Ok(Json(programs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/students/{id}/programs",
    params(("id" = i32, Path, description = "Student user ID")),
    request_body = AssignProgramRequest,
    responses(
        (status = 201, description = "Student joined the program"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown student or program", body = ErrorResponse),
        (status = 409, description = "Student already follows the program", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Programs"
)]
pub async fn assign_program(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<AssignProgramRequest>,
) -> ApiResult<StatusCode> {
    let enrollment_date = request
        .enrollment_date
        .unwrap_or_else(|| Utc::now().date_naive());
    ProgramService::assign_student(
        &state.db,
        &user.context(),
        id,
        request.program_id,
        enrollment_date,
    )
    .await?;
    Ok(StatusCode::CREATED)
}
