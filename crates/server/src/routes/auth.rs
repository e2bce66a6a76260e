use crate::{
    dtos::auth::{LoginRequest, ProfileResponse},
    error::{ApiError, ApiResult},
    extractors::CurrentUser,
    state::AppState,
};
use axum::{Json, extract::State};
use database::services::auth::AuthService;
use log::info;
use models::context::Role;

/// Checks that a user holds a role and returns their profile
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User verified", body = ProfileResponse),
        (status = 400, description = "Unknown role", body = crate::error::ErrorResponse),
        (status = 401, description = "No such user for that role", body = crate::error::ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let role: Role = request.role.parse()?;
    let profile = AuthService::authenticate(&state.db, request.user_id, role)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("no {role} with id {}", request.user_id))
        })?;

    info!("{} logged in as {role}", profile.full_name());
    Ok(Json(profile.into()))
}

/// Profile of the caller identified by the request headers
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing or unknown identity", body = crate::error::ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Authentication"
)]
pub async fn me(user: CurrentUser) -> Json<ProfileResponse> {
    Json(user.0.into())
}
