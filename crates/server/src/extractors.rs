use crate::{error::ApiError, state::AppState};
use axum::{extract::FromRequestParts, http::request::Parts};
use database::services::auth::{AuthService, UserProfile};
use models::context::{RequestContext, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The caller, verified against the database on every request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl CurrentUser {
    pub fn context(&self) -> RequestContext {
        self.0.context()
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id: i32 = header(parts, USER_ID_HEADER)?
            .parse()
            .map_err(|_| ApiError::Unauthorized(format!("invalid {USER_ID_HEADER} header")))?;
        let role: Role = header(parts, USER_ROLE_HEADER)?
            .parse()
            .map_err(|_| ApiError::Unauthorized(format!("invalid {USER_ROLE_HEADER} header")))?;

        AuthService::authenticate(&state.db, user_id, role)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized(format!("no {role} with id {user_id}")))
    }
}
