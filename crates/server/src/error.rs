use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{debug, error};
use models::error::ServiceError;
use serde::Serialize;
use utoipa::ToSchema;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body shared by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Missing or unverifiable identity headers
    Unauthorized(String),
    Service(ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Service(err) => match err {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::DuplicateRequest { .. }
                | ServiceError::Conflict(_)
                | ServiceError::InUse { .. }
                | ServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
                ServiceError::CreditLimitExceeded { .. }
                | ServiceError::NoApprovedEnrollment { .. }
                | ServiceError::PrerequisiteNotMet { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::BackendFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Service(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Unauthorized(message) => message.clone(),
            Self::Service(err) => err.to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<models::error::ValidationError> for ApiError {
    fn from(err: models::error::ValidationError) -> Self {
        Self::Service(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.message(),
            },
        };

        if status.is_server_error() {
            error!("{} {}: {}", status, body.error.code, body.error.message);
        } else {
            debug!("{} {}: {}", status, body.error.code, body.error.message);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use models::{activity::RequestStatus, error::ValidationError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::from(ValidationError::SelfPrerequisite),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Forbidden("no".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (ServiceError::not_found("course", 1), StatusCode::NOT_FOUND),
            (
                ServiceError::DuplicateRequest {
                    existing_id: None,
                    status: RequestStatus::Pending,
                },
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::InvalidTransition {
                    activity_id: 1,
                    current: RequestStatus::Rejected,
                },
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::CreditLimitExceeded {
                    current: 18,
                    requested: 4,
                    limit: 21,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::NoApprovedEnrollment { course_id: 3 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::BackendFailure {
                    code: None,
                    message: "Error: connection reset".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
        assert_eq!(
            ApiError::Unauthorized("missing X-User-Id".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::from(ServiceError::NoApprovedEnrollment { course_id: 3 })
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NO_APPROVED_ENROLLMENT");
        assert_eq!(
            body["error"]["message"],
            "no approved enrollment for course 3"
        );
    }
}
