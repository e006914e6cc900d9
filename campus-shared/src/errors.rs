use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;

use crate::types::ApiErrorResponse;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error taxonomy of the API. The wire carries only the HTTP status and a
/// human-readable message, so a code maps to nothing more than a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InternalError,
    ServiceUnavailable,
    ValidationError,
    BadRequest,
    NotFound,
    Conflict,

    // Authentication / authorization
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    OtpInvalid,
    Forbidden,
    AccountDisabled,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ValidationError | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::TokenMissing | Self::TokenInvalid | Self::InvalidCredentials
            | Self::OtpInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccountDisabled => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known { code: ErrorCode, message: String },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Known { code, .. } => code.status_code(),
            AppError::Internal(_) | AppError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(err) => match err {
                diesel::result::Error::NotFound => StatusCode::NOT_FOUND,
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    StatusCode::CONFLICT
                }
                diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Known { message, .. } if status.is_server_error() => {
                tracing::error!(status = %status, error = %message, "request failed");
                if status == StatusCode::SERVICE_UNAVAILABLE {
                    message.clone()
                } else {
                    INTERNAL_MESSAGE.to_string()
                }
            }
            AppError::Known { message, .. } => message.clone(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                INTERNAL_MESSAGE.to_string()
            }
            AppError::Pool(err) => {
                tracing::error!(error = %err, "database pool unavailable");
                INTERNAL_MESSAGE.to_string()
            }
            AppError::Database(err) => match status {
                StatusCode::NOT_FOUND => "Resource not found".to_string(),
                StatusCode::CONFLICT => "Resource already exists".to_string(),
                StatusCode::BAD_REQUEST => "Referenced resource does not exist".to_string(),
                _ => {
                    tracing::error!(error = %err, "database error");
                    INTERNAL_MESSAGE.to_string()
                }
            },
            AppError::Validation(msg) => msg.clone(),
        };

        (status, Json(ApiErrorResponse::new(message))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        AppError::Validation(message)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn known_client_errors_keep_their_message() {
        let (status, body) = body_of(AppError::not_found("News not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "News not found" }));
    }

    #[tokio::test]
    async fn server_errors_are_generic() {
        let (status, body) = body_of(AppError::internal("pool exhausted at 10.0.0.3")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = body_of(AppError::Internal(anyhow::anyhow!("boom"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn diesel_not_found_maps_to_404() {
        let (status, _) = body_of(AppError::Database(diesel::result::Error::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_codes_map_to_401_and_403() {
        assert_eq!(ErrorCode::TokenMissing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::TokenInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_errors_surface_the_field_message() {
        use validator::Validate;

        #[derive(Validate)]
        struct Req {
            #[validate(length(min = 1, message = "Title is required"))]
            title: String,
        }

        let err = AppError::from(Req { title: String::new() }.validate().unwrap_err());
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Title is required"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
