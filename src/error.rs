use crate::db::models::api::{ApiResponse, error_codes};
use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

pub const CONNECTIVITY_MESSAGE: &str = "Failed to save progress. Check your connection.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: Option<String>,
    },

    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        code: Option<String>,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        field: Option<String>,
        code: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, response) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error(
                        500,
                        CONNECTIVITY_MESSAGE,
                        error_codes::SYSTEM_DATABASE_ERROR,
                    ),
                )
            }
            AppError::Pool(ref e) => {
                tracing::error!("Connection pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error(
                        500,
                        CONNECTIVITY_MESSAGE,
                        error_codes::SYSTEM_DATABASE_ERROR,
                    ),
                )
            }
            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error(500, CONNECTIVITY_MESSAGE, error_codes::SYSTEM_CACHE_ERROR),
                )
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::internal_error("Stored document could not be read"),
                )
            }
            AppError::Auth { ref message } => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::<()>::unauthorized(message),
            ),
            AppError::Validation {
                ref message,
                ref code,
            } => (
                StatusCode::BAD_REQUEST,
                match code {
                    Some(code) => ApiResponse::<()>::error(400, message, code),
                    None => ApiResponse::<()>::bad_request(message),
                },
            ),
            AppError::NotFound {
                ref resource,
                ref code,
            } => {
                let message = format!("{} not found.", resource);
                (
                    StatusCode::NOT_FOUND,
                    match code {
                        Some(code) => ApiResponse::<()>::error(404, &message, code),
                        None => ApiResponse::<()>::not_found(&message),
                    },
                )
            }
            AppError::Conflict {
                ref message,
                ref field,
                ref code,
            } => (
                StatusCode::CONFLICT,
                ApiResponse::<()>::conflict(message, field.clone(), code.as_deref().unwrap_or("")),
            ),
            AppError::Config(ref e) => {
                tracing::error!("Configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error(500, "Configuration error", error_codes::CONFIGURATION_ERROR),
                )
            }
            AppError::Jwt(ref e) => {
                tracing::warn!("JWT error: {}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    ApiResponse::<()>::unauthorized("Invalid token"),
                )
            }
            AppError::Upstream(ref message) => {
                tracing::error!("Upstream error: {}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    ApiResponse::<()>::error(
                        502,
                        message,
                        error_codes::SYSTEM_EXTERNAL_SERVICE_ERROR,
                    ),
                )
            }
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::internal_error(message),
                )
            }
        };

        (status, Json(response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// 便捷的错误创建函数
impl AppError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: None,
        }
    }

    pub fn validation_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            code: None,
        }
    }

    pub fn not_found_with_code(resource: impl Into<String>, code: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            code: Some(code.into()),
        }
    }

    pub fn conflict_with_code(
        message: impl Into<String>,
        field: Option<String>,
        code: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            message: message.into(),
            field,
            code: Some(code.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Machine readable code carried by the error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            AppError::Validation { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
