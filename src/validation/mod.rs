pub mod onboarding;
pub mod profile;
pub mod reflection;
pub mod skill;

use axum::{
    async_trait,
    extract::FromRequest,
    http::Request,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::{db::models::api::ErrorDetail, error::AppError};

/// 验证的 JSON 提取器
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S, axum::body::Body> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<axum::body::Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid JSON format: {}", e)))?;

        value.validate().map_err(into_app_error)?;

        Ok(ValidatedJson(value))
    }
}

/// Flattens field errors into response details, sorted by field name.
pub fn error_details(errors: &ValidationErrors) -> Vec<ErrorDetail> {
    let mut details: Vec<ErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| ErrorDetail {
                field: Some(field.to_string()),
                code: error.code.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation failed for field: {}", field)),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// 第一个字段错误作为提示信息
pub fn into_app_error(errors: ValidationErrors) -> AppError {
    let details = error_details(&errors);
    match details.first() {
        Some(first) if details.len() == 1 => AppError::validation(first.message.clone()),
        Some(first) => AppError::validation(format!(
            "{} (and {} more)",
            first.message,
            details.len() - 1
        )),
        None => AppError::validation("Validation failed"),
    }
}

/// 常用验证规则
pub mod rules {
    use validator::ValidationError;

    /// 不能只包含空白字符
    pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            let mut err = ValidationError::new("blank");
            err.message = Some("This field cannot be empty".into());
            return Err(err);
        }
        Ok(())
    }

    /// 验证用户名格式
    pub fn validate_username_format(username: &str) -> Result<(), ValidationError> {
        // 只允许字母、数字、下划线和连字符
        if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            let mut err = ValidationError::new("invalid_username_format");
            err.message =
                Some("Username can only contain letters, numbers, underscores and hyphens".into());
            return Err(err);
        }

        // 不能以数字开头
        if username.chars().next().is_some_and(|c| c.is_numeric()) {
            let mut err = ValidationError::new("username_starts_with_number");
            err.message = Some("Username cannot start with a number".into());
            return Err(err);
        }

        Ok(())
    }

}
