use validator::Validate;

use crate::db::models::reflection::{TagsInput, UpdateReflectionRequest};
use crate::error::AppError;

/// Trims every tag and drops the empty ones. Order is kept.
pub fn parse_tags(input: Option<&TagsInput>) -> Vec<String> {
    let raw: Vec<&str> = match input {
        None => Vec::new(),
        Some(TagsInput::Text(text)) => text.split(',').collect(),
        Some(TagsInput::List(list)) => list.iter().map(String::as_str).collect(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate_update_reflection(req: &UpdateReflectionRequest) -> Result<(), AppError> {
    if req.title.is_none() && req.content.is_none() && req.mood.is_none() && req.tags.is_none() {
        return Err(AppError::validation("No update data provided"));
    }
    req.validate().map_err(super::into_app_error)
}
