use validator::Validate;

use crate::db::models::api::error_codes;
use crate::db::models::skill::{MAX_PROFICIENCY, UpdateSkillRequest};
use crate::error::AppError;

pub fn validate_update_skill(req: &UpdateSkillRequest) -> Result<(), AppError> {
    if req.name.is_none()
        && req.proficiency.is_none()
        && req.category.is_none()
        && req.projects.is_none()
        && req.notes.is_none()
        && req.endorsements.is_none()
    {
        return Err(AppError::validation("No update data provided"));
    }
    req.validate().map_err(super::into_app_error)
}

/// Project names, trimmed, without blanks.
pub fn clean_projects(projects: &[String]) -> Vec<String> {
    projects
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Proficiency after one practice session.
pub fn next_proficiency(current: i32) -> Result<i32, AppError> {
    if current >= MAX_PROFICIENCY {
        return Err(AppError::validation_with_code(
            "Already at maximum proficiency!",
            error_codes::SKILL_MAX_PROFICIENCY,
        ));
    }
    Ok(current + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practice_stops_at_five() {
        assert_eq!(next_proficiency(2).unwrap(), 3);
        assert_eq!(next_proficiency(4).unwrap(), 5);
        let err = next_proficiency(5).unwrap_err();
        assert_eq!(err.code(), Some(error_codes::SKILL_MAX_PROFICIENCY));
    }

    #[test]
    fn proficiency_range_is_enforced() {
        let req = UpdateSkillRequest {
            proficiency: Some(6),
            ..Default::default()
        };
        assert!(validate_update_skill(&req).is_err());
        assert!(validate_update_skill(&UpdateSkillRequest::default()).is_err());
    }

    #[test]
    fn blank_projects_are_dropped() {
        let cleaned = clean_projects(&[" api ".into(), "  ".into()]);
        assert_eq!(cleaned, vec!["api"]);
    }
}
