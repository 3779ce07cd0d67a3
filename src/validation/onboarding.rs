use validator::Validate;

use crate::db::models::user::OnboardingRequest;
use crate::error::AppError;

pub const CAREER_GOAL_MIN: usize = 10;
pub const CAREER_GOAL_MAX: usize = 300;

/// Career goal length is measured on the trimmed text.
pub fn validate_career_goal(goal: &str) -> Result<(), AppError> {
    let len = goal.trim().chars().count();
    if len < CAREER_GOAL_MIN {
        return Err(AppError::validation(format!(
            "Career goal must be at least {} characters",
            CAREER_GOAL_MIN
        )));
    }
    if len > CAREER_GOAL_MAX {
        return Err(AppError::validation(format!(
            "Career goal is too long (max {} characters)",
            CAREER_GOAL_MAX
        )));
    }
    Ok(())
}

pub fn validate_onboarding(req: &OnboardingRequest) -> Result<(), AppError> {
    req.validate().map_err(super::into_app_error)?;
    validate_career_goal(&req.career_goal)
}
