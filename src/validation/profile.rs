use validator::Validate;

use crate::db::models::user::UpdateProfileRequest;
use crate::error::AppError;

pub fn validate_update_profile(req: &UpdateProfileRequest) -> Result<(), AppError> {
    if req.full_name.is_none()
        && req.username.is_none()
        && req.profile_picture.is_none()
        && req.career_goal.is_none()
    {
        return Err(AppError::validation("No update data provided"));
    }

    req.validate().map_err(super::into_app_error)?;

    if let Some(goal) = req.career_goal.as_deref() {
        super::onboarding::validate_career_goal(goal)?;
    }

    Ok(())
}
