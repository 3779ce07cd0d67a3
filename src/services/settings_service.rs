use chrono::Utc;
use diesel::prelude::*;
use tracing::info;

use crate::{
    db::enums::LearningPath,
    db::models::api::error_codes,
    db::models::user::{
        AccountExport, Preferences, ProfileChanges, UpdatePreferencesRequest, UpdateProfileRequest,
        UserProfile,
    },
    db::repositories::users::UserRepo,
    error::AppError,
    middleware::auth::CurrentUser,
    services::roadmap_service::RoadmapService,
    services::users_service::UsersService,
    validation::profile::validate_update_profile,
};

pub struct SettingsService;

impl SettingsService {
    pub async fn profile(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        user: &CurrentUser,
    ) -> Result<UserProfile, AppError> {
        let row = UsersService::ensure(conn, user)?;
        let career_goal = roadmaps.find(&user.id).await?.map(|r| r.career_goal);
        Ok(UserProfile::from_user(row, career_goal))
    }

    pub async fn update_profile(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        user: &CurrentUser,
        req: &UpdateProfileRequest,
    ) -> Result<UserProfile, AppError> {
        validate_update_profile(req)?;
        UsersService::ensure(conn, user)?;

        let username = req.username.as_deref().map(str::trim);
        if let Some(name) = username {
            if UserRepo::username_taken(conn, name, &user.id)? {
                return Err(AppError::conflict_with_code(
                    "Username is already taken",
                    Some("username".to_string()),
                    error_codes::USERNAME_EXISTS,
                ));
            }
        }

        let changes = ProfileChanges {
            full_name: req.full_name.as_deref().map(|n| n.trim().to_string()),
            username: username.map(str::to_string),
            profile_picture: req.profile_picture.clone(),
            updated_at: Some(Utc::now()),
        };
        let row = UserRepo::update_profile(conn, &user.id, &changes)?;

        let career_goal = match req.career_goal.as_deref() {
            Some(goal) => roadmaps
                .update_career_goal(&user.id, goal)
                .await?
                .map(|r| r.career_goal),
            None => roadmaps.find(&user.id).await?.map(|r| r.career_goal),
        };

        info!(user_id = %user.id, "Profile updated");
        Ok(UserProfile::from_user(row, career_goal))
    }

    pub fn update_preferences(
        conn: &mut PgConnection,
        user: &CurrentUser,
        req: &UpdatePreferencesRequest,
    ) -> Result<Preferences, AppError> {
        if req.is_empty() {
            return Err(AppError::validation("No update data provided"));
        }

        let row = UsersService::ensure(conn, user)?;
        let mut prefs = row.preferences();
        req.apply_to(&mut prefs);

        let stored = serde_json::to_value(&prefs)?;
        UserRepo::update_preferences(conn, &user.id, &stored, Utc::now())?;
        Ok(prefs)
    }

    /// Archives and removes the current roadmap, records the new path and
    /// sends the user back through onboarding.
    pub async fn change_learning_path(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        user: &CurrentUser,
        path: LearningPath,
    ) -> Result<UserProfile, AppError> {
        UsersService::ensure(conn, user)?;
        let archived = roadmaps.archive_and_clear(&user.id).await?;
        let row = UserRepo::change_learning_path(conn, &user.id, path, Utc::now())?;

        info!(user_id = %user.id, path = %path, archived, "Learning path changed");
        Ok(UserProfile::from_user(row, None))
    }

    /// Deletes the current roadmap. Returns whether one existed.
    pub async fn reset_progress(roadmaps: &RoadmapService, user: &CurrentUser) -> Result<bool, AppError> {
        let existed = roadmaps.clear(&user.id).await?;
        info!(user_id = %user.id, existed, "Progress reset");
        Ok(existed)
    }

    pub async fn export(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        user: &CurrentUser,
    ) -> Result<AccountExport, AppError> {
        let row = UsersService::ensure(conn, user)?;
        let roadmap = roadmaps.find(&user.id).await?;
        let career_goal = roadmap.as_ref().map(|r| r.career_goal.clone());
        Ok(AccountExport {
            profile: UserProfile::from_user(row, career_goal),
            roadmap,
            exported_at: Utc::now(),
        })
    }

    pub async fn delete_account(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        user: &CurrentUser,
    ) -> Result<(), AppError> {
        UsersService::delete_account(conn, roadmaps, &user.id).await
    }
}
