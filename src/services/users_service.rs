use chrono::Utc;
use diesel::prelude::*;
use tracing::info;

use crate::{
    db::models::user::{NewUser, Preferences, User},
    db::repositories::{reflections::ReflectionRepo, skills::SkillRepo, users::UserRepo},
    error::AppError,
    middleware::auth::CurrentUser,
    services::roadmap_service::RoadmapService,
};

/// Identity-provider data used to seed a profile row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<&CurrentUser> for IdentityProfile {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or_default(),
            full_name: user.name.clone(),
            profile_picture: user.picture.clone(),
        }
    }
}

pub struct UsersService;

impl UsersService {
    /// Creates the profile row on first sight. Returns whether it was created.
    pub fn create_if_missing(conn: &mut PgConnection, identity: &IdentityProfile) -> Result<bool, AppError> {
        let now = Utc::now();
        let new_user = NewUser {
            id: identity.id.clone(),
            email: identity.email.clone(),
            full_name: identity.full_name.clone().filter(|n| !n.trim().is_empty()),
            profile_picture: identity.profile_picture.clone(),
            onboarding_complete: false,
            preferences: serde_json::to_value(Preferences::default())?,
            created_at: now,
            updated_at: now,
        };

        let created = UserRepo::insert_if_missing(conn, &new_user)? > 0;
        if created {
            info!(user_id = %identity.id, "User profile created");
        }
        Ok(created)
    }

    /// Loads the caller's profile row, creating it from token claims if needed.
    pub fn ensure(conn: &mut PgConnection, user: &CurrentUser) -> Result<User, AppError> {
        if let Some(existing) = UserRepo::find_by_id(conn, &user.id)? {
            return Ok(existing);
        }
        Self::create_if_missing(conn, &IdentityProfile::from(user))?;
        UserRepo::find_by_id(conn, &user.id)?.ok_or_else(|| AppError::not_found("User"))
    }

    /// Removes the profile, roadmap documents, reflections and skills.
    pub async fn delete_account(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        user_id: &str,
    ) -> Result<(), AppError> {
        roadmaps.purge(user_id).await?;

        let (reflections, skills) = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let reflections = ReflectionRepo::delete_all(conn, user_id)?;
            let skills = SkillRepo::delete_all(conn, user_id)?;
            UserRepo::delete(conn, user_id)?;
            Ok((reflections, skills))
        })?;

        info!(user_id = %user_id, reflections, skills, "Account data deleted");
        Ok(())
    }
}
