use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::enums::{AvailableTime, EducationLevel, LearningPath};
use crate::validation::rules::{validate_not_blank, validate_username_format};

// User models
#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub age: Option<i32>,
    pub education_level: Option<EducationLevel>,
    pub profile_picture: Option<String>,
    pub learning_path: Option<LearningPath>,
    pub available_time: Option<AvailableTime>,
    pub onboarding_complete: bool,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Stored preferences, falling back to defaults for missing or unknown keys.
    pub fn preferences(&self) -> Preferences {
        serde_json::from_value(self.preferences.clone()).unwrap_or_default()
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub profile_picture: Option<String>,
    pub onboarding_complete: bool,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::users)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub profile_picture: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct OnboardingChanges {
    pub full_name: String,
    pub age: i32,
    pub education_level: EducationLevel,
    pub learning_path: LearningPath,
    pub available_time: AvailableTime,
    pub onboarding_complete: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskDensity {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub task_density: TaskDensity,
    pub email_notifications: bool,
    pub in_app_notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            task_density: TaskDensity::Medium,
            email_notifications: true,
            in_app_notifications: true,
        }
    }
}

/// Profile as returned to the client.
#[derive(Serialize, Debug, Clone)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub age: Option<i32>,
    pub education_level: Option<EducationLevel>,
    pub profile_picture: Option<String>,
    pub learning_path: Option<LearningPath>,
    pub available_time: Option<AvailableTime>,
    pub onboarding_complete: bool,
    pub preferences: Preferences,
    pub career_goal: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_user(user: User, career_goal: Option<String>) -> Self {
        let preferences = user.preferences();
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            username: user.username,
            age: user.age,
            education_level: user.education_level,
            profile_picture: user.profile_picture,
            learning_path: user.learning_path,
            available_time: user.available_time,
            onboarding_complete: user.onboarding_complete,
            preferences,
            career_goal,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// Request DTOs
#[derive(Deserialize, Validate, Debug, Clone)]
pub struct OnboardingRequest {
    #[validate(
        length(min = 1, max = 100, message = "Full name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub full_name: String,

    #[validate(range(min = 1, max = 120, message = "Age must be between 1 and 120"))]
    pub age: i32,

    pub education_level: EducationLevel,
    pub learning_path: LearningPath,
    pub available_time: AvailableTime,

    #[validate(length(
        min = 10,
        max = 300,
        message = "Career goal must be between 10 and 300 characters"
    ))]
    pub career_goal: String,
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 100, message = "Full name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub full_name: Option<String>,

    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        custom(function = "validate_username_format")
    )]
    pub username: Option<String>,

    #[validate(url(message = "Profile picture must be a valid URL"))]
    pub profile_picture: Option<String>,

    #[validate(length(
        min = 10,
        max = 300,
        message = "Career goal must be between 10 and 300 characters"
    ))]
    pub career_goal: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdatePreferencesRequest {
    pub theme: Option<Theme>,
    pub task_density: Option<TaskDensity>,
    pub email_notifications: Option<bool>,
    pub in_app_notifications: Option<bool>,
}

impl UpdatePreferencesRequest {
    pub fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.task_density.is_none()
            && self.email_notifications.is_none()
            && self.in_app_notifications.is_none()
    }

    pub fn apply_to(&self, prefs: &mut Preferences) {
        if let Some(theme) = self.theme {
            prefs.theme = theme;
        }
        if let Some(density) = self.task_density {
            prefs.task_density = density;
        }
        if let Some(email) = self.email_notifications {
            prefs.email_notifications = email;
        }
        if let Some(in_app) = self.in_app_notifications {
            prefs.in_app_notifications = in_app;
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChangeLearningPathRequest {
    pub learning_path: LearningPath,
}

#[derive(Serialize, Debug)]
pub struct AccountExport {
    pub profile: UserProfile,
    pub roadmap: Option<crate::db::models::roadmap::Roadmap>,
    pub exported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_fill_missing_keys() {
        let prefs: Preferences = serde_json::from_value(serde_json::json!({"theme": "dark"})).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.email_notifications);
        assert_eq!(prefs.task_density, TaskDensity::Medium);
    }

    #[test]
    fn preference_update_only_touches_given_fields() {
        let mut prefs = Preferences::default();
        let update = UpdatePreferencesRequest {
            in_app_notifications: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
        update.apply_to(&mut prefs);
        assert!(!prefs.in_app_notifications);
        assert_eq!(prefs.theme, Theme::System);
        assert!(UpdatePreferencesRequest::default().is_empty());
    }
}
