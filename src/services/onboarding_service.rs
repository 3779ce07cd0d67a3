use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::{
    db::models::roadmap::Roadmap,
    db::models::user::{OnboardingChanges, OnboardingRequest, UserProfile},
    db::repositories::users::UserRepo,
    error::AppError,
    middleware::auth::CurrentUser,
    roadmap::instantiate::instantiate,
    roadmap::templates::TemplateCatalog,
    services::roadmap_service::RoadmapService,
    services::users_service::UsersService,
    validation::onboarding::validate_onboarding,
};

#[derive(Debug, Serialize)]
pub struct OnboardingResult {
    pub profile: UserProfile,
    pub roadmap: Roadmap,
}

pub struct OnboardingService;

impl OnboardingService {
    /// Validates the answers and instantiates the roadmap. Writes nothing.
    pub fn build_roadmap(
        catalog: &TemplateCatalog,
        req: &OnboardingRequest,
        now: DateTime<Utc>,
    ) -> Result<Roadmap, AppError> {
        validate_onboarding(req)?;
        let template = catalog.get(req.learning_path)?;
        Ok(instantiate(
            template,
            req.learning_path,
            req.available_time,
            &req.career_goal,
            now,
        ))
    }

    pub async fn complete(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        catalog: &TemplateCatalog,
        user: &CurrentUser,
        req: &OnboardingRequest,
    ) -> Result<OnboardingResult, AppError> {
        let now = Utc::now();
        let roadmap = Self::build_roadmap(catalog, req, now)?;

        UsersService::ensure(conn, user)?;
        roadmaps.install(&user.id, &roadmap).await?;

        let changes = OnboardingChanges {
            full_name: req.full_name.trim().to_string(),
            age: req.age,
            education_level: req.education_level,
            learning_path: req.learning_path,
            available_time: req.available_time,
            onboarding_complete: true,
            updated_at: now,
        };
        let row = UserRepo::complete_onboarding(conn, &user.id, &changes)?;

        info!(
            user_id = %user.id,
            path = %req.learning_path,
            phases = roadmap.phases.len(),
            "Onboarding completed"
        );

        Ok(OnboardingResult {
            profile: UserProfile::from_user(row, Some(roadmap.career_goal.clone())),
            roadmap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{AvailableTime, EducationLevel, LearningPath};
    use crate::db::models::roadmap::ProgressStatus;

    fn request(path: LearningPath) -> OnboardingRequest {
        OnboardingRequest {
            full_name: "Grace Hopper".into(),
            age: 35,
            education_level: EducationLevel::Professional,
            learning_path: path,
            available_time: AvailableTime::Minutes15To30,
            career_goal: "  Lead a compiler team  ".into(),
        }
    }

    #[test]
    fn builds_roadmap_for_every_path() {
        let catalog = TemplateCatalog::embedded().unwrap();
        for path in LearningPath::ALL {
            let roadmap = OnboardingService::build_roadmap(&catalog, &request(path), Utc::now()).unwrap();
            assert_eq!(roadmap.learning_path, path);
            assert_eq!(roadmap.career_goal, "Lead a compiler team");
            assert_eq!(roadmap.phases[0].status, ProgressStatus::Active);
            assert!(roadmap.check_invariants().is_empty());
        }
    }

    #[test]
    fn invalid_answers_build_nothing() {
        let catalog = TemplateCatalog::embedded().unwrap();
        let mut req = request(LearningPath::Business);
        req.career_goal = "short".into();
        assert!(OnboardingService::build_roadmap(&catalog, &req, Utc::now()).is_err());
    }
}
