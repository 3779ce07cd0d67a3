use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::models::api::error_codes,
    db::models::skill::{
        CreateSkillRequest, DEFAULT_PROFICIENCY, NewSkill, Skill, SkillChanges, SkillQuery,
        UpdateSkillRequest,
    },
    db::repositories::skills::SkillRepo,
    error::AppError,
    services::context::RequestContext,
    validation::skill::{clean_projects, next_proficiency, validate_update_skill},
};

pub struct SkillsService;

impl SkillsService {
    pub fn list(conn: &mut PgConnection, ctx: &RequestContext, query: &SkillQuery) -> Result<Vec<Skill>, AppError> {
        Ok(SkillRepo::list(conn, &ctx.user_id, query)?)
    }

    pub fn create(conn: &mut PgConnection, ctx: &RequestContext, req: &CreateSkillRequest) -> Result<Skill, AppError> {
        let now = chrono::Utc::now();
        let new_skill = NewSkill {
            id: Uuid::new_v4(),
            user_id: ctx.user_id.clone(),
            name: req.name.trim().to_string(),
            proficiency: req.proficiency.unwrap_or(DEFAULT_PROFICIENCY),
            category: req.category.unwrap_or_default(),
            projects: clean_projects(&req.projects),
            notes: req.notes.trim().to_string(),
            endorsements: 0,
            last_practiced: now,
            created_at: now,
        };

        Ok(SkillRepo::insert(conn, &new_skill)?)
    }

    pub fn update(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        skill_id: Uuid,
        req: &UpdateSkillRequest,
    ) -> Result<Skill, AppError> {
        validate_update_skill(req)?;

        let changes = SkillChanges {
            name: req.name.as_deref().map(|n| n.trim().to_string()),
            proficiency: req.proficiency,
            category: req.category,
            projects: req.projects.as_deref().map(clean_projects),
            notes: req.notes.clone(),
            endorsements: req.endorsements,
            last_practiced: None,
        };

        SkillRepo::update(conn, &ctx.user_id, skill_id, &changes)?.ok_or_else(skill_not_found)
    }

    pub fn delete(conn: &mut PgConnection, ctx: &RequestContext, skill_id: Uuid) -> Result<(), AppError> {
        if SkillRepo::delete(conn, &ctx.user_id, skill_id)? == 0 {
            return Err(skill_not_found());
        }
        Ok(())
    }

    /// One practice session: proficiency +1 and `last_practiced` bumped.
    pub fn practice(conn: &mut PgConnection, ctx: &RequestContext, skill_id: Uuid) -> Result<Skill, AppError> {
        let skill = SkillRepo::find(conn, &ctx.user_id, skill_id)?.ok_or_else(skill_not_found)?;
        let proficiency = next_proficiency(skill.proficiency)?;

        let changes = SkillChanges {
            proficiency: Some(proficiency),
            last_practiced: Some(chrono::Utc::now()),
            ..Default::default()
        };
        let updated = SkillRepo::update(conn, &ctx.user_id, skill_id, &changes)?.ok_or_else(skill_not_found)?;
        tracing::info!(user_id = %ctx.user_id, skill = %updated.name, proficiency, "Skill practiced");
        Ok(updated)
    }
}

fn skill_not_found() -> AppError {
    AppError::not_found_with_code("Skill", error_codes::SKILL_NOT_FOUND)
}
