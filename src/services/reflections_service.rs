use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::models::api::error_codes,
    db::models::reflection::{
        CreateReflectionRequest, NewReflection, Reflection, ReflectionChanges, ReflectionQuery,
        UpdateReflectionRequest,
    },
    db::repositories::reflections::ReflectionRepo,
    error::AppError,
    services::context::RequestContext,
    validation::reflection::{parse_tags, validate_update_reflection},
};

pub struct ReflectionsService;

impl ReflectionsService {
    pub fn list(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        query: &ReflectionQuery,
    ) -> Result<Vec<Reflection>, AppError> {
        Ok(ReflectionRepo::list(conn, &ctx.user_id, query)?)
    }

    pub fn create(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        req: &CreateReflectionRequest,
    ) -> Result<Reflection, AppError> {
        let now = chrono::Utc::now();
        let new_reflection = NewReflection {
            id: Uuid::new_v4(),
            user_id: ctx.user_id.clone(),
            title: req.title.trim().to_string(),
            content: req.content.trim().to_string(),
            mood: req.mood,
            tags: parse_tags(req.tags.as_ref()),
            created_at: now,
            updated_at: now,
        };

        let reflection = ReflectionRepo::insert(conn, &new_reflection)?;
        tracing::info!(user_id = %ctx.user_id, reflection_id = %reflection.id, "Reflection created");
        Ok(reflection)
    }

    pub fn update(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        reflection_id: Uuid,
        req: &UpdateReflectionRequest,
    ) -> Result<Reflection, AppError> {
        validate_update_reflection(req)?;

        let changes = ReflectionChanges {
            title: req.title.as_deref().map(|t| t.trim().to_string()),
            content: req.content.as_deref().map(|c| c.trim().to_string()),
            mood: req.mood,
            tags: req.tags.as_ref().map(|t| parse_tags(Some(t))),
            updated_at: Some(chrono::Utc::now()),
        };

        ReflectionRepo::update(conn, &ctx.user_id, reflection_id, &changes)?
            .ok_or_else(|| AppError::not_found_with_code("Reflection", error_codes::REFLECTION_NOT_FOUND))
    }

    pub fn delete(conn: &mut PgConnection, ctx: &RequestContext, reflection_id: Uuid) -> Result<(), AppError> {
        let deleted = ReflectionRepo::delete(conn, &ctx.user_id, reflection_id)?;
        if deleted == 0 {
            return Err(AppError::not_found_with_code(
                "Reflection",
                error_codes::REFLECTION_NOT_FOUND,
            ));
        }
        Ok(())
    }
}
