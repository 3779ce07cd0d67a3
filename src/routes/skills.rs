use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;
use crate::db::models::api::{ApiResponse, ResponseMeta};
use crate::db::models::skill::{CreateSkillRequest, SkillQuery, UpdateSkillRequest};
use crate::routes::db_conn;
use crate::services::context::RequestContext;
use crate::services::skills_service::SkillsService;
use crate::validation::ValidatedJson;

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<SkillQuery>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SkillsService::list(&mut conn, &ctx, &query) {
        Ok(skills) => {
            let meta = ResponseMeta {
                request_id: ctx.request_id.clone(),
                total_count: Some(skills.len() as i64),
            };
            let response = ApiResponse::success_with_meta(skills, "Skills retrieved successfully", meta);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn create_skill(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateSkillRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SkillsService::create(&mut conn, &ctx, &payload) {
        Ok(skill) => {
            let response = ApiResponse::created(skill, "Skill added successfully!");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn update_skill(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(skill_id): Path<Uuid>,
    Json(payload): Json<UpdateSkillRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SkillsService::update(&mut conn, &ctx, skill_id, &payload) {
        Ok(skill) => {
            let response = ApiResponse::success(skill, "Skill updated successfully!");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn delete_skill(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(skill_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SkillsService::delete(&mut conn, &ctx, skill_id) {
        Ok(()) => {
            let response = ApiResponse::<()>::ok("Skill deleted successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 练习一次：熟练度 +1
pub async fn practice_skill(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(skill_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SkillsService::practice(&mut conn, &ctx, skill_id) {
        Ok(skill) => {
            let message = format!("Practiced {}! Proficiency is now {}/5.", skill.name, skill.proficiency);
            let response = ApiResponse::success(skill, &message);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
