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
use crate::db::models::reflection::{CreateReflectionRequest, ReflectionQuery, UpdateReflectionRequest};
use crate::routes::db_conn;
use crate::services::context::RequestContext;
use crate::services::reflections_service::ReflectionsService;
use crate::validation::ValidatedJson;

/// 获取反思列表（最新在前）
pub async fn list_reflections(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<ReflectionQuery>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match ReflectionsService::list(&mut conn, &ctx, &query) {
        Ok(reflections) => {
            let meta = ResponseMeta {
                request_id: ctx.request_id.clone(),
                total_count: Some(reflections.len() as i64),
            };
            let response =
                ApiResponse::success_with_meta(reflections, "Reflections retrieved successfully", meta);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn create_reflection(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateReflectionRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match ReflectionsService::create(&mut conn, &ctx, &payload) {
        Ok(reflection) => {
            let response = ApiResponse::created(reflection, "Reflection saved successfully!");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn update_reflection(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(reflection_id): Path<Uuid>,
    Json(payload): Json<UpdateReflectionRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match ReflectionsService::update(&mut conn, &ctx, reflection_id, &payload) {
        Ok(reflection) => {
            let response = ApiResponse::success(reflection, "Reflection updated successfully!");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn delete_reflection(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(reflection_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match ReflectionsService::delete(&mut conn, &ctx, reflection_id) {
        Ok(()) => {
            let response = ApiResponse::<()>::ok("Reflection deleted successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
