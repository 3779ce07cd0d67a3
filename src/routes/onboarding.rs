use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::AppState;
use crate::db::models::api::{ApiResponse, ResponseMeta};
use crate::db::models::user::OnboardingRequest;
use crate::middleware::auth::CurrentUser;
use crate::routes::db_conn;
use crate::services::onboarding_service::OnboardingService;
use crate::validation::ValidatedJson;

/// 列出所有学习路径
pub async fn list_learning_paths(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let paths = state.catalog.summaries();
    let meta = ResponseMeta {
        request_id: None,
        total_count: Some(paths.len() as i64),
    };
    let response = ApiResponse::success_with_meta(paths, "Learning paths retrieved successfully", meta);
    (StatusCode::OK, Json(response)).into_response()
}

/// 完成引导并生成路线图
pub async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<OnboardingRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match OnboardingService::complete(&mut conn, &state.roadmaps, &state.catalog, &user, &payload).await {
        Ok(result) => {
            let response = ApiResponse::created(result, "Your personalized roadmap is ready!");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
