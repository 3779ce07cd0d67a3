use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::AppState;
use crate::coach::ChatRequest;
use crate::db::models::api::ApiResponse;
use crate::routes::db_conn;
use crate::services::coach_service::CoachService;
use crate::services::context::RequestContext;
use crate::validation::ValidatedJson;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<ChatRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match CoachService::chat(&mut conn, &state.roadmaps, state.coach.as_ref(), &ctx, &payload).await {
        Ok(reply) => {
            let response = ApiResponse::success(reply, "Coach replied");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
