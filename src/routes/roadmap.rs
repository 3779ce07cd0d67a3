use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::AppState;
use crate::db::models::api::ApiResponse;
use crate::roadmap::progression::RoadmapAction;
use crate::services::context::RequestContext;
use crate::validation::{ValidatedJson, rules::validate_not_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct TaskActionRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub task_name: String,
}

/// 获取当前路线图
pub async fn get_roadmap(State(state): State<Arc<AppState>>, ctx: RequestContext) -> impl IntoResponse {
    match state.roadmaps.current(&ctx).await {
        Ok(roadmap) => {
            let response = ApiResponse::success(roadmap, "Roadmap retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 获取整体与各阶段进度
pub async fn get_progress(State(state): State<Arc<AppState>>, ctx: RequestContext) -> impl IntoResponse {
    match state.roadmaps.progress(&ctx).await {
        Ok(progress) => {
            let response = ApiResponse::success(progress, "Progress retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 获取今日任务
pub async fn get_today(State(state): State<Arc<AppState>>, ctx: RequestContext) -> impl IntoResponse {
    match state.roadmaps.today(&ctx).await {
        Ok(today) => {
            let response = ApiResponse::success(today, "Daily tasks retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 获取已完成阶段历史
pub async fn get_history(State(state): State<Arc<AppState>>, ctx: RequestContext) -> impl IntoResponse {
    match state.roadmaps.history(&ctx).await {
        Ok(phases) => {
            let response = ApiResponse::success(phases, "Completed phases retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 完成任务，可能连带完成模块与阶段
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<TaskActionRequest>,
) -> impl IntoResponse {
    perform(
        &state,
        &ctx,
        RoadmapAction::CompleteTask {
            task_name: payload.task_name,
        },
    )
    .await
}

/// 开始任务
pub async fn start_task(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<TaskActionRequest>,
) -> impl IntoResponse {
    perform(
        &state,
        &ctx,
        RoadmapAction::StartTask {
            task_name: payload.task_name,
        },
    )
    .await
}

/// 手动结束阶段（所有任务须已完成）
pub async fn finalize_phase(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(phase_id): Path<String>,
) -> impl IntoResponse {
    perform(&state, &ctx, RoadmapAction::FinalizePhase { phase_id }).await
}

/// 手动推进模块
pub async fn advance_module(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path((phase, module)): Path<(usize, usize)>,
) -> impl IntoResponse {
    perform(&state, &ctx, RoadmapAction::AdvanceModule { phase, module }).await
}

/// 从阶段开头重新开始
pub async fn restart_phase(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(phase): Path<usize>,
) -> impl IntoResponse {
    perform(&state, &ctx, RoadmapAction::RestartPhase { phase }).await
}

/// 从模块开头重新开始
pub async fn restart_module(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path((phase, module)): Path<(usize, usize)>,
) -> impl IntoResponse {
    perform(&state, &ctx, RoadmapAction::RestartModule { phase, module }).await
}

/// 从任务处重新开始
pub async fn restart_task(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path((phase, module, task)): Path<(usize, usize, usize)>,
) -> impl IntoResponse {
    perform(&state, &ctx, RoadmapAction::RestartTask { phase, module, task }).await
}

/// 执行路线图操作并返回更新后的快照
async fn perform(state: &AppState, ctx: &RequestContext, action: RoadmapAction) -> axum::response::Response {
    match state.roadmaps.perform(ctx, action).await {
        Ok(update) => {
            let message = update.message.clone();
            let response = ApiResponse::success(update, &message);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
