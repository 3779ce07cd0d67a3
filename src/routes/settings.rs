use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::AppState;
use crate::db::models::api::ApiResponse;
use crate::db::models::user::{ChangeLearningPathRequest, UpdatePreferencesRequest, UpdateProfileRequest};
use crate::middleware::auth::CurrentUser;
use crate::routes::db_conn;
use crate::services::settings_service::SettingsService;

/// 获取个人资料
pub async fn get_profile(State(state): State<Arc<AppState>>, user: CurrentUser) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SettingsService::profile(&mut conn, &state.roadmaps, &user).await {
        Ok(profile) => {
            let response = ApiResponse::success(profile, "Profile retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 更新个人资料（包括职业目标）
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SettingsService::update_profile(&mut conn, &state.roadmaps, &user, &payload).await {
        Ok(profile) => {
            let response = ApiResponse::success(profile, "Profile updated successfully!");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SettingsService::update_preferences(&mut conn, &user, &payload) {
        Ok(prefs) => {
            let response = ApiResponse::success(prefs, "Preferences saved!");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 切换学习路径：归档并删除当前路线图
pub async fn change_learning_path(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<ChangeLearningPathRequest>,
) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SettingsService::change_learning_path(&mut conn, &state.roadmaps, &user, payload.learning_path).await {
        Ok(profile) => {
            let response = ApiResponse::success(
                profile,
                "Learning path updated! Complete onboarding to generate your new roadmap.",
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn reset_progress(State(state): State<Arc<AppState>>, user: CurrentUser) -> impl IntoResponse {
    match SettingsService::reset_progress(&state.roadmaps, &user).await {
        Ok(_) => {
            let response = ApiResponse::<()>::ok("Progress reset successfully! Redirecting to onboarding...");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// 导出资料与路线图
pub async fn export_data(State(state): State<Arc<AppState>>, user: CurrentUser) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SettingsService::export(&mut conn, &state.roadmaps, &user).await {
        Ok(export) => {
            let response = ApiResponse::success(export, "Data exported successfully!");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn delete_account(State(state): State<Arc<AppState>>, user: CurrentUser) -> impl IntoResponse {
    let mut conn = match db_conn(&state) {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SettingsService::delete_account(&mut conn, &state.roadmaps, &user).await {
        Ok(()) => {
            let response = ApiResponse::<()>::ok("Account deleted successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
