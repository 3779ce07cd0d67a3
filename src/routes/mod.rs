pub mod coach;
pub mod health;
pub mod onboarding;
pub mod reflections;
pub mod roadmap;
pub mod settings;
pub mod skills;
pub mod webhooks;

use crate::AppState;
use crate::error::AppError;
use crate::middleware::auth::auth_middleware;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use diesel::{PgConnection, r2d2::{ConnectionManager, PooledConnection}};
use std::sync::Arc;

pub type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

/// 取出连接池连接，失败映射为连接错误
pub fn db_conn(state: &AppState) -> Result<DbConn, AppError> {
    Ok(state.db.get()?)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // 不需要认证的路由
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/webhooks/identity", post(webhooks::identity_webhook))
        .route("/learning-paths", get(onboarding::list_learning_paths));

    // 需要认证的路由
    let protected_routes = Router::new()
        .route("/onboarding", post(onboarding::complete_onboarding))
        .route("/roadmap", get(roadmap::get_roadmap))
        .route("/roadmap/progress", get(roadmap::get_progress))
        .route("/roadmap/today", get(roadmap::get_today))
        .route("/roadmap/history", get(roadmap::get_history))
        .route("/roadmap/tasks/complete", post(roadmap::complete_task))
        .route("/roadmap/tasks/start", post(roadmap::start_task))
        .route("/roadmap/phases/:phase/finalize", post(roadmap::finalize_phase))
        .route("/roadmap/phases/:phase/restart", post(roadmap::restart_phase))
        .route(
            "/roadmap/phases/:phase/modules/:module/advance",
            post(roadmap::advance_module),
        )
        .route(
            "/roadmap/phases/:phase/modules/:module/restart",
            post(roadmap::restart_module),
        )
        .route(
            "/roadmap/phases/:phase/modules/:module/tasks/:task/restart",
            post(roadmap::restart_task),
        )
        .route(
            "/settings/profile",
            get(settings::get_profile).put(settings::update_profile),
        )
        .route("/settings/preferences", put(settings::update_preferences))
        .route("/settings/learning-path", post(settings::change_learning_path))
        .route("/settings/reset-progress", post(settings::reset_progress))
        .route("/settings/export", get(settings::export_data))
        .route("/settings/account", axum::routing::delete(settings::delete_account))
        .route(
            "/reflections",
            get(reflections::list_reflections).post(reflections::create_reflection),
        )
        .route(
            "/reflections/:reflection_id",
            put(reflections::update_reflection).delete(reflections::delete_reflection),
        )
        .route("/skills", get(skills::list_skills).post(skills::create_skill))
        .route(
            "/skills/:skill_id",
            put(skills::update_skill).delete(skills::delete_skill),
        )
        .route("/skills/:skill_id/practice", post(skills::practice_skill))
        .route("/coach/chat", post(coach::chat))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(crate::websocket::create_websocket_routes())
        .with_state(state)
}
