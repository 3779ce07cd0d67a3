pub mod cache;
pub mod coach;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod roadmap;
pub mod routes;
pub mod schema;
pub mod services;
pub mod utils;
pub mod validation;
pub mod websocket;

use crate::cache::DailyTaskCache;
use crate::coach::{CoachClient, DisabledCoach, GeminiClient};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::middleware::auth::IdentityVerifier;
use crate::roadmap::{PgRoadmapStore, TemplateCatalog};
use crate::services::roadmap_service::RoadmapService;
use crate::utils::signature::WebhookVerifier;
use crate::websocket::RoadmapFeed;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub redis: redis::Client,
    pub config: Arc<Config>,
    pub roadmaps: RoadmapService,
    pub catalog: Arc<TemplateCatalog>,
    pub identity: Arc<IdentityVerifier>,
    pub webhooks: Option<WebhookVerifier>,
    pub coach: Arc<dyn CoachClient>,
}

impl AppState {
    pub fn new(db: DbPool, redis: redis::Client, config: Config) -> AppResult<Self> {
        let roadmap_config = config.roadmap();
        let cache = DailyTaskCache::new(redis.clone(), roadmap_config.daily_cache_ttl);
        let store = Arc::new(PgRoadmapStore::new(db.clone()));
        let roadmaps = RoadmapService::new(
            store,
            RoadmapFeed::default(),
            cache,
            roadmap_config.daily_task_limit,
        );

        let identity_config = config.identity();
        let identity = Arc::new(IdentityVerifier::from_config(&identity_config)?);
        let webhooks = match identity_config.webhook_secret.as_deref() {
            Some(secret) => Some(WebhookVerifier::new(secret).map_err(|e| {
                crate::error::AppError::Config(format!("IDENTITY_WEBHOOK_SECRET: {}", e))
            })?),
            None => None,
        };

        let coach_config = config.coach();
        let coach: Arc<dyn CoachClient> = match coach_config.api_key.clone() {
            Some(key) => Arc::new(GeminiClient::new(&coach_config, key)?),
            None => {
                tracing::warn!("COACH_API_KEY not set; coach requests will fail");
                Arc::new(DisabledCoach)
            }
        };

        Ok(Self {
            db,
            redis,
            config: Arc::new(config),
            roadmaps,
            catalog: Arc::new(TemplateCatalog::embedded()?),
            identity,
            webhooks,
            coach,
        })
    }
}

pub fn init_tracing(config: &Config) {
    let logging = config.logging();
    let level_filter = match logging.level.as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };

    // RUST_LOG 优先，其次是 LOG_LEVEL
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_filter));

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
