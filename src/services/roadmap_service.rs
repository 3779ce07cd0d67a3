use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::DailyTaskCache;
use crate::db::models::api::error_codes;
use crate::db::models::roadmap::Roadmap;
use crate::error::{AppError, AppResult};
use crate::roadmap::progress::{self, CompletedPhase, DailyTasks, RoadmapProgress};
use crate::roadmap::progression::{self, Outcome, RoadmapAction, Transition};
use crate::roadmap::store::RoadmapStore;
use crate::services::context::RequestContext;
use crate::websocket::feed::{RoadmapEvent, RoadmapFeed};

/// Result of a progression action, returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub roadmap: Roadmap,
    pub outcome: Outcome,
    pub message: String,
    pub roadmap_completed: bool,
}

/// Owns every read and write of the current roadmap document.
/// Each write publishes to the feed and drops the cached daily view.
#[derive(Clone)]
pub struct RoadmapService {
    store: Arc<dyn RoadmapStore>,
    feed: RoadmapFeed,
    cache: DailyTaskCache,
    daily_limit: usize,
}

impl RoadmapService {
    pub fn new(
        store: Arc<dyn RoadmapStore>,
        feed: RoadmapFeed,
        cache: DailyTaskCache,
        daily_limit: usize,
    ) -> Self {
        Self {
            store,
            feed,
            cache,
            daily_limit,
        }
    }

    pub fn feed(&self) -> &RoadmapFeed {
        &self.feed
    }

    pub async fn find(&self, user_id: &str) -> AppResult<Option<Roadmap>> {
        self.store.load(user_id).await
    }

    /// Current document, or `ROADMAP_NOT_FOUND` when the user has not onboarded.
    pub async fn current(&self, ctx: &RequestContext) -> AppResult<Roadmap> {
        self.load_required(&ctx.user_id).await
    }

    pub async fn progress(&self, ctx: &RequestContext) -> AppResult<RoadmapProgress> {
        let roadmap = self.load_required(&ctx.user_id).await?;
        Ok(progress::roadmap_progress(&roadmap))
    }

    pub async fn history(&self, ctx: &RequestContext) -> AppResult<Vec<CompletedPhase>> {
        let roadmap = self.load_required(&ctx.user_id).await?;
        Ok(progress::completed_phases(&roadmap))
    }

    pub async fn today(&self, ctx: &RequestContext) -> AppResult<DailyTasks> {
        if let Some(view) = self.cache.get(&ctx.user_id).await {
            return Ok(view);
        }

        let roadmap = self.load_required(&ctx.user_id).await?;
        let view = progress::daily_tasks(&roadmap, self.daily_limit);
        self.cache.set(&ctx.user_id, &view).await;
        Ok(view)
    }

    /// Runs one progression action: load, transition on a copy, one replace.
    /// A failed transition writes nothing.
    pub async fn perform(&self, ctx: &RequestContext, action: RoadmapAction) -> AppResult<ProgressUpdate> {
        let current = self.load_required(&ctx.user_id).await?;

        let Transition { roadmap, outcome } =
            progression::apply(&current, &action, Utc::now()).map_err(|e| {
                warn!(
                    user_id = %ctx.user_id,
                    action = action.name(),
                    error = %e,
                    "Roadmap action rejected"
                );
                AppError::from(e)
            })?;

        self.commit(&ctx.user_id, &roadmap).await?;

        info!(
            user_id = %ctx.user_id,
            request_id = ?ctx.request_id,
            action = action.name(),
            outcome = ?outcome,
            "Roadmap updated"
        );

        Ok(ProgressUpdate {
            message: outcome.message(),
            roadmap_completed: outcome.roadmap_completed(),
            outcome,
            roadmap,
        })
    }

    /// Stores a freshly instantiated roadmap, replacing any existing one.
    pub async fn install(&self, user_id: &str, roadmap: &Roadmap) -> AppResult<()> {
        self.commit(user_id, roadmap).await?;
        info!(user_id = %user_id, path = %roadmap.learning_path, "Roadmap created");
        Ok(())
    }

    /// Writes a new career goal into the current document, if one exists.
    pub async fn update_career_goal(&self, user_id: &str, goal: &str) -> AppResult<Option<Roadmap>> {
        let Some(mut roadmap) = self.store.load(user_id).await? else {
            return Ok(None);
        };
        roadmap.career_goal = goal.trim().to_string();
        roadmap.last_updated = Utc::now();
        self.commit(user_id, &roadmap).await?;
        Ok(Some(roadmap))
    }

    /// Archives the current document, then deletes it.
    /// Returns whether a document existed.
    pub async fn archive_and_clear(&self, user_id: &str) -> AppResult<bool> {
        let Some(roadmap) = self.store.load(user_id).await? else {
            return Ok(false);
        };
        self.store.archive(user_id, &roadmap, Utc::now()).await?;
        info!(user_id = %user_id, title = %roadmap.title, "Roadmap archived");
        self.clear(user_id).await
    }

    pub async fn clear(&self, user_id: &str) -> AppResult<bool> {
        let existed = self.store.delete(user_id).await?;
        self.after_delete(user_id).await;
        Ok(existed)
    }

    /// Drops the current document and every archive.
    pub async fn purge(&self, user_id: &str) -> AppResult<()> {
        self.store.purge(user_id).await?;
        self.after_delete(user_id).await;
        Ok(())
    }

    async fn load_required(&self, user_id: &str) -> AppResult<Roadmap> {
        self.store.load(user_id).await?.ok_or_else(|| {
            AppError::not_found_with_code("Roadmap", error_codes::ROADMAP_NOT_FOUND)
        })
    }

    async fn commit(&self, user_id: &str, roadmap: &Roadmap) -> AppResult<()> {
        if let Err(e) = self.store.replace(user_id, roadmap).await {
            error!(user_id = %user_id, error = %e, "Failed to write roadmap");
            return Err(e);
        }
        self.cache.invalidate(user_id).await;
        self.feed
            .publish(user_id, RoadmapEvent::Updated(roadmap.clone()))
            .await;
        Ok(())
    }

    async fn after_delete(&self, user_id: &str) {
        self.cache.invalidate(user_id).await;
        self.feed.publish(user_id, RoadmapEvent::Deleted).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{AvailableTime, LearningPath};
    use crate::db::models::roadmap::ProgressStatus;
    use crate::roadmap::instantiate::instantiate;
    use crate::roadmap::store::MemoryRoadmapStore;
    use crate::roadmap::templates::TemplateCatalog;

    fn service(store: Arc<MemoryRoadmapStore>) -> RoadmapService {
        RoadmapService::new(store, RoadmapFeed::default(), DailyTaskCache::disabled(), 3)
    }

    fn roadmap() -> Roadmap {
        let catalog = TemplateCatalog::embedded().unwrap();
        let template = catalog.get(LearningPath::Technology).unwrap();
        instantiate(
            template,
            LearningPath::Technology,
            AvailableTime::Minutes30To60,
            "Become a backend engineer",
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn missing_document_maps_to_roadmap_not_found() {
        let svc = service(Arc::new(MemoryRoadmapStore::new()));
        let err = svc.current(&RequestContext::new("u1")).await.unwrap_err();
        assert_eq!(err.code(), Some(error_codes::ROADMAP_NOT_FOUND));
    }

    #[tokio::test]
    async fn completing_a_task_writes_and_publishes() {
        let store = Arc::new(MemoryRoadmapStore::new());
        let svc = service(store.clone());
        let ctx = RequestContext::new("u1");
        let doc = roadmap();
        let first_task = doc.phases[0].modules[0].tasks[0].name.clone();
        svc.install("u1", &doc).await.unwrap();

        let mut rx = svc.feed().subscribe("u1").await;
        let update = svc
            .perform(&ctx, RoadmapAction::CompleteTask { task_name: first_task.clone() })
            .await
            .unwrap();

        assert!(matches!(update.outcome, Outcome::TaskCompleted { .. }));
        let stored = store.load("u1").await.unwrap().unwrap();
        assert_eq!(stored.phases[0].modules[0].tasks[0].status, ProgressStatus::Completed);
        assert!(matches!(rx.recv().await.unwrap(), RoadmapEvent::Updated(_)));
    }

    #[tokio::test]
    async fn rejected_action_leaves_document_unchanged() {
        let store = Arc::new(MemoryRoadmapStore::new());
        let svc = service(store.clone());
        let doc = roadmap();
        svc.install("u1", &doc).await.unwrap();

        let err = svc
            .perform(
                &RequestContext::new("u1"),
                RoadmapAction::CompleteTask { task_name: "No such task".into() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(error_codes::TASK_NOT_FOUND));
        assert_eq!(store.load("u1").await.unwrap().unwrap(), doc);
    }

    #[tokio::test]
    async fn archive_and_clear_keeps_a_copy() {
        let store = Arc::new(MemoryRoadmapStore::new());
        let svc = service(store.clone());
        svc.install("u1", &roadmap()).await.unwrap();

        assert!(svc.archive_and_clear("u1").await.unwrap());
        assert!(store.load("u1").await.unwrap().is_none());
        assert_eq!(store.archived("u1").await.len(), 1);
        assert!(!svc.archive_and_clear("u1").await.unwrap());
    }
}
