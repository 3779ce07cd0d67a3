use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::models::roadmap::{NewRoadmapArchive, NewUserRoadmap, Roadmap};
use crate::db::repositories::roadmaps::RoadmapRepo;
use crate::error::{AppError, AppResult};

/// Document store holding one current roadmap per user.
#[async_trait]
pub trait RoadmapStore: Send + Sync {
    async fn load(&self, user_id: &str) -> AppResult<Option<Roadmap>>;

    /// Replaces the whole document.
    async fn replace(&self, user_id: &str, roadmap: &Roadmap) -> AppResult<()>;

    /// Copies the document to the archive, stamped with `archived_at`.
    async fn archive(&self, user_id: &str, roadmap: &Roadmap, archived_at: DateTime<Utc>) -> AppResult<()>;

    /// Removes the current document. Returns whether one existed.
    async fn delete(&self, user_id: &str) -> AppResult<bool>;

    /// Removes the current document and every archive.
    async fn purge(&self, user_id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgRoadmapStore {
    pool: DbPool,
}

impl PgRoadmapStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoadmapStore for PgRoadmapStore {
    async fn load(&self, user_id: &str) -> AppResult<Option<Roadmap>> {
        let mut conn = self.pool.get()?;
        let Some(row) = RoadmapRepo::find_by_user(&mut conn, user_id)? else {
            return Ok(None);
        };

        let roadmap = serde_json::from_value(row.document).map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Stored roadmap does not parse; run roadmap_migrate");
            AppError::Serialization(e)
        })?;
        Ok(Some(roadmap))
    }

    async fn replace(&self, user_id: &str, roadmap: &Roadmap) -> AppResult<()> {
        let document = serde_json::to_value(roadmap)?;
        let mut conn = self.pool.get()?;
        RoadmapRepo::upsert(
            &mut conn,
            &NewUserRoadmap {
                user_id,
                document,
                created_at: roadmap.created_at,
                updated_at: roadmap.last_updated,
            },
        )?;
        Ok(())
    }

    async fn archive(&self, user_id: &str, roadmap: &Roadmap, archived_at: DateTime<Utc>) -> AppResult<()> {
        let document = serde_json::to_value(roadmap)?;
        let mut conn = self.pool.get()?;
        RoadmapRepo::insert_archive(
            &mut conn,
            &NewRoadmapArchive {
                id: Uuid::new_v4(),
                user_id,
                document,
                archived_at,
            },
        )?;
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> AppResult<bool> {
        let mut conn = self.pool.get()?;
        Ok(RoadmapRepo::delete(&mut conn, user_id)? > 0)
    }

    async fn purge(&self, user_id: &str) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        RoadmapRepo::delete(&mut conn, user_id)?;
        RoadmapRepo::delete_archives(&mut conn, user_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ArchivedRoadmap {
    pub roadmap: Roadmap,
    pub archived_at: DateTime<Utc>,
}

/// In-process store for tests and local runs without Postgres.
#[derive(Default)]
pub struct MemoryRoadmapStore {
    current: RwLock<HashMap<String, Roadmap>>,
    archives: RwLock<HashMap<String, Vec<ArchivedRoadmap>>>,
    fail_writes: AtomicBool,
}

impl MemoryRoadmapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail as if the database were unreachable.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn archived(&self, user_id: &str) -> Vec<ArchivedRoadmap> {
        self.archives
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(diesel::result::Error::BrokenTransactionManager));
        }
        Ok(())
    }
}

#[async_trait]
impl RoadmapStore for MemoryRoadmapStore {
    async fn load(&self, user_id: &str) -> AppResult<Option<Roadmap>> {
        Ok(self.current.read().await.get(user_id).cloned())
    }

    async fn replace(&self, user_id: &str, roadmap: &Roadmap) -> AppResult<()> {
        self.check_writable()?;
        self.current
            .write()
            .await
            .insert(user_id.to_string(), roadmap.clone());
        Ok(())
    }

    async fn archive(&self, user_id: &str, roadmap: &Roadmap, archived_at: DateTime<Utc>) -> AppResult<()> {
        self.check_writable()?;
        self.archives
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(ArchivedRoadmap {
                roadmap: roadmap.clone(),
                archived_at,
            });
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> AppResult<bool> {
        self.check_writable()?;
        Ok(self.current.write().await.remove(user_id).is_some())
    }

    async fn purge(&self, user_id: &str) -> AppResult<()> {
        self.check_writable()?;
        self.current.write().await.remove(user_id);
        self.archives.write().await.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{AvailableTime, LearningPath};
    use crate::roadmap::instantiate::instantiate;
    use crate::roadmap::templates::TemplateCatalog;

    fn sample() -> Roadmap {
        let catalog = TemplateCatalog::embedded().unwrap();
        instantiate(
            catalog.get(LearningPath::Technology).unwrap(),
            LearningPath::Technology,
            AvailableTime::Minutes60To120,
            "Ship a web app",
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn memory_store_replaces_and_deletes() {
        let store = MemoryRoadmapStore::new();
        assert!(store.load("u1").await.unwrap().is_none());

        let roadmap = sample();
        store.replace("u1", &roadmap).await.unwrap();
        assert_eq!(store.load("u1").await.unwrap(), Some(roadmap.clone()));
        assert!(store.load("u2").await.unwrap().is_none());

        store.archive("u1", &roadmap, Utc::now()).await.unwrap();
        assert_eq!(store.archived("u1").await.len(), 1);

        assert!(store.delete("u1").await.unwrap());
        assert!(!store.delete("u1").await.unwrap());

        store.purge("u1").await.unwrap();
        assert!(store.archived("u1").await.is_empty());
    }

    #[tokio::test]
    async fn failing_writes_leave_documents_alone() {
        let store = MemoryRoadmapStore::new();
        let roadmap = sample();
        store.replace("u1", &roadmap).await.unwrap();

        store.set_fail_writes(true);
        let mut changed = roadmap.clone();
        changed.career_goal = "Something else".to_string();
        assert!(matches!(
            store.replace("u1", &changed).await,
            Err(AppError::Database(_))
        ));
        assert_eq!(store.load("u1").await.unwrap(), Some(roadmap));
    }
}
