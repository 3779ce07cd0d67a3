pub mod redis;

use tracing::{debug, warn};

use crate::roadmap::progress::DailyTasks;

/// 每日任务视图缓存
/// 缓存失败只记录日志，不影响请求
#[derive(Clone)]
pub struct DailyTaskCache {
    client: Option<::redis::Client>,
    ttl: u64,
}

impl DailyTaskCache {
    pub fn new(client: ::redis::Client, ttl: u64) -> Self {
        Self {
            client: Some(client),
            ttl,
        }
    }

    /// 不存储任何内容的缓存
    pub fn disabled() -> Self {
        Self { client: None, ttl: 0 }
    }

    pub fn key(user_id: &str) -> String {
        format!("daily_tasks:{}", user_id)
    }

    pub async fn get(&self, user_id: &str) -> Option<DailyTasks> {
        let client = self.client.as_ref()?;
        match self::redis::get_cache::<DailyTasks>(client, &Self::key(user_id)).await {
            Ok(Some(view)) => Some(view),
            Ok(None) => {
                debug!(user_id = %user_id, "Daily task cache miss");
                None
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Daily task cache read failed");
                None
            }
        }
    }

    pub async fn set(&self, user_id: &str, view: &DailyTasks) {
        let Some(client) = self.client.as_ref() else {
            return;
        };
        if let Err(e) = self::redis::set_cache(client, &Self::key(user_id), view, self.ttl).await {
            warn!(user_id = %user_id, error = %e, "Daily task cache write failed");
        }
    }

    pub async fn invalidate(&self, user_id: &str) {
        let Some(client) = self.client.as_ref() else {
            return;
        };
        if let Err(e) = self::redis::delete_cache(client, &Self::key(user_id)).await {
            warn!(user_id = %user_id, error = %e, "Daily task cache invalidation failed");
        }
    }
}
