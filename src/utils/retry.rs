use std::future::Future;
use std::time::Duration;

/// 重试配置
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
    /// 初始延迟（毫秒）
    pub initial_delay_ms: u64,
    /// 延迟倍数（指数退避）
    pub delay_multiplier: f64,
    /// 最大延迟（毫秒）
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            delay_multiplier: 2.0,
            max_delay_ms: 8000,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            ..Default::default()
        }
    }

    /// Delay after the failed attempt with 0-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.delay_multiplier.powi(attempt as i32);
        let ms = (self.initial_delay_ms as f64 * factor) as u64;
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}

/// 执行带重试的操作
///
/// `operation` receives the 0-based attempt number. The last error is
/// returned once every attempt has failed.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!("Operation '{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) if attempt + 1 >= attempts => {
                tracing::warn!("Operation '{}' failed on final attempt {}: {}", operation_name, attempt + 1, e);
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for(attempt);
                tracing::warn!("Operation '{}' failed on attempt {}: {}", operation_name, attempt + 1, e);
                tracing::debug!("Waiting {}ms before retry {} for operation '{}'", delay.as_millis(), attempt + 2, operation_name);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
