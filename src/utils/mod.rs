pub mod retry;
pub mod signature;

pub use retry::{RetryConfig, retry_with_backoff};
pub use signature::{SignatureError, WebhookVerifier};
