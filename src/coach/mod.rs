pub mod context;
pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::validation::rules::validate_not_blank;

pub use gemini::GeminiClient;

pub const COACH_FAILURE_MESSAGE: &str =
    "Failed to get a response from the AI Coach after multiple retries.";

/// Web source the reply was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachReply {
    pub text: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(
        length(min = 1, max = 2000, message = "Message must be between 1 and 2000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub message: String,
}

/// Chat-completion provider behind the coach.
#[async_trait]
pub trait CoachClient: Send + Sync {
    async fn generate(&self, system_prompt: &str, query: &str) -> AppResult<CoachReply>;
}

/// Used when no provider key is configured.
pub struct DisabledCoach;

#[async_trait]
impl CoachClient for DisabledCoach {
    async fn generate(&self, _system_prompt: &str, _query: &str) -> AppResult<CoachReply> {
        Err(AppError::Config("COACH_API_KEY is not set".to_string()))
    }
}
