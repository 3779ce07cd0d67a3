use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use url::Url;

use super::{COACH_FAILURE_MESSAGE, CoachClient, CoachReply, Source};
use crate::config::CoachConfig;
use crate::error::{AppError, AppResult};
use crate::utils::retry::{RetryConfig, retry_with_backoff};

/// `generateContent` client with Google Search grounding.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(config: &CoachConfig, api_key: String) -> AppResult<Self> {
        let base = Url::parse(&config.api_url)
            .map_err(|e| AppError::Config(format!("Invalid COACH_API_URL: {}", e)))?;
        let endpoint = base
            .join(&format!("models/{}:generateContent", config.model))
            .map_err(|e| AppError::Config(format!("Invalid COACH_MODEL: {}", e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            retry: RetryConfig::new(config.max_attempts, config.initial_backoff_ms),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call_once(&self, payload: &serde_json::Value) -> Result<CoachReply, String> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err("rate limited (429)".to_string());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("API call failed with status {}: {}", status.as_u16(), body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {}", e))?;
        parse_reply(body)
    }
}

#[async_trait]
impl CoachClient for GeminiClient {
    async fn generate(&self, system_prompt: &str, query: &str) -> AppResult<CoachReply> {
        let payload = request_payload(system_prompt, query);
        retry_with_backoff(&self.retry, "coach.generate", |_| self.call_once(&payload))
            .await
            .map_err(|e| {
                error!(error = %e, "Coach request exhausted retries");
                AppError::Upstream(COACH_FAILURE_MESSAGE.to_string())
            })
    }
}

pub fn request_payload(system_prompt: &str, query: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": query }] }],
        "tools": [{ "google_search": {} }],
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
    })
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_attributions: Vec<Attribution>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Attribution {
    pub web: Option<WebSource>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// First candidate's text plus its grounded sources. Attributions
/// lacking a uri or a title are dropped.
pub fn parse_reply(body: GenerateResponse) -> Result<CoachReply, String> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| "Received an invalid response structure from the API.".to_string())?;

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "Received an invalid response structure from the API.".to_string())?;

    let sources = candidate
        .grounding_metadata
        .map(|m| m.grounding_attributions)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.web)
        .filter_map(|web| match (web.uri, web.title) {
            (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => Some(Source { uri, title }),
            _ => None,
        })
        .collect();

    Ok(CoachReply { text, sources })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Result<CoachReply, String> {
        parse_reply(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn endpoint_joins_model_path() {
        let config = CoachConfig {
            api_key: None,
            api_url: "https://generativelanguage.googleapis.com/v1beta/".into(),
            model: "gemini-2.5-flash".into(),
            max_attempts: 3,
            initial_backoff_ms: 1000,
        };
        let client = GeminiClient::new(&config, "k".into()).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn incomplete_sources_are_dropped() {
        let reply = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Focus on HTTP basics." }] },
                "groundingMetadata": { "groundingAttributions": [
                    { "web": { "uri": "https://developer.mozilla.org", "title": "MDN" } },
                    { "web": { "uri": "https://example.com" } },
                    { "web": { "title": "No link" } },
                    {}
                ]}
            }]
        }))
        .unwrap();

        assert_eq!(reply.text, "Focus on HTTP basics.");
        assert_eq!(
            reply.sources,
            vec![Source {
                uri: "https://developer.mozilla.org".into(),
                title: "MDN".into()
            }]
        );
    }

    #[test]
    fn missing_text_is_an_error() {
        assert!(parse(json!({ "candidates": [] })).is_err());
        assert!(parse(json!({ "candidates": [{ "content": { "parts": [] } }] })).is_err());
    }

    #[test]
    fn payload_enables_search_grounding() {
        let payload = request_payload("sys", "hi");
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(payload["tools"][0].get("google_search").is_some());
    }
}
