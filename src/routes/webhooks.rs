use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;
use crate::db::models::api::ApiResponse;
use crate::error::AppError;
use crate::routes::db_conn;
use crate::services::users_service::{IdentityProfile, UsersService};

/// 身份提供方事件信封
#[derive(Debug, Deserialize)]
pub struct IdentityEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct UserData {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    primary_email_address_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    id: Option<String>,
    email_address: String,
}

#[derive(Debug, PartialEq)]
pub enum IdentityAction {
    Create(IdentityProfile),
    Delete(String),
    Ignore(String),
}

pub fn interpret(event: IdentityEvent) -> Result<IdentityAction, AppError> {
    match event.event_type.as_str() {
        "user.created" => {
            let data: UserData = serde_json::from_value(event.data)?;
            // 优先使用 primary email，否则取第一个
            let email = data
                .primary_email_address_id
                .as_deref()
                .and_then(|primary| {
                    data.email_addresses
                        .iter()
                        .find(|e| e.id.as_deref() == Some(primary))
                })
                .or_else(|| data.email_addresses.first())
                .map(|e| e.email_address.clone())
                .unwrap_or_default();

            let name = [data.first_name.as_deref(), data.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            Ok(IdentityAction::Create(IdentityProfile {
                id: data.id,
                email,
                full_name: Some(name).filter(|n| !n.is_empty()),
                profile_picture: data.image_url.filter(|u| !u.is_empty()),
            }))
        }
        "user.deleted" => {
            let id = event
                .data
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| AppError::validation("Missing user id in event"))?;
            Ok(IdentityAction::Delete(id.to_string()))
        }
        other => Ok(IdentityAction::Ignore(other.to_string())),
    }
}

/// 身份提供方 webhook（svix 签名）
pub async fn identity_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(verifier) = state.webhooks.as_ref() else {
        return AppError::Config("IDENTITY_WEBHOOK_SECRET is not configured".to_string()).into_response();
    };
    if let Err(err) = verifier.verify_headers(&headers, &body, Utc::now()) {
        return AppError::from(err).into_response();
    }

    let event: IdentityEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "Malformed webhook payload");
            return AppError::validation("Malformed webhook payload").into_response();
        }
    };

    let action = match interpret(event) {
        Ok(action) => action,
        Err(err) => return err.into_response(),
    };

    let result = match action {
        IdentityAction::Create(profile) => db_conn(&state).and_then(|mut conn| {
            UsersService::create_if_missing(&mut conn, &profile).map(|_| ())
        }),
        IdentityAction::Delete(user_id) => match db_conn(&state) {
            Ok(mut conn) => UsersService::delete_account(&mut conn, &state.roadmaps, &user_id).await,
            Err(err) => Err(err),
        },
        IdentityAction::Ignore(event_type) => {
            info!(event_type = %event_type, "Ignoring webhook event");
            Ok(())
        }
    };

    match result {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::<()>::ok("Webhook processed"))).into_response(),
        Err(err) => err.into_response(),
    }
}
