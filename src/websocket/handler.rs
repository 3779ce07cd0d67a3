use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{
    AppState,
    error::{AppError, CONNECTIVITY_MESSAGE},
    services::roadmap_service::RoadmapService,
    websocket::feed::RoadmapEvent,
};

/// Browsers cannot set headers on a websocket upgrade, so the session
/// token travels in the query string.
#[derive(Debug, Deserialize)]
pub struct RoadmapStreamQuery {
    pub token: String,
}

/// 处理WebSocket升级请求
pub async fn roadmap_stream(
    ws: WebSocketUpgrade,
    Query(query): Query<RoadmapStreamQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    // 验证认证token
    let claims = state.identity.verify(&query.token).map_err(|e| {
        warn!("WebSocket authentication failed: {}", e);
        e
    })?;
    let user_id = claims.sub;

    info!(user_id = %user_id, "Roadmap stream opened");
    let roadmaps = state.roadmaps.clone();
    Ok(ws.on_upgrade(move |socket| handle_roadmap_socket(socket, roadmaps, user_id)))
}

/// Sends the current document, then every change until either side closes.
pub async fn handle_roadmap_socket(socket: WebSocket, roadmaps: RoadmapService, user_id: String) {
    // 先订阅再读快照，避免漏掉中间的更新
    let mut rx = roadmaps.feed().subscribe(&user_id).await;
    let (mut sender, mut receiver) = socket.split();

    let initial = snapshot(&roadmaps, &user_id).await;
    if send_event(&mut sender, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // 落后太多时直接发送最新快照
                    warn!(user_id = %user_id, skipped, "Roadmap stream lagged; resending snapshot");
                    let latest = snapshot(&roadmaps, &user_id).await;
                    if send_event(&mut sender, &latest).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!(user_id = %user_id, "Roadmap stream closed");
}

async fn snapshot(roadmaps: &RoadmapService, user_id: &str) -> RoadmapEvent {
    match roadmaps.find(user_id).await {
        Ok(Some(roadmap)) => RoadmapEvent::Snapshot(roadmap),
        Ok(None) => RoadmapEvent::Missing,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load roadmap for stream");
            RoadmapEvent::Error {
                message: CONNECTIVITY_MESSAGE.to_string(),
            }
        }
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &RoadmapEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(text) => sender.send(Message::Text(text)).await,
        Err(e) => {
            warn!("Failed to serialize roadmap event: {}", e);
            Ok(())
        }
    }
}
