pub mod feed;
pub mod handler;

pub use feed::{RoadmapEvent, RoadmapFeed};
pub use handler::roadmap_stream;

use crate::AppState;
use axum::{Router, routing::get};
use std::sync::Arc;

pub fn create_websocket_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws/roadmap", get(roadmap_stream))
}
