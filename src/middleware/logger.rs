use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// 请求ID头部名称
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn logger<B>(mut req: Request<B>, next: Next<B>) -> Response {
    // 复用客户端的请求ID，否则生成新的
    let request_id = get_or_generate_request_id(req.headers());
    req.extensions_mut().insert(RequestId(request_id.clone()));
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    // 处理请求
    let mut response = next.run(req).await;
    let status = response.status().as_u16();
    let elapsed = start.elapsed().as_millis();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    if status >= 500 {
        warn!(request_id = %request_id, method = %method, uri = %uri, status = status, elapsed_ms = elapsed, "Request failed");
    } else {
        info!(request_id = %request_id, method = %method, uri = %uri, status = status, elapsed_ms = elapsed, "Request log");
    }
    response
}

/// 获取或生成请求ID
fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_request_id_is_reused() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(get_or_generate_request_id(&headers), "abc-123");
    }

    #[test]
    fn missing_request_id_is_generated() {
        let id = get_or_generate_request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
