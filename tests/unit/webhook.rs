use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;
use serde_json::json;

use skillzbloom_backend::routes::webhooks::{IdentityAction, IdentityEvent, interpret};
use skillzbloom_backend::utils::signature::{
    ID_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER, WebhookVerifier,
};

const SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleQ==";

fn signed_headers(verifier: &WebhookVerifier, body: &[u8], timestamp: i64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ID_HEADER, HeaderValue::from_static("msg_2abc"));
    headers.insert(
        TIMESTAMP_HEADER,
        HeaderValue::from_str(&timestamp.to_string()).unwrap(),
    );
    headers.insert(
        SIGNATURE_HEADER,
        HeaderValue::from_str(&verifier.sign("msg_2abc", timestamp, body)).unwrap(),
    );
    headers
}

#[test]
fn signed_user_created_event_is_accepted_and_interpreted() {
    let verifier = WebhookVerifier::new(SECRET).unwrap();
    let body = json!({
        "type": "user.created",
        "data": {
            "id": "user_hook",
            "email_addresses": [{ "id": "idn_1", "email_address": "hook@example.com" }],
            "primary_email_address_id": "idn_1",
            "first_name": "Hook",
            "last_name": null
        }
    })
    .to_string();
    let now = Utc::now();
    let headers = signed_headers(&verifier, body.as_bytes(), now.timestamp());

    verifier.verify_headers(&headers, body.as_bytes(), now).unwrap();

    let event: IdentityEvent = serde_json::from_str(&body).unwrap();
    match interpret(event).unwrap() {
        IdentityAction::Create(profile) => {
            assert_eq!(profile.id, "user_hook");
            assert_eq!(profile.email, "hook@example.com");
            assert_eq!(profile.full_name.as_deref(), Some("Hook"));
        }
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn signature_from_another_secret_is_rejected() {
    let ours = WebhookVerifier::new(SECRET).unwrap();
    let theirs = WebhookVerifier::new("whsec_b3RoZXIta2V5").unwrap();
    let body = br#"{"type":"user.deleted","data":{"id":"user_hook"}}"#;
    let now = Utc::now();
    let headers = signed_headers(&theirs, body, now.timestamp());

    assert!(ours.verify_headers(&headers, body, now).is_err());
}
