use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::Router;
use chumsai_core::SearchParams;
use chumsai_line::{sign_body, LineClient};
use chumsai_source::{CsvSource, DataSource};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::super::test_support::{csv_state, MAP_URL, SECRET};
use super::super::{build_app, AppState};
use super::*;

const SITES_CSV: &str = "chumsa,lat,lng\n\
                         ชุมสายช้างเผือก,18.8000,98.9800\n\
                         ชุมสายช้างเผือก,18.8100,98.9800\n\
                         ชุมสายลำพูน,18.5800,99.0100\n";

fn location_event(latitude: f64, longitude: f64) -> Value {
    json!({
        "destination": "U0000",
        "events": [{
            "type": "message",
            "replyToken": "rt-location",
            "source": { "type": "user", "userId": "U1" },
            "message": {
                "id": "m1",
                "type": "location",
                "latitude": latitude,
                "longitude": longitude
            }
        }]
    })
}

fn text_event(text: &str) -> Value {
    json!({
        "events": [{
            "type": "message",
            "replyToken": "rt-text",
            "message": { "id": "m2", "type": "text", "text": text }
        }]
    })
}

fn signed_request(body: &[u8], signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body.to_vec())).expect("request")
}

async fn post_event(app: Router, payload: &Value) -> (StatusCode, String) {
    let body = serde_json::to_vec(payload).expect("serialize");
    let signature = sign_body(SECRET, &body);
    let response = app
        .oneshot(signed_request(&body, Some(&signature)))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn mount_reply(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/bot/message/reply"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn sent_replies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|req| serde_json::from_slice(&req.body).expect("reply body is json"))
        .collect()
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let (state, _file) = csv_state(SITES_CSV, "http://127.0.0.1:9");
    let body = serde_json::to_vec(&location_event(18.795, 98.98)).unwrap();

    let response = build_app(state)
        .oneshot(signed_request(&body, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).expect("json error body");
    assert_eq!(json["error"]["code"], "invalid_signature");
}

#[tokio::test]
async fn wrong_signature_is_rejected() {
    let (state, _file) = csv_state(SITES_CSV, "http://127.0.0.1:9");
    let body = serde_json::to_vec(&location_event(18.795, 98.98)).unwrap();
    let forged = sign_body("someone-else", &body);

    let response = build_app(state)
        .oneshot(signed_request(&body, Some(&forged)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_with_valid_signature_is_bad_request() {
    let (state, _file) = csv_state(SITES_CSV, "http://127.0.0.1:9");
    let body = b"{not json";
    let signature = sign_body(SECRET, body);

    let response = build_app(state)
        .oneshot(signed_request(body, Some(&signature)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).expect("json error body");
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn verification_ping_without_events_is_acknowledged() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, 0).await;
    let (state, _file) = csv_state(SITES_CSV, &server.uri());

    let (status, body) = post_event(build_app(state), &json!({ "events": [] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn location_message_replies_with_ranked_sites() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, 1).await;
    let (state, _file) = csv_state(SITES_CSV, &server.uri());

    let (status, body) = post_event(build_app(state), &location_event(18.795, 98.98)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let replies = sent_replies(&server).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["replyToken"], "rt-location");
    let message = &replies[0]["messages"][0];
    assert_eq!(message["type"], "flex");
    assert_eq!(message["altText"], "พบ 1 ชุมสายใกล้เคียง");
    let card = &message["contents"]["body"]["contents"][0];
    assert_eq!(card["contents"][0]["text"], "🥇 ชุมสายช้างเผือก");
    assert_eq!(card["contents"][2]["contents"][1]["text"], "จำนวน: 2 จุด");
}

#[tokio::test]
async fn location_far_from_every_site_gets_not_found_bubble() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, 1).await;
    let (state, _file) = csv_state(SITES_CSV, &server.uri());

    post_event(build_app(state), &location_event(13.7563, 100.5018)).await;

    let replies = sent_replies(&server).await;
    let message = &replies[0]["messages"][0];
    assert_eq!(message["altText"], "ไม่พบชุมสายใกล้เคียง");
    assert_eq!(
        message["contents"]["footer"]["contents"][0]["action"]["uri"],
        MAP_URL
    );
}

#[tokio::test]
async fn unreadable_source_degrades_to_not_found() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, 1).await;
    let dir = tempfile::tempdir().expect("temp dir");
    let line = LineClient::with_base_url("channel-token", 5, "test-agent", &server.uri())
        .expect("line client");
    let state = AppState::new(
        DataSource::Csv(CsvSource::new(dir.path().join("missing.csv"))),
        line,
        SECRET,
        SearchParams::default(),
        MAP_URL,
    );

    let (status, _) = post_event(build_app(state), &location_event(18.795, 98.98)).await;

    assert_eq!(status, StatusCode::OK);
    let replies = sent_replies(&server).await;
    assert_eq!(replies[0]["messages"][0]["altText"], "ไม่พบชุมสายใกล้เคียง");
}

#[tokio::test]
async fn text_message_gets_help_reply() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, 1).await;
    let (state, _file) = csv_state(SITES_CSV, &server.uri());

    post_event(build_app(state), &text_event("help")).await;

    let replies = sent_replies(&server).await;
    assert_eq!(replies[0]["replyToken"], "rt-text");
    let text = replies[0]["messages"][0]["text"].as_str().expect("text reply");
    assert!(text.starts_with("📖 วิธีใช้งาน:"));
}

#[tokio::test]
async fn reply_failure_still_acknowledges_webhook() {
    let server = MockServer::start().await;
    mount_reply(&server, 500, 1).await;
    let (state, _file) = csv_state(SITES_CSV, &server.uri());

    let (status, body) = post_event(build_app(state), &text_event("สวัสดี")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn unsupported_message_kinds_are_ignored() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, 0).await;
    let (state, _file) = csv_state(SITES_CSV, &server.uri());

    let payload = json!({
        "events": [
            { "type": "follow", "replyToken": "rt-follow" },
            {
                "type": "message",
                "replyToken": "rt-sticker",
                "message": { "id": "s", "type": "sticker", "packageId": "1", "stickerId": "1" }
            }
        ]
    });
    let (status, _) = post_event(build_app(state), &payload).await;

    assert_eq!(status, StatusCode::OK);
}
