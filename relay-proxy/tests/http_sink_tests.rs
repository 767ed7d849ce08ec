//! HttpSink tests against a local conversion API stand-in

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use relay_core::{translate, Notification, RelayError, TrackPayload};
use relay_proxy::{ConversionSink, HttpSink};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn spawn_api(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();

    let app = Router::new()
        .route(
            "/open_api/v1.3/pixel/track/",
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let token = headers
                            .get("access-token")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        captured.requests.lock().unwrap().push((token, body));
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{}/open_api/v1.3/pixel/track/", addr), captured)
}

fn payload() -> TrackPayload {
    let n: Notification = serde_json::from_value(json!({
        "event": "orders/create",
        "total_price": 5000,
        "currency": "EUR",
        "customer": {"email": "Test@Example.com"}
    }))
    .unwrap();
    TrackPayload::build(&translate(&n, None).unwrap(), "PIXEL1", Utc::now())
}

#[tokio::test]
async fn test_posts_payload_with_access_token() {
    let (endpoint, captured) = spawn_api(StatusCode::OK, json!({"code": 0, "message": "OK"})).await;
    let sink = HttpSink::new(endpoint, 5000).unwrap();

    let response = sink.send("token-123", &payload()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body["message"], "OK");

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.as_deref(), Some("token-123"));
    assert_eq!(requests[0].1["pixel_code"], "PIXEL1");
    assert_eq!(requests[0].1["event"], "Purchase");
    assert_eq!(requests[0].1["properties"]["value"], 50.0);
    assert!(requests[0].1["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_non_success_status_is_rejected() {
    let (endpoint, _) = spawn_api(StatusCode::UNAUTHORIZED, json!({"message": "bad token"})).await;
    let sink = HttpSink::new(endpoint, 5000).unwrap();

    match sink.send("token", &payload()).await {
        Err(RelayError::Rejected { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("bad token"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_business_error_code_is_rejected() {
    let (endpoint, _) =
        spawn_api(StatusCode::OK, json!({"code": 40002, "message": "invalid pixel"})).await;
    let sink = HttpSink::new(endpoint, 5000).unwrap();

    let err = sink.send("token", &payload()).await.unwrap_err();
    assert_eq!(err.code(), "REJECTED");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = HttpSink::new(format!("http://{}/track", addr), 2000).unwrap();
    let err = sink.send("token", &payload()).await.unwrap_err();
    assert_eq!(err.code(), "TRANSPORT_ERROR");
}
