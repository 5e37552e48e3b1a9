// Integration tests for the HTTP API
//
// Requests go through the full router (extractors, handlers, error mapping)
// against the in-memory control plane.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use common::FakeControlPlane;
use http_body_util::BodyExt;
use openvidu_bridge::{
    create_router, AppState, OpenVidu, RegistrySync, UnknownKeys, WebhookDispatcher,
    WebhookSubscriber,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    fake: Arc<FakeControlPlane>,
    router: Router,
}

impl TestApp {
    fn new(unknown_keys: UnknownKeys) -> Self {
        let fake = FakeControlPlane::new();
        let openvidu = Arc::new(OpenVidu::new(fake.clone()));
        let subscribers: Vec<Arc<dyn WebhookSubscriber>> =
            vec![Arc::new(RegistrySync::new(Arc::clone(&openvidu))) as Arc<dyn WebhookSubscriber>];
        let webhooks = Arc::new(WebhookDispatcher::new(subscribers, Duration::from_secs(5)));

        let router = create_router(AppState::new(openvidu, webhooks, unknown_keys));
        Self { fake, router }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    async fn call_raw(&self, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    async fn token(&self, session: Value) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/openvidu/token",
            Some(json!({"session": session, "tokenOptions": {"role": "PUBLISHER"}})),
        )
        .await
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(UnknownKeys::Ignore);

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_token_creates_session_once() {
    let app = TestApp::new(UnknownKeys::Ignore);

    let (status, body) = app.token(json!({"customSessionId": "standup"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().unwrap().starts_with("tok_"));

    let (status, _) = app.token(json!({"customSessionId": "standup"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.fake.calls("create_session"), 1);
    assert_eq!(app.fake.calls("create_token"), 2);

    let (status, body) = app.call(Method::GET, "/openvidu/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(body["sessions"][0]["sessionId"], "standup");
}

#[tokio::test]
async fn test_token_rejects_bad_options() {
    let app = TestApp::new(UnknownKeys::Ignore);

    let (status, body) = app.token(json!({"mediaMode": "BROADCAST"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");
    assert_eq!(app.fake.calls("create_session"), 0);
}

#[tokio::test]
async fn test_unknown_keys_policy() {
    let lenient = TestApp::new(UnknownKeys::Ignore);
    let (status, _) = lenient.token(json!({"customSessionId": "a", "colour": "blue"})).await;
    assert_eq!(status, StatusCode::OK);

    let strict = TestApp::new(UnknownKeys::Reject);
    let (status, body) = strict.token(json!({"customSessionId": "a", "colour": "blue"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let app = TestApp::new(UnknownKeys::Ignore);

    let (status, body) = app.call(Method::GET, "/openvidu/session/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "SessionNotFound");

    let (status, _) = app
        .call(Method::GET, "/openvidu/session/ghost/connections", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, "/openvidu/session/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_publish_flow() {
    let app = TestApp::new(UnknownKeys::Ignore);
    app.token(json!({"customSessionId": "cams"})).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/session/cams/publish",
            Some(json!({"rtspUri": "rtsp://cam.local/live", "typeOfVideo": "SCREEN"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let connection_id = body["connection"]["connectionId"].as_str().unwrap().to_string();
    let stream_id = body["connection"]["publishers"][0]["streamId"]
        .as_str()
        .unwrap()
        .to_string();

    let (_, body) = app
        .call(Method::GET, "/openvidu/session/cams/connections", None)
        .await;
    assert_eq!(body["connections"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/openvidu/session/cams/stream/{}", stream_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unpublished"], true);

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/openvidu/session/cams/connection/{}", connection_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disconnected"], true);

    let (status, body) = app
        .call(Method::DELETE, "/openvidu/session/cams/connection/con_gone", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ConnectionNotFound");
}

#[tokio::test]
async fn test_publish_validation() {
    let app = TestApp::new(UnknownKeys::Ignore);

    // Unknown session wins over malformed options
    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/session/ghost/publish",
            Some(json!({"typeOfVideo": "HOLOGRAM"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "SessionNotFound");

    app.token(json!({"customSessionId": "cams"})).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/session/cams/publish",
            Some(json!({"rtspUri": "rtsp://cam.local/live", "typeOfVideo": "HOLOGRAM"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "StreamTypeInvalid");

    let (status, body) = app
        .call(Method::POST, "/openvidu/session/cams/publish", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");
    assert_eq!(app.fake.calls("publish"), 0);
}

#[tokio::test]
async fn test_remote_failure_maps_to_bad_gateway() {
    let app = TestApp::new(UnknownKeys::Ignore);
    app.token(json!({"customSessionId": "room"})).await;
    app.fake.fail("close_session");

    let (status, body) = app.call(Method::DELETE, "/openvidu/session/room", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "OpenViduException");
    assert_eq!(body["status"], 500);

    // Session is still cached after the failed close
    let (status, _) = app.call(Method::GET, "/openvidu/session/room", None).await;
    assert_eq!(status, StatusCode::OK);

    app.fake.recover("close_session");
    let (status, body) = app.call(Method::DELETE, "/openvidu/session/room", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closed"], true);
}

#[tokio::test]
async fn test_fetch_endpoints() {
    let app = TestApp::new(UnknownKeys::Ignore);
    app.token(json!({"customSessionId": "room"})).await;
    app.fake.join("room", "con_remote");

    let (status, body) = app.call(Method::POST, "/openvidu/session/room/fetch", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasChanges"], true);
    assert_eq!(body["session"]["connections"][0]["connectionId"], "con_remote");

    let (_, body) = app.call(Method::POST, "/openvidu/session/room/fetch", None).await;
    assert_eq!(body["hasChanges"], false);

    let (status, body) = app.call(Method::POST, "/openvidu/sessions/fetch", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasChanges"], false);
}

#[tokio::test]
async fn test_recording_endpoints() {
    let app = TestApp::new(UnknownKeys::Ignore);
    app.token(json!({"customSessionId": "s1"})).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/recordings/start",
            Some(json!({"sessionId": "s1", "outputMode": "COMPOSED"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recording"]["id"], "rec1");
    assert_eq!(body["recording"]["status"], "starting");

    let (_, body) = app.call(Method::GET, "/openvidu/session/s1/recording", None).await;
    assert_eq!(body["isBeingRecording"], true);

    let (status, body) = app
        .call(Method::POST, "/openvidu/recordings/stop/rec1", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recording"]["status"], "stopped");

    let (_, body) = app.call(Method::GET, "/openvidu/session/s1/recording", None).await;
    assert_eq!(body["isBeingRecording"], false);

    let (status, body) = app.call(Method::DELETE, "/openvidu/recordings/rec1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recording"], true);

    let (status, body) = app.call(Method::GET, "/openvidu/recordings/rec1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "RecordingNotFound");
}

#[tokio::test]
async fn test_recording_requires_session() {
    let app = TestApp::new(UnknownKeys::Ignore);

    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/recordings/start",
            Some(json!({"outputMode": "COMPOSED"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");
}

#[tokio::test]
async fn test_signal() {
    let app = TestApp::new(UnknownKeys::Ignore);
    app.token(json!({"customSessionId": "room"})).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/signal",
            Some(json!({"session": "room", "type": "chat", "data": "hello"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], true);

    let (status, _) = app
        .call(Method::POST, "/openvidu/signal", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/signal",
            Some(json!({"session": "room", "to": ["con_ghost"]})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ConnectionNotFound");
}

#[tokio::test]
async fn test_webhook_evicts_destroyed_session() {
    let app = TestApp::new(UnknownKeys::Ignore);
    app.token(json!({"customSessionId": "room"})).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/webhook",
            Some(json!({"event": "sessionDestroyed", "sessionId": "room", "reason": "sessionClosedByServer"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let mut gone = false;
    for _ in 0..100 {
        let (status, _) = app.call(Method::GET, "/openvidu/session/room", None).await;
        if status == StatusCode::NOT_FOUND {
            gone = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(gone, "Session should be evicted after sessionDestroyed");
}

#[tokio::test]
async fn test_webhook_rejects_malformed_payload() {
    let app = TestApp::new(UnknownKeys::Ignore);

    let (status, body) = app
        .call(Method::POST, "/openvidu/webhook", Some(json!({"sessionId": "room"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let app = TestApp::new(UnknownKeys::Ignore);

    // Wrong shape for the session options
    let (status, body) = app
        .call(
            Method::POST,
            "/openvidu/token",
            Some(json!({"session": "not-an-object"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");
    assert!(body["message"].as_str().unwrap().contains("session"));

    // Not JSON at all
    let (status, body) = app
        .call_raw("/openvidu/recordings/start", "application/json", "{not json")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");

    // JSON sent without the content type
    let (status, body) = app
        .call_raw("/openvidu/signal", "text/plain", r#"{"session": "room"}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidArgument");

    assert_eq!(app.fake.calls("create_session"), 0);
}
