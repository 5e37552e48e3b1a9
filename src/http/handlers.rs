use super::extract::{ApiJson, ApiPath};
use super::state::AppState;
use crate::builders::{
    Options, PublishStreamBuilder, RecordingPropertiesBuilder, SessionPropertiesBuilder,
    SignalPropertiesBuilder, TokenOptionsBuilder,
};
use crate::error::OpenViduError;
use crate::recording::Recording;
use crate::session::{Connection, Session};
use crate::webhook::WebhookEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

type ApiResult<T> = Result<Json<T>, OpenViduError>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenRequest {
    /// Session creation options (mediaMode, recordingMode, customSessionId, ...)
    #[serde(default)]
    pub session: Options,

    /// Token options (role, data, kurentoOptions)
    #[serde(default)]
    pub token_options: Options,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Session,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    pub connections: Vec<Connection>,
}

#[derive(Debug, Serialize)]
pub struct ClosedResponse {
    pub closed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub session: Session,
    pub has_changes: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchAllResponse {
    pub has_changes: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStatusResponse {
    pub is_being_recording: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub connection: Connection,
}

#[derive(Debug, Serialize)]
pub struct UnpublishedResponse {
    pub unpublished: bool,
}

#[derive(Debug, Serialize)]
pub struct DisconnectedResponse {
    pub disconnected: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub recording: Recording,
}

#[derive(Debug, Serialize)]
pub struct RecordingDeletedResponse {
    pub recording: bool,
}

#[derive(Debug, Serialize)]
pub struct SentResponse {
    pub sent: bool,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /openvidu/token
/// Create (or reuse) a session and issue a token for it
pub async fn generate_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GenerateTokenRequest>,
) -> ApiResult<TokenResponse> {
    let properties = SessionPropertiesBuilder::new()
        .with_unknown_keys(state.unknown_keys)
        .build(&req.session)?;
    let options = TokenOptionsBuilder::new()
        .with_unknown_keys(state.unknown_keys)
        .build(&req.token_options)?;

    let session = state.openvidu.create_session(properties).await?;
    let token = state
        .openvidu
        .generate_token(&session.session_id, &options)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// GET /openvidu/sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<SessionsResponse> {
    let sessions = state.openvidu.active_sessions().await;
    Ok(Json(SessionsResponse { sessions }))
}

/// POST /openvidu/sessions/fetch
/// Reconcile every cached session with the server
pub async fn fetch_all(State(state): State<AppState>) -> ApiResult<FetchAllResponse> {
    let has_changes = state.openvidu.fetch_all().await?;
    Ok(Json(FetchAllResponse { has_changes }))
}

/// GET /openvidu/session/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
) -> ApiResult<SessionResponse> {
    let session = state.openvidu.get_session(&session_id).await?;
    Ok(Json(SessionResponse { session }))
}

/// GET /openvidu/session/:session_id/connections
pub async fn list_connections(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
) -> ApiResult<ConnectionsResponse> {
    let connections = state.openvidu.active_connections(&session_id).await?;
    Ok(Json(ConnectionsResponse { connections }))
}

/// DELETE /openvidu/session/:session_id
pub async fn close_session(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
) -> ApiResult<ClosedResponse> {
    info!("Closing session: {}", session_id);
    let closed = state.openvidu.close(&session_id).await?;
    Ok(Json(ClosedResponse { closed }))
}

/// POST /openvidu/session/:session_id/fetch
pub async fn fetch_session(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
) -> ApiResult<FetchResponse> {
    let (session, has_changes) = state.openvidu.fetch(&session_id).await?;
    Ok(Json(FetchResponse {
        session,
        has_changes,
    }))
}

/// GET /openvidu/session/:session_id/recording
pub async fn is_being_recorded(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
) -> ApiResult<RecordingStatusResponse> {
    let is_being_recording = state.openvidu.is_being_recorded(&session_id).await?;
    Ok(Json(RecordingStatusResponse { is_being_recording }))
}

/// POST /openvidu/session/:session_id/publish
pub async fn publish(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
    ApiJson(options): ApiJson<Options>,
) -> ApiResult<ConnectionResponse> {
    // Unknown session wins over malformed options
    state.openvidu.get_session(&session_id).await?;

    let options = PublishStreamBuilder::new()
        .with_unknown_keys(state.unknown_keys)
        .build(&options)?;
    let connection = state.openvidu.publish(&session_id, &options).await?;

    Ok(Json(ConnectionResponse { connection }))
}

/// DELETE /openvidu/session/:session_id/stream/:stream_id
pub async fn force_unpublish(
    State(state): State<AppState>,
    ApiPath((session_id, stream_id)): ApiPath<(String, String)>,
) -> ApiResult<UnpublishedResponse> {
    state
        .openvidu
        .force_unpublish(&session_id, &stream_id)
        .await?;
    Ok(Json(UnpublishedResponse { unpublished: true }))
}

/// DELETE /openvidu/session/:session_id/connection/:connection_id
pub async fn force_disconnect(
    State(state): State<AppState>,
    ApiPath((session_id, connection_id)): ApiPath<(String, String)>,
) -> ApiResult<DisconnectedResponse> {
    state
        .openvidu
        .force_disconnect(&session_id, &connection_id)
        .await?;
    Ok(Json(DisconnectedResponse { disconnected: true }))
}

/// POST /openvidu/recordings/start
pub async fn start_recording(
    State(state): State<AppState>,
    ApiJson(options): ApiJson<Options>,
) -> ApiResult<RecordingResponse> {
    let properties = RecordingPropertiesBuilder::new()
        .with_unknown_keys(state.unknown_keys)
        .build(&options)?;

    info!("Starting recording for session: {}", properties.session);
    let recording = state.openvidu.start_recording(&properties).await?;

    Ok(Json(RecordingResponse { recording }))
}

/// POST /openvidu/recordings/stop/:recording_id
pub async fn stop_recording(
    State(state): State<AppState>,
    ApiPath(recording_id): ApiPath<String>,
) -> ApiResult<RecordingResponse> {
    info!("Stopping recording: {}", recording_id);
    let recording = state.openvidu.stop_recording(&recording_id).await?;
    Ok(Json(RecordingResponse { recording }))
}

/// GET /openvidu/recordings/:recording_id
pub async fn get_recording(
    State(state): State<AppState>,
    ApiPath(recording_id): ApiPath<String>,
) -> ApiResult<RecordingResponse> {
    let recording = state.openvidu.get_recording(&recording_id).await?;
    Ok(Json(RecordingResponse { recording }))
}

/// DELETE /openvidu/recordings/:recording_id
pub async fn delete_recording(
    State(state): State<AppState>,
    ApiPath(recording_id): ApiPath<String>,
) -> ApiResult<RecordingDeletedResponse> {
    let recording = state.openvidu.delete_recording(&recording_id).await?;
    Ok(Json(RecordingDeletedResponse { recording }))
}

/// POST /openvidu/signal
pub async fn send_signal(
    State(state): State<AppState>,
    ApiJson(options): ApiJson<Options>,
) -> ApiResult<SentResponse> {
    let signal = SignalPropertiesBuilder::new()
        .with_unknown_keys(state.unknown_keys)
        .build(&options)?;
    let sent = state.openvidu.send_signal(&signal).await?;
    Ok(Json(SentResponse { sent }))
}

/// POST /openvidu/webhook
/// Acknowledge immediately; subscribers run in the background
pub async fn webhook(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<WebhookResponse> {
    let event = WebhookEvent::from_payload(payload)?;
    state.webhooks.dispatch(event);
    Ok(Json(WebhookResponse { success: true }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
