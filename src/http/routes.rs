use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Tokens
        .route("/openvidu/token", post(handlers::generate_token))
        // Sessions
        .route("/openvidu/sessions", get(handlers::list_sessions))
        .route("/openvidu/sessions/fetch", post(handlers::fetch_all))
        .route(
            "/openvidu/session/:session_id",
            get(handlers::get_session).delete(handlers::close_session),
        )
        .route(
            "/openvidu/session/:session_id/connections",
            get(handlers::list_connections),
        )
        .route(
            "/openvidu/session/:session_id/fetch",
            post(handlers::fetch_session),
        )
        .route(
            "/openvidu/session/:session_id/recording",
            get(handlers::is_being_recorded),
        )
        .route(
            "/openvidu/session/:session_id/publish",
            post(handlers::publish),
        )
        .route(
            "/openvidu/session/:session_id/stream/:stream_id",
            delete(handlers::force_unpublish),
        )
        .route(
            "/openvidu/session/:session_id/connection/:connection_id",
            delete(handlers::force_disconnect),
        )
        // Recordings
        .route("/openvidu/recordings/start", post(handlers::start_recording))
        .route(
            "/openvidu/recordings/stop/:recording_id",
            post(handlers::stop_recording),
        )
        .route(
            "/openvidu/recordings/:recording_id",
            get(handlers::get_recording).delete(handlers::delete_recording),
        )
        // Signals and server-pushed events
        .route("/openvidu/signal", post(handlers::send_signal))
        .route("/openvidu/webhook", post(handlers::webhook))
        .layer(
            ServiceBuilder::new()
                // Add tracing middleware for request logging
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
