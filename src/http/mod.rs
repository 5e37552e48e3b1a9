//! HTTP API server exposing the OpenVidu control plane
//!
//! This module provides a REST API for session, recording and signal control:
//! - POST /openvidu/token - Create a session (idempotent by custom id) and issue a token
//! - GET /openvidu/sessions, /openvidu/session/:id[/connections|/recording] - Queries
//! - POST /openvidu/session/:id/fetch, /openvidu/sessions/fetch - Refresh from the server
//! - POST /openvidu/session/:id/publish, DELETE .../stream/:id, .../connection/:id - Streams
//! - POST /openvidu/recordings/start, /openvidu/recordings/stop/:id - Recordings
//! - POST /openvidu/signal - Send a signal
//! - POST /openvidu/webhook - Server-pushed events
//! - GET /health - Health check

mod error;
mod extract;
mod handlers;
mod routes;
mod state;

pub use error::ErrorResponse;
pub use routes::create_router;
pub use state::AppState;
