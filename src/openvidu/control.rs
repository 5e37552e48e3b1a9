use crate::builders::{
    PublishOptions, RecordingProperties, SessionProperties, SignalProperties, TokenOptions,
};
use crate::error::Result;
use crate::recording::Recording;
use crate::session::{Connection, Session};

/// Outcome of a remote session creation call
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCreation {
    Created(Session),
    /// The requested custom session id already exists on the server
    AlreadyExists,
}

/// Remote OpenVidu control-plane operations
///
/// Implementations:
/// - `HttpControlPlane`: the OpenVidu REST API over HTTP
/// - test doubles that keep state in memory
///
/// Implementations translate "entity missing" answers into the matching
/// `SessionNotFound` / `ConnectionNotFound` / `RecordingNotFound` errors and
/// every other failure into `OpenViduError::OpenVidu`.
#[async_trait::async_trait]
pub trait ControlPlane: Send + Sync {
    async fn create_session(&self, properties: &SessionProperties) -> Result<SessionCreation>;

    /// Current remote state, `None` when the session does not exist
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    async fn list_sessions(&self) -> Result<Vec<Session>>;

    async fn close_session(&self, session_id: &str) -> Result<()>;

    async fn create_token(&self, session_id: &str, options: &TokenOptions) -> Result<String>;

    async fn publish(&self, session_id: &str, options: &PublishOptions) -> Result<Connection>;

    async fn unpublish(&self, session_id: &str, stream_id: &str) -> Result<()>;

    async fn disconnect(&self, session_id: &str, connection_id: &str) -> Result<()>;

    async fn start_recording(&self, properties: &RecordingProperties) -> Result<Recording>;

    async fn stop_recording(&self, recording_id: &str) -> Result<Recording>;

    async fn get_recording(&self, recording_id: &str) -> Result<Recording>;

    async fn delete_recording(&self, recording_id: &str) -> Result<()>;

    async fn send_signal(&self, signal: &SignalProperties) -> Result<()>;

    /// Name for logging
    fn name(&self) -> &str;
}
