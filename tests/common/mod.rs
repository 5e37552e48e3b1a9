// In-memory OpenVidu control plane shared by the integration tests.
//
// Keeps "remote" sessions and recordings in memory, counts calls, and can be
// told to fail or to park a given operation until released.

#![allow(dead_code)]

use chrono::Utc;
use indexmap::IndexMap;
use openvidu_bridge::builders::{
    PublishOptions, RecordingProperties, SessionProperties, SignalProperties, TokenOptions,
};
use openvidu_bridge::{
    Connection, ControlPlane, OpenViduError, Publisher, Recording, RecordingStatus, Result,
    Session, SessionCreation,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct RemoteState {
    sessions: IndexMap<String, Session>,
    recordings: HashMap<String, Recording>,
    signals: Vec<SignalProperties>,
    next_id: usize,
}

impl RemoteState {
    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeControlPlane {
    state: Mutex<RemoteState>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<HashMap<String, usize>>,
    recording_counter: AtomicUsize,
}

impl FakeControlPlane {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `operation` answer with a 500 until `recover` is called
    pub fn fail(&self, operation: &str) {
        self.failing.lock().insert(operation.to_string());
    }

    pub fn recover(&self, operation: &str) {
        self.failing.lock().remove(operation);
    }

    /// Park `operation` calls until the returned handle is notified
    ///
    /// `create_session:<custom id>` parks only creations of that id.
    pub fn gate(&self, operation: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .insert(operation.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    pub fn remote_session(&self, session_id: &str) -> Option<Session> {
        self.state.lock().sessions.get(session_id).cloned()
    }

    /// Simulate a participant joining on the server side
    pub fn join(&self, session_id: &str, connection_id: &str) {
        let mut state = self.state.lock();
        let session = state.sessions.get_mut(session_id).expect("unknown session");
        session.add_connection(connection(session_id, connection_id, None));
    }

    /// Simulate the server closing a session on its own
    pub fn drop_remote_session(&self, session_id: &str) {
        self.state.lock().sessions.shift_remove(session_id);
    }

    pub fn signals(&self) -> Vec<SignalProperties> {
        self.state.lock().signals.clone()
    }

    async fn enter(&self, operation: &str) -> Result<()> {
        self.enter_keyed(operation, None).await
    }

    async fn enter_keyed(&self, operation: &str, key: Option<&str>) -> Result<()> {
        *self.calls.lock().entry(operation.to_string()).or_default() += 1;

        let gate = {
            let gates = self.gates.lock();
            key.and_then(|key| gates.get(&format!("{}:{}", operation, key)).cloned())
                .or_else(|| gates.get(operation).cloned())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing.lock().contains(operation) {
            return Err(OpenViduError::remote(500, format!("{} failed", operation)));
        }
        Ok(())
    }
}

pub fn connection(session_id: &str, connection_id: &str, stream_id: Option<&str>) -> Connection {
    Connection {
        connection_id: connection_id.to_string(),
        session_id: session_id.to_string(),
        created_at: Utc::now(),
        role: None,
        token: None,
        location: None,
        platform: None,
        server_data: None,
        client_data: None,
        publishers: stream_id
            .map(|id| {
                vec![Publisher {
                    stream_id: id.to_string(),
                    created_at: Utc::now(),
                    has_audio: true,
                    has_video: true,
                    audio_active: Some(true),
                    video_active: Some(true),
                    type_of_video: Some("CUSTOM".to_string()),
                    frame_rate: None,
                    video_dimensions: None,
                }]
            })
            .unwrap_or_default(),
        subscribers: Vec::new(),
    }
}

#[async_trait::async_trait]
impl ControlPlane for FakeControlPlane {
    async fn create_session(&self, properties: &SessionProperties) -> Result<SessionCreation> {
        self.enter_keyed("create_session", properties.custom_session_id.as_deref())
            .await?;
        let mut state = self.state.lock();

        let session_id = match &properties.custom_session_id {
            Some(id) if state.sessions.contains_key(id) => {
                return Ok(SessionCreation::AlreadyExists)
            }
            Some(id) => id.clone(),
            None => format!("ses_{}", uuid::Uuid::new_v4().simple()),
        };

        let session = Session::new(session_id.clone(), Utc::now(), properties.clone());
        state.sessions.insert(session_id, session.clone());
        Ok(SessionCreation::Created(session))
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.enter("get_session").await?;
        Ok(self.state.lock().sessions.get(session_id).cloned())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        // The answer reflects the moment the server received the request
        let sessions = self.state.lock().sessions.values().cloned().collect();
        self.enter("list_sessions").await?;
        Ok(sessions)
    }

    async fn close_session(&self, session_id: &str) -> Result<()> {
        self.enter("close_session").await?;
        self.state
            .lock()
            .sessions
            .shift_remove(session_id)
            .map(|_| ())
            .ok_or_else(|| OpenViduError::SessionNotFound(session_id.to_string()))
    }

    async fn create_token(&self, session_id: &str, _options: &TokenOptions) -> Result<String> {
        self.enter("create_token").await?;
        if !self.state.lock().sessions.contains_key(session_id) {
            return Err(OpenViduError::SessionNotFound(session_id.to_string()));
        }
        Ok(format!("tok_{}", uuid::Uuid::new_v4().simple()))
    }

    async fn publish(&self, session_id: &str, options: &PublishOptions) -> Result<Connection> {
        self.enter("publish").await?;
        let mut state = self.state.lock();
        let n = state.next();

        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| OpenViduError::SessionNotFound(session_id.to_string()))?;

        let mut connection = connection(
            session_id,
            &format!("con_{}", n),
            Some(&format!("str_{}", n)),
        );
        connection.server_data = options.data.clone();
        connection.publishers[0].type_of_video = Some(options.type_of_video.to_string());

        session.add_connection(connection.clone());
        Ok(connection)
    }

    async fn unpublish(&self, session_id: &str, stream_id: &str) -> Result<()> {
        self.enter("unpublish").await?;
        let mut state = self.state.lock();
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| OpenViduError::SessionNotFound(session_id.to_string()))?;

        if session.remove_stream(stream_id) {
            Ok(())
        } else {
            Err(OpenViduError::ConnectionNotFound(stream_id.to_string()))
        }
    }

    async fn disconnect(&self, session_id: &str, connection_id: &str) -> Result<()> {
        self.enter("disconnect").await?;
        let mut state = self.state.lock();
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| OpenViduError::SessionNotFound(session_id.to_string()))?;

        session
            .remove_connection(connection_id)
            .map(|_| ())
            .ok_or_else(|| OpenViduError::ConnectionNotFound(connection_id.to_string()))
    }

    async fn start_recording(&self, properties: &RecordingProperties) -> Result<Recording> {
        self.enter("start_recording").await?;
        let mut state = self.state.lock();

        let session = state
            .sessions
            .get_mut(&properties.session)
            .ok_or_else(|| OpenViduError::SessionNotFound(properties.session.clone()))?;
        if session.recording {
            return Err(OpenViduError::remote(409, "session is already being recorded"));
        }
        session.recording = true;

        let n = self.recording_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let recording = Recording {
            id: format!("rec{}", n),
            session_id: properties.session.clone(),
            name: properties.name.clone(),
            output_mode: properties.output_mode,
            has_audio: properties.has_audio,
            has_video: properties.has_video,
            recording_layout: properties.recording_layout,
            custom_layout: properties.custom_layout.clone(),
            resolution: properties.resolution.clone(),
            created_at: Utc::now(),
            size: 0,
            duration: 0.0,
            url: None,
            status: RecordingStatus::Starting,
        };
        state.recordings.insert(recording.id.clone(), recording.clone());
        Ok(recording)
    }

    async fn stop_recording(&self, recording_id: &str) -> Result<Recording> {
        self.enter("stop_recording").await?;
        let mut state = self.state.lock();

        let recording = state
            .recordings
            .get_mut(recording_id)
            .ok_or_else(|| OpenViduError::RecordingNotFound(recording_id.to_string()))?;
        recording.status = RecordingStatus::Stopped;
        let recording = recording.clone();

        if let Some(session) = state.sessions.get_mut(&recording.session_id) {
            session.recording = false;
        }
        Ok(recording)
    }

    async fn get_recording(&self, recording_id: &str) -> Result<Recording> {
        self.enter("get_recording").await?;
        self.state
            .lock()
            .recordings
            .get(recording_id)
            .cloned()
            .ok_or_else(|| OpenViduError::RecordingNotFound(recording_id.to_string()))
    }

    async fn delete_recording(&self, recording_id: &str) -> Result<()> {
        self.enter("delete_recording").await?;
        self.state
            .lock()
            .recordings
            .remove(recording_id)
            .map(|_| ())
            .ok_or_else(|| OpenViduError::RecordingNotFound(recording_id.to_string()))
    }

    async fn send_signal(&self, signal: &SignalProperties) -> Result<()> {
        self.enter("send_signal").await?;
        let mut state = self.state.lock();

        let session = state
            .sessions
            .get(&signal.session)
            .ok_or_else(|| OpenViduError::SessionNotFound(signal.session.clone()))?;
        if let Some(missing) = signal.to.iter().find(|id| session.connection(id).is_none()) {
            return Err(OpenViduError::ConnectionNotFound(missing.clone()));
        }

        state.signals.push(signal.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
