use super::control::{ControlPlane, SessionCreation};
use crate::builders::{
    PublishOptions, RecordingProperties, SessionProperties, SignalProperties, TokenOptions,
};
use crate::error::{OpenViduError, Result};
use crate::recording::{Recording, RecordingStatus};
use crate::session::{Connection, Session};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

/// A cached session and the last committed copy of it
///
/// Operations hold `state` across their remote call. Readers that must not
/// wait for an in-flight call use `snapshot`, which is refreshed whenever a
/// guard that mutated the session is dropped.
struct SessionSlot {
    state: Mutex<Session>,
    snapshot: parking_lot::RwLock<Session>,
}

impl SessionSlot {
    fn new(session: Session) -> Self {
        Self {
            snapshot: parking_lot::RwLock::new(session.clone()),
            state: Mutex::new(session),
        }
    }

    async fn lock(&self) -> SessionGuard<'_> {
        SessionGuard {
            session: self.state.lock().await,
            snapshot: &self.snapshot,
            dirty: false,
        }
    }

    fn snapshot(&self) -> Session {
        self.snapshot.read().clone()
    }
}

struct SessionGuard<'a> {
    session: MutexGuard<'a, Session>,
    snapshot: &'a parking_lot::RwLock<Session>,
    dirty: bool,
}

impl Deref for SessionGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.dirty = true;
        &mut self.session
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.dirty {
            *self.snapshot.write() = self.session.clone();
        }
    }
}

type SessionEntry = Arc<SessionSlot>;

/// Session registry client
///
/// Sole owner of the locally cached sessions and recordings. Each cached
/// session sits behind its own lock, so concurrent operations on one session
/// are serialized while different sessions proceed independently. The cache
/// is only touched after the remote call has succeeded.
pub struct OpenVidu {
    control: Arc<dyn ControlPlane>,

    /// Cached sessions in insertion order (session_id → session)
    sessions: RwLock<IndexMap<String, SessionEntry>>,

    /// Recordings started and not yet stopped or deleted (recording_id → recording)
    recordings: RwLock<HashMap<String, Recording>>,

    /// In-flight creations keyed by custom session id
    creating: parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OpenVidu {
    pub fn new(control: Arc<dyn ControlPlane>) -> Self {
        info!("Session registry using control plane: {}", control.name());

        Self {
            control,
            sessions: RwLock::new(IndexMap::new()),
            recordings: RwLock::new(HashMap::new()),
            creating: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    async fn entry(&self, session_id: &str) -> Result<SessionEntry> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| OpenViduError::SessionNotFound(session_id.to_string()))
    }

    /// Cache a session, merging into an entry another task inserted meanwhile
    async fn insert(&self, session: Session) -> Session {
        let existing = {
            let mut sessions = self.sessions.write().await;
            match sessions.get(&session.session_id).cloned() {
                Some(entry) => Some(entry),
                None => {
                    let id = session.session_id.clone();
                    sessions.insert(id, Arc::new(SessionSlot::new(session.clone())));
                    None
                }
            }
        };

        match existing {
            Some(entry) => {
                let mut cached = entry.lock().await;
                cached.update_from(session);
                cached.clone()
            }
            None => session,
        }
    }

    /// Drop a session from the cache, returning whether it was present
    pub async fn evict(&self, session_id: &str) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            sessions.shift_remove(session_id).is_some()
        };

        if removed {
            debug!(session_id, "Evicted session from cache");
        }
        removed
    }

    async fn cached(&self, session_id: &str) -> Option<Session> {
        self.entry(session_id).await.ok().map(|entry| entry.snapshot())
    }

    /// Create a session, or return the cached one when its custom id is already known
    ///
    /// Creations are serialized per custom id only; sessions without a custom
    /// id are always new and never wait on each other.
    pub async fn create_session(&self, properties: SessionProperties) -> Result<Session> {
        let Some(custom_id) = properties.custom_session_id.clone() else {
            return self.create_remote(&properties).await;
        };

        if let Some(session) = self.cached(&custom_id).await {
            debug!(session_id = %custom_id, "Session already cached");
            return Ok(session);
        }

        let lock = Arc::clone(self.creating.lock().entry(custom_id.clone()).or_default());
        let result = {
            let _creating = lock.lock().await;
            match self.cached(&custom_id).await {
                Some(session) => Ok(session),
                None => self.create_remote(&properties).await,
            }
        };

        // Only the map and this call still hold the lock: nobody is waiting on it
        let mut creating = self.creating.lock();
        if Arc::strong_count(&lock) == 2 {
            creating.remove(&custom_id);
        }

        result
    }

    async fn create_remote(&self, properties: &SessionProperties) -> Result<Session> {
        let session = match self.control.create_session(properties).await? {
            SessionCreation::Created(session) => session,
            SessionCreation::AlreadyExists => {
                let custom_id = properties.custom_session_id.as_deref().ok_or_else(|| {
                    OpenViduError::remote(409, "session conflict without a custom session id")
                })?;

                info!(session_id = custom_id, "Session exists remotely, adopting it");
                self.control
                    .get_session(custom_id)
                    .await?
                    .ok_or_else(|| OpenViduError::SessionNotFound(custom_id.to_string()))?
            }
        };

        info!(session_id = %session.session_id, "Session created");
        Ok(self.insert(session).await)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        let entry = self.entry(session_id).await?;
        let session = entry.lock().await;
        Ok(session.clone())
    }

    /// Cached sessions in insertion order; no remote query
    ///
    /// Sessions with an operation in flight are reported as last committed.
    pub async fn active_sessions(&self) -> Vec<Session> {
        let sessions = self.sessions.read().await;
        sessions.values().map(|entry| entry.snapshot()).collect()
    }

    pub async fn active_connections(&self, session_id: &str) -> Result<Vec<Connection>> {
        let entry = self.entry(session_id).await?;
        let session = entry.lock().await;
        Ok(session.active_connections().to_vec())
    }

    pub async fn is_being_recorded(&self, session_id: &str) -> Result<bool> {
        let entry = self.entry(session_id).await?;
        let session = entry.lock().await;
        Ok(session.is_being_recorded())
    }

    /// Pull remote state into the cache; returns the session and whether it changed
    pub async fn fetch(&self, session_id: &str) -> Result<(Session, bool)> {
        let entry = self.entry(session_id).await?;
        let mut session = entry.lock().await;

        match self.control.get_session(session_id).await? {
            Some(fresh) => {
                let changed = session.update_from(fresh);
                debug!(session_id, changed, "Fetched session");
                Ok((session.clone(), changed))
            }
            None => {
                drop(session);
                warn!(session_id, "Session no longer exists remotely");
                self.evict(session_id).await;
                Err(OpenViduError::SessionNotFound(session_id.to_string()))
            }
        }
    }

    /// Reconcile the whole cache with the server; returns whether anything changed
    pub async fn fetch_all(&self) -> Result<bool> {
        // Sessions cached after the list was taken cannot be judged from it
        let known: Vec<String> = {
            let sessions = self.sessions.read().await;
            sessions.keys().cloned().collect()
        };

        let remote = self.control.list_sessions().await?;
        let remote_ids: HashSet<String> = remote.iter().map(|s| s.session_id.clone()).collect();
        let mut changed = false;

        for fresh in remote {
            let existing = {
                let mut sessions = self.sessions.write().await;
                match sessions.get(&fresh.session_id).cloned() {
                    Some(entry) => Some((entry, fresh)),
                    None => {
                        let id = fresh.session_id.clone();
                        sessions.insert(id, Arc::new(SessionSlot::new(fresh)));
                        None
                    }
                }
            };

            match existing {
                Some((entry, fresh)) => {
                    let mut session = entry.lock().await;
                    changed |= session.update_from(fresh);
                }
                None => changed = true,
            }
        }

        for session_id in known.iter().filter(|id| !remote_ids.contains(*id)) {
            changed |= self.evict(session_id).await;
        }

        info!(changed, "Fetched all sessions");
        Ok(changed)
    }

    pub async fn close(&self, session_id: &str) -> Result<bool> {
        let entry = self.entry(session_id).await?;
        let session = entry.lock().await;

        match self.control.close_session(session_id).await {
            Ok(()) => {}
            Err(OpenViduError::SessionNotFound(id)) => {
                drop(session);
                self.evict(session_id).await;
                return Err(OpenViduError::SessionNotFound(id));
            }
            Err(e) => return Err(e),
        }

        drop(session);
        self.evict(session_id).await;
        info!(session_id, "Session closed");

        Ok(true)
    }

    pub async fn generate_token(&self, session_id: &str, options: &TokenOptions) -> Result<String> {
        let entry = self.entry(session_id).await?;
        let _session = entry.lock().await;

        let token = self.control.create_token(session_id, options).await?;
        debug!(session_id, role = %options.role, "Token generated");

        Ok(token)
    }

    pub async fn publish(&self, session_id: &str, options: &PublishOptions) -> Result<Connection> {
        let entry = self.entry(session_id).await?;
        let mut session = entry.lock().await;

        let connection = self.control.publish(session_id, options).await?;
        session.add_connection(connection.clone());
        info!(
            session_id,
            connection_id = %connection.connection_id,
            "Stream published"
        );

        Ok(connection)
    }

    pub async fn force_unpublish(&self, session_id: &str, stream_id: &str) -> Result<()> {
        let entry = self.entry(session_id).await?;
        let mut session = entry.lock().await;

        if !session.has_stream(stream_id) {
            return Err(OpenViduError::ConnectionNotFound(stream_id.to_string()));
        }

        self.control.unpublish(session_id, stream_id).await?;
        session.remove_stream(stream_id);
        info!(session_id, stream_id, "Stream force-unpublished");

        Ok(())
    }

    pub async fn force_disconnect(&self, session_id: &str, connection_id: &str) -> Result<()> {
        let entry = self.entry(session_id).await?;
        let mut session = entry.lock().await;

        if session.connection(connection_id).is_none() {
            return Err(OpenViduError::ConnectionNotFound(connection_id.to_string()));
        }

        self.control.disconnect(session_id, connection_id).await?;
        session.remove_connection(connection_id);
        info!(session_id, connection_id, "Connection force-disconnected");

        Ok(())
    }

    async fn set_recording_flag(&self, session_id: &str, recording: bool) {
        if let Ok(entry) = self.entry(session_id).await {
            entry.lock().await.recording = recording;
        }
    }

    pub async fn start_recording(&self, properties: &RecordingProperties) -> Result<Recording> {
        let recording = self.control.start_recording(properties).await?;

        {
            let mut recordings = self.recordings.write().await;
            recordings.insert(recording.id.clone(), recording.clone());
        }
        self.set_recording_flag(&recording.session_id, true).await;
        info!(
            recording_id = %recording.id,
            session_id = %recording.session_id,
            status = %recording.status,
            "Recording started"
        );

        Ok(recording)
    }

    pub async fn stop_recording(&self, recording_id: &str) -> Result<Recording> {
        let recording = self.control.stop_recording(recording_id).await?;

        {
            let mut recordings = self.recordings.write().await;
            recordings.remove(recording_id);
        }
        self.set_recording_flag(&recording.session_id, false).await;
        info!(recording_id, status = %recording.status, "Recording stopped");

        Ok(recording)
    }

    pub async fn get_recording(&self, recording_id: &str) -> Result<Recording> {
        let recording = self.control.get_recording(recording_id).await?;

        let mut recordings = self.recordings.write().await;
        if recording.status.is_finished() {
            recordings.remove(recording_id);
        } else if let Some(cached) = recordings.get_mut(recording_id) {
            *cached = recording.clone();
        }

        Ok(recording)
    }

    pub async fn delete_recording(&self, recording_id: &str) -> Result<bool> {
        self.control.delete_recording(recording_id).await?;

        let mut recordings = self.recordings.write().await;
        recordings.remove(recording_id);
        info!(recording_id, "Recording deleted");

        Ok(true)
    }

    /// Recordings started through this client that are still in progress
    pub async fn active_recordings(&self) -> Vec<Recording> {
        let recordings = self.recordings.read().await;
        recordings.values().cloned().collect()
    }

    /// Apply a server-pushed recording status change to the caches
    pub async fn apply_recording_status(
        &self,
        recording_id: &str,
        session_id: &str,
        status: RecordingStatus,
    ) {
        {
            let mut recordings = self.recordings.write().await;
            if status.is_finished() {
                recordings.remove(recording_id);
            } else if let Some(cached) = recordings.get_mut(recording_id) {
                cached.status = status;
            }
        }

        self.set_recording_flag(session_id, !status.is_finished()).await;
    }

    pub async fn send_signal(&self, signal: &SignalProperties) -> Result<bool> {
        self.control.send_signal(signal).await?;
        debug!(
            session_id = %signal.session,
            targets = signal.to.len(),
            "Signal sent"
        );

        Ok(true)
    }
}
