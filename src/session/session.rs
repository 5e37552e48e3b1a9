use super::connection::Connection;
use crate::builders::SessionProperties;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote OpenVidu session as last seen by this process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Remote identifier (equal to the custom id when one was supplied)
    pub session_id: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// Properties the session was created with
    pub properties: SessionProperties,

    /// Active connections, in the order the server reported them
    pub connections: Vec<Connection>,

    /// Whether the session is currently being recorded
    pub recording: bool,
}

impl Session {
    pub fn new(session_id: String, created_at: DateTime<Utc>, properties: SessionProperties) -> Self {
        Self {
            session_id,
            created_at,
            properties,
            connections: Vec::new(),
            recording: false,
        }
    }

    pub fn active_connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn is_being_recorded(&self) -> bool {
        self.recording
    }

    pub fn connection(&self, connection_id: &str) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.connection_id == connection_id)
    }

    pub fn has_stream(&self, stream_id: &str) -> bool {
        self.connections.iter().any(|c| c.publishes(stream_id))
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.retain(|c| c.connection_id != connection.connection_id);
        self.connections.push(connection);
    }

    /// Remove a connection along with every subscription to its streams
    pub fn remove_connection(&mut self, connection_id: &str) -> Option<Connection> {
        let index = self
            .connections
            .iter()
            .position(|c| c.connection_id == connection_id)?;
        let removed = self.connections.remove(index);

        for stream in &removed.publishers {
            self.drop_subscriptions(&stream.stream_id);
        }

        Some(removed)
    }

    /// Remove a published stream and every subscription to it
    pub fn remove_stream(&mut self, stream_id: &str) -> bool {
        let mut found = false;
        for connection in &mut self.connections {
            let before = connection.publishers.len();
            connection.publishers.retain(|p| p.stream_id != stream_id);
            found |= connection.publishers.len() != before;
        }

        if found {
            self.drop_subscriptions(stream_id);
        }
        found
    }

    fn drop_subscriptions(&mut self, stream_id: &str) {
        for connection in &mut self.connections {
            connection.subscribers.retain(|s| s != stream_id);
        }
    }

    /// Replace local state with a freshly fetched copy, reporting whether anything differed
    pub fn update_from(&mut self, fresh: Session) -> bool {
        if *self == fresh {
            return false;
        }
        *self = fresh;
        true
    }
}
