use crate::builders::UnknownKeys;
use crate::openvidu::OpenVidu;
use crate::webhook::WebhookDispatcher;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session registry client
    pub openvidu: Arc<OpenVidu>,

    /// Webhook fan-out to local subscribers
    pub webhooks: Arc<WebhookDispatcher>,

    /// Policy applied by option builders to unrecognised keys
    pub unknown_keys: UnknownKeys,
}

impl AppState {
    pub fn new(
        openvidu: Arc<OpenVidu>,
        webhooks: Arc<WebhookDispatcher>,
        unknown_keys: UnknownKeys,
    ) -> Self {
        Self {
            openvidu,
            webhooks,
            unknown_keys,
        }
    }
}
