use super::dispatcher::WebhookSubscriber;
use super::event::{WebhookEvent, WebhookEventKind};
use crate::openvidu::OpenVidu;
use anyhow::Context;
use std::sync::Arc;
use tracing::debug;

/// Keeps the session registry in step with server-pushed state changes
pub struct RegistrySync {
    openvidu: Arc<OpenVidu>,
}

impl RegistrySync {
    pub fn new(openvidu: Arc<OpenVidu>) -> Self {
        Self { openvidu }
    }
}

#[async_trait::async_trait]
impl WebhookSubscriber for RegistrySync {
    async fn handle(&self, event: &WebhookEvent) -> anyhow::Result<()> {
        match event.event {
            WebhookEventKind::SessionDestroyed => {
                let session_id = event
                    .session_id
                    .as_deref()
                    .context("sessionDestroyed event without sessionId")?;
                if self.openvidu.evict(session_id).await {
                    debug!(session_id, "Session destroyed remotely");
                }
            }
            WebhookEventKind::RecordingStatusChanged => {
                let session_id = event
                    .session_id
                    .as_deref()
                    .context("recordingStatusChanged event without sessionId")?;
                let recording_id = event
                    .recording_id()
                    .context("recordingStatusChanged event without recording id")?;
                let status = event
                    .recording_status()
                    .context("recordingStatusChanged event with unknown status")?;

                self.openvidu
                    .apply_recording_status(recording_id, session_id, status)
                    .await;
            }
            _ => {}
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "registry-sync"
    }
}
