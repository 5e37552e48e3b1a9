use super::event::WebhookEvent;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Local consumer of webhook events
#[async_trait::async_trait]
pub trait WebhookSubscriber: Send + Sync {
    async fn handle(&self, event: &WebhookEvent) -> anyhow::Result<()>;

    /// Subscriber name for logging
    fn name(&self) -> &str;
}

struct Lane {
    id: u64,
    tx: mpsc::UnboundedSender<WebhookEvent>,
}

type Lanes = Arc<Mutex<HashMap<String, Lane>>>;

/// Fans webhook events out to subscribers without blocking the caller
///
/// Events for the same session id are delivered in arrival order through a
/// per-session lane (a task draining an unbounded channel). Lanes shut down
/// after `idle` without events. Subscriber failures are logged and never
/// retried.
pub struct WebhookDispatcher {
    subscribers: Arc<Vec<Arc<dyn WebhookSubscriber>>>,
    lanes: Lanes,
    idle: Duration,
    next_lane: AtomicU64,
}

impl WebhookDispatcher {
    pub fn new(subscribers: Vec<Arc<dyn WebhookSubscriber>>, idle: Duration) -> Self {
        Self {
            subscribers: Arc::new(subscribers),
            lanes: Arc::new(Mutex::new(HashMap::new())),
            idle,
            next_lane: AtomicU64::new(0),
        }
    }

    /// Queue an event for delivery; must be called from within a tokio runtime
    pub fn dispatch(&self, event: WebhookEvent) {
        info!(
            event = event.name(),
            session_id = event.session_id.as_deref().unwrap_or("-"),
            "Webhook event received"
        );

        if self.subscribers.is_empty() {
            return;
        }

        let key = event.session_id.clone().unwrap_or_default();
        let mut lanes = self.lanes.lock();

        let event = match lanes.get(&key) {
            Some(lane) => match lane.tx.send(event) {
                Ok(()) => return,
                // Lane task already exited; start a new one below
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // rx is still in scope, so the channel is open
        tx.send(event).ok();

        let id = self.next_lane.fetch_add(1, Ordering::Relaxed);
        lanes.insert(key.clone(), Lane { id, tx });
        debug!(lane = id, session_id = %key, "Webhook lane opened");

        tokio::spawn(run_lane(
            key,
            id,
            rx,
            Arc::clone(&self.subscribers),
            Arc::clone(&self.lanes),
            self.idle,
        ));
    }

    /// Number of live delivery lanes
    pub fn lane_count(&self) -> usize {
        self.lanes.lock().len()
    }
}

async fn run_lane(
    key: String,
    id: u64,
    mut rx: mpsc::UnboundedReceiver<WebhookEvent>,
    subscribers: Arc<Vec<Arc<dyn WebhookSubscriber>>>,
    lanes: Lanes,
    idle: Duration,
) {
    loop {
        let event = match tokio::time::timeout(idle, rx.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(_) => {
                // Senders enqueue while holding the table lock, so an empty
                // queue observed under the lock stays empty once we deregister.
                let pending = {
                    let mut table = lanes.lock();
                    match rx.try_recv() {
                        Ok(event) => Some(event),
                        Err(_) => {
                            if table.get(&key).map(|lane| lane.id) == Some(id) {
                                table.remove(&key);
                            }
                            None
                        }
                    }
                };

                match pending {
                    Some(event) => event,
                    None => break,
                }
            }
        };

        deliver(&subscribers, &event).await;
    }

    debug!(lane = id, session_id = %key, "Webhook lane closed");
}

async fn deliver(subscribers: &[Arc<dyn WebhookSubscriber>], event: &WebhookEvent) {
    let results = join_all(subscribers.iter().map(|s| s.handle(event))).await;

    for (subscriber, result) in subscribers.iter().zip(results) {
        if let Err(e) = result {
            error!(
                subscriber = subscriber.name(),
                event = event.name(),
                "Webhook subscriber failed: {:#}",
                e
            );
        }
    }
}
