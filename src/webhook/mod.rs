//! Webhook event dispatch
//!
//! OpenVidu pushes state changes (sessions, participants, recordings) to a
//! webhook endpoint. Events are parsed into `WebhookEvent`s and handed to a
//! `WebhookDispatcher`, which delivers them to local `WebhookSubscriber`s
//! in per-session order without holding up the HTTP acknowledgement.

mod dispatcher;
mod event;
mod sync;

pub use dispatcher::{WebhookDispatcher, WebhookSubscriber};
pub use event::{WebhookEvent, WebhookEventKind};
pub use sync::RegistrySync;
