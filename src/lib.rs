pub mod builders;
pub mod config;
pub mod error;
pub mod http;
pub mod openvidu;
pub mod recording;
pub mod session;
pub mod webhook;

pub use builders::{
    Options, PublishOptions, PublishStreamBuilder, RecordingProperties,
    RecordingPropertiesBuilder, SessionProperties, SessionPropertiesBuilder, SignalProperties,
    SignalPropertiesBuilder, TokenOptions, TokenOptionsBuilder, UnknownKeys,
};
pub use config::Config;
pub use error::{OpenViduError, Result};
pub use http::{create_router, AppState};
pub use openvidu::{ControlPlane, HttpControlPlane, OpenVidu, SessionCreation};
pub use recording::{Recording, RecordingStatus};
pub use session::{Connection, Publisher, Session};
pub use webhook::{RegistrySync, WebhookDispatcher, WebhookEvent, WebhookEventKind, WebhookSubscriber};
