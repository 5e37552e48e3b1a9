//! OpenVidu control-plane client
//!
//! - `ControlPlane` - trait over the remote REST operations
//! - `HttpControlPlane` - reqwest implementation talking to `/openvidu/api`
//! - `OpenVidu` - session registry that caches sessions/recordings and
//!   routes every mutation through a `ControlPlane`

pub mod client;
pub mod control;
pub mod http;
pub mod messages;

pub use client::OpenVidu;
pub use control::{ControlPlane, SessionCreation};
pub use http::HttpControlPlane;
