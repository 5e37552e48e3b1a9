//! Session and connection value objects
//!
//! This module provides the locally cached view of remote OpenVidu state:
//! - `Session` - a room with its creation properties and recording flag
//! - `Connection` - a participant joined to a session
//! - `Publisher` - a stream published by a connection

mod connection;
mod session;

pub use connection::{Connection, Publisher};
pub use session::Session;
