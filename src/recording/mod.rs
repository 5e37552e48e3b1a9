//! Server-side recordings of a session's media

mod recording;

pub use recording::{Recording, RecordingStatus};
