use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpenViduError>;

/// Failure kinds surfaced by builders, the session registry and the remote client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OpenViduError {
    /// Malformed or unsupported option value supplied by the caller
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("session {0} not found")]
    SessionNotFound(String),

    /// Connection or stream id absent from the session's connection set
    #[error("connection {0} not found")]
    ConnectionNotFound(String),

    #[error("recording {0} not found")]
    RecordingNotFound(String),

    #[error("invalid stream type: {0}")]
    StreamTypeInvalid(String),

    /// Remote call failed or answered with an unexpected status
    #[error("OpenVidu request failed (status {status:?}): {message}")]
    OpenVidu {
        /// Upstream HTTP status, absent when the request never completed
        status: Option<u16>,
        message: String,
        retryable: bool,
    },
}

impl OpenViduError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::OpenVidu {
            status: Some(status),
            message: message.into(),
            retryable: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::OpenVidu {
            status: None,
            message: message.into(),
            retryable: true,
        }
    }

    /// Stable identifier used in error response bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::SessionNotFound(_) => "SessionNotFound",
            Self::ConnectionNotFound(_) => "ConnectionNotFound",
            Self::RecordingNotFound(_) => "RecordingNotFound",
            Self::StreamTypeInvalid(_) => "StreamTypeInvalid",
            Self::OpenVidu { .. } => "OpenViduException",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OpenVidu { retryable: true, .. })
    }
}

impl From<reqwest::Error> for OpenViduError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::OpenVidu {
                status: None,
                message: format!("connection failed: {}", err),
                retryable: false,
            }
        } else {
            Self::OpenVidu {
                status: err.status().map(|s| s.as_u16()),
                message: format!("request failed: {}", err),
                retryable: false,
            }
        }
    }
}
