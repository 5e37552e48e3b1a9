use crate::error::OpenViduError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Failure kind, e.g. `SessionNotFound`
    pub error: String,
    pub message: String,
    /// Upstream OpenVidu status, for remote failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl OpenViduError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OpenViduError::InvalidArgument(_) | OpenViduError::StreamTypeInvalid(_) => {
                StatusCode::BAD_REQUEST
            }
            OpenViduError::SessionNotFound(_)
            | OpenViduError::ConnectionNotFound(_)
            | OpenViduError::RecordingNotFound(_) => StatusCode::NOT_FOUND,
            OpenViduError::OpenVidu { status: None, retryable: true, .. } => {
                StatusCode::GATEWAY_TIMEOUT
            }
            OpenViduError::OpenVidu { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for OpenViduError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("OpenVidu call failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let upstream = match &self {
            OpenViduError::OpenVidu { status, .. } => *status,
            _ => None,
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status: upstream,
            retryable: self.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}
