use super::control::{ControlPlane, SessionCreation};
use super::messages::{ConnectionMessage, SessionList, SessionMessage, TokenRequest, TokenResponse};
use crate::builders::{
    PublishOptions, RecordingProperties, SessionProperties, SignalProperties, TokenOptions,
};
use crate::config::OpenViduConfig;
use crate::error::{OpenViduError, Result};
use crate::recording::Recording;
use crate::session::{Connection, Session};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

const API_PREFIX: &str = "openvidu/api";

/// `ControlPlane` backed by the OpenVidu REST API
pub struct HttpControlPlane {
    http: reqwest::Client,
    base_url: String,
    username: String,
    secret: String,
    timeout: Duration,
}

impl HttpControlPlane {
    pub fn new(config: &OpenViduConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;

        info!(
            "OpenVidu control plane at {} (timeout {:?})",
            config.url,
            config.timeout()
        );

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            secret: config.secret.clone(),
            timeout: config.timeout(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, API_PREFIX, path);
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.secret))
            .timeout(self.timeout)
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response> {
        debug!(operation, "Sending OpenVidu request");

        match request.send().await {
            Ok(response) => {
                debug!(operation, status = %response.status(), "OpenVidu responded");
                Ok(response)
            }
            Err(e) => {
                warn!(operation, error = %e, "OpenVidu request failed");
                Err(e.into())
            }
        }
    }
}

/// Turn an unexpected response into an error carrying status and body
async fn failure(response: Response, operation: &str) -> OpenViduError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    warn!(operation, status, body = %body, "OpenVidu rejected request");

    if body.trim().is_empty() {
        OpenViduError::remote(status, format!("{} failed", operation))
    } else {
        OpenViduError::remote(status, body)
    }
}

#[async_trait::async_trait]
impl ControlPlane for HttpControlPlane {
    async fn create_session(&self, properties: &SessionProperties) -> Result<SessionCreation> {
        let request = self.request(Method::POST, "sessions").json(properties);
        let response = self.send(request, "create_session").await?;

        match response.status() {
            s if s.is_success() => {
                let message: SessionMessage = response.json().await?;
                let mut session = message.into_session();
                // Servers answer with a partial session; the local properties are authoritative
                session.properties = properties.clone();
                Ok(SessionCreation::Created(session))
            }
            StatusCode::CONFLICT => Ok(SessionCreation::AlreadyExists),
            StatusCode::BAD_REQUEST => Err(OpenViduError::invalid(
                response.text().await.unwrap_or_default(),
            )),
            _ => Err(failure(response, "create_session").await),
        }
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let request = self.request(Method::GET, &format!("sessions/{}", session_id));
        let response = self.send(request, "get_session").await?;

        match response.status() {
            s if s.is_success() => {
                let message: SessionMessage = response.json().await?;
                Ok(Some(message.into_session()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(failure(response, "get_session").await),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let request = self.request(Method::GET, "sessions");
        let response = self.send(request, "list_sessions").await?;

        if !response.status().is_success() {
            return Err(failure(response, "list_sessions").await);
        }

        let list: SessionList = response.json().await?;
        Ok(list
            .content
            .into_iter()
            .map(SessionMessage::into_session)
            .collect())
    }

    async fn close_session(&self, session_id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("sessions/{}", session_id));
        let response = self.send(request, "close_session").await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(OpenViduError::SessionNotFound(session_id.to_string())),
            _ => Err(failure(response, "close_session").await),
        }
    }

    async fn create_token(&self, session_id: &str, options: &TokenOptions) -> Result<String> {
        let body = TokenRequest {
            session: session_id,
            options,
        };
        let request = self.request(Method::POST, "tokens").json(&body);
        let response = self.send(request, "create_token").await?;

        match response.status() {
            s if s.is_success() => {
                let token: TokenResponse = response.json().await?;
                token.into_token().ok_or_else(|| OpenViduError::OpenVidu {
                    status: Some(s.as_u16()),
                    message: "token response carried no token".to_string(),
                    retryable: false,
                })
            }
            StatusCode::NOT_FOUND => Err(OpenViduError::SessionNotFound(session_id.to_string())),
            StatusCode::BAD_REQUEST => Err(OpenViduError::invalid(
                response.text().await.unwrap_or_default(),
            )),
            _ => Err(failure(response, "create_token").await),
        }
    }

    async fn publish(&self, session_id: &str, options: &PublishOptions) -> Result<Connection> {
        let request = self
            .request(Method::POST, &format!("sessions/{}/connection", session_id))
            .json(options);
        let response = self.send(request, "publish").await?;

        match response.status() {
            s if s.is_success() => {
                let message: ConnectionMessage = response.json().await?;
                Ok(message.into_connection(session_id))
            }
            StatusCode::NOT_FOUND => Err(OpenViduError::SessionNotFound(session_id.to_string())),
            StatusCode::BAD_REQUEST => Err(OpenViduError::invalid(
                response.text().await.unwrap_or_default(),
            )),
            _ => Err(failure(response, "publish").await),
        }
    }

    async fn unpublish(&self, session_id: &str, stream_id: &str) -> Result<()> {
        let path = format!("sessions/{}/stream/{}", session_id, stream_id);
        let response = self.send(self.request(Method::DELETE, &path), "unpublish").await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(OpenViduError::ConnectionNotFound(stream_id.to_string())),
            _ => Err(failure(response, "unpublish").await),
        }
    }

    async fn disconnect(&self, session_id: &str, connection_id: &str) -> Result<()> {
        let path = format!("sessions/{}/connection/{}", session_id, connection_id);
        let response = self.send(self.request(Method::DELETE, &path), "disconnect").await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(OpenViduError::ConnectionNotFound(
                connection_id.to_string(),
            )),
            _ => Err(failure(response, "disconnect").await),
        }
    }

    async fn start_recording(&self, properties: &RecordingProperties) -> Result<Recording> {
        let request = self.request(Method::POST, "recordings/start").json(properties);
        let response = self.send(request, "start_recording").await?;

        match response.status() {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(OpenViduError::SessionNotFound(properties.session.clone())),
            StatusCode::UNPROCESSABLE_ENTITY => Err(OpenViduError::invalid(
                response.text().await.unwrap_or_default(),
            )),
            _ => Err(failure(response, "start_recording").await),
        }
    }

    async fn stop_recording(&self, recording_id: &str) -> Result<Recording> {
        let path = format!("recordings/stop/{}", recording_id);
        let response = self.send(self.request(Method::POST, &path), "stop_recording").await?;

        match response.status() {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(OpenViduError::RecordingNotFound(recording_id.to_string())),
            _ => Err(failure(response, "stop_recording").await),
        }
    }

    async fn get_recording(&self, recording_id: &str) -> Result<Recording> {
        let path = format!("recordings/{}", recording_id);
        let response = self.send(self.request(Method::GET, &path), "get_recording").await?;

        match response.status() {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(OpenViduError::RecordingNotFound(recording_id.to_string())),
            _ => Err(failure(response, "get_recording").await),
        }
    }

    async fn delete_recording(&self, recording_id: &str) -> Result<()> {
        let path = format!("recordings/{}", recording_id);
        let response = self
            .send(self.request(Method::DELETE, &path), "delete_recording")
            .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(OpenViduError::RecordingNotFound(recording_id.to_string())),
            _ => Err(failure(response, "delete_recording").await),
        }
    }

    async fn send_signal(&self, signal: &SignalProperties) -> Result<()> {
        let request = self.request(Method::POST, "signal").json(signal);
        let response = self.send(request, "send_signal").await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(OpenViduError::SessionNotFound(signal.session.clone())),
            StatusCode::NOT_ACCEPTABLE => Err(OpenViduError::ConnectionNotFound(signal.to.join(","))),
            StatusCode::BAD_REQUEST => Err(OpenViduError::invalid(
                response.text().await.unwrap_or_default(),
            )),
            _ => Err(failure(response, "send_signal").await),
        }
    }

    fn name(&self) -> &str {
        "openvidu-rest"
    }
}
