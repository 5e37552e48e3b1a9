use crate::error::OpenViduError;
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body extractor whose rejections use the API error body
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = OpenViduError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err: JsonRejection| {
                let message = match err {
                    JsonRejection::JsonDataError(e) => format!("invalid JSON data: {}", e.body_text()),
                    JsonRejection::JsonSyntaxError(e) => {
                        format!("JSON syntax error: {}", e.body_text())
                    }
                    JsonRejection::MissingJsonContentType(_) => {
                        "missing Content-Type: application/json header".to_string()
                    }
                    other => other.body_text(),
                };
                OpenViduError::invalid(message)
            })?;

        Ok(ApiJson(value))
    }
}

/// Path parameter extractor whose rejections use the API error body
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = OpenViduError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err: PathRejection| OpenViduError::invalid(err.body_text()))?;

        Ok(ApiPath(value))
    }
}
