use crate::utils::error::RekognizerError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

impl IntoResponse for RekognizerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                "Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// JSON body extractor. Malformed JSON is `BAD_REQUEST`; JSON of the wrong
/// shape is `VALIDATION_ERROR`.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RekognizerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| RekognizerError::bad_request(e.body_text()))?;

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| RekognizerError::bad_request(format!("Invalid JSON body: {}", e)))?;

        serde_json::from_value(value)
            .map(ValidJson)
            .map_err(|e| RekognizerError::validation(e.to_string()))
    }
}
