use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

/// Handler-boundary error. Every variant renders as the `{ ok: false, error }`
/// envelope with the matching HTTP status, so callers can branch on `ok`
/// regardless of which side failed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing Airtable env vars")]
    MissingCredentials,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    /// Store errors keep the upstream status and message.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_per_variant() {
        assert_eq!(
            ApiError::MissingCredentials.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Store(StoreError::Api {
                status: 422,
                message: "bad field".into()
            })
            .into_response()
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn body_is_the_ok_false_envelope() {
        let response = ApiError::MissingCredentials.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Missing Airtable env vars");
    }
}
