//! Mapping of errors onto HTTP responses.

use axum::http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use copybridge_common::Error;

/// Error returned from request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Domain error from the clipboard service.
    Service(Error),
    /// Request body could not be parsed.
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Service(e)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Service(e) => match e {
                Error::Authentication => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
                Error::Encoding(_) | Error::InvalidInput(_) => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                Error::NotFound(_) => (StatusCode::NOT_FOUND, "clipboard not found".to_string()),
                Error::AlreadyExists(_) => {
                    (StatusCode::CONFLICT, "clipboard already exists".to_string())
                }
                Error::Randomness(_)
                | Error::Derivation(_)
                | Error::CorruptCredential(_)
                | Error::CorruptRecord(_)
                | Error::Crypto(_)
                | Error::Storage(_)
                | Error::Io(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            if let ApiError::Service(e) = &self {
                error!(error = %e, "Request failed");
            }
        }

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"copybridge\""),
            );
        }
        response
    }
}
