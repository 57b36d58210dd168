//! Chat handler failures and their HTTP rendering.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::inference::InferenceError;

/// Generic message returned for every JSON error.
pub const GENERIC_ERROR: &str = "Failed to process request";

/// Body returned when no inference backend is configured.
pub const BACKEND_UNAVAILABLE_BODY: &str = "Error: inference backend is not configured";

/// Everything that can go wrong between receiving a chat request and
/// handing back the backend stream.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("messages must be an array")]
    MessagesNotArray,

    #[error("invalid message at index {index}: {source}")]
    InvalidMessage {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("no messages provided")]
    NoMessages,

    #[error("inference backend is not configured")]
    BackendUnavailable,

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ChatError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Body(_) | ChatError::InvalidJson(_) | ChatError::NotAnObject => "malformed_input",
            ChatError::MessagesNotArray | ChatError::InvalidMessage { .. } => "malformed_input",
            ChatError::NoMessages => "empty_conversation",
            ChatError::BackendUnavailable => "backend_unavailable",
            ChatError::Inference(_) => "backend_execution",
        }
    }
}

/// How JSON error responses are shaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPolicy {
    /// Include the failure message as `details`.
    pub expose_details: bool,
    /// Add `Access-Control-Allow-Origin: *`.
    pub allow_any_origin: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorPolicy {
    /// Render a failure as an HTTP response.
    ///
    /// A missing backend yields a plain-text 500; everything else is the
    /// generic JSON 500.
    pub fn render(&self, err: &ChatError) -> Response {
        if matches!(err, ChatError::BackendUnavailable) {
            return (StatusCode::INTERNAL_SERVER_ERROR, BACKEND_UNAVAILABLE_BODY).into_response();
        }

        let body = ErrorBody {
            error: GENERIC_ERROR,
            details: self.expose_details.then(|| err.to_string()),
        };
        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        if self.allow_any_origin {
            response
                .headers_mut()
                .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }
        response
    }
}
