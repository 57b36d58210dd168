//! Inference backend seam.
//!
//! # Responsibilities
//! - Describe one outbound model call (`InferenceInvocation`)
//! - Abstract the remote execution service behind `InferenceBackend`
//! - Hand back the backend's streamed response without buffering it
//!
//! # Design Decisions
//! - The backend is optional at runtime; callers check presence explicitly
//! - Non-success backend statuses are errors, not pass-through responses
//! - No retries: exactly one call per invocation

pub mod workers_ai;

use async_trait::async_trait;
use axum::{http::StatusCode, response::Response};
use std::time::Duration;
use thiserror::Error;

use crate::chat::ChatMessage;

pub use workers_ai::WorkersAiBackend;

/// One outbound model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceInvocation {
    /// Backend model identifier.
    pub model: String,
    /// Normalized conversation, in order.
    pub messages: Vec<ChatMessage>,
    /// Output token bound.
    pub max_tokens: u32,
    /// Ask for the raw, incrementally delivered response.
    pub raw_response: bool,
}

/// Errors raised by an inference backend.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Connection, TLS or protocol failure talking to the backend.
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("inference backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Backend sent no response head before the deadline.
    #[error("inference backend did not respond within {0:?}")]
    Timeout(Duration),

    /// Client could not be constructed.
    #[error("inference client setup failed: {0}")]
    Setup(#[source] reqwest::Error),
}

/// Remote execution service for chat models.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Execute `invocation`, returning the backend's response (status,
    /// headers, streaming body) as produced.
    async fn run(&self, invocation: InferenceInvocation) -> Result<Response, InferenceError>;
}
