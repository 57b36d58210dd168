//! Chat request dispatch.

use axum::{
    body::{to_bytes, Body},
    response::Response,
};
use std::time::Instant;

use crate::chat::{ChatError, ChatRequest, ChatSettings};
use crate::inference::{InferenceBackend, InferenceError};
use crate::observability::metrics;

/// Run one chat request: parse, normalize, dispatch.
///
/// Always produces a response. On success it is the backend's own response,
/// streamed through as is.
pub async fn handle_chat(
    settings: &ChatSettings,
    backend: Option<&dyn InferenceBackend>,
    request_id: &str,
    body: Body,
) -> Response {
    match dispatch(settings, backend, request_id, body).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                kind = err.kind(),
                error = %err,
                "Error processing chat request"
            );
            settings.errors.render(&err)
        }
    }
}

async fn dispatch(
    settings: &ChatSettings,
    backend: Option<&dyn InferenceBackend>,
    request_id: &str,
    body: Body,
) -> Result<Response, ChatError> {
    let bytes = to_bytes(body, settings.max_body_size)
        .await
        .map_err(ChatError::Body)?;
    let request = ChatRequest::from_slice(&bytes)?;
    let messages = request.normalize(settings.system_prompt.as_deref())?;

    let backend = backend.ok_or(ChatError::BackendUnavailable)?;
    let invocation = settings.invocation(messages);

    tracing::debug!(
        request_id = %request_id,
        model = %invocation.model,
        messages = invocation.messages.len(),
        "Dispatching chat request"
    );

    let start = Instant::now();
    let result = match tokio::time::timeout(settings.request_timeout, backend.run(invocation)).await {
        Ok(result) => result,
        Err(_) => Err(InferenceError::Timeout(settings.request_timeout)),
    };
    let outcome = match &result {
        Ok(_) => "ok",
        Err(InferenceError::Timeout(_)) => "timeout",
        Err(_) => "error",
    };
    metrics::record_inference(outcome, start);

    let response = result?;
    tracing::info!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Inference stream opened"
    );
    Ok(response)
}
