//! Chat handling subsystem.
//!
//! # Data Flow
//! ```text
//! POST body
//!     → types.rs (parse, shape checks)
//!     → types.rs (inject default system message)
//!     → handler.rs (build invocation, call backend)
//!     → backend stream returned untouched, or
//!     → error.rs (500 rendering)
//! ```
//!
//! # Design Decisions
//! - Stateless across requests; one backend attempt per request
//! - Every failure stops at the handler boundary
//! - Model, prompt and token bound come from config, never from the caller

pub mod error;
pub mod handler;
pub mod types;

pub use error::{ChatError, ErrorPolicy};
pub use handler::handle_chat;
pub use types::{ChatMessage, ChatRequest, Role};

use std::time::Duration;

use crate::config::{ChatConfig, SecurityConfig, TimeoutConfig};
use crate::inference::InferenceInvocation;

/// Process-wide, read-only chat settings.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub errors: ErrorPolicy,
    /// Longest wait for the backend's response head.
    pub request_timeout: Duration,
    /// Largest accepted request body, in bytes.
    pub max_body_size: usize,
}

impl ChatSettings {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .filter(|prompt| !prompt.trim().is_empty()),
            max_tokens: config.max_tokens,
            errors: ErrorPolicy {
                expose_details: config.expose_error_details,
                allow_any_origin: config.cors_on_error,
            },
            request_timeout: Duration::from_secs(TimeoutConfig::default().request_secs),
            max_body_size: SecurityConfig::default().max_body_size,
        }
    }

    /// Override the request deadline and body size bound.
    pub fn with_limits(mut self, request_timeout: Duration, max_body_size: usize) -> Self {
        self.request_timeout = request_timeout;
        self.max_body_size = max_body_size;
        self
    }

    /// Describe the outbound call for a normalized conversation.
    pub fn invocation(&self, messages: Vec<ChatMessage>) -> InferenceInvocation {
        InferenceInvocation {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            raw_response: true,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}
