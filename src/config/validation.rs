//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, token bound > 0)
//! - Check that addresses and URLs parse
//! - Check that the chat endpoint sits under the API prefix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{AssetSource, GatewayConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("routes.api_prefix '{0}' must start and end with '/'")]
    InvalidApiPrefix(String),

    #[error("routes.chat_path '{0}' must be a literal path below '/'")]
    InvalidChatPath(String),

    #[error("routes.chat_path '{chat_path}' is not under api_prefix '{api_prefix}'")]
    ChatPathOutsidePrefix { chat_path: String, api_prefix: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if let Some(tls) = &config.listener.tls {
        check_non_empty(&mut errors, "listener.tls.cert_path", &tls.cert_path);
        check_non_empty(&mut errors, "listener.tls.key_path", &tls.key_path);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    let routes = &config.routes;
    if !routes.api_prefix.starts_with('/') || !routes.api_prefix.ends_with('/') {
        errors.push(ValidationError::InvalidApiPrefix(routes.api_prefix.clone()));
    } else if !routes.chat_path.starts_with(&routes.api_prefix) {
        errors.push(ValidationError::ChatPathOutsidePrefix {
            chat_path: routes.chat_path.clone(),
            api_prefix: routes.api_prefix.clone(),
        });
    }
    if routes.chat_path == "/" || routes.chat_path.contains(['{', '}']) {
        errors.push(ValidationError::InvalidChatPath(routes.chat_path.clone()));
    }

    check_non_empty(&mut errors, "chat.model", &config.chat.model);
    if config.chat.max_tokens == 0 {
        errors.push(ValidationError::Zero("chat.max_tokens"));
    }

    if let Some(inference) = &config.inference {
        check_url(&mut errors, "inference.base_url", &inference.base_url);
        check_non_empty(&mut errors, "inference.account_id", &inference.account_id);
        if let Some(gateway) = &inference.gateway {
            check_non_empty(&mut errors, "inference.gateway.id", &gateway.id);
            check_url(&mut errors, "inference.gateway.base_url", &gateway.base_url);
        }
    }

    match config.assets.source {
        AssetSource::Dir => check_non_empty(&mut errors, "assets.dir", &config.assets.dir),
        AssetSource::Upstream => check_non_empty(&mut errors, "assets.upstream", &config.assets.upstream),
        AssetSource::None => {}
    }

    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_non_empty(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Empty(field));
    }
}
