//! Request classification.
//!
//! # Responsibilities
//! - Decide the disposition of every request from its path and method
//! - Keep the asset namespace and the API namespace disjoint
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Explicit NotFound rather than silent asset fallback under the API prefix

use axum::http::Method;

use crate::config::RoutesConfig;
use crate::routing::matcher::{ExactPathMatcher, Matcher, PathPrefixMatcher};

/// What the gateway does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand to the asset store untouched.
    Asset,
    /// POST to the chat endpoint.
    Chat,
    /// Chat endpoint hit with a method other than POST.
    MethodNotAllowed,
    /// Unknown path under the API prefix.
    NotFound,
}

impl Disposition {
    /// Label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Asset => "asset",
            Disposition::Chat => "chat",
            Disposition::MethodNotAllowed => "method_not_allowed",
            Disposition::NotFound => "not_found",
        }
    }
}

/// Compiled route table.
#[derive(Debug, Clone)]
pub struct Router {
    api: PathPrefixMatcher,
    chat: ExactPathMatcher,
}

impl Router {
    pub fn from_config(config: &RoutesConfig) -> Self {
        Self {
            api: PathPrefixMatcher::new(config.api_prefix.clone()),
            chat: ExactPathMatcher::new(config.chat_path.clone()),
        }
    }

    /// Classify a request.
    pub fn classify(&self, method: &Method, path: &str) -> Disposition {
        if path == "/" || !self.api.matches_path(path) {
            return Disposition::Asset;
        }

        if self.chat.matches_path(path) {
            if method == Method::POST {
                Disposition::Chat
            } else {
                Disposition::MethodNotAllowed
            }
        } else {
            Disposition::NotFound
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::from_config(&RoutesConfig::default())
    }
}
