//! Workers AI REST backend.
//!
//! Calls `POST {base}/accounts/{account}/ai/run/{model}` with
//! `{messages, max_tokens, stream}`. With an AI Gateway configured the call
//! goes to `{gateway_base}/{account}/{gateway}/workers-ai/{model}` instead and
//! carries the gateway cache headers.

use async_trait::async_trait;
use axum::response::Response;
use serde::Serialize;
use std::time::Duration;

use crate::chat::ChatMessage;
use crate::config::{AiGatewayConfig, InferenceConfig};
use crate::http::response::stream_response;
use crate::inference::{InferenceBackend, InferenceError, InferenceInvocation};

/// Environment variable consulted when no token is configured.
pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

const SKIP_CACHE_HEADER: &str = "cf-aig-skip-cache";
const CACHE_TTL_HEADER: &str = "cf-aig-cache-ttl";

#[derive(Debug, Serialize)]
struct RunPayload<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    stream: bool,
}

/// Workers AI client.
#[derive(Debug, Clone)]
pub struct WorkersAiBackend {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
    api_token: Option<String>,
    gateway: Option<AiGatewayConfig>,
}

impl WorkersAiBackend {
    pub fn new(config: &InferenceConfig, connect_timeout: Duration) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(InferenceError::Setup)?;

        let api_token = config
            .api_token
            .clone()
            .or_else(|| std::env::var(API_TOKEN_ENV).ok())
            .filter(|token| !token.is_empty());

        if api_token.is_none() {
            tracing::warn!("No inference API token configured; requests are sent unauthenticated");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            api_token,
            gateway: config.gateway.clone(),
        })
    }

    /// Endpoint for `model`.
    pub fn run_url(&self, model: &str) -> String {
        match &self.gateway {
            Some(gateway) => format!(
                "{}/{}/{}/workers-ai/{}",
                gateway.base_url.trim_end_matches('/'),
                self.account_id,
                gateway.id,
                model
            ),
            None => format!("{}/accounts/{}/ai/run/{}", self.base_url, self.account_id, model),
        }
    }
}

#[async_trait]
impl InferenceBackend for WorkersAiBackend {
    async fn run(&self, invocation: InferenceInvocation) -> Result<Response, InferenceError> {
        let url = self.run_url(&invocation.model);
        let payload = RunPayload {
            messages: &invocation.messages,
            max_tokens: invocation.max_tokens,
            stream: invocation.raw_response,
        };

        let mut request = self.client.post(&url).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        if let Some(gateway) = &self.gateway {
            if gateway.skip_cache {
                request = request.header(SKIP_CACHE_HEADER, "true");
            }
            if let Some(ttl) = gateway.cache_ttl {
                request = request.header(CACHE_TTL_HEADER, ttl.to_string());
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = %status, "Inference backend rejected request");
            return Err(InferenceError::Status { status, body });
        }

        Ok(stream_response(response))
    }
}
