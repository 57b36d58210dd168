//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default instruction injected when a conversation carries no system message.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in many things. Whatever users ask questions, you are an expert in whatever subject matter that is. Always provide concise and accurate responses.";

/// Root configuration for the chat gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// API prefix and chat endpoint paths.
    pub routes: RoutesConfig,

    /// Chat normalization and error-shaping settings.
    pub chat: ChatConfig,

    /// Inference backend. `None` leaves the gateway without a backend.
    pub inference: Option<InferenceConfig>,

    /// Static asset source.
    pub assets: AssetsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8787").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8787".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed until the response head is produced, in seconds.
    /// Streamed bodies are not cut by this deadline.
    pub request_secs: u64,

    /// Connection establishment timeout towards the inference backend.
    pub connect_secs: u64,

    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            connect_secs: 10,
            shutdown_grace_secs: 10,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Path layout of the API surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Prefix reserved for API endpoints; everything else is an asset.
    pub api_prefix: String,

    /// Exact path of the chat endpoint.
    pub chat_path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/".to_string(),
            chat_path: "/api/chat".to_string(),
        }
    }
}

/// Chat handler settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Backend model identifier.
    pub model: String,

    /// Instruction prepended when the caller sends no system message.
    /// An empty string disables injection.
    pub system_prompt: Option<String>,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,

    /// Include the failure message as `details` in JSON error bodies.
    pub expose_error_details: bool,

    /// Add `Access-Control-Allow-Origin: *` to JSON error responses.
    pub cors_on_error: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "@cf/openai/gpt-oss-120b".to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tokens: 2048,
            expose_error_details: false,
            cors_on_error: false,
        }
    }
}

/// Workers AI inference backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// REST API root (e.g., "https://api.cloudflare.com/client/v4").
    pub base_url: String,

    /// Account that owns the model deployment.
    pub account_id: String,

    /// Bearer token. Falls back to `CLOUDFLARE_API_TOKEN` when unset.
    pub api_token: Option<String>,

    /// Route calls through an AI Gateway instead of the direct endpoint.
    pub gateway: Option<AiGatewayConfig>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudflare.com/client/v4".to_string(),
            account_id: String::new(),
            api_token: None,
            gateway: None,
        }
    }
}

/// AI Gateway options forwarded with each inference call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiGatewayConfig {
    /// Gateway identifier.
    pub id: String,

    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,

    /// Bypass the gateway cache.
    #[serde(default)]
    pub skip_cache: bool,

    /// Cache time-to-live in seconds.
    #[serde(default)]
    pub cache_ttl: Option<u64>,
}

fn default_gateway_base_url() -> String {
    "https://gateway.ai.cloudflare.com/v1".to_string()
}

/// Where static assets come from.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetSource {
    /// Serve files from a local directory.
    #[default]
    Dir,
    /// Forward to an upstream origin.
    Upstream,
    /// No assets; every non-API request is a 404.
    None,
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub source: AssetSource,

    /// Root directory for `source = "dir"`.
    pub dir: String,

    /// Origin authority for `source = "upstream"` (e.g., "127.0.0.1:8788").
    pub upstream: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            source: AssetSource::Dir,
            dir: "public".to_string(),
            upstream: String::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8787");
        assert_eq!(config.chat.max_tokens, 2048);
        assert_eq!(config.chat.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(config.routes.chat_path, "/api/chat");
        assert_eq!(config.assets.source, AssetSource::Dir);
        assert!(config.inference.is_none());
    }

    #[test]
    fn parses_inference_with_gateway() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [chat]
            model = "@cf/meta/llama-3.1-8b-instruct"
            max_tokens = 512

            [inference]
            account_id = "acct"

            [inference.gateway]
            id = "gw"
            skip_cache = true
            cache_ttl = 3360

            [assets]
            source = "upstream"
            upstream = "127.0.0.1:8788"
            "#,
        )
        .unwrap();

        assert_eq!(config.chat.model, "@cf/meta/llama-3.1-8b-instruct");
        assert_eq!(config.chat.max_tokens, 512);
        let inference = config.inference.unwrap();
        assert_eq!(inference.base_url, "https://api.cloudflare.com/client/v4");
        let gateway = inference.gateway.unwrap();
        assert_eq!(gateway.base_url, "https://gateway.ai.cloudflare.com/v1");
        assert!(gateway.skip_cache);
        assert_eq!(gateway.cache_ttl, Some(3360));
        assert_eq!(config.assets.source, AssetSource::Upstream);
    }
}
