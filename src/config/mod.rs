//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → split into per-subsystem settings at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AiGatewayConfig, AssetSource, AssetsConfig, ChatConfig, GatewayConfig, InferenceConfig,
    ListenerConfig, LogFormat, ObservabilityConfig, RoutesConfig, SecurityConfig, TimeoutConfig,
    TlsConfig,
};
pub use validation::ValidationError;
