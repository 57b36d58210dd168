//! Chat Gateway Library
//!
//! An HTTP front end that relays chat conversations to a hosted inference
//! backend and streams the model output back to the caller. Non-API paths
//! are served by a static asset store.

pub mod assets;
pub mod chat;
pub mod config;
pub mod http;
pub mod inference;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
