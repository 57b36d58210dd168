//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the collaborators the gateway talks to (inference backend, asset store)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing `[inference]` section is not an error; chat requests then get
//!   the backend-unavailable response

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::assets::{AssetStore, DirAssets, NoAssets, UpstreamAssets};
use crate::config::{AssetSource, GatewayConfig};
use crate::inference::{InferenceBackend, InferenceError, WorkersAiBackend};

/// Errors raised while wiring the gateway.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid asset origin '{origin}': {source}")]
    AssetOrigin {
        origin: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// External collaborators of the gateway.
#[derive(Clone)]
pub struct Services {
    pub inference: Option<Arc<dyn InferenceBackend>>,
    pub assets: Arc<dyn AssetStore>,
}

impl Services {
    /// Services with no backend and no assets.
    pub fn empty() -> Self {
        Self {
            inference: None,
            assets: Arc::new(NoAssets),
        }
    }
}

/// Build collaborators from configuration.
pub fn build_services(config: &GatewayConfig) -> Result<Services, StartupError> {
    let inference: Option<Arc<dyn InferenceBackend>> = match &config.inference {
        Some(inference) => {
            let backend = WorkersAiBackend::new(
                inference,
                Duration::from_secs(config.timeouts.connect_secs),
            )?;
            tracing::info!(
                model = %config.chat.model,
                gateway = inference.gateway.as_ref().map(|g| g.id.as_str()).unwrap_or("none"),
                "Inference backend configured"
            );
            Some(Arc::new(backend) as Arc<dyn InferenceBackend>)
        }
        None => {
            tracing::warn!("No inference backend configured; chat requests will fail");
            None
        }
    };

    let assets: Arc<dyn AssetStore> = match config.assets.source {
        AssetSource::Dir => {
            tracing::info!(dir = %config.assets.dir, "Serving assets from directory");
            Arc::new(DirAssets::new(&config.assets.dir))
        }
        AssetSource::Upstream => {
            let origin = &config.assets.upstream;
            let store = UpstreamAssets::new(origin).map_err(|source| StartupError::AssetOrigin {
                origin: origin.clone(),
                source,
            })?;
            tracing::info!(origin = %origin, "Forwarding assets to origin");
            Arc::new(store)
        }
        AssetSource::None => Arc::new(NoAssets),
    };

    Ok(Services { inference, assets })
}
