//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Bind server to listener, plain or TLS
//! - Classify requests and dispatch them to assets or chat
//! - Drain in-flight requests on shutdown
//!
//! # Design Decisions
//! - The chat endpoint is mounted outside the timeout and body limit layers;
//!   the chat handler enforces both itself so every failure renders the same way

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::assets::AssetStore;
use crate::chat::{handle_chat, ChatSettings};
use crate::config::{GatewayConfig, TlsConfig};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::inference::InferenceBackend;
use crate::lifecycle::{build_services, Services, StartupError};
use crate::observability::metrics;
use crate::routing::{Disposition, Router as GatewayRouter};

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<GatewayRouter>,
    pub chat: Arc<ChatSettings>,
    pub inference: Option<Arc<dyn InferenceBackend>>,
    pub assets: Arc<dyn AssetStore>,
}

/// HTTP server for the chat gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server around already-built collaborators.
    ///
    /// `config` is expected to have passed validation.
    pub fn new(config: GatewayConfig, services: Services) -> Self {
        let state = AppState {
            routes: Arc::new(GatewayRouter::from_config(&config.routes)),
            chat: Arc::new(ChatSettings::from_config(&config.chat).with_limits(
                Duration::from_secs(config.timeouts.request_secs),
                config.security.max_body_size,
            )),
            inference: services.inference,
            assets: services.assets,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server, building collaborators from the configuration.
    pub fn from_config(config: GatewayConfig) -> Result<Self, StartupError> {
        let services = build_services(&config)?;
        Ok(Self::new(config, services))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let everything_else = Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route(&config.routes.chat_path, any(gateway_handler))
            .merge(everything_else)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The request handler, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    ///
    /// In-flight requests get `shutdown_grace_secs` to finish; streams still
    /// open after that are dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let (draining_tx, draining_rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, self.router).with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            let _ = draining_tx.send(());
        });

        let deadline = async move {
            match draining_rx.await {
                Ok(()) => tokio::time::sleep(grace).await,
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = server.into_future() => result?,
            _ = deadline => {
                tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, dropping open connections");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
        tracing::info!(address = %addr, cert = %tls.cert_path, "HTTPS server starting");

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let handle = axum_server::Handle::new();
        let signal_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            signal_handle.graceful_shutdown(Some(grace));
        });

        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Single entry point: classify, then hand off.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let disposition = state.routes.classify(&method, &path);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        disposition = disposition.as_str(),
        "Routing request"
    );

    let response = match disposition {
        Disposition::Asset => state.assets.fetch(request).await,
        Disposition::Chat => {
            handle_chat(
                &state.chat,
                state.inference.as_deref(),
                &request_id,
                request.into_body(),
            )
            .await
        }
        Disposition::MethodNotAllowed => {
            tracing::warn!(request_id = %request_id, method = %method, "Method not allowed on chat endpoint");
            (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "POST")],
                "Method not allowed",
            )
                .into_response()
        }
        Disposition::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
    };

    metrics::record_request(disposition.as_str(), response.status().as_u16(), start_time);
    response
}
