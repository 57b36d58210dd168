//! Static asset collaborators.
//!
//! Every request outside the API namespace is handed to an `AssetStore`
//! unmodified, and whatever it answers goes back to the client verbatim.
//!
//! - dir.rs: files from a local directory
//! - upstream.rs: forwarding to an origin server

pub mod dir;
pub mod upstream;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

pub use dir::DirAssets;
pub use upstream::UpstreamAssets;

/// Source of static assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Answer `request`. Implementations map their own failures to responses.
    async fn fetch(&self, request: Request<Body>) -> Response;
}

/// Store with no assets at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

#[async_trait]
impl AssetStore for NoAssets {
    async fn fetch(&self, _request: Request<Body>) -> Response {
        (StatusCode::NOT_FOUND, "Not found").into_response()
    }
}
