//! Directory-backed assets.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::Request,
    response::Response,
};
use std::path::Path;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::assets::AssetStore;

/// Serves files under a root directory; `index.html` answers directory paths.
#[derive(Debug, Clone)]
pub struct DirAssets {
    service: ServeDir,
}

impl DirAssets {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            service: ServeDir::new(root).append_index_html_on_directories(true),
        }
    }
}

#[async_trait]
impl AssetStore for DirAssets {
    async fn fetch(&self, request: Request<Body>) -> Response {
        match self.service.clone().oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        }
    }
}
