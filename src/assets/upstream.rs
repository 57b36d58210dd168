//! Forwarding assets to an origin server.
//!
//! # Responsibilities
//! - Rewrite the request URI to the origin authority
//! - Forward method, headers and body unchanged
//! - Stream the origin's response back
//!
//! # Design Decisions
//! - Single attempt, no retries
//! - Origin unreachable → 502 Bad Gateway

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;

use crate::assets::AssetStore;

/// Proxies asset requests to `http://{origin}`.
#[derive(Debug, Clone)]
pub struct UpstreamAssets {
    client: Client<HttpConnector, Body>,
    origin: Authority,
}

impl UpstreamAssets {
    /// `origin` is an authority such as "127.0.0.1:8788".
    pub fn new(origin: &str) -> Result<Self, InvalidUri> {
        let origin = Authority::from_str(origin)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { client, origin })
    }

    fn rewrite(&self, uri: &Uri) -> Uri {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.origin.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts).unwrap_or_else(|_| uri.clone())
    }
}

#[async_trait]
impl AssetStore for UpstreamAssets {
    async fn fetch(&self, request: Request<Body>) -> Response {
        let (mut parts, body) = request.into_parts();
        parts.uri = self.rewrite(&parts.uri);
        let path = parts.uri.path().to_string();

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => response.map(Body::new),
            Err(e) => {
                tracing::error!(origin = %self.origin, path = %path, error = %e, "Asset origin error");
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
}
