//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::StreamExt;
use std::convert::Infallible;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use chat_gateway::assets::AssetStore;
use chat_gateway::config::GatewayConfig;
use chat_gateway::inference::{InferenceBackend, InferenceError, InferenceInvocation};
use chat_gateway::lifecycle::Services;
use chat_gateway::HttpServer;

/// What the mock backend answers with.
#[derive(Clone)]
enum Reply {
    Stream {
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        chunks: Vec<&'static str>,
    },
    Stall(Duration),
    Fail,
}

/// In-process inference backend that records every invocation.
pub struct MockBackend {
    calls: Mutex<Vec<InferenceInvocation>>,
    reply: Reply,
}

impl MockBackend {
    /// Streams `chunks` as an event stream.
    pub fn streaming(chunks: Vec<&'static str>) -> Arc<Self> {
        Self::with_reply(
            StatusCode::OK,
            vec![("content-type", "text/event-stream")],
            chunks,
        )
    }

    pub fn with_reply(
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        chunks: Vec<&'static str>,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Reply::Stream { status, headers, chunks },
        })
    }

    /// Every call fails as if the backend rejected it.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Reply::Fail,
        })
    }

    /// Waits `delay` before answering with an empty event stream.
    pub fn stalling(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Reply::Stall(delay),
        })
    }

    pub fn calls(&self) -> Vec<InferenceInvocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn run(&self, invocation: InferenceInvocation) -> Result<Response, InferenceError> {
        self.calls.lock().unwrap().push(invocation);

        match &self.reply {
            Reply::Stream { status, headers, chunks } => {
                let stream = futures_util::stream::iter(chunks.clone())
                    .map(|chunk| Ok::<_, Infallible>(Bytes::from_static(chunk.as_bytes())));
                let mut builder = Response::builder().status(*status);
                for (name, value) in headers {
                    builder = builder.header(*name, *value);
                }
                Ok(builder.body(Body::from_stream(stream)).unwrap())
            }
            Reply::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Response::new(Body::empty()))
            }
            Reply::Fail => Err(InferenceError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "model overloaded".into(),
            }),
        }
    }
}

/// Asset store that echoes the request line.
#[derive(Default)]
pub struct MockAssets {
    hits: Mutex<Vec<String>>,
}

impl MockAssets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for MockAssets {
    async fn fetch(&self, request: Request<Body>) -> Response {
        let line = format!("{} {}", request.method(), request.uri().path());
        self.hits.lock().unwrap().push(line.clone());
        ([("x-asset-store", "mock")], format!("asset: {line}")).into_response()
    }
}

/// Gateway router wired to mocks.
pub fn gateway(
    config: GatewayConfig,
    backend: Option<Arc<MockBackend>>,
    assets: Arc<MockAssets>,
) -> Router {
    let services = Services {
        inference: backend.map(|b| b as Arc<dyn InferenceBackend>),
        assets,
    };
    HttpServer::new(config, services).router()
}

/// Collect a response into status, headers and body bytes.
pub async fn collect(response: Response) -> (StatusCode, HeaderMap, Bytes) {
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    (parts.status, parts.headers, bytes)
}

pub fn post_json(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A request seen by the mock Workers AI server.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct WorkersAiState {
    status: StatusCode,
    chunks: Vec<&'static str>,
    seen: Arc<Mutex<Vec<RecordedCall>>>,
}

async fn workers_ai_handler(State(state): State<WorkersAiState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    state.seen.lock().unwrap().push(RecordedCall {
        path: parts.uri.path().to_string(),
        headers: parts.headers,
        body: serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
    });

    if !state.status.is_success() {
        return (state.status, "backend said no").into_response();
    }

    let stream = futures_util::stream::iter(state.chunks).then(|chunk| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok::<_, Infallible>(chunk)
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header("x-backend", "mock-workers-ai")
        .body(Body::from_stream(stream))
        .unwrap()
}

/// Start a fake Workers AI endpoint on an ephemeral port.
///
/// Answers every POST with `status`; on success streams `chunks` with a short
/// pause between them.
pub async fn start_mock_workers_ai(
    status: StatusCode,
    chunks: Vec<&'static str>,
) -> (SocketAddr, Arc<Mutex<Vec<RecordedCall>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .fallback(workers_ai_handler)
        .with_state(WorkersAiState {
            status,
            chunks,
            seen: seen.clone(),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, app).into_future());

    (addr, seen)
}

/// Sets its flag when dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

async fn endless_handler(State(dropped): State<Arc<AtomicBool>>) -> Response {
    let guard = DropFlag(dropped);
    let stream = futures_util::stream::unfold(guard, |guard| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Some((
            Ok::<_, Infallible>(Bytes::from_static(b"data: {\"response\":\"tick\"}\n\n")),
            guard,
        ))
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(stream))
        .unwrap()
}

/// Start a fake Workers AI endpoint whose event stream never ends.
///
/// The returned flag flips once the server drops the stream, which happens
/// when the peer goes away.
pub async fn start_endless_workers_ai() -> (SocketAddr, Arc<AtomicBool>) {
    let dropped = Arc::new(AtomicBool::new(false));
    let app = Router::new()
        .fallback(endless_handler)
        .with_state(dropped.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, app).into_future());

    (addr, dropped)
}
