//! Response pass-through.
//!
//! # Responsibilities
//! - Turn an upstream response into a client response without buffering
//! - Drop hop-by-hop headers; the server re-derives connection framing
//!
//! # Design Decisions
//! - The body is the upstream byte stream itself; dropping the client
//!   response drops the upstream connection
//! - Status and end-to-end headers are copied as received

use axum::{
    body::Body,
    http::HeaderMap,
    response::Response,
};

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Whether a header survives forwarding.
pub fn is_end_to_end(name: &str) -> bool {
    !HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Copy the end-to-end headers of an upstream response.
pub fn preserve_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if is_end_to_end(name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Wrap a `reqwest` response so its body streams straight to the client.
pub fn stream_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = preserve_response_headers(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
