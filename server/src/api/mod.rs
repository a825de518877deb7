//! Request routing and the `/api/` endpoint contracts.
//!
//! The transport hands over an [`ApiRequest`] (method, target, headers,
//! body) and gets back an [`ApiResponse`], or `None` when the target is not
//! an API path and should be served from the static file root.

mod errors;
mod game;
mod maps;
mod payload;
mod router;

pub use payload::ErrorBody;
pub use router::{ApiContext, ApiRouter, Endpoint};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use log::error;
use serde::Serialize;

/// Decoded HTTP request as delivered by the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Request target as sent by the client, query string included.
    pub target: String,
    pub headers: HeaderMap,
    /// Raw body bytes. Endpoints decode them as JSON, so invalid UTF-8 fails
    /// the same way as any other malformed body.
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header. Values that are not valid header text are dropped.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Target without its query string.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn is_get_or_head(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }
}

/// Reply for an `/api/` request whose body could not be read.
pub fn unreadable_body() -> ApiResponse {
    errors::invalid_argument("Failed to read request body")
}

/// Response handed back to the transport.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status, "application/json", body),
            Err(err) => {
                error!("Failed to serialize response body: {}", err);
                Self::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status, "text/plain", body.as_bytes().to_vec())
    }

    pub fn no_cache(mut self) -> Self {
        self.headers
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        self
    }

    pub fn allow(mut self, methods: &'static str) -> Self {
        self.headers
            .insert(header::ALLOW, HeaderValue::from_static(methods));
        self
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(&header::CONTENT_TYPE)
    }

    /// Parses the body as JSON. Mostly useful in tests.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}
