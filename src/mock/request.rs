//! Request logging and body capture
//!
//! Bodies are decoded best-effort: JSON when possible, raw bytes otherwise.
//! Recording a request never influences the response.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::Method;
use serde_json::Value;

/// Decoded request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Non-empty body that is not valid JSON
    Raw(Bytes),
    Empty,
}

impl RequestBody {
    pub fn decode(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(bytes),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Pretty-printed JSON, or `None` when the body is not JSON
    pub fn pretty(&self) -> Option<String> {
        self.json().and_then(|v| serde_json::to_string_pretty(v).ok())
    }
}

/// One recorded incoming request
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: Method,
    pub path: String,
    pub remote: Option<SocketAddr>,
    pub body: RequestBody,
}

impl RequestRecord {
    pub fn new(method: Method, path: impl Into<String>, remote: Option<SocketAddr>, body: Bytes) -> Self {
        Self {
            method,
            path: path.into(),
            remote,
            body: RequestBody::decode(body),
        }
    }

    /// Log the request line and its body
    pub fn log(&self) {
        let remote = self
            .remote
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        tracing::info!("{} {} from {}", self.method, self.path, remote);

        match &self.body {
            RequestBody::Json(_) => {
                if let Some(pretty) = self.body.pretty() {
                    tracing::info!("[{} {}] Received: {}", self.method, self.path, pretty);
                }
            }
            RequestBody::Raw(bytes) => {
                tracing::info!(
                    bytes = bytes.len(),
                    "[{} {}] Received request (no JSON body)",
                    self.method,
                    self.path
                );
            }
            RequestBody::Empty => {
                tracing::info!("[{} {}] Received request (no JSON body)", self.method, self.path);
            }
        }
    }
}
