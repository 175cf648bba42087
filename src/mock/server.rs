//! Decision mock HTTP server
//!
//! A single axum fallback handler receives every request and dispatches it
//! through the mode's [`RouteTable`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tokio::sync::oneshot;

use crate::common::config::{MockConfig, MockMode};
use crate::common::handle::{bind_listener, ServerHandle};
use crate::common::{Error, Result};

use super::outcome::{OutcomeSource, SeededSource, ThreadRngSource};
use super::request::RequestRecord;
use super::routes::RouteTable;

#[derive(Clone)]
struct MockState {
    routes: Arc<RouteTable>,
    source: Arc<dyn OutcomeSource>,
}

/// Decision mock server, parameterized by its response policy
pub struct MockServer {
    mode: MockMode,
    routes: RouteTable,
    source: Arc<dyn OutcomeSource>,
}

impl MockServer {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            routes: RouteTable::for_mode(mode),
            source: Arc::new(ThreadRngSource),
        }
    }

    pub fn from_config(config: &MockConfig) -> Self {
        let server = Self::new(config.mode);
        match config.seed {
            Some(seed) => server.with_source(Arc::new(SeededSource::new(seed))),
            None => server,
        }
    }

    /// Replace the randomness used for randomized outcomes
    pub fn with_source(mut self, source: Arc<dyn OutcomeSource>) -> Self {
        self.source = source;
        self
    }

    pub fn mode(&self) -> MockMode {
        self.mode
    }

    pub fn router(&self) -> Router {
        let state = MockState {
            routes: Arc::new(self.routes.clone()),
            source: Arc::clone(&self.source),
        };
        Router::new()
            .fallback(dispatch)
            .layer(DefaultBodyLimit::disable())
            .with_state(state)
    }

    /// Bind `host:port` and serve in a background task
    ///
    /// Port 0 binds an ephemeral port; read it back from the handle.
    pub async fn spawn(self, host: &str, port: u16) -> Result<ServerHandle> {
        let listener = bind_listener(host, port).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tracing::info!(mode = ?self.mode, "Mock server listening on http://{}", addr);

        let task = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .map_err(|e| Error::Server(e.to_string()))
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task))
    }
}

async fn dispatch(
    State(state): State<MockState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let record = RequestRecord::new(method, uri.path(), Some(remote), body);
    record.log();

    let handler = state.routes.resolve(&record.method, &record.path);
    let reply = handler.respond(&record, state.source.as_ref());

    (reply.status, Json(reply.body)).into_response()
}
