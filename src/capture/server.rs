//! Capture-only HTTP server
//!
//! Writes the raw body of each POST to a single capture file, replacing
//! whatever the previous request left there, and acknowledges receipt.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::common::handle::{bind_listener, ServerHandle};
use crate::common::Result;

use super::http::{read_head, write_continue, write_json_response};

/// Fixed acknowledgement for a captured body
pub const ACK_BODY: &[u8] = br#"{"success":true,"error":null}"#;

/// Bodies above this size are refused instead of buffered
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Capture server bound to one capture file
pub struct CaptureServer {
    capture_file: PathBuf,
}

impl CaptureServer {
    pub fn new(capture_file: impl Into<PathBuf>) -> Self {
        Self {
            capture_file: capture_file.into(),
        }
    }

    pub fn capture_file(&self) -> &Path {
        &self.capture_file
    }

    /// Bind `host:port` and serve in a background task
    pub async fn spawn(self, host: &str, port: u16) -> Result<ServerHandle> {
        let listener = bind_listener(host, port).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tracing::info!(
            capture_file = %self.capture_file.display(),
            "Capture server listening on http://{}",
            addr
        );

        let capture_file = Arc::new(self.capture_file);
        let task = tokio::spawn(accept_loop(listener, capture_file, shutdown_rx));

        Ok(ServerHandle::new(addr, shutdown_tx, task))
    }
}

async fn accept_loop(
    listener: TcpListener,
    capture_file: Arc<PathBuf>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                tracing::debug!("Capture server shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let capture_file = Arc::clone(&capture_file);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, &capture_file).await {
                            tracing::warn!(%peer, "Capture request failed: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, capture_file: &Path) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let head = match read_head(&mut reader).await {
        Ok(Some(head)) => head,
        Ok(None) => return Ok(()),
        Err(e) => {
            let body = serde_json::to_vec(&serde_json::json!({
                "success": false,
                "error": e.to_string(),
            }))?;
            write_json_response(&mut writer, 400, "Bad Request", &body).await?;
            return Err(e);
        }
    };

    tracing::debug!(%peer, method = %head.method, path = %head.path, "Capture request");

    if head.method != "POST" {
        let body = br#"{"success":false,"error":"method not allowed"}"#;
        return write_json_response(&mut writer, 405, "Method Not Allowed", body).await;
    }

    if head.content_length > MAX_BODY_BYTES {
        let body = br#"{"success":false,"error":"body too large"}"#;
        return write_json_response(&mut writer, 413, "Payload Too Large", body).await;
    }

    if head.expect_continue && head.content_length > 0 {
        write_continue(&mut writer).await?;
    }

    let mut body = vec![0u8; head.content_length];
    reader.read_exact(&mut body).await?;

    if let Err(e) = tokio::fs::write(capture_file, &body).await {
        tracing::error!(path = %capture_file.display(), "Failed to write capture file: {}", e);
        let body = serde_json::to_vec(&serde_json::json!({
            "success": false,
            "error": e.to_string(),
        }))?;
        return write_json_response(&mut writer, 500, "Internal Server Error", &body).await;
    }

    tracing::debug!(bytes = body.len(), path = %capture_file.display(), "Captured request body");

    write_json_response(&mut writer, 200, "OK", ACK_BODY).await
}
