//! Minimal HTTP/1.1 request head parsing
//!
//! Only what the capture endpoint needs: request line, `Content-Length`
//! and `Expect: 100-continue`. Headers end at the first empty line:
//! ```text
//! POST /hook HTTP/1.1\r\n
//! Content-Length: <byte-length>\r\n
//! \r\n
//! <body>
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::common::{Error, Result};

/// Header lines accepted before the request is rejected
const MAX_HEADER_LINES: usize = 100;

/// Parsed request line and the headers the capture server uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    pub content_length: usize,
    pub expect_continue: bool,
}

/// Body length from a `Content-Length` value
///
/// Anything other than plain ASCII digits counts as zero.
pub fn parse_content_length(value: &str) -> usize {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    value.parse().unwrap_or(0)
}

/// Read a request head; `Ok(None)` if the peer closed before sending one
pub async fn read_head<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<RequestHead>> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(None);
    }

    let mut parts = request_line.split_whitespace();
    let (method, path) = match (parts.next(), parts.next()) {
        (Some(method), Some(path)) => (method.to_string(), path.to_string()),
        _ => {
            return Err(Error::Server(format!(
                "Malformed request line: {}",
                request_line.trim()
            )))
        }
    };

    let mut head = RequestHead {
        method,
        path,
        content_length: 0,
        expect_continue: false,
    };

    for _ in 0..MAX_HEADER_LINES {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(Error::Server("Connection closed inside headers".to_string()));
        }

        // Empty line (just \r\n) signals end of headers
        if line == "\r\n" || line == "\n" {
            return Ok(Some(head));
        }

        if let Some((name, value)) = line.trim_end().split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("content-length") {
                head.content_length = parse_content_length(value);
            } else if name.eq_ignore_ascii_case("expect") {
                head.expect_continue = value.trim().eq_ignore_ascii_case("100-continue");
            }
        }
    }

    Err(Error::Server(format!(
        "More than {MAX_HEADER_LINES} header lines"
    )))
}

/// Write a complete JSON response and close the exchange
pub async fn write_json_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    status: u16,
    reason: &str,
    body: &[u8],
) -> Result<()> {
    let header = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;

    Ok(())
}

/// Interim response for clients waiting on `Expect: 100-continue`
pub async fn write_continue<W: AsyncWrite + Unpin>(writer: &mut W) -> Result<()> {
    writer.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await?;
    writer.flush().await?;
    Ok(())
}
