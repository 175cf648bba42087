//! Capture-only server
//!
//! Used where a test cares about what the client sent, not what it got
//! back.

mod http;
mod server;

pub use http::parse_content_length;
pub use server::{CaptureServer, ACK_BODY};
