//! Hook Harness - test harness for hook-driven policy clients
//!
//! Provides mock HTTP backends standing in for the authorization and
//! notification service, and a scenario runner that feeds fixture payloads
//! to the client binary and classifies the decisions it returns.

pub mod capture;
pub mod cli;
pub mod commands;
pub mod common;
pub mod mock;
pub mod process;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use process::{ProcessOutput, ProcessSpec};
