//! Common utilities shared by the servers and the scenario runner

pub mod config;
pub mod error;
pub mod handle;
pub mod logging;
pub mod paths;
pub mod platform;

pub use error::{Error, Result};
