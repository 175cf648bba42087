//! Process driver
//!
//! Runs external commands with an explicit [`ProcessSpec`] and returns
//! their exit code and captured streams.

mod driver;

pub use driver::{run, shell_quote, ProcessOutput, ProcessSpec};
