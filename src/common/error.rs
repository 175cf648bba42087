//! Error types for the hook harness
//!
//! Errors carry enough context to diagnose a failed run from the message
//! alone: process failures keep the command line, exit code and both
//! captured streams.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the hook harness
#[derive(Error, Debug)]
pub enum Error {
    // === Process Errors ===
    #[error("Failed to spawn '{command}': {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' exited with code {exit_code}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    ProcessFailed {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Failed to write stdin for '{command}': {source}")]
    ProcessStdin {
        command: String,
        #[source]
        source: io::Error,
    },

    // === Fixture Errors ===
    #[error("Mock data directory not found: {}", .0.display())]
    FixtureDirNotFound(PathBuf),

    #[error("No JSON files found in: {}", .0.display())]
    NoFixtures(PathBuf),

    #[error("Invalid fixture '{}': {reason}", path.display())]
    FixtureParse { path: PathBuf, reason: String },

    // === Platform Errors ===
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Binary not found: {}", .0.display())]
    BinaryNotFound(PathBuf),

    // === Server Errors ===
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Server(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a process failure error from a finished command
    pub fn process_failed(command: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self::ProcessFailed {
            command: command.to_string(),
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    /// Create an unsupported platform error
    pub fn unsupported_platform(os: &str, arch: &str) -> Self {
        Self::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Create a fixture parse error
    pub fn fixture_parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FixtureParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Exit code of a failed process, if this error came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ProcessFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failed_keeps_context() {
        let err = Error::process_failed("bin join-team x", 3, "out text", "err text");
        assert_eq!(err.exit_code(), Some(3));

        let message = err.to_string();
        assert!(message.contains("bin join-team x"));
        assert!(message.contains("code 3"));
        assert!(message.contains("out text"));
        assert!(message.contains("err text"));
    }

    #[test]
    fn test_fixture_errors_name_the_directory() {
        let err = Error::NoFixtures(PathBuf::from("/tmp/mock_data/empty"));
        assert_eq!(err.to_string(), "No JSON files found in: /tmp/mock_data/empty");
        assert_eq!(err.exit_code(), None);
    }
}
