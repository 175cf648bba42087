//! Subprocess execution with captured output
//!
//! Runs one shell command line to completion. stdout and stderr are
//! drained while stdin is written, so payloads larger than the OS pipe
//! buffer cannot deadlock the child.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;

use crate::common::{Error, Result};

/// Everything needed to run one command
#[derive(Debug, Clone, Default)]
pub struct ProcessSpec {
    /// Shell command line
    pub command: String,
    /// Working directory, inherited when unset
    pub cwd: Option<PathBuf>,
    /// Variables layered over the inherited environment
    pub env_overlay: BTreeMap<String, String>,
    /// Text written to stdin, which is then closed
    pub stdin: Option<String>,
    /// Turn a non-zero exit into `Error::ProcessFailed`
    pub enforce_success: bool,
}

impl ProcessSpec {
    /// A spec for `command` that enforces a zero exit code
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            enforce_success: true,
            ..Self::default()
        }
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_overlay.insert(key.into(), value.into());
        self
    }

    pub fn envs(mut self, overlay: &BTreeMap<String, String>) -> Self {
        self.env_overlay
            .extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin = Some(payload.into());
        self
    }

    pub fn enforce_success(mut self, enforce: bool) -> Self {
        self.enforce_success = enforce;
        self
    }
}

/// Result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> TokioCommand {
    let mut cmd = TokioCommand::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> TokioCommand {
    let mut cmd = TokioCommand::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Quote a path or argument for the platform shell
#[cfg(unix)]
pub fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(windows)]
pub fn shell_quote(arg: &str) -> String {
    format!("\"{}\"", arg)
}

/// Exit code of a finished process; signal deaths map to `-signal`
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

/// Run a command to completion and collect its output
pub async fn run(spec: &ProcessSpec) -> Result<ProcessOutput> {
    tracing::debug!(command = %spec.command, cwd = ?spec.cwd, "Running command");

    let mut cmd = shell_command(&spec.command);
    cmd.envs(&spec.env_overlay)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let mut child = cmd.spawn().map_err(|e| Error::ProcessSpawn {
        command: spec.command.clone(),
        source: e,
    })?;

    // Feed stdin from its own task; closing it signals end of input
    let writer = match (child.stdin.take(), spec.stdin.clone()) {
        (Some(mut stdin), Some(payload)) => Some(tokio::spawn(async move {
            let result = stdin.write_all(payload.as_bytes()).await;
            drop(stdin);
            result
        })),
        _ => None,
    };

    // Always reap the child before surfacing a stdin failure
    let output = child.wait_with_output().await?;

    if let Some(writer) = writer {
        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Child closed stdin before reading all input");
            }
            Ok(Err(e)) => {
                return Err(Error::ProcessStdin {
                    command: spec.command.clone(),
                    source: e,
                })
            }
            Err(e) => {
                return Err(Error::ProcessStdin {
                    command: spec.command.clone(),
                    source: io::Error::other(e.to_string()),
                })
            }
        }
    }

    let result = ProcessOutput {
        exit_code: exit_code(output.status),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    tracing::debug!(command = %spec.command, exit_code = result.exit_code, "Command finished");

    if spec.enforce_success && !result.success() {
        return Err(Error::process_failed(
            &spec.command,
            result.exit_code,
            &result.stdout,
            &result.stderr,
        ));
    }

    Ok(result)
}
