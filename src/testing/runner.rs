//! Scenario executor
//!
//! Feeds every fixture in a suite directory to the client's callback
//! subcommand, one process at a time, and reports the decision each run
//! produced.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;

use crate::common::{Error, Result};
use crate::process::{self, shell_quote, ProcessOutput, ProcessSpec};

use super::report::{DecisionLabel, ScenarioResult};

/// Default subcommand that reads one hook payload from stdin
pub const DEFAULT_CALLBACK_SUBCOMMAND: &str = "claude-callback";

/// List the `*.json` fixtures of a suite directory in file name order
pub fn discover_fixtures(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::FixtureDirNotFound(dir.to_path_buf()));
    }

    let mut fixtures = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            fixtures.push(path);
        }
    }

    if fixtures.is_empty() {
        return Err(Error::NoFixtures(dir.to_path_buf()));
    }

    fixtures.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(fixtures)
}

/// Load a fixture and re-serialize it as one compact JSON line
pub fn compact_fixture(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|e| Error::fixture_parse(path, e))?;
    Ok(serde_json::to_string(&value)?)
}

fn fixture_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Drives one client binary through setup and fixture suites
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    binary: PathBuf,
    callback_subcommand: String,
    env_overlay: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ScenarioRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            callback_subcommand: DEFAULT_CALLBACK_SUBCOMMAND.to_string(),
            env_overlay: BTreeMap::new(),
            cwd: None,
        }
    }

    pub fn callback_subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.callback_subcommand = subcommand.into();
        self
    }

    /// Add a variable to every process this runner starts
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_overlay.insert(key.into(), value.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command_line<S: AsRef<str>>(&self, args: &[S]) -> String {
        let mut line = shell_quote(&self.binary.to_string_lossy());
        for arg in args {
            line.push(' ');
            line.push_str(&shell_quote(arg.as_ref()));
        }
        line
    }

    fn spec(&self, command: String) -> ProcessSpec {
        let spec = ProcessSpec::new(command).envs(&self.env_overlay);
        match &self.cwd {
            Some(cwd) => spec.cwd(cwd),
            None => spec,
        }
    }

    /// Run the one-time setup call; any non-zero exit is fatal
    pub async fn setup<S: AsRef<str>>(&self, args: &[S]) -> Result<ProcessOutput> {
        let spec = self.spec(self.command_line(args));
        tracing::info!(command = %spec.command, "Running setup");
        process::run(&spec).await
    }

    /// Run a single fixture through the callback subcommand
    pub async fn run_fixture(&self, fixture: &Path) -> Result<ScenarioResult> {
        let payload = compact_fixture(fixture)?;
        let spec = self
            .spec(self.command_line(&[self.callback_subcommand.as_str()]))
            .stdin(payload)
            .enforce_success(false);

        let start = Instant::now();
        let output = process::run(&spec).await?;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let decision = DecisionLabel::classify(output.exit_code, &output.stdout);
        if decision.is_error() && !output.stderr.is_empty() {
            tracing::debug!(fixture = %fixture.display(), stderr = %output.stderr.trim_end());
        }

        Ok(ScenarioResult {
            fixture_name: fixture_name(fixture),
            exit_code: output.exit_code,
            decision,
            elapsed_ms,
        })
    }

    /// Run every fixture in `dir`, writing the suite header and one line each
    pub async fn run_suite<W: Write>(&self, dir: &Path, out: &mut W) -> Result<Vec<ScenarioResult>> {
        let fixtures = discover_fixtures(dir)?;
        let name_width = fixtures
            .iter()
            .map(|path| fixture_name(path).len())
            .max()
            .unwrap_or(0);

        writeln!(out, "{}", fixture_name(dir))?;

        let mut results = Vec::with_capacity(fixtures.len());
        for fixture in &fixtures {
            let result = self.run_fixture(fixture).await?;
            writeln!(out, "{}", result.report_line(name_width))?;
            out.flush()?;
            results.push(result);
        }

        Ok(results)
    }
}
