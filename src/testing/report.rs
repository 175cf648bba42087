//! Scenario results and report formatting

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Label printed for a fixture's decision
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecisionLabel {
    /// The `decision` field from the client's stdout
    Decision(String),
    /// stdout was JSON but had no `decision` field
    Unknown,
    /// Empty or non-JSON stdout, or a non-zero exit
    Error,
}

impl DecisionLabel {
    /// Classify a finished callback invocation
    pub fn classify(exit_code: i32, stdout: &str) -> Self {
        if exit_code != 0 {
            return Self::Error;
        }
        Self::from_stdout(stdout)
    }

    /// Extract the decision from the client's stdout
    pub fn from_stdout(stdout: &str) -> Self {
        if stdout.trim().is_empty() {
            return Self::Error;
        }

        let value: Value = match serde_json::from_str(stdout.trim()) {
            Ok(value) => value,
            Err(_) => return Self::Error,
        };

        match value.get("decision") {
            Some(Value::String(decision)) => Self::Decision(decision.clone()),
            Some(other) => Self::Decision(other.to_string()),
            None => Self::Unknown,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad through `f.pad` so width specifiers like `{:<8}` apply
        match self {
            Self::Decision(decision) => f.pad(decision),
            Self::Unknown => f.pad("unknown"),
            Self::Error => f.pad("error"),
        }
    }
}

/// Outcome of one fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    pub fixture_name: String,
    pub exit_code: i32,
    pub decision: DecisionLabel,
    pub elapsed_ms: u64,
}

impl ScenarioResult {
    /// One aligned report line; `name_width` is the longest fixture name
    pub fn report_line(&self, name_width: usize) -> String {
        format!(
            "    {:<name_width$}  exit={}  decision={:<8}  time={}ms",
            self.fixture_name, self.exit_code, self.decision, self.elapsed_ms
        )
    }
}

/// Decision counts for a finished suite
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SuiteSummary {
    pub total: usize,
    pub counts: BTreeMap<String, usize>,
    pub total_ms: u64,
}

impl SuiteSummary {
    pub fn from_results(results: &[ScenarioResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total += 1;
            summary.total_ms += result.elapsed_ms;
            *summary.counts.entry(result.decision.to_string()).or_default() += 1;
        }
        summary
    }

    pub fn errors(&self) -> usize {
        self.counts.get("error").copied().unwrap_or(0)
    }
}

impl fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self
            .counts
            .iter()
            .map(|(label, count)| format!("{label}={count}"))
            .collect::<Vec<_>>()
            .join("  ");
        write!(f, "{} fixtures  {}  total={}ms", self.total, counts, self.total_ms)
    }
}
