//! End-to-end integration tests for the hook harness
//!
//! These tests exercise the complete scenario workflow by:
//! 1. Starting the mock decision and capture servers on ephemeral ports
//! 2. Driving the `mock-client` binary through fixture payloads
//! 3. Verifying decisions, captured bodies and the `hook-harness` CLI output

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use hook_harness::capture::CaptureServer;
use hook_harness::common::config::MockMode;
use hook_harness::common::handle::ServerHandle;
use hook_harness::common::platform;
use hook_harness::mock::MockServer;
use hook_harness::testing::{DecisionLabel, ScenarioRunner, SuiteSummary};
use hook_harness::Error;
use tempfile::TempDir;
use tokio::process::Command;

const AUTHORIZE_URL_VAR: &str = "MOCK_CLIENT_AUTHORIZE_URL";

/// Test context with a scratch directory and binary paths
struct TestContext {
    /// Scratch directory, removed on drop
    temp_dir: TempDir,
    /// Path to the harness binary
    harness_bin: PathBuf,
    /// Path to the stand-in hook client
    client_bin: PathBuf,
    /// Fixture root shipped with the crate
    fixtures_root: PathBuf,
    /// Config directory (XDG_CONFIG_HOME), kept empty
    config_dir: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            harness_bin: PathBuf::from(env!("CARGO_BIN_EXE_hook-harness")),
            client_bin: PathBuf::from(env!("CARGO_BIN_EXE_mock-client")),
            fixtures_root: Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("mock_data"),
            config_dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write a suite directory holding the given fixtures
    fn write_suite(&self, suite: &str, fixtures: &[(&str, &str)]) -> PathBuf {
        let dir = self.path(suite);
        fs::create_dir_all(&dir).expect("Failed to create suite dir");
        for (name, content) in fixtures {
            fs::write(dir.join(name), content).expect("Failed to write fixture");
        }
        dir
    }

    /// Lay out a distribution directory with the client under its platform name
    fn install_client(&self) -> PathBuf {
        let dist = self.path("dist");
        fs::create_dir_all(&dist).expect("Failed to create dist dir");
        let name = platform::current_binary_name("viberails").expect("Unsupported test platform");
        fs::copy(&self.client_bin, dist.join(name)).expect("Failed to install client");
        dist
    }

    fn runner(&self, authorize_url: &str) -> ScenarioRunner {
        ScenarioRunner::new(&self.client_bin).env(AUTHORIZE_URL_VAR, authorize_url)
    }

    /// Run a harness command with an isolated config directory
    async fn run_harness(&self, args: &[&str], envs: &[(&str, &str)]) -> HarnessOutput {
        let mut command = Command::new(&self.harness_bin);
        command
            .args(args)
            .env("XDG_CONFIG_HOME", &self.config_dir)
            .env("NO_COLOR", "1")
            .env_remove("OID")
            .env_remove("SECRET_ID")
            .stdin(Stdio::null());
        for (key, value) in envs {
            command.env(key, value);
        }

        let output = command.output().await.expect("Failed to run hook-harness");
        HarnessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        }
    }
}

/// Output of a harness invocation
struct HarnessOutput {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

impl HarnessOutput {
    fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

async fn start_mock(mode: MockMode) -> ServerHandle {
    MockServer::new(mode)
        .spawn("127.0.0.1", 0)
        .await
        .expect("Failed to start mock server")
}

const LS_FIXTURE: &str = r#"{
  "ts": 1700000000000,
  "hook_data": "ls -la"
}"#;

// ============== Scenario runner against the mock server ==============

#[tokio::test]
async fn test_allow_mode_approves_fixture() {
    let ctx = TestContext::new();
    let mock = start_mock(MockMode::Allow).await;
    let suite = ctx.write_suite("claude_code", &[("ls.json", LS_FIXTURE)]);

    let mut out = Vec::new();
    let results = ctx
        .runner(&mock.url("/dnr"))
        .run_suite(&suite, &mut out)
        .await
        .expect("suite should run");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].exit_code, 0);
    assert_eq!(results[0].decision, DecisionLabel::Decision("approve".to_string()));

    let report = String::from_utf8(out).unwrap();
    assert!(report.starts_with("claude_code\n"), "report: {report}");
    assert!(report.contains("    ls.json  exit=0  decision=approve   time="));
}

#[tokio::test]
async fn test_deny_mode_blocks_every_fixture() {
    let ctx = TestContext::new();
    let mock = start_mock(MockMode::Deny).await;
    let suite = ctx.write_suite(
        "claude_code",
        &[
            ("a.json", LS_FIXTURE),
            ("b.json", r#"{"hook_event_name":"PreToolUse","tool_name":"Bash"}"#),
        ],
    );

    let results = ctx
        .runner(&mock.url("/dnr"))
        .run_suite(&suite, &mut std::io::sink())
        .await
        .unwrap();

    let summary = SuiteSummary::from_results(&results);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.counts.get("block"), Some(&2));
    assert_eq!(summary.errors(), 0);
}

#[tokio::test]
async fn test_acknowledge_mode_approves_any_path() {
    let ctx = TestContext::new();
    let mock = start_mock(MockMode::Acknowledge).await;
    let fixture = ctx.write_suite("suite", &[("ls.json", LS_FIXTURE)]).join("ls.json");

    let result = ctx
        .runner(&mock.url("/any/path/at/all"))
        .run_fixture(&fixture)
        .await
        .unwrap();

    assert_eq!(result.decision, DecisionLabel::Decision("approve".to_string()));
}

#[tokio::test]
async fn test_unreachable_backend_is_an_error_line() {
    let ctx = TestContext::new();
    let mock = start_mock(MockMode::Routes).await;
    let url = mock.url("/dnr");
    mock.shutdown().await.unwrap();

    let fixture = ctx.write_suite("suite", &[("ls.json", LS_FIXTURE)]).join("ls.json");
    let result = ctx.runner(&url).run_fixture(&fixture).await.unwrap();

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.decision, DecisionLabel::Error);
}

#[tokio::test]
async fn test_shipped_fixtures_all_approved() {
    let ctx = TestContext::new();
    let mock = start_mock(MockMode::Routes).await;

    let results = ctx
        .runner(&mock.url("/dnr"))
        .run_suite(&ctx.fixtures_root.join("claude_code"), &mut std::io::sink())
        .await
        .unwrap();

    assert!(!results.is_empty());
    for result in &results {
        assert_eq!(
            result.decision,
            DecisionLabel::Decision("approve".to_string()),
            "fixture {}",
            result.fixture_name
        );
    }
}

// ============== Setup against the capture server ==============

#[tokio::test]
async fn test_setup_join_is_captured() {
    let ctx = TestContext::new();
    let capture_file = ctx.path("captured.json");
    let capture = CaptureServer::new(&capture_file)
        .spawn("127.0.0.1", 0)
        .await
        .unwrap();

    let output = ctx
        .runner("http://127.0.0.1:9/unused")
        .setup(&["join-team", capture.url("/org/viberails/secret").as_str()])
        .await
        .expect("setup should succeed");

    assert!(output.stdout.contains("Joined team"));
    let captured: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&capture_file).unwrap()).unwrap();
    assert_eq!(captured, serde_json::json!({"action": "join"}));
}

#[tokio::test]
async fn test_setup_failure_is_fatal() {
    let ctx = TestContext::new();
    let mock = start_mock(MockMode::Routes).await;

    // Named routes answer 404 for the join path
    let err = ctx
        .runner(&mock.url("/dnr"))
        .setup(&["join-team", mock.url("/join").as_str()])
        .await
        .unwrap_err();

    match err {
        Error::ProcessFailed { exit_code, stderr, .. } => {
            assert_eq!(exit_code, 1);
            assert!(stderr.contains("404"), "stderr: {stderr}");
        }
        other => panic!("expected ProcessFailed, got {other:?}"),
    }
}

// ============== hook-harness CLI ==============

#[tokio::test]
async fn test_cli_run_end_to_end() {
    let ctx = TestContext::new();
    let mock = start_mock(MockMode::Routes).await;
    let capture_file = ctx.path("join.json");
    let capture = CaptureServer::new(&capture_file)
        .spawn("127.0.0.1", 0)
        .await
        .unwrap();

    let dist = ctx.install_client();
    let team_url = capture.url("/{org_id}/viberails/{secret_id}");
    let fixtures_root = ctx.fixtures_root.to_string_lossy().to_string();
    let authorize_url = mock.url("/dnr");

    let output = ctx
        .run_harness(
            &[
                "run",
                "--bin",
                dist.to_str().unwrap(),
                "--fixtures-root",
                &fixtures_root,
                "--suite",
                "claude_code",
                "--team-url",
                &team_url,
            ],
            &[
                ("OID", "org-123"),
                ("SECRET_ID", "secret-456"),
                (AUTHORIZE_URL_VAR, &authorize_url),
            ],
        )
        .await;

    assert!(output.success(), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("claude_code\n"));
    assert!(output.stdout.contains("bash_ls.json"));
    assert!(!output.stdout.contains("decision=error"), "stdout: {}", output.stdout);

    let fixture_count = fs::read_dir(ctx.fixtures_root.join("claude_code")).unwrap().count();
    assert!(output
        .stdout
        .contains(&format!("{fixture_count} fixtures  approve={fixture_count}")));

    let captured = fs::read_to_string(&capture_file).unwrap();
    assert!(captured.contains("\"join\""));
}

#[tokio::test]
async fn test_cli_run_requires_credentials() {
    let ctx = TestContext::new();
    let dist = ctx.install_client();

    let output = ctx
        .run_harness(&["run", "--bin", dist.to_str().unwrap()], &[("OID", "")])
        .await;

    assert_eq!(output.exit_code, Some(1));
    assert!(output.stderr.contains("--org-id and --secret-id required"));
}

#[tokio::test]
async fn test_cli_run_missing_binary() {
    let ctx = TestContext::new();
    let empty = ctx.path("empty-dist");
    fs::create_dir_all(&empty).unwrap();

    let output = ctx
        .run_harness(
            &["run", "--bin", empty.to_str().unwrap()],
            &[("OID", "o"), ("SECRET_ID", "s")],
        )
        .await;

    assert_eq!(output.exit_code, Some(1));
    assert!(output.stderr.contains("Binary not found"), "stderr: {}", output.stderr);
}

#[tokio::test]
async fn test_cli_run_missing_fixture_dir() {
    let ctx = TestContext::new();
    let capture = CaptureServer::new(ctx.path("join.json"))
        .spawn("127.0.0.1", 0)
        .await
        .unwrap();
    let dist = ctx.install_client();
    let team_url = capture.url("/{org_id}/{secret_id}");
    let missing = ctx.path("no-fixtures");

    let output = ctx
        .run_harness(
            &[
                "run",
                "--bin",
                dist.to_str().unwrap(),
                "--fixtures-root",
                missing.to_str().unwrap(),
                "--team-url",
                &team_url,
            ],
            &[("OID", "o"), ("SECRET_ID", "s")],
        )
        .await;

    assert_eq!(output.exit_code, Some(1));
    assert!(
        output.stderr.contains("Mock data directory not found"),
        "stderr: {}",
        output.stderr
    );
}

#[tokio::test]
async fn test_cli_rejects_unknown_mode() {
    let ctx = TestContext::new();
    let output = ctx.run_harness(&["mock", "--mode", "maybe"], &[]).await;

    assert!(!output.success());
    assert!(output.stderr.contains("maybe"));
}
