//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Decision mock server settings
    #[serde(default)]
    pub mock: MockConfig,

    /// Capture-only server settings
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Scenario runner settings
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// Response policy of the decision mock server
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MockMode {
    /// Catch-all: every request gets a fixed allow acknowledgement
    #[default]
    Acknowledge,
    /// Named routes: /auth, /dnr and /notify
    Routes,
    /// Randomized reasons and rules, always allowing
    Allow,
    /// Randomized errors and rules, always denying
    Deny,
}

/// Decision mock server configuration
#[derive(Debug, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_mock_port")]
    pub port: u16,

    #[serde(default)]
    pub mode: MockMode,

    /// Seed for reproducible randomized outcomes
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_mock_port(),
            mode: MockMode::default(),
            seed: None,
        }
    }
}

/// Capture-only server configuration
#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_capture_port")]
    pub port: u16,

    /// File that receives the raw body of the most recent request
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_capture_port(),
            file: None,
        }
    }
}

/// Scenario runner configuration
#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    /// Client binary name prefix, e.g. `viberails` for `viberails-linux-x64`
    #[serde(default = "default_binary_prefix")]
    pub binary_prefix: String,

    /// Directory holding one subdirectory of fixtures per suite
    #[serde(default = "default_fixtures_root")]
    pub fixtures_root: PathBuf,

    /// Suites (fixture subdirectories) to run, in order
    #[serde(default = "default_suites")]
    pub suites: Vec<String>,

    /// Subcommand that reads one hook payload from stdin
    #[serde(default = "default_callback_subcommand")]
    pub callback_subcommand: String,

    /// Subcommand run once before any fixture
    #[serde(default = "default_setup_subcommand")]
    pub setup_subcommand: String,

    /// Team URL template; `{org_id}` and `{secret_id}` are substituted
    #[serde(default = "default_team_url")]
    pub team_url: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            binary_prefix: default_binary_prefix(),
            fixtures_root: default_fixtures_root(),
            suites: default_suites(),
            callback_subcommand: default_callback_subcommand(),
            setup_subcommand: default_setup_subcommand(),
            team_url: default_team_url(),
        }
    }
}

/// Substitute `{org_id}` and `{secret_id}` in a team URL template
pub fn expand_team_url(template: &str, org_id: &str, secret_id: &str) -> String {
    template
        .replace("{org_id}", org_id)
        .replace("{secret_id}", secret_id)
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_mock_port() -> u16 {
    8000
}
fn default_capture_port() -> u16 {
    8001
}

fn default_binary_prefix() -> String {
    "viberails".to_string()
}
fn default_fixtures_root() -> PathBuf {
    PathBuf::from("tests").join("mock_data")
}
fn default_suites() -> Vec<String> {
    vec!["claude_code".to_string()]
}
fn default_callback_subcommand() -> String {
    "claude-callback".to_string()
}
fn default_setup_subcommand() -> String {
    "join-team".to_string()
}
fn default_team_url() -> String {
    "https://0651b4f82df0a29c.hook.limacharlie.io/{org_id}/viberails/{secret_id}".to_string()
}

impl Config {
    /// Load configuration from an explicit path, or the default config file
    ///
    /// Returns default configuration if no file exists at the default location.
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.mock.host, "127.0.0.1");
        assert_eq!(config.mock.port, 8000);
        assert_eq!(config.mock.mode, MockMode::Acknowledge);
        assert_eq!(config.capture.port, 8001);
        assert!(config.capture.file.is_none());
        assert_eq!(config.scenario.suites, vec!["claude_code".to_string()]);
        assert_eq!(config.scenario.callback_subcommand, "claude-callback");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
[mock]
port = 9100
mode = "deny"
seed = 7

[scenario]
binary_prefix = "hookclient"
suites = ["claude_code", "cursor"]
"#,
        )
        .unwrap();

        assert_eq!(config.mock.port, 9100);
        assert_eq!(config.mock.mode, MockMode::Deny);
        assert_eq!(config.mock.seed, Some(7));
        assert_eq!(config.mock.host, "127.0.0.1");
        assert_eq!(config.scenario.binary_prefix, "hookclient");
        assert_eq!(config.scenario.suites.len(), 2);
        assert_eq!(config.scenario.setup_subcommand, "join-team");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Config::parse("[mock]\nmode = \"maybe\"\n").unwrap_err();
        assert!(matches!(err, crate::common::Error::ConfigParse(_)));
    }

    #[test]
    fn test_team_url_substitution() {
        assert_eq!(
            expand_team_url("https://hooks.example/{org_id}/team/{secret_id}", "org-1", "sec-2"),
            "https://hooks.example/org-1/team/sec-2"
        );

        let defaults = ScenarioConfig::default();
        let url = expand_team_url(&defaults.team_url, "oid", "sid");
        assert!(url.ends_with("/oid/viberails/sid"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/hook-harness.toml"))).unwrap_err();
        assert!(matches!(err, crate::common::Error::FileRead { .. }));
    }
}
