//! Mock hook client binary for integration testing
//!
//! Implements the two subcommands the scenario runner drives, so the
//! harness can be exercised without the real client:
//!
//! - `join-team <url>` POSTs a join request to `<url>`
//! - `claude-callback` reads one hook payload from stdin, asks the
//!   authorization endpoint for a decision and prints it as JSON
//!
//! The authorization endpoint comes from `MOCK_CLIENT_AUTHORIZE_URL`.

use std::io::Read;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

const DEFAULT_AUTHORIZE_URL: &str = "http://localhost:8000/dnr";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = match args.first().map(String::as_str) {
        Some("join-team") => match args.get(1) {
            Some(url) => join_team(url).await,
            None => Err("join-team requires a team URL".to_string()),
        },
        Some("claude-callback") => claude_callback().await,
        Some(other) => Err(format!("unknown command '{other}'")),
        None => Err("usage: mock-client <join-team URL | claude-callback>".to_string()),
    };

    if let Err(e) = result {
        eprintln!("mock-client: {e}");
        std::process::exit(1);
    }
}

fn client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| e.to_string())
}

async fn join_team(url: &str) -> Result<(), String> {
    let response = client()?
        .post(url)
        .json(&json!({"action": "join"}))
        .send()
        .await
        .map_err(|e| format!("join request failed: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("join rejected with status {}", response.status()));
    }

    println!("Joined team");
    Ok(())
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Whether a backend response allows the action
///
/// Accepts both the allow/reason pair and the full decision shape.
fn is_allowed(response: &Value) -> bool {
    response
        .get("allow")
        .or_else(|| response.get("success"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn block_reason(response: &Value) -> String {
    ["error", "reason"]
        .iter()
        .filter_map(|key| response.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or("Command blocked by policy.")
        .to_string()
}

async fn claude_callback() -> Result<(), String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| format!("failed to read stdin: {e}"))?;

    let payload: Value =
        serde_json::from_str(input.trim()).map_err(|e| format!("invalid hook payload: {e}"))?;

    let ts = payload.get("ts").and_then(Value::as_i64).unwrap_or_else(now_millis);
    let hook_data = match payload.get("hook_data").and_then(Value::as_str) {
        Some(data) => data.to_string(),
        None => payload.to_string(),
    };

    let url = std::env::var("MOCK_CLIENT_AUTHORIZE_URL")
        .unwrap_or_else(|_| DEFAULT_AUTHORIZE_URL.to_string());

    let response: Value = client()?
        .post(&url)
        .json(&json!({"ts": ts, "hook_data": hook_data}))
        .send()
        .await
        .map_err(|e| format!("authorization request failed: {e}"))?
        .json()
        .await
        .map_err(|e| format!("invalid authorization response: {e}"))?;

    let answer = if is_allowed(&response) {
        json!({"decision": "approve"})
    } else {
        json!({"decision": "block", "reason": block_reason(&response)})
    };

    println!("{answer}");
    Ok(())
}
