//! Decision response shapes returned by the mock backends

use serde::{Deserialize, Serialize};

/// Full decision verdict returned in randomized mode
///
/// Exactly one of `reason` (allowed) and `error` (rejected) is set, and
/// `rejected` is always `!success`. The constructors are the only way to
/// build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    success: bool,
    reason: Option<String>,
    error: Option<String>,
    rejected: bool,
    rule: Option<String>,
}

impl DecisionResponse {
    pub fn allowed(reason: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: Some(reason.into()),
            error: None,
            rejected: false,
            rule: Some(rule.into()),
        }
    }

    pub fn denied(error: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: None,
            error: Some(error.into()),
            rejected: true,
            rule: Some(rule.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn rejected(&self) -> bool {
        self.rejected
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }
}

/// Allow/reason pair used by the catch-all and authorization routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowReason {
    pub allow: bool,
    pub reason: String,
}

impl AllowReason {
    pub fn allow() -> Self {
        Self {
            allow: true,
            reason: String::new(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            allow: false,
            reason: reason.into(),
        }
    }
}

/// Authentication route response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub authenticated: bool,
}

/// Generic acknowledgement for the notification route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAck {
    pub status: String,
}

impl StatusAck {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
