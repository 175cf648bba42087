//! Route table for the decision mock
//!
//! Routes are an ordered list of matcher/handler pairs. The first matching
//! entry wins and every table ends with a catch-all entry, so dispatch
//! always resolves.

use axum::http::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::common::config::MockMode;

use super::decision::{AllowReason, AuthResponse, StatusAck};
use super::outcome::{randomized_decision, OutcomeSource};
use super::request::{RequestBody, RequestRecord};

/// Which requests a route accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatcher {
    Exact { method: Method, path: &'static str },
    Any,
}

impl RouteMatcher {
    pub fn post(path: &'static str) -> Self {
        Self::Exact {
            method: Method::POST,
            path,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        match self {
            Self::Exact {
                method: expected,
                path: expected_path,
            } => expected == method && *expected_path == path,
            Self::Any => true,
        }
    }
}

/// How a matched request is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteHandler {
    /// Fixed `{"allow": true, "reason": ""}`
    Acknowledge,
    /// `{"authenticated": true}`
    Authenticate,
    /// Allow/reason pair, rejecting bodies that are not JSON
    Authorize,
    /// `{"status": "ok"}`
    Notify,
    /// Full decision with drawn reason or error, outcome fixed by `allow`
    Randomized { allow: bool },
    /// Typed 404 for requests outside the named routes
    NotFound,
}

/// Status and JSON body computed for one request
#[derive(Debug, Clone, PartialEq)]
pub struct MockReply {
    pub status: StatusCode,
    pub body: Value,
}

impl MockReply {
    fn ok<T: Serialize>(body: &T) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|e| json!({ "error": e.to_string() }));
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

/// Authorization payload fields the mock inspects
#[derive(Debug, Default, PartialEq, Eq)]
struct AuthorizeFields<'a> {
    ts: Option<i64>,
    hook_data: Option<&'a str>,
}

impl<'a> AuthorizeFields<'a> {
    fn from_json(value: &'a Value) -> Self {
        Self {
            ts: value.get("ts").and_then(Value::as_i64),
            hook_data: value.get("hook_data").and_then(Value::as_str),
        }
    }
}

fn authorize(body: &RequestBody) -> AllowReason {
    match body {
        RequestBody::Json(value) => {
            let fields = AuthorizeFields::from_json(value);
            tracing::debug!(ts = ?fields.ts, hook_data = ?fields.hook_data, "Authorization request");
            AllowReason::allow()
        }
        RequestBody::Raw(bytes) => {
            let reason = match serde_json::from_slice::<Value>(bytes) {
                Err(e) => format!("invalid JSON body: {e}"),
                Ok(_) => "invalid JSON body".to_string(),
            };
            AllowReason::reject(reason)
        }
        RequestBody::Empty => AllowReason::reject("missing JSON body"),
    }
}

impl RouteHandler {
    pub fn respond(&self, request: &RequestRecord, source: &dyn OutcomeSource) -> MockReply {
        match self {
            Self::Acknowledge => MockReply::ok(&AllowReason::allow()),
            Self::Authenticate => MockReply::ok(&AuthResponse {
                authenticated: true,
            }),
            Self::Authorize => MockReply::ok(&authorize(&request.body)),
            Self::Notify => MockReply::ok(&StatusAck::ok()),
            Self::Randomized { allow } => MockReply::ok(&randomized_decision(source, *allow)),
            Self::NotFound => MockReply {
                status: StatusCode::NOT_FOUND,
                body: json!({
                    "error": format!("no route for {} {}", request.method, request.path)
                }),
            },
        }
    }
}

/// A single matcher/handler pair
#[derive(Debug, Clone)]
pub struct Route {
    pub matcher: RouteMatcher,
    pub handler: RouteHandler,
}

/// Ordered routes, default entry last
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table from explicit routes followed by a default handler
    pub fn new(routes: Vec<Route>, default: RouteHandler) -> Self {
        let mut routes = routes;
        routes.push(Route {
            matcher: RouteMatcher::Any,
            handler: default,
        });
        Self { routes }
    }

    pub fn for_mode(mode: MockMode) -> Self {
        match mode {
            MockMode::Acknowledge => Self::new(Vec::new(), RouteHandler::Acknowledge),
            MockMode::Routes => Self::new(
                vec![
                    Route {
                        matcher: RouteMatcher::post("/auth"),
                        handler: RouteHandler::Authenticate,
                    },
                    Route {
                        matcher: RouteMatcher::post("/dnr"),
                        handler: RouteHandler::Authorize,
                    },
                    Route {
                        matcher: RouteMatcher::post("/notify"),
                        handler: RouteHandler::Notify,
                    },
                ],
                RouteHandler::NotFound,
            ),
            MockMode::Allow => Self::new(Vec::new(), RouteHandler::Randomized { allow: true }),
            MockMode::Deny => Self::new(Vec::new(), RouteHandler::Randomized { allow: false }),
        }
    }

    pub fn resolve(&self, method: &Method, path: &str) -> RouteHandler {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(method, path))
            .map(|route| route.handler)
            .unwrap_or(RouteHandler::NotFound)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
