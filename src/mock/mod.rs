//! Decision mock backend
//!
//! Stands in for the authorization/notification service the client under
//! test talks to. One server type covers every mode; the mode only selects
//! the route table.

pub mod decision;
pub mod outcome;
pub mod request;
pub mod routes;
mod server;

pub use decision::{AllowReason, DecisionResponse};
pub use outcome::{CyclingSource, OutcomeSource, SeededSource, ThreadRngSource};
pub use request::{RequestBody, RequestRecord};
pub use routes::{RouteHandler, RouteMatcher, RouteTable};
pub use server::MockServer;
