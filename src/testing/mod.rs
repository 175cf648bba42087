//! Fixture-driven scenario runs
//!
//! Sends stored hook payloads to the client binary over its stdin callback
//! protocol and classifies the decision it prints. Runs are strictly
//! sequential so report lines come out in fixture order.

mod report;
mod runner;

pub use report::{DecisionLabel, ScenarioResult, SuiteSummary};
pub use runner::{compact_fixture, discover_fixtures, ScenarioRunner, DEFAULT_CALLBACK_SUBCOMMAND};
