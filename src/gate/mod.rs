//! Per-request authentication and role routing for dashboard pages.

pub mod decision;
mod middleware;

pub use decision::{classify, decide, GateDecision, PathClass};
pub use middleware::request_gate;
