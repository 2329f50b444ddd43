//! Retirement projection calculator: a deterministic year-by-year savings and
//! drawdown model, its chart and report views, and the HTTP API and CLI that
//! serve it.

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod report;
pub mod telemetry;

pub use error::{PlannerError, Result};
