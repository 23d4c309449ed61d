//! Collector physics and performance analysis.
//!
//! Everything in this module is synchronous, pure, and CPU-bound: no I/O, no
//! shared state, safe to call concurrently from any number of requests.

pub mod collector;
pub mod performance;

pub use collector::{heat_removal_factor, simulate};
pub use performance::{analyze, observed_performance, ObservedPerformance, IDEAL_EFFICIENCY_PCT};
