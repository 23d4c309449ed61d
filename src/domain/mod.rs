//! Value objects shared across the simulation, analysis, and diagnosis
//! stages.

pub mod fault;
pub mod types;

pub use fault::FaultCondition;
pub use types::{
    DiagnosticRecord, PerformanceCondition, PerformanceRecord, SimulationInput, SimulationResult,
};
