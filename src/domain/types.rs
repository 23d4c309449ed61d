use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::fault::FaultCondition;
use crate::ml::features::FaultFeatures;

// ============================================================================
// Request-side value objects
// ============================================================================

/// One set of sensor-like inputs describing the collector's operating point.
///
/// Immutable per request. `outlet_temperature` is the *observed* outlet
/// reading and is only required for performance analysis; the simulator
/// derives its own outlet temperature from the energy balance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimulationInput {
    /// Solar irradiance incident on the collector in W/m².
    #[validate(range(min = 0.0, max = 2000.0))]
    pub solar_irradiance: f64,
    /// Working fluid temperature entering the collector in °C.
    #[validate(range(min = -273.15, max = 150.0))]
    pub inlet_temperature: f64,
    /// Observed outlet temperature in °C, when a reading is available.
    pub outlet_temperature: Option<f64>,
    /// Outdoor air temperature in °C.
    #[validate(range(min = -273.15, max = 150.0))]
    pub ambient_temperature: f64,
    /// Mass flow rate through the collector in kg/s.
    #[validate(range(exclusive_min = 0.0, max = 10.0))]
    pub mass_flow_rate: f64,
    /// Fault to inject into the simulated physics.
    #[serde(default)]
    pub fault_condition: FaultCondition,
}

// ============================================================================
// Simulator output
// ============================================================================

/// Deterministic result of one simulated operating point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Outlet temperature predicted by the energy balance in °C.
    pub simulated_outlet_temperature: f64,
    /// Net thermal power extracted by the working fluid in W.
    pub useful_heat_gain: f64,
    /// Incident power not captured by the fluid in W.
    pub heat_loss: f64,
    /// Useful gain over incident power, in percent, clamped to [0, 100].
    pub thermal_efficiency: f64,
}

// ============================================================================
// Performance analysis
// ============================================================================

/// Qualitative judgement of an observed operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceCondition {
    Optimal,
    Degraded,
    Critical,
}

impl PerformanceCondition {
    /// Operator-facing message template for this condition.
    pub fn message(self) -> &'static str {
        match self {
            PerformanceCondition::Optimal => "System is operating normally.",
            PerformanceCondition::Degraded => {
                "Performance is significantly below the ideal reference."
            }
            PerformanceCondition::Critical => {
                "Major performance loss detected. Check for faults."
            }
        }
    }
}

impl fmt::Display for PerformanceCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceCondition::Optimal => "Optimal",
            PerformanceCondition::Degraded => "Degraded",
            PerformanceCondition::Critical => "Critical",
        };
        write!(f, "{s}")
    }
}

/// Observed performance relative to the fixed ideal reference efficiency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Actual efficiency computed from the observed outlet temperature, %.
    pub thermal_efficiency: f64,
    /// Actual useful heat gain in W.
    pub heat_gain: f64,
    /// Shortfall between incident power and actual gain in W.
    pub heat_loss: f64,
    /// Percentage-point drop from the ideal reference efficiency. Negative
    /// when the observed reading overperforms the reference (a drifted
    /// outlet sensor will do this).
    pub performance_degradation: f64,
    pub condition: PerformanceCondition,
    pub message: String,
}

// ============================================================================
// Diagnosis
// ============================================================================

/// One fault diagnosis, together with the inputs that produced it.
/// Append-only; owned by the per-user history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub timestamp: DateTime<Utc>,
    pub solar_irradiance: f64,
    pub inlet_temperature: f64,
    pub outlet_temperature: f64,
    pub mass_flow_rate: f64,
    pub thermal_efficiency: f64,
    pub heat_gain: f64,
    pub predicted_fault: FaultCondition,
    /// Classifier confidence for the predicted fault, % in [0, 100].
    pub confidence_score: f64,
    pub suggestion: String,
}

impl DiagnosticRecord {
    pub fn new(features: &FaultFeatures, fault: FaultCondition, confidence_score: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            solar_irradiance: features.solar_irradiance,
            inlet_temperature: features.inlet_temperature,
            outlet_temperature: features.outlet_temperature,
            mass_flow_rate: features.mass_flow_rate,
            thermal_efficiency: features.thermal_efficiency,
            heat_gain: features.heat_gain,
            predicted_fault: fault,
            confidence_score: confidence_score.clamp(0.0, 100.0),
            suggestion: fault.suggestion().to_string(),
        }
    }
}
