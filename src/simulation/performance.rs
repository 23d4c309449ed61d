//! Observed-performance metrics and the analyzer that judges them against
//! the ideal reference operating point.

use crate::domain::{PerformanceCondition, PerformanceRecord, SimulationInput};
use crate::simulation::collector::{COLLECTOR_AREA_M2, FLUID_SPECIFIC_HEAT};

/// Efficiency of the collector at its ideal reference operating point, %.
pub const IDEAL_EFFICIENCY_PCT: f64 = 75.0;

/// Efficiency within this many points of the reference still counts as
/// optimal; beyond `CRITICAL_DROP_PP` below it the collector is critical.
const OPTIMAL_DROP_PP: f64 = 5.0;
const CRITICAL_DROP_PP: f64 = 20.0;

/// Gain, loss, and efficiency as a sensor suite would report them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedPerformance {
    pub heat_gain: f64,
    pub heat_loss: f64,
    pub thermal_efficiency: f64,
}

/// Derive performance metrics from measured values.
///
/// Q = ṁ·Cp·(T_out − T_in), clamped at zero; efficiency is gain over incident
/// power (G·A) as a percentage clamped to [0, 100]; loss is the remainder of
/// the incident power, clamped at zero. Zero irradiance defines efficiency as
/// zero rather than dividing by zero.
pub fn observed_performance(
    irradiance: f64,
    inlet_temperature: f64,
    outlet_temperature: f64,
    mass_flow_rate: f64,
) -> ObservedPerformance {
    if mass_flow_rate <= 0.0 {
        return ObservedPerformance {
            heat_gain: 0.0,
            heat_loss: 0.0,
            thermal_efficiency: 0.0,
        };
    }

    let heat_gain =
        (mass_flow_rate * FLUID_SPECIFIC_HEAT * (outlet_temperature - inlet_temperature)).max(0.0);
    let incident_power = irradiance * COLLECTOR_AREA_M2;

    let thermal_efficiency = if incident_power <= 0.0 {
        0.0
    } else {
        (heat_gain / incident_power * 100.0).clamp(0.0, 100.0)
    };

    let heat_loss = (incident_power - heat_gain).max(0.0);

    ObservedPerformance {
        heat_gain,
        heat_loss,
        thermal_efficiency,
    }
}

/// Judge an observed outlet temperature against the ideal reference.
///
/// Degradation is the percentage-point drop from the fixed reference
/// efficiency; it goes negative when the reading overperforms the reference.
pub fn analyze(input: &SimulationInput, observed_outlet_temperature: f64) -> PerformanceRecord {
    let observed = observed_performance(
        input.solar_irradiance,
        input.inlet_temperature,
        observed_outlet_temperature,
        input.mass_flow_rate,
    );

    let degradation = IDEAL_EFFICIENCY_PCT - observed.thermal_efficiency;

    let condition = if observed.thermal_efficiency >= IDEAL_EFFICIENCY_PCT - OPTIMAL_DROP_PP {
        PerformanceCondition::Optimal
    } else if observed.thermal_efficiency >= IDEAL_EFFICIENCY_PCT - CRITICAL_DROP_PP {
        PerformanceCondition::Degraded
    } else {
        PerformanceCondition::Critical
    };

    PerformanceRecord {
        thermal_efficiency: observed.thermal_efficiency,
        heat_gain: observed.heat_gain,
        heat_loss: observed.heat_loss,
        performance_degradation: degradation,
        condition,
        message: condition.message().to_string(),
    }
}
