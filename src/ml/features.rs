//! Fixed-order feature vector consumed by the fault classifier.
//!
//! The classifier's decision boundary is only meaningful if training and
//! inference agree on the exact field order and units. That contract is kept
//! structural: [`FaultFeatures::to_vector`] is the single place a field is
//! mapped to a position, and [`FaultFeatures::NAMES`] is persisted into the
//! model artifact and re-checked at load time.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 6;

/// One performance observation in raw physical units, ready for inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct FaultFeatures {
    /// Solar irradiance in W/m².
    #[validate(range(min = 0.0, max = 2000.0))]
    pub solar_irradiance: f64,
    /// Inlet temperature in °C.
    #[validate(range(min = -273.15, max = 150.0))]
    pub inlet_temperature: f64,
    /// Outlet temperature in °C.
    #[validate(range(min = -273.15, max = 200.0))]
    pub outlet_temperature: f64,
    /// Mass flow rate in kg/s.
    #[validate(range(exclusive_min = 0.0, max = 10.0))]
    pub mass_flow_rate: f64,
    /// Thermal efficiency in percent.
    pub thermal_efficiency: f64,
    /// Useful heat gain in W.
    pub heat_gain: f64,
}

impl FaultFeatures {
    /// Feature names in vector order. Persisted with the trained model so a
    /// stale artifact built against a different schema is rejected at load.
    pub const NAMES: [&'static str; FEATURE_COUNT] = [
        "solar_irradiance",
        "inlet_temperature",
        "outlet_temperature",
        "mass_flow_rate",
        "thermal_efficiency",
        "heat_gain",
    ];

    /// The one and only field-to-position mapping.
    pub fn to_vector(self) -> [f64; FEATURE_COUNT] {
        [
            self.solar_irradiance,
            self.inlet_temperature,
            self.outlet_temperature,
            self.mass_flow_rate,
            self.thermal_efficiency,
            self.heat_gain,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FaultFeatures {
        FaultFeatures {
            solar_irradiance: 800.0,
            inlet_temperature: 30.0,
            outlet_temperature: 43.3,
            mass_flow_rate: 0.02,
            thermal_efficiency: 69.9,
            heat_gain: 1118.0,
        }
    }

    #[test]
    fn test_vector_order_matches_names() {
        let vector = features().to_vector();
        assert_eq!(vector.len(), FaultFeatures::NAMES.len());
        assert_eq!(vector[0], 800.0); // solar_irradiance
        assert_eq!(vector[1], 30.0); // inlet_temperature
        assert_eq!(vector[2], 43.3); // outlet_temperature
        assert_eq!(vector[3], 0.02); // mass_flow_rate
        assert_eq!(vector[4], 69.9); // thermal_efficiency
        assert_eq!(vector[5], 1118.0); // heat_gain
    }

    #[test]
    fn test_builder_is_deterministic() {
        assert_eq!(features().to_vector(), features().to_vector());
    }

    #[test]
    fn test_validation_rejects_nonpositive_flow() {
        let bad = FaultFeatures {
            mass_flow_rate: 0.0,
            ..features()
        };
        assert!(bad.validate().is_err());
        assert!(features().validate().is_ok());
    }
}
