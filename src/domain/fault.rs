use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Named failure modes of the collector loop, plus the healthy baseline.
///
/// The wire representation (serde and Display) uses the human-readable labels
/// the sensor dashboards and the persisted model artifact agree on. The
/// variant order is load-bearing: it defines the class indices the classifier
/// is trained with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum FaultCondition {
    #[default]
    #[serde(rename = "Normal Condition")]
    #[strum(serialize = "Normal Condition")]
    Normal,
    #[serde(rename = "Dust Accumulation")]
    #[strum(serialize = "Dust Accumulation")]
    DustAccumulation,
    #[serde(rename = "Heat Leakage")]
    #[strum(serialize = "Heat Leakage")]
    HeatLeakage,
    #[serde(rename = "Pump Degradation")]
    #[strum(serialize = "Pump Degradation")]
    PumpDegradation,
    #[serde(rename = "Sensor Drift")]
    #[strum(serialize = "Sensor Drift")]
    SensorDrift,
    #[serde(rename = "Low Efficiency")]
    #[strum(serialize = "Low Efficiency")]
    LowEfficiency,
}

impl FaultCondition {
    /// Every condition, in class-index order.
    pub const ALL: [FaultCondition; 6] = [
        FaultCondition::Normal,
        FaultCondition::DustAccumulation,
        FaultCondition::HeatLeakage,
        FaultCondition::PumpDegradation,
        FaultCondition::SensorDrift,
        FaultCondition::LowEfficiency,
    ];

    /// Class index used as the training target for this condition.
    pub fn class_index(self) -> u32 {
        match self {
            FaultCondition::Normal => 0,
            FaultCondition::DustAccumulation => 1,
            FaultCondition::HeatLeakage => 2,
            FaultCondition::PumpDegradation => 3,
            FaultCondition::SensorDrift => 4,
            FaultCondition::LowEfficiency => 5,
        }
    }

    /// Inverse of [`class_index`](Self::class_index).
    pub fn from_class_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Maintenance suggestion surfaced alongside a diagnosis.
    pub fn suggestion(self) -> &'static str {
        match self {
            FaultCondition::Normal => "System is healthy. No action required.",
            FaultCondition::DustAccumulation => "Clean the collector glazing surface.",
            FaultCondition::HeatLeakage => "Inspect insulation pipes and connections.",
            FaultCondition::PumpDegradation => "Check pump motor and flow rate settings.",
            FaultCondition::SensorDrift => "Calibrate temperature sensors.",
            FaultCondition::LowEfficiency => {
                "General system maintenance recommended. Check for multiple scaling issues."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_class_index_round_trip() {
        for fault in FaultCondition::ALL {
            assert_eq!(
                FaultCondition::from_class_index(fault.class_index()),
                Some(fault)
            );
        }
        assert_eq!(FaultCondition::from_class_index(6), None);
    }

    #[test]
    fn test_wire_labels() {
        let json = serde_json::to_string(&FaultCondition::Normal).unwrap();
        assert_eq!(json, "\"Normal Condition\"");

        let parsed: FaultCondition = serde_json::from_str("\"Heat Leakage\"").unwrap();
        assert_eq!(parsed, FaultCondition::HeatLeakage);

        assert_eq!(FaultCondition::DustAccumulation.to_string(), "Dust Accumulation");
        assert_eq!(
            FaultCondition::from_str("Pump Degradation").unwrap(),
            FaultCondition::PumpDegradation
        );
    }

    #[test]
    fn test_unknown_label_rejected() {
        let result: Result<FaultCondition, _> = serde_json::from_str("\"Inverter Failure\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(FaultCondition::default(), FaultCondition::Normal);
    }

    #[test]
    fn test_every_condition_has_a_suggestion() {
        for fault in FaultCondition::ALL {
            assert!(!fault.suggestion().is_empty());
        }
    }
}
