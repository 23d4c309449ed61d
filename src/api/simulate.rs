use axum::{extract::State, Json};
use tracing::debug;
use validator::Validate;

use crate::{
    api::{error::ApiError, UserId},
    domain::{PerformanceRecord, SimulationInput, SimulationResult},
    simulation,
    state::AppState,
};

/// POST /api/v1/simulate - Predict collector behavior at one operating point
pub async fn run_simulation(
    State(st): State<AppState>,
    UserId(user): UserId,
    Json(input): Json<SimulationInput>,
) -> Result<Json<SimulationResult>, ApiError> {
    input.validate()?;

    let result = simulation::simulate(&input);
    debug!(
        user = %user,
        fault = %input.fault_condition,
        efficiency = result.thermal_efficiency,
        "simulation evaluated"
    );

    st.history
        .record_simulation(&user, result.thermal_efficiency, result.useful_heat_gain)
        .await?;

    Ok(Json(result))
}

/// POST /api/v1/performance - Judge an observed outlet temperature against
/// the ideal reference
pub async fn analyze_performance(
    State(_st): State<AppState>,
    UserId(user): UserId,
    Json(input): Json<SimulationInput>,
) -> Result<Json<PerformanceRecord>, ApiError> {
    input.validate()?;

    let observed_outlet = input.outlet_temperature.ok_or_else(|| {
        ApiError::InvalidInput("outlet_temperature is required for performance analysis".into())
    })?;

    let record = simulation::analyze(&input, observed_outlet);
    debug!(
        user = %user,
        condition = %record.condition,
        degradation = record.performance_degradation,
        "performance analyzed"
    );

    Ok(Json(record))
}
