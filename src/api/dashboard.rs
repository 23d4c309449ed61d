use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    api::{error::ApiError, UserId},
    domain::{DiagnosticRecord, FaultCondition},
    history::EfficiencyPoint,
    state::AppState,
};

/// Each recent fault costs this many points of the health index.
const HEALTH_PENALTY_PER_FAULT: f64 = 5.0;

/// Aggregated per-user stats for the dashboard
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_simulations: u64,
    pub system_health_index: f64,
    pub average_efficiency: f64,
    pub recent_faults: Vec<FaultCondition>,
    pub history: Vec<EfficiencyPoint>,
}

/// GET /api/v1/dashboard - Aggregated stats for the dashboard
pub async fn dashboard_summary(
    State(st): State<AppState>,
    UserId(user): UserId,
) -> Result<Json<DashboardSummary>, ApiError> {
    let stats = st.history.stats(&user).await?;

    let average_efficiency = if stats.total_simulations > 0 {
        stats.total_efficiency_sum / stats.total_simulations as f64
    } else {
        0.0
    };

    let health_index =
        (100.0 - stats.recent_faults.len() as f64 * HEALTH_PENALTY_PER_FAULT).max(0.0);

    Ok(Json(DashboardSummary {
        total_simulations: stats.total_simulations,
        system_health_index: health_index,
        average_efficiency,
        recent_faults: stats.recent_faults,
        history: stats.history,
    }))
}

/// GET /api/v1/history - Full persistent log of diagnostic runs
pub async fn diagnostic_history(
    State(st): State<AppState>,
    UserId(user): UserId,
) -> Result<Json<Vec<DiagnosticRecord>>, ApiError> {
    Ok(Json(st.history.diagnostics(&user).await?))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
}

/// POST /api/v1/history/reset - Clear counters, keep the chart points
pub async fn reset_stats(
    State(st): State<AppState>,
    UserId(user): UserId,
) -> Result<Json<ResetResponse>, ApiError> {
    st.history.reset_stats(&user).await?;
    Ok(Json(ResetResponse {
        message: "Summary metrics reset. Historical logs preserved.".to_string(),
    }))
}
