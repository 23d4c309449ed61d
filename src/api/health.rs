use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    classifier: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ComponentHealth {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            detail: None,
        }
    }

    fn unavailable(detail: String) -> Self {
        Self {
            status: "unavailable".to_string(),
            detail: Some(detail),
        }
    }
}

/// GET /api/v1/health - Health check endpoint
///
/// An unloaded classifier degrades the service but does not take it down:
/// simulation and performance analysis remain usable, so this still answers
/// 200 with status "degraded".
pub async fn health_check(State(st): State<AppState>) -> Json<HealthResponse> {
    let classifier = if st.classifier.is_loaded() {
        ComponentHealth::healthy()
    } else {
        ComponentHealth::unavailable(format!(
            "no model artifact at {}",
            st.classifier.artifact_path().display()
        ))
    };

    let status = if classifier.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now(),
        checks: HealthChecks { classifier },
    })
}
