pub mod dashboard;
pub mod diagnose;
pub mod error;
pub mod health;
pub mod simulate;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{config::Config, state::AppState};

/// Opaque per-user identity taken from the `X-User-ID` header, defaulting to
/// a shared bucket when absent. Identification only, not authentication.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or("default");
        Ok(Self(user.to_string()))
    }
}

pub fn router(state: AppState, cfg: &Config) -> Router {
    let v1 = Router::new()
        .route("/health", get(health::health_check))
        .route("/simulate", post(simulate::run_simulation))
        .route("/performance", post(simulate::analyze_performance))
        .route("/diagnose", post(diagnose::detect_fault))
        .route("/train", post(diagnose::train_model))
        .route("/dashboard", get(dashboard::dashboard_summary))
        .route("/history", get(dashboard::diagnostic_history))
        .route("/history/reset", post(dashboard::reset_stats))
        .with_state(state);

    let mut router = Router::new().nest("/api/v1", v1);

    if cfg.server.enable_cors {
        use axum::http::header;
        use tower_http::cors::{Any, CorsLayer};
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-user-id"),
            ]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    cfg.server.request_timeout_secs,
                ))),
        )
        .layer(TraceLayer::new_for_http())
}
