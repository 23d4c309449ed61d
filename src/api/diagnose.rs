use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{
    api::{error::ApiError, UserId},
    domain::{DiagnosticRecord, FaultCondition},
    ml::{training, FaultFeatures, ModelMetadata},
    state::AppState,
};

/// POST /api/v1/diagnose - Classify a performance observation
pub async fn detect_fault(
    State(st): State<AppState>,
    UserId(user): UserId,
    Json(features): Json<FaultFeatures>,
) -> Result<Json<DiagnosticRecord>, ApiError> {
    features.validate()?;

    let diagnosis = st.classifier.predict(&features)?;
    let record = DiagnosticRecord::new(&features, diagnosis.fault, diagnosis.confidence_pct);

    info!(
        user = %user,
        fault = %record.predicted_fault,
        confidence = record.confidence_score,
        "fault diagnosis completed"
    );

    if record.predicted_fault != FaultCondition::Normal {
        st.history.record_fault(&user, record.predicted_fault).await?;
    }
    st.history.append_diagnostic(&user, record.clone()).await?;

    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
pub struct TrainRequest {
    pub samples_per_label: Option<usize>,
    pub seed: Option<u64>,
}

/// POST /api/v1/train - Regenerate the synthetic dataset, refit the
/// classifier, persist it, and hot-swap the serving model
pub async fn train_model(
    State(st): State<AppState>,
    body: Option<Json<TrainRequest>>,
) -> Result<Json<ModelMetadata>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    // One training run at a time; the artifact file has a single writer.
    let guard = st.training.clone();
    let _guard = guard.try_lock().map_err(|_| ApiError::TrainingInProgress)?;

    let config = training::TrainingConfig {
        samples_per_label: request
            .samples_per_label
            .unwrap_or(st.cfg.training.samples_per_label),
        seed: request.seed.or(st.cfg.training.seed),
        ..training::TrainingConfig::default()
    };
    let artifact_path = st.cfg.model.artifact_path.clone();

    // CPU-bound; keep it off the async workers.
    let detector = tokio::task::spawn_blocking(move || {
        let detector = training::train(&config)?;
        training::save_artifact(&detector, &artifact_path)?;
        Ok::<_, crate::ml::TrainingError>(detector)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let metadata = detector.metadata().clone();
    st.classifier.replace(detector);

    info!(
        model_id = %metadata.model_id,
        accuracy = metadata.validation_metrics.accuracy,
        "serving model replaced"
    );

    Ok(Json(metadata))
}
