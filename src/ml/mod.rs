//! Fault classification: feature schema, tree-ensemble model, offline
//! training pipeline, and the serving-time classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classifier;
pub mod features;
pub mod forest;
pub mod training;

pub use classifier::{Diagnosis, FaultClassifier, FaultDetector};
pub use features::{FaultFeatures, FEATURE_COUNT};

/// Descriptive metadata persisted alongside a trained model.
///
/// `feature_names` and `labels` are the self-describing part of the artifact:
/// they are compared against the live schema at load time so an artifact
/// trained against a different feature builder version is rejected instead of
/// silently misclassifying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub samples_per_label: usize,
    pub feature_names: Vec<String>,
    pub labels: Vec<String>,
    pub validation_metrics: ValidationMetrics,
}

/// Classification quality on the held-out validation split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
}

/// Offline-only failures. Training is all-or-nothing: any of these aborts the
/// run and leaves a previously persisted artifact untouched.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training dataset is degenerate: {0}")]
    Dataset(String),
    #[error("classifier fit failed: {0}")]
    Fit(String),
    #[error("failed to persist model artifact: {0}")]
    Persist(#[from] std::io::Error),
    #[error("failed to encode model artifact: {0}")]
    Encode(String),
}

/// Serving-time model failures. All of these surface to the caller as the
/// diagnosis capability being unavailable; simulation and analysis keep
/// working.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    #[error("model artifact is corrupt: {0}")]
    Corrupt(String),
    #[error("model artifact was trained against a different feature schema")]
    ContractMismatch,
    #[error("no trained model is loaded")]
    NotLoaded,
    #[error("inference failed: {0}")]
    Inference(String),
}
