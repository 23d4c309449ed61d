//! Serving-time fault classifier.
//!
//! [`FaultDetector`] is the persisted, immutable model; inference on it is a
//! pure function. [`FaultClassifier`] owns the detector's lifecycle: it is
//! always in exactly one of two states, Unloaded or Loaded. A predict call
//! while Unloaded triggers a single load attempt and surfaces a model-
//! unavailable error if the artifact cannot be used; loading is idempotent
//! and safe to invoke redundantly from concurrent callers. Once loaded, the
//! model is read-only and concurrent inference needs no further coordination.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::domain::FaultCondition;

use super::features::FaultFeatures;
use super::forest::VoteForest;
use super::{ModelError, ModelMetadata};

/// Outcome of one inference call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnosis {
    pub fault: FaultCondition,
    /// Vote share of the winning class, % in [0, 100].
    pub confidence_pct: f64,
}

/// A fitted classifier plus its self-describing metadata. This is the unit
/// that gets persisted.
#[derive(Debug, Serialize, Deserialize)]
pub struct FaultDetector {
    metadata: ModelMetadata,
    forest: VoteForest,
}

impl FaultDetector {
    pub fn new(metadata: ModelMetadata, forest: VoteForest) -> Self {
        Self { metadata, forest }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Pure, deterministic inference.
    pub fn predict(&self, features: &FaultFeatures) -> Result<Diagnosis, ModelError> {
        let (class, vote_share) = self.forest.predict(&features.to_vector())?;
        let fault = FaultCondition::from_class_index(class).ok_or_else(|| {
            ModelError::Inference(format!("class index {class} has no fault label"))
        })?;
        Ok(Diagnosis {
            fault,
            confidence_pct: (vote_share * 100.0).clamp(0.0, 100.0),
        })
    }

    /// Reject artifacts trained against a different feature or label schema.
    fn verify_contract(&self) -> Result<(), ModelError> {
        let features_match = self
            .metadata
            .feature_names
            .iter()
            .map(String::as_str)
            .eq(FaultFeatures::NAMES);
        let labels_match = self
            .metadata
            .labels
            .iter()
            .cloned()
            .eq(FaultCondition::ALL.iter().map(|f| f.to_string()));
        if features_match && labels_match {
            Ok(())
        } else {
            Err(ModelError::ContractMismatch)
        }
    }
}

/// Read and verify a persisted detector.
pub fn load_artifact(path: &Path) -> Result<FaultDetector, ModelError> {
    let bytes = std::fs::read(path)?;
    let detector: FaultDetector =
        bincode::deserialize(&bytes).map_err(|e| ModelError::Corrupt(e.to_string()))?;
    detector.verify_contract()?;
    Ok(detector)
}

/// Shared handle to the loaded model. Constructed once and shared by
/// reference across concurrent request handlers.
pub struct FaultClassifier {
    artifact_path: PathBuf,
    model: RwLock<Option<Arc<FaultDetector>>>,
}

impl FaultClassifier {
    /// Create an Unloaded classifier pointing at the artifact location.
    pub fn new(artifact_path: PathBuf) -> Self {
        Self {
            artifact_path,
            model: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.read().is_some()
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Load the persisted artifact. Idempotent: a no-op when already loaded.
    pub fn load(&self) -> Result<(), ModelError> {
        let mut guard = self.model.write();
        if guard.is_some() {
            return Ok(());
        }
        let detector = load_artifact(&self.artifact_path)?;
        info!(
            model_id = %detector.metadata().model_id,
            trained_at = %detector.metadata().trained_at,
            "fault detection model loaded"
        );
        *guard = Some(Arc::new(detector));
        Ok(())
    }

    /// Install a freshly trained detector, replacing any loaded model.
    pub fn replace(&self, detector: FaultDetector) {
        *self.model.write() = Some(Arc::new(detector));
    }

    /// Metadata of the loaded model, if any.
    pub fn metadata(&self) -> Option<ModelMetadata> {
        self.model.read().as_ref().map(|m| m.metadata().clone())
    }

    /// Classify a feature vector, lazily loading the artifact on first use.
    pub fn predict(&self, features: &FaultFeatures) -> Result<Diagnosis, ModelError> {
        let loaded = self.model.read().clone();
        let model = match loaded {
            Some(model) => model,
            None => {
                self.load()?;
                self.model.read().clone().ok_or(ModelError::NotLoaded)?
            }
        };
        model.predict(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::forest::ForestParameters;
    use crate::ml::training::{save_artifact, train, TrainingConfig};

    fn quick_detector() -> FaultDetector {
        train(&TrainingConfig {
            samples_per_label: 20,
            holdout_ratio: 0.2,
            seed: Some(11),
            forest: ForestParameters {
                n_trees: 11,
                max_depth: 10,
                min_samples_split: 2,
                min_samples_leaf: 1,
            },
        })
        .unwrap()
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{name}-{}.bin", uuid::Uuid::new_v4()))
    }

    fn normal_features() -> FaultFeatures {
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
    fn test_missing_artifact_is_unavailable() {
        let classifier = FaultClassifier::new(scratch_path("missing"));
        assert!(!classifier.is_loaded());
        let result = classifier.predict(&normal_features());
        assert!(matches!(result, Err(ModelError::Unavailable(_))));
        assert!(!classifier.is_loaded());
    }

    #[test]
    fn test_corrupt_artifact_is_rejected() {
        let path = scratch_path("corrupt");
        std::fs::write(&path, b"not a model").unwrap();
        let result = load_artifact(&path);
        assert!(matches!(result, Err(ModelError::Corrupt(_))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_persist_load_predict_round_trip() {
        let detector = quick_detector();
        let path = scratch_path("round-trip");
        save_artifact(&detector, &path).unwrap();

        let classifier = FaultClassifier::new(path.clone());
        // Lazy load: the first predict call loads the artifact.
        let diagnosis = classifier.predict(&normal_features()).unwrap();
        assert!(classifier.is_loaded());
        assert!((0.0..=100.0).contains(&diagnosis.confidence_pct));

        // Idempotent: a redundant explicit load is a no-op.
        classifier.load().unwrap();
        let again = classifier.predict(&normal_features()).unwrap();
        assert_eq!(diagnosis, again);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_mismatched_feature_schema_is_rejected() {
        let detector = quick_detector();
        let path = scratch_path("mismatch");
        save_artifact(&detector, &path).unwrap();

        // Re-read, tamper with the persisted feature names, and persist again
        // to fake an artifact from an older feature builder.
        let bytes = std::fs::read(&path).unwrap();
        let mut tampered: FaultDetector = bincode::deserialize(&bytes).unwrap();
        tampered.metadata.feature_names[0] = "irradiance_kw".to_string();
        save_artifact(&tampered, &path).unwrap();

        let result = load_artifact(&path);
        assert!(matches!(result, Err(ModelError::ContractMismatch)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_replace_installs_new_model() {
        let classifier = FaultClassifier::new(scratch_path("never-written"));
        classifier.replace(quick_detector());
        assert!(classifier.is_loaded());
        assert!(classifier.metadata().is_some());
        assert!(classifier.predict(&normal_features()).is_ok());
    }
}
