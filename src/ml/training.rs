//! Offline training pipeline: synthetic fault scenarios in, persisted
//! classifier artifact out.
//!
//! For every fault label the pipeline samples operating points in realistic
//! ranges, runs the physics simulator with that fault injected, corrupts the
//! sensor readings with Gaussian measurement noise, and rebuilds the derived
//! metrics from the noisy readings — so the classifier is trained on feature
//! rows shaped exactly like the ones it will see at inference time.
//!
//! Training is all-or-nothing: any failure aborts the run and leaves a
//! previously persisted artifact untouched (the artifact is written to a
//! temporary file and atomically renamed into place).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::domain::{FaultCondition, SimulationInput};
use crate::simulation::{observed_performance, simulate};

use super::classifier::FaultDetector;
use super::features::{FaultFeatures, FEATURE_COUNT};
use super::forest::{ForestParameters, VoteForest};
use super::{ModelMetadata, TrainingError, ValidationMetrics};

// Realistic operating ranges the synthetic scenarios are drawn from.
const IRRADIANCE_RANGE: std::ops::Range<f64> = 200.0..1000.0;
const INLET_TEMP_RANGE: std::ops::Range<f64> = 20.0..40.0;
const AMBIENT_TEMP_RANGE: std::ops::Range<f64> = 20.0..35.0;
const FLOW_RATE_RANGE: std::ops::Range<f64> = 0.02..0.1;

// Gaussian measurement noise applied to the simulated sensor readings.
const IRRADIANCE_NOISE_STD: f64 = 5.0;
const TEMPERATURE_NOISE_STD: f64 = 0.2;
const FLOW_NOISE_STD: f64 = 0.001;

// A noisy flow reading is floored here so derived metrics stay defined.
const MIN_FLOW_READING: f64 = 1e-4;

/// Knobs for one training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Synthetic samples drawn per fault label.
    pub samples_per_label: usize,
    /// Fraction of the dataset held out for validation metrics.
    pub holdout_ratio: f64,
    /// Seed for dataset generation and bagging. `None` draws from entropy;
    /// reproducible runs must pass a seed.
    pub seed: Option<u64>,
    pub forest: ForestParameters,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples_per_label: 500,
            holdout_ratio: 0.2,
            seed: None,
            forest: ForestParameters::default(),
        }
    }
}

struct SensorNoise {
    irradiance: Normal<f64>,
    temperature: Normal<f64>,
    flow: Normal<f64>,
}

impl SensorNoise {
    fn new() -> Result<Self, TrainingError> {
        let gaussian = |std: f64| {
            Normal::new(0.0, std).map_err(|e| TrainingError::Dataset(e.to_string()))
        };
        Ok(Self {
            irradiance: gaussian(IRRADIANCE_NOISE_STD)?,
            temperature: gaussian(TEMPERATURE_NOISE_STD)?,
            flow: gaussian(FLOW_NOISE_STD)?,
        })
    }
}

/// Generate the balanced, labeled synthetic dataset.
pub fn generate_dataset<R: Rng>(
    samples_per_label: usize,
    rng: &mut R,
) -> Result<(Vec<[f64; FEATURE_COUNT]>, Vec<u32>), TrainingError> {
    if samples_per_label == 0 {
        return Err(TrainingError::Dataset(
            "samples_per_label must be at least 1".into(),
        ));
    }

    let noise = SensorNoise::new()?;
    let total = samples_per_label * FaultCondition::ALL.len();
    let mut x = Vec::with_capacity(total);
    let mut y = Vec::with_capacity(total);

    for fault in FaultCondition::ALL {
        for _ in 0..samples_per_label {
            let input = SimulationInput {
                solar_irradiance: rng.gen_range(IRRADIANCE_RANGE),
                inlet_temperature: rng.gen_range(INLET_TEMP_RANGE),
                outlet_temperature: None,
                ambient_temperature: rng.gen_range(AMBIENT_TEMP_RANGE),
                mass_flow_rate: rng.gen_range(FLOW_RATE_RANGE),
                fault_condition: fault,
            };
            let result = simulate(&input);

            // What the sensors actually report.
            let irradiance = (input.solar_irradiance + noise.irradiance.sample(rng)).max(0.0);
            let inlet = input.inlet_temperature + noise.temperature.sample(rng);
            let outlet = result.simulated_outlet_temperature + noise.temperature.sample(rng);
            let flow = (input.mass_flow_rate + noise.flow.sample(rng)).max(MIN_FLOW_READING);

            let observed = observed_performance(irradiance, inlet, outlet, flow);
            let features = FaultFeatures {
                solar_irradiance: irradiance,
                inlet_temperature: inlet,
                outlet_temperature: outlet,
                mass_flow_rate: flow,
                thermal_efficiency: observed.thermal_efficiency,
                heat_gain: observed.heat_gain,
            };

            x.push(features.to_vector());
            y.push(fault.class_index());
        }
    }

    Ok((x, y))
}

/// Run the full pipeline: generate, split, fit, validate.
pub fn train(config: &TrainingConfig) -> Result<FaultDetector, TrainingError> {
    if !(0.0..1.0).contains(&config.holdout_ratio) || config.holdout_ratio == 0.0 {
        return Err(TrainingError::Dataset(format!(
            "holdout_ratio {} must be in (0, 1)",
            config.holdout_ratio
        )));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (x, y) = generate_dataset(config.samples_per_label, &mut rng)?;

    // The dataset is generated label by label; shuffle before splitting so
    // the holdout covers every class.
    let mut order: Vec<usize> = (0..x.len()).collect();
    order.shuffle(&mut rng);

    let holdout = ((x.len() as f64) * config.holdout_ratio).round() as usize;
    let holdout = holdout.clamp(1, x.len() - 1);

    let (val_idx, train_idx) = order.split_at(holdout);
    let train_x: Vec<[f64; FEATURE_COUNT]> = train_idx.iter().map(|&i| x[i]).collect();
    let train_y: Vec<u32> = train_idx.iter().map(|&i| y[i]).collect();
    let val_x: Vec<[f64; FEATURE_COUNT]> = val_idx.iter().map(|&i| x[i]).collect();
    let val_y: Vec<u32> = val_idx.iter().map(|&i| y[i]).collect();

    let n_classes = FaultCondition::ALL.len();
    let forest = VoteForest::fit(&train_x, &train_y, n_classes, &config.forest, &mut rng)?;

    let predictions = val_x
        .iter()
        .map(|features| forest.predict(features).map(|(class, _)| class))
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|e| TrainingError::Fit(e.to_string()))?;
    let metrics = classification_metrics(&predictions, &val_y, n_classes);

    info!(
        training_samples = train_x.len(),
        validation_samples = val_x.len(),
        accuracy = metrics.accuracy,
        macro_f1 = metrics.macro_f1,
        "fault classifier trained"
    );

    let metadata = ModelMetadata {
        model_id: format!("fault_forest_{}", Uuid::new_v4()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        trained_at: chrono::Utc::now(),
        training_samples: x.len(),
        samples_per_label: config.samples_per_label,
        feature_names: FaultFeatures::NAMES.iter().map(|s| s.to_string()).collect(),
        labels: FaultCondition::ALL.iter().map(|f| f.to_string()).collect(),
        validation_metrics: metrics,
    };

    Ok(FaultDetector::new(metadata, forest))
}

/// Accuracy plus macro-averaged precision/recall/F1 over all classes.
pub fn classification_metrics(
    predictions: &[u32],
    targets: &[u32],
    n_classes: usize,
) -> ValidationMetrics {
    let n = predictions.len().min(targets.len());
    let mut confusion = vec![vec![0usize; n_classes]; n_classes];
    let mut correct = 0usize;

    for (&predicted, &actual) in predictions.iter().zip(targets.iter()) {
        if (predicted as usize) < n_classes && (actual as usize) < n_classes {
            confusion[actual as usize][predicted as usize] += 1;
        }
        if predicted == actual {
            correct += 1;
        }
    }

    let accuracy = if n == 0 { 0.0 } else { correct as f64 / n as f64 };

    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut f1_sum = 0.0;
    for class in 0..n_classes {
        let tp = confusion[class][class] as f64;
        let predicted_as: f64 = (0..n_classes).map(|c| confusion[c][class] as f64).sum();
        let actual_of: f64 = confusion[class].iter().map(|&c| c as f64).sum();

        let precision = if predicted_as > 0.0 { tp / predicted_as } else { 0.0 };
        let recall = if actual_of > 0.0 { tp / actual_of } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        precision_sum += precision;
        recall_sum += recall;
        f1_sum += f1;
    }

    let classes = n_classes.max(1) as f64;
    ValidationMetrics {
        accuracy,
        macro_precision: precision_sum / classes,
        macro_recall: recall_sum / classes,
        macro_f1: f1_sum / classes,
    }
}

/// Persist a trained detector, atomically replacing any prior artifact.
pub fn save_artifact(detector: &FaultDetector, path: &Path) -> Result<(), TrainingError> {
    let bytes =
        bincode::serialize(detector).map_err(|e| TrainingError::Encode(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    std::fs::write(&tmp, &bytes)?;
    std::fs::rename(&tmp, path)?;

    info!(path = %path.display(), bytes = bytes.len(), "model artifact persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(seed: u64) -> TrainingConfig {
        TrainingConfig {
            samples_per_label: 30,
            holdout_ratio: 0.2,
            seed: Some(seed),
            forest: ForestParameters {
                n_trees: 15,
                max_depth: 10,
                min_samples_split: 2,
                min_samples_leaf: 1,
            },
        }
    }

    #[test]
    fn test_zero_samples_per_label_aborts() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            generate_dataset(0, &mut rng),
            Err(TrainingError::Dataset(_))
        ));
    }

    #[test]
    fn test_dataset_is_balanced_and_labeled() {
        let mut rng = StdRng::seed_from_u64(1);
        let (x, y) = generate_dataset(10, &mut rng).unwrap();
        assert_eq!(x.len(), 10 * FaultCondition::ALL.len());
        assert_eq!(x.len(), y.len());
        for fault in FaultCondition::ALL {
            let count = y.iter().filter(|&&l| l == fault.class_index()).count();
            assert_eq!(count, 10);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let (x_a, y_a) = generate_dataset(5, &mut rng_a).unwrap();
        let (x_b, y_b) = generate_dataset(5, &mut rng_b).unwrap();
        assert_eq!(x_a, x_b);
        assert_eq!(y_a, y_b);
    }

    #[test]
    fn test_invalid_holdout_ratio_aborts() {
        for ratio in [0.0, 1.0, 1.5] {
            let config = TrainingConfig {
                holdout_ratio: ratio,
                ..quick_config(1)
            };
            assert!(matches!(train(&config), Err(TrainingError::Dataset(_))));
        }
    }

    #[test]
    fn test_quick_training_learns_something() {
        let detector = train(&quick_config(42)).unwrap();
        let metrics = &detector.metadata().validation_metrics;
        // Even a small forest on a small dataset beats random guessing
        // (1/6 ≈ 0.17) by a wide margin.
        assert!(metrics.accuracy > 0.5, "accuracy was {}", metrics.accuracy);
        assert_eq!(
            detector.metadata().feature_names,
            FaultFeatures::NAMES.to_vec()
        );
        assert_eq!(detector.metadata().labels.len(), FaultCondition::ALL.len());
    }

    #[test]
    fn test_metrics_on_perfect_predictions() {
        let predictions = vec![0, 1, 2, 0, 1, 2];
        let metrics = classification_metrics(&predictions, &predictions, 3);
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.macro_precision, 1.0);
        assert_eq!(metrics.macro_recall, 1.0);
        assert_eq!(metrics.macro_f1, 1.0);
    }

    #[test]
    fn test_metrics_on_constant_predictor() {
        let predictions = vec![0, 0, 0, 0];
        let targets = vec![0, 0, 1, 1];
        let metrics = classification_metrics(&predictions, &targets, 2);
        assert_eq!(metrics.accuracy, 0.5);
        // Class 1 is never predicted: precision 0.5 macro, recall 0.5 macro.
        assert!((metrics.macro_precision - 0.25).abs() < 1e-9);
        assert!((metrics.macro_recall - 0.5).abs() < 1e-9);
    }
}
