//! Bootstrap-bagged ensemble of decision trees with vote-share confidence.
//!
//! smartcore's stock random forest classifier exposes predicted labels but no
//! class probabilities, and a diagnosis without a confidence figure is not
//! actionable. So the ensemble is assembled here on top of smartcore's
//! decision trees: each tree is fitted on a bootstrap resample of the
//! training set, prediction is a majority vote, and the confidence is the
//! share of trees that voted for the winning class.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};

use super::features::FEATURE_COUNT;
use super::{ModelError, TrainingError};

/// Ensemble hyperparameters. Tunable calibration constants: the defaults
/// mirror a 100-tree forest with enough depth to carve the fault signatures
/// apart without memorizing sensor noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParameters {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 5,
            min_samples_leaf: 2,
        }
    }
}

impl ForestParameters {
    fn tree_parameters(&self, seed: u64) -> DecisionTreeClassifierParameters {
        let mut params = DecisionTreeClassifierParameters::default()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);
        params.seed = Some(seed);
        params
    }
}

/// A fitted voting ensemble.
#[derive(Debug, Serialize, Deserialize)]
pub struct VoteForest {
    trees: Vec<DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>>,
    n_classes: usize,
}

impl VoteForest {
    /// Fit the ensemble on a labeled dataset.
    ///
    /// Bootstrap resampling is driven by `rng`, so a seeded generator makes
    /// the bagging reproducible.
    pub fn fit<R: Rng>(
        x: &[[f64; FEATURE_COUNT]],
        y: &[u32],
        n_classes: usize,
        params: &ForestParameters,
        rng: &mut R,
    ) -> Result<Self, TrainingError> {
        if x.is_empty() {
            return Err(TrainingError::Dataset("no training rows".into()));
        }
        if x.len() != y.len() {
            return Err(TrainingError::Dataset(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if n_classes == 0 {
            return Err(TrainingError::Dataset("no classes".into()));
        }
        if let Some(bad) = y.iter().find(|label| **label as usize >= n_classes) {
            return Err(TrainingError::Dataset(format!(
                "label {bad} out of range for {n_classes} classes"
            )));
        }
        if params.n_trees == 0 {
            return Err(TrainingError::Fit("ensemble needs at least one tree".into()));
        }

        let n_rows = x.len();
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let mut sample_values = Vec::with_capacity(n_rows * FEATURE_COUNT);
            let mut sample_labels = Vec::with_capacity(n_rows);
            for _ in 0..n_rows {
                let row = rng.gen_range(0..n_rows);
                sample_values.extend_from_slice(&x[row]);
                sample_labels.push(y[row]);
            }

            let matrix = DenseMatrix::new(n_rows, FEATURE_COUNT, sample_values, false);
            let tree =
                DecisionTreeClassifier::fit(&matrix, &sample_labels, params.tree_parameters(rng.gen()))
                    .map_err(|e| TrainingError::Fit(format!("{e:?}")))?;
            trees.push(tree);
        }

        Ok(Self { trees, n_classes })
    }

    /// Majority vote over all trees.
    ///
    /// Returns the winning class index and the fraction of trees (in [0, 1])
    /// that voted for it. Deterministic for a fitted forest.
    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<(u32, f64), ModelError> {
        let matrix = DenseMatrix::new(1, FEATURE_COUNT, features.to_vec(), false);

        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let predicted = tree
                .predict(&matrix)
                .map_err(|e| ModelError::Inference(format!("{e:?}")))?;
            let class = predicted[0] as usize;
            if class >= self.n_classes {
                return Err(ModelError::Inference(format!(
                    "tree voted for out-of-range class {class}"
                )));
            }
            votes[class] += 1;
        }

        let (winner, count) = votes
            .iter()
            .enumerate()
            .max_by_key(|(_, count)| **count)
            .ok_or_else(|| ModelError::Inference("empty ensemble".into()))?;

        Ok((winner as u32, *count as f64 / self.trees.len() as f64))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}
