//! Offline training entrypoint.
//!
//! Run manually before first serving (or whenever the calibration changes):
//!
//! ```text
//! cargo run --bin train_model [samples_per_label] [seed]
//! ```
//!
//! Generates the synthetic fault dataset, fits the classifier, and persists
//! the artifact at the configured path. A failed run leaves any previously
//! persisted artifact untouched.

use anyhow::{Context, Result};
use solar_thermal_monitor::config::Config;
use solar_thermal_monitor::ml::training::{self, TrainingConfig};
use solar_thermal_monitor::telemetry;
use tracing::info;

fn main() -> Result<()> {
    telemetry::init_tracing();

    let cfg = Config::load()?;

    let mut args = std::env::args().skip(1);
    let samples_per_label = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid samples_per_label: {raw}"))?,
        None => cfg.training.samples_per_label,
    };
    let seed = match args.next() {
        Some(raw) => Some(
            raw.parse::<u64>()
                .with_context(|| format!("invalid seed: {raw}"))?,
        ),
        None => cfg.training.seed,
    };

    let training_config = TrainingConfig {
        samples_per_label,
        seed,
        ..TrainingConfig::default()
    };

    info!(samples_per_label, ?seed, "training fault classifier");
    let detector = training::train(&training_config)?;
    training::save_artifact(&detector, &cfg.model.artifact_path)?;

    let metadata = detector.metadata();
    info!(
        model_id = %metadata.model_id,
        accuracy = metadata.validation_metrics.accuracy,
        macro_f1 = metadata.validation_metrics.macro_f1,
        path = %cfg.model.artifact_path.display(),
        "training complete"
    );
    Ok(())
}
