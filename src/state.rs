//! Shared application state handed to every request handler.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::history::{HistoryStore, JsonFileStore};
use crate::ml::FaultClassifier;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub classifier: Arc<FaultClassifier>,
    pub history: Arc<dyn HistoryStore>,
    /// Training is not designed for concurrent writers to the artifact;
    /// handlers take this with `try_lock` and reject overlapping runs.
    pub training: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let classifier = Arc::new(FaultClassifier::new(cfg.model.artifact_path.clone()));

        // A missing artifact only disables the diagnosis capability;
        // simulation and analysis stay up.
        match classifier.load() {
            Ok(()) => info!("fault detection model ready"),
            Err(e) => warn!(
                error = %e,
                path = %classifier.artifact_path().display(),
                "fault diagnosis unavailable until a model is trained"
            ),
        }

        let history: Arc<dyn HistoryStore> =
            Arc::new(JsonFileStore::new(cfg.storage.data_dir.clone()));

        Ok(Self {
            cfg,
            classifier,
            history,
            training: Arc::new(Mutex::new(())),
        })
    }
}
