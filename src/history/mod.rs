//! Per-user diagnostic history and dashboard counters.
//!
//! Storage is an explicit interface injected into the request layer, never
//! ambient global state: the core's pure computations stay fully isolated
//! from storage lifecycle. The JSON-file implementation keeps one directory
//! per user with `stats.json` (dashboard counters and the recent efficiency
//! chart) and `history.json` (append-only diagnostic records).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{DiagnosticRecord, FaultCondition};

/// Chart keeps the most recent simulations only.
const MAX_CHART_POINTS: usize = 20;
/// Dashboard shows the few most recent non-normal diagnoses.
const MAX_RECENT_FAULTS: usize = 5;
/// Diagnostic log is capped per user.
const MAX_DIAGNOSTIC_RECORDS: usize = 100;

/// One point on the dashboard's efficiency chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyPoint {
    pub timestamp: DateTime<Utc>,
    pub efficiency: f64,
    pub heat_gain: f64,
}

/// Dashboard counters for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_simulations: u64,
    pub total_efficiency_sum: f64,
    pub recent_faults: Vec<FaultCondition>,
    pub history: Vec<EfficiencyPoint>,
}

/// Key-value history storage keyed by an opaque user identifier.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn stats(&self, user_id: &str) -> Result<UserStats>;
    /// Record one simulation run: bumps the counters and appends a chart
    /// point, trimming the chart to its cap.
    async fn record_simulation(&self, user_id: &str, efficiency: f64, heat_gain: f64)
        -> Result<()>;
    /// Track a diagnosed (non-normal) fault on the dashboard.
    async fn record_fault(&self, user_id: &str, fault: FaultCondition) -> Result<()>;
    async fn append_diagnostic(&self, user_id: &str, record: DiagnosticRecord) -> Result<()>;
    async fn diagnostics(&self, user_id: &str) -> Result<Vec<DiagnosticRecord>>;
    /// Clear counters and recent faults but keep the chart points, so the
    /// dashboard graph survives a reset.
    async fn reset_stats(&self, user_id: &str) -> Result<()>;
}

/// JSON-file backed store.
pub struct JsonFileStore {
    root: PathBuf,
    // One writer at a time; reads go through it too since every operation is
    // a read-modify-write of a small file.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            lock: Mutex::new(()),
        }
    }

    /// User ids come straight from a request header; restrict them to a safe
    /// charset before using them as a path component.
    fn sanitize(user_id: &str) -> String {
        let cleaned: String = user_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .take(64)
            .collect();
        if cleaned.is_empty() {
            "default".to_string()
        } else {
            cleaned
        }
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(Self::sanitize(user_id))
    }

    async fn read_json<T: Default + for<'de> Deserialize<'de>>(&self, path: &PathBuf) -> Result<T> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("malformed JSON in {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &PathBuf, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))
    }

    fn stats_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("stats.json")
    }

    fn history_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("history.json")
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    async fn stats(&self, user_id: &str) -> Result<UserStats> {
        let _guard = self.lock.lock().await;
        self.read_json(&self.stats_path(user_id)).await
    }

    async fn record_simulation(
        &self,
        user_id: &str,
        efficiency: f64,
        heat_gain: f64,
    ) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.stats_path(user_id);
        let mut stats: UserStats = self.read_json(&path).await?;

        stats.total_simulations += 1;
        stats.total_efficiency_sum += efficiency;
        stats.history.push(EfficiencyPoint {
            timestamp: Utc::now(),
            efficiency,
            heat_gain,
        });
        if stats.history.len() > MAX_CHART_POINTS {
            let excess = stats.history.len() - MAX_CHART_POINTS;
            stats.history.drain(..excess);
        }

        self.write_json(&path, &stats).await
    }

    async fn record_fault(&self, user_id: &str, fault: FaultCondition) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.stats_path(user_id);
        let mut stats: UserStats = self.read_json(&path).await?;

        stats.recent_faults.insert(0, fault);
        stats.recent_faults.truncate(MAX_RECENT_FAULTS);

        self.write_json(&path, &stats).await
    }

    async fn append_diagnostic(&self, user_id: &str, record: DiagnosticRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.history_path(user_id);
        let mut records: Vec<DiagnosticRecord> = self.read_json(&path).await?;

        records.insert(0, record);
        records.truncate(MAX_DIAGNOSTIC_RECORDS);

        debug!(user = %JsonFileStore::sanitize(user_id), records = records.len(), "diagnostic appended");
        self.write_json(&path, &records).await
    }

    async fn diagnostics(&self, user_id: &str) -> Result<Vec<DiagnosticRecord>> {
        let _guard = self.lock.lock().await;
        self.read_json(&self.history_path(user_id)).await
    }

    async fn reset_stats(&self, user_id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.stats_path(user_id);
        let stats: UserStats = self.read_json(&path).await?;

        let reset = UserStats {
            total_simulations: 0,
            total_efficiency_sum: 0.0,
            recent_faults: Vec::new(),
            history: stats.history,
        };
        self.write_json(&path, &reset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::FaultFeatures;

    fn scratch_store() -> JsonFileStore {
        let root = std::env::temp_dir().join(format!("stm-history-{}", uuid::Uuid::new_v4()));
        JsonFileStore::new(root)
    }

    fn record(fault: FaultCondition) -> DiagnosticRecord {
        let features = FaultFeatures {
            solar_irradiance: 800.0,
            inlet_temperature: 30.0,
            outlet_temperature: 43.0,
            mass_flow_rate: 0.02,
            thermal_efficiency: 68.0,
            heat_gain: 1100.0,
        };
        DiagnosticRecord::new(&features, fault, 90.0)
    }

    #[test]
    fn test_sanitize_strips_path_separators() {
        assert_eq!(JsonFileStore::sanitize("../../etc"), "etc");
        assert_eq!(JsonFileStore::sanitize("alice-42_b"), "alice-42_b");
        assert_eq!(JsonFileStore::sanitize("///"), "default");
        assert_eq!(JsonFileStore::sanitize(""), "default");
    }

    #[tokio::test]
    async fn test_empty_user_has_default_stats() {
        let store = scratch_store();
        let stats = store.stats("nobody").await.unwrap();
        assert_eq!(stats.total_simulations, 0);
        assert!(stats.history.is_empty());
    }

    #[tokio::test]
    async fn test_record_simulation_accumulates() {
        let store = scratch_store();
        store.record_simulation("alice", 70.0, 1100.0).await.unwrap();
        store.record_simulation("alice", 60.0, 900.0).await.unwrap();

        let stats = store.stats("alice").await.unwrap();
        assert_eq!(stats.total_simulations, 2);
        assert!((stats.total_efficiency_sum - 130.0).abs() < 1e-9);
        assert_eq!(stats.history.len(), 2);

        // Other users are unaffected.
        let other = store.stats("bob").await.unwrap();
        assert_eq!(other.total_simulations, 0);
    }

    #[tokio::test]
    async fn test_chart_is_capped() {
        let store = scratch_store();
        for i in 0..25 {
            store
                .record_simulation("alice", 50.0 + i as f64, 1000.0)
                .await
                .unwrap();
        }
        let stats = store.stats("alice").await.unwrap();
        assert_eq!(stats.history.len(), MAX_CHART_POINTS);
        // Oldest points were dropped.
        assert!((stats.history[0].efficiency - 55.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_recent_faults_newest_first_and_capped() {
        let store = scratch_store();
        for _ in 0..4 {
            store
                .record_fault("alice", FaultCondition::DustAccumulation)
                .await
                .unwrap();
        }
        store
            .record_fault("alice", FaultCondition::HeatLeakage)
            .await
            .unwrap();
        store
            .record_fault("alice", FaultCondition::SensorDrift)
            .await
            .unwrap();

        let stats = store.stats("alice").await.unwrap();
        assert_eq!(stats.recent_faults.len(), MAX_RECENT_FAULTS);
        assert_eq!(stats.recent_faults[0], FaultCondition::SensorDrift);
        assert_eq!(stats.recent_faults[1], FaultCondition::HeatLeakage);
    }

    #[tokio::test]
    async fn test_diagnostics_append_only_newest_first() {
        let store = scratch_store();
        store
            .append_diagnostic("alice", record(FaultCondition::Normal))
            .await
            .unwrap();
        store
            .append_diagnostic("alice", record(FaultCondition::HeatLeakage))
            .await
            .unwrap();

        let records = store.diagnostics("alice").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].predicted_fault, FaultCondition::HeatLeakage);
        assert_eq!(records[1].predicted_fault, FaultCondition::Normal);
    }

    #[tokio::test]
    async fn test_reset_clears_counters_but_keeps_chart() {
        let store = scratch_store();
        store.record_simulation("alice", 70.0, 1100.0).await.unwrap();
        store
            .record_fault("alice", FaultCondition::HeatLeakage)
            .await
            .unwrap();

        store.reset_stats("alice").await.unwrap();

        let stats = store.stats("alice").await.unwrap();
        assert_eq!(stats.total_simulations, 0);
        assert_eq!(stats.total_efficiency_sum, 0.0);
        assert!(stats.recent_faults.is_empty());
        assert_eq!(stats.history.len(), 1);
    }
}
