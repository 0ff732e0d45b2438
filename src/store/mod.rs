// Signal persistence: trait seam plus the JSON-file implementation
pub mod json_store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{RunSummary, TrackedSignal};

/// Quick counts for the stats command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub active: usize,
    pub resolved_pending: usize,
    pub archived: usize,
    pub total: usize,
}

/// Persistence seam for tracked signals. The pipeline appends, the tracker
/// updates by id, resolved records move to history on archive.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// All signals still in the active file, resolved or not
    async fn load_all(&self) -> crate::Result<Vec<TrackedSignal>>;

    /// Add a signal for tracking and return its id. An unresolved signal
    /// with the same symbol and direction is already being tracked; its id
    /// is returned instead of creating a duplicate.
    async fn append(&self, signal: TrackedSignal) -> crate::Result<String>;

    /// Replace the stored record with the given id
    async fn update(&self, signal: &TrackedSignal) -> crate::Result<()>;

    /// Move terminal signals to history; returns how many moved
    async fn archive_resolved(&self) -> crate::Result<usize>;

    /// Append a tracking-run summary to the bounded run log
    async fn log_run(&self, summary: &RunSummary) -> crate::Result<()>;

    async fn stats(&self) -> crate::Result<StoreStats>;
}
