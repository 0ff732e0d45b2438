//! JSON-file signal store: `active_signals.json` holds everything still
//! being tracked plus freshly resolved records, `signal_history.json` holds
//! archived ones, `run_log.json` keeps the last 200 tracking-run summaries.
//!
//! A corrupted or unreadable file degrades to an empty collection with a
//! warning; a broken store must never take the batch down.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SignalBotError;
use crate::models::{RunSummary, SignalStatus, TrackedSignal};
use crate::store::{SignalStore, StoreStats};

const MAX_RUN_LOG_ENTRIES: usize = 200;

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn active_file(&self) -> PathBuf {
        self.dir.join("active_signals.json")
    }

    fn history_file(&self) -> PathBuf {
        self.dir.join("signal_history.json")
    }

    fn run_log_file(&self) -> PathBuf {
        self.dir.join("run_log.json")
    }

    fn load<T: DeserializeOwned>(path: &Path) -> Vec<T> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable store file, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupted store file, treating as empty");
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, path: &Path, items: &[T]) -> crate::Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(SignalBotError::from)?;
        let raw = serde_json::to_string_pretty(items).map_err(SignalBotError::from)?;
        std::fs::write(path, raw).map_err(SignalBotError::from)?;
        Ok(())
    }
}

#[async_trait]
impl SignalStore for JsonFileStore {
    async fn load_all(&self) -> crate::Result<Vec<TrackedSignal>> {
        Ok(Self::load(&self.active_file()))
    }

    async fn append(&self, signal: TrackedSignal) -> crate::Result<String> {
        let mut active: Vec<TrackedSignal> = Self::load(&self.active_file());

        // Same instrument, same direction, still unresolved: keep tracking
        // the original instead of stacking duplicates.
        if let Some(existing) = active.iter().find(|s| {
            s.signal.symbol == signal.signal.symbol
                && s.signal.direction == signal.signal.direction
                && s.status == SignalStatus::Active
        }) {
            tracing::debug!(
                symbol = %signal.signal.symbol,
                id = %existing.id,
                "already tracking this signal"
            );
            return Ok(existing.id.clone());
        }

        let id = signal.id.clone();
        tracing::info!(
            id = %id,
            symbol = %signal.signal.symbol,
            direction = signal.signal.direction.as_str(),
            "logged signal for tracking"
        );
        active.push(signal);
        self.save(&self.active_file(), &active)?;
        Ok(id)
    }

    async fn update(&self, signal: &TrackedSignal) -> crate::Result<()> {
        let mut active: Vec<TrackedSignal> = Self::load(&self.active_file());
        let slot = active
            .iter_mut()
            .find(|s| s.id == signal.id)
            .ok_or_else(|| SignalBotError::UnknownSignal(signal.id.clone()))?;
        *slot = signal.clone();
        self.save(&self.active_file(), &active)
    }

    async fn archive_resolved(&self) -> crate::Result<usize> {
        let active: Vec<TrackedSignal> = Self::load(&self.active_file());
        let mut history: Vec<TrackedSignal> = Self::load(&self.history_file());

        let (resolved, still_open): (Vec<_>, Vec<_>) = active
            .into_iter()
            .partition(|s| s.status.is_terminal());

        let moved = resolved.len();
        if moved > 0 {
            history.extend(resolved);
            self.save(&self.history_file(), &history)?;
            self.save(&self.active_file(), &still_open)?;
            tracing::info!(moved, "archived resolved signals");
        }
        Ok(moved)
    }

    async fn log_run(&self, summary: &RunSummary) -> crate::Result<()> {
        let mut entries: Vec<RunSummary> = Self::load(&self.run_log_file());
        entries.push(summary.clone());
        if entries.len() > MAX_RUN_LOG_ENTRIES {
            let skip = entries.len() - MAX_RUN_LOG_ENTRIES;
            entries.drain(..skip);
        }
        self.save(&self.run_log_file(), &entries)
    }

    async fn stats(&self) -> crate::Result<StoreStats> {
        let active: Vec<TrackedSignal> = Self::load(&self.active_file());
        let history: Vec<TrackedSignal> = Self::load(&self.history_file());
        let open = active.iter().filter(|s| !s.status.is_terminal()).count();
        let resolved_pending = active.len() - open;
        Ok(StoreStats {
            active: open,
            resolved_pending,
            archived: history.len(),
            total: active.len() + history.len(),
        })
    }
}
