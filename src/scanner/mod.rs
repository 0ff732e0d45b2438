//! Market scan: evaluate every instrument in the universe, persist and
//! announce the signals, and collect trend statuses for the digest. When the
//! strict rules produce fewer than the configured minimum, the fallback
//! classifier fills the gap with the best remaining trend opportunities —
//! which can never outrank a strict signal.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;

use crate::data::FeatureSource;
use crate::models::{FeatureSnapshot, MarketStatus, TradeSignal, TrackedSignal};
use crate::notify::Notifier;
use crate::store::SignalStore;
use crate::strategy::{status, SignalEngine};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Fallback signals fill up to this many per scan
    pub min_signals_per_scan: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_signals_per_scan: 3,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub signals: Vec<TradeSignal>,
    pub statuses: Vec<MarketStatus>,
    /// How many of the signals came from the fallback classifier
    pub fallback_count: usize,
}

pub async fn scan(
    symbols: &[String],
    features: &dyn FeatureSource,
    engine: &SignalEngine,
    store: &dyn SignalStore,
    notifier: &dyn Notifier,
    cfg: &ScanConfig,
) -> crate::Result<ScanOutcome> {
    scan_at(symbols, features, engine, store, notifier, cfg, Utc::now()).await
}

/// Scan with an explicit timestamp (session quality and signal creation
/// times derive from it)
#[allow(clippy::too_many_arguments)]
pub async fn scan_at(
    symbols: &[String],
    features: &dyn FeatureSource,
    engine: &SignalEngine,
    store: &dyn SignalStore,
    notifier: &dyn Notifier,
    cfg: &ScanConfig,
    now: chrono::DateTime<Utc>,
) -> crate::Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    let mut snapshots: HashMap<String, FeatureSnapshot> = HashMap::new();
    let mut matched: Vec<String> = Vec::new();

    tracing::info!(instruments = symbols.len(), "market scan started");

    // Strict pass
    for symbol in symbols {
        let snap = match features.snapshot(symbol).await {
            Ok(snap) => snap,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "no snapshot, skipping");
                continue;
            }
        };
        let confirmation = match features.confirmation_snapshot(symbol).await {
            Ok(conf) => conf,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "confirmation snapshot failed, using primary trend");
                None
            }
        };

        if let Some(market_status) = status::trend_status(symbol, &snap) {
            outcome.statuses.push(market_status);
        }

        if let Some(signal) = engine.evaluate(symbol, &snap, confirmation.as_ref(), now) {
            tracing::info!(
                symbol,
                direction = signal.direction.as_str(),
                pattern = signal.pattern.label(),
                score = signal.score,
                "strict signal"
            );
            matched.push(symbol.clone());
            outcome.signals.push(signal);
        }
        snapshots.insert(symbol.clone(), snap);
    }

    // Fallback fill: only instruments that produced no strict signal, best
    // scores first, never more than the configured minimum in total.
    if outcome.signals.len() < cfg.min_signals_per_scan {
        let mut opportunities: Vec<TradeSignal> = snapshots
            .iter()
            .filter(|(symbol, _)| !matched.contains(*symbol))
            .filter_map(|(symbol, snap)| engine.evaluate_fallback(symbol, snap, now))
            .collect();
        opportunities.sort_by(|a, b| b.score.cmp(&a.score).then(a.symbol.cmp(&b.symbol)));

        let missing = cfg.min_signals_per_scan - outcome.signals.len();
        for signal in opportunities.into_iter().take(missing) {
            tracing::info!(
                symbol = %signal.symbol,
                direction = signal.direction.as_str(),
                score = signal.score,
                "fallback opportunity"
            );
            outcome.fallback_count += 1;
            outcome.signals.push(signal);
        }
    }

    // Persist and announce
    for signal in &outcome.signals {
        if let Err(e) = store.append(TrackedSignal::open(signal.clone())).await {
            tracing::warn!(symbol = %signal.symbol, error = %e, "failed to persist signal");
        }
        if let Err(e) = notifier.notify(signal).await {
            tracing::warn!(symbol = %signal.symbol, error = %e, "notifier failed");
        }
    }

    tracing::info!(
        signals = outcome.signals.len(),
        fallback = outcome.fallback_count,
        statuses = outcome.statuses.len(),
        "market scan complete"
    );

    Ok(outcome)
}
