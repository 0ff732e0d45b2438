//! Batch tracking of open signals: one price-window fetch per symbol, then
//! a lifecycle poll per signal. A fetch failure or timeout skips only that
//! symbol's signals for the cycle; the batch itself never fails on provider
//! trouble.

pub mod lifecycle;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::time::{timeout, Duration};

use crate::data::MarketDataProvider;
use crate::models::{Candle, RunSummary, TrackedSignal};
use crate::store::SignalStore;
use lifecycle::{LifecycleConfig, SignalEvent};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub lifecycle: LifecycleConfig,
    /// Per-symbol fetch budget; a slow provider costs one symbol, not the run
    pub fetch_timeout_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleConfig::default(),
            fetch_timeout_secs: 15,
        }
    }
}

/// Poll every open signal once and persist the results. Returns the run
/// summary, which is also logged and appended to the store's run log.
pub async fn track_open_signals(
    store: &dyn SignalStore,
    provider: &dyn MarketDataProvider,
    cfg: &TrackerConfig,
) -> crate::Result<RunSummary> {
    let open: Vec<TrackedSignal> = store
        .load_all()
        .await?
        .into_iter()
        .filter(|s| s.status.is_open())
        .collect();

    if open.is_empty() {
        tracing::info!("no open signals to track");
        return Ok(RunSummary {
            timestamp: Some(Utc::now()),
            ..RunSummary::default()
        });
    }

    tracing::info!(count = open.len(), "checking open signals");

    let windows = fetch_windows(provider, &open, cfg).await;

    let now = Utc::now();
    let mut summary = RunSummary {
        timestamp: Some(now),
        ..RunSummary::default()
    };

    for mut sig in open {
        let Some(window) = windows.get(&sig.signal.symbol) else {
            continue;
        };
        summary.checked += 1;

        // Bars since this signal's creation; fall back to the latest bar
        // when the signal is newer than the freshest candle.
        let mut bars: Vec<Candle> = window
            .iter()
            .filter(|c| c.timestamp >= sig.signal.created_at)
            .cloned()
            .collect();
        if bars.is_empty() {
            if let Some(last) = window.last() {
                bars.push(last.clone());
            }
        }

        let event = lifecycle::poll(&mut sig, &bars, now, &cfg.lifecycle);
        match event {
            Some(SignalEvent::Tp1Hit) => {
                summary.tp1_hits += 1;
                tracing::info!(
                    symbol = %sig.signal.symbol,
                    direction = sig.signal.direction.as_str(),
                    entry = sig.signal.entry,
                    tp1 = sig.signal.tp1,
                    "first target hit"
                );
            }
            Some(SignalEvent::Tp2Hit) => {
                summary.tp2_hits += 1;
                tracing::info!(
                    symbol = %sig.signal.symbol,
                    direction = sig.signal.direction.as_str(),
                    entry = sig.signal.entry,
                    tp2 = sig.signal.tp2,
                    "second target hit"
                );
            }
            Some(SignalEvent::SlHit) => {
                summary.sl_hits += 1;
                tracing::info!(
                    symbol = %sig.signal.symbol,
                    direction = sig.signal.direction.as_str(),
                    entry = sig.signal.entry,
                    stop = sig.signal.stop_loss,
                    "stop hit"
                );
            }
            Some(SignalEvent::Expired) => {
                summary.expired += 1;
                tracing::info!(
                    symbol = %sig.signal.symbol,
                    direction = sig.signal.direction.as_str(),
                    entry = sig.signal.entry,
                    "signal expired with no resolution"
                );
            }
            None => {}
        }

        if let Err(e) = store.update(&sig).await {
            tracing::warn!(id = %sig.id, error = %e, "failed to persist tracked signal");
        }
    }

    summary.still_active = summary.checked
        - summary.tp1_hits
        - summary.tp2_hits
        - summary.sl_hits
        - summary.expired;

    tracing::info!(
        checked = summary.checked,
        tp1 = summary.tp1_hits,
        tp2 = summary.tp2_hits,
        sl = summary.sl_hits,
        expired = summary.expired,
        still_active = summary.still_active,
        "tracking run complete"
    );

    if let Err(e) = store.log_run(&summary).await {
        tracing::warn!(error = %e, "failed to append run summary");
    }

    Ok(summary)
}

/// Providers must hand back windows ascending by time; anything else would
/// corrupt the window extremes.
fn validate_window(candles: &[Candle]) -> anyhow::Result<()> {
    if candles.windows(2).any(|w| w[0].timestamp > w[1].timestamp) {
        anyhow::bail!("price window is not sorted by timestamp");
    }
    Ok(())
}

/// One timeout-guarded window fetch per distinct symbol, spanning from the
/// oldest open signal on that symbol.
async fn fetch_windows(
    provider: &dyn MarketDataProvider,
    open: &[TrackedSignal],
    cfg: &TrackerConfig,
) -> HashMap<String, Vec<Candle>> {
    let mut since_by_symbol: HashMap<String, DateTime<Utc>> = HashMap::new();
    for sig in open {
        since_by_symbol
            .entry(sig.signal.symbol.clone())
            .and_modify(|t| *t = (*t).min(sig.signal.created_at))
            .or_insert(sig.signal.created_at);
    }

    let mut windows = HashMap::new();
    for (symbol, since) in since_by_symbol {
        let fetch = provider.price_window(&symbol, since);
        match timeout(Duration::from_secs(cfg.fetch_timeout_secs), fetch).await {
            Ok(Ok(candles)) if !candles.is_empty() => match validate_window(&candles) {
                Ok(()) => {
                    windows.insert(symbol, candles);
                }
                Err(e) => {
                    tracing::warn!(symbol, error = %e, "bad price window, skipping this cycle");
                }
            },
            Ok(Ok(_)) => {
                tracing::warn!(symbol, "empty price window, skipping this cycle");
            }
            Ok(Err(e)) => {
                tracing::warn!(symbol, error = %e, "price fetch failed, skipping this cycle");
            }
            Err(_) => {
                tracing::warn!(
                    symbol,
                    timeout_secs = cfg.fetch_timeout_secs,
                    "price fetch timed out, skipping this cycle"
                );
            }
        }
    }
    windows
}
