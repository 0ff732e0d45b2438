//! Per-signal lifecycle state machine.
//!
//! Transitions: Active → Tp1Hit → {Tp2Hit, SlHit}; Active may also go
//! directly to SlHit, Tp2Hit or Expired. Terminal states never change.
//!
//! Outcomes are evaluated worst-case first: when a stop and a target were
//! both crossed inside one observation window, the stop wins. This keeps the
//! tracker from overstating performance on ambiguous price paths.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Candle, Direction, SignalStatus, TrackedSignal};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Active signals with no stop/target event expire after this many days
    pub expiry_days: i64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { expiry_days: 7 }
    }
}

/// Status transition observed during one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Tp1Hit,
    Tp2Hit,
    SlHit,
    Expired,
}

/// Check one tracked signal against a price window spanning from signal
/// creation to now (the caller substitutes the latest bar when the filtered
/// window is empty). Updates excursion statistics every poll; returns the
/// status transition, if any. Polling twice with an identical window leaves
/// the record unchanged apart from `checks_count`/`last_checked`.
pub fn poll(
    sig: &mut TrackedSignal,
    window: &[Candle],
    now: DateTime<Utc>,
    cfg: &LifecycleConfig,
) -> Option<SignalEvent> {
    if sig.status.is_terminal() || window.is_empty() {
        return None;
    }

    let window_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let window_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let latest_close = window.last().map(|c| c.close).unwrap_or(sig.current_price);

    sig.current_price = latest_close;
    sig.highest_price = sig.highest_price.max(window_high);
    sig.lowest_price = sig.lowest_price.min(window_low);

    let entry = sig.signal.entry;
    // Excursions derive from the running extremes: recomputed every poll,
    // idempotent for identical inputs, monotone across polls.
    match sig.signal.direction {
        Direction::Buy => {
            sig.max_favorable = sig.highest_price - entry;
            sig.max_adverse = entry - sig.lowest_price;
        }
        Direction::Sell => {
            sig.max_favorable = entry - sig.lowest_price;
            sig.max_adverse = sig.highest_price - entry;
        }
    }

    let event = evaluate_outcome(sig, window_high, window_low, now);

    // Expiry only applies to signals that saw no event and are still waiting
    // for their first level; a partial at TP1 stays open until TP2 or SL.
    let event = match event {
        Some(e) => Some(e),
        None if sig.status == SignalStatus::Active => {
            let age_days = (now - sig.signal.created_at).num_seconds() as f64 / 86_400.0;
            if age_days > cfg.expiry_days as f64 {
                sig.status = SignalStatus::Expired;
                sig.pnl_at_close = Some(match sig.signal.direction {
                    Direction::Buy => latest_close - entry,
                    Direction::Sell => entry - latest_close,
                });
                Some(SignalEvent::Expired)
            } else {
                None
            }
        }
        None => None,
    };

    sig.checks_count += 1;
    sig.last_checked = now;
    event
}

/// Fixed precedence: stop breach first, then the second target (the first is
/// considered achieved en route), then the first target.
fn evaluate_outcome(
    sig: &mut TrackedSignal,
    window_high: f64,
    window_low: f64,
    now: DateTime<Utc>,
) -> Option<SignalEvent> {
    let entry = sig.signal.entry;
    let sl = sig.signal.stop_loss;
    let tp1 = sig.signal.tp1;
    let tp2 = sig.signal.tp2;
    let direction = sig.signal.direction;

    let (sl_breached, tp2_reached, tp1_reached) = match direction {
        Direction::Buy => (window_low <= sl, window_high >= tp2, window_high >= tp1),
        Direction::Sell => (window_high >= sl, window_low <= tp2, window_low <= tp1),
    };

    let signed = |level: f64| match direction {
        Direction::Buy => level - entry,
        Direction::Sell => entry - level,
    };

    if sl_breached {
        sig.status = SignalStatus::SlHit;
        sig.sl_hit = true;
        sig.sl_hit_time.get_or_insert(now);
        sig.pnl_at_close = Some(signed(sl));
        return Some(SignalEvent::SlHit);
    }

    if tp2_reached {
        sig.status = SignalStatus::Tp2Hit;
        sig.tp1_hit = true;
        sig.tp2_hit = true;
        sig.tp2_hit_time.get_or_insert(now);
        sig.pnl_at_close = Some(signed(tp2));
        return Some(SignalEvent::Tp2Hit);
    }

    if tp1_reached {
        let first_time = sig.status != SignalStatus::Tp1Hit;
        sig.status = SignalStatus::Tp1Hit;
        if !sig.tp1_hit {
            sig.tp1_hit = true;
            sig.tp1_hit_time = Some(now);
        }
        sig.pnl_at_close = Some(signed(tp1));
        return first_time.then_some(SignalEvent::Tp1Hit);
    }

    None
}
