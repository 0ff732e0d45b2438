//! Best-opportunity fallback, used to fill the per-scan minimum when the
//! strict rules produce too few signals. Requirements are looser (weak trend
//! strength is enough, no pattern needed) but the score is hard-capped at 3
//! so a fallback can never outrank a strict signal: strict acceptance starts
//! at 4.

use crate::models::{Direction, FeatureSnapshot, Regime, SessionQuality};

/// Hard cap on fallback scores; strictly below the strict-signal floor
pub const FALLBACK_MAX_SCORE: u8 = 3;

pub fn best_opportunity(
    snap: &FeatureSnapshot,
    session: SessionQuality,
) -> Option<(Direction, u8)> {
    if !snap.has_required_fields() {
        return None;
    }
    let adx = snap.adx?;
    if adx < 10.0 {
        return None;
    }
    if snap.trend == 0 {
        return None;
    }
    if snap.regime == Regime::Volatile {
        return None;
    }
    // No chasing extremes
    let rsi = snap.rsi?;
    if snap.trend == 1 && rsi > 78.0 {
        return None;
    }
    if snap.trend == -1 && rsi < 22.0 {
        return None;
    }
    // The lowest-liquidity window is not worth a weak signal
    if session == SessionQuality::Thin {
        return None;
    }

    let direction = if snap.trend == 1 {
        Direction::Buy
    } else {
        Direction::Sell
    };

    let mut score: u8 = 1;
    if adx >= 25.0 {
        score += 1;
    }
    if matches!(snap.vol_ratio, Some(v) if v >= 1.0) {
        score += 1;
    }
    Some((direction, score.min(FALLBACK_MAX_SCORE)))
}
