//! Trend-condition snapshot per instrument, produced on every scan for the
//! daily digest regardless of whether a signal fired.

use crate::config::instruments;
use crate::models::{FeatureSnapshot, MarketStatus, TrendCondition};

pub fn trend_status(symbol: &str, snap: &FeatureSnapshot) -> Option<MarketStatus> {
    let ema_fast = snap.ema_fast?;
    let rsi = snap.rsi?;

    let condition = if rsi > 70.0 {
        TrendCondition::Overbought
    } else if rsi < 30.0 {
        TrendCondition::Oversold
    } else if snap.trend == 1 && rsi > 50.0 {
        TrendCondition::StrongBullish
    } else if snap.trend == 1 {
        TrendCondition::Bullish
    } else if snap.trend == -1 && rsi < 50.0 {
        TrendCondition::StrongBearish
    } else if snap.trend == -1 {
        TrendCondition::Bearish
    } else {
        TrendCondition::Neutral
    };

    Some(MarketStatus {
        symbol: symbol.to_string(),
        name: instruments::display_name(symbol),
        close: snap.close,
        ema_fast,
        ema_slow: snap.ema_slow,
        rsi,
        atr: snap.atr,
        adx: snap.adx,
        regime: snap.regime,
        trend: snap.trend,
        condition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(trend: i8, rsi: f64) -> FeatureSnapshot {
        FeatureSnapshot {
            close: 100.0,
            ema_fast: Some(99.0),
            ema_slow: Some(97.0),
            rsi: Some(rsi),
            atr: Some(2.0),
            trend,
            ..Default::default()
        }
    }

    #[test]
    fn test_condition_classification() {
        let cases = [
            (1, 75.0, TrendCondition::Overbought),
            (1, 25.0, TrendCondition::Oversold),
            (1, 60.0, TrendCondition::StrongBullish),
            (1, 45.0, TrendCondition::Bullish),
            (-1, 40.0, TrendCondition::StrongBearish),
            (-1, 55.0, TrendCondition::Bearish),
            (0, 50.0, TrendCondition::Neutral),
        ];
        for (trend, rsi, expected) in cases {
            let status = trend_status("GC=F", &snapshot_with(trend, rsi)).unwrap();
            assert_eq!(status.condition, expected, "trend={trend} rsi={rsi}");
        }
    }

    #[test]
    fn test_missing_fields_yield_no_status() {
        let mut snap = snapshot_with(1, 55.0);
        snap.ema_fast = None;
        assert!(trend_status("GC=F", &snap).is_none());
    }

    #[test]
    fn test_status_carries_display_name() {
        let status = trend_status("GC=F", &snapshot_with(1, 55.0)).unwrap();
        assert_eq!(status.name, "Gold Futures");
    }
}
