//! Signal quality score: weighted, additive, clamped to [0,10].
//!
//! Component breakdown:
//!   trend strength   0-3   momentum sign   0-1   cloud side      0-1
//!   volume ratio     0-2   trailing dir    0-1   SAR direction   0-1
//!   oscillator spot  0-2   stochastic K/D  0-1   VWAP side       0-1
//!   timeframe align  0-2   structure break 0-1   fast-MA trend   0-1
//!                          gap occupancy   0-1   divergence      0-2
//!   regime -1/0/+1   session -2/0/+1

use crate::models::{Direction, FeatureSnapshot, Regime, SessionQuality};

pub fn score_signal(
    direction: Direction,
    snap: &FeatureSnapshot,
    confirmation_trend: i8,
    session: SessionQuality,
) -> u8 {
    let mut score: i32 = 0;

    // Trend strength (0-3, banded)
    if let Some(adx) = snap.adx {
        if adx >= 40.0 {
            score += 3;
        } else if adx >= 30.0 {
            score += 2;
        } else if adx >= 20.0 {
            score += 1;
        }
    }

    // Volume ratio (0-2)
    if let Some(vol) = snap.vol_ratio {
        if vol >= 1.5 {
            score += 2;
        } else if vol >= 1.0 {
            score += 1;
        }
    }

    // Oscillator sweet spot (0-2, direction-dependent)
    if let Some(rsi) = snap.rsi {
        match direction {
            Direction::Buy => {
                if (50.0..=65.0).contains(&rsi) {
                    score += 2;
                } else if (45.0..=70.0).contains(&rsi) {
                    score += 1;
                }
            }
            Direction::Sell => {
                if (35.0..=50.0).contains(&rsi) {
                    score += 2;
                } else if (30.0..=55.0).contains(&rsi) {
                    score += 1;
                }
            }
        }
    }

    // Multi-timeframe alignment (0-2)
    match direction {
        Direction::Buy => {
            if snap.trend == 1 && confirmation_trend == 1 {
                score += 2;
            } else if snap.trend == 1 || confirmation_trend >= 0 {
                score += 1;
            }
        }
        Direction::Sell => {
            if snap.trend == -1 && confirmation_trend == -1 {
                score += 2;
            } else if snap.trend == -1 || confirmation_trend <= 0 {
                score += 1;
            }
        }
    }

    // Momentum sign agreement (0-1)
    if let Some(hist) = snap.macd_hist {
        let agrees = match direction {
            Direction::Buy => hist > 0.0,
            Direction::Sell => hist < 0.0,
        };
        if agrees {
            score += 1;
        }
    }

    // Trailing filter direction (0-1)
    let st_agrees = match direction {
        Direction::Buy => snap.supertrend_dir == 1,
        Direction::Sell => snap.supertrend_dir == -1,
    };
    if st_agrees {
        score += 1;
    }

    // Stochastic ordering: fast above/below slow (0-1)
    if let (Some(k), Some(d)) = (snap.stochrsi_k, snap.stochrsi_d) {
        let rising = match direction {
            Direction::Buy => k > d,
            Direction::Sell => k < d,
        };
        if rising {
            score += 1;
        }
    }

    // Structure-break confirmation (0-1)
    let bos_agrees = match direction {
        Direction::Buy => snap.bos == 1,
        Direction::Sell => snap.bos == -1,
    };
    if bos_agrees {
        score += 1;
    }

    // Imbalance-zone occupancy (0-1)
    let in_gap = match direction {
        Direction::Buy => snap.in_bull_gap,
        Direction::Sell => snap.in_bear_gap,
    };
    if in_gap {
        score += 1;
    }

    // Divergence against recent extremes (0-2)
    let diverging = match direction {
        Direction::Buy => snap.bullish_divergence,
        Direction::Sell => snap.bearish_divergence,
    };
    if diverging {
        score += 2;
    }

    // Cloud side alignment (0-1)
    let cloud_agrees = match direction {
        Direction::Buy => snap.above_cloud,
        Direction::Sell => snap.below_cloud,
    };
    if cloud_agrees {
        score += 1;
    }

    // Stop-and-reverse filter direction (0-1)
    let sar_agrees = match direction {
        Direction::Buy => snap.psar_dir == 1,
        Direction::Sell => snap.psar_dir == -1,
    };
    if sar_agrees {
        score += 1;
    }

    // Volume-weighted price side (0-1)
    let vwap_agrees = match direction {
        Direction::Buy => snap.vwap_bull,
        Direction::Sell => !snap.vwap_bull,
    };
    if vwap_agrees {
        score += 1;
    }

    // Fast lag-reduced MA trend (0-1)
    let hma_agrees = match direction {
        Direction::Buy => snap.hma_bull,
        Direction::Sell => !snap.hma_bull,
    };
    if hma_agrees {
        score += 1;
    }

    // Regime adjustment
    match snap.regime {
        Regime::Ranging => score -= 1,
        Regime::Squeeze => score += 1,
        _ => {}
    }

    // Session adjustment
    match session {
        SessionQuality::KillZone => score += 1,
        SessionQuality::Thin => score -= 2,
        SessionQuality::Normal => {}
    }

    score.clamp(0, 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_buy_snapshot() -> FeatureSnapshot {
        FeatureSnapshot {
            close: 100.0,
            ema_fast: Some(99.0),
            ema_slow: Some(97.0),
            rsi: Some(55.0),
            atr: Some(2.0),
            adx: Some(45.0),
            vol_ratio: Some(1.8),
            macd_hist: Some(0.5),
            stochrsi_k: Some(0.7),
            stochrsi_d: Some(0.4),
            trend: 1,
            regime: Regime::Trending,
            supertrend_dir: 1,
            bos: 1,
            above_cloud: true,
            psar_dir: 1,
            hma_bull: true,
            vwap_bull: true,
            in_bull_gap: true,
            bullish_divergence: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_score_is_clamped_to_ten() {
        // Every component agrees; the raw sum is well above 10
        let snap = strong_buy_snapshot();
        let score = score_signal(Direction::Buy, &snap, 1, SessionQuality::KillZone);
        assert_eq!(score, 10);
    }

    #[test]
    fn test_score_never_negative() {
        let snap = FeatureSnapshot {
            rsi: Some(80.0),
            regime: Regime::Ranging,
            hma_bull: false,
            vwap_bull: false,
            trend: -1,
            ..Default::default()
        };
        let score = score_signal(Direction::Buy, &snap, -1, SessionQuality::Thin);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_adx_bands() {
        let mut snap = FeatureSnapshot {
            trend: -1,
            hma_bull: true,
            vwap_bull: true,
            regime: Regime::Trending,
            ..Default::default()
        };
        // Isolate the ADX component: everything else contributes zero for Buy
        snap.adx = Some(19.9);
        let base = score_signal(Direction::Buy, &snap, -1, SessionQuality::Normal);
        snap.adx = Some(20.0);
        assert_eq!(
            score_signal(Direction::Buy, &snap, -1, SessionQuality::Normal),
            base + 1
        );
        snap.adx = Some(30.0);
        assert_eq!(
            score_signal(Direction::Buy, &snap, -1, SessionQuality::Normal),
            base + 2
        );
        snap.adx = Some(40.0);
        assert_eq!(
            score_signal(Direction::Buy, &snap, -1, SessionQuality::Normal),
            base + 3
        );
    }

    #[test]
    fn test_oscillator_sweet_spot_is_direction_dependent() {
        let snap = FeatureSnapshot {
            rsi: Some(55.0),
            regime: Regime::Trending,
            ..Default::default()
        };
        let buy = score_signal(Direction::Buy, &snap, 0, SessionQuality::Normal);
        let sell = score_signal(Direction::Sell, &snap, 0, SessionQuality::Normal);
        // 55 is in the Buy sweet spot (+2) but only the acceptable Sell band (+1);
        // both get the partial-alignment point, Sell also gets HMA/VWAP bear points
        assert_eq!(buy, 2 + 1);
        assert_eq!(sell, 1 + 1 + 1 + 1);
    }

    #[test]
    fn test_session_adjustments() {
        let snap = FeatureSnapshot {
            adx: Some(35.0),
            rsi: Some(55.0),
            trend: 1,
            regime: Regime::Trending,
            ..Default::default()
        };
        let normal = score_signal(Direction::Buy, &snap, 1, SessionQuality::Normal);
        let kill = score_signal(Direction::Buy, &snap, 1, SessionQuality::KillZone);
        let thin = score_signal(Direction::Buy, &snap, 1, SessionQuality::Thin);
        assert_eq!(kill, normal + 1);
        assert_eq!(thin, normal - 2);
    }

    #[test]
    fn test_regime_adjustments() {
        let mut snap = FeatureSnapshot {
            adx: Some(35.0),
            rsi: Some(55.0),
            trend: 1,
            regime: Regime::Trending,
            ..Default::default()
        };
        let trending = score_signal(Direction::Buy, &snap, 1, SessionQuality::Normal);
        snap.regime = Regime::Ranging;
        assert_eq!(
            score_signal(Direction::Buy, &snap, 1, SessionQuality::Normal),
            trending - 1
        );
        snap.regime = Regime::Squeeze;
        assert_eq!(
            score_signal(Direction::Buy, &snap, 1, SessionQuality::Normal),
            trending + 1
        );
    }

    #[test]
    fn test_divergence_bonus() {
        let mut snap = FeatureSnapshot {
            regime: Regime::Trending,
            trend: 1,
            ..Default::default()
        };
        let base = score_signal(Direction::Buy, &snap, 1, SessionQuality::Normal);
        snap.bullish_divergence = true;
        assert_eq!(
            score_signal(Direction::Buy, &snap, 1, SessionQuality::Normal),
            base + 2
        );
        // Opposite-direction divergence contributes nothing
        snap.bullish_divergence = false;
        snap.bearish_divergence = true;
        assert_eq!(
            score_signal(Direction::Buy, &snap, 1, SessionQuality::Normal),
            base
        );
    }
}
