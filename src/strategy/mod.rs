// Signal generation: hard gates, pattern rules, scoring, sizing
pub mod fallback;
pub mod rules;
pub mod scorer;
pub mod status;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::instruments;
use crate::config::session::session_quality;
use crate::config::AccountConfig;
use crate::models::{
    Direction, FeatureSnapshot, InstrumentClass, PatternKind, SessionQuality, TradeSignal,
};
use crate::risk::{trade_levels, SizedTrade, SizingConfig};
use crate::strategy::rules::{passes_gates, RuleContext, RULES};

/// Classifier thresholds: the hard gates and post-classification floors
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Trend-strength floor; exactly at the floor passes
    pub adx_min: f64,
    /// Candle-body ratio floor (rejects doji / spinning tops)
    pub body_min: f64,
    /// Volume-ratio floor applied after a rule matched
    pub volume_min: f64,
    /// Strict signals scoring below this are discarded
    pub min_signal_score: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            adx_min: 20.0,
            body_min: 0.3,
            volume_min: 0.8,
            min_signal_score: 4,
        }
    }
}

/// Combines the rule table, the scorer and the risk sizer into the full
/// snapshot → TradeSignal pipeline.
pub struct SignalEngine {
    pub classifier: ClassifierConfig,
    pub account: AccountConfig,
    pub sizing: SizingConfig,
}

impl SignalEngine {
    pub fn new(classifier: ClassifierConfig, account: AccountConfig, sizing: SizingConfig) -> Self {
        Self {
            classifier,
            account,
            sizing,
        }
    }

    /// Evaluate the strict rule table against one instrument's snapshot.
    /// Returns a fully sized signal or `None` — gate rejections, rule
    /// misses, low scores and impossible sizing all end the same way.
    pub fn evaluate(
        &self,
        symbol: &str,
        snap: &FeatureSnapshot,
        confirmation: Option<&FeatureSnapshot>,
        now: DateTime<Utc>,
    ) -> Option<TradeSignal> {
        if !passes_gates(snap, &self.classifier) {
            return None;
        }

        let confirmation_trend = confirmation.map_or(snap.trend, |c| c.trend);
        let ctx = RuleContext {
            snap,
            confirmation_trend,
        };

        let (direction, pattern) = RULES.iter().find_map(|rule| (rule.check)(&ctx))?;

        // Thin-participation floor, applied uniformly after classification
        if matches!(snap.vol_ratio, Some(v) if v < self.classifier.volume_min) {
            return None;
        }

        let class = instruments::class_of(symbol);
        let session = self.session_for(class, now);
        let score = scorer::score_signal(direction, snap, confirmation_trend, session);
        if score < self.classifier.min_signal_score {
            tracing::debug!(
                symbol,
                pattern = pattern.label(),
                score,
                "signal discarded below score floor"
            );
            return None;
        }

        self.build_signal(symbol, class, direction, pattern, score, snap, session, now)
    }

    /// Looser trend-following evaluation, used only to fill the per-scan
    /// minimum. Scores are hard-capped below the strict acceptance floor.
    pub fn evaluate_fallback(
        &self,
        symbol: &str,
        snap: &FeatureSnapshot,
        now: DateTime<Utc>,
    ) -> Option<TradeSignal> {
        let class = instruments::class_of(symbol);
        let session = self.session_for(class, now);
        let (direction, score) = fallback::best_opportunity(snap, session)?;
        self.build_signal(
            symbol,
            class,
            direction,
            PatternKind::TrendOpportunity,
            score,
            snap,
            session,
            now,
        )
    }

    /// Session quality only applies to commodity instruments; everything
    /// else scores as Normal.
    fn session_for(&self, class: InstrumentClass, now: DateTime<Utc>) -> SessionQuality {
        match class {
            InstrumentClass::Commodity => session_quality(now, class),
            _ => SessionQuality::Normal,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_signal(
        &self,
        symbol: &str,
        class: InstrumentClass,
        direction: Direction,
        pattern: PatternKind,
        score: u8,
        snap: &FeatureSnapshot,
        session: SessionQuality,
        now: DateTime<Utc>,
    ) -> Option<TradeSignal> {
        let atr = snap.atr?;
        // Sizing never guesses: no metadata, no signal
        let meta = instruments::lookup(symbol)?;
        let trade = trade_levels(
            &meta,
            snap.close,
            atr,
            direction,
            score,
            &self.account,
            &self.sizing,
        )?;

        match assemble(symbol, &meta.name, class, direction, pattern, score, snap, session, trade, now) {
            Ok(signal) => Some(signal),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "discarding signal that failed validation");
                None
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    symbol: &str,
    name: &str,
    class: InstrumentClass,
    direction: Direction,
    pattern: PatternKind,
    score: u8,
    snap: &FeatureSnapshot,
    session: SessionQuality,
    trade: SizedTrade,
    now: DateTime<Utc>,
) -> Result<TradeSignal, crate::error::SignalBotError> {
    TradeSignal {
        symbol: symbol.to_string(),
        name: name.to_string(),
        class,
        direction,
        pattern,
        score,
        entry: trade.entry,
        stop_loss: trade.stop_loss,
        tp1: trade.tp1,
        tp2: trade.tp2,
        tp3: trade.tp3,
        lot_size: trade.lot_size,
        risk_amount: trade.risk_amount,
        sl_distance: trade.sl_distance,
        rr_tp1: trade.rr_tp1,
        rr_tp2: trade.rr_tp2,
        potential_loss: trade.potential_loss,
        potential_tp1: trade.potential_tp1,
        potential_tp2: trade.potential_tp2,
        was_capped: trade.was_capped,
        atr: snap.atr.unwrap_or_default(),
        regime: snap.regime,
        session,
        created_at: now,
    }
    .validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Regime;
    use chrono::TimeZone;

    fn engine() -> SignalEngine {
        SignalEngine::new(
            ClassifierConfig::default(),
            AccountConfig::default(),
            SizingConfig::default(),
        )
    }

    /// A crossover setup strong enough to clear the score floor
    fn crossover_snapshot() -> FeatureSnapshot {
        FeatureSnapshot {
            close: 2000.0,
            open: 1995.0,
            high: 2002.0,
            low: 1993.0,
            prev_close: 1994.0,
            prev_high: 1996.0,
            prev_low: 1990.0,
            ema_fast: Some(1990.0),
            ema_slow: Some(1980.0),
            rsi: Some(55.0),
            atr: Some(20.0),
            adx: Some(32.0),
            vol_ratio: Some(1.6),
            macd_hist: Some(0.8),
            trend: 1,
            ema_cross: 1,
            regime: Regime::Trending,
            supertrend_dir: 1,
            body_ratio: 0.7,
            ..Default::default()
        }
    }

    // Mid-day UTC: Normal session for commodities
    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_full_pipeline_emits_sized_signal() {
        let signal = engine()
            .evaluate("GC=F", &crossover_snapshot(), None, noon())
            .unwrap();
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.pattern, PatternKind::MaCrossover);
        assert!(signal.score >= 4 && signal.score <= 10);
        assert_eq!(signal.entry, 2000.0);
        assert_eq!(signal.stop_loss, 1970.0);
        assert!(signal.lot_size > 0.0);
        assert_eq!(signal.session, SessionQuality::Normal);
    }

    #[test]
    fn test_gate_rejection_is_silent() {
        let mut snap = crossover_snapshot();
        snap.adx = Some(19.0);
        assert!(engine().evaluate("GC=F", &snap, None, noon()).is_none());
    }

    #[test]
    fn test_volume_floor_applies_after_rule_match() {
        let mut snap = crossover_snapshot();
        snap.vol_ratio = Some(0.5);
        assert!(engine().evaluate("GC=F", &snap, None, noon()).is_none());
    }

    #[test]
    fn test_confirmation_trend_can_veto() {
        let snap = crossover_snapshot();
        let contra = FeatureSnapshot {
            trend: -1,
            ..Default::default()
        };
        assert!(engine()
            .evaluate("GC=F", &snap, Some(&contra), noon())
            .is_none());
    }

    #[test]
    fn test_unknown_instrument_fails_closed() {
        let snap = crossover_snapshot();
        assert!(engine().evaluate("^NSEI", &snap, None, noon()).is_none());
    }

    #[test]
    fn test_fallback_scores_stay_below_strict_floor() {
        let snap = FeatureSnapshot {
            close: 2000.0,
            ema_fast: Some(1990.0),
            ema_slow: Some(1980.0),
            rsi: Some(55.0),
            atr: Some(20.0),
            adx: Some(30.0),
            vol_ratio: Some(1.2),
            trend: 1,
            regime: Regime::Trending,
            ..Default::default()
        };
        let signal = engine().evaluate_fallback("GC=F", &snap, noon()).unwrap();
        assert_eq!(signal.pattern, PatternKind::TrendOpportunity);
        assert!(signal.score <= 3);
        assert!(signal.score < ClassifierConfig::default().min_signal_score);
    }

    #[test]
    fn test_strict_priority_first_match_wins() {
        // Satisfy rule 1 (crossover) and rule 6 (pullback) simultaneously:
        // close near the fast MA, prior bar below it, bouncing, plus a fresh
        // crossover. The reported pattern must be the crossover.
        let mut snap = crossover_snapshot();
        snap.ema_fast = Some(1995.0);
        snap.prev_low = 1990.0;
        snap.prev_close = 1994.0;
        snap.rsi = Some(50.0);

        let ctx = RuleContext {
            snap: &snap,
            confirmation_trend: 1,
        };
        assert!(rules::pullback_bounce(&ctx).is_some());

        let signal = engine().evaluate("GC=F", &snap, None, noon()).unwrap();
        assert_eq!(signal.pattern, PatternKind::MaCrossover);
    }

    #[test]
    fn test_thin_session_drags_commodity_score() {
        // 21:00 UTC is the commodity dead zone: -2 on the score
        let late = Utc.with_ymd_and_hms(2026, 3, 2, 21, 0, 0).unwrap();
        let mut snap = crossover_snapshot();
        // Keep the raw sum under the clamp so the penalty is visible
        snap.supertrend_dir = 1;
        snap.prev_supertrend_dir = 1;
        snap.macd_hist = None;
        snap.vol_ratio = Some(1.2);
        let day_signal = engine().evaluate("GC=F", &snap, None, noon()).unwrap();
        let night_signal = engine().evaluate("GC=F", &snap, None, late).unwrap();
        assert_eq!(night_signal.score, day_signal.score - 2);
    }
}
