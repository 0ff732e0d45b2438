//! Pattern rules, evaluated in strict priority order. The first rule whose
//! admission conditions hold wins and short-circuits the rest; rules are
//! never combined. Each rule is an independent predicate so it can be tested
//! on its own.

use crate::models::{Direction, FeatureSnapshot, PatternKind, Regime};
use crate::strategy::ClassifierConfig;

/// Everything a pattern rule may look at for one bar
pub struct RuleContext<'a> {
    pub snap: &'a FeatureSnapshot,
    /// Trend of the confirmation timeframe; falls back to the primary trend
    pub confirmation_trend: i8,
}

impl RuleContext<'_> {
    fn rsi(&self) -> f64 {
        // Presence guaranteed by the gates
        self.snap.rsi.unwrap_or(f64::NAN)
    }

    /// Momentum must not contradict the direction; a missing histogram
    /// abstains rather than blocks.
    fn momentum_allows(&self, direction: Direction) -> bool {
        match self.snap.macd_hist {
            None => true,
            Some(hist) => match direction {
                Direction::Buy => hist > 0.0,
                Direction::Sell => hist < 0.0,
            },
        }
    }
}

pub struct PatternRule {
    pub name: &'static str,
    pub check: fn(&RuleContext) -> Option<(Direction, PatternKind)>,
}

/// Priority order is load-bearing: crossover beats structure beats flip
/// beats baseline beats breakout beats pullback beats gap.
pub const RULES: &[PatternRule] = &[
    PatternRule {
        name: "ma_crossover",
        check: ma_crossover,
    },
    PatternRule {
        name: "structure_break",
        check: structure_break,
    },
    PatternRule {
        name: "trailing_flip",
        check: trailing_flip,
    },
    PatternRule {
        name: "baseline_cross",
        check: baseline_cross,
    },
    PatternRule {
        name: "channel_breakout",
        check: channel_breakout,
    },
    PatternRule {
        name: "pullback_bounce",
        check: pullback_bounce,
    },
    PatternRule {
        name: "gap_retracement",
        check: gap_retracement,
    },
];

/// Hard gates applied before any pattern rule. Failing any gate means
/// "no signal" for every rule, not an error.
pub fn passes_gates(snap: &FeatureSnapshot, cfg: &ClassifierConfig) -> bool {
    if !snap.has_required_fields() {
        return false;
    }
    // Choppy market: trend strength below the floor. Exactly at the floor
    // passes; a missing ADX abstains.
    if let Some(adx) = snap.adx {
        if adx < cfg.adx_min {
            return false;
        }
    }
    // Indecisive bar (doji / spinning top)
    if snap.body_ratio < cfg.body_min {
        return false;
    }
    // News-driven volatility: skip entirely
    if snap.regime == Regime::Volatile {
        return false;
    }
    true
}

/// Rule 1: fast/slow MA crossover with momentum confirmation
pub fn ma_crossover(ctx: &RuleContext) -> Option<(Direction, PatternKind)> {
    let rsi = ctx.rsi();
    if ctx.snap.ema_cross == 1
        && (45.0..=70.0).contains(&rsi)
        && ctx.confirmation_trend >= 0
        && ctx.momentum_allows(Direction::Buy)
    {
        return Some((Direction::Buy, PatternKind::MaCrossover));
    }
    if ctx.snap.ema_cross == -1
        && (30.0..=55.0).contains(&rsi)
        && ctx.confirmation_trend <= 0
        && ctx.momentum_allows(Direction::Sell)
    {
        return Some((Direction::Sell, PatternKind::MaCrossover));
    }
    None
}

/// Rule 2: structure break. Continuation breaks trade with the trend; the
/// counter-trend variant is an early reversal warning with its own bands.
pub fn structure_break(ctx: &RuleContext) -> Option<(Direction, PatternKind)> {
    let rsi = ctx.rsi();
    if ctx.snap.bos == 1 && ctx.confirmation_trend >= 0 && (35.0..=70.0).contains(&rsi) {
        return Some((Direction::Buy, PatternKind::StructureBreak));
    }
    if ctx.snap.bos == -1 && ctx.confirmation_trend <= 0 && (30.0..=65.0).contains(&rsi) {
        return Some((Direction::Sell, PatternKind::StructureBreak));
    }
    if ctx.snap.choch == 1 && (30.0..=65.0).contains(&rsi) {
        return Some((Direction::Buy, PatternKind::StructureReversal));
    }
    if ctx.snap.choch == -1 && (35.0..=70.0).contains(&rsi) {
        return Some((Direction::Sell, PatternKind::StructureReversal));
    }
    None
}

/// Rule 3: ATR-banded trailing filter flipped direction on this bar
pub fn trailing_flip(ctx: &RuleContext) -> Option<(Direction, PatternKind)> {
    if !ctx.snap.trailing_flipped() {
        return None;
    }
    let rsi = ctx.rsi();
    if ctx.snap.supertrend_dir == 1 && ctx.confirmation_trend >= 0 && (35.0..=72.0).contains(&rsi)
    {
        return Some((Direction::Buy, PatternKind::TrailingFlip));
    }
    if ctx.snap.supertrend_dir == -1 && ctx.confirmation_trend <= 0 && (28.0..=65.0).contains(&rsi)
    {
        return Some((Direction::Sell, PatternKind::TrailingFlip));
    }
    None
}

/// Rule 4: conversion/base-line cross while price sits on the matching side
/// of the cloud
pub fn baseline_cross(ctx: &RuleContext) -> Option<(Direction, PatternKind)> {
    let rsi = ctx.rsi();
    if ctx.snap.tk_cross == 1
        && ctx.snap.above_cloud
        && ctx.confirmation_trend >= 0
        && (35.0..=70.0).contains(&rsi)
    {
        return Some((Direction::Buy, PatternKind::BaselineCross));
    }
    if ctx.snap.tk_cross == -1
        && ctx.snap.below_cloud
        && ctx.confirmation_trend <= 0
        && (30.0..=65.0).contains(&rsi)
    {
        return Some((Direction::Sell, PatternKind::BaselineCross));
    }
    None
}

/// Rule 5: close beyond the prior N-bar extreme, requires a volume surge
pub fn channel_breakout(ctx: &RuleContext) -> Option<(Direction, PatternKind)> {
    const VOLUME_SURGE_MIN: f64 = 1.2;
    let surge = matches!(ctx.snap.vol_ratio, Some(v) if v >= VOLUME_SURGE_MIN);
    if !surge {
        return None;
    }
    let rsi = ctx.rsi();
    if ctx.snap.channel_breakout == 1 && ctx.confirmation_trend >= 0 && (40.0..=75.0).contains(&rsi)
    {
        return Some((Direction::Buy, PatternKind::ChannelBreakout));
    }
    if ctx.snap.channel_breakout == -1
        && ctx.confirmation_trend <= 0
        && (25.0..=60.0).contains(&rsi)
    {
        return Some((Direction::Sell, PatternKind::ChannelBreakout));
    }
    None
}

/// Rule 6: pullback to the fast MA, bouncing back in trend direction.
/// Price must sit within half a volatility unit of the fast MA, have been
/// on the far side one bar prior, and be moving back with the trend.
pub fn pullback_bounce(ctx: &RuleContext) -> Option<(Direction, PatternKind)> {
    let snap = ctx.snap;
    let (ema_fast, atr) = (snap.ema_fast?, snap.atr?);
    if (snap.close - ema_fast).abs() > 0.5 * atr {
        return None;
    }
    let rsi = ctx.rsi();
    if snap.trend == 1 && ctx.confirmation_trend >= 0 {
        let was_lower = snap.prev_low <= ema_fast * 1.003;
        let bouncing_up = snap.close > snap.prev_close;
        if was_lower
            && bouncing_up
            && (40.0..=65.0).contains(&rsi)
            && ctx.momentum_allows(Direction::Buy)
        {
            return Some((Direction::Buy, PatternKind::PullbackBounce));
        }
    } else if snap.trend == -1 && ctx.confirmation_trend <= 0 {
        let was_higher = snap.prev_high >= ema_fast * 0.997;
        let bouncing_down = snap.close < snap.prev_close;
        if was_higher
            && bouncing_down
            && (35.0..=60.0).contains(&rsi)
            && ctx.momentum_allows(Direction::Sell)
        {
            return Some((Direction::Sell, PatternKind::PullbackBounce));
        }
    }
    None
}

/// Rule 7: price currently occupies an unfilled imbalance zone consistent
/// with trend direction
pub fn gap_retracement(ctx: &RuleContext) -> Option<(Direction, PatternKind)> {
    let rsi = ctx.rsi();
    if ctx.snap.in_bull_gap
        && ctx.snap.trend == 1
        && ctx.confirmation_trend >= 0
        && (30.0..=65.0).contains(&rsi)
        && ctx.momentum_allows(Direction::Buy)
    {
        return Some((Direction::Buy, PatternKind::GapRetracement));
    }
    if ctx.snap.in_bear_gap
        && ctx.snap.trend == -1
        && ctx.confirmation_trend <= 0
        && (35.0..=70.0).contains(&rsi)
        && ctx.momentum_allows(Direction::Sell)
    {
        return Some((Direction::Sell, PatternKind::GapRetracement));
    }
    None
}
