use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SignalBotError;

/// OHLCV candlestick data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Trade direction, fixed at signal creation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// +1.0 for Buy, -1.0 for Sell; signs stop/target offsets
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Buy => 1.0,
            Direction::Sell => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

/// Which pattern rule admitted the signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PatternKind {
    MaCrossover,
    StructureBreak,
    StructureReversal,
    TrailingFlip,
    BaselineCross,
    ChannelBreakout,
    PullbackBounce,
    GapRetracement,
    /// Fallback only; never emitted by the strict rule table
    TrendOpportunity,
}

impl PatternKind {
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::MaCrossover => "MA Crossover",
            PatternKind::StructureBreak => "Structure Break",
            PatternKind::StructureReversal => "Early Reversal",
            PatternKind::TrailingFlip => "Trailing Flip",
            PatternKind::BaselineCross => "Baseline Cross",
            PatternKind::ChannelBreakout => "Channel Breakout",
            PatternKind::PullbackBounce => "Pullback Bounce",
            PatternKind::GapRetracement => "Gap Retracement",
            PatternKind::TrendOpportunity => "Trend Opportunity",
        }
    }
}

/// Coarse market-state classification supplied with each snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    Trending,
    #[default]
    Ranging,
    Squeeze,
    Volatile,
}

/// Time-of-day liquidity classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionQuality {
    KillZone,
    #[default]
    Normal,
    Thin,
}

/// Instrument classification; decides which session rule and sizing model apply
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    Commodity,
    Stock,
    Index,
    Unknown,
}

/// Per-bar indicator snapshot, computed by an external pipeline and consumed
/// read-only. Core values are `Option` because the upstream pipeline may not
/// have enough history to compute them; the classifier validates presence
/// before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSnapshot {
    // Latest bar
    pub close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub prev_close: f64,
    pub prev_high: f64,
    pub prev_low: f64,
    // Core indicator values
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub di_diff: f64,
    pub macd_hist: Option<f64>,
    pub stochrsi_k: Option<f64>,
    pub stochrsi_d: Option<f64>,
    pub body_ratio: f64,
    pub vol_ratio: Option<f64>,
    // Trend state: -1 / 0 / 1
    pub trend: i8,
    pub ema_cross: i8,
    pub regime: Regime,
    // ATR-banded trailing filter
    pub supertrend_dir: i8,
    pub prev_supertrend_dir: i8,
    // Market structure breaks
    pub bos: i8,
    pub choch: i8,
    // Conversion/base-line cross and cloud position
    pub tk_cross: i8,
    pub above_cloud: bool,
    pub below_cloud: bool,
    // Stop-and-reverse filter direction
    pub psar_dir: i8,
    // Prior N-bar extreme breakout
    pub channel_breakout: i8,
    // Fast lag-reduced MA trend and volume-weighted price side
    pub hma_bull: bool,
    pub vwap_bull: bool,
    // Unfilled imbalance-zone occupancy
    pub in_bull_gap: bool,
    pub in_bear_gap: bool,
    // Divergence against recent price extremes
    pub bullish_divergence: bool,
    pub bearish_divergence: bool,
}

impl Default for FeatureSnapshot {
    fn default() -> Self {
        Self {
            close: 0.0,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            prev_close: 0.0,
            prev_high: 0.0,
            prev_low: 0.0,
            ema_fast: None,
            ema_slow: None,
            rsi: None,
            atr: None,
            adx: None,
            di_diff: 0.0,
            macd_hist: None,
            stochrsi_k: None,
            stochrsi_d: None,
            body_ratio: 0.5,
            vol_ratio: None,
            trend: 0,
            ema_cross: 0,
            regime: Regime::Ranging,
            supertrend_dir: 0,
            prev_supertrend_dir: 0,
            bos: 0,
            choch: 0,
            tk_cross: 0,
            above_cloud: false,
            below_cloud: false,
            psar_dir: 0,
            channel_breakout: 0,
            hma_bull: false,
            vwap_bull: false,
            in_bull_gap: false,
            in_bear_gap: false,
            bullish_divergence: false,
            bearish_divergence: false,
        }
    }
}

impl FeatureSnapshot {
    /// The classifier refuses to work without these three
    pub fn has_required_fields(&self) -> bool {
        self.ema_fast.is_some() && self.rsi.is_some() && self.atr.is_some()
    }

    /// Did the trailing filter change direction on this bar?
    pub fn trailing_flipped(&self) -> bool {
        self.supertrend_dir != 0
            && self.prev_supertrend_dir != 0
            && self.supertrend_dir != self.prev_supertrend_dir
    }
}

/// A fully sized trade recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub symbol: String,
    pub name: String,
    pub class: InstrumentClass,
    pub direction: Direction,
    pub pattern: PatternKind,
    /// Confidence 0-10; fallback signals never exceed 3
    pub score: u8,
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: Option<f64>,
    pub lot_size: f64,
    pub risk_amount: f64,
    pub sl_distance: f64,
    pub rr_tp1: f64,
    pub rr_tp2: f64,
    pub potential_loss: f64,
    pub potential_tp1: f64,
    pub potential_tp2: f64,
    pub was_capped: bool,
    pub atr: f64,
    pub regime: Regime,
    pub session: SessionQuality,
    pub created_at: DateTime<Utc>,
}

impl TradeSignal {
    /// Schema invariants checked before the record can exist: positive stop
    /// distance and a score within bounds.
    pub fn validate(self) -> Result<Self, SignalBotError> {
        if self.sl_distance <= 0.0 {
            return Err(SignalBotError::InvalidSignal(format!(
                "{}: stop distance must be positive (got {})",
                self.symbol, self.sl_distance
            )));
        }
        if self.score > 10 {
            return Err(SignalBotError::InvalidSignal(format!(
                "{}: score {} out of range",
                self.symbol, self.score
            )));
        }
        Ok(self)
    }
}

/// Lifecycle state of a tracked signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    Active,
    Tp1Hit,
    Tp2Hit,
    SlHit,
    Expired,
}

impl SignalStatus {
    /// Terminal states never change on subsequent polls
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SignalStatus::Tp2Hit | SignalStatus::SlHit | SignalStatus::Expired
        )
    }

    /// Still needs price tracking: active, or partial at first target
    pub fn is_open(&self) -> bool {
        matches!(self, SignalStatus::Active | SignalStatus::Tp1Hit)
    }
}

/// A TradeSignal under lifecycle tracking. Created by the scan pipeline at
/// `Active`; mutated exclusively by the lifecycle tracker on each poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedSignal {
    pub id: String,
    #[serde(flatten)]
    pub signal: TradeSignal,
    pub status: SignalStatus,
    pub tp1_hit: bool,
    pub tp1_hit_time: Option<DateTime<Utc>>,
    pub tp2_hit: bool,
    pub tp2_hit_time: Option<DateTime<Utc>>,
    pub sl_hit: bool,
    pub sl_hit_time: Option<DateTime<Utc>>,
    pub current_price: f64,
    pub highest_price: f64,
    pub lowest_price: f64,
    pub max_favorable: f64,
    pub max_adverse: f64,
    pub checks_count: u32,
    pub last_checked: DateTime<Utc>,
    pub pnl_at_close: Option<f64>,
}

impl TrackedSignal {
    /// Wrap a fresh TradeSignal for tracking
    pub fn open(signal: TradeSignal) -> Self {
        let entry = signal.entry;
        let created = signal.created_at;
        Self {
            id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            signal,
            status: SignalStatus::Active,
            tp1_hit: false,
            tp1_hit_time: None,
            tp2_hit: false,
            tp2_hit_time: None,
            sl_hit: false,
            sl_hit_time: None,
            current_price: entry,
            highest_price: entry,
            lowest_price: entry,
            max_favorable: 0.0,
            max_adverse: 0.0,
            checks_count: 0,
            last_checked: created,
            pnl_at_close: None,
        }
    }
}

/// Broad market condition for the digest/status report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendCondition {
    Overbought,
    Oversold,
    StrongBullish,
    Bullish,
    StrongBearish,
    Bearish,
    Neutral,
}

/// Per-instrument market status, produced on every scan regardless of signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketStatus {
    pub symbol: String,
    pub name: String,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: Option<f64>,
    pub rsi: f64,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub regime: Regime,
    pub trend: i8,
    pub condition: TrendCondition,
}

/// Outcome counts of one tracking run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: Option<DateTime<Utc>>,
    pub checked: usize,
    pub tp1_hits: usize,
    pub tp2_hits: usize,
    pub sl_hits: usize,
    pub expired: usize,
    pub still_active: usize,
}
