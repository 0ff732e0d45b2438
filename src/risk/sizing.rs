//! Position sizing calculator. Sizing never guesses: a zero stop distance or
//! missing instrument metadata yields no trade at all. Lot sizes are floored
//! to the instrument's minimum increment and clamped against a hard ceiling
//! of `max_lot_per_1000` lots per $1,000 of balance; the clamp is always
//! reported through `was_capped`.

use serde::Deserialize;

use crate::config::instruments::InstrumentMeta;
use crate::config::AccountConfig;
use crate::models::Direction;

/// Volatility-unit multipliers for stop and targets
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub sl_atr: f64,
    pub tp1_atr: f64,
    pub tp2_atr: f64,
    /// Runner target, only granted from `AccountConfig::high_score_min` up
    pub tp3_atr: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            sl_atr: 1.5,
            tp1_atr: 2.0, // R:R 1:1.33
            tp2_atr: 3.0, // R:R 1:2.00
            tp3_atr: 4.5,
        }
    }
}

/// Complete sized trade: levels, lot, risk and reward metrics
#[derive(Debug, Clone)]
pub struct SizedTrade {
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: Option<f64>,
    pub lot_size: f64,
    pub risk_amount: f64,
    pub actual_risk: f64,
    pub sl_distance: f64,
    pub rr_tp1: f64,
    pub rr_tp2: f64,
    pub potential_loss: f64,
    pub potential_tp1: f64,
    pub potential_tp2: f64,
    pub was_capped: bool,
}

struct LotSizing {
    lot_size: f64,
    risk_amount: f64,
    actual_risk: f64,
    was_capped: bool,
}

/// `lot = risk_amount / (sl_distance × per_unit_value)`, floored to the
/// minimum increment, clamped to `(balance/1000) × max_lot_per_1000`.
fn lot_size(
    meta: &InstrumentMeta,
    sl_distance: f64,
    balance: f64,
    risk_percent: f64,
) -> Option<LotSizing> {
    if sl_distance <= 0.0 {
        return None;
    }

    let risk_amount = balance * (risk_percent / 100.0);
    let raw_lot = risk_amount / (sl_distance * meta.per_unit_value);

    let inc = meta.min_increment;
    // Tiny epsilon so exact multiples of the increment survive the floor
    let floor_to_inc = |lot: f64| (((lot / inc) + 1e-9).floor() * inc).max(inc);

    // The cap is judged against the uncapped size; the emitted lot is always
    // an increment multiple, the cap included.
    let max_lot = (balance / 1000.0) * meta.max_lot_per_1000;
    let was_capped = raw_lot > max_lot;
    let lot = if was_capped {
        floor_to_inc(max_lot)
    } else {
        floor_to_inc(raw_lot)
    };

    let actual_risk = sl_distance * meta.per_unit_value * lot;

    Some(LotSizing {
        lot_size: lot,
        risk_amount,
        actual_risk,
        was_capped,
    })
}

/// Complete trade levels for a classified signal: stop, targets, lot size
/// and reward:risk. Returns `None` when sizing is impossible (zero
/// volatility unit or no metadata for the symbol).
pub fn trade_levels(
    meta: &InstrumentMeta,
    entry: f64,
    atr: f64,
    direction: Direction,
    score: u8,
    account: &AccountConfig,
    cfg: &SizingConfig,
) -> Option<SizedTrade> {
    let sign = direction.sign();
    let stop_loss = entry - sign * cfg.sl_atr * atr;
    let tp1 = entry + sign * cfg.tp1_atr * atr;
    let tp2 = entry + sign * cfg.tp2_atr * atr;
    let tp3 = if score >= account.high_score_min {
        Some(entry + sign * cfg.tp3_atr * atr)
    } else {
        None
    };

    let sl_distance = (entry - stop_loss).abs();
    let risk_percent = account.risk_percent_for(score);
    let sizing = lot_size(meta, sl_distance, account.balance, risk_percent)?;

    let tp1_distance = (tp1 - entry).abs();
    let tp2_distance = (tp2 - entry).abs();

    Some(SizedTrade {
        entry,
        stop_loss,
        tp1,
        tp2,
        tp3,
        lot_size: sizing.lot_size,
        risk_amount: sizing.risk_amount,
        actual_risk: sizing.actual_risk,
        sl_distance,
        rr_tp1: tp1_distance / sl_distance,
        rr_tp2: tp2_distance / sl_distance,
        potential_loss: sizing.actual_risk,
        potential_tp1: tp1_distance * meta.per_unit_value * sizing.lot_size,
        potential_tp2: tp2_distance * meta.per_unit_value * sizing.lot_size,
        was_capped: sizing.was_capped,
    })
}
