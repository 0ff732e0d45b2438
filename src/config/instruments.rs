//! Instrument definitions for all scanned markets: commodity futures,
//! NIFTY stocks (`.NS` suffix) and indices (`^` prefix). Stocks are treated
//! as CFD-style one-share lots; indices are status-only and never sized.

use crate::models::InstrumentClass;

/// Sizing metadata for one instrument. `per_unit_value` is the
/// account-currency P&L of a 1.0 price move per lot.
#[derive(Debug, Clone)]
pub struct InstrumentMeta {
    pub symbol: String,
    pub name: String,
    pub class: InstrumentClass,
    pub per_unit_value: f64,
    pub min_increment: f64,
    /// Hard ceiling: lots allowed per $1,000 of balance
    pub max_lot_per_1000: f64,
    pub currency: String,
}

// symbol, name, per_unit_value ($ per 1.0 move per lot)
const COMMODITIES: &[(&str, &str, f64)] = &[
    ("GC=F", "Gold Futures", 100.0),
    ("SI=F", "Silver Futures", 5000.0),
    ("CL=F", "Crude Oil Futures (WTI)", 1000.0),
    ("BZ=F", "Brent Crude Futures", 1000.0),
    ("NG=F", "Natural Gas Futures", 10000.0),
    ("HG=F", "Copper Futures", 25000.0),
    ("PL=F", "Platinum Futures", 50.0),
];

const INDICES: &[(&str, &str)] = &[("^NSEI", "NIFTY 50"), ("^NSEBANK", "BANK NIFTY")];

const NIFTY_50: &[&str] = &[
    "RELIANCE.NS",
    "TCS.NS",
    "HDFCBANK.NS",
    "INFY.NS",
    "ICICIBANK.NS",
    "HINDUNILVR.NS",
    "ITC.NS",
    "SBIN.NS",
    "BHARTIARTL.NS",
    "KOTAKBANK.NS",
    "LT.NS",
    "AXISBANK.NS",
    "BAJFINANCE.NS",
    "ASIANPAINT.NS",
    "MARUTI.NS",
    "TITAN.NS",
    "SUNPHARMA.NS",
    "ULTRACEMCO.NS",
    "NTPC.NS",
    "WIPRO.NS",
    "NESTLEIND.NS",
    "TATASTEEL.NS",
    "HCLTECH.NS",
    "POWERGRID.NS",
    "M&M.NS",
    "JSWSTEEL.NS",
    "ADANIENT.NS",
    "ADANIPORTS.NS",
    "TECHM.NS",
    "INDUSINDBK.NS",
    "BAJAJFINSV.NS",
    "ONGC.NS",
    "HDFCLIFE.NS",
    "COALINDIA.NS",
    "BRITANNIA.NS",
    "BAJAJ-AUTO.NS",
    "CIPLA.NS",
    "EICHERMOT.NS",
    "DIVISLAB.NS",
    "DRREDDY.NS",
    "HEROMOTOCO.NS",
    "APOLLOHOSP.NS",
    "TATACONSUM.NS",
    "GRASIM.NS",
    "SBILIFE.NS",
    "BPCL.NS",
    "SHRIRAMFIN.NS",
    "HINDALCO.NS",
    "LTIM.NS",
    "TRENT.NS",
];

/// Classify a symbol by its market
pub fn class_of(symbol: &str) -> InstrumentClass {
    if COMMODITIES.iter().any(|(s, _, _)| *s == symbol) {
        InstrumentClass::Commodity
    } else if INDICES.iter().any(|(s, _)| *s == symbol) {
        InstrumentClass::Index
    } else if symbol.ends_with(".NS") {
        InstrumentClass::Stock
    } else {
        InstrumentClass::Unknown
    }
}

/// Human-readable name for a symbol
pub fn display_name(symbol: &str) -> String {
    if let Some((_, name, _)) = COMMODITIES.iter().find(|(s, _, _)| *s == symbol) {
        return (*name).to_string();
    }
    if let Some((_, name)) = INDICES.iter().find(|(s, _)| *s == symbol) {
        return (*name).to_string();
    }
    symbol.trim_end_matches(".NS").to_string()
}

/// Sizing metadata lookup. Returns `None` for indices and unknown symbols:
/// position sizing fails closed without metadata.
pub fn lookup(symbol: &str) -> Option<InstrumentMeta> {
    if let Some((s, name, per_unit)) = COMMODITIES.iter().find(|(s, _, _)| *s == symbol) {
        return Some(InstrumentMeta {
            symbol: (*s).to_string(),
            name: (*name).to_string(),
            class: InstrumentClass::Commodity,
            per_unit_value: *per_unit,
            min_increment: 0.01,
            max_lot_per_1000: 0.05,
            currency: "USD".to_string(),
        });
    }
    if symbol.ends_with(".NS") {
        // CFD-style stock lots: one share per unit, whole-share increments
        return Some(InstrumentMeta {
            symbol: symbol.to_string(),
            name: display_name(symbol),
            class: InstrumentClass::Stock,
            per_unit_value: 1.0,
            min_increment: 1.0,
            max_lot_per_1000: 50.0,
            currency: "INR".to_string(),
        });
    }
    None
}

/// The tradeable scan universe: commodities first, then NIFTY 50 stocks.
/// Indices are appended separately for trend status only.
pub fn default_universe() -> Vec<String> {
    COMMODITIES
        .iter()
        .map(|(s, _, _)| (*s).to_string())
        .chain(NIFTY_50.iter().map(|s| (*s).to_string()))
        .collect()
}

/// Index symbols scanned for trend status only
pub fn index_symbols() -> Vec<String> {
    INDICES.iter().map(|(s, _)| (*s).to_string()).collect()
}
