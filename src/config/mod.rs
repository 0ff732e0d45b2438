// Central configuration: environment-backed settings plus per-component
// threshold structs with defaults.
pub mod instruments;
pub mod session;

use std::path::PathBuf;

use serde::Deserialize;

/// Account balance and risk tiers. The risk percent applied to a trade
/// depends on the signal's score tier; the third "runner" target only
/// appears from the high tier upward.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub balance: f64,
    /// Risk percent for scores at or below `low_score_max`
    pub risk_percent_low: f64,
    /// Risk percent for mid-tier scores
    pub risk_percent_standard: f64,
    /// Risk percent for scores at or above `high_score_min`
    pub risk_percent_high: f64,
    pub low_score_max: u8,
    pub high_score_min: u8,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            balance: 10_000.0,
            risk_percent_low: 0.5,
            risk_percent_standard: 1.0,
            risk_percent_high: 1.5,
            low_score_max: 5,
            high_score_min: 8,
        }
    }
}

impl AccountConfig {
    /// Risk percent for a given signal score
    pub fn risk_percent_for(&self, score: u8) -> f64 {
        if score >= self.high_score_min {
            self.risk_percent_high
        } else if score <= self.low_score_max {
            self.risk_percent_low
        } else {
            self.risk_percent_standard
        }
    }
}

/// Top-level runtime settings, loaded from the environment with the
/// `SIGNALBOT_` prefix (after `.env` via dotenvy). Everything has a default
/// so the binary runs without any environment at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub account: AccountConfig,
    /// Root for feature snapshots, candle cache and the signal log
    pub data_dir: PathBuf,
    pub scan_interval_minutes: u64,
    pub track_interval_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            account: AccountConfig::default(),
            data_dir: PathBuf::from("data"),
            scan_interval_minutes: 60,
            track_interval_minutes: 60,
        }
    }
}

impl Settings {
    pub fn load() -> crate::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("SIGNALBOT").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}
