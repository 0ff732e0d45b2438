//! End-to-end pipeline: snapshot files -> scan -> store -> price window ->
//! lifecycle tracking -> archive. Collaborators are the file-backed adapters
//! over a temp directory; no network anywhere.

use chrono::{Duration, TimeZone, Utc};
use signalbot::config::AccountConfig;
use signalbot::data::{CsvPriceProvider, JsonFeatureSource};
use signalbot::models::{
    Direction, FeatureSnapshot, PatternKind, Regime, SignalStatus,
};
use signalbot::notify::LogNotifier;
use signalbot::risk::SizingConfig;
use signalbot::scanner::{self, ScanConfig};
use signalbot::store::json_store::JsonFileStore;
use signalbot::store::SignalStore;
use signalbot::strategy::{ClassifierConfig, SignalEngine};
use signalbot::tracker::{self, TrackerConfig};
use std::path::PathBuf;

fn temp_root(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("signalbot-e2e-{label}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("features")).unwrap();
    std::fs::create_dir_all(dir.join("cache")).unwrap();
    dir
}

fn engine() -> SignalEngine {
    SignalEngine::new(
        ClassifierConfig::default(),
        AccountConfig::default(),
        SizingConfig::default(),
    )
}

/// A gold crossover setup that clears the gates and the score floor
fn gold_snapshot() -> FeatureSnapshot {
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

#[tokio::test]
async fn test_scan_then_track_to_resolution() {
    let _ = tracing_subscriber::fmt::try_init();

    let root = temp_root("resolution");
    let noon = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();

    // 1. Upstream pipeline dropped a snapshot for gold
    std::fs::write(
        root.join("features/GC_F.json"),
        serde_json::to_string(&gold_snapshot()).unwrap(),
    )
    .unwrap();

    let features = JsonFeatureSource::new(root.join("features"));
    let provider = CsvPriceProvider::new(root.join("cache"));
    let store = JsonFileStore::new(root.join("signals_log"));

    // 2. Scan: classifies, scores, sizes, persists
    let universe = vec!["GC=F".to_string()];
    let outcome = scanner::scan_at(
        &universe,
        &features,
        &engine(),
        &store,
        &LogNotifier,
        &ScanConfig {
            min_signals_per_scan: 0,
        },
        noon,
    )
    .await
    .unwrap();

    assert_eq!(outcome.signals.len(), 1);
    let signal = &outcome.signals[0];
    assert_eq!(signal.direction, Direction::Buy);
    assert_eq!(signal.pattern, PatternKind::MaCrossover);
    assert_eq!(signal.entry, 2000.0);
    assert_eq!(signal.stop_loss, 1970.0); // entry - 1.5 * ATR
    assert_eq!(signal.tp1, 2040.0);
    assert_eq!(signal.tp2, 2060.0);
    assert!(signal.score >= 4 && signal.score <= 10);

    let tracked = store.load_all().await.unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].status, SignalStatus::Active);

    // 3. Price action since the signal: runs straight through both targets
    // without touching the stop
    let t1 = noon + Duration::hours(1);
    let t2 = noon + Duration::hours(2);
    std::fs::write(
        root.join("cache/GC_F.csv"),
        format!(
            "timestamp,open,high,low,close,volume\n\
             {},2000.0,2045.0,1995.0,2042.0,1500\n\
             {},2042.0,2065.0,2040.0,2061.0,1800\n",
            t1.to_rfc3339(),
            t2.to_rfc3339()
        ),
    )
    .unwrap();

    // 4. Track: worst-case-first still lands on TP2 here
    let summary = tracker::track_open_signals(&store, &provider, &TrackerConfig::default())
        .await
        .unwrap();
    assert_eq!(summary.checked, 1);
    assert_eq!(summary.tp2_hits, 1);
    assert_eq!(summary.still_active, 0);

    let resolved = store.load_all().await.unwrap();
    assert_eq!(resolved[0].status, SignalStatus::Tp2Hit);
    assert!(resolved[0].tp1_hit, "first target achieved en route");
    assert_eq!(resolved[0].pnl_at_close, Some(60.0));
    assert_eq!(resolved[0].highest_price, 2065.0);

    // 5. Terminal records archive away; the active file is clean again
    let archived = store.archive_resolved().await.unwrap();
    assert_eq!(archived, 1);
    assert!(store.load_all().await.unwrap().is_empty());
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.archived, 1);
}

#[tokio::test]
async fn test_stop_takes_precedence_end_to_end() {
    let root = temp_root("precedence");
    let noon = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();

    std::fs::write(
        root.join("features/GC_F.json"),
        serde_json::to_string(&gold_snapshot()).unwrap(),
    )
    .unwrap();

    let features = JsonFeatureSource::new(root.join("features"));
    let provider = CsvPriceProvider::new(root.join("cache"));
    let store = JsonFileStore::new(root.join("signals_log"));

    let universe = vec!["GC=F".to_string()];
    scanner::scan_at(
        &universe,
        &features,
        &engine(),
        &store,
        &LogNotifier,
        &ScanConfig {
            min_signals_per_scan: 0,
        },
        noon,
    )
    .await
    .unwrap();

    // One wide bar crosses the stop (1970) AND the first target (2040):
    // the stop must win.
    let t1 = noon + Duration::hours(1);
    std::fs::write(
        root.join("cache/GC_F.csv"),
        format!(
            "timestamp,open,high,low,close,volume\n\
             {},2000.0,2045.0,1965.0,2010.0,2500\n",
            t1.to_rfc3339()
        ),
    )
    .unwrap();

    let summary = tracker::track_open_signals(&store, &provider, &TrackerConfig::default())
        .await
        .unwrap();
    assert_eq!(summary.sl_hits, 1);
    assert_eq!(summary.tp1_hits, 0);

    let resolved = store.load_all().await.unwrap();
    assert_eq!(resolved[0].status, SignalStatus::SlHit);
    assert_eq!(resolved[0].pnl_at_close, Some(-30.0));
    assert!(!resolved[0].tp1_hit);
}

#[tokio::test]
async fn test_provider_outage_leaves_signal_untouched() {
    let root = temp_root("outage");
    let noon = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();

    std::fs::write(
        root.join("features/GC_F.json"),
        serde_json::to_string(&gold_snapshot()).unwrap(),
    )
    .unwrap();

    let features = JsonFeatureSource::new(root.join("features"));
    let provider = CsvPriceProvider::new(root.join("cache"));
    let store = JsonFileStore::new(root.join("signals_log"));

    let universe = vec!["GC=F".to_string()];
    scanner::scan_at(
        &universe,
        &features,
        &engine(),
        &store,
        &LogNotifier,
        &ScanConfig {
            min_signals_per_scan: 0,
        },
        noon,
    )
    .await
    .unwrap();

    // No candle file exists: the fetch fails, the signal is skipped, the
    // batch still succeeds.
    let summary = tracker::track_open_signals(&store, &provider, &TrackerConfig::default())
        .await
        .unwrap();
    assert_eq!(summary.checked, 0);

    let untouched = store.load_all().await.unwrap();
    assert_eq!(untouched[0].status, SignalStatus::Active);
    assert_eq!(untouched[0].checks_count, 0);
}
