use clap::{Parser, Subcommand};
use signalbot::config::{instruments, Settings};
use signalbot::data::{CsvPriceProvider, JsonFeatureSource};
use signalbot::notify::LogNotifier;
use signalbot::risk::SizingConfig;
use signalbot::scanner::{self, ScanConfig};
use signalbot::store::json_store::JsonFileStore;
use signalbot::store::SignalStore;
use signalbot::strategy::{ClassifierConfig, SignalEngine};
use signalbot::tracker::{self, TrackerConfig};
use signalbot::Result;
use tokio::time::{interval, Duration};

#[derive(Parser)]
#[command(name = "signalbot", about = "Multi-market trading signal system")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the instrument universe for signals once
    Scan,
    /// Check open signals against fresh prices once
    Track,
    /// Run scan and tracking on their configured intervals
    Run,
    /// Archive resolved signals and print store counts
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let settings = Settings::load()?;
    let app = App::new(&settings);

    match Cli::parse().command.unwrap_or(Command::Run) {
        Command::Scan => {
            app.scan_once().await?;
        }
        Command::Track => {
            app.track_once().await?;
        }
        Command::Run => {
            app.run_loops(&settings).await?;
        }
        Command::Stats => {
            app.print_stats().await?;
        }
    }

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| tracing_subscriber::EnvFilter::new("signalbot=info,signalbot::strategy=debug"),
        ))
        .init();
}

struct App {
    universe: Vec<String>,
    features: JsonFeatureSource,
    provider: CsvPriceProvider,
    store: JsonFileStore,
    engine: SignalEngine,
    scan_cfg: ScanConfig,
    tracker_cfg: TrackerConfig,
}

impl App {
    fn new(settings: &Settings) -> Self {
        // Indices join the scan for trend status only; they have no sizing
        // metadata, so they can never produce a signal.
        let mut universe = instruments::default_universe();
        universe.extend(instruments::index_symbols());
        Self {
            universe,
            features: JsonFeatureSource::new(settings.data_dir.join("features")),
            provider: CsvPriceProvider::new(settings.data_dir.join("cache")),
            store: JsonFileStore::new(settings.data_dir.join("signals_log")),
            engine: SignalEngine::new(
                ClassifierConfig::default(),
                settings.account.clone(),
                SizingConfig::default(),
            ),
            scan_cfg: ScanConfig::default(),
            tracker_cfg: TrackerConfig::default(),
        }
    }

    async fn scan_once(&self) -> Result<()> {
        let outcome = scanner::scan(
            &self.universe,
            &self.features,
            &self.engine,
            &self.store,
            &LogNotifier,
            &self.scan_cfg,
        )
        .await?;

        if outcome.signals.is_empty() {
            tracing::info!("no signals this scan");
        }
        Ok(())
    }

    async fn track_once(&self) -> Result<()> {
        tracker::track_open_signals(&self.store, &self.provider, &self.tracker_cfg).await?;
        Ok(())
    }

    async fn print_stats(&self) -> Result<()> {
        let archived = self.store.archive_resolved().await?;
        let stats = self.store.stats().await?;
        println!("Signal store");
        println!("  archived this run: {archived}");
        println!("  open:              {}", stats.active);
        println!("  resolved pending:  {}", stats.resolved_pending);
        println!("  archived total:    {}", stats.archived);
        println!("  total tracked:     {}", stats.total);
        Ok(())
    }

    /// Periodic mode: independent scan and tracking loops until Ctrl+C
    async fn run_loops(&self, settings: &Settings) -> Result<()> {
        tracing::info!(
            scan_minutes = settings.scan_interval_minutes,
            track_minutes = settings.track_interval_minutes,
            instruments = self.universe.len(),
            balance = settings.account.balance,
            "signalbot starting"
        );

        let mut scan_timer = interval(Duration::from_secs(settings.scan_interval_minutes * 60));
        let mut track_timer = interval(Duration::from_secs(settings.track_interval_minutes * 60));

        loop {
            tokio::select! {
                _ = scan_timer.tick() => {
                    if let Err(e) = self.scan_once().await {
                        tracing::error!(error = %e, "scan run failed");
                    }
                }
                _ = track_timer.tick() => {
                    if let Err(e) = self.track_once().await {
                        tracing::error!(error = %e, "tracking run failed");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("received Ctrl+C, shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}
