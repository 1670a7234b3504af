//! PondWatch host binary.
//!
//! Evaluates readings from a JSON file against the fuzzy rule base and
//! dispatches alerts through the log notifier.
//!
//! ```text
//!   JsonFileSource ──▶ MonitorService ──▶ LogNotifier
//!                          │    │
//!           DecisionHistory    MemoryRateLimitCache
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use pondwatch::adapters::json_file::{JsonConfigFile, JsonFileSource};
use pondwatch::adapters::log_notifier::LogNotifier;
use pondwatch::adapters::log_sink::LogEventSink;
use pondwatch::adapters::memory::{MemoryRateLimitCache, MemorySensorSource, MemoryStorage};
use pondwatch::adapters::time::{ManualClock, SystemClock};
use pondwatch::analytics::outlook;
use pondwatch::app::commands::AppCommand;
use pondwatch::app::ports::ConfigPort;
use pondwatch::app::service::{CommandOutcome, CycleReport, MonitorService};
use pondwatch::history::DecisionHistory;
use pondwatch::sensors::calibration::Calibration;

const DAY_SECS: u64 = 24 * 60 * 60;

#[derive(Parser)]
#[command(name = "pondwatch")]
#[command(about = "Fuzzy-logic water-quality monitor for aquaculture ponds", long_about = None)]
struct Cli {
    /// Readings file (JSON array, or `{ "readings": [...] }`)
    #[arg(value_name = "READINGS")]
    readings: PathBuf,

    /// Monitor configuration (JSON); defaults apply when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Treat READINGS as raw probe captures and calibrate them first
    #[arg(long)]
    raw: bool,

    /// Evaluate every reading in timestamp order instead of only the latest
    #[arg(long)]
    replay: bool,

    /// Send a daily report covering the 24 h before the latest reading
    #[arg(long)]
    report: bool,

    /// Print the moving-average outlook
    #[arg(long)]
    outlook: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => JsonConfigFile::new(path)
            .load()
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Default::default(),
    };
    let source = if cli.raw {
        JsonFileSource::open_raw(&cli.readings, &Calibration::default())
    } else {
        JsonFileSource::open(&cli.readings)
    }
    .with_context(|| format!("reading {}", cli.readings.display()))?;
    if source.readings().is_empty() {
        bail!("{} holds no readings", cli.readings.display());
    }

    let mut service = MonitorService::new(config);
    let mut history = DecisionHistory::open(MemoryStorage::new(), usize::from(service.config().history_capacity));
    let mut notifier = LogNotifier::new();
    let mut sink = LogEventSink::new();
    service.start(&mut sink);

    if cli.replay {
        // Drive the rate limiter from reading time so cool-downs match the data.
        let clock = ManualClock::new(0);
        let cache = MemoryRateLimitCache::new(&clock);
        let mut feed = MemorySensorSource::default();
        for reading in source.readings() {
            clock.set_ms(reading.timestamp.saturating_mul(1000));
            feed.push(*reading);
            match service.run_cycle(&feed, &mut history, &cache, &mut notifier, &mut sink) {
                Ok(report) => print_report(&report)?,
                Err(e) => warn!("reading at {} skipped: {}", reading.timestamp, e),
            }
        }
    } else {
        let cache = MemoryRateLimitCache::new(SystemClock::new());
        let outcome = service
            .handle_command(AppCommand::EvaluateLatest, &source, &mut history, &cache, &mut notifier, &mut sink)
            .context("evaluating latest reading")?;
        if let CommandOutcome::Cycle(report) = outcome {
            print_report(&report)?;
        }
    }

    if cli.report {
        let end = source.readings().last().map_or(0, |r| r.timestamp);
        let cmd = AppCommand::SendDailyReport {
            start: end.saturating_sub(DAY_SECS),
            end,
        };
        let cache = MemoryRateLimitCache::new(SystemClock::new());
        service
            .handle_command(cmd, &source, &mut history, &cache, &mut notifier, &mut sink)
            .context("sending daily report")?;
    }

    if cli.outlook {
        match outlook(source.readings(), usize::from(service.config().outlook_window)) {
            Some(o) => println!("{}", serde_json::to_string_pretty(&o)?),
            None => warn!("not enough readings for an outlook"),
        }
    }

    info!(
        "done: {} cycle(s), {} decision(s) kept, {} message(s) sent",
        service.cycle_count(),
        history.count(),
        notifier.sent().len()
    );
    Ok(())
}

fn print_report(report: &CycleReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&report.decision)?);
    Ok(())
}
