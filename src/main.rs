use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use itertools::Itertools;
use tokio::runtime::Runtime;

use session_sniper::config::{ANALYSIS, SNAPSHOT_VERSION};
use session_sniper::data::{
    CachedCandleSource, CandleInterval, CandleSource, CsvCandleSource, EventCalendar,
    FallbackCandleSource, JsonFileCalendar, NoCalendar, SnapshotCandleSource, SnapshotFile,
};
use session_sniper::output::{format_output, save_output};
use session_sniper::utils::{Clock, SystemClock};
use session_sniper::{Cli, SessionAnalysis, SessionAnalyzer};

/// Snapshot first (when one opens), then the CSV directory.
fn build_candle_source(args: &Cli) -> CachedCandleSource<FallbackCandleSource> {
    let mut sources: Vec<Arc<dyn CandleSource>> = Vec::new();

    let interval = CandleInterval::minutes(ANALYSIS.fetch.candle_interval_minutes);
    let snapshot_path = args
        .snapshot
        .clone()
        .unwrap_or_else(|| SnapshotFile::default_path(interval));
    match SnapshotCandleSource::open(&snapshot_path, SNAPSHOT_VERSION) {
        Ok(snapshot) => {
            log::info!("Using candle snapshot {:?}", snapshot_path);
            sources.push(Arc::new(snapshot));
        }
        Err(e) => {
            // Only worth a warning when the user pointed at it
            if args.snapshot.is_some() {
                log::warn!("Ignoring snapshot: {:#}", e);
            }
        }
    }
    sources.push(Arc::new(CsvCandleSource::new(args.candle_dir.clone())));

    CachedCandleSource::new(FallbackCandleSource::new(sources))
}

fn build_calendar(args: &Cli) -> Arc<dyn EventCalendar> {
    match &args.events {
        Some(path) => Arc::new(JsonFileCalendar::new(path)),
        None => Arc::new(NoCalendar),
    }
}

fn main() -> ExitCode {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    if args.out.is_some() && args.pairs.len() > 1 {
        log::error!("--out takes a single pair; use --save for several");
        return ExitCode::FAILURE;
    }

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // C. Wire the analyzer
    let analyzer = SessionAnalyzer::new(Arc::new(build_candle_source(&args)), build_calendar(&args));
    log::info!("Analyzing {}", args.pairs.iter().join(", "));

    // D. Run every pair concurrently
    let results: Vec<_> = rt.block_on(futures::future::join_all(args.pairs.iter().map(
        |pair| {
            let analyzer = &analyzer;
            let args = &args;
            async move {
                let request = args.request_for(pair)?;
                analyzer.analyze_detailed(&request).await
            }
        },
    )));

    // E. Report
    let now = SystemClock.now();
    let mut failed = false;
    for (pair, result) in args.pairs.iter().zip(results) {
        match result {
            Ok(analysis) => {
                if let Err(e) = report(&args, &analysis, now) {
                    log::error!("{}: {:#}", pair, e);
                    failed = true;
                }
            }
            Err(e) => {
                log::error!("{}: {}", pair, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(
    args: &Cli,
    analysis: &SessionAnalysis,
    now: chrono::DateTime<chrono::Utc>,
) -> anyhow::Result<()> {
    let value = if args.detailed {
        serde_json::to_value(analysis)?
    } else {
        serde_json::to_value(&analysis.output)?
    };
    if args.should_save() {
        let path = save_output(&value, &analysis.output, args.out.as_deref(), now)?;
        log::info!("Saved {} analysis to {}", analysis.output.pair, path.display());
    } else {
        println!("{}", format_output(&value)?);
    }
    Ok(())
}
