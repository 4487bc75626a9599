use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use session_sniper::config::{ANALYSIS, CANDLE_PATH, SNAPSHOT_VERSION};
use session_sniper::data::csv_source::read_candle_csv;
use session_sniper::data::snapshot::PairCandles;
use session_sniper::data::{CandleInterval, SnapshotFile};
use session_sniper::domain::Pair;

/// Bundle a directory of candle CSV files into one bincode snapshot.
#[derive(Parser, Debug)]
struct Args {
    /// Directory of {PAIR}_{interval}.csv files
    #[arg(long, default_value = CANDLE_PATH)]
    candle_dir: PathBuf,

    /// Snapshot destination (defaults to the standard snapshot path)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let interval = CandleInterval::minutes(ANALYSIS.fetch.candle_interval_minutes);
    let suffix = format!("_{}.csv", interval.label());

    let mut pairs = Vec::new();
    let entries = std::fs::read_dir(&args.candle_dir)
        .with_context(|| format!("Failed to read candle directory {:?}", args.candle_dir))?;
    for entry in entries {
        let path = entry?.path();
        let Some(code) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(&suffix))
        else {
            continue;
        };
        let pair = match Pair::parse(code) {
            Ok(pair) => pair,
            Err(e) => {
                println!("Skipping {:?}: {}", path, e);
                continue;
            }
        };
        let series = read_candle_csv(&path)?;
        println!("Loaded {} candles for {}", series.len(), pair);
        pairs.push(PairCandles {
            pair: pair.code().to_string(),
            series,
        });
    }

    if pairs.is_empty() {
        bail!("No *{} files found in {:?}", suffix, args.candle_dir);
    }
    pairs.sort_by(|a, b| a.pair.cmp(&b.pair));

    let snapshot = SnapshotFile::new(interval, pairs, SNAPSHOT_VERSION);
    let output_path = args
        .out
        .unwrap_or_else(|| SnapshotFile::default_path(interval));
    snapshot.save_to_path(&output_path)?;

    println!(
        "✅ Snapshot written to {:?} with {} pairs.",
        output_path,
        snapshot.pairs.len()
    );
    Ok(())
}
