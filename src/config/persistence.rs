//! File persistence and serialization configuration

/// Directory where analysis results are written by default
pub const OUTPUT_DIR: &str = "out";

/// Directory holding `{PAIR}_{interval}.csv` candle files
pub const CANDLE_PATH: &str = "candle_data";

/// Base filename for snapshot files (without extension)
pub const SNAPSHOT_FILENAME_WITHOUT_EXT: &str = "candles";

/// Current version of the snapshot serialization format
pub const SNAPSHOT_VERSION: f64 = 1.0;

/// Bincode candle snapshot settings
pub struct SnapshotSettings {
    pub directory: &'static str,
    pub version: f64,
}

pub struct PersistenceConfig {
    pub output_dir: &'static str,
    pub candle_dir: &'static str,
    pub snapshot: SnapshotSettings,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    output_dir: OUTPUT_DIR,
    candle_dir: CANDLE_PATH,
    snapshot: SnapshotSettings {
        directory: CANDLE_PATH,
        version: SNAPSHOT_VERSION,
    },
};

/// Generate interval-specific snapshot filename
/// Example: "candles_5min_v1.bin"
pub fn snapshot_filename(interval_label: &str) -> String {
    format!(
        "{}_{}_v{}.bin",
        SNAPSHOT_FILENAME_WITHOUT_EXT, interval_label, SNAPSHOT_VERSION
    )
}

/// Candle CSV filename for one pair/interval, e.g. "EURUSD_5min.csv"
pub fn candle_csv_filename(pair_code: &str, interval_label: &str) -> String {
    format!("{}_{}.csv", pair_code, interval_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames() {
        assert_eq!(snapshot_filename("5min"), "candles_5min_v1.bin");
        assert_eq!(candle_csv_filename("EURUSD", "5min"), "EURUSD_5min.csv");
    }
}
