//! Rendering and persisting analysis results

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::PERSISTENCE;
use crate::models::AnalysisOutput;
use crate::utils::TimeUtils;

/// Pretty-printed JSON, two-space indent.
pub fn format_output<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize analysis output")
}

/// Default location for a result, e.g. "out/eur_usd-20250210T073000Z.json"
pub fn default_output_path(output: &AnalysisOutput, now: DateTime<Utc>) -> PathBuf {
    let stem = output.pair.to_lowercase().replace(['/', ' '], "_");
    PathBuf::from(PERSISTENCE.output_dir).join(format!(
        "{}-{}.json",
        stem,
        now.format(TimeUtils::COMPACT_TIMESTAMP_FORMAT)
    ))
}

/// Write `value` as JSON to `path` (or the default location) and return where it went.
pub fn save_output<T: Serialize>(
    value: &T,
    output: &AnalysisOutput,
    path: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_output_path(output, now),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    let text = format_output(value)?;
    std::fs::write(&path, text).context(format!("Failed to write output: {}", path.display()))?;

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!("Wrote analysis for {} to {:?}", output.pair, path);
    }

    Ok(path)
}
