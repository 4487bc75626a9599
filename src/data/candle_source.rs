use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::models::CandleSeries;
use crate::models::timeseries::between;

/// Candle width, in whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandleInterval {
    minutes: i64,
}

impl CandleInterval {
    pub const fn minutes(minutes: i64) -> Self {
        Self { minutes }
    }

    pub fn as_minutes(&self) -> i64 {
        self.minutes
    }

    /// Vendor-style label used in filenames, e.g. "5min"
    pub fn label(&self) -> String {
        format!("{}min", self.minutes)
    }

    /// Candles needed to cover `days` full days
    pub fn candles_per_days(&self, days: i64) -> usize {
        if self.minutes <= 0 {
            return 0;
        }
        (days.max(0) * 24 * 60 / self.minutes) as usize
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchSpan {
    /// The most recent `n` candles available
    Latest(usize),
    /// Candles with `start <= timestamp < end`
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl FetchSpan {
    /// Restrict an ordered candle series to this span.
    pub fn apply(&self, series: &CandleSeries) -> Vec<Candle> {
        match self {
            FetchSpan::Latest(count) => series.tail(*count).to_vec(),
            FetchSpan::Range { start, end } => between(series, *start, *end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandleRequest {
    /// Normalized pair code, e.g. "EURUSD"
    pub pair: String,
    pub interval: CandleInterval,
    pub span: FetchSpan,
}

impl CandleRequest {
    pub fn latest(pair: &str, interval: CandleInterval, count: usize) -> Self {
        Self {
            pair: pair.to_string(),
            interval,
            span: FetchSpan::Latest(count),
        }
    }

    pub fn range(
        pair: &str,
        interval: CandleInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            pair: pair.to_string(),
            interval,
            span: FetchSpan::Range { start, end },
        }
    }
}

impl fmt::Display for CandleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            FetchSpan::Latest(count) => {
                write!(f, "{} {} (latest {})", self.pair, self.interval, count)
            }
            FetchSpan::Range { start, end } => write!(
                f,
                "{} {} ({} .. {})",
                self.pair,
                self.interval,
                start.to_rfc3339(),
                end.to_rfc3339()
            ),
        }
    }
}

/// Anything that can supply OHLCV candles. Results are ascending by timestamp.
/// Retry policy, if any, belongs to the implementation.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch(&self, request: &CandleRequest) -> Result<Vec<Candle>>;

    /// A unique identifier for this implementation (so we can log which one served data).
    fn signature(&self) -> &'static str;
}

#[async_trait]
impl<S: CandleSource + ?Sized> CandleSource for Arc<S> {
    async fn fetch(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        (**self).fetch(request).await
    }

    fn signature(&self) -> &'static str {
        (**self).signature()
    }
}

/// Candles held in memory, keyed by pair code and interval.
#[derive(Debug, Default, Clone)]
pub struct MemoryCandleSource {
    series: HashMap<(String, CandleInterval), CandleSeries>,
}

impl MemoryCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pair: &str, interval: CandleInterval, candles: Vec<Candle>) {
        self.series
            .insert((pair.to_string(), interval), CandleSeries::new(candles));
    }

    pub fn with_series(mut self, pair: &str, interval: CandleInterval, candles: Vec<Candle>) -> Self {
        self.insert(pair, interval, candles);
        self
    }
}

#[async_trait]
impl CandleSource for MemoryCandleSource {
    async fn fetch(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        let series = self
            .series
            .get(&(request.pair.clone(), request.interval))
            .ok_or_else(|| anyhow!("No candles held for {} {}", request.pair, request.interval))?;
        Ok(request.span.apply(series))
    }

    fn signature(&self) -> &'static str {
        "Memory"
    }
}

/// Ordered chain of sources: the first non-empty successful fetch wins.
pub struct FallbackCandleSource {
    sources: Vec<Arc<dyn CandleSource>>,
}

impl FallbackCandleSource {
    pub fn new(sources: Vec<Arc<dyn CandleSource>>) -> Self {
        Self { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl CandleSource for FallbackCandleSource {
    async fn fetch(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        if self.sources.is_empty() {
            bail!("No candle sources configured");
        }
        let mut served_empty = false;
        for source in &self.sources {
            match source.fetch(request).await {
                Ok(candles) if !candles.is_empty() => {
                    log::debug!("{} served {} candles for {}", source.signature(), candles.len(), request);
                    return Ok(candles);
                }
                Ok(_) => {
                    log::info!("{} has no candles for {}", source.signature(), request);
                    served_empty = true;
                }
                Err(e) => {
                    log::info!("Error with candle source {}: {:#}", source.signature(), e);
                    // Continue to the next source
                }
            }
        }
        if served_empty {
            Ok(Vec::new())
        } else {
            Err(anyhow!("All candle sources failed for {}", request))
        }
    }

    fn signature(&self) -> &'static str {
        "Fallback chain"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const FIVE_MIN: CandleInterval = CandleInterval::minutes(5);

    pub(crate) fn sample_candles(count: i64) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let p = 1.1000 + i as f64 * 0.0001;
                Candle::new(start + TimeDelta::minutes(5 * i), p, p + 0.0005, p - 0.0005, p, 10.0)
            })
            .collect()
    }

    /// Counts calls and always fails.
    pub(crate) struct FailingSource {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl CandleSource for FailingSource {
        async fn fetch(&self, _request: &CandleRequest) -> Result<Vec<Candle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            bail!("vendor unavailable")
        }

        fn signature(&self) -> &'static str {
            "Failing"
        }
    }

    #[test]
    fn interval_labels_and_day_counts() {
        assert_eq!(FIVE_MIN.label(), "5min");
        assert_eq!(FIVE_MIN.candles_per_days(60), 17_280);
        assert_eq!(CandleInterval::minutes(0).candles_per_days(60), 0);
    }

    #[tokio::test]
    async fn memory_source_applies_span() {
        let source = MemoryCandleSource::new().with_series("EURUSD", FIVE_MIN, sample_candles(50));

        let latest = source
            .fetch(&CandleRequest::latest("EURUSD", FIVE_MIN, 10))
            .await
            .unwrap();
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[9].timestamp, sample_candles(50)[49].timestamp);

        let all = sample_candles(50);
        let ranged = source
            .fetch(&CandleRequest::range("EURUSD", FIVE_MIN, all[5].timestamp, all[15].timestamp))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 10);

        assert!(source.fetch(&CandleRequest::latest("GBPUSD", FIVE_MIN, 10)).await.is_err());
    }

    #[tokio::test]
    async fn fallback_uses_first_non_empty_success() {
        let failing = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let empty = Arc::new(MemoryCandleSource::new().with_series("EURUSD", FIVE_MIN, Vec::new()));
        let full = Arc::new(MemoryCandleSource::new().with_series("EURUSD", FIVE_MIN, sample_candles(20)));
        let chain = FallbackCandleSource::new(vec![failing.clone(), empty, full]);

        let candles = chain
            .fetch(&CandleRequest::latest("EURUSD", FIVE_MIN, 100))
            .await
            .unwrap();
        assert_eq!(candles.len(), 20);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_errors_when_every_source_fails() {
        let failing = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let chain = FallbackCandleSource::new(vec![failing]);
        assert!(chain.fetch(&CandleRequest::latest("EURUSD", FIVE_MIN, 1)).await.is_err());
        assert!(FallbackCandleSource::new(Vec::new())
            .fetch(&CandleRequest::latest("EURUSD", FIVE_MIN, 1))
            .await
            .is_err());
    }
}
