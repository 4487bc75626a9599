use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::data::candle_source::{CandleRequest, CandleSource};
use crate::domain::Candle;

/// Read-through cache in front of another source.
///
/// Only non-empty successful results are stored. Two concurrent misses for the
/// same request both reach the inner source.
pub struct CachedCandleSource<S> {
    inner: S,
    entries: RwLock<HashMap<CandleRequest, Arc<Vec<Candle>>>>,
}

impl<S: CandleSource> CachedCandleSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn cached(&self, request: &CandleRequest) -> Result<Option<Arc<Vec<Candle>>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("Candle cache lock poisoned"))?;
        Ok(entries.get(request).cloned())
    }
}

#[async_trait]
impl<S: CandleSource> CandleSource for CachedCandleSource<S> {
    async fn fetch(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        if let Some(hit) = self.cached(request)? {
            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_candle_cache_events {
                log::info!("Candle cache hit: {}", request);
            }
            return Ok(hit.as_ref().clone());
        }

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_candle_cache_events {
            log::info!("Candle cache miss: {}", request);
        }

        let candles = self.inner.fetch(request).await?;
        if !candles.is_empty() {
            let mut entries = self
                .entries
                .write()
                .map_err(|_| anyhow!("Candle cache lock poisoned"))?;
            entries.insert(request.clone(), Arc::new(candles.clone()));
        }
        Ok(candles)
    }

    fn signature(&self) -> &'static str {
        self.inner.signature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::candle_source::tests::{FIVE_MIN, FailingSource, sample_candles};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        candles: Vec<Candle>,
    }

    #[async_trait]
    impl CandleSource for CountingSource {
        async fn fetch(&self, _request: &CandleRequest) -> Result<Vec<Candle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.candles.clone())
        }

        fn signature(&self) -> &'static str {
            "Counting"
        }
    }

    #[tokio::test]
    async fn inner_source_called_once_per_key() {
        let inner = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            candles: sample_candles(5),
        });
        let cache = CachedCandleSource::new(inner.clone());
        let a = CandleRequest::latest("EURUSD", FIVE_MIN, 5);
        let b = CandleRequest::latest("GBPUSD", FIVE_MIN, 5);

        for _ in 0..3 {
            assert_eq!(cache.fetch(&a).await.unwrap().len(), 5);
        }
        cache.fetch(&b).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        cache.fetch(&a).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_and_failed_results_are_not_cached() {
        let empty = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            candles: Vec::new(),
        });
        let cache = CachedCandleSource::new(empty.clone());
        let request = CandleRequest::latest("EURUSD", FIVE_MIN, 5);
        cache.fetch(&request).await.unwrap();
        cache.fetch(&request).await.unwrap();
        assert_eq!(empty.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());

        let failing = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = CachedCandleSource::new(failing.clone());
        assert!(cache.fetch(&request).await.is_err());
        assert!(cache.fetch(&request).await.is_err());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 2);
    }
}
