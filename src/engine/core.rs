use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::classification::{agent_guidance, classify_volatility};
use crate::analysis::confidence::{
    ConfidenceBreakdown, ConfidenceScorer, adjust_for_volatility_regime,
    get_confidence_explanation,
};
use crate::analysis::pattern_matcher::{
    DirectionalBias, EventDayStats, PatternMatchResult, PatternMatcher,
};
use crate::analysis::range_engine::{MIN_EXPECTED_DEVIATION_PIPS, RangeEngine, RangeStats};
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::{ANALYSIS, AnalysisConfig};
use crate::data::{CandleInterval, CandleRequest, CandleSource, EventCalendar, EventLookup};
use crate::domain::{Pair, SessionSelector, SessionWindow, TradingSession, is_weekend};
use crate::error::AnalysisError;
use crate::models::timeseries::latest_day;
use crate::models::{
    AnalysisOutput, AnalysisRequest, CandleSeries, HistoricalContext, HistoricalStatsSource,
    VolatilityExpectation, load_historical_stats,
};
use crate::utils::maths_utils::round_to;
use crate::utils::{Clock, SystemClock, TimeUtils};

use super::drivers::{
    EventContext, NO_LIVE_DATA_DRIVER, build_drivers, compression_driver,
    pending_pre_session_driver,
};

/// Operator-facing detail behind an `AnalysisOutput`
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub pair_code: String,
    pub pip_size: f64,
    pub session: TradingSession,
    pub intraday_candles: usize,
    pub historical_candles: usize,
    /// Set when the analysis ran on baseline values for lack of candles
    pub used_fallback: bool,
    pub current_pre_range_pips: f64,
    pub avg_pre_range_pips: f64,
    pub avg_session_range_pips: f64,
    pub compression_ratio: f64,
    pub is_compressed: bool,
    pub pattern: PatternMatchResult,
    pub event: Option<EventContext>,
    pub data_age_days: Option<i64>,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub confidence_explanation: String,
    pub base_confidence: f64,
    pub regime_adjusted_confidence: Option<f64>,
    pub latest_session_stats: RangeStats,
    pub directional_bias: DirectionalBias,
    pub event_days: EventDayStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionAnalysis {
    pub output: AnalysisOutput,
    /// None for the market-closed response
    pub diagnostics: Option<Diagnostics>,
}

/// Runs the full session analysis pipeline against injected collaborators.
///
/// Holds only shared immutable state, so one analyzer can serve concurrent requests.
pub struct SessionAnalyzer {
    candles: Arc<dyn CandleSource>,
    calendar: Arc<dyn EventCalendar>,
    clock: Arc<dyn Clock>,
    config: AnalysisConfig,
}

impl SessionAnalyzer {
    pub fn new(candles: Arc<dyn CandleSource>, calendar: Arc<dyn EventCalendar>) -> Self {
        Self {
            candles,
            calendar,
            clock: Arc::new(SystemClock),
            config: ANALYSIS.clone(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse `pair` for `target_session` ("asian", "london", "ny" or "auto").
    pub async fn analyze(
        &self,
        pair: &str,
        target_session: &str,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let session: SessionSelector = target_session.parse()?;
        self.analyze_request(&AnalysisRequest::new(pair, session))
            .await
    }

    pub async fn analyze_request(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutput, AnalysisError> {
        Ok(self.analyze_detailed(request).await?.output)
    }

    pub async fn analyze_detailed(
        &self,
        request: &AnalysisRequest,
    ) -> Result<SessionAnalysis, AnalysisError> {
        // 1. Input validation
        let pair = Pair::parse(&request.pair)?;
        let now = self.clock.now();

        // 2. Weekend closure short-circuits before any fetch
        if is_weekend(now) {
            log::info!("{}: market closed for the weekend", pair);
            return Ok(SessionAnalysis {
                output: AnalysisOutput::market_closed(&pair.display()),
                diagnostics: None,
            });
        }

        // 3. Session
        let session = request.session.resolve(now);
        let window = session.window();

        let file_stats = match &request.historical_stats {
            HistoricalStatsSource::Computed => None,
            HistoricalStatsSource::File(path) => {
                Some(
                    load_historical_stats(path.clone())
                        .await
                        .map_err(AnalysisError::HistoricalStats)?,
                )
            }
        };

        let pip_size = request.pip_size_override().unwrap_or(pair.pip_size());
        log::info!(
            "Analyzing {} for the {} (pip {})",
            pair,
            window.name,
            pip_size
        );

        // 4. Candles
        let (intraday, historical) = self.fetch_candles(&pair).await;

        let event = self.resolve_event(request, session, now).await;

        let ctx = PipelineContext {
            pair: &pair,
            session,
            window: &window,
            engine: RangeEngine::new(pip_size)
                .with_compression_threshold(self.config.pre_session.compression_threshold),
            event,
            file_stats,
            now,
        };

        let analysis = if intraday.is_empty() || historical.is_empty() {
            log::warn!(
                "{}: insufficient candles (intraday {}, historical {}); using session baseline",
                pair,
                intraday.len(),
                historical.len()
            );
            self.baseline_analysis(&ctx, &intraday, &historical)
        } else {
            self.full_analysis(&ctx, &intraday, &historical).await
        };

        analysis.output.validate()?;
        Ok(analysis)
    }

    async fn fetch_candles(&self, pair: &Pair) -> (CandleSeries, CandleSeries) {
        let fetch = &self.config.fetch;
        let interval = CandleInterval::minutes(fetch.candle_interval_minutes);
        let historical_count = interval
            .candles_per_days(fetch.historical_days)
            .min(fetch.max_candles_per_request);

        let intraday_request = CandleRequest::latest(pair.code(), interval, fetch.intraday_candles);
        let historical_request = CandleRequest::latest(pair.code(), interval, historical_count);

        tokio::join!(
            self.fetch_or_empty(&intraday_request),
            self.fetch_or_empty(&historical_request)
        )
    }

    async fn fetch_or_empty(&self, request: &CandleRequest) -> CandleSeries {
        match self.candles.fetch(request).await {
            Ok(candles) => CandleSeries::new(candles),
            Err(e) => {
                log::warn!("Candle fetch failed for {}: {:#}", request, e);
                CandleSeries::default()
            }
        }
    }

    /// Manual event on the request, else the calendar around the next session start.
    async fn resolve_event(
        &self,
        request: &AnalysisRequest,
        session: TradingSession,
        now: DateTime<Utc>,
    ) -> Option<EventContext> {
        if let Some(label) = request.manual_event() {
            return Some(EventContext::Manual {
                label: label.to_string(),
                overlap: request
                    .event_overlap
                    .as_deref()
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string),
            });
        }

        let target = session.next_start(now);
        match self
            .calendar
            .nearby_event(target, self.config.calendar.event_window_minutes)
            .await
        {
            EventLookup::Found(event) => {
                log::info!("Calendar event near session start: {}", event.name);
                Some(EventContext::Calendar(event))
            }
            EventLookup::NoEvent => None,
            EventLookup::Unavailable(reason) => {
                log::warn!("Economic calendar unavailable, assuming no event: {}", reason);
                None
            }
        }
    }

    async fn full_analysis(
        &self,
        ctx: &PipelineContext<'_>,
        intraday: &CandleSeries,
        historical: &CandleSeries,
    ) -> SessionAnalysis {
        let engine = ctx.engine;
        let window = ctx.window;
        let pre_minutes = self.config.pre_session.window_minutes;

        // 5. Ranges
        let current_pre = engine.pre_session_range(intraday, window.start, pre_minutes);
        let avg_pre = engine.average_range(historical, window.start, pre_minutes, true);
        let avg_session =
            engine.average_range(historical, window.start, window.duration_minutes(), false);

        // A zero range means the window has not opened (or traded flat): no compression signal
        let pre_formed = current_pre > 0.0;
        if !pre_formed {
            log::info!(
                "{}: pre-session window for the {} has no range yet",
                ctx.pair,
                window.name
            );
        }

        // 6. Compression and analogs
        let (is_compressed, compression_ratio) = if pre_formed {
            engine.is_compressed(current_pre, avg_pre)
        } else {
            (false, 1.0)
        };
        let matcher = PatternMatcher::new(engine)
            .with_pre_session_minutes(pre_minutes)
            .with_similarity_threshold(self.config.pattern.similarity_threshold);
        let pattern = match &ctx.file_stats {
            Some(stats) => PatternMatchResult::from(stats),
            None if pre_formed => {
                matcher.find_similar_conditions(current_pre, avg_pre, historical, window)
            }
            None => PatternMatchResult::neutral(),
        };
        let has_event = ctx.event.is_some();

        // 7. Deviation and confidence
        let expected = if pre_formed {
            engine.expected_deviation(current_pre, avg_pre, pattern.expansion_rate, avg_session)
        } else {
            avg_session.max(MIN_EXPECTED_DEVIATION_PIPS)
        };
        let data_age_days = historical
            .last_timestamp()
            .map(|newest| TimeUtils::whole_days_between(newest, ctx.now));
        let scorer = ConfidenceScorer::new(self.config.confidence.max_data_age_days);
        let age = data_age_days.unwrap_or(self.config.confidence.max_data_age_days);
        let base_confidence = scorer.calculate_confidence(
            pattern.occurrence_count,
            pattern.expansion_rate,
            has_event,
            age,
        );
        let breakdown = scorer.get_confidence_breakdown(
            pattern.occurrence_count,
            pattern.expansion_rate,
            has_event,
            age,
        );

        let regime_adjusted = self.config.confidence.apply_regime_adjustment.then(|| {
            let current_atr = engine.average_true_range(intraday, self.config.atr_period);
            let avg_atr = engine.average_daily_atr(historical, self.config.atr_period);
            adjust_for_volatility_regime(
                base_confidence,
                current_atr,
                avg_atr,
                self.config.confidence.regime_adjustment_factor,
            )
        });
        let confidence = regime_adjusted.unwrap_or(base_confidence);
        let explanation = get_confidence_explanation(
            confidence,
            pattern.occurrence_count,
            pattern.expansion_rate,
            has_event,
        );

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_confidence_breakdown {
            log::info!("{}: {:?} -> {:.2} ({})", ctx.pair, breakdown, confidence, explanation);
        }

        // 8-9. Drivers, tier, guidance
        let lead = if pre_formed {
            compression_driver(current_pre, avg_pre, compression_ratio, is_compressed)
        } else {
            pending_pre_session_driver(window, pre_minutes)
        };
        let drivers = build_drivers(
            lead,
            ctx.event.as_ref(),
            &window.name,
            &pattern,
        );
        let tier = classify_volatility(
            expected,
            ctx.pair.kind(),
            ctx.session,
            &self.config.classification,
        );
        let guidance = agent_guidance(tier, pattern.expansion_rate, is_compressed, has_event);

        let output = self.assemble(ctx, tier, expected, confidence, drivers, &pattern, guidance);

        let event_dates = self.calendar.event_dates().await;
        let diagnostics = Diagnostics {
            pair_code: ctx.pair.code().to_string(),
            pip_size: engine.pip_size(),
            session: ctx.session,
            intraday_candles: intraday.len(),
            historical_candles: historical.len(),
            used_fallback: false,
            current_pre_range_pips: current_pre,
            avg_pre_range_pips: round_to(avg_pre, 1),
            avg_session_range_pips: round_to(avg_session, 1),
            compression_ratio,
            is_compressed,
            event: ctx.event.clone(),
            data_age_days,
            confidence_breakdown: breakdown,
            confidence_explanation: explanation,
            base_confidence,
            regime_adjusted_confidence: regime_adjusted,
            latest_session_stats: engine.range_statistics(
                latest_day(historical),
                window.start,
                window.end,
            ),
            directional_bias: matcher.directional_bias(historical, window),
            event_days: matcher.event_day_patterns(historical, &event_dates, window),
            pattern,
        };

        SessionAnalysis {
            output,
            diagnostics: Some(diagnostics),
        }
    }

    /// Conservative result when candles are missing: neutral compression, a
    /// moderate tier at the middle of the session's thresholds, capped confidence.
    fn baseline_analysis(
        &self,
        ctx: &PipelineContext<'_>,
        intraday: &CandleSeries,
        historical: &CandleSeries,
    ) -> SessionAnalysis {
        let thresholds = self
            .config
            .classification
            .adjusted_thresholds(ctx.pair.kind(), ctx.session);
        let expected = ((thresholds.low + thresholds.high) / 2.0).max(MIN_EXPECTED_DEVIATION_PIPS);

        let pattern = match &ctx.file_stats {
            Some(stats) => PatternMatchResult::from(stats),
            None => PatternMatchResult::neutral(),
        };
        let has_event = ctx.event.is_some();

        let scorer = ConfidenceScorer::new(self.config.confidence.max_data_age_days);
        let age = self.config.confidence.max_data_age_days;
        let breakdown = scorer.get_confidence_breakdown(
            pattern.occurrence_count,
            pattern.expansion_rate,
            has_event,
            age,
        );
        let base_confidence = scorer.calculate_confidence(
            pattern.occurrence_count,
            pattern.expansion_rate,
            has_event,
            age,
        );
        let confidence = base_confidence.min(self.config.confidence.fallback_confidence_cap);
        let explanation = get_confidence_explanation(
            confidence,
            pattern.occurrence_count,
            pattern.expansion_rate,
            has_event,
        );

        let drivers = build_drivers(
            NO_LIVE_DATA_DRIVER.to_string(),
            ctx.event.as_ref(),
            &ctx.window.name,
            &pattern,
        );
        let tier = VolatilityExpectation::Moderate;
        let guidance = agent_guidance(tier, pattern.expansion_rate, false, has_event);

        let output = self.assemble(ctx, tier, expected, confidence, drivers, &pattern, guidance);

        let diagnostics = Diagnostics {
            pair_code: ctx.pair.code().to_string(),
            pip_size: ctx.engine.pip_size(),
            session: ctx.session,
            intraday_candles: intraday.len(),
            historical_candles: historical.len(),
            used_fallback: true,
            current_pre_range_pips: 0.0,
            avg_pre_range_pips: 0.0,
            avg_session_range_pips: 0.0,
            compression_ratio: 1.0,
            is_compressed: false,
            pattern,
            event: ctx.event.clone(),
            data_age_days: None,
            confidence_breakdown: breakdown,
            confidence_explanation: explanation,
            base_confidence,
            regime_adjusted_confidence: None,
            latest_session_stats: RangeStats::default(),
            directional_bias: DirectionalBias::default(),
            event_days: EventDayStats::default(),
        };

        SessionAnalysis {
            output,
            diagnostics: Some(diagnostics),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        ctx: &PipelineContext<'_>,
        tier: VolatilityExpectation,
        expected: f64,
        confidence: f64,
        drivers: Vec<String>,
        pattern: &PatternMatchResult,
        guidance: &str,
    ) -> AnalysisOutput {
        AnalysisOutput {
            pair: ctx.pair.display(),
            session: ctx.window.name.clone(),
            time_window_minutes: self.config.pre_session.window_minutes,
            volatility_expectation: tier,
            expected_deviation_pips: round_to(expected, 1),
            confidence: round_to(confidence, 2),
            drivers,
            historical_context: HistoricalContext {
                occurrences: pattern.occurrence_count,
                expansion_rate: round_to(pattern.expansion_rate, 2),
            },
            agent_guidance: guidance.to_string(),
        }
    }
}

/// Per-request values shared by both pipeline paths
struct PipelineContext<'a> {
    pair: &'a Pair,
    session: TradingSession,
    window: &'a SessionWindow,
    engine: RangeEngine,
    event: Option<EventContext>,
    file_stats: Option<HistoricalContext>,
    now: DateTime<Utc>,
}
