// =============================================================================
// Screener — per-symbol pipeline and batch orchestration
// =============================================================================
//
// Pipeline per symbol: fetch history -> compute indicators -> detect signals
// -> score quality.  Batch runs fan the pipeline out over symbols with a
// bounded concurrency limit; a failed symbol is logged and counted, never
// fatal to the run.
// =============================================================================

use anyhow::{Context, Result};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ScreenerConfig;
use crate::indicators::{compute_indicators, IndicatorFrame};
use crate::signals::detector::MIN_BARS;
use crate::signals::{analyze_signal_quality, CombinedSignals, SignalDetector, SignalQuality};
use crate::yahoo::MarketDataGateway;

// =============================================================================
// Result models
// =============================================================================

/// Latest-bar snapshot for display alongside the signals.
#[derive(Debug, Clone, Serialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
    /// Day-over-day change, in percent.
    pub price_change_pct: f64,
    pub volume: f64,
    /// 20-day average volume; 0 when undefined.
    pub avg_volume: f64,
    pub timestamp: String,
}

impl StockQuote {
    fn from_frame(symbol: &str, frame: &IndicatorFrame) -> Self {
        let t = frame.len() - 1;
        let latest = frame.bar(t);
        Self {
            symbol: symbol.to_string(),
            price: latest.close,
            price_change_pct: frame.price_change_pct[t].unwrap_or(0.0) * 100.0,
            volume: latest.volume,
            avg_volume: frame.volume_ma20[t].unwrap_or(0.0),
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Complete screening outcome for a single symbol.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResult {
    pub quote: StockQuote,
    pub signals: CombinedSignals,
    pub quality: SignalQuality,
}

impl ScreeningResult {
    pub fn symbol(&self) -> &str {
        &self.quote.symbol
    }

    pub fn has_signals(&self) -> bool {
        self.signals.has_any_signal()
    }
}

/// Aggregate over a batch run (successful screens only; failures are
/// counted separately by the caller).
#[derive(Debug, Clone, Default)]
pub struct ScreeningResults {
    pub results: Vec<ScreeningResult>,
}

impl ScreeningResults {
    pub fn new(results: Vec<ScreeningResult>) -> Self {
        Self { results }
    }

    pub fn total_screened(&self) -> usize {
        self.results.len()
    }

    pub fn with_signals(&self) -> Vec<&ScreeningResult> {
        self.results.iter().filter(|r| r.has_signals()).collect()
    }

    pub fn signal_count(&self) -> usize {
        self.results.iter().filter(|r| r.has_signals()).count()
    }

    pub fn breakout_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.signals.breakout.is_signal())
            .count()
    }

    pub fn volume_spike_count(&self) -> usize {
        self.results.iter().filter(|r| r.signals.volume.signal).count()
    }

    /// Retain only the symbols that produced at least one signal.
    pub fn into_signals_only(self) -> Self {
        Self {
            results: self
                .results
                .into_iter()
                .filter(ScreeningResult::has_signals)
                .collect(),
        }
    }

    /// Best signals first: by signal count, then breakout strength, then
    /// volume ratio (strengths and ratios only count when the respective
    /// signal fired).
    pub fn top_signals(&self, limit: usize) -> Vec<ScreeningResult> {
        let mut ranked: Vec<ScreeningResult> = self
            .results
            .iter()
            .filter(|r| r.has_signals())
            .cloned()
            .collect();

        ranked.sort_by(|a, b| {
            let key = |r: &ScreeningResult| {
                let breakout = if r.signals.breakout.is_signal() {
                    r.signals.breakout.strength()
                } else {
                    0.0
                };
                let volume = if r.signals.volume.signal {
                    r.signals.volume.volume_ratio
                } else {
                    0.0
                };
                (r.signals.signal_count(), breakout, volume)
            };
            let (ca, ba, va) = key(a);
            let (cb, bb, vb) = key(b);
            cb.cmp(&ca)
                .then(bb.total_cmp(&ba))
                .then(vb.total_cmp(&va))
        });

        ranked.truncate(limit);
        ranked
    }
}

// =============================================================================
// Market-condition analysis
// =============================================================================

/// Coarse market read derived from the fraction of screened symbols showing
/// signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCondition {
    VeryBullish,
    Bullish,
    NeutralPositive,
    Neutral,
    Bearish,
    Unknown,
}

impl std::fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::VeryBullish => "very bullish",
            Self::Bullish => "bullish",
            Self::NeutralPositive => "neutral positive",
            Self::Neutral => "neutral",
            Self::Bearish => "bearish",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

impl MarketCondition {
    fn from_signal_percentage(pct: f64) -> Self {
        if pct >= 30.0 {
            Self::VeryBullish
        } else if pct >= 20.0 {
            Self::Bullish
        } else if pct >= 10.0 {
            Self::NeutralPositive
        } else if pct >= 5.0 {
            Self::Neutral
        } else {
            Self::Bearish
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub condition: MarketCondition,
    pub signal_percentage: f64,
    pub breakout_percentage: f64,
    pub volume_spike_percentage: f64,
    pub total_screened: usize,
    pub stocks_with_signals: usize,
    pub breakout_stocks: usize,
    pub volume_spike_stocks: usize,
}

// =============================================================================
// Screener
// =============================================================================

pub struct Screener<G> {
    config: ScreenerConfig,
    gateway: G,
    detector: SignalDetector,
}

impl<G: MarketDataGateway> Screener<G> {
    pub fn new(config: ScreenerConfig, gateway: G) -> Result<Self> {
        config.validate()?;
        let detector = SignalDetector::new(
            config.volume_spike_threshold,
            config.breakout_threshold,
        );
        Ok(Self {
            config,
            gateway,
            detector,
        })
    }

    /// Run the full pipeline for one symbol.
    pub async fn screen_symbol(&self, symbol: &str) -> Result<ScreeningResult> {
        info!(symbol, "screening");

        let bars = self
            .gateway
            .fetch_history(symbol, self.config.period)
            .await?;

        let frame = compute_indicators(&bars)
            .with_context(|| format!("indicator computation failed for {symbol}"))?;

        if frame.len() < MIN_BARS {
            anyhow::bail!(
                "insufficient history for {symbol}: {} bars < {MIN_BARS}",
                frame.len()
            );
        }

        let signals = self.detector.detect_all_signals(&frame);
        let quality = analyze_signal_quality(&signals, &frame);

        Ok(ScreeningResult {
            quote: StockQuote::from_frame(symbol, &frame),
            signals,
            quality,
        })
    }

    /// Screen a batch of symbols with bounded concurrency.  Per-symbol
    /// failures are logged and dropped; the batch always completes.
    pub async fn screen_many(&self, symbols: &[String]) -> ScreeningResults {
        info!(count = symbols.len(), "starting batch screening");

        let outcomes: Vec<(String, Result<ScreeningResult>)> =
            stream::iter(symbols.iter().cloned())
                .map(|symbol| async move {
                    let outcome = self.screen_symbol(&symbol).await;
                    (symbol, outcome)
                })
                .buffer_unordered(self.config.max_concurrent_fetches)
                .collect()
                .await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failed = 0usize;

        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(symbol, error = %e, "screening failed");
                    failed += 1;
                }
            }
        }

        info!(
            successful = results.len(),
            failed,
            total = symbols.len(),
            "batch screening completed"
        );

        ScreeningResults::new(results)
    }

    /// Batch screen, keeping only symbols with at least one signal.
    pub async fn stocks_with_signals(&self, symbols: &[String]) -> ScreeningResults {
        let all = self.screen_many(symbols).await;
        let total = all.total_screened();
        let filtered = all.into_signals_only();
        info!(
            signals = filtered.total_screened(),
            screened = total,
            "signal filter applied"
        );
        filtered
    }

    /// Derive an overall market read from a batch run.
    pub async fn analyze_market_conditions(&self, symbols: &[String]) -> MarketAnalysis {
        let results = self.screen_many(symbols).await;
        let total = results.total_screened();

        if total == 0 {
            return MarketAnalysis {
                condition: MarketCondition::Unknown,
                signal_percentage: 0.0,
                breakout_percentage: 0.0,
                volume_spike_percentage: 0.0,
                total_screened: 0,
                stocks_with_signals: 0,
                breakout_stocks: 0,
                volume_spike_stocks: 0,
            };
        }

        let pct = |count: usize| (count as f64 / total as f64) * 100.0;
        let signal_percentage = pct(results.signal_count());

        let analysis = MarketAnalysis {
            condition: MarketCondition::from_signal_percentage(signal_percentage),
            signal_percentage,
            breakout_percentage: pct(results.breakout_count()),
            volume_spike_percentage: pct(results.volume_spike_count()),
            total_screened: total,
            stocks_with_signals: results.signal_count(),
            breakout_stocks: results.breakout_count(),
            volume_spike_stocks: results.volume_spike_count(),
        };

        info!(
            condition = %analysis.condition,
            signal_percentage = analysis.signal_percentage,
            "market analysis"
        );
        analysis
    }

    /// Best-ranked opportunities across a batch run.
    pub async fn top_opportunities(
        &self,
        symbols: &[String],
        limit: usize,
    ) -> Vec<ScreeningResult> {
        let results = self.screen_many(symbols).await;
        let top = results.top_signals(limit);
        info!(count = top.len(), "top opportunities identified");
        top
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Period, PriceBar};
    use std::collections::HashMap;

    /// Gateway backed by canned series; unknown symbols fail like a network
    /// error would.
    struct MockGateway {
        data: HashMap<String, Vec<PriceBar>>,
    }

    impl MarketDataGateway for MockGateway {
        async fn fetch_history(&self, symbol: &str, _period: Period) -> Result<Vec<PriceBar>> {
            self.data
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no data for {symbol}"))
        }
    }

    fn flat_bar(close: f64, volume: f64) -> PriceBar {
        PriceBar::new(close, close + 1.0, close - 1.0, close, volume)
    }

    fn quiet_series() -> Vec<PriceBar> {
        (0..60)
            .map(|i| flat_bar(100.0 + (i as f64 * 0.3).sin(), 1_000_000.0))
            .collect()
    }

    fn spike_series() -> Vec<PriceBar> {
        // Close sits well below resistance so only the volume signal fires.
        let spike_bar = |volume| PriceBar::new(50.0, 55.0, 45.0, 50.0, volume);
        let mut bars: Vec<PriceBar> = (0..59).map(|_| spike_bar(500_000.0)).collect();
        bars.push(spike_bar(2_000_000.0));
        bars
    }

    fn breakout_series() -> Vec<PriceBar> {
        let mut bars: Vec<PriceBar> = (0..59)
            .map(|i| {
                let close = 104.0 + ((i as f64 * 0.7).sin()).abs() * 2.0;
                PriceBar::new(close, 110.0, close - 2.0, close, 1_000_000.0)
            })
            .collect();
        bars.push(PriceBar::new(106.0, 110.0, 104.0, 112.5, 3_000_000.0));
        bars
    }

    fn screener(data: HashMap<String, Vec<PriceBar>>) -> Screener<MockGateway> {
        Screener::new(ScreenerConfig::default(), MockGateway { data }).unwrap()
    }

    #[tokio::test]
    async fn screen_symbol_produces_quote_and_signals() {
        let mut data = HashMap::new();
        data.insert("BRK".to_string(), breakout_series());
        let screener = screener(data);

        let result = screener.screen_symbol("BRK").await.unwrap();
        assert_eq!(result.symbol(), "BRK");
        assert!((result.quote.price - 112.5).abs() < 1e-9);
        assert!(result.signals.breakout.is_signal());
        assert!(result.signals.volume.signal);
        assert!(result.has_signals());
    }

    #[tokio::test]
    async fn screen_symbol_rejects_short_history() {
        let mut data = HashMap::new();
        data.insert(
            "SHORT".to_string(),
            (0..10).map(|_| flat_bar(100.0, 1000.0)).collect(),
        );
        let screener = screener(data);
        assert!(screener.screen_symbol("SHORT").await.is_err());
    }

    #[tokio::test]
    async fn batch_isolates_failures() {
        let mut data = HashMap::new();
        data.insert("OK1".to_string(), quiet_series());
        data.insert("OK2".to_string(), spike_series());
        let screener = screener(data);

        let symbols: Vec<String> = ["OK1", "MISSING", "OK2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = screener.screen_many(&symbols).await;

        assert_eq!(results.total_screened(), 2);
        assert_eq!(results.volume_spike_count(), 1);
    }

    #[tokio::test]
    async fn signals_only_filters_quiet_symbols() {
        let mut data = HashMap::new();
        data.insert("QUIET".to_string(), quiet_series());
        data.insert("SPIKE".to_string(), spike_series());
        let screener = screener(data);

        let symbols: Vec<String> = ["QUIET", "SPIKE"].iter().map(|s| s.to_string()).collect();
        let filtered = screener.stocks_with_signals(&symbols).await;

        assert_eq!(filtered.total_screened(), 1);
        assert_eq!(filtered.results[0].symbol(), "SPIKE");
    }

    #[tokio::test]
    async fn top_signals_rank_by_count_then_strength() {
        let mut data = HashMap::new();
        data.insert("QUIET".to_string(), quiet_series());
        data.insert("SPIKE".to_string(), spike_series());
        data.insert("BRK".to_string(), breakout_series());
        let screener = screener(data);

        let symbols: Vec<String> = ["QUIET", "SPIKE", "BRK"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let top = screener.top_opportunities(&symbols, 5).await;

        // BRK has two signals and ranks above the volume-only SPIKE; QUIET
        // does not appear at all.
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].symbol(), "BRK");
        assert_eq!(top[1].symbol(), "SPIKE");
    }

    #[tokio::test]
    async fn market_conditions_band_on_signal_percentage() {
        // 1 of 2 screened symbols with signals = 50% -> very bullish.
        let mut data = HashMap::new();
        data.insert("QUIET".to_string(), quiet_series());
        data.insert("SPIKE".to_string(), spike_series());
        let screener = screener(data);

        let symbols: Vec<String> = ["QUIET", "SPIKE"].iter().map(|s| s.to_string()).collect();
        let analysis = screener.analyze_market_conditions(&symbols).await;

        assert_eq!(analysis.total_screened, 2);
        assert_eq!(analysis.stocks_with_signals, 1);
        assert!((analysis.signal_percentage - 50.0).abs() < 1e-9);
        assert_eq!(analysis.condition, MarketCondition::VeryBullish);
    }

    #[tokio::test]
    async fn market_conditions_with_no_data_is_unknown() {
        let screener = screener(HashMap::new());
        let symbols: Vec<String> = vec!["GONE".to_string()];
        let analysis = screener.analyze_market_conditions(&symbols).await;
        assert_eq!(analysis.condition, MarketCondition::Unknown);
        assert_eq!(analysis.total_screened, 0);
    }

    #[test]
    fn condition_bands() {
        assert_eq!(
            MarketCondition::from_signal_percentage(35.0),
            MarketCondition::VeryBullish
        );
        assert_eq!(
            MarketCondition::from_signal_percentage(25.0),
            MarketCondition::Bullish
        );
        assert_eq!(
            MarketCondition::from_signal_percentage(15.0),
            MarketCondition::NeutralPositive
        );
        assert_eq!(
            MarketCondition::from_signal_percentage(7.0),
            MarketCondition::Neutral
        );
        assert_eq!(
            MarketCondition::from_signal_percentage(2.0),
            MarketCondition::Bearish
        );
    }
}
