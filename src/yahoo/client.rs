// =============================================================================
// Yahoo Finance chart-API client
// =============================================================================
//
// Fetches daily OHLCV history from the public v8 chart endpoint (no API key
// required).  Responses are parsed defensively: rows with null closes or
// volumes are skipped, and the whole fetch is rejected when the series fails
// the data-quality gate (too short, too many dropped rows, or non-positive
// prices).
// =============================================================================

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::types::{Period, PriceBar};

/// Minimum usable bars for a series to be worth analysing.
const MIN_DATA_POINTS: usize = 20;

/// Fraction of rows allowed to be dropped for missing closes/volumes.
const MAX_DROPPED_ROW_RATIO: f64 = 0.10;

/// Capability the screener core needs from its environment: given a symbol
/// and a lookback period, return an OHLCV series or fail.
pub trait MarketDataGateway {
    fn fetch_history(
        &self,
        symbol: &str,
        period: Period,
    ) -> impl std::future::Future<Output = Result<Vec<PriceBar>>> + Send;
}

/// Yahoo Finance REST client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        let mut default_headers = reqwest::header::HeaderMap::new();
        // Yahoo rejects requests without a browser-ish user agent.
        default_headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("Mozilla/5.0 (compatible; breakout-screener)"),
        );

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        debug!("YahooClient initialised (base_url=https://query1.finance.yahoo.com)");

        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            client,
        }
    }

    /// Quick connectivity probe: fetch a short history for a well-known
    /// symbol.  Used by the health-check mode.
    #[instrument(skip(self), name = "yahoo::test_connection")]
    pub async fn test_connection(&self) -> bool {
        match self.fetch_history("AAPL", Period::OneMonth).await {
            Ok(bars) => !bars.is_empty(),
            Err(e) => {
                warn!(error = %e, "connection test failed");
                false
            }
        }
    }

    /// GET /v8/finance/chart/{symbol} and convert the payload into bars.
    async fn fetch_chart(&self, symbol: &str, period: Period) -> Result<Vec<PriceBar>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url,
            symbol,
            period.as_range()
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart request failed for {symbol}"))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {symbol}"))?;

        if !status.is_success() {
            anyhow::bail!("Yahoo chart API returned {status} for {symbol}: {body}");
        }

        let result = body["chart"]["result"]
            .as_array()
            .and_then(|arr| arr.first())
            .with_context(|| format!("no chart result for symbol {symbol}"))?;

        let quote = result["indicators"]["quote"]
            .as_array()
            .and_then(|arr| arr.first())
            .with_context(|| format!("chart result missing quote data for {symbol}"))?;

        let opens = column(quote, "open")?;
        let highs = column(quote, "high")?;
        let lows = column(quote, "low")?;
        let closes = column(quote, "close")?;
        let volumes = column(quote, "volume")?;

        let rows = closes.len();
        let mut bars = Vec::with_capacity(rows);
        let mut dropped = 0usize;

        for i in 0..rows {
            let row = (
                cell(opens, i),
                cell(highs, i),
                cell(lows, i),
                cell(closes, i),
                cell(volumes, i),
            );
            match row {
                (Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                    bars.push(PriceBar::new(open, high, low, close, volume));
                }
                _ => {
                    // Null rows happen around holidays and delistings.
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!(symbol, dropped, rows, "skipped rows with missing fields");
            if (dropped as f64) > (rows as f64) * MAX_DROPPED_ROW_RATIO {
                anyhow::bail!(
                    "data quality rejected for {symbol}: {dropped} of {rows} rows unusable"
                );
            }
        }

        Ok(bars)
    }

    /// Sanity checks on a fetched series.  Hard failures reject the series;
    /// suspicious-but-plausible patterns only warn.
    fn validate_quality(symbol: &str, bars: &[PriceBar]) -> Result<()> {
        if bars.len() < MIN_DATA_POINTS {
            anyhow::bail!(
                "insufficient data points for {symbol}: {} < {MIN_DATA_POINTS}",
                bars.len()
            );
        }

        let mut min_close = f64::INFINITY;
        let mut max_close = f64::NEG_INFINITY;
        let mut total_volume = 0.0;

        for bar in bars {
            min_close = min_close.min(bar.close);
            max_close = max_close.max(bar.close);
            total_volume += bar.volume;
        }

        if min_close <= 0.0 {
            anyhow::bail!("invalid price data for {symbol}: min close {min_close}");
        }
        if max_close / min_close > 100.0 {
            // Might be a legitimate split or squeeze; let it through.
            warn!(symbol, min_close, max_close, "suspicious price range");
        }
        if total_volume == 0.0 {
            warn!(symbol, "no volume data in series");
        }

        Ok(())
    }
}

impl MarketDataGateway for YahooClient {
    /// Fetch and validate `period` worth of daily history for `symbol`.
    async fn fetch_history(&self, symbol: &str, period: Period) -> Result<Vec<PriceBar>> {
        info!(symbol, period = %period, "fetching history");

        let bars = self.fetch_chart(symbol, period).await?;
        if bars.is_empty() {
            anyhow::bail!("no data found for symbol {symbol}");
        }

        Self::validate_quality(symbol, &bars)?;

        info!(symbol, bars = bars.len(), "history fetched");
        Ok(bars)
    }
}

/// Pull one named column out of the quote object.
fn column<'a>(quote: &'a serde_json::Value, name: &str) -> Result<&'a Vec<serde_json::Value>> {
    quote[name]
        .as_array()
        .with_context(|| format!("chart quote missing '{name}' column"))
}

/// Read a numeric cell, treating nulls and non-numbers as missing.
fn cell(col: &[serde_json::Value], i: usize) -> Option<f64> {
    col.get(i).and_then(serde_json::Value::as_f64)
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64, volume: f64) -> PriceBar {
        PriceBar::new(close, close + 1.0, close - 1.0, close, volume)
    }

    #[test]
    fn quality_rejects_short_series() {
        let bars: Vec<PriceBar> = (0..10).map(|_| bar(100.0, 1000.0)).collect();
        assert!(YahooClient::validate_quality("TEST", &bars).is_err());
    }

    #[test]
    fn quality_rejects_non_positive_prices() {
        let mut bars: Vec<PriceBar> = (0..30).map(|_| bar(100.0, 1000.0)).collect();
        bars[12].close = -1.0;
        assert!(YahooClient::validate_quality("TEST", &bars).is_err());
    }

    #[test]
    fn quality_accepts_reasonable_series() {
        let bars: Vec<PriceBar> = (0..30)
            .map(|i| bar(100.0 + i as f64, 1000.0))
            .collect();
        assert!(YahooClient::validate_quality("TEST", &bars).is_ok());
    }

    #[test]
    fn quality_allows_zero_volume_with_warning_only() {
        let bars: Vec<PriceBar> = (0..30).map(|_| bar(100.0, 0.0)).collect();
        assert!(YahooClient::validate_quality("TEST", &bars).is_ok());
    }

    #[test]
    fn cell_treats_null_as_missing() {
        let col: Vec<serde_json::Value> =
            serde_json::from_str("[1.5, null, 3.0]").unwrap();
        assert_eq!(cell(&col, 0), Some(1.5));
        assert_eq!(cell(&col, 1), None);
        assert_eq!(cell(&col, 2), Some(3.0));
        assert_eq!(cell(&col, 9), None);
    }
}
