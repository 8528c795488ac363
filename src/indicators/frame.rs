// =============================================================================
// Indicator Frame — a price series augmented with derived columns
// =============================================================================
//
// `compute_indicators` is the indicator engine: a pure function from an
// OHLCV series to the same series plus every rolling column the signal
// detector consumes.  Each column is exactly as long as the bar series;
// `None` means "undefined: fewer than the required window of preceding
// bars".  No column ever looks ahead of its own index.
// =============================================================================

use crate::indicators::atr::atr_series;
use crate::indicators::ema::ema_series;
use crate::indicators::obv::obv_series;
use crate::indicators::rolling::{pct_change, rolling_max, rolling_mean, rolling_min, rolling_std};
use crate::types::PriceBar;

/// Window sizes fixed by the screening strategy.
pub const SMA_SHORT_WINDOW: usize = 20;
pub const SMA_LONG_WINDOW: usize = 50;
pub const EMA_FAST_SPAN: usize = 12;
pub const EMA_SLOW_SPAN: usize = 26;
pub const VOLUME_MA_WINDOW: usize = 20;
pub const VOLATILITY_WINDOW: usize = 20;
pub const ATR_WINDOW: usize = 14;
pub const LEVEL_WINDOW: usize = 20;

/// Structural failure of the indicator engine.  Short series are not errors;
/// they simply yield undefined columns.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("price series is empty")]
    EmptySeries,
    #[error("non-finite {field} at bar {index}")]
    NonFiniteField { index: usize, field: &'static str },
}

/// A price series with its derived indicator columns.
///
/// Immutable snapshot: built in one `compute_indicators` call and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    bars: Vec<PriceBar>,
    pub sma20: Vec<Option<f64>>,
    pub sma50: Vec<Option<f64>>,
    pub ema12: Vec<Option<f64>>,
    pub ema26: Vec<Option<f64>>,
    pub volume_ma20: Vec<Option<f64>>,
    pub volume_roc: Vec<Option<f64>>,
    pub obv: Vec<f64>,
    pub price_volatility: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    pub resistance: Vec<Option<f64>>,
    pub support: Vec<Option<f64>>,
    pub pivot: Vec<f64>,
    pub price_change_pct: Vec<Option<f64>>,
    pub price_vs_sma20: Vec<Option<f64>>,
    pub price_vs_sma50: Vec<Option<f64>>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn bar(&self, index: usize) -> &PriceBar {
        &self.bars[index]
    }

    /// Most recent bar, if any.
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

/// Compute every indicator column for `bars`.
///
/// The input is copied, never mutated.  Fails only on a caller contract
/// violation: an empty series or a bar with a non-finite field.
pub fn compute_indicators(bars: &[PriceBar]) -> Result<IndicatorFrame, IndicatorError> {
    if bars.is_empty() {
        return Err(IndicatorError::EmptySeries);
    }
    for (index, bar) in bars.iter().enumerate() {
        for (field, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
            ("volume", bar.volume),
        ] {
            if !value.is_finite() {
                return Err(IndicatorError::NonFiniteField { index, field });
            }
        }
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let sma20 = rolling_mean(&closes, SMA_SHORT_WINDOW);
    let sma50 = rolling_mean(&closes, SMA_LONG_WINDOW);

    let price_vs_sma20 = relative_to(&closes, &sma20);
    let price_vs_sma50 = relative_to(&closes, &sma50);

    let pivot = bars
        .iter()
        .map(|b| (b.high + b.low + b.close) / 3.0)
        .collect();

    Ok(IndicatorFrame {
        bars: bars.to_vec(),
        ema12: ema_series(&closes, EMA_FAST_SPAN),
        ema26: ema_series(&closes, EMA_SLOW_SPAN),
        volume_ma20: rolling_mean(&volumes, VOLUME_MA_WINDOW),
        volume_roc: pct_change(&volumes),
        obv: obv_series(bars),
        price_volatility: rolling_std(&closes, VOLATILITY_WINDOW),
        atr: atr_series(bars, ATR_WINDOW),
        resistance: rolling_max(&highs, LEVEL_WINDOW),
        support: rolling_min(&lows, LEVEL_WINDOW),
        pivot,
        price_change_pct: pct_change(&closes),
        price_vs_sma20,
        price_vs_sma50,
        sma20,
        sma50,
    })
}

/// `(value - reference) / reference`, defined where the reference is defined
/// and non-zero.
fn relative_to(values: &[f64], reference: &[Option<f64>]) -> Vec<Option<f64>> {
    values
        .iter()
        .zip(reference.iter())
        .map(|(&v, r)| match r {
            Some(r) if *r != 0.0 => Some((v - r) / r),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.45).sin() * 6.0;
                PriceBar::new(
                    close - 0.3,
                    close + 1.5,
                    close - 1.5,
                    close,
                    1_000_000.0 + (i as f64 * 91.0) % 300_000.0,
                )
            })
            .collect()
    }

    #[test]
    fn empty_series_is_an_error() {
        assert_eq!(compute_indicators(&[]), Err(IndicatorError::EmptySeries));
    }

    #[test]
    fn non_finite_field_is_an_error() {
        let mut bars = series(5);
        bars[3].volume = f64::INFINITY;
        assert_eq!(
            compute_indicators(&bars),
            Err(IndicatorError::NonFiniteField {
                index: 3,
                field: "volume"
            })
        );
    }

    #[test]
    fn short_series_yields_undefined_columns_not_errors() {
        let frame = compute_indicators(&series(5)).unwrap();
        assert_eq!(frame.len(), 5);
        assert!(frame.sma20.iter().all(Option::is_none));
        assert!(frame.resistance.iter().all(Option::is_none));
        // Per-bar columns stay defined.
        assert_eq!(frame.pivot.len(), 5);
        assert_eq!(frame.obv.len(), 5);
        assert!(frame.ema12.iter().all(Option::is_some));
    }

    #[test]
    fn window_boundaries() {
        let frame = compute_indicators(&series(60)).unwrap();

        assert!(frame.sma20[18].is_none());
        assert!(frame.sma20[19].is_some());
        assert!(frame.sma50[48].is_none());
        assert!(frame.sma50[49].is_some());
        assert!(frame.atr[12].is_none());
        assert!(frame.atr[13].is_some());
        assert!(frame.price_volatility[18].is_none());
        assert!(frame.price_volatility[19].is_some());
        assert!(frame.price_change_pct[0].is_none());
        assert!(frame.price_change_pct[1].is_some());
    }

    #[test]
    fn sma20_equals_trailing_mean() {
        let bars = series(40);
        let frame = compute_indicators(&bars).unwrap();

        for t in 19..bars.len() {
            let expected: f64 =
                bars[t - 19..=t].iter().map(|b| b.close).sum::<f64>() / 20.0;
            assert!((frame.sma20[t].unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn resistance_never_below_support() {
        let frame = compute_indicators(&series(120)).unwrap();
        for t in 0..frame.len() {
            if let (Some(res), Some(sup)) = (frame.resistance[t], frame.support[t]) {
                assert!(res >= sup, "resistance {res} < support {sup} at {t}");
            }
        }
    }

    #[test]
    fn price_vs_sma_matches_definition() {
        let bars = series(30);
        let frame = compute_indicators(&bars).unwrap();
        let t = 25;
        let sma = frame.sma20[t].unwrap();
        let expected = (bars[t].close - sma) / sma;
        assert!((frame.price_vs_sma20[t].unwrap() - expected).abs() < 1e-12);
        assert!(frame.price_vs_sma50[t].is_none()); // only 30 bars
    }

    #[test]
    fn input_series_untouched() {
        let bars = series(25);
        let snapshot = bars.clone();
        let _ = compute_indicators(&bars).unwrap();
        assert_eq!(bars, snapshot);
    }

    #[test]
    fn deterministic_across_calls() {
        let bars = series(70);
        let a = compute_indicators(&bars).unwrap();
        let b = compute_indicators(&bars).unwrap();
        assert_eq!(a.sma20, b.sma20);
        assert_eq!(a.sma50, b.sma50);
        assert_eq!(a.ema26, b.ema26);
        assert_eq!(a.obv, b.obv);
        assert_eq!(a.atr, b.atr);
        assert_eq!(a.resistance, b.resistance);
        assert_eq!(a.support, b.support);
        assert_eq!(a.price_volatility, b.price_volatility);
    }
}
