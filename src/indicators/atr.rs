// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// ATR measures volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// The first bar has no previous close, so its TR degrades to H - L.  ATR is
// the rolling arithmetic mean of TR over the window (14 by default), so it
// is defined from index window-1 onwards.
// =============================================================================

use crate::indicators::rolling::rolling_mean;
use crate::types::PriceBar;

/// Per-bar true range.  Defined for every bar.
pub fn true_range_series(bars: &[PriceBar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let hl = bar.high - bar.low;
        let tr = if i == 0 {
            hl
        } else {
            let prev_close = bars[i - 1].close;
            let hc = (bar.high - prev_close).abs();
            let lc = (bar.low - prev_close).abs();
            hl.max(hc).max(lc)
        };
        out.push(tr);
    }

    out
}

/// ATR column: rolling mean of true range over `window` bars.
pub fn atr_series(bars: &[PriceBar], window: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range_series(bars), window)
}
