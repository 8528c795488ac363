// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Cumulative volume-flow indicator:
//
//   obv[0] = 0
//   obv[t] = obv[t-1] + volume[t]   if close[t] > close[t-1]
//   obv[t] = obv[t-1] - volume[t]   if close[t] < close[t-1]
//   obv[t] = obv[t-1]               otherwise
//
// The recurrence depends on the previous output, so this is a strictly
// sequential left-to-right scan.
// =============================================================================

use crate::types::PriceBar;

/// Compute the OBV column for a bar series.  Defined for every bar.
pub fn obv_series(bars: &[PriceBar]) -> Vec<f64> {
    let mut out = vec![0.0; bars.len()];

    for i in 1..bars.len() {
        let step = if bars[i].close > bars[i - 1].close {
            bars[i].volume
        } else if bars[i].close < bars[i - 1].close {
            -bars[i].volume
        } else {
            0.0
        };
        out[i] = out[i - 1] + step;
    }

    out
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
    fn obv_empty_series() {
        assert!(obv_series(&[]).is_empty());
    }

    #[test]
    fn obv_starts_at_zero() {
        let out = obv_series(&[bar(100.0, 5000.0)]);
        assert_eq!(out, vec![0.0]);
    }

    #[test]
    fn obv_adds_on_up_subtracts_on_down_holds_on_flat() {
        let bars = vec![
            bar(100.0, 1000.0),
            bar(101.0, 2000.0), // up    -> +2000
            bar(100.5, 1500.0), // down  -> -1500
            bar(100.5, 9999.0), // flat  -> unchanged
        ];
        let out = obv_series(&bars);
        assert_eq!(out, vec![0.0, 2000.0, 500.0, 500.0]);
    }

    #[test]
    fn obv_step_property() {
        // For all t >= 1 the delta must be +volume, -volume, or 0 depending
        // on the close-to-close direction.
        let bars: Vec<PriceBar> = (0..80)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.9).sin() * 8.0;
                bar(close, 1000.0 + (i as f64 * 37.0) % 500.0)
            })
            .collect();
        let out = obv_series(&bars);

        for t in 1..bars.len() {
            let delta = out[t] - out[t - 1];
            if bars[t].close > bars[t - 1].close {
                assert_eq!(delta, bars[t].volume);
            } else if bars[t].close < bars[t - 1].close {
                assert_eq!(delta, -bars[t].volume);
            } else {
                assert_eq!(delta, 0.0);
            }
        }
    }
}
