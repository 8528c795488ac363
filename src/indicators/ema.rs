// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (span + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The series is seeded with the first close, so every bar carries a value.
// Only the latest values are consumed downstream (informational quality
// checks), so the seeding convention is not load-bearing.
// =============================================================================

/// Compute the EMA column for the given `values` and smoothing `span`.
///
/// Returns one entry per input value; `span == 0` or an empty input yields
/// an all-`None` column.  A non-finite intermediate value stops the series —
/// downstream consumers should not trust a broken tail.
pub fn ema_series(values: &[f64], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if span == 0 || values.is_empty() {
        return out;
    }

    let multiplier = 2.0 / (span + 1) as f64;

    let mut prev = values[0];
    if !prev.is_finite() {
        return out;
    }
    out[0] = Some(prev);

    for (i, &value) in values.iter().enumerate().skip(1) {
        let ema = value * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        out[i] = Some(ema);
        prev = ema;
    }

    out
}
