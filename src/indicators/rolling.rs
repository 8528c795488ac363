// =============================================================================
// Rolling-window primitives
// =============================================================================
//
// Every function here is a pure transformation of an f64 slice into a column
// of the same length.  The strict-window convention applies throughout: a
// window of size N produces `None` until exactly N observations are
// available, so the first N-1 entries of each column are undefined rather
// than partially computed.
// =============================================================================

/// Rolling arithmetic mean over a trailing `window` of values.
///
/// Maintains a running sum instead of re-summing each window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = finite(sum / window as f64);

    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = finite(sum / window as f64);
    }

    out
}

/// Rolling maximum over a trailing `window` of values.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_reduce(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Rolling minimum over a trailing `window` of values.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_reduce(values, window, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

/// Rolling sample standard deviation (N-1 denominator) over a trailing
/// `window` of values.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    rolling_reduce(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let var = w.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    })
}

/// One-bar fractional change: `(v[t] - v[t-1]) / v[t-1]`.
///
/// Undefined at index 0 and wherever the previous value is zero.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for i in 1..values.len() {
        let prev = values[i - 1];
        if prev != 0.0 {
            out[i] = finite((values[i] - prev) / prev);
        }
    }
    out
}

/// Shared window-scan driver for the max/min/std reductions.
fn rolling_reduce<F>(values: &[f64], window: usize, reduce: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for i in (window - 1)..values.len() {
        out[i] = finite(reduce(&values[i + 1 - window..=i]));
    }
    out
}

/// Map non-finite results to `None` so a single NaN never poisons a column
/// silently.
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
