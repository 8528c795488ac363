// =============================================================================
// Signal Detector — breakout and volume-spike detection
// =============================================================================
//
// Consumes an `IndicatorFrame` and produces the combined signal verdict.
// Detection never fails: with fewer than MIN_BARS of history, or wherever a
// derived field is undefined, the result degrades toward "no signal" rather
// than an error, so one thin symbol never aborts a batch run.
//
// Breakout priority: resistance breakout first, then MA breakout.  The
// resistance check scans a short trailing window because breakouts are often
// confirmed a day or two after the initial cross, once volume catches up;
// a same-day-only check would over-reject on thin trading days.
// =============================================================================

use tracing::{debug, info};

use crate::indicators::IndicatorFrame;
use crate::signals::model::{BreakoutSignal, CombinedSignals, VolumeSignal};

/// Minimum bars of history required: a full 20-bar indicator window plus one
/// bar for delta comparisons.
pub const MIN_BARS: usize = 21;

/// Trailing window scanned for recent crossings and volume evidence.
const SIGNAL_LOOKBACK: usize = 5;

/// Volume must exceed this multiple of its 20-day average to confirm a
/// resistance breakout.
const VOLUME_CONFIRMATION_MULT: f64 = 1.2;

/// Detects breakout and volume-spike signals with thresholds fixed at
/// construction.  Distinct configurations get distinct detectors.
#[derive(Debug, Clone, Copy)]
pub struct SignalDetector {
    volume_spike_threshold: f64,
    breakout_threshold: f64,
}

impl SignalDetector {
    /// `volume_spike_threshold` is a multiplier of the 20-day average volume
    /// (> 0); `breakout_threshold` is the fractional margin below resistance
    /// that still counts as a breakout (>= 0).  Both are validated at the
    /// config layer.
    pub fn new(volume_spike_threshold: f64, breakout_threshold: f64) -> Self {
        Self {
            volume_spike_threshold,
            breakout_threshold,
        }
    }

    /// Run both detectors over the frame.
    pub fn detect_all_signals(&self, frame: &IndicatorFrame) -> CombinedSignals {
        CombinedSignals {
            breakout: self.detect_breakout(frame),
            volume: self.detect_volume_spike(frame),
        }
    }

    // -------------------------------------------------------------------------
    // Breakout detection
    // -------------------------------------------------------------------------

    /// Classify the most recent bar, resistance breakout taking priority
    /// over MA breakout.
    pub fn detect_breakout(&self, frame: &IndicatorFrame) -> BreakoutSignal {
        if frame.len() < MIN_BARS {
            debug!(bars = frame.len(), "insufficient history for breakout detection");
            return BreakoutSignal::NoSignal;
        }

        if let Some(strength) = self.resistance_breakout(frame) {
            info!(strength, "resistance breakout detected");
            return BreakoutSignal::ResistanceBreakout { strength };
        }

        if let Some(strength) = self.ma_breakout(frame) {
            info!(strength, "MA breakout detected");
            return BreakoutSignal::MaBreakout { strength };
        }

        BreakoutSignal::NoSignal
    }

    /// Resistance breakout: the latest close sits within (or above) the
    /// discounted resistance band, a genuine below-to-above crossing happened
    /// within the trailing window, and at least one recent bar shows volume
    /// above 1.2x its 20-day average.  Crossing and volume evidence are
    /// searched independently and need not fall on the same bar.
    fn resistance_breakout(&self, frame: &IndicatorFrame) -> Option<f64> {
        let len = frame.len();
        let latest = len - 1;

        let resistance = frame.resistance[latest]?;
        if resistance <= 0.0 {
            return None;
        }
        let latest_close = frame.bar(latest).close;
        if latest_close <= resistance * (1.0 - self.breakout_threshold) {
            return None;
        }

        let lookback = SIGNAL_LOOKBACK.min(len);
        let volume_confirmed = (1..=lookback).any(|i| {
            let t = len - i;
            match frame.volume_ma20[t] {
                Some(vma) => frame.bar(t).volume > vma * VOLUME_CONFIRMATION_MULT,
                None => false,
            }
        });
        if !volume_confirmed {
            return None;
        }

        // A crossing needs a bar above its own discounted resistance whose
        // predecessor closed at or below the predecessor's resistance.
        let crossed = (1..lookback).filter(|i| i + 1 < len).any(|i| {
            let cur = len - i;
            let prev = cur - 1;
            match (frame.resistance[cur], frame.resistance[prev]) {
                (Some(cur_res), Some(prev_res)) => {
                    frame.bar(cur).close > cur_res * (1.0 - self.breakout_threshold)
                        && frame.bar(prev).close <= prev_res
                }
                _ => false,
            }
        });
        if !crossed {
            return None;
        }

        Some(((latest_close - resistance) / resistance).max(0.0))
    }

    /// MA breakout: latest close crossed above the 20-day SMA from below,
    /// with the 20-day SMA above the 50-day SMA as uptrend confirmation.
    /// Uses only the latest and previous bar.
    fn ma_breakout(&self, frame: &IndicatorFrame) -> Option<f64> {
        let latest = frame.len() - 1;
        let previous = latest - 1;

        let sma20 = frame.sma20[latest]?;
        let sma50 = frame.sma50[latest]?;
        let prev_sma20 = frame.sma20[previous]?;

        let latest_close = frame.bar(latest).close;
        let crossed_up =
            latest_close > sma20 && frame.bar(previous).close <= prev_sma20 && sma20 > sma50;

        if crossed_up && sma20 > 0.0 {
            Some(((latest_close - sma20) / sma20).max(0.0))
        } else {
            None
        }
    }

    // -------------------------------------------------------------------------
    // Volume-spike detection
    // -------------------------------------------------------------------------

    /// Scan the trailing window for a bar whose volume reaches the spike
    /// threshold (inclusive).  On a spike, report the best ratio seen in the
    /// window; otherwise report the latest bar's own ratio for diagnostics.
    pub fn detect_volume_spike(&self, frame: &IndicatorFrame) -> VolumeSignal {
        let len = frame.len();
        if len < MIN_BARS {
            debug!(bars = len, "insufficient history for volume spike detection");
            return VolumeSignal::no_signal(0.0);
        }

        let lookback = SIGNAL_LOOKBACK.min(len);
        let mut max_ratio = 0.0_f64;
        let mut spike_detected = false;

        for i in 1..=lookback {
            let t = len - i;
            let ratio = Self::volume_ratio(frame, t);
            max_ratio = max_ratio.max(ratio);

            if ratio >= self.volume_spike_threshold {
                spike_detected = true;
                info!(ratio, "volume spike in trailing window");
            }
        }

        if spike_detected {
            VolumeSignal::spike(max_ratio)
        } else {
            VolumeSignal::no_signal(Self::volume_ratio(frame, len - 1))
        }
    }

    /// Volume relative to its 20-day average at bar `t`; 0.0 when the
    /// average is undefined or zero.
    fn volume_ratio(frame: &IndicatorFrame, t: usize) -> f64 {
        match frame.volume_ma20[t] {
            Some(vma) if vma > 0.0 => frame.bar(t).volume / vma,
            _ => 0.0,
        }
    }
}
