// =============================================================================
// Signal quality scoring
// =============================================================================
//
// Informational layer on top of the binary signals: an additive score in
// [0, 1] built from the latest bar's volume, trend, volatility, and breakout
// strength.  It never gates detection itself.
// =============================================================================

use crate::indicators::IndicatorFrame;
use crate::signals::model::{CombinedSignals, QualityLevel, SignalQuality};

/// Volume multiple counted as strong confirmation.
const STRONG_VOLUME_MULT: f64 = 1.5;
/// Volatility-to-price ratio below which the market counts as calm.
const LOW_VOLATILITY_RATIO: f64 = 0.05;
/// Breakout strength above which the move counts as decisive.
const STRONG_BREAKOUT_STRENGTH: f64 = 0.03;

/// Score the reliability of `signals` against the latest bar of `frame`.
pub fn analyze_signal_quality(
    signals: &CombinedSignals,
    frame: &IndicatorFrame,
) -> SignalQuality {
    let Some(latest) = frame.latest() else {
        return SignalQuality::unknown();
    };
    let t = frame.len() - 1;

    let mut score = 0.0;
    let mut factors = Vec::new();

    // Volume confirmation.
    if let Some(vma) = frame.volume_ma20[t] {
        if latest.volume > vma * STRONG_VOLUME_MULT {
            score += 0.3;
            factors.push("strong_volume");
        } else if latest.volume > vma {
            score += 0.15;
            factors.push("good_volume");
        }
    }

    // Trend confirmation.
    if let (Some(sma20), Some(sma50)) = (frame.sma20[t], frame.sma50[t]) {
        if sma20 > sma50 {
            score += 0.2;
            factors.push("uptrend");
        }
    }

    // Volatility check: calm markets make cleaner entries.
    if let (Some(sma20), Some(volatility)) = (frame.sma20[t], frame.price_volatility[t]) {
        if sma20 > 0.0 && volatility / sma20 < LOW_VOLATILITY_RATIO {
            score += 0.2;
            factors.push("low_volatility");
        }
    }

    // Signal strength.
    if signals.breakout.is_signal() && signals.breakout.strength() > STRONG_BREAKOUT_STRENGTH {
        score += 0.3;
        factors.push("strong_breakout");
    }

    let quality = if score >= 0.8 {
        QualityLevel::Excellent
    } else if score >= 0.6 {
        QualityLevel::Good
    } else if score >= 0.4 {
        QualityLevel::Fair
    } else {
        QualityLevel::Poor
    };

    SignalQuality {
        quality,
        confidence: score,
        factors,
    }
}
