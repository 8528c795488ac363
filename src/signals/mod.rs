// =============================================================================
// Signal Detection
// =============================================================================
//
// The detector consumes an `IndicatorFrame` and produces a combined verdict:
// breakout classification with strength, volume-spike flag with ratio, and
// an optional quality score layered on top.

pub mod detector;
pub mod model;
pub mod quality;

pub use detector::SignalDetector;
pub use model::{CombinedSignals, SignalQuality};
pub use quality::analyze_signal_quality;
