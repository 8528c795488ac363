// =============================================================================
// Indicator Engine
// =============================================================================
//
// Pure, side-effect-free computation of the rolling technical indicators the
// signal detector consumes.  `compute_indicators` turns an OHLCV series into
// an `IndicatorFrame`; undefined rolling values are `None`, never partial
// results.

pub mod atr;
pub mod ema;
pub mod frame;
pub mod obv;
pub mod rolling;

pub use frame::{compute_indicators, IndicatorFrame};
