// =============================================================================
// Shared types used across the screener
// =============================================================================

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data, oldest-first within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// True when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Historical lookback window for a data fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Period {
    #[value(name = "1mo")]
    #[serde(rename = "1mo")]
    OneMonth,
    #[value(name = "3mo")]
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[value(name = "6mo")]
    #[serde(rename = "6mo")]
    SixMonths,
    #[value(name = "1y")]
    #[serde(rename = "1y")]
    OneYear,
    #[value(name = "2y")]
    #[serde(rename = "2y")]
    TwoYears,
    #[value(name = "5y")]
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    /// The `range` query value understood by the Yahoo chart API.
    pub fn as_range(&self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::ThreeMonths
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_range_strings() {
        assert_eq!(Period::OneMonth.as_range(), "1mo");
        assert_eq!(Period::ThreeMonths.as_range(), "3mo");
        assert_eq!(Period::FiveYears.as_range(), "5y");
        assert_eq!(Period::default(), Period::ThreeMonths);
    }

    #[test]
    fn period_serde_roundtrip() {
        let json = serde_json::to_string(&Period::SixMonths).unwrap();
        assert_eq!(json, "\"6mo\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Period::SixMonths);
    }

    #[test]
    fn price_bar_finite_check() {
        let bar = PriceBar::new(100.0, 101.0, 99.0, 100.5, 1000.0);
        assert!(bar.is_finite());

        let bad = PriceBar::new(100.0, f64::NAN, 99.0, 100.5, 1000.0);
        assert!(!bad.is_finite());
    }
}
