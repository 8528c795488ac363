// =============================================================================
// Signal value types
// =============================================================================

use serde::Serialize;

/// Breakout classification for the most recent bar.
///
/// Modeled as a sum type so that a strength only exists when a signal does:
/// `NoSignal` cannot carry one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "signal_type")]
pub enum BreakoutSignal {
    NoSignal,
    /// Close pushed through the trailing 20-day resistance level.
    ResistanceBreakout { strength: f64 },
    /// Close crossed above the 20-day SMA in a confirmed uptrend.
    MaBreakout { strength: f64 },
}

impl BreakoutSignal {
    pub fn is_signal(&self) -> bool {
        !matches!(self, Self::NoSignal)
    }

    /// Fraction above the reference level; 0.0 when there is no signal.
    pub fn strength(&self) -> f64 {
        match self {
            Self::NoSignal => 0.0,
            Self::ResistanceBreakout { strength } | Self::MaBreakout { strength } => *strength,
        }
    }

    /// Human-readable label for display output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoSignal => "No Signal",
            Self::ResistanceBreakout { .. } => "Resistance Breakout",
            Self::MaBreakout { .. } => "MA Breakout",
        }
    }
}

/// Volume-spike verdict for the trailing window.
///
/// `volume_ratio` is diagnostic even without a spike: it records the latest
/// bar's volume relative to its 20-day average (0.0 when undefined).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeSignal {
    pub signal: bool,
    pub volume_ratio: f64,
}

impl VolumeSignal {
    pub fn no_signal(volume_ratio: f64) -> Self {
        Self {
            signal: false,
            volume_ratio,
        }
    }

    pub fn spike(volume_ratio: f64) -> Self {
        Self {
            signal: true,
            volume_ratio,
        }
    }
}

/// Both signal verdicts for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedSignals {
    pub breakout: BreakoutSignal,
    pub volume: VolumeSignal,
}

impl CombinedSignals {
    /// Degenerate all-quiet result (insufficient data or internal fault).
    pub fn none() -> Self {
        Self {
            breakout: BreakoutSignal::NoSignal,
            volume: VolumeSignal::no_signal(0.0),
        }
    }

    pub fn has_any_signal(&self) -> bool {
        self.breakout.is_signal() || self.volume.signal
    }

    pub fn signal_count(&self) -> usize {
        usize::from(self.breakout.is_signal()) + usize::from(self.volume.signal)
    }
}

/// Quality tier for a detected signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    /// Only produced for an empty frame.
    Unknown,
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Informational quality assessment layered on top of the binary signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalQuality {
    pub quality: QualityLevel,
    /// Additive score in [0, 1].
    pub confidence: f64,
    /// Names of the factors that contributed to the score.
    pub factors: Vec<&'static str>,
}

impl SignalQuality {
    pub fn unknown() -> Self {
        Self {
            quality: QualityLevel::Unknown,
            confidence: 0.0,
            factors: Vec::new(),
        }
    }
}
