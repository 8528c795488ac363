// =============================================================================
// Screener Configuration — thresholds, lookback period, batch limits
// =============================================================================
//
// Every tunable parameter of a screening run lives here.  A config can be
// loaded from a JSON file or assembled from CLI flags; all fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an
// older config file.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::Period;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_volume_spike_threshold() -> f64 {
    2.0
}

fn default_breakout_threshold() -> f64 {
    0.02
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_symbols() -> Vec<String> {
    [
        "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "NVDA", "META", "NFLX", "AMD", "CRM", "BABA",
        "UBER", "SHOP", "SQ", "PYPL",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// =============================================================================
// ScreenerConfig
// =============================================================================

/// Top-level configuration for a screening run.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Historical lookback window requested from the data gateway.
    #[serde(default)]
    pub period: Period,

    /// Volume must reach this multiple of its 20-day average to count as a
    /// spike.  Must be > 0.
    #[serde(default = "default_volume_spike_threshold")]
    pub volume_spike_threshold: f64,

    /// Fractional margin applied below resistance when testing for a
    /// breakout (0.02 = price within 2% of resistance qualifies).
    /// Must be >= 0.
    #[serde(default = "default_breakout_threshold")]
    pub breakout_threshold: f64,

    /// Maximum number of symbols fetched concurrently during a batch run.
    /// Bounded to stay polite to the upstream data source.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Symbols screened when none are given on the command line.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            period: Period::default(),
            volume_spike_threshold: default_volume_spike_threshold(),
            breakout_threshold: default_breakout_threshold(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            symbols: default_symbols(),
        }
    }
}

impl ScreenerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read screener config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse screener config from {}", path.display()))?;

        info!(
            path = %path.display(),
            period = %config.period,
            symbols = config.symbols.len(),
            "screener config loaded"
        );

        config.validate()?;
        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise screener config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "screener config saved (atomic)");
        Ok(())
    }

    /// Reject configurations outside the valid parameter domain.
    pub fn validate(&self) -> Result<()> {
        if self.volume_spike_threshold <= 0.0 || !self.volume_spike_threshold.is_finite() {
            anyhow::bail!(
                "volume_spike_threshold must be > 0, got {}",
                self.volume_spike_threshold
            );
        }
        if self.breakout_threshold < 0.0 || !self.breakout_threshold.is_finite() {
            anyhow::bail!(
                "breakout_threshold must be >= 0, got {}",
                self.breakout_threshold
            );
        }
        if self.max_concurrent_fetches == 0 {
            anyhow::bail!("max_concurrent_fetches must be >= 1");
        }
        Ok(())
    }
}
