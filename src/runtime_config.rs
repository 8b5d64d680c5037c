// =============================================================================
// Runtime Configuration — Hot-reloadable engine settings with atomic save
// =============================================================================
//
// Central configuration hub for the CalmPulse engine.  Every tunable
// parameter lives here so the engine can be reconfigured at runtime without
// a restart.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{FeedMode, MonitorMode};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_tick_secs() -> u64 {
    5
}

fn default_high_bpm() -> f64 {
    100.0
}

fn default_high_volume() -> f64 {
    0.4
}

fn default_repetition_min() -> u32 {
    2
}

fn default_negative_sentiment() -> f64 {
    -0.3
}

fn default_positive_sentiment() -> f64 {
    0.3
}

fn default_scripted_compound() -> f64 {
    -0.8
}

fn default_top_terms() -> usize {
    10
}

// =============================================================================
// EmotionThresholds
// =============================================================================

/// Tunable thresholds for the emotion indicator set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionThresholds {
    /// Maximum-BPM level above which the heart-rate indicator is active.
    #[serde(default = "default_high_bpm")]
    pub high_bpm: f64,

    /// Mean normalized volume above which the loudness indicator is active.
    #[serde(default = "default_high_volume")]
    pub high_volume: f64,

    /// Minimum adjacent-word repetition count for the repetition alert.
    #[serde(default = "default_repetition_min")]
    pub repetition_min: u32,

    /// Compound sentiment score below which sentiment counts as negative.
    #[serde(default = "default_negative_sentiment")]
    pub negative_sentiment: f64,

    /// Compound sentiment score above which sentiment counts as positive.
    #[serde(default = "default_positive_sentiment")]
    pub positive_sentiment: f64,
}

impl Default for EmotionThresholds {
    fn default() -> Self {
        Self {
            high_bpm: default_high_bpm(),
            high_volume: default_high_volume(),
            repetition_min: default_repetition_min(),
            negative_sentiment: default_negative_sentiment(),
            positive_sentiment: default_positive_sentiment(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the CalmPulse engine.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Operational modes ---------------------------------------------------

    /// Whether the evaluation loop is Running or Paused.
    #[serde(default)]
    pub monitor_mode: MonitorMode,

    /// Observation source: Replay (canned demo data) or Live (API pushes).
    #[serde(default)]
    pub feed_mode: FeedMode,

    // --- Evaluation loop -----------------------------------------------------

    /// Seconds between replay evaluation ticks.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Number of top terms reported per transcript analysis.
    #[serde(default = "default_top_terms")]
    pub top_terms: usize,

    // --- Classifier thresholds -----------------------------------------------

    /// Thresholds for the emotion indicator set.
    #[serde(default)]
    pub thresholds: EmotionThresholds,

    // --- Sentiment oracle ----------------------------------------------------

    /// Fixed compound score the scripted demo oracle returns. The canned
    /// transcript is strongly negative, hence the default.
    #[serde(default = "default_scripted_compound")]
    pub scripted_compound: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            monitor_mode: MonitorMode::Running,
            feed_mode: FeedMode::Replay,
            tick_secs: default_tick_secs(),
            top_terms: default_top_terms(),
            thresholds: EmotionThresholds::default(),
            scripted_compound: default_scripted_compound(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            monitor_mode = %config.monitor_mode,
            feed_mode = %config.feed_mode,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    ///
    /// This prevents corruption if the process crashes mid-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        // Atomic write: write to a temporary sibling file, then rename.
        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.monitor_mode, MonitorMode::Running);
        assert_eq!(cfg.feed_mode, FeedMode::Replay);
        assert_eq!(cfg.tick_secs, 5);
        assert_eq!(cfg.top_terms, 10);
        assert!((cfg.thresholds.high_bpm - 100.0).abs() < f64::EPSILON);
        assert!((cfg.thresholds.high_volume - 0.4).abs() < f64::EPSILON);
        assert_eq!(cfg.thresholds.repetition_min, 2);
        assert!((cfg.thresholds.negative_sentiment - (-0.3)).abs() < f64::EPSILON);
        assert!((cfg.thresholds.positive_sentiment - 0.3).abs() < f64::EPSILON);
        assert!((cfg.scripted_compound - (-0.8)).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.monitor_mode, MonitorMode::Running);
        assert_eq!(cfg.feed_mode, FeedMode::Replay);
        assert_eq!(cfg.tick_secs, 5);
        assert_eq!(cfg.thresholds.repetition_min, 2);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "feed_mode": "Live", "thresholds": { "high_bpm": 110.0 } }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.feed_mode, FeedMode::Live);
        assert!((cfg.thresholds.high_bpm - 110.0).abs() < f64::EPSILON);
        // Untouched threshold fields keep their defaults.
        assert!((cfg.thresholds.high_volume - 0.4).abs() < f64::EPSILON);
        assert_eq!(cfg.tick_secs, 5);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.monitor_mode, cfg2.monitor_mode);
        assert_eq!(cfg.feed_mode, cfg2.feed_mode);
        assert_eq!(cfg.thresholds, cfg2.thresholds);
        assert_eq!(cfg.tick_secs, cfg2.tick_secs);
    }
}
