// =============================================================================
// Heart Rate — BPM series statistics and instantaneous status
// =============================================================================
//
// Summarizes a BPM time series (latest last) into the figures the dashboard
// and the fusion pipeline consume: current, average, maximum, minimum.
//
// Thresholds:  BPM > 100 => HIGH,  BPM < 60 => LOW, otherwise NORMAL.

use serde::{Deserialize, Serialize};

/// Summary statistics over a BPM series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartStats {
    /// Most recent sample.
    pub current: f64,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

/// Instantaneous BPM status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartStatus {
    Low,
    Normal,
    High,
}

impl HeartStatus {
    /// Classify a single BPM reading. A non-finite reading is treated as
    /// Normal — inability to read is not an alarm on its own.
    pub fn from_bpm(bpm: f64) -> Self {
        if bpm > 100.0 {
            Self::High
        } else if bpm < 60.0 {
            Self::Low
        } else {
            Self::Normal
        }
    }
}

impl std::fmt::Display for HeartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Normal => write!(f, "NORMAL"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Summarize a BPM series (latest sample last).
///
/// Non-finite samples are skipped. Returns `None` when no finite sample
/// remains.
pub fn summarize(bpm: &[f64]) -> Option<HeartStats> {
    let finite: Vec<f64> = bpm.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }

    let sum: f64 = finite.iter().sum();
    let max = finite.iter().copied().fold(f64::MIN, f64::max);
    let min = finite.iter().copied().fold(f64::MAX, f64::min);

    Some(HeartStats {
        current: *finite.last()?,
        avg: sum / finite.len() as f64,
        max,
        min,
    })
}
