// =============================================================================
// Voice Volume — normalized amplitude series statistics
// =============================================================================
//
// The upstream extractor delivers a normalized [0, 1] volume series (one
// sample per frame). This module reduces it to the mean and peak figures
// consumed by the fusion pipeline (mean volume vs the high-volume threshold)
// and the dashboard.

use serde::{Deserialize, Serialize};

/// Summary statistics over a normalized volume series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub mean: f64,
    pub peak: f64,
    /// Number of finite samples the statistics were computed from.
    pub samples: usize,
}

/// Summarize a volume series. Non-finite samples are skipped; returns `None`
/// when no finite sample remains.
pub fn summarize(volume: &[f64]) -> Option<VolumeStats> {
    let finite: Vec<f64> = volume.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }

    let sum: f64 = finite.iter().sum();
    let peak = finite.iter().copied().fold(f64::MIN, f64::max);

    Some(VolumeStats {
        mean: sum / finite.len() as f64,
        peak,
        samples: finite.len(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_empty_series() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn summarize_basic_series() {
        let stats = summarize(&[0.2, 0.4, 0.6]).unwrap();
        assert!((stats.mean - 0.4).abs() < 1e-12);
        assert!((stats.peak - 0.6).abs() < f64::EPSILON);
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn summarize_skips_non_finite_samples() {
        let stats = summarize(&[0.2, f64::NAN, 0.8]).unwrap();
        assert!((stats.mean - 0.5).abs() < 1e-12);
        assert_eq!(stats.samples, 2);
    }

    #[test]
    fn quiet_series_stays_below_threshold() {
        // Mean below the default 0.4 high-volume threshold.
        let stats = summarize(&[0.1, 0.2, 0.3]).unwrap();
        assert!(stats.mean < 0.4);
    }
}
